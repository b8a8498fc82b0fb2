use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Must pass --password or set the CIRCUP_WEBWORKFLOW_PASSWORD environment variable")]
    MissingCredential,

    #[error("Invalid host: {host}. {hint}")]
    UnresolvableHost { host: String, hint: &'static str },

    #[error(
        "CircuitPython Web Workflow Device not writable ({path})\n - \
         Remount storage as writable to device (not PC)"
    )]
    NotWritable { path: String },

    #[error("{path} was not found on the device")]
    NotFound { path: String },

    #[error("HTTP {status} {message}: {path}")]
    Http {
        status: u16,
        message: String,
        path: String,
    },

    #[error("Connection failure: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid response from device: {message}")]
    InvalidResponse { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid local path {}: {message}", .path.display())]
    InvalidLocalPath { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the device-side read-only condition (HTTP 409).
    pub fn is_not_writable(&self) -> bool {
        matches!(self, Error::NotWritable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_writable_message_tells_user_to_remount() {
        let err = Error::NotWritable {
            path: "fs/lib/".to_string(),
        };
        assert!(err.is_not_writable());
        assert!(err.to_string().contains("Remount storage as writable"));
    }

    #[test]
    fn missing_credential_names_env_var() {
        let err = Error::MissingCredential;
        assert!(err.to_string().contains("CIRCUP_WEBWORKFLOW_PASSWORD"));
        assert!(!err.is_not_writable());
    }
}
