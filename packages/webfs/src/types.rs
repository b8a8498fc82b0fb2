use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP methods used by the web workflow filesystem API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    PUT,
    DELETE,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
        };
        f.write_str(name)
    }
}

/// A single request against the device.
///
/// The URL never carries the credential; authentication is attached by the
/// transport at send time.
#[derive(Debug, Clone)]
pub struct DeviceRequest {
    pub method: Method,

    pub url: Url,

    /// Send `Accept: application/json` (directory listings, free space)
    pub accept_json: bool,

    /// Attach basic auth with the device password
    pub authenticated: bool,

    /// Raw body; `None` for reads, deletes and directory creation
    pub body: Option<Vec<u8>>,
}

impl DeviceRequest {
    fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            accept_json: false,
            authenticated: true,
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn accepting_json(mut self) -> Self {
        self.accept_json = true;
        self
    }

    /// Skip basic auth (used for the public `cp/version.json` lookup)
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Response from the device
#[derive(Debug, Clone)]
pub struct DeviceResponse {
    pub status: u16,

    /// Status text (e.g., "OK", "Conflict")
    pub status_text: String,

    pub body: Vec<u8>,
}

impl DeviceResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();

        Self {
            status,
            status_text,
            body: body.into(),
        }
    }

    /// Try to deserialize the body into a specific type
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,

    /// Meaningless for directories
    #[serde(rename = "file_size", default)]
    pub size_bytes: u64,

    #[serde(rename = "directory", default)]
    pub is_directory: bool,
}

impl DirectoryEntry {
    pub fn file(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            is_directory: false,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes: 0,
            is_directory: true,
        }
    }
}

/// JSON document returned by `GET /fs/<dir>/` with `Accept: application/json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FsListing {
    #[serde(default)]
    pub files: Vec<DirectoryEntry>,

    /// Free blocks on the filesystem
    #[serde(default)]
    pub free: Option<u64>,

    /// Total blocks on the filesystem
    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub block_size: Option<u64>,

    #[serde(default)]
    pub writable: Option<bool>,
}

/// JSON document returned by `GET /cp/version.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub web_api_version: Option<u64>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub board_id: Option<String>,

    #[serde(default)]
    pub board_name: Option<String>,

    #[serde(default)]
    pub mcu_name: Option<String>,

    #[serde(default)]
    pub ip: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_status_text_from_code() {
        let response = DeviceResponse::new(409, Vec::new());
        assert_eq!(response.status_text, "Conflict");

        let response = DeviceResponse::new(204, Vec::new());
        assert_eq!(response.status, 204);
        assert_eq!(response.status_text, "No Content");
    }

    #[test]
    fn listing_parses_device_document() {
        let body = br#"{
            "free": 100,
            "total": 2000,
            "block_size": 512,
            "writable": true,
            "files": [
                {"name": "lib", "directory": true, "modified_ns": 0, "file_size": 0},
                {"name": "code.py", "directory": false, "modified_ns": 0, "file_size": 42}
            ]
        }"#;
        let listing: FsListing = DeviceResponse::new(200, body.to_vec()).json().unwrap();
        assert_eq!(listing.free, Some(100));
        assert_eq!(listing.block_size, Some(512));
        assert_eq!(listing.writable, Some(true));
        assert_eq!(
            listing.files,
            vec![
                DirectoryEntry::directory("lib"),
                DirectoryEntry::file("code.py", 42)
            ]
        );
    }

    #[test]
    fn version_info_tolerates_missing_fields() {
        let info: VersionInfo = serde_json::from_str(r#"{"hostname": "cpy-abc"}"#).unwrap();
        assert_eq!(info.web_api_version, None);
        assert_eq!(info.hostname.as_deref(), Some("cpy-abc"));
    }

    #[test]
    fn request_builders() {
        let url = Url::parse("http://device.local/fs/").unwrap();
        let request = DeviceRequest::get(url.clone()).accepting_json();
        assert_eq!(request.method, Method::GET);
        assert!(request.accept_json);
        assert!(request.authenticated);

        let request = DeviceRequest::put(url).with_body(b"x".to_vec()).anonymous();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.body.as_deref(), Some(&b"x"[..]));
        assert!(!request.authenticated);
    }
}
