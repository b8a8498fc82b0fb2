//! Description of a reachable device.

use std::fmt;
use std::net::{Ipv6Addr, ToSocketAddrs};
use std::time::Duration;

use url::Url;

use crate::config::EndpointConfig;
use crate::error::Error;
use crate::path::RemotePath;

const HTTP_PORT: u16 = 80;
const VERSION_PATH: &str = "cp/version.json";

/// Web workflow password.
///
/// Only the transport reads the secret, when it attaches basic auth to a
/// request. `Debug` is redacted so the value cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Immutable description of one device: host, credential, timeout and the
/// credential-free base URL every request is built from.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    host: String,
    credential: Credential,
    base_url: Url,
    timeout: Duration,
}

impl DeviceEndpoint {
    /// Validate the host and build the endpoint.
    ///
    /// Fails with [`Error::MissingCredential`] when no password is given and
    /// with [`Error::UnresolvableHost`] when the host does not resolve.
    pub fn new(
        host: impl Into<String>,
        password: Option<Credential>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let host = host.into();
        let credential = password.ok_or(Error::MissingCredential)?;

        resolve_host(&host)?;
        let base_url = base_url_for(&host)?;

        Ok(Self {
            host,
            credential,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, Error> {
        Self::new(config.host.clone(), config.password.clone(), config.timeout)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Base URL without credentials, safe to display and log
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn url_for(&self, path: &RemotePath) -> Result<Url, Error> {
        path.to_url(&self.base_url)
    }

    pub fn version_url(&self) -> Result<Url, Error> {
        version_url(&self.base_url)
    }
}

pub(crate) fn base_url_for(host: &str) -> Result<Url, Error> {
    let authority = match host.parse::<Ipv6Addr>() {
        Ok(addr) => format!("[{}]", addr),
        Err(_) => host.to_string(),
    };
    Ok(Url::parse(&format!("http://{}/", authority))?)
}

pub(crate) fn version_url(base: &Url) -> Result<Url, Error> {
    Ok(base.join(VERSION_PATH)?)
}

/// Check that `host` (optionally `host:port`) resolves at the network layer.
fn resolve_host(host: &str) -> Result<(), Error> {
    let resolved = host
        .to_socket_addrs()
        .or_else(|_| (host, HTTP_PORT).to_socket_addrs());

    match resolved.ok().and_then(|mut addrs| addrs.next()) {
        Some(_) => Ok(()),
        None => {
            let hint = if host.contains("http://") || host.contains("https://") {
                "You should remove the 'http://' or 'https://' prefix."
            } else {
                "Could not find or connect to specified device."
            };
            Err(Error::UnresolvableHost {
                host: host.to_string(),
                hint,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> Option<Credential> {
        Some(Credential::new("secret"))
    }

    #[test]
    fn missing_credential_is_rejected() {
        let err = DeviceEndpoint::new("127.0.0.1", None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }

    #[test]
    fn scheme_prefix_gets_a_hint() {
        let err =
            DeviceEndpoint::new("http://127.0.0.1", secret(), Duration::from_secs(1)).unwrap_err();
        match err {
            Error::UnresolvableHost { host, hint } => {
                assert_eq!(host, "http://127.0.0.1");
                assert!(hint.contains("remove the 'http://'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_host_is_unresolvable() {
        let err = DeviceEndpoint::new("no-such-device.invalid", secret(), Duration::from_secs(1))
            .unwrap_err();
        match err {
            Error::UnresolvableHost { host, hint } => {
                assert_eq!(host, "no-such-device.invalid");
                assert!(hint.contains("Could not find"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base_url_is_credential_free() {
        let endpoint = DeviceEndpoint::new("127.0.0.1", secret(), Duration::from_secs(5)).unwrap();
        assert_eq!(endpoint.base_url().as_str(), "http://127.0.0.1/");
        assert_eq!(endpoint.timeout(), Duration::from_secs(5));
        assert!(!format!("{:?}", endpoint).contains("secret"));
    }

    #[test]
    fn host_with_port() {
        let endpoint =
            DeviceEndpoint::new("127.0.0.1:8080", secret(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            endpoint.version_url().unwrap().as_str(),
            "http://127.0.0.1:8080/cp/version.json"
        );
        assert_eq!(
            endpoint.url_for(&RemotePath::library()).unwrap().as_str(),
            "http://127.0.0.1:8080/fs/lib/"
        );
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let url = base_url_for("::1").unwrap();
        assert_eq!(url.as_str(), "http://[::1]/");
    }
}
