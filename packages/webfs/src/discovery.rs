//! Resolve the generic `circuitpython.local` name to a device's own hostname.
//!
//! Every device answers to `circuitpython.local` over mDNS, but with more than
//! one board on the network that name is ambiguous between requests. The
//! device reports its unique hostname in `cp/version.json`.

use std::time::Duration;

use crate::config::DEFAULT_HOST;
use crate::endpoint::{base_url_for, version_url};
use crate::error::Error;
use crate::status::TransferOutcome;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{DeviceRequest, VersionInfo};

/// Return the host to talk to: `host` itself, or the device's unique
/// `<hostname>.local` when `host` is the generic mDNS name.
pub fn discover_hostname(host: &str, timeout: Duration) -> Result<String, Error> {
    if host != DEFAULT_HOST {
        return Ok(host.to_string());
    }

    tracing::info!("Checking version.json on {} to find hostname", host);
    let transport = ReqwestTransport::anonymous(timeout)?;
    let resolved = lookup_hostname(&transport, host)?;
    tracing::info!("Using hostname: {}", resolved);
    Ok(resolved)
}

/// Ask the device at `host` for its hostname.
pub fn lookup_hostname(transport: &impl Transport, host: &str) -> Result<String, Error> {
    let url = version_url(&base_url_for(host)?)?;
    let response = transport.execute(&DeviceRequest::get(url.clone()).anonymous())?;
    TransferOutcome::classify(&response).into_result(url.path())?;

    let info: VersionInfo = response.json()?;
    let hostname = info.hostname.ok_or_else(|| Error::InvalidResponse {
        message: "version.json has no hostname".to_string(),
    })?;
    Ok(format!("{}.local", hostname))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    #[test]
    fn explicit_host_is_kept() {
        let host = discover_hostname("192.168.1.20", Duration::from_secs(1)).unwrap();
        assert_eq!(host, "192.168.1.20");
    }

    #[test]
    fn hostname_from_version_document() {
        let transport = MockTransport::new().with_json(
            "GET /cp/version.json",
            serde_json::json!({"hostname": "cpy-f57ce8", "web_api_version": 4}),
        );
        let host = lookup_hostname(&transport, "circuitpython.local").unwrap();
        assert_eq!(host, "cpy-f57ce8.local");

        let requests = transport.recorded_requests();
        assert_eq!(requests[0].url.as_str(), "http://circuitpython.local/cp/version.json");
        assert!(!requests[0].authenticated);
    }

    #[test]
    fn missing_hostname_is_invalid_response() {
        let transport = MockTransport::new()
            .with_json("GET /cp/version.json", serde_json::json!({"web_api_version": 4}));
        let err = lookup_hostname(&transport, "circuitpython.local").unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }
}
