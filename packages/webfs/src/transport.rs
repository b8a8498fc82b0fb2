//! Request execution.
//!
//! [`Transport`] is the seam between the filesystem client and the network,
//! so tests can substitute a recording mock.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, ACCEPT};

use crate::endpoint::Credential;
use crate::error::Error;
use crate::types::{DeviceRequest, DeviceResponse};

/// Retry ceiling for transport-level connection failures
pub const MAX_RETRIES: u32 = 5;

/// Trait for executing device requests.
///
/// Implementations return every HTTP response they receive, whatever its
/// status; classifying statuses is up to the caller.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &DeviceRequest) -> Result<DeviceResponse, Error>;
}

/// Blocking reqwest session shared by all requests to one device.
pub struct ReqwestTransport {
    client: Client,
    credential: Option<Credential>,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, credential: Credential) -> Result<Self, Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            credential: Some(credential),
        })
    }

    /// Session without a password, for public endpoints only
    pub fn anonymous(timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            credential: None,
        })
    }

    fn build(&self, request: &DeviceRequest) -> reqwest::blocking::RequestBuilder {
        let method: http::Method = request.method.into();
        let mut builder = self.client.request(method, request.url.clone());

        if request.accept_json {
            builder = builder.header(ACCEPT, HeaderValue::from_static("application/json"));
        }

        if request.authenticated {
            if let Some(credential) = &self.credential {
                builder = builder.basic_auth("", Some(credential.expose()));
            }
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        builder
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &DeviceRequest) -> Result<DeviceResponse, Error> {
        let response = retry_connect(
            || self.build(request).send(),
            reqwest::Error::is_connect,
            |attempt, err| {
                tracing::warn!(
                    method = %request.method,
                    url = %request.url,
                    attempt,
                    "connection failed, retrying: {}",
                    err
                );
            },
        )?;

        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();

        Ok(DeviceResponse::new(status, body))
    }
}

/// Run `send` once, then again for each failure `is_retryable` accepts,
/// at most [`MAX_RETRIES`] more times. Other failures return immediately.
fn retry_connect<R, E>(
    mut send: impl FnMut() -> Result<R, E>,
    is_retryable: impl Fn(&E) -> bool,
    mut on_retry: impl FnMut(u32, &E),
) -> Result<R, E> {
    let mut attempt = 0;
    loop {
        match send() {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) && attempt < MAX_RETRIES => {
                attempt += 1;
                on_retry(attempt, &err);
            }
            Err(err) => return Err(err),
        }
    }
}

/// Mock transport for testing.
///
/// Returns predefined responses keyed by `"<METHOD> <url path>"`.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// A mock transport that records requests and returns canned responses.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        responses: Arc<Mutex<HashMap<String, DeviceResponse>>>,
        recorded_requests: Arc<Mutex<Vec<DeviceRequest>>>,
    }

    fn key(request: &DeviceRequest) -> String {
        format!("{} {}", request.method, request.url.path())
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Respond to `"<METHOD> <path>"`, e.g. `"PUT /fs/lib/pkg/"`.
        pub fn with_response(self, key: impl Into<String>, response: DeviceResponse) -> Self {
            self.responses.lock().unwrap().insert(key.into(), response);
            self
        }

        pub fn with_json(self, key: impl Into<String>, body: serde_json::Value) -> Self {
            self.with_response(key, DeviceResponse::new(200, body.to_string()))
        }

        pub fn recorded_requests(&self) -> Vec<DeviceRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }

        /// Recorded requests as `"<METHOD> <path>"` strings
        pub fn recorded_keys(&self) -> Vec<String> {
            self.recorded_requests().iter().map(key).collect()
        }
    }

    impl Transport for MockTransport {
        fn execute(&self, request: &DeviceRequest) -> Result<DeviceResponse, Error> {
            self.recorded_requests.lock().unwrap().push(request.clone());

            if let Some(response) = self.responses.lock().unwrap().get(&key(request)) {
                return Ok(response.clone());
            }

            // Writes succeed by default, reads of unknown paths are missing.
            Ok(match request.method {
                crate::types::Method::GET => DeviceResponse::new(404, "Not Found"),
                _ => DeviceResponse::new(204, Vec::new()),
            })
        }
    }
}
