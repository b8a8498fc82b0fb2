//! Web workflow implementation of [`DeviceBackend`].
//!
//! Every operation is a strict sequence of blocking requests over one shared
//! session. Conflicts (409) and other HTTP failures abort the operation at the
//! step where they occur; nothing already applied on the device is rolled
//! back.

use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::DeviceBackend;
use crate::endpoint::DeviceEndpoint;
use crate::error::Error;
use crate::listing::sort_entries;
use crate::mirror::{plan_mirror, MirrorStep};
use crate::module::local_name;
use crate::path::RemotePath;
use crate::status::TransferOutcome;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{DeviceRequest, DeviceResponse, DirectoryEntry, FsListing, VersionInfo};

/// Oldest web API version with the filesystem endpoints this client uses
pub const MIN_WEB_API_VERSION: u64 = 4;

/// Remote filesystem client for one device.
pub struct WebBackend<T = ReqwestTransport> {
    endpoint: DeviceEndpoint,
    transport: T,
}

impl WebBackend<ReqwestTransport> {
    /// Open a session to the device described by `endpoint`.
    pub fn connect(endpoint: DeviceEndpoint) -> Result<Self, Error> {
        let transport = ReqwestTransport::new(endpoint.timeout(), endpoint.credential().clone())?;
        Ok(Self {
            endpoint,
            transport,
        })
    }
}

impl<T: Transport> WebBackend<T> {
    pub fn with_transport(endpoint: DeviceEndpoint, transport: T) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    fn send(&self, request: &DeviceRequest) -> Result<DeviceResponse, Error> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "received response"
        );
        Ok(response)
    }

    /// `PUT` a file body, or create a directory when `body` is `None`.
    fn put(&self, target: &RemotePath, body: Option<Vec<u8>>) -> Result<(), Error> {
        let mut request = DeviceRequest::put(self.endpoint.url_for(target)?);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        let response = self.send(&request)?;
        TransferOutcome::classify(&response).into_result(target)
    }

    fn listing(&self, dir: &RemotePath) -> Result<FsListing, Error> {
        let url = self.endpoint.url_for(dir)?;
        let response = self.send(&DeviceRequest::get(url).accepting_json())?;
        TransferOutcome::classify(&response).into_result(dir)?;
        Ok(response.json()?)
    }

    /// Read the device's `cp/version.json`.
    pub fn version_info(&self) -> Result<VersionInfo, Error> {
        let url = self.endpoint.version_url()?;
        let response = self.send(&DeviceRequest::get(url.clone()))?;
        TransferOutcome::classify(&response).into_result(url.path())?;
        Ok(response.json()?)
    }

    fn execute_mirror(&self, steps: &[MirrorStep]) -> Result<(), Error> {
        for (completed, step) in steps.iter().enumerate() {
            let result = match step {
                MirrorStep::CreateDirectory(target) => self.put(target, None),
                MirrorStep::PutFile { source, target } => fs::read(source)
                    .map_err(|err| Error::io(source, err))
                    .and_then(|body| self.put(target, Some(body))),
            };

            if let Err(err) = result {
                tracing::error!(
                    completed,
                    total = steps.len(),
                    "mirror aborted at {}: {}",
                    step.target(),
                    err
                );
                return Err(err);
            }
        }
        Ok(())
    }
}

impl<T: Transport> DeviceBackend for WebBackend<T> {
    fn upload_file(&self, source: &Path, destination: Option<&str>) -> Result<RemotePath, Error> {
        let target = RemotePath::destination(destination).join_file(&local_name(source)?);
        let body = fs::read(source).map_err(|err| Error::io(source, err))?;
        let size = body.len();

        self.put(&target, Some(body))?;
        tracing::info!("uploaded {} ({} bytes) to {}", source.display(), size, target);
        Ok(target)
    }

    fn upload_directory(
        &self,
        source: &Path,
        destination: Option<&str>,
    ) -> Result<RemotePath, Error> {
        let target = RemotePath::destination(destination).join_dir(&local_name(source)?);
        let steps = plan_mirror(source, &target)?;

        self.execute_mirror(&steps)?;
        tracing::info!(
            steps = steps.len(),
            "uploaded {} to {}",
            source.display(),
            target
        );
        Ok(target)
    }

    fn download_file(
        &self,
        remote: &RemotePath,
        local_dir: Option<&Path>,
    ) -> Result<PathBuf, Error> {
        let file_name = match remote.file_name() {
            Some(name) if !remote.is_dir() => name,
            _ => {
                return Err(Error::InvalidUrl {
                    message: format!("{} does not name a file", remote),
                })
            }
        };

        let url = self.endpoint.url_for(remote)?;
        let response = self.send(&DeviceRequest::get(url))?;
        if let Err(err) = TransferOutcome::classify(&response).into_result(remote) {
            if let Error::NotFound { .. } = err {
                tracing::warn!("{} was not found on the device", remote);
            }
            return Err(err);
        }

        let dir = match local_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().map_err(|err| Error::io(".", err))?,
        };
        let destination = dir.join(file_name);
        fs::write(&destination, &response.body).map_err(|err| Error::io(&destination, err))?;

        tracing::info!("downloaded {} to {}", remote, destination.display());
        Ok(destination)
    }

    fn delete_path(&self, remote: &RemotePath) -> Result<(), Error> {
        let url = self.endpoint.url_for(remote)?;
        let response = self.send(&DeviceRequest::delete(url))?;
        TransferOutcome::classify(&response).into_result(remote)?;
        tracing::info!("deleted {}", remote);
        Ok(())
    }

    fn make_directory(&self, remote: &RemotePath) -> Result<(), Error> {
        self.put(&remote.clone().into_dir(), None)
    }

    fn list_directory(&self, remote: &RemotePath) -> Result<Vec<DirectoryEntry>, Error> {
        let listing = self.listing(&remote.clone().into_dir())?;
        Ok(sort_entries(listing.files))
    }

    fn free_space_bytes(&self) -> Result<u64, Error> {
        let root = RemotePath::root();
        let listing = self.listing(&root)?;

        let free = listing.free.ok_or_else(|| {
            tracing::error!("Unable to get free block count from device.");
            Error::InvalidResponse {
                message: "missing free block count".to_string(),
            }
        })?;
        let block_size = listing.block_size.ok_or_else(|| {
            tracing::error!("Unable to get block size from device.");
            Error::InvalidResponse {
                message: "missing block size".to_string(),
            }
        })?;
        if listing.writable != Some(true) {
            tracing::error!("device filesystem is not writable");
            return Err(Error::NotWritable {
                path: root.to_string(),
            });
        }

        free.checked_mul(block_size)
            .ok_or_else(|| Error::InvalidResponse {
                message: format!("free space overflows: {} blocks of {}", free, block_size),
            })
    }

    fn is_device_present(&self) -> bool {
        let info = match self.version_info() {
            Ok(info) => info,
            Err(err) => {
                tracing::debug!("device at {} not present: {}", self.endpoint.base_url(), err);
                return false;
            }
        };

        match info.web_api_version {
            None => {
                tracing::error!("Unable to get web API version from device.");
                false
            }
            Some(version) if version < MIN_WEB_API_VERSION => {
                tracing::error!(
                    "Device running unsupported web API version {} < {}.",
                    version,
                    MIN_WEB_API_VERSION
                );
                false
            }
            Some(_) => true,
        }
    }

    fn file_exists(&self, remote: &RemotePath) -> Result<bool, Error> {
        let url = self.endpoint.url_for(remote)?;
        let response = self.send(&DeviceRequest::get(url))?;
        Ok(response.status == 200)
    }

    fn canonical_path_for(&self, name: &str) -> RemotePath {
        RemotePath::file(name)
    }
}
