//! Capability interface for device filesystem access.
//!
//! [`WebBackend`](crate::WebBackend) is the implementation for the web
//! workflow. Other transports (e.g. a serial connection) implement the same
//! trait rather than being special-cased by callers.

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::module::ModuleDescriptor;
use crate::path::RemotePath;
use crate::types::DirectoryEntry;

pub trait DeviceBackend {
    /// Upload one file into `destination` (library directory when `None`).
    /// Returns the remote path written.
    fn upload_file(&self, source: &Path, destination: Option<&str>) -> Result<RemotePath, Error>;

    /// Mirror a local directory tree into `destination` (library directory
    /// when `None`). Returns the remote directory created.
    ///
    /// Not atomic: a failing step leaves every earlier step applied.
    fn upload_directory(
        &self,
        source: &Path,
        destination: Option<&str>,
    ) -> Result<RemotePath, Error>;

    /// Upload a file or a directory, whichever `source` is.
    fn upload(&self, source: &Path, destination: Option<&str>) -> Result<RemotePath, Error> {
        if source.is_dir() {
            self.upload_directory(source, destination)
        } else {
            self.upload_file(source, destination)
        }
    }

    /// Download a remote file into `local_dir` (current directory when
    /// `None`), keeping its name. Returns the local path written.
    fn download_file(&self, remote: &RemotePath, local_dir: Option<&Path>)
        -> Result<PathBuf, Error>;

    /// Delete a file, or a directory recursively.
    fn delete_path(&self, remote: &RemotePath) -> Result<(), Error>;

    fn make_directory(&self, remote: &RemotePath) -> Result<(), Error>;

    /// Replace a module on the device with its bundle copy.
    ///
    /// Packages are deleted first and then uploaded again. The two steps are
    /// not atomic: if the upload fails the package is left missing.
    fn update_module(&self, module: &ModuleDescriptor) -> Result<(), Error> {
        let destination = module.destination.as_deref();
        if module.is_file() {
            self.upload_file(&module.bundle_path, destination)?;
        } else {
            self.delete_path(&module.device_path)?;
            self.upload_directory(&module.bundle_path, destination)?;
        }
        Ok(())
    }

    /// Entries of a remote directory in canonical order
    /// (see [`sort_entries`](crate::sort_entries)).
    fn list_directory(&self, remote: &RemotePath) -> Result<Vec<DirectoryEntry>, Error>;

    fn free_space_bytes(&self) -> Result<u64, Error>;

    /// Whether a compatible device answers. Never fails.
    fn is_device_present(&self) -> bool;

    fn file_exists(&self, remote: &RemotePath) -> Result<bool, Error>;

    /// Full device path for a name relative to the filesystem root.
    fn canonical_path_for(&self, name: &str) -> RemotePath;
}
