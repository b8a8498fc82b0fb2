//! Library modules installed on the device from a local bundle.

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::path::RemotePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Single `.py`/`.mpy` file
    File,
    /// Directory package
    Package,
}

/// A module to (re)install: where its bundle copy lives locally and where it
/// lives on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub kind: ModuleKind,
    pub bundle_path: PathBuf,
    pub device_path: RemotePath,
    /// Install directory under `fs/`; `None` means the library directory
    pub destination: Option<String>,
}

impl ModuleDescriptor {
    /// Describe the bundle entry at `bundle_path`, installed into the library
    /// directory. The kind is taken from the local filesystem.
    pub fn from_bundle_path(bundle_path: impl Into<PathBuf>) -> Result<Self, Error> {
        let bundle_path = bundle_path.into();
        let metadata =
            std::fs::metadata(&bundle_path).map_err(|err| Error::io(&bundle_path, err))?;
        let kind = if metadata.is_dir() {
            ModuleKind::Package
        } else {
            ModuleKind::File
        };
        let name = local_name(&bundle_path)?;
        let device_path = device_path_for(&name, kind, None);

        Ok(Self {
            name,
            kind,
            bundle_path,
            device_path,
            destination: None,
        })
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        let destination = destination.into();
        self.device_path = device_path_for(&self.name, self.kind, Some(&destination));
        self.destination = Some(destination);
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == ModuleKind::File
    }
}

fn device_path_for(name: &str, kind: ModuleKind, destination: Option<&str>) -> RemotePath {
    let parent = RemotePath::destination(destination);
    match kind {
        ModuleKind::File => parent.join_file(name),
        ModuleKind::Package => parent.join_dir(name),
    }
}

/// Final component of a local path, resolving `.` and trailing separators.
pub(crate) fn local_name(path: &Path) -> Result<String, Error> {
    let name = match path.file_name() {
        Some(name) => name.to_owned(),
        None => path
            .canonicalize()
            .map_err(|err| Error::io(path, err))?
            .file_name()
            .map(|name| name.to_owned())
            .ok_or_else(|| Error::InvalidLocalPath {
                path: path.to_path_buf(),
                message: "path has no final component".to_string(),
            })?,
    };

    name.into_string().map_err(|_| Error::InvalidLocalPath {
        path: path.to_path_buf(),
        message: "file name is not valid UTF-8".to_string(),
    })
}
