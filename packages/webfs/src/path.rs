//! Canonical remote paths.
//!
//! Every path on the device lives under the `fs/` prefix of the web workflow
//! API. Directory paths render with a trailing `/`, file paths never do.
//! Paths are stored as segments, so joining is idempotent and never produces
//! doubled separators.

use std::fmt;

use url::Url;

use crate::error::Error;

/// Fixed filesystem prefix of the web workflow API
pub const FS_ROOT: &str = "fs";

/// Default install location for libraries, relative to [`FS_ROOT`]
pub const LIB_DIR: &str = "lib";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath {
    segments: Vec<String>,
    directory: bool,
}

fn split(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
}

impl RemotePath {
    fn under_root(path: &str, directory: bool) -> Self {
        let segments = std::iter::once(FS_ROOT.to_string())
            .chain(split(path))
            .collect::<Vec<_>>();
        // The filesystem root itself is always a directory.
        let directory = directory || segments.len() == 1;
        Self {
            segments,
            directory,
        }
    }

    /// `fs/`
    pub fn root() -> Self {
        Self::under_root("", true)
    }

    /// `fs/lib/`
    pub fn library() -> Self {
        Self::dir(LIB_DIR)
    }

    /// Directory under `fs/`, e.g. `dir("lib/adafruit_bus_device")`
    pub fn dir(path: &str) -> Self {
        Self::under_root(path, true)
    }

    /// File under `fs/`, e.g. `file("code.py")`
    pub fn file(path: &str) -> Self {
        Self::under_root(path, false)
    }

    /// Parse user input: a trailing `/` (or an empty path) denotes a directory
    pub fn parse(path: &str) -> Self {
        Self::under_root(path, path.is_empty() || path.ends_with('/'))
    }

    /// Install target directory: the library directory when no destination is
    /// given, otherwise the destination under `fs/`
    pub fn destination(destination: Option<&str>) -> Self {
        match destination {
            None => Self::library(),
            Some(dest) => Self::dir(dest),
        }
    }

    /// Append a directory (which may itself contain `/`)
    pub fn join_dir(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split(name));
        Self {
            segments,
            directory: true,
        }
    }

    /// Append a file name
    pub fn join_file(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split(name));
        Self {
            directory: segments.len() == 1,
            segments,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.directory
    }

    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Final segment, `None` for the filesystem root
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.segments.last().map(String::as_str)
        }
    }

    /// Same location, rendered as a directory
    pub fn into_dir(mut self) -> Self {
        self.directory = true;
        self
    }

    /// Resolve against a device base URL, percent-encoding each segment.
    ///
    /// `..` segments are rejected: the URL would otherwise name a different
    /// location than this path renders as.
    pub fn to_url(&self, base: &Url) -> Result<Url, Error> {
        if self.segments.iter().any(|s| s == "..") {
            return Err(Error::InvalidUrl {
                message: format!("{}: parent directory segments are not allowed", self),
            });
        }

        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| Error::InvalidUrl {
                message: format!("{} cannot be a base URL", base),
            })?;
            path.clear();
            path.extend(&self.segments);
            if self.directory {
                path.push("");
            }
        }
        Ok(url)
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))?;
        if self.directory {
            f.write_str("/")?;
        }
        Ok(())
    }
}
