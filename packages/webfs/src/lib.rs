//! # circfile-webfs
//!
//! Client for the filesystem of a CircuitPython device over its web workflow
//! REST API.
//!
//! ## REST surface
//!
//! | Method | Path | Use |
//! |---|---|---|
//! | `GET` | `/cp/version.json` | presence and compatibility check |
//! | `GET` | `/fs/<dir>/` (JSON) | directory listing and free space |
//! | `PUT` | `/fs/<path>` | write a file, or create a directory (empty body, trailing `/`) |
//! | `DELETE` | `/fs/<path>` | remove a file or a directory recursively |
//!
//! Requests authenticate with HTTP basic auth (empty user name, device
//! password). A `409 Conflict` means the device cannot write to its storage,
//! typically because a host computer has it mounted over USB.
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use circfile_webfs::{Credential, DeviceBackend, DeviceEndpoint, RemotePath, WebBackend};
//!
//! let endpoint = DeviceEndpoint::new(
//!     "cpy-f57ce8.local",
//!     Some(Credential::new("passw0rd")),
//!     Duration::from_secs(30),
//! )?;
//! let backend = WebBackend::connect(endpoint)?;
//!
//! if backend.is_device_present() {
//!     backend.upload_directory("bundle/adafruit_display_text".as_ref(), None)?;
//!     for entry in backend.list_directory(&RemotePath::library())? {
//!         println!("{}\t{}", entry.size_bytes, entry.name);
//!     }
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod listing;
pub mod mirror;
pub mod module;
pub mod path;
pub mod status;
pub mod transport;
pub mod types;

pub use backend::DeviceBackend;
pub use client::{WebBackend, MIN_WEB_API_VERSION};
pub use config::{EndpointConfig, DEFAULT_HOST, DEFAULT_TIMEOUT, PASSWORD_ENV_VAR};
pub use discovery::{discover_hostname, lookup_hostname};
pub use endpoint::{Credential, DeviceEndpoint};
pub use error::Error;
pub use listing::sort_entries;
pub use mirror::{plan_mirror, MirrorStep};
pub use module::{ModuleDescriptor, ModuleKind};
pub use path::{RemotePath, FS_ROOT, LIB_DIR};
pub use status::TransferOutcome;
pub use transport::{ReqwestTransport, Transport, MAX_RETRIES};
pub use types::{DeviceRequest, DeviceResponse, DirectoryEntry, FsListing, Method, VersionInfo};
