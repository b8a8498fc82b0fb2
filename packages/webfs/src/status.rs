//! Classification of device responses.
//!
//! The web workflow answers `409 Conflict` when the filesystem is mounted
//! read-only on the device side (usually because a host computer has it
//! mounted over USB). That condition is terminal for the current operation
//! and is never retried.

use std::fmt::Display;

use crate::error::Error;
use crate::types::DeviceResponse;

pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;

/// Semantic outcome of one device response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success,
    /// Device storage is not writable from the device's perspective
    WriteConflict,
    NotFound,
    Failure { status: u16, message: String },
}

impl TransferOutcome {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            200..=299 => TransferOutcome::Success,
            STATUS_CONFLICT => TransferOutcome::WriteConflict,
            STATUS_NOT_FOUND => TransferOutcome::NotFound,
            _ => TransferOutcome::Failure {
                status,
                message: message.into(),
            },
        }
    }

    pub fn classify(response: &DeviceResponse) -> Self {
        Self::from_status(response.status, response.status_text.as_str())
    }

    /// Convert into the error taxonomy, naming the path the request targeted.
    pub fn into_result(self, path: impl Display) -> Result<(), Error> {
        match self {
            TransferOutcome::Success => Ok(()),
            TransferOutcome::WriteConflict => Err(Error::NotWritable {
                path: path.to_string(),
            }),
            TransferOutcome::NotFound => Err(Error::NotFound {
                path: path.to_string(),
            }),
            TransferOutcome::Failure { status, message } => Err(Error::Http {
                status,
                message,
                path: path.to_string(),
            }),
        }
    }
}
