//! Errors raised while creating or writing virtual input devices

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    /// The virtual-input subsystem refused to create the device
    #[error("Failed to open virtual device '{device}': {reason}")]
    OpenError { device: String, reason: String },

    /// An event could not be delivered to an open device
    #[error("Failed to write {what} to '{device}': {reason}")]
    WriteError {
        device: String,
        what: &'static str,
        reason: String,
    },

    #[error("Failed to close virtual device '{device}': {reason}")]
    CloseError { device: String, reason: String },
}
