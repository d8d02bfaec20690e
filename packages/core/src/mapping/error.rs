//! Mapping Error Types

use crate::utils::DeviceRole;
use thiserror::Error;

/// Errors raised while mapping a document onto graph entities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A device record lacks a field its role requires
    #[error("{role} device is missing required field '{field}'")]
    MissingDeviceField {
        role: DeviceRole,
        field: &'static str,
    },
}

impl MappingError {
    /// Create a missing device field error
    pub fn missing_device_field(role: DeviceRole, field: &'static str) -> Self {
        Self::MissingDeviceField { role, field }
    }
}
