//! Scan provider error types and handling

use crate::core::SourceKind;
use crate::validation::error::DetectionError;
use thiserror::Error;

/// Errors a device scan provider may report
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// The platform has no API for this radio
    #[error("{0} scanning is not supported on this platform")]
    Unsupported(SourceKind),
    /// The OS refused access to the radio
    #[error("permission denied for {0} scanning")]
    PermissionDenied(SourceKind),
    /// The scan started but failed
    #[error("{kind} scan failed: {reason}")]
    Failed { kind: SourceKind, reason: String },
}

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    pub fn kind(&self) -> SourceKind {
        match self {
            ScanError::Unsupported(kind) | ScanError::PermissionDenied(kind) => *kind,
            ScanError::Failed { kind, .. } => *kind,
        }
    }
}

impl From<ScanError> for DetectionError {
    fn from(error: ScanError) -> Self {
        DetectionError::UnsupportedCapability {
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::error::Recovery;

    #[test]
    fn test_scan_error_maps_to_unsupported_capability() {
        let err: DetectionError = ScanError::PermissionDenied(SourceKind::Bluetooth).into();
        match &err {
            DetectionError::UnsupportedCapability { kind, reason } => {
                assert_eq!(*kind, SourceKind::Bluetooth);
                assert!(reason.contains("permission denied"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.recovery(), Recovery::SyntheticFallback);
    }
}
