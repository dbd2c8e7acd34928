use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading an asset.
///
/// Every variant is fatal to the `read_asset` call that produced it: the load is abandoned and
/// no partial [`crate::Model`] is returned.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("The asset document is malformed: {0}")]
    AssetFormatError(String),
    #[error("Unable to find referenced file {0:?}")]
    AssetNotFoundError(PathBuf),
    #[error("Element {index} is out of range for an accessor with {count} elements")]
    RangeError { index: usize, count: usize },
    #[error("Byte range {start}..{end} is out of range for a buffer window of {len} bytes")]
    ByteRangeError { start: usize, end: usize, len: usize },
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ContentError {
    /// Convenience constructor for [`ContentError::AssetFormatError`]
    pub fn format(message: impl Into<String>) -> Self {
        ContentError::AssetFormatError(message.into())
    }

    /// Was this error caused by a malformed document?
    pub fn is_format_error(&self) -> bool {
        matches!(self, ContentError::AssetFormatError(_) | ContentError::Json(_))
    }

    /// Was this error caused by an element or byte range falling outside its buffer?
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            ContentError::RangeError { .. } | ContentError::ByteRangeError { .. }
        )
    }

    /// Was this error caused by a missing external file?
    pub fn is_not_found_error(&self) -> bool {
        matches!(self, ContentError::AssetNotFoundError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_error_classes() {
        assert!(ContentError::format("missing key").is_format_error());
        assert!(ContentError::RangeError { index: 3, count: 3 }.is_range_error());
        assert!(ContentError::ByteRangeError {
            start: 0,
            end: 12,
            len: 8
        }
        .is_range_error());
        assert!(ContentError::AssetNotFoundError("shader.glsl".into()).is_not_found_error());
        assert!(!ContentError::format("missing key").is_range_error());
    }
}
