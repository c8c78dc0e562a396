//! Error types for the form builder.
//!
//! Per-field problems during fill, flatten or materialization are not
//! represented here: those are logged and the field is skipped.

/// Result type alias for form builder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while placing fields or processing PDFs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error raised by the underlying PDF library
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Structurally invalid PDF (missing catalog, no pages, ...)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Field configuration could not be imported
    #[error("Invalid field configuration: {0}")]
    InvalidConfig(String),

    /// No field with the given id
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Placement rejected because it would overlap another field
    #[error("Field {id} would overlap another field on page {page}")]
    Overlap {
        /// Id of the field being placed or moved
        id: String,
        /// 1-based page number
        page: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_error_message() {
        let err = Error::Overlap {
            id: "abc".to_string(),
            page: 2,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("abc"));
        assert!(msg.contains("page 2"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(format!("{}", err).starts_with("JSON error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let err: Error = io_err.into();
        assert!(format!("{}", err).contains("missing.pdf"));
    }
}
