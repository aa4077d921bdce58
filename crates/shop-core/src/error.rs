use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the shop tools.
#[derive(Error, Debug)]
pub enum ShopError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The daily log file for the requested group/date does not exist.
    #[error("Log file not found: {0}")]
    LogFileNotFound(PathBuf),

    /// No `.txt` log files were found under the given directory.
    #[error("No log files found in {0}")]
    NoLogFiles(PathBuf),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A CSV sheet could not be written.
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A price rule overlaps the size range or has inverted bounds.
    #[error("Invalid price rule: {0}")]
    InvalidPriceRule(String),

    /// Two feature vectors of different length were compared.
    #[error("Feature dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// No precomputed features exist for an image.
    #[error("No features for image: {0}")]
    MissingFeatures(String),

    /// No prototype could be compared with an image's features.
    #[error("No comparable prototype for {0}")]
    NoPrototypeMatch(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the shop crates.
pub type Result<T> = std::result::Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ShopError::FileRead {
            path: PathBuf::from("/logs/Ventas_55/2024-01-05.txt"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("2024-01-05.txt"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_display_log_file_not_found() {
        let err = ShopError::LogFileNotFound(PathBuf::from("/logs/g/2024-01-05.txt"));
        assert_eq!(err.to_string(), "Log file not found: /logs/g/2024-01-05.txt");
    }

    #[test]
    fn test_error_display_no_log_files() {
        let err = ShopError::NoLogFiles(PathBuf::from("/logs/empty"));
        assert_eq!(err.to_string(), "No log files found in /logs/empty");
    }

    #[test]
    fn test_error_display_invalid_price_rule() {
        let err = ShopError::InvalidPriceRule("lower bound 40 overlaps sizes".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid price rule: lower bound 40 overlaps sizes"
        );
    }

    #[test]
    fn test_error_display_dimension_mismatch() {
        let err = ShopError::DimensionMismatch {
            expected: 1280,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "Feature dimension mismatch: expected 1280, found 3"
        );
    }

    #[test]
    fn test_error_display_no_prototype_match() {
        let err = ShopError::NoPrototypeMatch("zapato.jpg".to_string());
        assert_eq!(err.to_string(), "No comparable prototype for zapato.jpg");
    }

    #[test]
    fn test_error_display_config() {
        let err = ShopError::Config("alpha must be within [0, 1]".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: alpha must be within [0, 1]"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ShopError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ShopError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
