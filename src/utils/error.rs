use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Catalog request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Particle '{name}' has non-positive mass {mass_gev} GeV")]
    InvalidMass { name: String, mass_gev: f64 },

    #[error("Reference particle '{name}' is missing from the catalog or massless")]
    MissingReference { name: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnalysisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::ConfigError { .. }
            | AnalysisError::ConfigValidationError { .. }
            | AnalysisError::InvalidConfigValueError { .. }
            | AnalysisError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AnalysisError::HttpError(_) => ErrorCategory::Network,
            AnalysisError::ZipError(_)
            | AnalysisError::IoError(_)
            | AnalysisError::DatabaseError(_)
            | AnalysisError::UnsupportedSchemaVersion { .. } => ErrorCategory::Storage,
            AnalysisError::CsvError(_)
            | AnalysisError::SerializationError(_)
            | AnalysisError::ValidationError { .. }
            | AnalysisError::ProcessingError { .. }
            | AnalysisError::InvalidMass { .. }
            | AnalysisError::MissingReference { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AnalysisError::HttpError(_) => ErrorSeverity::Medium,
            AnalysisError::IoError(_)
            | AnalysisError::ZipError(_)
            | AnalysisError::DatabaseError(_)
            | AnalysisError::UnsupportedSchemaVersion { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command-line flags or the TOML file against the documented options"
            }
            ErrorCategory::Network => {
                "Check that the catalog URL is reachable, or use --catalog builtin"
            }
            ErrorCategory::Storage => {
                "Check file permissions and free space for the output path and database"
            }
            ErrorCategory::Data => match self {
                AnalysisError::MissingReference { .. } => {
                    "Add the reference particle to the catalog or pick another with --reference"
                }
                AnalysisError::InvalidMass { .. } => {
                    "Only particles with a positive mass can be fitted"
                }
                _ => "Check the catalog and coefficient files for malformed rows",
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not fetch the particle catalog: {}", self),
            ErrorCategory::Storage => format!("Could not read or write data: {}", self),
            ErrorCategory::Data => format!("Analysis failed: {}", self),
        }
    }

    /// Process exit code used by the binaries.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = AnalysisError::MissingConfigError {
            field: "source.catalog".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("source.catalog"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = AnalysisError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_missing_reference_suggestion() {
        let err = AnalysisError::MissingReference {
            name: "electron".to_string(),
        };
        assert!(err.recovery_suggestion().contains("--reference"));
    }
}
