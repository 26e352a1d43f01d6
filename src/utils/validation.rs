use crate::utils::error::{AnalysisError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const OUTPUT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AnalysisError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension) => Ok(()),
        Some(extension) => Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(AnalysisError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for format in formats {
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(AnalysisError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OUTPUT_FORMATS.join(", ")
                ),
            });
        }
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Checks a `[lo, hi]` pair read from config.
pub fn validate_ordered_pair<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    lo: T,
    hi: T,
) -> Result<()> {
    if lo > hi {
        return Err(AnalysisError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("[{}, {}]", lo, hi),
            reason: "Lower bound must not exceed upper bound".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.catalog", "https://example.com/pdg.json").is_ok());
        assert!(validate_url("source.catalog", "http://example.com").is_ok());
        assert!(validate_url("source.catalog", "").is_err());
        assert!(validate_url("source.catalog", "invalid-url").is_err());
        assert!(validate_url("source.catalog", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("prediction_limit", 5, 1).is_ok());
        assert!(validate_positive_number("prediction_limit", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("catalog", "pdg.csv", &["csv", "json"]).is_ok());
        assert!(validate_file_extension("catalog", "pdg.json", &["csv", "json"]).is_ok());
        assert!(validate_file_extension("catalog", "pdg.txt", &["csv", "json"]).is_err());
        assert!(validate_file_extension("catalog", "pdg", &["csv", "json"]).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let ok = vec!["csv".to_string(), "json".to_string()];
        assert!(validate_output_formats("formats", &ok).is_ok());

        let bad = vec!["xlsx".to_string()];
        assert!(validate_output_formats("formats", &bad).is_err());
        assert!(validate_output_formats("formats", &[]).is_err());
    }

    #[test]
    fn test_validate_ordered_pair() {
        assert!(validate_ordered_pair("predictions.a", -32, -28).is_ok());
        assert!(validate_ordered_pair("predictions.a", -28, -28).is_ok());
        assert!(validate_ordered_pair("predictions.a", -20, -28).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("fit.error_threshold_pct", 5.0, 0.0, 100.0).is_ok());
        assert!(validate_range("fit.error_threshold_pct", 150.0, 0.0, 100.0).is_err());
    }
}
