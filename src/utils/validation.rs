use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CareError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CareError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_required(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CareError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    if value.contains("${") {
        return Err(CareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "environment variable was not set".to_string(),
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
        return Err(CareError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Checks every setting the HTTP backend needs before a client is built.
pub fn validate_backend_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("endpoint", config.endpoint())?;
    validate_required("project_id", config.project_id())?;
    validate_required("api_key", config.api_key())?;
    validate_required("database_id", config.database_id())?;
    validate_required("appointment_collection_id", config.appointment_collection_id())?;
    validate_required("patient_collection_id", config.patient_collection_id())?;
    validate_required("bucket_id", config.bucket_id())?;

    if let Some(timeout) = config.request_timeout_seconds() {
        validate_range("request_timeout_seconds", timeout, 1, 300)?;
    }

    Ok(())
}
