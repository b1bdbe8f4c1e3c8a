use std::fmt;
use thiserror::Error;

/// Failure reported by an external collaborator (identity, document store,
/// object storage). Produced only by adapters.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("empty response body")]
    EmptyBody,
}

impl ServiceError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Conflict { .. })
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// The remote operation a persistence failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateAppointment,
    UpdateAppointment,
    GetAppointment,
    ListAppointments,
    CreateUser,
    GetUser,
    RegisterPatient,
    GetPatient,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CreateAppointment => "creating appointment",
            Operation::UpdateAppointment => "updating appointment",
            Operation::GetAppointment => "fetching appointment",
            Operation::ListAppointments => "fetching appointment list",
            Operation::CreateUser => "creating user",
            Operation::GetUser => "fetching user",
            Operation::RegisterPatient => "registering patient",
            Operation::GetPatient => "fetching patient",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CareError {
    #[error("Error in {operation}: {message}")]
    Persistence { operation: Operation, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Persistence,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CareError {
    pub fn persistence(operation: Operation, source: impl fmt::Display) -> Self {
        CareError::Persistence {
            operation,
            message: source.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CareError::Persistence { .. } => ErrorCategory::Persistence,
            CareError::ConfigError { .. }
            | CareError::MissingConfigError { .. }
            | CareError::InvalidConfigValueError { .. }
            | CareError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            CareError::IoError(_) | CareError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Persistence => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CareError::Persistence { operation, message } => {
                format!("The backend could not complete {}: {}", operation, message)
            }
            CareError::MissingConfigError { field } => {
                format!("Setting '{}' is required", field)
            }
            CareError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Persistence => {
                "Check the backend endpoint, project id and API key, then try again"
            }
            ErrorCategory::Configuration => {
                "Fix the configuration file or the corresponding environment variable"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, CareError>;
