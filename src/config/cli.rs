use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_backend_config, Validate};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "care-intake")]
#[command(about = "Patient intake and appointment booking against a hosted backend")]
pub struct CliConfig {
    /// TOML configuration file; overrides the connection flags
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    #[arg(long, env = "ENDPOINT", default_value = "https://cloud.appwrite.io/v1")]
    pub endpoint: String,

    #[arg(long, env = "PROJECT_ID", default_value = "")]
    pub project_id: String,

    #[arg(long, env = "API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "DATABASE_ID", default_value = "")]
    pub database_id: String,

    #[arg(long, env = "APPOINTMENT_COLLECTION_ID", default_value = "")]
    pub appointment_collection_id: String,

    #[arg(long, env = "PATIENT_COLLECTION_ID", default_value = "")]
    pub patient_collection_id: String,

    #[arg(long, env = "BUCKET_ID", default_value = "")]
    pub bucket_id: String,

    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS")]
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an account, or return the existing one for the email
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },
    GetUser {
        user_id: String,
    },
    /// Register a patient profile read from a JSON file
    RegisterPatient {
        #[arg(long)]
        profile: PathBuf,
        #[arg(long)]
        id_document: Option<PathBuf>,
    },
    GetPatient {
        user_id: String,
    },
    /// Request a new appointment (always pending)
    Book {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        patient: String,
        #[arg(long)]
        physician: String,
        /// RFC 3339 timestamp, e.g. 2026-11-02T09:30:00Z
        #[arg(long)]
        schedule: DateTime<Utc>,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        note: Option<String>,
    },
    Schedule {
        appointment_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        physician: Option<String>,
        #[arg(long)]
        schedule: Option<DateTime<Utc>>,
    },
    Cancel {
        appointment_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    GetAppointment {
        appointment_id: String,
    },
    /// Latest appointments with per-status counts
    Recent,
}

impl ConfigProvider for ConnectionArgs {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn database_id(&self) -> &str {
        &self.database_id
    }

    fn appointment_collection_id(&self) -> &str {
        &self.appointment_collection_id
    }

    fn patient_collection_id(&self) -> &str {
        &self.patient_collection_id
    }

    fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.request_timeout_seconds
    }
}

impl Validate for ConnectionArgs {
    fn validate(&self) -> Result<()> {
        validate_backend_config(self)
    }
}
