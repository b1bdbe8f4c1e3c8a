pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};
pub use crate::config::TomlConfig;

pub use crate::adapters::HttpBackend;
pub use crate::core::lifecycle::{resolve_status, resolve_status_name, summarize};
pub use crate::core::{AppointmentService, CareServices, PatientService};
pub use crate::utils::error::{CareError, Result};
