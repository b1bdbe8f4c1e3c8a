use care_intake::config::{CliConfig, Command};
use care_intake::domain::model::{
    ActionType, AppointmentPatch, CreateAppointmentRequest, NewUser, PatientProfile,
    RegisterPatientRequest, UpdateAppointmentRequest, UploadFile,
};
use care_intake::domain::ports::ConfigProvider;
use care_intake::utils::error::ErrorSeverity;
use care_intake::utils::{logger, validation::Validate};
use care_intake::{CareError, CareServices, HttpBackend, TomlConfig};
use clap::Parser;
use serde_json::Value;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting care-intake CLI");

    let outcome = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            match TomlConfig::from_file(path) {
                Ok(config) => run(config, cli.command.clone()).await,
                Err(e) => Err(e),
            }
        }
        None => run(cli.connection.clone(), cli.command.clone()).await,
    };

    match outcome {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

async fn run<C>(config: C, command: Command) -> care_intake::Result<Value>
where
    C: ConfigProvider + Validate + 'static,
{
    // 驗證配置
    config.validate()?;
    tracing::debug!("Backend endpoint: {}", config.endpoint());

    let backend = Arc::new(HttpBackend::new(config)?);
    let services = CareServices::from_backend(backend);

    execute(&services, command).await
}

async fn execute(services: &CareServices, command: Command) -> care_intake::Result<Value> {
    let output = match command {
        Command::CreateUser { name, email, phone } => {
            let user = services
                .patients
                .create_user(&NewUser { name, email, phone })
                .await?;
            serde_json::to_value(user)?
        }
        Command::GetUser { user_id } => serde_json::to_value(services.patients.get_user(&user_id).await?)?,
        Command::RegisterPatient {
            profile,
            id_document,
        } => {
            let profile: PatientProfile = serde_json::from_str(&std::fs::read_to_string(&profile)?)?;
            let identification_document = match id_document {
                Some(path) => Some(UploadFile {
                    file_name: path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "identification".to_string()),
                    bytes: std::fs::read(&path)?,
                }),
                None => None,
            };
            let patient = services
                .patients
                .register_patient(RegisterPatientRequest {
                    profile,
                    identification_document,
                })
                .await?;
            serde_json::to_value(patient)?
        }
        Command::GetPatient { user_id } => {
            serde_json::to_value(services.patients.get_patient(&user_id).await?)?
        }
        Command::Book {
            user_id,
            patient,
            physician,
            schedule,
            reason,
            note,
        } => {
            let request = CreateAppointmentRequest {
                user_id,
                patient,
                primary_physician: physician,
                schedule,
                reason,
                note,
            };
            serde_json::to_value(services.appointments.create(&request).await?)?
        }
        Command::Schedule {
            appointment_id,
            user_id,
            physician,
            schedule,
        } => {
            let request = UpdateAppointmentRequest {
                user_id,
                appointment_id,
                appointment: AppointmentPatch {
                    primary_physician: physician,
                    schedule,
                    ..AppointmentPatch::default()
                },
                action: ActionType::Schedule,
            };
            serde_json::to_value(services.appointments.update(&request).await?)?
        }
        Command::Cancel {
            appointment_id,
            user_id,
            reason,
        } => {
            let request = UpdateAppointmentRequest {
                user_id,
                appointment_id,
                appointment: AppointmentPatch {
                    cancellation_reason: reason,
                    ..AppointmentPatch::default()
                },
                action: ActionType::Cancel,
            };
            serde_json::to_value(services.appointments.update(&request).await?)?
        }
        Command::GetAppointment { appointment_id } => {
            serde_json::to_value(services.appointments.get(&appointment_id).await?)?
        }
        Command::Recent => serde_json::to_value(services.appointments.recent().await?)?,
    };

    Ok(output)
}

fn exit_with(e: CareError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ care-intake failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
