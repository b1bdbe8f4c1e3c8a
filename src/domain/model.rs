use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Appointment status as stored in the appointments collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Scheduled,
    Cancelled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Scheduled => "scheduled",
            Status::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status value read back from the store.
///
/// The store does not enforce the enumeration, so anything outside of it
/// (other strings, `null`, a missing field, numbers) is kept verbatim instead
/// of failing the whole read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoredStatus {
    Known(Status),
    Unrecognized(Value),
}

impl StoredStatus {
    pub fn known(&self) -> Option<Status> {
        match self {
            StoredStatus::Known(status) => Some(*status),
            StoredStatus::Unrecognized(_) => None,
        }
    }

    /// Reads the `status` attribute of a raw document.
    pub fn from_document(document: &Value) -> Self {
        document
            .get("status")
            .cloned()
            .map(StoredStatus::from)
            .unwrap_or_default()
    }
}

impl Default for StoredStatus {
    fn default() -> Self {
        StoredStatus::Unrecognized(Value::Null)
    }
}

impl From<Value> for StoredStatus {
    fn from(raw: Value) -> Self {
        match serde_json::from_value::<Status>(raw.clone()) {
            Ok(status) => StoredStatus::Known(status),
            Err(_) => StoredStatus::Unrecognized(raw),
        }
    }
}

impl<'de> Deserialize<'de> for StoredStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(StoredStatus::from(Value::deserialize(deserializer)?))
    }
}

impl From<Status> for StoredStatus {
    fn from(status: Status) -> Self {
        StoredStatus::Known(status)
    }
}

/// Action requested from the appointment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Create,
    Schedule,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown appointment action: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for ActionType {
    type Err = UnknownAction;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "create" => Ok(ActionType::Create),
            "schedule" => Ok(ActionType::Schedule),
            "cancel" => Ok(ActionType::Cancel),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Patient reference on an appointment. The store returns either the bare
/// document id, the expanded patient document, or a partial relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatientRef {
    Id(String),
    Expanded(Box<Patient>),
    Partial(Value),
}

impl Default for PatientRef {
    fn default() -> Self {
        PatientRef::Partial(Value::Null)
    }
}

impl PatientRef {
    /// Empty when the relation carries no id.
    pub fn id(&self) -> &str {
        match self {
            PatientRef::Id(id) => id,
            PatientRef::Expanded(patient) => &patient.id,
            PatientRef::Partial(raw) => raw.get("$id").and_then(Value::as_str).unwrap_or(""),
        }
    }
}

/// `null` reads as the default value.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_id: String,
    #[serde(default)]
    pub patient: PatientRef,
    #[serde(default, deserialize_with = "nullable")]
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    #[serde(default)]
    pub status: StoredStatus,
    #[serde(default, deserialize_with = "nullable")]
    pub reason: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Booking request coming from the intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub user_id: String,
    pub patient: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_physician: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub user_id: String,
    pub appointment_id: String,
    pub appointment: AppointmentPatch,
    #[serde(rename = "type")]
    pub action: ActionType,
}

/// Per-status counts over the appointments collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub total_count: u64,
    pub scheduled_count: u64,
    pub pending_count: u64,
    pub cancelled_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentAppointments {
    #[serde(flatten)]
    pub summary: AppointmentSummary,
    pub documents: Vec<Appointment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Registration form fields for a patient profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_number: Option<String>,
    #[serde(default)]
    pub primary_physician: Option<String>,
    #[serde(default)]
    pub insurance_provider: Option<String>,
    #[serde(default)]
    pub insurance_policy_number: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub current_medication: Option<String>,
    #[serde(default)]
    pub family_medical_history: Option<String>,
    #[serde(default)]
    pub past_medical_history: Option<String>,
    #[serde(default)]
    pub identification_type: Option<String>,
    #[serde(default)]
    pub identification_number: Option<String>,
    #[serde(default)]
    pub treatment_consent: bool,
    #[serde(default)]
    pub disclosure_consent: bool,
    #[serde(default)]
    pub privacy_consent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(flatten)]
    pub profile: PatientProfile,
    #[serde(default)]
    pub identification_document_id: Option<String>,
    #[serde(default)]
    pub identification_document_url: Option<String>,
}

/// Identification document attached to a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterPatientRequest {
    pub profile: PatientProfile,
    pub identification_document: Option<UploadFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}
