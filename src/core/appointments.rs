use crate::core::lifecycle::{resolve_status, summarize_statuses};
use crate::domain::model::{
    ActionType, Appointment, CreateAppointmentRequest, RecentAppointments, Status, StoredStatus,
    UpdateAppointmentRequest,
};
use crate::domain::ports::{Collection, DocumentStore, Query};
use crate::utils::error::{CareError, Operation, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Payload written to the appointments collection on booking.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewAppointment<'a> {
    user_id: &'a str,
    patient: &'a str,
    primary_physician: &'a str,
    schedule: DateTime<Utc>,
    reason: &'a str,
    status: Status,
    note: Option<&'a str>,
}

/// Books, reschedules and cancels appointments against the document store.
pub struct AppointmentService {
    store: Arc<dyn DocumentStore>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: &CreateAppointmentRequest) -> Result<Appointment> {
        let payload = NewAppointment {
            user_id: &request.user_id,
            patient: &request.patient,
            primary_physician: &request.primary_physician,
            schedule: request.schedule,
            reason: &request.reason,
            status: resolve_status(ActionType::Create),
            note: request.note.as_deref(),
        };
        let data = serde_json::to_value(&payload)?;

        tracing::debug!(user_id = %request.user_id, "creating appointment");
        let document = self
            .store
            .create_document(Collection::Appointments, data)
            .await
            .map_err(|e| CareError::persistence(Operation::CreateAppointment, e))?;

        let appointment = decode(Operation::CreateAppointment, document)?;
        tracing::info!(appointment_id = %appointment.id, "appointment requested");
        Ok(appointment)
    }

    pub async fn update(&self, request: &UpdateAppointmentRequest) -> Result<Appointment> {
        let mut patch = request.appointment.clone();
        patch.status = Some(resolve_status(request.action));

        if request.action == ActionType::Cancel
            && patch
                .cancellation_reason
                .as_deref()
                .map_or(true, |reason| reason.trim().is_empty())
        {
            tracing::warn!(
                appointment_id = %request.appointment_id,
                "cancelling appointment without a cancellation reason"
            );
        }

        let data = serde_json::to_value(&patch)?;
        tracing::debug!(
            appointment_id = %request.appointment_id,
            user_id = %request.user_id,
            action = ?request.action,
            "updating appointment"
        );

        let document = self
            .store
            .update_document(Collection::Appointments, &request.appointment_id, data)
            .await
            .map_err(|e| CareError::persistence(Operation::UpdateAppointment, e))?
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                CareError::persistence(
                    Operation::UpdateAppointment,
                    format!("store returned no document for {}", request.appointment_id),
                )
            })?;

        let appointment = decode(Operation::UpdateAppointment, document)?;
        tracing::info!(
            appointment_id = %appointment.id,
            status = ?appointment.status,
            "appointment updated"
        );
        Ok(appointment)
    }

    pub async fn get(&self, appointment_id: &str) -> Result<Appointment> {
        let document = self
            .store
            .get_document(Collection::Appointments, appointment_id)
            .await
            .map_err(|e| CareError::persistence(Operation::GetAppointment, e))?;

        decode(Operation::GetAppointment, document)
    }

    /// Latest appointments first, with per-status counts.
    pub async fn recent(&self) -> Result<RecentAppointments> {
        let list = self
            .store
            .list_documents(Collection::Appointments, &[Query::order_desc("$createdAt")])
            .await
            .map_err(|e| CareError::persistence(Operation::ListAppointments, e))?;

        // undecodable records still count
        let statuses: Vec<StoredStatus> =
            list.documents.iter().map(StoredStatus::from_document).collect();
        let summary = summarize_statuses(&statuses, list.total);

        let documents: Vec<Appointment> = list
            .documents
            .into_iter()
            .filter_map(|doc| {
                let id = doc.get("$id").cloned().unwrap_or_default();
                match decode(Operation::ListAppointments, doc) {
                    Ok(appointment) => Some(appointment),
                    Err(e) => {
                        tracing::warn!(document_id = %id, error = %e, "skipping malformed appointment");
                        None
                    }
                }
            })
            .collect();
        tracing::debug!(
            total = summary.total_count,
            fetched = documents.len(),
            "appointment list summarized"
        );

        Ok(RecentAppointments { summary, documents })
    }
}

fn decode(operation: Operation, document: serde_json::Value) -> Result<Appointment> {
    serde_json::from_value(document).map_err(|e| CareError::persistence(operation, e))
}
