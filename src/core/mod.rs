pub mod appointments;
pub mod lifecycle;
pub mod patients;

use crate::domain::ports::{DocumentStore, IdentityService, ObjectStorage};
use std::sync::Arc;

pub use appointments::AppointmentService;
pub use patients::PatientService;

/// Services wired to a single backend that provides every port.
pub struct CareServices {
    pub appointments: AppointmentService,
    pub patients: PatientService,
}

impl CareServices {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: IdentityService + DocumentStore + ObjectStorage + 'static,
    {
        Self {
            appointments: AppointmentService::new(backend.clone()),
            patients: PatientService::new(backend.clone(), backend.clone(), backend),
        }
    }
}
