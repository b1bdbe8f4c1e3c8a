use crate::domain::model::{NewUser, Patient, RegisterPatientRequest, User};
use crate::domain::ports::{Collection, DocumentStore, IdentityService, ObjectStorage, Query};
use crate::utils::error::{CareError, Operation, Result};
use std::sync::Arc;

/// User accounts and patient profiles.
pub struct PatientService {
    identity: Arc<dyn IdentityService>,
    store: Arc<dyn DocumentStore>,
    files: Arc<dyn ObjectStorage>,
}

impl PatientService {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        store: Arc<dyn DocumentStore>,
        files: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            identity,
            store,
            files,
        }
    }

    /// Creates the account, or returns the existing one when the email is
    /// already registered.
    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        match self.identity.create_user(user).await {
            Ok(created) => {
                tracing::info!(user_id = %created.id, "user created");
                Ok(created)
            }
            Err(e) if e.is_conflict() => {
                tracing::warn!(email = %user.email, "user already exists, returning existing account");
                self.find_user_by_email(&user.email).await
            }
            Err(e) => Err(CareError::persistence(Operation::CreateUser, e)),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<User> {
        let list = self
            .identity
            .list_users(&[Query::equal("email", email)])
            .await
            .map_err(|e| CareError::persistence(Operation::CreateUser, e))?;

        list.users.into_iter().next().ok_or_else(|| {
            CareError::persistence(
                Operation::CreateUser,
                format!("account for {} reported as existing but not found", email),
            )
        })
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.identity
            .get_user(user_id)
            .await
            .map_err(|e| CareError::persistence(Operation::GetUser, e))
    }

    /// Uploads the identification document, if any, then stores the profile.
    pub async fn register_patient(&self, request: RegisterPatientRequest) -> Result<Patient> {
        let RegisterPatientRequest {
            profile,
            identification_document,
        } = request;

        let stored = match identification_document {
            Some(file) => {
                tracing::debug!(file_name = %file.file_name, bytes = file.bytes.len(), "uploading identification document");
                let stored = self
                    .files
                    .create_file(file)
                    .await
                    .map_err(|e| CareError::persistence(Operation::RegisterPatient, e))?;
                Some(stored)
            }
            None => None,
        };

        let mut data = serde_json::to_value(&profile)?;
        if let Some(fields) = data.as_object_mut() {
            let (id, url) = match &stored {
                Some(file) => (
                    serde_json::Value::String(file.id.clone()),
                    serde_json::Value::String(self.files.file_view_url(&file.id)),
                ),
                None => (serde_json::Value::Null, serde_json::Value::Null),
            };
            fields.insert("identificationDocumentId".to_string(), id);
            fields.insert("identificationDocumentUrl".to_string(), url);
        }

        let document = self
            .store
            .create_document(Collection::Patients, data)
            .await
            .map_err(|e| CareError::persistence(Operation::RegisterPatient, e))?;

        let patient: Patient = serde_json::from_value(document)
            .map_err(|e| CareError::persistence(Operation::RegisterPatient, e))?;
        tracing::info!(patient_id = %patient.id, user_id = %patient.profile.user_id, "patient registered");
        Ok(patient)
    }

    /// Patient profile owned by the given user.
    pub async fn get_patient(&self, user_id: &str) -> Result<Patient> {
        let list = self
            .store
            .list_documents(Collection::Patients, &[Query::equal("userId", user_id)])
            .await
            .map_err(|e| CareError::persistence(Operation::GetPatient, e))?;

        let document = list.documents.into_iter().next().ok_or_else(|| {
            CareError::persistence(
                Operation::GetPatient,
                format!("no patient registered for user {}", user_id),
            )
        })?;

        serde_json::from_value(document).map_err(|e| CareError::persistence(Operation::GetPatient, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PatientProfile, StoredFile, UploadFile};
    use crate::domain::ports::{DocumentList, UserList};
    use crate::utils::error::{ServiceError, ServiceResult};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Default)]
    struct MockIdentity {
        users: Mutex<Vec<User>>,
        fail_with_status: Option<u16>,
    }

    #[async_trait]
    impl IdentityService for MockIdentity {
        async fn create_user(&self, user: &NewUser) -> ServiceResult<User> {
            if let Some(status) = self.fail_with_status {
                return Err(ServiceError::Rejected {
                    status,
                    message: "Server Error".to_string(),
                });
            }
            let mut users = self.users.lock().await;
            if users.iter().any(|u| u.email == user.email) {
                return Err(ServiceError::Conflict {
                    message: "A user with the same id, email, or phone already exists in this project."
                        .to_string(),
                });
            }
            let created = User {
                id: format!("user-{}", users.len() + 1),
                name: user.name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
            };
            users.push(created.clone());
            Ok(created)
        }

        async fn get_user(&self, user_id: &str) -> ServiceResult<User> {
            self.users
                .lock()
                .await
                .iter()
                .find(|u| u.id == user_id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound {
                    message: "User with the requested ID could not be found.".to_string(),
                })
        }

        async fn list_users(&self, queries: &[Query]) -> ServiceResult<UserList> {
            let users = self.users.lock().await;
            let matched: Vec<User> = users
                .iter()
                .filter(|u| {
                    queries.iter().all(|q| match q {
                        Query::Equal { attribute, values } if attribute == "email" => {
                            values.iter().any(|v| v == &json!(u.email))
                        }
                        _ => true,
                    })
                })
                .cloned()
                .collect();
            Ok(UserList {
                total: matched.len() as u64,
                users: matched,
            })
        }
    }

    #[derive(Default)]
    struct MockStore {
        documents: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl DocumentStore for MockStore {
        async fn create_document(&self, _collection: Collection, data: Value) -> ServiceResult<Value> {
            let mut documents = self.documents.lock().await;
            let mut doc = data;
            doc["$id"] = json!(format!("patient-{}", documents.len() + 1));
            documents.push(doc.clone());
            Ok(doc)
        }

        async fn get_document(&self, _collection: Collection, _document_id: &str) -> ServiceResult<Value> {
            unimplemented!("not used by patient operations")
        }

        async fn update_document(
            &self,
            _collection: Collection,
            _document_id: &str,
            _patch: Value,
        ) -> ServiceResult<Option<Value>> {
            unimplemented!("not used by patient operations")
        }

        async fn list_documents(
            &self,
            _collection: Collection,
            queries: &[Query],
        ) -> ServiceResult<DocumentList> {
            let documents = self.documents.lock().await;
            let matched: Vec<Value> = documents
                .iter()
                .filter(|doc| {
                    queries.iter().all(|q| match q {
                        Query::Equal { attribute, values } => values.contains(&doc[attribute.as_str()]),
                        _ => true,
                    })
                })
                .cloned()
                .collect();
            Ok(DocumentList {
                total: matched.len() as u64,
                documents: matched,
            })
        }
    }

    #[derive(Default)]
    struct MockFiles {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStorage for MockFiles {
        async fn create_file(&self, file: UploadFile) -> ServiceResult<StoredFile> {
            let mut uploads = self.uploads.lock().await;
            uploads.push(file.file_name.clone());
            Ok(StoredFile {
                id: format!("file-{}", uploads.len()),
                name: file.file_name,
            })
        }

        fn file_view_url(&self, file_id: &str) -> String {
            format!("https://cloud.test/v1/storage/buckets/ids/files/{}/view?project=care", file_id)
        }
    }

    fn service(identity: MockIdentity) -> (PatientService, Arc<MockStore>, Arc<MockFiles>) {
        let store = Arc::new(MockStore::default());
        let files = Arc::new(MockFiles::default());
        let service = PatientService::new(Arc::new(identity), store.clone(), files.clone());
        (service, store, files)
    }

    fn jane() -> NewUser {
        NewUser {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("+15550100".to_string()),
        }
    }

    fn profile(user_id: &str) -> PatientProfile {
        PatientProfile {
            user_id: user_id.to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+15550100".to_string(),
            birth_date: None,
            gender: None,
            address: Some("14 Elm Street".to_string()),
            occupation: None,
            emergency_contact_name: None,
            emergency_contact_number: None,
            primary_physician: Some("Dr. Green".to_string()),
            insurance_provider: None,
            insurance_policy_number: None,
            allergies: None,
            current_medication: None,
            family_medical_history: None,
            past_medical_history: None,
            identification_type: Some("Passport".to_string()),
            identification_number: Some("X1234567".to_string()),
            treatment_consent: true,
            disclosure_consent: true,
            privacy_consent: true,
        }
    }

    #[tokio::test]
    async fn test_create_user_returns_created_record() {
        let (service, _, _) = service(MockIdentity::default());

        let user = assert_ok!(service.create_user(&jane()).await);
        assert_eq!(user.id, "user-1");
        assert_eq!(user.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_create_user_conflict_returns_existing_account() {
        let (service, _, _) = service(MockIdentity::default());
        let first = service.create_user(&jane()).await.unwrap();

        let again = assert_ok!(service.create_user(&jane()).await);
        assert_eq!(again, first);
    }

    #[tokio::test]
    async fn test_create_user_other_failures_propagate() {
        let (service, _, _) = service(MockIdentity {
            fail_with_status: Some(500),
            ..MockIdentity::default()
        });

        let err = assert_err!(service.create_user(&jane()).await);
        assert!(matches!(
            err,
            CareError::Persistence {
                operation: Operation::CreateUser,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let (service, _, _) = service(MockIdentity::default());

        let err = assert_err!(service.get_user("missing").await);
        assert!(err.to_string().contains("could not be found"));
    }

    #[tokio::test]
    async fn test_register_patient_with_document() {
        let (service, _, files) = service(MockIdentity::default());

        let patient = service
            .register_patient(RegisterPatientRequest {
                profile: profile("user-1"),
                identification_document: Some(UploadFile {
                    file_name: "passport.png".to_string(),
                    bytes: vec![0x89, 0x50, 0x4e, 0x47],
                }),
            })
            .await
            .unwrap();

        assert_eq!(patient.identification_document_id.as_deref(), Some("file-1"));
        assert_eq!(
            patient.identification_document_url.as_deref(),
            Some("https://cloud.test/v1/storage/buckets/ids/files/file-1/view?project=care")
        );
        assert_eq!(files.uploads.lock().await.as_slice(), ["passport.png".to_string()]);
    }

    #[tokio::test]
    async fn test_register_patient_without_document_stores_nulls() {
        let (service, store, files) = service(MockIdentity::default());

        let patient = service
            .register_patient(RegisterPatientRequest {
                profile: profile("user-2"),
                identification_document: None,
            })
            .await
            .unwrap();

        assert_eq!(patient.identification_document_id, None);
        assert!(files.uploads.lock().await.is_empty());
        let documents = store.documents.lock().await;
        assert_eq!(documents[0]["identificationDocumentId"], Value::Null);
        assert_eq!(documents[0]["identificationDocumentUrl"], Value::Null);
    }

    #[tokio::test]
    async fn test_get_patient_by_user() {
        let (service, _, _) = service(MockIdentity::default());
        for user_id in ["user-1", "user-2"] {
            service
                .register_patient(RegisterPatientRequest {
                    profile: profile(user_id),
                    identification_document: None,
                })
                .await
                .unwrap();
        }

        let patient = service.get_patient("user-2").await.unwrap();
        assert_eq!(patient.id, "patient-2");
        assert_eq!(patient.profile.address.as_deref(), Some("14 Elm Street"));

        let err = assert_err!(service.get_patient("user-3").await);
        assert!(err.to_string().starts_with("Error in fetching patient"));
    }
}
