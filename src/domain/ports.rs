use crate::domain::model::{NewUser, StoredFile, UploadFile, User};
use crate::utils::error::ServiceResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Document collections the application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Appointments,
    Patients,
}

/// List filter/ordering understood by the identity service and document store.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal { attribute: String, values: Vec<Value> },
    OrderDesc(String),
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc(attribute.into())
    }

    /// JSON form sent as a `queries[]` parameter.
    pub fn to_query_string(&self) -> String {
        let value = match self {
            Query::Equal { attribute, values } => serde_json::json!({
                "method": "equal",
                "attribute": attribute,
                "values": values,
            }),
            Query::OrderDesc(attribute) => serde_json::json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
        };
        value.to_string()
    }
}

/// One page of documents plus the size of the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentList {
    pub total: u64,
    #[serde(default)]
    pub documents: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserList {
    pub total: u64,
    #[serde(default)]
    pub users: Vec<User>,
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> ServiceResult<User>;
    async fn get_user(&self, user_id: &str) -> ServiceResult<User>;
    async fn list_users(&self, queries: &[Query]) -> ServiceResult<UserList>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The store assigns a fresh id on every call.
    async fn create_document(&self, collection: Collection, data: Value) -> ServiceResult<Value>;
    async fn get_document(&self, collection: Collection, document_id: &str) -> ServiceResult<Value>;
    /// `None` when the store acknowledged the write but returned nothing.
    async fn update_document(
        &self,
        collection: Collection,
        document_id: &str,
        patch: Value,
    ) -> ServiceResult<Option<Value>>;
    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> ServiceResult<DocumentList>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn create_file(&self, file: UploadFile) -> ServiceResult<StoredFile>;
    fn file_view_url(&self, file_id: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn project_id(&self) -> &str;
    fn api_key(&self) -> &str;
    fn database_id(&self) -> &str;
    fn appointment_collection_id(&self) -> &str;
    fn patient_collection_id(&self) -> &str;
    fn bucket_id(&self) -> &str;
    fn request_timeout_seconds(&self) -> Option<u64>;
}
