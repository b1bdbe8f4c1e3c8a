use crate::domain::model::{NewUser, StoredFile, UploadFile, User};
use crate::domain::ports::{
    Collection, ConfigProvider, DocumentList, DocumentStore, IdentityService, ObjectStorage, Query,
    UserList,
};
use crate::utils::error::{CareError, Result, ServiceError, ServiceResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Server-side token asking the backend to generate a fresh id.
const UNIQUE_ID: &str = "unique()";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// REST client for the hosted backend. Implements the identity, document
/// store and object storage ports.
pub struct HttpBackend<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> HttpBackend<C> {
    pub fn new(config: C) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("x-appwrite-project", header_value("project_id", config.project_id())?);
        headers.insert("x-appwrite-key", header_value("api_key", config.api_key())?);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(seconds) = config.request_timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().map_err(|e| CareError::ConfigError {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint().trim_end_matches('/'), path)
    }

    fn documents_path(&self, collection: Collection) -> String {
        let collection_id = match collection {
            Collection::Appointments => self.config.appointment_collection_id(),
            Collection::Patients => self.config.patient_collection_id(),
        };
        format!(
            "/databases/{}/collections/{}/documents",
            self.config.database_id(),
            collection_id
        )
    }

    fn with_queries(request: RequestBuilder, queries: &[Query]) -> RequestBuilder {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_query_string()))
            .collect();
        request.query(&params)
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| CareError::InvalidConfigValueError {
        field: field.to_string(),
        value: String::new(),
        reason: format!("not a valid header value: {}", e),
    })
}

/// Sends the request and returns the JSON body, `None` for an empty or `null` body.
async fn send(request: RequestBuilder) -> ServiceResult<Option<Value>> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    tracing::debug!("Backend response status: {}", status);

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body.clone()
                }
            });
        return Err(match status {
            StatusCode::CONFLICT => ServiceError::Conflict { message },
            StatusCode::NOT_FOUND => ServiceError::NotFound { message },
            other => ServiceError::Rejected {
                status: other.as_u16(),
                message,
            },
        });
    }

    if body.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(&body)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ServiceResult<T> {
    let value = send(request).await?.ok_or(ServiceError::EmptyBody)?;
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl<C: ConfigProvider> IdentityService for HttpBackend<C> {
    async fn create_user(&self, user: &NewUser) -> ServiceResult<User> {
        let mut body = json!({
            "userId": UNIQUE_ID,
            "email": user.email,
            "name": user.name,
        });
        if let Some(phone) = &user.phone {
            body["phone"] = json!(phone);
        }

        tracing::debug!("POST {}", self.url("/users"));
        send_json(self.client.post(self.url("/users")).json(&body)).await
    }

    async fn get_user(&self, user_id: &str) -> ServiceResult<User> {
        let url = self.url(&format!("/users/{}", user_id));
        tracing::debug!("GET {}", url);
        send_json(self.client.get(url)).await
    }

    async fn list_users(&self, queries: &[Query]) -> ServiceResult<UserList> {
        let url = self.url("/users");
        tracing::debug!("GET {} ({} queries)", url, queries.len());
        send_json(Self::with_queries(self.client.get(url), queries)).await
    }
}

#[async_trait]
impl<C: ConfigProvider> DocumentStore for HttpBackend<C> {
    async fn create_document(&self, collection: Collection, data: Value) -> ServiceResult<Value> {
        let url = self.url(&self.documents_path(collection));
        let body = json!({
            "documentId": UNIQUE_ID,
            "data": data,
        });

        tracing::debug!("POST {}", url);
        send_json(self.client.post(url).json(&body)).await
    }

    async fn get_document(&self, collection: Collection, document_id: &str) -> ServiceResult<Value> {
        let url = self.url(&format!("{}/{}", self.documents_path(collection), document_id));
        tracing::debug!("GET {}", url);
        send_json(self.client.get(url)).await
    }

    async fn update_document(
        &self,
        collection: Collection,
        document_id: &str,
        patch: Value,
    ) -> ServiceResult<Option<Value>> {
        let url = self.url(&format!("{}/{}", self.documents_path(collection), document_id));
        tracing::debug!("PATCH {}", url);
        send(self.client.patch(url).json(&json!({ "data": patch }))).await
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> ServiceResult<DocumentList> {
        let url = self.url(&self.documents_path(collection));
        tracing::debug!("GET {} ({} queries)", url, queries.len());
        send_json(Self::with_queries(self.client.get(url), queries)).await
    }
}

#[async_trait]
impl<C: ConfigProvider> ObjectStorage for HttpBackend<C> {
    async fn create_file(&self, file: UploadFile) -> ServiceResult<StoredFile> {
        let url = self.url(&format!("/storage/buckets/{}/files", self.config.bucket_id()));
        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new().text("fileId", UNIQUE_ID).part("file", part);

        tracing::debug!("POST {} (multipart)", url);
        let request = self.client.post(url).multipart(form);
        send_json(request).await
    }

    fn file_view_url(&self, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.config.endpoint().trim_end_matches('/'),
            self.config.bucket_id(),
            file_id,
            self.config.project_id()
        )
    }
}
