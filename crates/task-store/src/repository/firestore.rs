//! Firestore Repository Implementation
//!
//! `TaskRepository` over the Cloud Firestore REST API (v1). Works in the
//! browser through reqwest's fetch backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::TaskRepository;
use crate::config::StoreConfig;
use crate::domain::{DomainError, DomainResult, Task, TaskId};

const FIELD_NAME: &str = "name";
const FIELD_COMPLETED: &str = "completed";
const FIELD_DATE_COMPLETED: &str = "dateCompleted";

// ========================
// Wire Types
// ========================

/// A typed Firestore value (only the kinds a task uses)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Value {
    NullValue(()),
    BooleanValue(bool),
    StringValue(String),
    TimestampValue(DateTime<Utc>),
}

/// A Firestore document; unknown field kinds are kept raw and ignored
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Encode the stored fields of a task
pub(crate) fn encode_task(task: &Task) -> DomainResult<Document> {
    let date = match task.date_completed {
        Some(date) => Value::TimestampValue(date),
        None => Value::NullValue(()),
    };

    let mut fields = BTreeMap::new();
    fields.insert(FIELD_NAME.to_string(), serde_json::to_value(Value::StringValue(task.name.clone()))?);
    fields.insert(FIELD_COMPLETED.to_string(), serde_json::to_value(Value::BooleanValue(task.completed))?);
    fields.insert(FIELD_DATE_COMPLETED.to_string(), serde_json::to_value(date)?);

    Ok(Document { name: None, fields })
}

/// Decode a document into a task; the id is the last segment of its name
pub(crate) fn decode_document(doc: &Document) -> DomainResult<Task> {
    let id = doc
        .name
        .as_deref()
        .and_then(document_id)
        .ok_or_else(|| DomainError::Decode("document without a name".to_string()))?;

    let name = match field(doc, FIELD_NAME) {
        Some(Value::StringValue(name)) => name,
        _ => String::new(),
    };
    let completed = matches!(field(doc, FIELD_COMPLETED), Some(Value::BooleanValue(true)));
    let date_completed = match field(doc, FIELD_DATE_COMPLETED) {
        Some(Value::TimestampValue(date)) => Some(date),
        _ => None,
    };

    Ok(Task::persisted(id, name, completed, date_completed))
}

fn field(doc: &Document, key: &str) -> Option<Value> {
    doc.fields
        .get(key)
        .and_then(|raw| serde_json::from_value(raw.clone()).ok())
}

/// `projects/p/databases/d/documents/tasks/abc` -> `abc`
pub(crate) fn document_id(name: &str) -> Option<TaskId> {
    name.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(TaskId::new)
}

// ========================
// Repository
// ========================

/// Firestore-backed task collection
pub struct FirestoreRepository {
    client: Client,
    collection_url: String,
    api_key: Option<String>,
    id_token: Option<String>,
    page_size: u32,
}

impl FirestoreRepository {
    pub fn from_config(config: &StoreConfig) -> DomainResult<Self> {
        let project = config
            .project_id
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| DomainError::Config("firestore backend requires projectId".to_string()))?;

        let collection_url = format!(
            "{}/projects/{}/databases/{}/documents/{}",
            config.base_url.trim_end_matches('/'),
            project,
            config.database,
            config.collection
        );

        Ok(Self {
            client: Client::new(),
            collection_url,
            api_key: config.api_key.clone(),
            id_token: config.id_token.clone(),
            page_size: config.page_size.max(1),
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    pub(crate) fn document_url(&self, id: &TaskId) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    /// Query pairs for an update: a field mask plus an existence precondition
    pub(crate) fn update_query() -> Vec<(&'static str, &'static str)> {
        vec![
            ("updateMask.fieldPaths", FIELD_NAME),
            ("updateMask.fieldPaths", FIELD_COMPLETED),
            ("updateMask.fieldPaths", FIELD_DATE_COMPLETED),
            ("currentDocument.exists", "true"),
        ]
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        };
        match &self.id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> DomainResult<Response> {
        let response = self.authorize(request).send().await?;
        check_status(response).await
    }
}

/// Turn a non-2xx response into a `DomainError` carrying Firestore's message
async fn check_status(response: Response) -> DomainResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        Err(DomainError::NotFound(message))
    } else {
        Err(DomainError::Remote { status: status.as_u16(), message })
    }
}

#[async_trait(?Send)]
impl TaskRepository for FirestoreRepository {
    async fn list(&self) -> DomainResult<Vec<Task>> {
        let mut tasks = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&self.collection_url)
                .query(&[("pageSize", self.page_size.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: ListResponse = self.send(request).await?.json().await?;
            for doc in &page.documents {
                tasks.push(decode_document(doc)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(count = tasks.len(), "listed firestore documents");
        Ok(tasks)
    }

    async fn create(&self, task: &Task) -> DomainResult<TaskId> {
        let body = encode_task(task)?;
        let request = self.client.post(&self.collection_url).json(&body);
        let created: Document = self.send(request).await?.json().await?;

        created
            .name
            .as_deref()
            .and_then(document_id)
            .ok_or_else(|| DomainError::Decode("created document has no name".to_string()))
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        let id = task
            .id
            .as_ref()
            .ok_or_else(|| DomainError::InvalidInput("cannot update a task without an id".to_string()))?;

        let body = encode_task(task)?;
        let request = self
            .client
            .patch(self.document_url(id))
            .query(&Self::update_query())
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> DomainResult<()> {
        let request = self.client.delete(self.document_url(id));
        self.send(request).await?;
        Ok(())
    }
}
