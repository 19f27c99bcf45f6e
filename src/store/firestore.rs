//! Cloud Firestore backend over the REST API.
//!
//! Documents live at
//! `projects/{project}/databases/{database}/documents/{collection}/{id}`.
//! Field values use Firestore's typed encoding, so every document is
//! translated to and from plain JSON through `encode_value` / `decode_value`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{DocumentStore, REPORTS_COLLECTION, StoreError, TASKS_COLLECTION};
use crate::models::{DailyReport, Task};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirestoreConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database: default_database(),
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub struct FirestoreStore {
    agent: ureq::Agent,
    documents_url: String,
    api_key: Option<String>,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Result<Self, StoreError> {
        let project = config.project_id.trim();
        if project.is_empty() {
            return Err(StoreError::Config(
                "firestore.project_id is empty; set it in config.toml".to_string(),
            ));
        }

        let agent = ureq::AgentBuilder::new().build();

        Ok(Self {
            agent,
            documents_url: format!(
                "{}/projects/{}/databases/{}/documents",
                config.base_url.trim_end_matches('/'),
                project,
                config.database
            ),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    fn with_key(&self, request: ureq::Request) -> ureq::Request {
        match &self.api_key {
            Some(key) => request.query("key", key),
            None => request,
        }
    }

    fn get_document<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        let url = self.document_url(collection, id);
        let request = self.with_key(self.agent.get(&url));

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(e) => return Err(map_ureq_error(e)),
        };

        let document: Value = response
            .into_json()
            .map_err(|e| StoreError::Network(format!("Failed to read response: {}", e)))?;
        let plain = decode_document(&document)?;
        Ok(Some(serde_json::from_value(plain)?))
    }

    fn put_document<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        data: &T,
    ) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let body = encode_document(&serde_json::to_value(data)?)?;
        // PATCH without an update mask replaces the whole document
        self.with_key(self.agent.request("PATCH", &url))
            .send_json(body)
            .map_err(map_ureq_error)?;
        Ok(())
    }
}

impl DocumentStore for FirestoreStore {
    fn query_tasks_by_date(&self, date: &str) -> Result<Vec<Task>, StoreError> {
        let url = format!("{}:runQuery", self.documents_url);
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": TASKS_COLLECTION }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "date" },
                        "op": "EQUAL",
                        "value": { "stringValue": date }
                    }
                }
            }
        });

        let rows: Vec<Value> = self
            .with_key(self.agent.post(&url))
            .send_json(body)
            .map_err(map_ureq_error)?
            .into_json()
            .map_err(|e| StoreError::Network(format!("Failed to read response: {}", e)))?;

        // Rows without a `document` only carry a read time (empty result)
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(|doc| -> Result<Task, StoreError> {
                Ok(serde_json::from_value(decode_document(doc)?)?)
            })
            .collect()
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        self.get_document(TASKS_COLLECTION, id)
    }

    fn set_task(&self, task: &Task) -> Result<(), StoreError> {
        self.put_document(TASKS_COLLECTION, &task.id, task)
    }

    fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(TASKS_COLLECTION, id);
        self.with_key(self.agent.delete(&url))
            .call()
            .map_err(map_ureq_error)?;
        Ok(())
    }

    fn get_report(&self, date: &str) -> Result<Option<DailyReport>, StoreError> {
        self.get_document(REPORTS_COLLECTION, date)
    }

    fn set_report(&self, report: &DailyReport) -> Result<(), StoreError> {
        self.put_document(REPORTS_COLLECTION, &report.date, report)
    }
}

fn map_ureq_error(error: ureq::Error) -> StoreError {
    match error {
        ureq::Error::Status(status, response) => {
            let message = response
                .into_string()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            StoreError::Api { status, message }
        }
        ureq::Error::Transport(transport) => StoreError::Network(transport.to_string()),
    }
}

/// Wrap a JSON object as a Firestore document body (`{"fields": {...}}`)
pub fn encode_document(data: &Value) -> Result<Value, StoreError> {
    match data {
        Value::Object(map) => Ok(json!({ "fields": encode_fields(map) })),
        other => Err(StoreError::Decode(format!(
            "documents must be JSON objects, got {}",
            other
        ))),
    }
}

fn encode_fields(map: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = map
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(fields)
}

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // int64 travels as a decimal string
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Turn a Firestore document (`{"name", "fields", ...}`) into a plain JSON object
pub fn decode_document(document: &Value) -> Result<Value, StoreError> {
    match document.get("fields") {
        Some(Value::Object(fields)) => decode_fields(fields),
        Some(other) => Err(StoreError::Decode(format!("`fields` is not an object: {}", other))),
        None => Ok(Value::Object(Map::new())),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Value, StoreError> {
    let mut out = Map::new();
    for (key, value) in fields {
        out.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(out))
}

pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let Value::Object(typed) = value else {
        return Err(StoreError::Decode(format!("expected typed value, got {}", value)));
    };
    let Some((kind, inner)) = typed.iter().next() else {
        return Err(StoreError::Decode("empty typed value".to_string()));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| StoreError::Decode(format!("bad integerValue '{}': {}", s, e))),
            Value::Number(_) => Ok(inner.clone()),
            other => Err(StoreError::Decode(format!("bad integerValue {}", other))),
        },
        "arrayValue" => {
            let items = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            Ok(Value::Array(items))
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields),
            _ => Ok(Value::Object(Map::new())),
        },
        other => Err(StoreError::Decode(format!("unsupported value type `{}`", other))),
    }
}
