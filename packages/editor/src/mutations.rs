//! # Remote Mutations
//!
//! The contract with the remote data layer. The editor only looks at whether
//! a call resolved or rejected; on a successful save the result payload is
//! merged into the committed snapshot as a JSON merge patch (RFC 7396).

use crate::RemoteError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Effectful operations a session can submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Save,
    Delete,
    ImportFile,
}

impl Operation {
    /// Save and delete close the editor once confirmed
    pub fn exits_on_success(self) -> bool {
        matches!(self, Operation::Save | Operation::Delete)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Save => "save",
            Operation::Delete => "delete",
            Operation::ImportFile => "importFile",
        }
    }
}

/// A file handed over by the import input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// What gets sent to the remote collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteRequest {
    pub operation: Operation,
    pub payload: Value,

    /// Only set for [`Operation::ImportFile`]
    #[serde(skip)]
    pub file: Option<ImportFile>,
}

impl RemoteRequest {
    pub fn new(operation: Operation, payload: Value) -> Self {
        Self {
            operation,
            payload,
            file: None,
        }
    }

    pub fn import(file: ImportFile) -> Self {
        Self {
            operation: Operation::ImportFile,
            payload: serde_json::json!({ "file": { "name": file.name, "size": file.contents.len() } }),
            file: Some(file),
        }
    }
}

/// Remote data layer (query/mutation transport)
#[async_trait]
pub trait MutationRemote: Send + Sync {
    /// Execute a mutation, resolving with its result payload
    async fn execute(&self, request: RemoteRequest) -> Result<Value, RemoteError>;
}

/// Apply `patch` onto `target` following RFC 7396
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }

    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// Merge a save result into the snapshot that was submitted.
///
/// Anything but an object payload, or a payload that would not produce a
/// valid snapshot, leaves the submitted snapshot as is.
pub fn merge_result<S>(submitted: &S, payload: &Value) -> S
where
    S: Clone + Serialize + DeserializeOwned,
{
    if !payload.is_object() {
        return submitted.clone();
    }

    let mut merged = match serde_json::to_value(submitted) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Could not serialize submitted snapshot - ignoring result payload");
            return submitted.clone();
        }
    };
    merge_patch(&mut merged, payload);

    match serde_json::from_value(merged) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "Result payload does not fit the snapshot - keeping submitted value");
            submitted.clone()
        }
    }
}
