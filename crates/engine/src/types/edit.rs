//! Editor protocol request and response envelopes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;
use crate::serde_helpers::deserialize_id_list;

/// Editor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    /// Insert new documents.
    Create,
    /// Update existing documents.
    Edit,
    /// Delete documents.
    Remove,
}

impl EditAction {
    /// Returns the protocol name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditAction::Create => "create",
            EditAction::Edit => "edit",
            EditAction::Remove => "remove",
        }
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditAction {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "create" => Ok(EditAction::Create),
            "edit" => Ok(EditAction::Edit),
            "remove" => Ok(EditAction::Remove),
            "" => Err(RequestError::MissingAction),
            other => Err(RequestError::UnsupportedAction {
                action: other.to_string(),
            }),
        }
    }
}

/// The editor payload exactly as the client sends it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditPayload {
    /// `create`, `edit` or `remove`.
    #[serde(default)]
    pub action: Option<String>,
    /// Row key to field mapping.
    #[serde(default)]
    pub data: Option<Value>,
    /// Target ids, as a comma-separated string or an array.
    #[serde(default, deserialize_with = "deserialize_id_list")]
    pub ids: Option<Vec<String>>,
}

/// A validated editor request.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    /// The action to perform.
    pub action: EditAction,
    /// Target document ids in request order; empty for create.
    pub target_ids: Vec<String>,
    /// Per-row field mappings, keyed by row id (or `"0"` for create).
    pub data: Map<String, Value>,
}

impl EditRequest {
    /// Validates a client payload.
    ///
    /// Ids come from the payload's `ids`, then from `extra_ids` (the
    /// out-of-band id list), then from the keys of `data` for edit and remove.
    pub fn from_payload(
        payload: EditPayload,
        extra_ids: Option<Vec<String>>,
    ) -> Result<Self, RequestError> {
        let action: EditAction = payload
            .action
            .as_deref()
            .ok_or(RequestError::MissingAction)?
            .parse()?;

        let data = match payload.data {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(RequestError::malformed(format!(
                    "data must be an object, got {}",
                    json_kind(&other)
                )));
            }
        };

        if action != EditAction::Remove {
            if let Some((key, _)) = data.iter().find(|(_, v)| !v.is_object()) {
                return Err(RequestError::malformed(format!(
                    "data entry '{}' must be an object",
                    key
                )));
            }
        }

        let target_ids = match action {
            EditAction::Create => Vec::new(),
            EditAction::Edit | EditAction::Remove => payload
                .ids
                .filter(|ids| !ids.is_empty())
                .or(extra_ids.filter(|ids| !ids.is_empty()))
                .unwrap_or_else(|| data.keys().cloned().collect()),
        };

        match action {
            EditAction::Create if data.is_empty() => Err(RequestError::MissingData {
                action: action.to_string(),
            }),
            EditAction::Edit | EditAction::Remove if target_ids.is_empty() => {
                Err(RequestError::MissingTargetIds {
                    action: action.to_string(),
                })
            }
            _ => Ok(Self {
                action,
                target_ids,
                data,
            }),
        }
    }

    /// The submitted fields for one row key.
    pub fn fields_for(&self, key: &str) -> Option<&Map<String, Value>> {
        self.data.get(key).and_then(Value::as_object)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Terminal state of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The mutation was applied.
    Applied,
    /// The mutation failed; see the reason.
    Failed,
}

/// Outcome for one target id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Target id (the new id for a successful create).
    pub id: String,
    /// Terminal state.
    pub status: OutcomeStatus,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MutationOutcome {
    /// An applied outcome.
    pub fn applied(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: OutcomeStatus::Applied,
            reason: None,
        }
    }

    /// A failed outcome.
    pub fn failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: OutcomeStatus::Failed,
            reason: Some(reason.into()),
        }
    }

    /// Returns true if the mutation was applied.
    pub fn is_applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }
}

/// An editor protocol response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditResponse {
    /// Rows for every created or edited document that succeeded.
    pub data: Vec<Value>,
    /// Joined failure messages, present when any target failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-target outcomes in request order.
    pub outcomes: Vec<MutationOutcome>,
}

impl EditResponse {
    /// A response carrying only a request-level error.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            error: Some(message.into()),
            outcomes: Vec::new(),
        }
    }
}
