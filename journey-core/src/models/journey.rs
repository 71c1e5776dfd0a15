//! Journey instance and request/response data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One running or completed workflow instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey<T> {
    /// Identifier assigned by the journey store
    pub jid: Uuid,
    /// Name of the state the journey currently occupies
    pub current_stage: String,
    /// Most recent checkpoint state the journey passed through
    pub last_checkpoint_stage: String,
    /// Domain payload, owned by the state handlers
    pub data: T,
    /// Store-managed revision used for optimistic concurrency
    #[serde(default)]
    pub version: u64,
    /// When the store allocated the journey
    pub created_at: DateTime<Utc>,
    /// When the journey was last saved
    pub updated_at: DateTime<Utc>,
}

impl<T: Default> Journey<T> {
    /// Blank journey with no stage yet
    pub fn new(jid: Uuid) -> Self {
        let now = Utc::now();
        Self {
            jid,
            current_stage: String::new(),
            last_checkpoint_stage: String::new(),
            data: T::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request submitted to the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FsmRequest {
    /// Existing journey, absent when starting a new one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jid: Option<Uuid>,
    /// Event driving the request
    pub event: String,
    /// Caller input handed to the first visited state
    #[serde(default)]
    pub data: serde_json::Value,
}

impl FsmRequest {
    /// Request that starts a new journey
    pub fn start(data: serde_json::Value) -> Self {
        Self {
            jid: None,
            event: crate::models::ReservedEvent::Start.as_str().to_string(),
            data,
        }
    }

    /// Request that advances an existing journey
    pub fn event(jid: Uuid, event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            jid: Some(jid),
            event: event.into(),
            data,
        }
    }

    pub fn resume(jid: Uuid) -> Self {
        Self::event(
            jid,
            crate::models::ReservedEvent::Resume.as_str(),
            serde_json::Value::Null,
        )
    }

    pub fn back(jid: Uuid) -> Self {
        Self::event(
            jid,
            crate::models::ReservedEvent::Back.as_str(),
            serde_json::Value::Null,
        )
    }
}

/// Response returned to the caller after a request completes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FsmResponse {
    pub jid: Uuid,
    /// Output of the last executed handler
    pub data: serde_json::Value,
    /// Presentation hint of the last executed state
    pub next_screen: String,
    /// Presentation metadata of the last executed state
    pub meta_data: serde_json::Value,
}
