//! Assistant model - a named, fixed response.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assistant entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assistant {
    pub id: Uuid,
    pub name: String,
    pub response_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assistant {
    /// Create a new assistant with both timestamps set to now.
    pub fn new(name: String, response_text: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            response_text,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the response text and move `updated_at` forward.
    ///
    /// `updated_at` strictly increases even if the clock has not ticked
    /// since the previous mutation.
    pub fn set_response_text(&mut self, response_text: String) {
        self.response_text = response_text;
        self.touch();
    }

    fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

/// Whether an upsert inserted a new record or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Created => "created",
            UpsertOutcome::Updated => "updated",
        }
    }
}

/// Result of an upsert: the stored record and what happened to it.
#[derive(Debug, Clone)]
pub struct Upserted {
    pub assistant: Assistant,
    pub outcome: UpsertOutcome,
}

impl Upserted {
    pub fn was_created(&self) -> bool {
        self.outcome == UpsertOutcome::Created
    }
}
