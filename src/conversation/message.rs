use crate::schema::ChatSchema;
use crate::state::AnswerState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// One entry of the append-only conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    /// Answers snapshot carried by a user submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnswerState>,
    /// The schema a bot message presents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ChatSchema>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            timestamp: Utc::now(),
            content: content.into(),
            data: None,
            schema: None,
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Role::Bot, content)
    }

    /// A bot turn presenting `schema`, using its prompt as content.
    pub fn presenting(schema: ChatSchema) -> Self {
        let mut message = Self::new(Role::Bot, schema.message.clone());
        message.schema = Some(schema);
        message
    }

    pub fn submission(content: impl Into<String>, data: AnswerState) -> Self {
        let mut message = Self::new(Role::User, content);
        message.data = Some(data);
        message
    }
}
