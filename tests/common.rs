//! Common test utilities for building schemas and scripted transports.
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use taiwa::prelude::*;

/// A form with one required select and one optional switch.
#[allow(dead_code)]
pub const SERVICE_SCHEMA_JSON: &str = r#"{
    "id": "service",
    "message": "Which service do you need?",
    "components": [
        {
            "id": "booking",
            "type": "form",
            "apiConfig": { "endpoint": "https://example.com/book", "method": "POST" },
            "children": [
                {
                    "id": "service-type",
                    "type": "select",
                    "label": "Service",
                    "required": true,
                    "options": [
                        { "value": "A", "label": "Option A" },
                        { "value": "B", "label": "Option B" }
                    ]
                },
                { "id": "notifications", "type": "switch", "label": "Notifications" }
            ]
        }
    ]
}"#;

/// Same fields, but the form has no endpoint.
#[allow(dead_code)]
pub const LOCAL_SCHEMA_JSON: &str = r#"{
    "id": "local",
    "message": "Rate us",
    "components": [
        {
            "id": "feedback",
            "type": "form",
            "children": [
                { "id": "stars", "type": "rating", "label": "Stars", "required": true, "maxRating": 5 }
            ]
        }
    ]
}"#;

/// A follow-up turn a server might reply with.
#[allow(dead_code)]
pub const FOLLOW_UP_SCHEMA_JSON: &str = r#"{
    "id": "follow-up",
    "message": "When should we come by?",
    "components": [
        { "id": "when", "type": "date", "label": "Date", "required": true }
    ]
}"#;

#[allow(dead_code)]
pub fn service_schema() -> ChatSchema {
    ChatSchema::from_json(SERVICE_SCHEMA_JSON).expect("service schema should load")
}

#[allow(dead_code)]
pub fn local_schema() -> ChatSchema {
    ChatSchema::from_json(LOCAL_SCHEMA_JSON).expect("local schema should load")
}

#[allow(dead_code)]
pub fn follow_up_schema() -> ChatSchema {
    ChatSchema::from_json(FOLLOW_UP_SCHEMA_JSON).expect("follow-up schema should load")
}

#[allow(dead_code)]
pub fn service_type_path() -> FieldPath {
    FieldPath::from(["booking", "service-type"])
}

/// A controller that reports malformed paths as errors.
#[allow(dead_code)]
pub fn strict_controller() -> Controller {
    Controller::new(ControllerConfig::default().with_strict_paths(true))
}

/// A transport that replays scripted results and records what it was sent.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<std::result::Result<ServerReply, TransportError>>>,
    calls: Mutex<Vec<(ApiConfig, AnswerState)>>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn replying(replies: Vec<std::result::Result<ServerReply, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(ApiConfig, AnswerState)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(&self, config: &ApiConfig, answers: &AnswerState) -> std::result::Result<ServerReply, TransportError> {
        self.calls.lock().unwrap().push((config.clone(), answers.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply left".to_string())))
    }
}
