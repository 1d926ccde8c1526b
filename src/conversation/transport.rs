use crate::error::TransportError;
use crate::schema::{ApiConfig, ChatSchema, SchemaLoader};
use crate::state::AnswerState;
use async_trait::async_trait;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// What the server answers to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerReply {
    /// The next turn of the conversation.
    Schema(ChatSchema),
    /// A plain acknowledgment that ends the conversation.
    Ack { message: String },
}

impl ServerReply {
    /// Anything with a `components` array is a schema and must load as one;
    /// otherwise the reply needs a string `message`.
    pub fn from_value(value: &Value) -> Result<Self, TransportError> {
        if value.get("components").is_some() {
            return SchemaLoader::shared()
                .parse_schema(value)
                .map(ServerReply::Schema)
                .map_err(|e| TransportError::Decode(e.to_string()));
        }
        match value.get("message").and_then(Value::as_str) {
            Some(message) => Ok(ServerReply::Ack {
                message: message.to_string(),
            }),
            None => Err(TransportError::Decode(
                "reply carries neither components nor a message".to_string(),
            )),
        }
    }

    pub fn ack(message: impl Into<String>) -> Self {
        ServerReply::Ack {
            message: message.into(),
        }
    }
}

impl<'de> Deserialize<'de> for ServerReply {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ServerReply::from_value(&value).map_err(D::Error::custom)
    }
}

/// Sends a form's answers to its endpoint.
///
/// The submit call is the only suspending operation in a conversation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, config: &ApiConfig, answers: &AnswerState) -> Result<ServerReply, TransportError>;
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::*;
    use crate::schema::HttpMethod;

    /// [`Transport`] over HTTP with a JSON body.
    #[derive(Debug, Clone, Default)]
    pub struct HttpTransport {
        client: reqwest::Client,
    }

    impl HttpTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn submit(&self, config: &ApiConfig, answers: &AnswerState) -> Result<ServerReply, TransportError> {
            let method = match config.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };
            let mut request = self.client.request(method, &config.endpoint);
            for (name, value) in &config.headers {
                request = request.header(name, value);
            }
            if config.method != HttpMethod::Get {
                request = request.json(answers);
            }

            tracing::debug!(endpoint = %config.endpoint, method = ?config.method, "sending submission");
            let response = request
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let value: Value = response
                .json()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))?;
            ServerReply::from_value(&value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_only_reply_is_an_ack() {
        let reply: ServerReply = serde_json::from_value(json!({"message": "done"})).unwrap();
        assert_eq!(reply, ServerReply::ack("done"));
    }

    #[test]
    fn reply_with_components_is_a_schema() {
        let reply = ServerReply::from_value(&json!({
            "id": "next",
            "message": "Anything else?",
            "components": [{"id": "more", "type": "input"}]
        }))
        .unwrap();
        let ServerReply::Schema(schema) = reply else {
            panic!("expected a schema");
        };
        assert_eq!(schema.id, "next");
        assert_eq!(schema.components.len(), 1);
    }

    #[test]
    fn broken_schema_reply_is_a_decode_error() {
        let err = ServerReply::from_value(&json!({"components": "nope"})).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn empty_reply_is_a_decode_error() {
        assert!(ServerReply::from_value(&json!({})).is_err());
    }
}
