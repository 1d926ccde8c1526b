//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the taiwa crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use taiwa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let schema = SchemaLoader::shared().from_file("demos/appointment.json")?;
//! let store = StateStore::new().set(&FieldPath::from(["booking", "service-type"]), "A".into())?;
//!
//! let errors = Validator::validate(&schema.components, &store);
//! print!("{}", DisplayRender(&Interpreter::render(&schema.components, &store, &errors)));
//! # Ok(())
//! # }
//! ```

// Conversation flow
pub use crate::config::ControllerConfig;
pub use crate::conversation::{
    CompletionOutcome, ConversationState, Controller, Message, Role, ServerReply, SessionId,
    SubmitTicket, Transport,
};

#[cfg(feature = "http")]
pub use crate::conversation::HttpTransport;

// Schema model
pub use crate::schema::{ApiConfig, ChatSchema, ComponentKind, ComponentNode, SchemaLoader, ValidationRule};

// Answers
pub use crate::state::{AnswerState, AnswerValue, FieldPath, GeoPoint, StateStore};

// Rendering and validation
pub use crate::interpreter::{DisplayRender, Interpreter, RenderNode, Widget};
pub use crate::validation::{ErrorMap, Validator};

// Error types
pub use crate::error::{EditError, PathError, SchemaError, SubmitRejection, TransportError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
