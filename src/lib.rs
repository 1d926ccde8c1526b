//! # Taiwa - Schema-Driven Conversational Forms
//!
//! **Taiwa** turns server-sent component trees into editable, validated answer state.
//! A conversation is a sequence of turns: the server presents a schema, the user edits
//! the answers it describes, the client validates and submits, and the server replies
//! with either the next schema or a final acknowledgment.
//!
//! ## Core Workflow
//!
//! 1.  **Load a Schema**: Parse the JSON tree with a [`SchemaLoader`](schema::SchemaLoader)
//!     (or plain serde) into a [`ChatSchema`](schema::ChatSchema). Unknown component types
//!     load as inert placeholders instead of failing the tree.
//! 2.  **Render and Edit**: The [`Interpreter`](interpreter::Interpreter) walks the tree
//!     against a [`StateStore`](state::StateStore). Edits are addressed by id-path and
//!     merged into the store without disturbing sibling answers.
//! 3.  **Validate**: The [`Validator`](validation::Validator) reports the first failing
//!     constraint of every leaf as a flat error map.
//! 4.  **Submit**: The [`Controller`](conversation::Controller) sequences all of the above
//!     and hands valid answers to a [`Transport`](conversation::Transport).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taiwa::prelude::*;
//!
//! # async fn run(transport: &dyn Transport) -> Result<()> {
//! let schema = ChatSchema::from_json(r#"{
//!     "id": "appointment",
//!     "message": "Which service do you need?",
//!     "components": [{
//!         "id": "booking",
//!         "type": "form",
//!         "apiConfig": { "endpoint": "https://example.com/book", "method": "POST" },
//!         "children": [{
//!             "id": "service-type",
//!             "type": "select",
//!             "label": "Service",
//!             "required": true,
//!             "options": [{ "value": "A", "label": "Repair" }, { "value": "B", "label": "Install" }]
//!         }]
//!     }]
//! }"#)?;
//!
//! let mut controller = Controller::new(ControllerConfig::default());
//! controller.bootstrap(schema);
//!
//! // Paths follow the component ids from the root.
//! controller.edit(&FieldPath::from(["booking", "service-type"]), "A")?;
//!
//! match controller.submit(transport).await? {
//!     CompletionOutcome::Continued => println!("next turn: {:?}", controller.current_schema()),
//!     CompletionOutcome::Finished => println!("done"),
//!     CompletionOutcome::Failed(e) => println!("retry later: {}", e),
//!     CompletionOutcome::Discarded => {}
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conversation;
pub mod error;
pub mod interpreter;
pub mod prelude;
pub mod schema;
pub mod state;
pub mod validation;
