use crate::config::ControllerConfig;
use crate::error::{EditError, SubmitRejection, TransportError};
use crate::interpreter::{Interpreter, RenderNode};
use crate::schema::{ApiConfig, ChatSchema};
use crate::state::{AnswerState, AnswerValue, FieldPath, StateStore};
use crate::validation::{ErrorMap, Validator};
use std::fmt;
use uuid::Uuid;

mod message;
mod transport;

pub use message::{Message, Role};
pub use transport::{ServerReply, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

/// Identity of one conversation. Completions from another session are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingInput,
    Validating,
    Submitting,
    Terminal,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversationState::Idle => "Idle",
            ConversationState::AwaitingInput => "AwaitingInput",
            ConversationState::Validating => "Validating",
            ConversationState::Submitting => "Submitting",
            ConversationState::Terminal => "Terminal",
        };
        f.write_str(name)
    }
}

/// A claim on the one submission allowed in flight.
///
/// Hand it back to [`Controller::complete_submit`] with the transport result.
/// If `api_config` is `None` the schema has no endpoint and the caller should
/// complete with a local acknowledgment instead of calling a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    session: SessionId,
    generation: u64,
    api_config: Option<ApiConfig>,
    payload: AnswerState,
}

impl SubmitTicket {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn api_config(&self) -> Option<&ApiConfig> {
        self.api_config.as_ref()
    }

    /// The answers to send: those under the active form, or the whole store.
    pub fn payload(&self) -> &AnswerState {
        &self.payload
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// A new schema was installed and input is open again.
    Continued,
    /// The server acknowledged and the conversation ended.
    Finished,
    /// The transport failed; answers are kept for a retry.
    Failed(TransportError),
    /// The ticket belonged to an older session or submission.
    Discarded,
}

/// Sequences the turns of one conversation.
///
/// Owns the active schema, the answer store, the current errors and the
/// message log. Every mutation goes through `&mut self`, so edits, validation
/// and submission are serialized; the only suspension point is the transport
/// call, guarded by a [`SubmitTicket`].
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    session: SessionId,
    generation: u64,
    state: ConversationState,
    schema: Option<ChatSchema>,
    store: StateStore,
    errors: ErrorMap,
    messages: Vec<Message>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            session: SessionId::new(),
            generation: 0,
            state: ConversationState::Idle,
            schema: None,
            store: StateStore::new(),
            errors: ErrorMap::new(),
            messages: Vec::new(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn current_schema(&self) -> Option<&ChatSchema> {
        self.schema.as_ref()
    }

    /// Presents the first schema of the conversation.
    ///
    /// Also valid later: any pending submission is invalidated and the
    /// answers are reset.
    pub fn bootstrap(&mut self, schema: ChatSchema) {
        if self.state == ConversationState::Submitting {
            tracing::warn!(session = %self.session, "bootstrap while submitting, pending reply will be discarded");
            self.generation += 1;
        }
        self.store.clear();
        self.errors.clear();
        self.install(schema);
    }

    /// Tears the conversation down and starts a new session.
    pub fn restart(&mut self) {
        let old = self.session;
        self.session = SessionId::new();
        self.generation = 0;
        self.schema = None;
        self.store.clear();
        self.errors.clear();
        self.messages.clear();
        self.transition(ConversationState::Idle);
        tracing::debug!(%old, new = %self.session, "conversation restarted");
    }

    /// The live view of the active schema.
    pub fn render(&self) -> Vec<RenderNode> {
        match &self.schema {
            Some(schema) => Interpreter::render(&schema.components, &self.store, &self.errors),
            None => Vec::new(),
        }
    }

    /// Writes a user edit into the store and clears that leaf's error.
    pub fn edit(&mut self, path: &FieldPath, raw: impl Into<AnswerValue>) -> Result<(), EditError> {
        let schema = match (&self.schema, self.state) {
            (Some(schema), ConversationState::AwaitingInput) => schema,
            _ => return Err(EditError::NotAcceptingInput(self.state.to_string())),
        };

        match Interpreter::apply_edit(&schema.components, &self.store, path, raw.into()) {
            Ok(store) => {
                self.store = store;
                if let Some(id) = path.leaf() {
                    self.errors.remove(id);
                }
                Ok(())
            }
            Err(EditError::Path(e)) if !self.config.strict_paths => {
                tracing::warn!(%path, error = %e, "dropping edit with malformed path");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Replaces the answers with previously saved ones, e.g. a resumed draft.
    ///
    /// Nothing is checked against the schema until the next submit.
    pub fn restore(&mut self, answers: AnswerState) -> Result<(), EditError> {
        if self.state != ConversationState::AwaitingInput {
            return Err(EditError::NotAcceptingInput(self.state.to_string()));
        }
        self.store = StateStore::from_answers(answers);
        self.errors.clear();
        Ok(())
    }

    /// Validates and, when everything passes, claims the submission slot.
    ///
    /// On success a user message with the answers snapshot has been appended
    /// and the controller is `Submitting` until the ticket is completed.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitRejection> {
        match self.state {
            ConversationState::Idle => return Err(SubmitRejection::NoSchema),
            ConversationState::Terminal => return Err(SubmitRejection::Terminal),
            ConversationState::Submitting | ConversationState::Validating => {
                return Err(SubmitRejection::InFlight);
            }
            ConversationState::AwaitingInput => {}
        }
        self.transition(ConversationState::Validating);
        let (errors, missing, target) = match &self.schema {
            Some(schema) => (
                Validator::validate(&schema.components, &self.store),
                Validator::missing_required(&schema.components, &self.store),
                schema
                    .active_form()
                    .map(|(path, form)| (path, form.api_config.clone())),
            ),
            None => {
                self.transition(ConversationState::AwaitingInput);
                return Err(SubmitRejection::NoSchema);
            }
        };

        if !errors.is_empty() || !missing.is_empty() {
            tracing::debug!(errors = errors.len(), missing = missing.len(), "submission blocked by validation");
            self.errors = errors.clone();
            self.transition(ConversationState::AwaitingInput);
            return Err(SubmitRejection::Invalid { errors, missing });
        }
        self.errors.clear();

        let (api_config, payload) = match target {
            Some((path, api_config)) => (Some(api_config), self.store.scoped(&path)),
            None => (None, self.store.snapshot()),
        };

        self.messages.push(Message::submission(
            self.config.submitted_content.clone(),
            self.store.snapshot(),
        ));
        self.generation += 1;
        self.transition(ConversationState::Submitting);

        Ok(SubmitTicket {
            session: self.session,
            generation: self.generation,
            api_config,
            payload,
        })
    }

    /// Applies the result of the submission `ticket` was issued for.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<ServerReply, TransportError>,
    ) -> CompletionOutcome {
        if !self.is_current(&ticket) {
            tracing::debug!(
                ticket_session = %ticket.session,
                ticket_generation = ticket.generation,
                session = %self.session,
                generation = self.generation,
                "discarding stale submission result"
            );
            return CompletionOutcome::Discarded;
        }

        match result {
            Ok(ServerReply::Schema(schema)) => {
                self.store.clear();
                self.install(schema);
                CompletionOutcome::Continued
            }
            Ok(ServerReply::Ack { message }) => {
                self.store.clear();
                self.schema = None;
                self.messages.push(Message::bot(message));
                self.transition(ConversationState::Terminal);
                CompletionOutcome::Finished
            }
            Err(e) => {
                tracing::error!(session = %self.session, error = %e, "submission failed");
                self.messages.push(Message::bot(format!("Error: {}", e)));
                self.transition(ConversationState::AwaitingInput);
                CompletionOutcome::Failed(e)
            }
        }
    }

    /// Gives up on the submission in flight, keeping the answers.
    ///
    /// For callers whose transport call was cancelled before a result came
    /// back, such as a dropped [`Controller::submit`] future. Any ticket issued
    /// for the abandoned submission completes as `Discarded`. Returns `false`
    /// when nothing was in flight.
    pub fn abandon_submit(&mut self) -> bool {
        if self.state != ConversationState::Submitting {
            return false;
        }
        tracing::warn!(session = %self.session, generation = self.generation, "submission abandoned");
        self.generation += 1;
        self.transition(ConversationState::AwaitingInput);
        true
    }

    /// Runs a whole submission: validate, call `transport` with the
    /// configured timeout, apply the reply.
    pub async fn submit(&mut self, transport: &dyn Transport) -> Result<CompletionOutcome, SubmitRejection> {
        let ticket = self.begin_submit()?;

        let result = match ticket.api_config() {
            None => {
                tracing::debug!("no endpoint configured, acknowledging locally");
                Ok(ServerReply::ack(self.config.completed_content.clone()))
            }
            Some(api_config) => {
                let timeout = self.config.submit_timeout;
                match tokio::time::timeout(timeout, transport.submit(api_config, ticket.payload())).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
                }
            }
        };

        Ok(self.complete_submit(ticket, result))
    }

    fn is_current(&self, ticket: &SubmitTicket) -> bool {
        ticket.session == self.session
            && ticket.generation == self.generation
            && self.state == ConversationState::Submitting
    }

    fn install(&mut self, schema: ChatSchema) {
        for duplicate in schema.duplicate_ids() {
            tracing::warn!(
                id = %duplicate.id,
                paths = ?duplicate.paths.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "component id used at several paths, errors for them share one slot"
            );
        }
        self.messages.push(Message::presenting(schema.clone()));
        self.schema = Some(schema);
        self.transition(ConversationState::AwaitingInput);
    }

    fn transition(&mut self, next: ConversationState) {
        tracing::debug!(session = %self.session, from = %self.state, to = %next, "state transition");
        self.state = next;
    }
}
