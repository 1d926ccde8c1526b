use crate::schema::ComponentNode;
use crate::state::{AnswerState, AnswerValue, FieldPath, StateStore};
use std::collections::BTreeMap;

mod messages;
mod rules;

pub use messages::{MessageFormatter, Violation};
pub use rules::{carries_value, check, is_empty};

/// One message per failing leaf, keyed by the leaf's own id.
pub type ErrorMap = BTreeMap<String, String>;

/// Checks a component tree against the answers collected for it.
///
/// Every operation is a pure function of its inputs: the same tree and store
/// always yield the same result.
pub struct Validator;

impl Validator {
    /// Walks the tree depth-first and reports the first violated constraint
    /// of every leaf. Values are looked up along the same id-path the
    /// interpreter writes them to, so a container's children are read from
    /// the container's own group.
    pub fn validate(components: &[ComponentNode], store: &StateStore) -> ErrorMap {
        let mut engine = ValidationEngine::default();
        engine.walk(components, store.answers(), &FieldPath::root());
        engine.errors
    }

    /// The message for a single node holding `value`, if it fails.
    pub fn validate_node(node: &ComponentNode, value: Option<&AnswerValue>) -> Option<String> {
        if !carries_value(node) {
            return None;
        }
        check(node, value).map(|violation| {
            let custom = node.validation.as_ref().and_then(|r| r.message.as_deref());
            MessageFormatter::format(node.display_name(), &violation, custom)
        })
    }

    /// Paths of required leaves whose value is absent or blank.
    pub fn missing_required(components: &[ComponentNode], store: &StateStore) -> Vec<FieldPath> {
        let mut missing = Vec::new();
        crate::schema::walk(components, &FieldPath::root(), &mut |path, node| {
            if carries_value(node) && node.is_required() && is_empty(store.get(path)) {
                missing.push(path.clone());
            }
        });
        missing
    }

    /// The one validity predicate used before submission: no leaf fails its
    /// constraints and every required leaf has a value.
    pub fn is_submittable(components: &[ComponentNode], store: &StateStore) -> bool {
        Self::validate(components, store).is_empty()
            && Self::missing_required(components, store).is_empty()
    }
}

#[derive(Default)]
struct ValidationEngine {
    errors: ErrorMap,
    owners: BTreeMap<String, FieldPath>,
}

impl ValidationEngine {
    fn walk(&mut self, components: &[ComponentNode], view: &AnswerState, parent: &FieldPath) {
        for node in components {
            let path = parent.child(&node.id);
            if node.is_group() {
                let empty = AnswerState::new();
                let child_view = match view.get(&node.id) {
                    None => &empty,
                    Some(AnswerValue::Group(group)) => group,
                    Some(other) => {
                        tracing::warn!(
                            path = %path,
                            found = other.type_name(),
                            "group slot holds a scalar, validating children as empty"
                        );
                        &empty
                    }
                };
                self.walk(node.children(), child_view, &path);
            } else if let Some(message) = Validator::validate_node(node, view.get(&node.id)) {
                self.record(node, path, message);
            }
        }
    }

    fn record(&mut self, node: &ComponentNode, path: FieldPath, message: String) {
        if let Some(owner) = self.owners.get(&node.id) {
            tracing::warn!(
                id = %node.id,
                kept = %owner,
                dropped = %path,
                "error id collision, keeping the first error"
            );
            return;
        }
        self.owners.insert(node.id.clone(), path);
        self.errors.insert(node.id.clone(), message);
    }
}
