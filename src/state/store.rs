use super::{AnswerState, AnswerValue, FieldPath};
use crate::error::PathError;
use serde::{Deserialize, Serialize};

/// Holds the current answers for a whole schema tree.
///
/// Writes never mutate in place: `set` rebuilds the chain of nested groups
/// from the addressed leaf back to the root and returns a new store, leaving
/// every sibling entry untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateStore {
    root: AnswerState,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_answers(root: AnswerState) -> Self {
        Self { root }
    }

    pub fn answers(&self) -> &AnswerState {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// A copy of the current answers, detached from the store.
    pub fn snapshot(&self) -> AnswerState {
        self.root.clone()
    }

    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Reads the value at `path`, or `None` if any segment is absent or an
    /// intermediate segment is not a group.
    pub fn get(&self, path: &FieldPath) -> Option<&AnswerValue> {
        let (last, parents) = path.segments().split_last()?;
        let mut level = &self.root;
        for segment in parents {
            level = level.get(segment)?.as_group()?;
        }
        level.get(last)
    }

    /// The local view of a container: the group stored at `path`, or an empty
    /// map when nothing has been answered under it yet. The root path yields
    /// the whole store.
    pub fn scoped(&self, path: &FieldPath) -> AnswerState {
        if path.is_empty() {
            return self.root.clone();
        }
        self.get(path)
            .and_then(AnswerValue::as_group)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns a new store with `value` written at `path`.
    pub fn set(&self, path: &FieldPath, value: AnswerValue) -> Result<StateStore, PathError> {
        if path.is_empty() {
            return Err(PathError::EmptyPath);
        }
        let root = set_in(&self.root, path, 0, value)?;
        Ok(StateStore { root })
    }
}

/// Rebuilds `level` with `value` merged in at `path[depth..]`.
fn set_in(
    level: &AnswerState,
    path: &FieldPath,
    depth: usize,
    value: AnswerValue,
) -> Result<AnswerState, PathError> {
    let segments = path.segments();
    let segment = &segments[depth];
    let mut rebuilt = level.clone();

    if depth + 1 == segments.len() {
        // A scalar must not replace a group: that would drop the container's children.
        if let (Some(AnswerValue::Group(_)), false) =
            (level.get(segment), matches!(value, AnswerValue::Group(_)))
        {
            return Err(PathError::MalformedPath {
                path: path.clone(),
                segment: segment.clone(),
                found: "group",
            });
        }
        rebuilt.insert(segment.clone(), value);
        return Ok(rebuilt);
    }

    let empty = AnswerState::new();
    let child = match level.get(segment) {
        None => &empty,
        Some(AnswerValue::Group(group)) => group,
        Some(other) => {
            return Err(PathError::MalformedPath {
                path: path.clone(),
                segment: segment.clone(),
                found: other.type_name(),
            });
        }
    };
    let merged = set_in(child, path, depth + 1, value)?;
    rebuilt.insert(segment.clone(), AnswerValue::Group(merged));
    Ok(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_form() -> StateStore {
        StateStore::new()
            .set(&FieldPath::from(["f", "a"]), "alpha".into())
            .unwrap()
            .set(&FieldPath::from(["f", "c"]), "gamma".into())
            .unwrap()
    }

    #[test]
    fn set_preserves_siblings() {
        let store = store_with_form();
        let next = store.set(&FieldPath::from(["f", "b"]), "beta".into()).unwrap();

        let form = next.get(&"f".into()).and_then(AnswerValue::as_group).unwrap();
        assert_eq!(form.len(), 3);
        assert_eq!(next.get(&FieldPath::from(["f", "a"])), Some(&"alpha".into()));
        assert_eq!(next.get(&FieldPath::from(["f", "c"])), Some(&"gamma".into()));
        assert_eq!(next.get(&FieldPath::from(["f", "b"])), Some(&"beta".into()));
    }

    #[test]
    fn set_leaves_original_untouched() {
        let store = store_with_form();
        let _ = store.set(&FieldPath::from(["f", "a"]), "changed".into()).unwrap();
        assert_eq!(store.get(&FieldPath::from(["f", "a"])), Some(&"alpha".into()));
    }

    #[test]
    fn scalar_in_the_middle_is_malformed() {
        let store = StateStore::new().set(&"c".into(), "leaf".into()).unwrap();
        let err = store
            .set(&FieldPath::from(["c", "x"]), "hello".into())
            .unwrap_err();
        assert!(matches!(err, PathError::MalformedPath { found: "text", .. }));
    }

    #[test]
    fn scalar_cannot_replace_group() {
        let store = store_with_form();
        let err = store.set(&"f".into(), "flat".into()).unwrap_err();
        assert!(matches!(err, PathError::MalformedPath { found: "group", .. }));
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = StateStore::new()
            .set(&FieldPath::root(), true.into())
            .unwrap_err();
        assert_eq!(err, PathError::EmptyPath);
    }

    #[test]
    fn get_through_scalar_is_absent() {
        let store = StateStore::new().set(&"c".into(), "leaf".into()).unwrap();
        assert!(store.get(&FieldPath::from(["c", "x"])).is_none());
        assert!(store.scoped(&"c".into()).is_empty());
    }
}
