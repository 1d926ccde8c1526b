//! Validation tests
//!
//! Whole-tree validation against stores shaped the way edits produce them.
//!
mod common;
use common::*;
use taiwa::prelude::*;

fn form(children: &str) -> ChatSchema {
    ChatSchema::from_json(&format!(
        r#"{{ "id": "v", "message": "", "components": [{{ "id": "f", "type": "form", "children": [{}] }}] }}"#,
        children
    ))
    .expect("test schema should load")
}

/// Builds a store from `a/b` paths.
fn store_with(entries: &[(&str, AnswerValue)]) -> StateStore {
    entries.iter().fold(StateStore::new(), |store, (path, value)| {
        store.set(&path.parse::<FieldPath>().unwrap(), value.clone()).unwrap()
    })
}

#[cfg(test)]
mod validation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_min_length_reported_before_pattern() {
        let schema = form(r#"{ "id": "code", "type": "input", "label": "Code",
            "validation": { "minLength": 5, "pattern": "^[0-9]+$" } }"#);
        let store = store_with(&[("f/code", "12".into())]);

        let errors = Validator::validate(&schema.components, &store);
        assert_eq!(errors.get("code").map(String::as_str), Some("Code must be at least 5 characters"));
    }

    #[test]
    fn test_children_are_read_from_their_container() {
        let schema = form(r#"{ "id": "name", "type": "input", "required": true }"#);

        // The answer at the root does not satisfy a field living under the form.
        let flat = store_with(&[("name", "Ada".into())]);
        assert!(Validator::validate(&schema.components, &flat).contains_key("name"));

        let nested = store_with(&[("f/name", "Ada".into())]);
        assert!(Validator::validate(&schema.components, &nested).is_empty());
        assert!(Validator::is_submittable(&schema.components, &nested));
    }

    #[test]
    fn test_default_messages() {
        let schema = form(r#"
            { "id": "name", "type": "input", "required": true },
            { "id": "bio", "type": "text", "label": "Bio", "validation": { "maxLength": 3 } },
            { "id": "zip", "type": "input", "label": "Zip", "validation": { "pattern": "^\\d{5}$" } },
            { "id": "stars", "type": "rating", "label": "Stars", "validation": { "min": 2 } },
            { "id": "age", "type": "input", "inputType": "number", "label": "Age", "validation": { "max": 120.5 } }
        "#);
        let store = store_with(&[
            ("f/bio", "toolong".into()),
            ("f/zip", "12ab".into()),
            ("f/stars", 1.0.into()),
            ("f/age", 130.0.into()),
        ]);

        let errors = Validator::validate(&schema.components, &store);
        let expected: ErrorMap = [
            ("age", "Age must be at most 120.5"),
            ("bio", "Bio must be at most 3 characters"),
            ("name", "This field is required"),
            ("stars", "Stars must be at least 2"),
            ("zip", "Zip has an invalid format"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(errors, expected);
    }

    #[test]
    fn test_rule_message_overrides_default() {
        let schema = form(r#"{ "id": "phone", "type": "input",
            "validation": { "required": true, "message": "We need a phone number" } }"#);
        let errors = Validator::validate(&schema.components, &StateStore::new());
        assert_eq!(errors.get("phone").map(String::as_str), Some("We need a phone number"));
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let schema = form(r#"{ "id": "name", "type": "input", "required": true }"#);
        let store = store_with(&[("f/name", "   ".into())]);
        assert!(Validator::validate(&schema.components, &store).contains_key("name"));
        assert_eq!(
            Validator::missing_required(&schema.components, &store),
            vec![FieldPath::from(["f", "name"])]
        );
    }

    #[test]
    fn test_groups_buttons_and_unknown_kinds_are_never_validated() {
        let schema = ChatSchema::from_json(r#"{
            "id": "v", "message": "",
            "components": [
                { "id": "box", "type": "container", "required": true, "children": [] },
                { "id": "go", "type": "button", "required": true },
                { "id": "widget", "type": "mystery", "required": true }
            ]
        }"#).unwrap();
        assert!(Validator::validate(&schema.components, &StateStore::new()).is_empty());
        assert!(Validator::is_submittable(&schema.components, &StateStore::new()));
    }

    #[test]
    fn test_colliding_ids_keep_first_error() {
        let schema = ChatSchema::from_json(r#"{
            "id": "v", "message": "",
            "components": [
                { "id": "name", "type": "input", "label": "Outer", "required": true },
                { "id": "inner", "type": "container", "children": [
                    { "id": "name", "type": "input", "label": "Inner", "required": true }
                ] }
            ]
        }"#).unwrap();

        let errors = Validator::validate(&schema.components, &StateStore::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["name"], "Outer is required");
        assert_eq!(Validator::missing_required(&schema.components, &StateStore::new()).len(), 2);
        assert_eq!(schema.duplicate_ids().len(), 1);
    }

    #[test]
    fn test_non_finite_number_never_reaches_the_store() {
        let schema = form(r#"{ "id": "age", "type": "input", "inputType": "number", "required": true,
            "validation": { "min": 0, "max": 120 } }"#);
        let path: FieldPath = "f/age".parse().unwrap();
        let store = StateStore::new();

        let edit = Interpreter::apply_edit(&schema.components, &store, &path, "NaN".into());
        assert!(matches!(edit, Err(EditError::Rejected { .. })));
        assert!(!Validator::is_submittable(&schema.components, &store));

        let store = Interpreter::apply_edit(&schema.components, &store, &path, "42".into()).unwrap();
        assert!(Validator::is_submittable(&schema.components, &store));
        assert_eq!(serde_json::to_value(&store).unwrap(), serde_json::json!({ "f": { "age": 42.0 } }));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schema = service_schema();
        let store = StateStore::new();
        let first = Validator::validate(&schema.components, &store);
        let second = Validator::validate(&schema.components, &store);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_optional_switch_false_is_valid() {
        let schema = service_schema();
        let store = store_with(&[
            ("booking/service-type", "A".into()),
            ("booking/notifications", false.into()),
        ]);
        assert!(Validator::is_submittable(&schema.components, &store));
    }
}
