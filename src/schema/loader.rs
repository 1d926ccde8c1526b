use super::parsing::{
    ComponentParser, RawComponent, create_parser_by_name, register_default_parsers,
};
use super::{ChatSchema, ComponentKind, ComponentNode, ValidationRule};
use crate::error::SchemaError;
use ahash::{AHashMap, AHashSet};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static DEFAULT_LOADER: LazyLock<SchemaLoader> = LazyLock::new(|| SchemaLoader::builder().build());

/// Turns schema JSON into a component tree, dispatching on each node's `type`
/// through a registry of [`ComponentParser`]s.
pub struct SchemaLoader {
    registry: AHashMap<String, Box<dyn ComponentParser>>,
}

pub struct SchemaLoaderBuilder {
    registry: AHashMap<String, Box<dyn ComponentParser>>,
}

impl SchemaLoaderBuilder {
    pub fn new() -> Self {
        let mut registry: AHashMap<String, Box<dyn ComponentParser>> = AHashMap::new();
        register_default_parsers(&mut registry);
        Self { registry }
    }

    /// Makes a server-side kind name parse as one of the built-in kinds,
    /// e.g. `"textarea"` as `"text"`.
    pub fn with_kind_alias(mut self, user_kind: &str, builtin_kind: &str) -> Self {
        if let Some(parser) = create_parser_by_name(builtin_kind) {
            self.registry.insert(user_kind.to_string(), parser);
        }
        self
    }

    pub fn with_custom_parser(mut self, parser: Box<dyn ComponentParser>) -> Self {
        self.registry.insert(parser.kind_name().to_string(), parser);
        self
    }

    pub fn build(self) -> SchemaLoader {
        SchemaLoader {
            registry: self.registry,
        }
    }
}

impl Default for SchemaLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLoader {
    pub fn builder() -> SchemaLoaderBuilder {
        SchemaLoaderBuilder::new()
    }

    /// The loader with only the built-in kinds, used by serde.
    pub fn shared() -> &'static SchemaLoader {
        &DEFAULT_LOADER
    }

    pub fn parse_str(&self, json: &str) -> Result<ChatSchema, SchemaError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| SchemaError::JsonParseError(e.to_string()))?;
        self.parse_schema(&value)
    }

    pub fn from_file(&self, path: impl AsRef<Path>) -> Result<ChatSchema, SchemaError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::JsonParseError(format!("could not read '{}': {}", path.display(), e))
        })?;
        self.parse_str(&content)
    }

    pub fn parse_schema(&self, value: &Value) -> Result<ChatSchema, SchemaError> {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let components = match value.get("components") {
            Some(Value::Array(items)) => self.parse_nodes(items, "<root>")?,
            _ => {
                return Err(SchemaError::JsonParseError(
                    "schema is missing a 'components' array".to_string(),
                ));
            }
        };

        Ok(ChatSchema {
            id,
            message,
            components,
        })
    }

    /// Parses one sibling list, rejecting ids that appear twice under the same parent.
    pub fn parse_nodes(&self, items: &[Value], parent: &str) -> Result<Vec<ComponentNode>, SchemaError> {
        let mut seen = AHashSet::new();
        items
            .iter()
            .map(|item| {
                let node = self.parse_node(item)?;
                if !seen.insert(node.id.clone()) {
                    return Err(SchemaError::DuplicateSiblingId {
                        id: node.id,
                        parent: parent.to_string(),
                    });
                }
                Ok(node)
            })
            .collect()
    }

    pub fn parse_node(&self, value: &Value) -> Result<ComponentNode, SchemaError> {
        let raw = RawComponent::from_value(value)?;

        let label = raw
            .fields
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_string);
        let required = raw
            .fields
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let validation = match raw.fields.get("validation") {
            None | Some(Value::Null) => None,
            Some(rule) => Some(
                serde_json::from_value::<ValidationRule>(rule.clone()).map_err(|e| {
                    SchemaError::InvalidComponent {
                        node_id: raw.id.clone(),
                        kind: raw.kind.clone(),
                        message: format!("invalid validation rule: {}", e),
                    }
                })?,
            ),
        };

        let kind = match self.registry.get(&raw.kind) {
            Some(parser) => {
                let children = match &raw.children {
                    Some(items) => self.parse_nodes(items, &raw.id)?,
                    None => Vec::new(),
                };
                parser.parse(&raw, children)?
            }
            None => {
                tracing::warn!(
                    node_id = %raw.id,
                    kind = %raw.kind,
                    "unknown component kind, rendering as placeholder"
                );
                let mut fields = raw.fields.clone();
                if let Some(children) = raw.children.clone() {
                    fields.insert("children".to_string(), Value::Array(children));
                }
                ComponentKind::Unknown {
                    kind: raw.kind.clone(),
                    raw: fields,
                }
            }
        };

        Ok(ComponentNode {
            id: raw.id,
            label,
            required,
            validation,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TextSpec;
    use serde_json::json;

    #[test]
    fn alias_maps_to_builtin_kind() {
        let loader = SchemaLoader::builder()
            .with_kind_alias("textarea", "text")
            .build();
        let node = loader
            .parse_node(&json!({"id": "notes", "type": "textarea", "multiline": true}))
            .unwrap();
        assert_eq!(
            node.kind,
            ComponentKind::Text(TextSpec {
                multiline: true,
                ..TextSpec::default()
            })
        );
    }

    #[test]
    fn unknown_kind_keeps_its_fields() {
        let node = SchemaLoader::shared()
            .parse_node(&json!({"id": "m", "type": "carousel", "slides": 3}))
            .unwrap();
        match node.kind {
            ComponentKind::Unknown { kind, raw } => {
                assert_eq!(kind, "carousel");
                assert_eq!(raw["slides"], json!(3));
            }
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_sibling_ids_are_rejected() {
        let err = SchemaLoader::shared()
            .parse_str(
                r#"{"id": "s", "message": "", "components": [
                    {"id": "f", "type": "form", "children": [
                        {"id": "a", "type": "input"},
                        {"id": "a", "type": "text"}
                    ]}
                ]}"#,
            )
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateSiblingId {
                id: "a".to_string(),
                parent: "f".to_string()
            }
        );
    }
}
