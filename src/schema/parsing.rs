use super::node::*;
use super::ApiConfig;
use crate::error::SchemaError;
use ahash::AHashMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A component as found on the wire, before its kind has been interpreted.
#[derive(Debug, Clone)]
pub struct RawComponent {
    pub id: String,
    pub kind: String,
    /// Every field other than `id`, `type` and `children`.
    pub fields: Map<String, Value>,
    pub children: Option<Vec<Value>>,
}

impl RawComponent {
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let mut fields = value
            .as_object()
            .cloned()
            .ok_or_else(|| SchemaError::JsonParseError(format!("expected an object, found {}", value)))?;

        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            _ => {
                return Err(SchemaError::JsonParseError(
                    "component is missing a string 'id'".to_string(),
                ));
            }
        };
        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => {
                return Err(SchemaError::InvalidComponent {
                    node_id: id,
                    kind: "<missing>".to_string(),
                    message: "component is missing a string 'type'".to_string(),
                });
            }
        };
        let children = match fields.remove("children") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                return Err(SchemaError::InvalidComponent {
                    node_id: id,
                    kind,
                    message: format!("'children' must be an array, found {}", other),
                });
            }
        };

        Ok(Self {
            id,
            kind,
            fields,
            children,
        })
    }

    /// Deserializes the kind-specific payload from the remaining fields.
    pub fn spec<T: DeserializeOwned>(&self) -> Result<T, SchemaError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            SchemaError::InvalidComponent {
                node_id: self.id.clone(),
                kind: self.kind.clone(),
                message: e.to_string(),
            }
        })
    }
}

/// Defines the contract for interpreting one component kind.
pub trait ComponentParser: Send + Sync {
    fn kind_name(&self) -> &str;
    fn parse(
        &self,
        raw: &RawComponent,
        children: Vec<ComponentNode>,
    ) -> Result<ComponentKind, SchemaError>;
}

/// Helper to refuse children on leaf kinds.
fn require_leaf(raw: &RawComponent, children: &[ComponentNode]) -> Result<(), SchemaError> {
    if children.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::ChildrenOnLeaf {
            node_id: raw.id.clone(),
            kind: raw.kind.clone(),
        })
    }
}

/// Defines the leaf parsers, their registration, and their creation by name.
macro_rules! define_component_parsers {
    ( $( ($struct_name:ident, $kind_name:literal, $variant:path, $spec:ty) ),* $(,)? ; $( ($group_struct:ident, $group_name:literal) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl ComponentParser for $struct_name {
                fn kind_name(&self) -> &str { $kind_name }
                fn parse(&self, raw: &RawComponent, children: Vec<ComponentNode>) -> Result<ComponentKind, SchemaError> {
                    require_leaf(raw, &children)?;
                    raw.spec::<$spec>().map($variant)
                }
            }
        )*

        pub(super) fn register_default_parsers(registry: &mut AHashMap<String, Box<dyn ComponentParser>>) {
            $( registry.insert($kind_name.to_string(), Box::new($struct_name)); )*
            $( registry.insert($group_name.to_string(), Box::new($group_struct)); )*
        }

        pub(super) fn create_parser_by_name(name: &str) -> Option<Box<dyn ComponentParser>> {
            match name {
                $( $kind_name => Some(Box::new($struct_name)), )*
                $( $group_name => Some(Box::new($group_struct)), )*
                _ => None,
            }
        }
    };
}

define_component_parsers! {
    (InputParser, "input", ComponentKind::Input, TextSpec),
    (TextParser, "text", ComponentKind::Text, TextSpec),
    (SelectParser, "select", ComponentKind::Select, SelectSpec),
    (SwitchParser, "switch", ComponentKind::Switch, SwitchSpec),
    (DateParser, "date", ComponentKind::Date, DateSpec),
    (MapParser, "map", ComponentKind::Map, MapSpec),
    (RatingParser, "rating", ComponentKind::Rating, RatingSpec),
    (ButtonParser, "button", ComponentKind::Button, ButtonSpec)

    ; // Separator between leaves and groups

    (ContainerParser, "container"),
    (FormParser, "form")
}

struct ContainerParser;

impl ComponentParser for ContainerParser {
    fn kind_name(&self) -> &str {
        "container"
    }

    fn parse(
        &self,
        raw: &RawComponent,
        children: Vec<ComponentNode>,
    ) -> Result<ComponentKind, SchemaError> {
        let options: GroupOptions = raw.spec()?;
        Ok(ComponentKind::Container(GroupSpec {
            layout: options.layout,
            children,
        }))
    }
}

struct FormParser;

impl ComponentParser for FormParser {
    fn kind_name(&self) -> &str {
        "form"
    }

    fn parse(
        &self,
        raw: &RawComponent,
        children: Vec<ComponentNode>,
    ) -> Result<ComponentKind, SchemaError> {
        let options: GroupOptions = raw.spec()?;
        let api_config = match raw.fields.get("apiConfig") {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value::<ApiConfig>(value.clone()).map_err(
                |e| SchemaError::InvalidComponent {
                    node_id: raw.id.clone(),
                    kind: raw.kind.clone(),
                    message: format!("invalid apiConfig: {}", e),
                },
            )?),
        };
        Ok(ComponentKind::Form(FormSpec {
            layout: options.layout,
            children,
            api_config,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_component_splits_out_structure() {
        let raw = RawComponent::from_value(&json!({
            "id": "c", "type": "container", "layout": "grid", "children": []
        }))
        .unwrap();
        assert_eq!(raw.id, "c");
        assert_eq!(raw.kind, "container");
        assert_eq!(raw.children.as_ref().map(Vec::len), Some(0));
        assert!(raw.fields.contains_key("layout"));
    }

    #[test]
    fn leaf_parser_rejects_children() {
        let raw = RawComponent::from_value(&json!({"id": "x", "type": "input"})).unwrap();
        let child = ComponentNode::new("y", ComponentKind::Map(MapSpec::default()));
        let err = InputParser.parse(&raw, vec![child]).unwrap_err();
        assert!(matches!(err, SchemaError::ChildrenOnLeaf { .. }));
    }

    #[test]
    fn unknown_input_subtype_falls_back_to_text() {
        let raw = RawComponent::from_value(&json!({"id": "x", "type": "input", "inputType": "color"}))
            .unwrap();
        let kind = InputParser.parse(&raw, vec![]).unwrap();
        assert_eq!(
            kind,
            ComponentKind::Input(TextSpec {
                input_type: InputSubtype::Text,
                ..TextSpec::default()
            })
        );
    }

    #[test]
    fn every_builtin_kind_is_creatable_by_name() {
        for name in [
            "input", "text", "select", "switch", "date", "map", "rating", "button", "container",
            "form",
        ] {
            let parser = create_parser_by_name(name).unwrap();
            assert_eq!(parser.kind_name(), name);
        }
        assert!(create_parser_by_name("carousel").is_none());
    }
}
