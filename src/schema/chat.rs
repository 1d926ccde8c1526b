use super::{ApiConfig, ComponentKind, ComponentNode, SchemaLoader};
use crate::state::FieldPath;
use ahash::AHashMap;
use itertools::Itertools;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// The full declarative tree plus the prompt for one conversation turn.
///
/// Immutable once received; a new turn replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatSchema {
    pub id: String,
    pub message: String,
    pub components: Vec<ComponentNode>,
}

/// An id that occurs at more than one path in a schema tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    pub id: String,
    pub paths: Vec<FieldPath>,
}

/// The form whose answers are sent when the conversation submits.
#[derive(Debug, Clone, Copy)]
pub struct ActiveForm<'a> {
    pub node: &'a ComponentNode,
    pub api_config: &'a ApiConfig,
}

impl ChatSchema {
    pub fn new(id: impl Into<String>, message: impl Into<String>, components: Vec<ComponentNode>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            components,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, crate::error::SchemaError> {
        SchemaLoader::shared().parse_str(json)
    }

    /// Every node with its id-path, depth-first in schema order.
    pub fn nodes(&self) -> Vec<(FieldPath, &ComponentNode)> {
        let mut out = Vec::new();
        walk(&self.components, &FieldPath::root(), &mut |path, node| {
            out.push((path.clone(), node))
        });
        out
    }

    /// Only the leaves, depth-first.
    pub fn leaves(&self) -> Vec<(FieldPath, &ComponentNode)> {
        self.nodes()
            .into_iter()
            .filter(|(_, node)| !node.is_group())
            .collect()
    }

    pub fn resolve(&self, path: &FieldPath) -> Option<&ComponentNode> {
        resolve(&self.components, path)
    }

    /// The path of the first node with `id`, depth-first.
    pub fn path_of(&self, id: &str) -> Option<FieldPath> {
        self.nodes()
            .into_iter()
            .find(|(_, node)| node.id == id)
            .map(|(path, _)| path)
    }

    /// The first form carrying an `ApiConfig`, with its path.
    pub fn active_form(&self) -> Option<(FieldPath, ActiveForm<'_>)> {
        self.nodes().into_iter().find_map(|(path, node)| match &node.kind {
            ComponentKind::Form(form) => form
                .api_config
                .as_ref()
                .map(|api_config| (path, ActiveForm { node, api_config })),
            _ => None,
        })
    }

    /// Ids used at more than one path. Flat error maps key on bare ids, so any
    /// entry here means two nodes would share one error slot.
    pub fn duplicate_ids(&self) -> Vec<DuplicateId> {
        let mut by_id: AHashMap<&str, Vec<FieldPath>> = AHashMap::new();
        for (path, node) in self.nodes() {
            by_id.entry(node.id.as_str()).or_default().push(path);
        }
        by_id
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(id, paths)| DuplicateId {
                id: id.to_string(),
                paths,
            })
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .collect()
    }
}

/// Visits `components` and their descendants depth-first, passing each node's path.
pub fn walk<'a, F>(components: &'a [ComponentNode], parent: &FieldPath, visit: &mut F)
where
    F: FnMut(&FieldPath, &'a ComponentNode),
{
    for node in components {
        let path = parent.child(&node.id);
        visit(&path, node);
        walk(node.children(), &path, visit);
    }
}

/// Follows `path` through the tree by matching ids at each depth.
pub fn resolve<'a>(components: &'a [ComponentNode], path: &FieldPath) -> Option<&'a ComponentNode> {
    let (first, rest) = path.segments().split_first()?;
    let node = components.iter().find(|n| &n.id == first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        resolve(node.children(), &FieldPath::new(rest.iter().cloned()))
    }
}

impl ComponentNode {
    /// Rebuilds the wire representation of this node.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id.clone()));
        object.insert("type".to_string(), Value::String(self.kind.name().to_string()));
        if let Some(label) = &self.label {
            object.insert("label".to_string(), Value::String(label.clone()));
        }
        if self.required {
            object.insert("required".to_string(), Value::Bool(true));
        }
        if let Some(rule) = &self.validation {
            object.insert("validation".to_string(), serde_json::to_value(rule)?);
        }

        let spec = match &self.kind {
            ComponentKind::Input(spec) | ComponentKind::Text(spec) => serde_json::to_value(spec)?,
            ComponentKind::Select(spec) => serde_json::to_value(spec)?,
            ComponentKind::Switch(spec) => serde_json::to_value(spec)?,
            ComponentKind::Date(spec) => serde_json::to_value(spec)?,
            ComponentKind::Map(spec) => serde_json::to_value(spec)?,
            ComponentKind::Rating(spec) => serde_json::to_value(spec)?,
            ComponentKind::Button(spec) => serde_json::to_value(spec)?,
            ComponentKind::Container(group) => {
                serde_json::json!({ "layout": group.layout, "children": children_json(&group.children)? })
            }
            ComponentKind::Form(form) => {
                let mut value = serde_json::json!({ "layout": form.layout, "children": children_json(&form.children)? });
                if let Some(api_config) = &form.api_config {
                    value["apiConfig"] = serde_json::to_value(api_config)?;
                }
                value
            }
            ComponentKind::Unknown { raw, .. } => Value::Object(raw.clone()),
        };
        if let Value::Object(fields) = spec {
            object.extend(fields);
        }
        Ok(Value::Object(object))
    }
}

fn children_json(children: &[ComponentNode]) -> Result<Vec<Value>, serde_json::Error> {
    children.iter().map(ComponentNode::to_json).collect()
}

impl Serialize for ComponentNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ComponentNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SchemaLoader::shared()
            .parse_node(&value)
            .map_err(D::Error::custom)
    }
}

impl<'de> Deserialize<'de> for ChatSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SchemaLoader::shared()
            .parse_schema(&value)
            .map_err(D::Error::custom)
    }
}
