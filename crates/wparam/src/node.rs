//! The parameter-or-group union and JSON decoding.

use crate::error::{ParamError, Result};
use crate::group::ParameterGroup;
use crate::parameter::Parameter;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A child of a [`ParameterGroup`]: a parameter or a nested group.
///
/// On the wire the two are told apart by the presence of a `children` key.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A single setting.
    Param(Parameter),
    /// A nested group.
    Group(ParameterGroup),
}

impl Node {
    /// Decode from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let is_group = map.contains_key("children");
                let value = serde_json::Value::Object(map);
                if is_group {
                    Ok(Node::Group(serde_json::from_value(value)?))
                } else {
                    Ok(Node::Param(serde_json::from_value(value)?))
                }
            }
            other => Err(ParamError::InvalidShape(format!(
                "expected an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Param(p) => p.name(),
            Node::Group(g) => g.name(),
        }
    }

    pub fn as_param(&self) -> Option<&Parameter> {
        match self {
            Node::Param(p) => Some(p),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&ParameterGroup> {
        match self {
            Node::Group(g) => Some(g),
            Node::Param(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl From<Parameter> for Node {
    fn from(p: Parameter) -> Self {
        Node::Param(p)
    }
}

impl From<ParameterGroup> for Node {
    fn from(g: ParameterGroup) -> Self {
        Node::Group(g)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Param(p) => p.serialize(serializer),
            Node::Group(g) => g.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Node::from_value(value).map_err(|e| match e {
            // Re-wrapped by the outer decode; keep only the serde message.
            ParamError::Json(inner) => serde::de::Error::custom(inner),
            other => serde::de::Error::custom(other),
        })
    }
}

/// Rebuild a parameter or group from JSON text produced by
/// [`ParameterGroup::dumps`].
///
/// A mapping with a `children` key becomes a group (recursively); any other
/// mapping becomes a single parameter.
pub fn load_param(json: &str) -> Result<Node> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    load_param_value(value)
}

/// [`load_param`] for input the host has already parsed.
pub fn load_param_value(value: serde_json::Value) -> Result<Node> {
    let node = Node::from_value(value)?;
    log::debug!("loaded {} '{}'", if node.is_group() { "group" } else { "parameter" }, node.name());
    Ok(node)
}
