//! The schema type algebra, as produced by schema extraction and by the query type evaluator.
//!
//! Nodes are (de)serialized as JSON objects tagged by `type`. Unknown tags fail deserialization.
use crate::error::SchemaError;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TypeNode {
  String {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
  },
  Number {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
  },
  Boolean {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<bool>,
  },
  Null,
  Unknown,
  Array {
    of: Box<TypeNode>,
  },
  Object(ObjectTypeNode),
  Union {
    of: Vec<TypeNode>,
  },
  Inline {
    name: String,
  },
}

impl TypeNode {
  pub fn string() -> TypeNode {
    TypeNode::String { value: None }
  }

  pub fn string_lit(value: impl Into<String>) -> TypeNode {
    TypeNode::String {
      value: Some(value.into()),
    }
  }

  pub fn number() -> TypeNode {
    TypeNode::Number { value: None }
  }

  pub fn array(of: TypeNode) -> TypeNode {
    TypeNode::Array { of: Box::new(of) }
  }

  pub fn union(of: Vec<TypeNode>) -> TypeNode {
    TypeNode::Union { of }
  }

  pub fn inline(name: impl Into<String>) -> TypeNode {
    TypeNode::Inline { name: name.into() }
  }

  pub fn is_inline(&self) -> bool {
    matches!(self, TypeNode::Inline { .. })
  }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeNode {
  #[serde(default)]
  pub attributes: IndexMap<String, ObjectAttribute>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rest: Option<Box<ObjectRest>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dereferences_to: Option<String>,
}

impl ObjectTypeNode {
  pub fn new(attributes: impl IntoIterator<Item = (String, ObjectAttribute)>) -> ObjectTypeNode {
    ObjectTypeNode {
      attributes: attributes.into_iter().collect(),
      ..ObjectTypeNode::default()
    }
  }
}

/// What else an object may contain beyond its listed attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectRest {
  Unknown,
  Object(ObjectTypeNode),
  Inline { name: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectAttribute {
  pub value: TypeNode,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub optional: bool,
}

impl ObjectAttribute {
  pub fn required(value: TypeNode) -> ObjectAttribute {
    ObjectAttribute {
      value,
      optional: false,
    }
  }

  pub fn optional(value: TypeNode) -> ObjectAttribute {
    ObjectAttribute { value, optional: true }
  }
}

/// A named entry of a schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SchemaDecl {
  /// A named alias for a type, e.g. an object or a string list.
  Type { name: String, value: TypeNode },
  Document {
    name: String,
    attributes: IndexMap<String, ObjectAttribute>,
  },
}

impl SchemaDecl {
  pub fn name(&self) -> &str {
    match self {
      SchemaDecl::Type { name, .. } | SchemaDecl::Document { name, .. } => name,
    }
  }
}

/// Parses a schema from its JSON form: an array of `type` and `document` declarations.
pub fn read_schema(json: &str) -> Result<Vec<SchemaDecl>, SchemaError> {
  Ok(serde_json::from_str(json)?)
}
