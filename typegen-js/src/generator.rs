use crate::error::EvaluateError;
use crate::error::SchemaError;
use crate::query::safe_parse_query;
use crate::query::QueryBackend;
use crate::schema::ObjectAttribute;
use crate::schema::ObjectRest;
use crate::schema::ObjectTypeNode;
use crate::schema::SchemaDecl;
use crate::schema::TypeNode;
use crate::ts::PropertyKey;
use crate::ts::TsKeyword;
use crate::ts::TsProperty;
use crate::ts::TsType;
use ahash::AHashMap;
use ahash::AHashSet;
use dashmap::DashMap;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Captures;
use regex::Regex;
use scope_js::num::JsNumber;
use serde::Serialize;
use std::ops::Add;
use tracing::debug;
use tracing::debug_span;

/// Identifier of the unique symbol used to mark references with the type they resolve to.
pub const INTERNAL_REFERENCE_SYMBOL: &str = "internalGroqTypeReferenceTo";
/// Helper type for arrays whose items carry a synthetic `_key`.
pub const ARRAY_OF: &str = "ArrayOf";
pub const ALL_SANITY_SCHEMA_TYPES: &str = "AllSanitySchemaTypes";
pub const DEFAULT_SCHEMA: &str = "DefaultSchema";
pub const SANITY_QUERIES: &str = "SanityQueries";
pub const SANITY_SCHEMAS: &str = "SanitySchemas";
pub const SANITY_DOCUMENT_PROJECTIONS: &str = "SanityDocumentProjections";
/// Generic wrapping a projection's result type with the document type it was evaluated for.
pub const PROJECTION_BASE: &str = "ProjectionBase";

/// Names the generated file declares itself, which schema types must not take.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
  ARRAY_OF,
  ALL_SANITY_SCHEMA_TYPES,
  DEFAULT_SCHEMA,
  SANITY_QUERIES,
  SANITY_SCHEMAS,
  SANITY_DOCUMENT_PROJECTIONS,
  PROJECTION_BASE,
];

static LEADING_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]").expect("pattern is valid"));
static INVALID_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^$A-Za-z0-9_]+(.)").expect("pattern is valid"));

/// Makes `input` a valid identifier: a leading digit becomes `_`, each run of invalid characters is removed and the character after it upper-cased, and trailing invalid characters are dropped.
pub fn sanitize_identifier(input: &str) -> String {
  let out = LEADING_DIGIT.replace(input, "_");
  let out = INVALID_RUN.replace_all(&out, |caps: &Captures| caps[1].to_uppercase());
  out
    .trim_end_matches(|c: char| !(c == '$' || c == '_' || c.is_ascii_alphanumeric()))
    .to_string()
}

/// [`sanitize_identifier`], with the first letter upper-cased.
pub fn normalize_identifier(input: &str) -> String {
  let sanitized = sanitize_identifier(input);
  let mut chars = sanitized.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => sanitized,
  }
}

/// Returns `desired`, or the first of `desired_2`, `desired_3`, ... not in `taken`, and marks it as taken.
pub fn unique_identifier(desired: &str, taken: &mut AHashSet<String>) -> String {
  let mut candidate = desired.to_string();
  let mut index = 2;
  while taken.contains(&candidate) {
    candidate = format!("{desired}_{index}");
    index += 1;
  }
  taken.insert(candidate.clone());
  candidate
}

/// Counts over an evaluated type node. See [`TypeEvaluationStats::of`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeEvaluationStats {
  pub all_types: usize,
  pub unknown_types: usize,
  pub empty_unions: usize,
}

impl Add for TypeEvaluationStats {
  type Output = TypeEvaluationStats;

  fn add(self, rhs: TypeEvaluationStats) -> TypeEvaluationStats {
    TypeEvaluationStats {
      all_types: self.all_types + rhs.all_types,
      unknown_types: self.unknown_types + rhs.unknown_types,
      empty_unions: self.empty_unions + rhs.empty_unions,
    }
  }
}

impl TypeEvaluationStats {
  const ONE: TypeEvaluationStats = TypeEvaluationStats {
    all_types: 1,
    unknown_types: 0,
    empty_unions: 0,
  };

  /// Every node is counted once in `all_types`, containers included. An object whose rest is unknown counts as one object plus one unknown, whatever its attributes.
  pub fn of(node: &TypeNode) -> TypeEvaluationStats {
    match node {
      TypeNode::Unknown => TypeEvaluationStats {
        all_types: 1,
        unknown_types: 1,
        empty_unions: 0,
      },
      TypeNode::Array { of } => TypeEvaluationStats::of(of) + TypeEvaluationStats::ONE,
      TypeNode::Object(object) => TypeEvaluationStats::of_object(object),
      TypeNode::Union { of } if of.is_empty() => TypeEvaluationStats {
        all_types: 1,
        unknown_types: 0,
        empty_unions: 1,
      },
      TypeNode::Union { of } => of
        .iter()
        .map(TypeEvaluationStats::of)
        .fold(TypeEvaluationStats::ONE, Add::add),
      _ => TypeEvaluationStats::ONE,
    }
  }

  fn of_object(object: &ObjectTypeNode) -> TypeEvaluationStats {
    let rest = match object.rest.as_deref() {
      Some(ObjectRest::Unknown) => {
        return TypeEvaluationStats {
          all_types: 2,
          unknown_types: 1,
          empty_unions: 0,
        };
      }
      Some(ObjectRest::Object(rest)) => TypeEvaluationStats::of_object(rest),
      Some(ObjectRest::Inline { .. }) => TypeEvaluationStats::ONE,
      None => TypeEvaluationStats::default(),
    };
    object
      .attributes
      .values()
      .map(|attr| TypeEvaluationStats::of(&attr.value))
      .fold(rest + TypeEvaluationStats::ONE, Add::add)
  }
}

/// The result type of a query, with statistics about the evaluated node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaluatedType {
  pub ty: TsType,
  pub stats: TypeEvaluationStats,
}

/// A schema declaration with its generated identifier and type.
#[derive(Clone, Copy, Debug)]
pub struct GeneratedSchemaType<'a> {
  pub name: &'a str,
  pub identifier: &'a str,
  pub ty: &'a TsType,
}

/// Translates a schema into TypeScript types, and evaluates query result types against it.
///
/// All schema types are translated at construction; afterwards the generator is read-only apart from its query cache and can be shared between threads.
pub struct SchemaTypeGenerator {
  schema_id: String,
  schema: Vec<SchemaDecl>,
  identifiers: IndexMap<String, String>,
  types: AHashMap<String, TsType>,
  cache: DashMap<String, EvaluatedType>,
}

impl SchemaTypeGenerator {
  pub fn new(schema: Vec<SchemaDecl>) -> Result<SchemaTypeGenerator, SchemaError> {
    SchemaTypeGenerator::with_schema_id(schema, "default")
  }

  pub fn with_schema_id(schema: Vec<SchemaDecl>, schema_id: &str) -> Result<SchemaTypeGenerator, SchemaError> {
    let _span = debug_span!("schema_type_generator", schema_id, types = schema.len()).entered();
    let mut names = AHashSet::new();
    for decl in schema.iter() {
      if !names.insert(decl.name()) {
        return Err(SchemaError::DuplicateTypeName {
          name: decl.name().to_string(),
          schema_id: schema_id.to_string(),
        });
      };
    }

    let mut taken: AHashSet<String> = RESERVED_IDENTIFIERS.iter().map(|s| s.to_string()).collect();
    let identifiers: IndexMap<String, String> = schema
      .iter()
      .map(|decl| {
        let identifier = unique_identifier(&normalize_identifier(decl.name()), &mut taken);
        (decl.name().to_string(), identifier)
      })
      .collect();

    let mut generator = SchemaTypeGenerator {
      schema_id: schema_id.to_string(),
      schema: Vec::new(),
      identifiers,
      types: AHashMap::new(),
      cache: DashMap::new(),
    };
    let types: AHashMap<String, TsType> = schema
      .iter()
      .map(|decl| (decl.name().to_string(), generator.translate_decl(decl)))
      .collect();
    generator.types = types;
    generator.schema = schema;
    Ok(generator)
  }

  pub fn schema_id(&self) -> &str {
    &self.schema_id
  }

  pub fn schema(&self) -> &[SchemaDecl] {
    &self.schema
  }

  /// Schema type names, in declaration order.
  pub fn type_names(&self) -> impl Iterator<Item = &str> {
    self.identifiers.keys().map(|k| k.as_str())
  }

  pub fn has_type(&self, name: &str) -> bool {
    self.identifiers.contains_key(name)
  }

  pub fn identifier(&self, name: &str) -> Option<&str> {
    self.identifiers.get(name).map(|i| i.as_str())
  }

  pub fn get_type(&self, name: &str) -> Option<GeneratedSchemaType<'_>> {
    let (name, identifier) = self.identifiers.get_key_value(name)?;
    Some(GeneratedSchemaType {
      name,
      identifier,
      ty: self.types.get(name)?,
    })
  }

  /// All schema types, in declaration order.
  pub fn iter(&self) -> impl Iterator<Item = GeneratedSchemaType<'_>> {
    self.identifiers.iter().filter_map(|(name, identifier)| {
      Some(GeneratedSchemaType {
        name,
        identifier,
        ty: self.types.get(name)?,
      })
    })
  }

  /// Evaluates the result type of `query` against the schema. Successful results are cached by query string.
  pub fn evaluate_query<B: QueryBackend + ?Sized>(
    &self,
    backend: &B,
    query: &str,
  ) -> Result<EvaluatedType, EvaluateError> {
    if let Some(cached) = self.cache.get(query) {
      return Ok(cached.clone());
    };
    let _span = debug_span!("evaluate_query", schema_id = %self.schema_id).entered();
    let ast = safe_parse_query(backend, query)?;
    let node = backend.evaluate(&ast, &self.schema)?;
    let evaluated = EvaluatedType {
      ty: self.translate(&node),
      stats: TypeEvaluationStats::of(&node),
    };
    debug!(
      all_types = evaluated.stats.all_types,
      unknown_types = evaluated.stats.unknown_types,
      empty_unions = evaluated.stats.empty_unions,
      "evaluated query type"
    );
    self.cache.insert(query.to_string(), evaluated.clone());
    Ok(evaluated)
  }

  /// Evaluates an object projection such as `{_id, title}` against each document type in the schema.
  ///
  /// Each document type whose projected result is an object with at least one non-null attribute contributes `ProjectionBase<Result, "documentType">`; several are combined into a union, whose stats count the union node too. `None` when no document type matches.
  pub fn evaluate_projection<B: QueryBackend + ?Sized>(
    &self,
    backend: &B,
    projection: &str,
  ) -> Result<Option<EvaluatedType>, EvaluateError> {
    let _span = debug_span!("evaluate_projection", schema_id = %self.schema_id).entered();
    let ast = safe_parse_query(backend, projection)?;
    if !backend.is_object(&ast) {
      return Err(EvaluateError::InvalidProjection(projection.to_string()));
    };

    let mut results = Vec::new();
    for decl in self.schema.iter() {
      let SchemaDecl::Document { name, .. } = decl else {
        continue;
      };
      let query = format!("* [_type=={}] {projection} [0]", serde_json::Value::from(name.as_str()));
      let ast = safe_parse_query(backend, &query)?;
      // `T | null` from the trailing `[0]`.
      let TypeNode::Union { of } = backend.evaluate(&ast, &self.schema)? else {
        continue;
      };
      if of.len() != 2 {
        continue;
      };
      let Some(TypeNode::Object(object)) = of.iter().find(|node| !matches!(node, TypeNode::Null)) else {
        continue;
      };
      if omits_projection(object) {
        debug!(document = %name, "projection selects nothing from document type");
        continue;
      };
      results.push(EvaluatedType {
        ty: TsType::generic(PROJECTION_BASE, vec![
          self.translate_object(object),
          TsType::string_lit(name.clone()),
        ]),
        stats: TypeEvaluationStats::of_object(object),
      });
    }

    if results.len() < 2 {
      return Ok(results.pop());
    };
    let stats = results
      .iter()
      .map(|r| r.stats)
      .fold(TypeEvaluationStats::ONE, Add::add);
    Ok(Some(EvaluatedType {
      ty: TsType::union(results.into_iter().map(|r| r.ty).collect()),
      stats,
    }))
  }

  fn translate_decl(&self, decl: &SchemaDecl) -> TsType {
    match decl {
      SchemaDecl::Type { value, .. } => self.translate(value),
      SchemaDecl::Document { attributes, .. } => TsType::Literal {
        members: attributes.iter().map(|(k, a)| self.translate_attribute(k, a)).collect(),
      },
    }
  }

  /// Translates a type node to the TypeScript type describing it.
  pub fn translate(&self, node: &TypeNode) -> TsType {
    match node {
      TypeNode::String { value: Some(value) } => TsType::string_lit(value.clone()),
      TypeNode::String { value: None } => TsType::keyword(TsKeyword::String),
      TypeNode::Number { value: Some(value) } => TsType::NumberLit {
        value: JsNumber(*value),
      },
      TypeNode::Number { value: None } => TsType::keyword(TsKeyword::Number),
      TypeNode::Boolean { value: Some(value) } => TsType::BooleanLit { value: *value },
      TypeNode::Boolean { value: None } => TsType::keyword(TsKeyword::Boolean),
      TypeNode::Null => TsType::keyword(TsKeyword::Null),
      TypeNode::Unknown => TsType::unknown(),
      TypeNode::Array { of } => self.translate_array(of),
      TypeNode::Object(object) => self.translate_object(object),
      TypeNode::Union { of } => match of.as_slice() {
        [] => TsType::never(),
        [single] => self.translate(single),
        members => TsType::union(members.iter().map(|m| self.translate(m)).collect()),
      },
      TypeNode::Inline { name } => self.translate_inline(name),
    }
  }

  fn translate_array(&self, of: &TypeNode) -> TsType {
    match of {
      TypeNode::Inline { .. } => TsType::generic(ARRAY_OF, vec![self.translate(of)]),
      TypeNode::Union { of: members } if !members.is_empty() => {
        let (inline, other): (Vec<TypeNode>, Vec<TypeNode>) = members.iter().cloned().partition(TypeNode::is_inline);
        if other.is_empty() {
          return TsType::generic(ARRAY_OF, vec![self.translate(of)]);
        };
        if inline.is_empty() {
          return TsType::generic("Array", vec![self.translate(of)]);
        };
        TsType::union(vec![
          self.translate_array(&TypeNode::union(inline)),
          self.translate_array(&TypeNode::union(other)),
        ])
      }
      _ => TsType::generic("Array", vec![self.translate(of)]),
    }
  }

  fn translate_attribute(&self, key: &str, attribute: &ObjectAttribute) -> TsProperty {
    TsProperty {
      key: PropertyKey::Identifier {
        name: sanitize_identifier(key),
      },
      optional: attribute.optional,
      ty: self.translate(&attribute.value),
    }
  }

  fn translate_object(&self, object: &ObjectTypeNode) -> TsType {
    let mut members: Vec<TsProperty> = object
      .attributes
      .iter()
      .map(|(k, a)| self.translate_attribute(k, a))
      .collect();
    match object.rest.as_deref() {
      Some(ObjectRest::Unknown) => return TsType::unknown(),
      Some(ObjectRest::Object(rest)) => {
        members.extend(rest.attributes.iter().map(|(k, a)| self.translate_attribute(k, a)));
      }
      Some(ObjectRest::Inline { name }) => {
        let resolved = self.translate_inline(name);
        if resolved.is_unknown() {
          return resolved;
        };
        return TsType::Intersection {
          types: vec![TsType::Literal { members }, resolved],
        };
      }
      None => {}
    };
    if let Some(target) = &object.dereferences_to {
      members.push(TsProperty {
        key: PropertyKey::Computed {
          name: INTERNAL_REFERENCE_SYMBOL.to_string(),
        },
        optional: true,
        ty: TsType::string_lit(target.clone()),
      });
    };
    TsType::Literal { members }
  }

  fn translate_inline(&self, name: &str) -> TsType {
    match self.identifiers.get(name) {
      Some(identifier) => TsType::reference(identifier.clone()),
      None => TsType::Annotated {
        ty: Box::new(TsType::unknown()),
        comment: format!(
          " Unable to locate the referenced type \"{name}\" in schema \"{}\" ",
          self.schema_id
        ),
      },
    }
  }
}

// Unknown rest, or every attribute null.
fn omits_projection(object: &ObjectTypeNode) -> bool {
  match object.rest.as_deref() {
    Some(ObjectRest::Unknown) => return true,
    Some(ObjectRest::Object(rest)) if omits_projection(rest) => return true,
    _ => {}
  };
  object
    .attributes
    .values()
    .all(|attr| matches!(attr.value, TypeNode::Null))
}

#[cfg(test)]
mod tests {
  use super::normalize_identifier;
  use super::omits_projection;
  use super::sanitize_identifier;
  use super::SchemaTypeGenerator;
  use super::TypeEvaluationStats;
  use crate::error::SchemaError;
  use crate::schema::ObjectAttribute;
  use crate::schema::ObjectRest;
  use crate::schema::ObjectTypeNode;
  use crate::schema::SchemaDecl;
  use crate::schema::TypeNode;

  fn alias(name: &str, value: TypeNode) -> SchemaDecl {
    SchemaDecl::Type {
      name: name.to_string(),
      value,
    }
  }

  fn object(attributes: &[(&str, TypeNode)]) -> ObjectTypeNode {
    ObjectTypeNode::new(
      attributes
        .iter()
        .map(|(k, v)| (k.to_string(), ObjectAttribute::required(v.clone()))),
    )
  }

  fn generated(generator: &SchemaTypeGenerator, name: &str) -> String {
    generator.get_type(name).unwrap().ty.to_string()
  }

  #[test]
  fn test_sanitize_identifier() {
    assert_eq!(sanitize_identifier("foo.bar"), "fooBar");
    assert_eq!(sanitize_identifier("foo--bar"), "fooBar");
    assert_eq!(sanitize_identifier("1st"), "_st");
    assert_eq!(sanitize_identifier("sanity.imageAsset"), "sanityImageAsset");
    assert_eq!(sanitize_identifier("trailing-"), "trailing");
    assert_eq!(sanitize_identifier("_key"), "_key");
    assert_eq!(normalize_identifier("blockContent"), "BlockContent");
    assert_eq!(normalize_identifier("$ref"), "$ref");
  }

  #[test]
  fn test_duplicate_names_fail() {
    let err = SchemaTypeGenerator::new(vec![
      alias("post", TypeNode::string()),
      SchemaDecl::Document {
        name: "post".to_string(),
        attributes: Default::default(),
      },
    ])
    .err()
    .unwrap();
    assert_eq!(err, SchemaError::DuplicateTypeName {
      name: "post".to_string(),
      schema_id: "default".to_string(),
    });
    assert_eq!(
      err.to_string(),
      "Duplicate type name \"post\" in schema \"default\". Type names must be unique within the same schema."
    );
  }

  #[test]
  fn test_colliding_identifiers_are_suffixed() {
    let generator = SchemaTypeGenerator::new(vec![
      alias("foo.bar", TypeNode::string()),
      alias("foo-bar", TypeNode::number()),
      alias("foo--bar", TypeNode::Null),
      alias("defaultSchema", TypeNode::Null),
    ])
    .unwrap();
    assert_eq!(generator.type_names().collect::<Vec<_>>(), vec![
      "foo.bar",
      "foo-bar",
      "foo--bar",
      "defaultSchema"
    ]);
    assert_eq!(generator.identifier("foo.bar"), Some("FooBar"));
    assert_eq!(generator.identifier("foo-bar"), Some("FooBar_2"));
    assert_eq!(generator.identifier("foo--bar"), Some("FooBar_3"));
    assert_eq!(generator.identifier("defaultSchema"), Some("DefaultSchema_2"));
  }

  #[test]
  fn test_scalars_and_unions() {
    let generator = SchemaTypeGenerator::new(vec![
      alias("s", TypeNode::string_lit("literal")),
      alias("n", TypeNode::Number { value: Some(123.0) }),
      alias("b", TypeNode::Boolean { value: None }),
      alias("never", TypeNode::union(Vec::new())),
      alias("one", TypeNode::union(vec![TypeNode::string()])),
      alias("many", TypeNode::union(vec![TypeNode::string(), TypeNode::Null])),
    ])
    .unwrap();
    assert_eq!(generated(&generator, "s"), "\"literal\"");
    assert_eq!(generated(&generator, "n"), "123");
    assert_eq!(generated(&generator, "b"), "boolean");
    assert_eq!(generated(&generator, "never"), "never");
    assert_eq!(generated(&generator, "one"), "string");
    assert_eq!(generated(&generator, "many"), "string | null");
  }

  #[test]
  fn test_inline_references() {
    let generator = SchemaTypeGenerator::new(vec![
      alias("slug", TypeNode::string()),
      alias("ref", TypeNode::inline("slug")),
      alias("missing", TypeNode::inline("nowhere")),
    ])
    .unwrap();
    assert_eq!(generated(&generator, "ref"), "Slug");
    assert_eq!(
      generated(&generator, "missing"),
      "unknown /* Unable to locate the referenced type \"nowhere\" in schema \"default\" */"
    );
  }

  #[test]
  fn test_arrays() {
    let generator = SchemaTypeGenerator::new(vec![
      alias("block", TypeNode::string()),
      alias("image", TypeNode::string()),
      alias("plain", TypeNode::array(TypeNode::string())),
      alias("blocks", TypeNode::array(TypeNode::inline("block"))),
      alias(
        "mixed",
        TypeNode::array(TypeNode::union(vec![TypeNode::inline("block"), TypeNode::inline("image")])),
      ),
      alias(
        "split",
        TypeNode::array(TypeNode::union(vec![
          TypeNode::inline("block"),
          TypeNode::string(),
          TypeNode::inline("image"),
          TypeNode::number(),
        ])),
      ),
    ])
    .unwrap();
    assert_eq!(generated(&generator, "plain"), "Array<string>");
    assert_eq!(generated(&generator, "blocks"), "ArrayOf<Block>");
    assert_eq!(generated(&generator, "mixed"), "ArrayOf<Block | Image>");
    assert_eq!(generated(&generator, "split"), "ArrayOf<Block | Image> | Array<string | number>");
  }

  #[test]
  fn test_objects() {
    let mut with_deref = object(&[("_ref", TypeNode::string())]);
    with_deref.dereferences_to = Some("author".to_string());
    let mut unknown_rest = object(&[("a", TypeNode::string())]);
    unknown_rest.rest = Some(Box::new(ObjectRest::Unknown));
    let mut object_rest = object(&[("a", TypeNode::string())]);
    object_rest.rest = Some(Box::new(ObjectRest::Object(object(&[("b-c", TypeNode::number())]))));
    let mut inline_rest = object(&[("a", TypeNode::string())]);
    inline_rest.rest = Some(Box::new(ObjectRest::Inline {
      name: "author".to_string(),
    }));
    let mut missing_rest = object(&[("a", TypeNode::string())]);
    missing_rest.rest = Some(Box::new(ObjectRest::Inline {
      name: "nowhere".to_string(),
    }));

    let generator = SchemaTypeGenerator::new(vec![
      SchemaDecl::Document {
        name: "author".to_string(),
        attributes: [("name".to_string(), ObjectAttribute::optional(TypeNode::string()))]
          .into_iter()
          .collect(),
      },
      alias("reference", TypeNode::Object(with_deref)),
      alias("unknownRest", TypeNode::Object(unknown_rest)),
      alias("objectRest", TypeNode::Object(object_rest)),
      alias("inlineRest", TypeNode::Object(inline_rest)),
      alias("missingRest", TypeNode::Object(missing_rest)),
    ])
    .unwrap();
    assert_eq!(generated(&generator, "author"), "{\n  name?: string;\n}");
    assert_eq!(
      generated(&generator, "reference"),
      "{\n  _ref: string;\n  [internalGroqTypeReferenceTo]?: \"author\";\n}"
    );
    assert_eq!(generated(&generator, "unknownRest"), "unknown");
    assert_eq!(generated(&generator, "objectRest"), "{\n  a: string;\n  bC: number;\n}");
    assert_eq!(generated(&generator, "inlineRest"), "{\n  a: string;\n} & Author");
    assert!(generator.get_type("missingRest").unwrap().ty.is_unknown());
    assert_eq!(generator.iter().map(|t| t.identifier).collect::<Vec<_>>(), vec![
      "Author",
      "Reference",
      "UnknownRest",
      "ObjectRest",
      "InlineRest",
      "MissingRest"
    ]);
  }

  #[test]
  fn test_stats() {
    assert_eq!(TypeEvaluationStats::of(&TypeNode::union(Vec::new())), TypeEvaluationStats {
      all_types: 1,
      unknown_types: 0,
      empty_unions: 1,
    });
    let mut unknown_rest = object(&[("a", TypeNode::string()), ("b", TypeNode::Unknown)]);
    unknown_rest.rest = Some(Box::new(ObjectRest::Unknown));
    assert_eq!(TypeEvaluationStats::of(&TypeNode::Object(unknown_rest)), TypeEvaluationStats {
      all_types: 2,
      unknown_types: 1,
      empty_unions: 0,
    });
    // array + object + string attribute + union + unknown + empty union
    let nested = TypeNode::array(TypeNode::Object(object(&[
      ("a", TypeNode::string()),
      ("b", TypeNode::union(vec![TypeNode::Unknown, TypeNode::union(Vec::new())])),
    ])));
    assert_eq!(TypeEvaluationStats::of(&nested), TypeEvaluationStats {
      all_types: 6,
      unknown_types: 1,
      empty_unions: 1,
    });
    // A single-member union still counts as a union node.
    assert_eq!(TypeEvaluationStats::of(&TypeNode::union(vec![TypeNode::string()])).all_types, 2);
  }

  #[test]
  fn test_omits_projection() {
    assert!(omits_projection(&object(&[("title", TypeNode::Null), ("_type", TypeNode::Null)])));
    assert!(omits_projection(&object(&[])));
    assert!(!omits_projection(&object(&[("title", TypeNode::Null), ("foo", TypeNode::string())])));
    let mut unknown_rest = object(&[("title", TypeNode::string())]);
    unknown_rest.rest = Some(Box::new(ObjectRest::Unknown));
    assert!(omits_projection(&unknown_rest));
    let mut null_rest = object(&[("title", TypeNode::string())]);
    null_rest.rest = Some(Box::new(ObjectRest::Object(object(&[("a", TypeNode::Null)]))));
    assert!(omits_projection(&null_rest));
  }
}
