use crate::error::QueryError;
use crate::error::QueryEvaluationError;
use crate::extract::ExtractedModule;
use crate::extract::ExtractedProjection;
use crate::extract::ExtractedQuery;
use crate::generator::normalize_identifier;
use crate::generator::unique_identifier;
use crate::generator::SchemaTypeGenerator;
use crate::generator::TypeEvaluationStats;
use crate::generator::ALL_SANITY_SCHEMA_TYPES;
use crate::generator::ARRAY_OF;
use crate::generator::DEFAULT_SCHEMA;
use crate::generator::INTERNAL_REFERENCE_SYMBOL;
use crate::generator::PROJECTION_BASE;
use crate::generator::SANITY_DOCUMENT_PROJECTIONS;
use crate::generator::SANITY_QUERIES;
use crate::generator::SANITY_SCHEMAS;
use crate::options::TypeGenOptions;
use crate::query::QueryBackend;
use crate::ts::PropertyKey;
use crate::ts::TsDecl;
use crate::ts::TsInterface;
use crate::ts::TsKeyword;
use crate::ts::TsProperty;
use crate::ts::TsType;
use ahash::AHashSet;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::path::Path;
use tracing::debug;
use tracing::debug_span;
use tracing::info;
use tracing::warn;

#[derive(Clone, Debug, Serialize)]
pub struct EvaluatedQuery {
  /// Identifier of the generated result type.
  pub id: String,
  #[serde(flatten)]
  pub extracted: ExtractedQuery,
  pub ty: TsType,
  pub stats: TypeEvaluationStats,
}

#[derive(Clone, Debug, Serialize)]
pub struct EvaluatedProjection {
  /// Identifier of the generated result type.
  pub id: String,
  #[serde(flatten)]
  pub extracted: ExtractedProjection,
  pub ty: TsType,
  pub stats: TypeEvaluationStats,
}

#[derive(Clone, Debug)]
pub struct EvaluatedModule {
  pub filename: String,
  pub queries: Vec<EvaluatedQuery>,
  /// Projections that matched at least one document type.
  pub projections: Vec<EvaluatedProjection>,
  /// Extraction errors of the module followed by evaluation errors, in query order.
  pub errors: Vec<QueryError>,
}

/// Everything generated for one schema and a set of modules.
#[derive(Clone, Debug)]
pub struct GeneratedTypes {
  pub declarations: Vec<TsDecl>,
  pub code: String,
  pub modules: Vec<EvaluatedModule>,
}

impl GeneratedTypes {
  pub fn errors(&self) -> impl Iterator<Item = &QueryError> {
    self.modules.iter().flat_map(|m| m.errors.iter())
  }
}

/// Assembles the declarations file for a schema and the queries found in a project.
pub struct TypeGenerator {
  schema: SchemaTypeGenerator,
}

impl TypeGenerator {
  pub fn new(schema: SchemaTypeGenerator) -> TypeGenerator {
    TypeGenerator { schema }
  }

  pub fn schema(&self) -> &SchemaTypeGenerator {
    &self.schema
  }

  /// Generates declarations in file order: the `ProjectionBase` import when projections are typed, the reference symbol and array helper, schema types, the schema union and default schema, result types per module (queries, then projections), then the module augmentations.
  pub fn generate_types<B: QueryBackend + ?Sized>(
    &self,
    backend: &B,
    options: &TypeGenOptions,
    modules: impl IntoIterator<Item = ExtractedModule>,
  ) -> GeneratedTypes {
    let _span = debug_span!("generate_types", schema_id = %self.schema.schema_id()).entered();
    let mut declarations = vec![internal_reference_symbol(), array_of_helper()];

    let schema_ids: Vec<&str> = self.schema.iter().map(|t| t.identifier).collect();
    declarations.extend(
      self
        .schema
        .iter()
        .map(|t| TsDecl::type_alias(t.identifier, t.ty.clone())),
    );
    let all_types = if schema_ids.is_empty() {
      TsType::never()
    } else {
      TsType::union(schema_ids.iter().map(|id| TsType::reference(*id)).collect())
    };
    declarations.push(TsDecl::type_alias(ALL_SANITY_SCHEMA_TYPES, all_types));
    let mut default_schema = TsDecl::type_alias(DEFAULT_SCHEMA, TsType::reference(ALL_SANITY_SCHEMA_TYPES));
    if let Some(schema_path) = &options.schema_path {
      default_schema = default_schema.with_comments(vec![format!(" Source: {}", display_path(options, schema_path))]);
    };
    declarations.push(default_schema);

    let mut taken: AHashSet<String> = schema_ids.iter().map(|s| s.to_string()).collect();
    let evaluated = modules
      .into_iter()
      .map(|module| self.evaluate_module(backend, module, &mut taken))
      .collect_vec();
    for module in evaluated.iter() {
      declarations.extend(module.queries.iter().map(|q| query_declaration(options, q)));
      declarations.extend(module.projections.iter().map(|p| projection_declaration(options, p)));
    }

    if options.augment_groq_module {
      declarations.push(sanity_schemas_declaration(self.schema.schema_id()));
    };
    declarations.extend(query_map_declarations(options, &evaluated));
    // Projection result types reference `ProjectionBase` even when the groq module is not augmented.
    if evaluated.iter().any(|m| !m.projections.is_empty()) {
      if options.augment_groq_module {
        declarations.push(projection_map_declaration(&evaluated));
      };
      declarations.insert(0, TsDecl::ImportType {
        names: vec![PROJECTION_BASE.to_string()],
        module: "groq".to_string(),
        comments: Vec::new(),
      });
    };

    let code = declarations.iter().map(|d| format!("{d}\n\n")).collect::<String>();
    info!(
      schema_types = schema_ids.len(),
      queries = evaluated.iter().map(|m| m.queries.len()).sum::<usize>(),
      projections = evaluated.iter().map(|m| m.projections.len()).sum::<usize>(),
      errors = evaluated.iter().map(|m| m.errors.len()).sum::<usize>(),
      "generated types"
    );
    GeneratedTypes {
      declarations,
      code,
      modules: evaluated,
    }
  }

  fn evaluate_module<B: QueryBackend + ?Sized>(
    &self,
    backend: &B,
    module: ExtractedModule,
    taken: &mut AHashSet<String>,
  ) -> EvaluatedModule {
    let _span = debug_span!("evaluate_module", filename = %module.filename).entered();
    let mut errors: Vec<QueryError> = module.errors.into_iter().map(QueryError::from).collect();
    let mut queries = Vec::new();
    for extracted in module.queries {
      match self.schema.evaluate_query(backend, &extracted.query) {
        Ok(evaluated) => {
          let desired = normalize_identifier(&format!("{}Result", extracted.variable.name));
          queries.push(EvaluatedQuery {
            id: unique_identifier(&desired, taken),
            extracted,
            ty: evaluated.ty,
            stats: evaluated.stats,
          });
        }
        Err(cause) => {
          warn!(variable = %extracted.variable.name, error = %cause, "could not evaluate query type");
          errors.push(QueryError::from(QueryEvaluationError {
            variable: extracted.variable,
            filename: module.filename.clone(),
            cause,
          }));
        }
      };
    }
    let mut projections = Vec::new();
    for extracted in module.projections {
      match self.schema.evaluate_projection(backend, &extracted.projection) {
        Ok(Some(evaluated)) => {
          let desired = normalize_identifier(&format!("{}Result", extracted.variable.name));
          projections.push(EvaluatedProjection {
            id: unique_identifier(&desired, taken),
            extracted,
            ty: evaluated.ty,
            stats: evaluated.stats,
          });
        }
        Ok(None) => {
          debug!(variable = %extracted.variable.name, "projection matches no document type");
        }
        Err(cause) => {
          warn!(variable = %extracted.variable.name, error = %cause, "could not evaluate projection type");
          errors.push(QueryError::from(QueryEvaluationError {
            variable: extracted.variable,
            filename: module.filename.clone(),
            cause,
          }));
        }
      };
    }
    EvaluatedModule {
      filename: module.filename,
      queries,
      projections,
      errors,
    }
  }
}

/// `path` relative to the configured root when it's inside it, otherwise unchanged.
fn display_path(options: &TypeGenOptions, path: &str) -> String {
  options
    .root
    .as_deref()
    .and_then(|root| Path::new(path).strip_prefix(root).ok())
    .map_or_else(|| path.to_string(), |p| p.to_string_lossy().replace('\\', "/"))
}

fn internal_reference_symbol() -> TsDecl {
  TsDecl::DeclareConst {
    name: INTERNAL_REFERENCE_SYMBOL.to_string(),
    ty: TsType::keyword(TsKeyword::UniqueSymbol),
    comments: Vec::new(),
  }
}

// type ArrayOf<T> = Array<T & { _key: string }>;
fn array_of_helper() -> TsDecl {
  let keyed = TsType::Intersection {
    types: vec![TsType::reference("T"), TsType::Literal {
      members: vec![TsProperty {
        key: PropertyKey::Identifier {
          name: "_key".to_string(),
        },
        optional: false,
        ty: TsType::keyword(TsKeyword::String),
      }],
    }],
  };
  TsDecl::TypeAlias {
    name: ARRAY_OF.to_string(),
    params: vec!["T".to_string()],
    ty: TsType::generic("Array", vec![keyed]),
    exported: false,
    comments: Vec::new(),
  }
}

fn flatten(text: &str) -> String {
  text.replace("\r\n", "").replace(['\n', '\r'], "").trim().to_string()
}

fn query_declaration(options: &TypeGenOptions, query: &EvaluatedQuery) -> TsDecl {
  TsDecl::type_alias(query.id.clone(), query.ty.clone()).with_comments(vec![
    format!(" Source: {}", display_path(options, &query.extracted.filename)),
    format!(" Variable: {}", query.extracted.variable.name),
    format!(" Query: {}", flatten(&query.extracted.query)),
  ])
}

fn projection_declaration(options: &TypeGenOptions, projection: &EvaluatedProjection) -> TsDecl {
  TsDecl::type_alias(projection.id.clone(), projection.ty.clone()).with_comments(vec![
    format!(" Source: {}", display_path(options, &projection.extracted.filename)),
    format!(" Variable: {}", projection.extracted.variable.name),
    format!(" Projection: {}", flatten(&projection.extracted.projection)),
  ])
}

fn sanity_schemas_declaration(schema_id: &str) -> TsDecl {
  TsDecl::DeclareModule {
    module: "groq".to_string(),
    interface: TsInterface {
      name: SANITY_SCHEMAS.to_string(),
      members: vec![TsProperty {
        key: PropertyKey::String {
          value: schema_id.to_string(),
        },
        optional: false,
        ty: TsType::reference(DEFAULT_SCHEMA),
      }],
    },
    comments: vec![" Schema TypeMap".to_string()],
  }
}

/// `interface SanityQueries` mapping each distinct query string to the union of its result types.
fn query_map_declarations(options: &TypeGenOptions, modules: &[EvaluatedModule]) -> Vec<TsDecl> {
  let mut by_query: IndexMap<&str, Vec<&str>> = IndexMap::new();
  for query in modules.iter().flat_map(|m| m.queries.iter()) {
    by_query
      .entry(query.extracted.query.as_str())
      .or_default()
      .push(query.id.as_str());
  }
  if by_query.is_empty() {
    return Vec::new();
  };
  let interface = TsInterface {
    name: SANITY_QUERIES.to_string(),
    members: by_query
      .into_iter()
      .map(|(query, ids)| TsProperty {
        key: PropertyKey::String {
          value: query.to_string(),
        },
        optional: false,
        ty: TsType::union(ids.into_iter().map(TsType::reference).collect()),
      })
      .collect(),
  };
  let targets = [
    (options.overload_client_methods, "@sanity/client"),
    (options.augment_groq_module, "groq"),
  ];
  targets
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .enumerate()
    .map(|(i, (_, module))| TsDecl::DeclareModule {
      module: module.to_string(),
      interface: interface.clone(),
      comments: if i == 0 {
        vec![" Query TypeMap".to_string()]
      } else {
        Vec::new()
      },
    })
    .collect()
}

/// `interface SanityDocumentProjections` in the `groq` module, mapping each distinct projection to the union of its result types.
fn projection_map_declaration(modules: &[EvaluatedModule]) -> TsDecl {
  let mut by_projection: IndexMap<&str, Vec<&str>> = IndexMap::new();
  for projection in modules.iter().flat_map(|m| m.projections.iter()) {
    by_projection
      .entry(projection.extracted.projection.as_str())
      .or_default()
      .push(projection.id.as_str());
  }
  TsDecl::DeclareModule {
    module: "groq".to_string(),
    interface: TsInterface {
      name: SANITY_DOCUMENT_PROJECTIONS.to_string(),
      members: by_projection
        .into_iter()
        .map(|(projection, ids)| TsProperty {
          key: PropertyKey::String {
            value: projection.to_string(),
          },
          optional: false,
          ty: TsType::union(ids.into_iter().map(TsType::reference).collect()),
        })
        .collect(),
    },
    comments: vec![" Document Projection TypeMap".to_string()],
  }
}
