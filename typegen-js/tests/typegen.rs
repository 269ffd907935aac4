mod common;

use common::init_tracing;
use common::CannedBackend;
use scope_js::loc::Loc;
use scope_js::loc::Position;
use scope_js::loc::SourceRange;
use typegen_js::error::QueryError;
use typegen_js::error::QueryExtractionError;
use typegen_js::error::ResolveError;
use typegen_js::error::ResolveErrorKind;
use typegen_js::extract::QueryVariable;
use typegen_js::error::EvaluateError;
use typegen_js::schema::read_schema;
use typegen_js::schema::ObjectAttribute;
use typegen_js::schema::ObjectTypeNode;
use typegen_js::schema::TypeNode;
use typegen_js::ExtractedModule;
use typegen_js::ExtractedProjection;
use typegen_js::ExtractedQuery;
use typegen_js::SchemaTypeGenerator;
use typegen_js::TypeGenOptions;
use typegen_js::TypeGenerator;

const POSTS: &str = "*[_type == \"post\"]";

fn variable(name: &str) -> QueryVariable {
  QueryVariable {
    name: name.to_string(),
    loc: Loc::default(),
    range: SourceRange::default(),
  }
}

fn extracted(filename: &str, queries: &[(&str, &str)]) -> ExtractedModule {
  ExtractedModule {
    filename: filename.to_string(),
    queries: queries
      .iter()
      .map(|(name, query)| ExtractedQuery {
        filename: filename.to_string(),
        variable: variable(name),
        query: query.to_string(),
      })
      .collect(),
    projections: Vec::new(),
    errors: Vec::new(),
  }
}

fn post_schema() -> TypeGenerator {
  let schema = read_schema(
    r#"[{"type": "document", "name": "post", "attributes": {
      "title": {"type": "objectAttribute", "value": {"type": "string"}}
    }}]"#,
  )
  .unwrap();
  TypeGenerator::new(SchemaTypeGenerator::new(schema).unwrap())
}

fn project_options() -> TypeGenOptions {
  TypeGenOptions {
    schema_path: Some("/project/schema.json".to_string()),
    root: Some("/project".to_string()),
    ..TypeGenOptions::default()
  }
}

#[test]
fn generates_declarations_file() {
  init_tracing();
  let backend = CannedBackend::default().with(POSTS, TypeNode::array(TypeNode::inline("post")));
  let generated = post_schema().generate_types(&backend, &project_options(), vec![
    extracted("/project/src/a.ts", &[("postQuery", POSTS)]),
    extracted("/project/src/b.ts", &[("postQuery", POSTS)]),
  ]);
  assert_eq!(generated.errors().count(), 0);
  let expected = concat!(
    "export declare const internalGroqTypeReferenceTo: unique symbol;\n\n",
    "type ArrayOf<T> = Array<T & {\n  _key: string;\n}>;\n\n",
    "export type Post = {\n  title: string;\n};\n\n",
    "export type AllSanitySchemaTypes = Post;\n\n",
    "// Source: schema.json\n",
    "export type DefaultSchema = AllSanitySchemaTypes;\n\n",
    "// Source: src/a.ts\n",
    "// Variable: postQuery\n",
    "// Query: *[_type == \"post\"]\n",
    "export type PostQueryResult = ArrayOf<Post>;\n\n",
    "// Source: src/b.ts\n",
    "// Variable: postQuery\n",
    "// Query: *[_type == \"post\"]\n",
    "export type PostQueryResult_2 = ArrayOf<Post>;\n\n",
    "// Schema TypeMap\n",
    "declare module \"groq\" {\n",
    "  interface SanitySchemas {\n",
    "    \"default\": DefaultSchema;\n",
    "  }\n",
    "}\n\n",
    "// Query TypeMap\n",
    "declare module \"@sanity/client\" {\n",
    "  interface SanityQueries {\n",
    "    \"*[_type == \\\"post\\\"]\": PostQueryResult | PostQueryResult_2;\n",
    "  }\n",
    "}\n\n",
    "declare module \"groq\" {\n",
    "  interface SanityQueries {\n",
    "    \"*[_type == \\\"post\\\"]\": PostQueryResult | PostQueryResult_2;\n",
    "  }\n",
    "}\n\n",
  );
  assert_eq!(generated.code, expected);
  assert_eq!(generated.modules.len(), 2);
  assert_eq!(generated.modules[1].queries[0].id, "PostQueryResult_2");
}

#[test]
fn empty_schema_and_no_queries() {
  let options = TypeGenOptions {
    overload_client_methods: false,
    augment_groq_module: false,
    ..TypeGenOptions::default()
  };
  let generator = TypeGenerator::new(SchemaTypeGenerator::new(Vec::new()).unwrap());
  let generated = generator.generate_types(&CannedBackend::default(), &options, Vec::new());
  assert_eq!(generated.declarations.len(), 4);
  assert!(generated.code.contains("export type AllSanitySchemaTypes = never;\n\n"));
  assert!(generated
    .code
    .ends_with("export type DefaultSchema = AllSanitySchemaTypes;\n\n"));
  assert!(!generated.code.contains("declare module"));
}

#[test]
fn query_map_only_in_groq_module_when_client_overloads_are_off() {
  let backend = CannedBackend::default().with("count(*)", TypeNode::number());
  let options = TypeGenOptions {
    overload_client_methods: false,
    ..TypeGenOptions::default()
  };
  let generated = post_schema().generate_types(&backend, &options, vec![extracted("/src/a.ts", &[(
    "countQuery",
    "count(*)",
  )])]);
  assert!(!generated.code.contains("@sanity/client"));
  assert!(generated.code.ends_with(concat!(
    "// Query TypeMap\n",
    "declare module \"groq\" {\n",
    "  interface SanityQueries {\n",
    "    \"count(*)\": CountQueryResult;\n",
    "  }\n",
    "}\n\n",
  )));
}

#[test]
fn collects_extraction_and_evaluation_errors() {
  let backend = CannedBackend::default().with(POSTS, TypeNode::array(TypeNode::inline("post")));
  let mut module = extracted("/project/src/page.ts", &[("brokenQuery", "!"), ("postsQuery", POSTS)]);
  module.errors.push(QueryExtractionError {
    variable: variable("dynamicQuery"),
    filename: "/project/src/page.ts".to_string(),
    cause: ResolveError {
      kind: ResolveErrorKind::UnboundIdentifier("filter".to_string()),
      filename: "/project/src/page.ts".to_string(),
      loc: Loc::default(),
      position: Position::default(),
    },
  });
  let generated = post_schema().generate_types(&backend, &project_options(), vec![module]);

  let module = &generated.modules[0];
  assert_eq!(module.queries.len(), 1);
  assert_eq!(module.queries[0].id, "PostsQueryResult");
  assert_eq!(module.errors.len(), 2);
  assert!(matches!(&module.errors[0], QueryError::Extraction(e) if e.variable.name == "dynamicQuery"));
  let QueryError::Evaluation(evaluation) = &module.errors[1] else {
    panic!("expected an evaluation error, got {:?}", module.errors[1]);
  };
  assert_eq!(evaluation.filename, "/project/src/page.ts");
  assert_eq!(
    evaluation.to_string(),
    "Error while evaluating query from variable \"brokenQuery\" in /project/src/page.ts: failed to parse query: unexpected token \"!\""
  );
  assert!(!generated.code.contains("BrokenQueryResult"));
  assert_eq!(generated.errors().count(), 2);
}

#[test]
fn query_comments_are_flattened_and_identifiers_sanitized() {
  let query = "*[_type == \"post\"]{\n  title\n}\n";
  let backend = CannedBackend::default().with(query, TypeNode::Unknown);
  let generated = post_schema().generate_types(&backend, &TypeGenOptions::default(), vec![extracted(
    "/src/a.ts",
    &[("post-list.query", query)],
  )]);
  let result = &generated.modules[0].queries[0];
  assert_eq!(result.id, "PostListQueryResult");
  let decl = generated
    .declarations
    .iter()
    .find(|d| d.to_string().contains("export type PostListQueryResult = unknown;"))
    .unwrap();
  assert_eq!(decl.comments(), [
    " Source: /src/a.ts".to_string(),
    " Variable: post-list.query".to_string(),
    " Query: *[_type == \"post\"]{  title}".to_string(),
  ]);
}

#[test]
fn query_results_avoid_schema_identifiers() {
  let schema = read_schema(r#"[{"type": "type", "name": "postResult", "value": {"type": "string"}}]"#).unwrap();
  let generator = TypeGenerator::new(SchemaTypeGenerator::new(schema).unwrap());
  let backend = CannedBackend::default().with("*", TypeNode::Unknown);
  let generated = generator.generate_types(&backend, &TypeGenOptions::default(), vec![extracted("/src/a.ts", &[(
    "post", "*",
  )])]);
  assert_eq!(generator.schema().identifier("postResult"), Some("PostResult"));
  assert_eq!(generated.modules[0].queries[0].id, "PostResult_2");
}

#[test]
fn sanity_schemas_key_is_the_generator_schema_id() {
  let schema = read_schema(r#"[{"type": "document", "name": "post", "attributes": {}}]"#).unwrap();
  let generator = TypeGenerator::new(SchemaTypeGenerator::with_schema_id(schema, "studio").unwrap());
  let generated = generator.generate_types(&CannedBackend::default(), &TypeGenOptions::default(), Vec::new());
  assert!(generated.code.contains(concat!(
    "declare module \"groq\" {\n",
    "  interface SanitySchemas {\n",
    "    \"studio\": DefaultSchema;\n",
    "  }\n",
    "}\n\n",
  )));
  assert!(!generated.code.contains("\"default\": DefaultSchema"));
}

fn with_projection(mut module: ExtractedModule, name: &str, projection: &str) -> ExtractedModule {
  module.projections.push(ExtractedProjection {
    filename: module.filename.clone(),
    variable: variable(name),
    projection: projection.to_string(),
  });
  module
}

// `T | null`, as a trailing `[0]` evaluates to.
fn first_of(attributes: Vec<(&str, TypeNode)>) -> TypeNode {
  let object = ObjectTypeNode::new(
    attributes
      .into_iter()
      .map(|(k, v)| (k.to_string(), ObjectAttribute::required(v))),
  );
  TypeNode::union(vec![TypeNode::Object(object), TypeNode::Null])
}

#[test]
fn generates_projection_types_and_imports() {
  init_tracing();
  let schema = read_schema(
    r#"[{"type": "document", "name": "post", "attributes": {
      "_id": {"type": "objectAttribute", "value": {"type": "string"}},
      "title": {"type": "objectAttribute", "value": {"type": "string"}, "optional": true}
    }}]"#,
  )
  .unwrap();
  let generator = TypeGenerator::new(SchemaTypeGenerator::new(schema).unwrap());
  let backend = CannedBackend::default()
    .with("{_id, title}", TypeNode::Unknown)
    .with(
      "* [_type==\"post\"] {_id, title} [0]",
      first_of(vec![
        ("_id", TypeNode::string()),
        ("title", TypeNode::union(vec![TypeNode::string(), TypeNode::Null])),
      ]),
    );
  let module = with_projection(extracted("/project/src/projections.ts", &[]), "postSummary", "{_id, title}");
  let generated = generator.generate_types(&backend, &project_options(), vec![module]);
  assert_eq!(generated.errors().count(), 0);

  let expected = concat!(
    "import type { ProjectionBase } from \"groq\";\n\n",
    "export declare const internalGroqTypeReferenceTo: unique symbol;\n\n",
    "type ArrayOf<T> = Array<T & {\n  _key: string;\n}>;\n\n",
    "export type Post = {\n  _id: string;\n  title?: string;\n};\n\n",
    "export type AllSanitySchemaTypes = Post;\n\n",
    "// Source: schema.json\n",
    "export type DefaultSchema = AllSanitySchemaTypes;\n\n",
    "// Source: src/projections.ts\n",
    "// Variable: postSummary\n",
    "// Projection: {_id, title}\n",
    "export type PostSummaryResult = ProjectionBase<{\n  _id: string;\n  title: string | null;\n}, \"post\">;\n\n",
    "// Schema TypeMap\n",
    "declare module \"groq\" {\n",
    "  interface SanitySchemas {\n",
    "    \"default\": DefaultSchema;\n",
    "  }\n",
    "}\n\n",
    "// Document Projection TypeMap\n",
    "declare module \"groq\" {\n",
    "  interface SanityDocumentProjections {\n",
    "    \"{_id, title}\": PostSummaryResult;\n",
    "  }\n",
    "}\n\n",
  );
  assert_eq!(generated.code, expected);
  let projection = &generated.modules[0].projections[0];
  assert_eq!(projection.id, "PostSummaryResult");
  assert_eq!(projection.stats.all_types, 5);
}

#[test]
fn projections_without_matches_or_with_invalid_syntax() {
  let backend = CannedBackend::default()
    .with("{missing}", TypeNode::Unknown)
    .with("* [_type==\"post\"] {missing} [0]", first_of(vec![("missing", TypeNode::Null)]));
  let mut module = extracted("/src/a.ts", &[("countQuery", "count(*)")]);
  module = with_projection(module, "missing", "{missing}");
  module = with_projection(module, "notAnObject", "title");
  let backend = backend.with("count(*)", TypeNode::number()).with("title", TypeNode::Unknown);
  let generated = post_schema().generate_types(&backend, &TypeGenOptions::default(), vec![module]);

  let module = &generated.modules[0];
  assert!(module.projections.is_empty());
  assert_eq!(module.errors.len(), 1);
  let QueryError::Evaluation(evaluation) = &module.errors[0] else {
    panic!("expected an evaluation error, got {:?}", module.errors[0]);
  };
  assert_eq!(evaluation.variable.name, "notAnObject");
  assert_eq!(evaluation.cause, EvaluateError::InvalidProjection("title".to_string()));
  assert!(!generated.code.contains("ProjectionBase"));
  assert!(!generated.code.contains("SanityDocumentProjections"));
}
