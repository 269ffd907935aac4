//! Static extraction of GROQ queries from JavaScript/TypeScript modules, and
//! TypeScript type generation for a content schema and those queries.
//!
//! The pipeline has three stages:
//!
//! 1. [`extract::find_queries_in_source`] finds variable declarations
//!    initialized with a `groq` tagged template or a `defineQuery(...)` call
//!    and resolves each one to its runtime string with
//!    [`resolve::resolve_expression`], following variables, imports,
//!    re-exports and function calls across modules loaded through a
//!    [`host::ModuleHost`].
//! 2. [`generator::SchemaTypeGenerator`] translates the schema's type algebra
//!    into TypeScript types and evaluates query result types through a
//!    [`query::QueryBackend`].
//! 3. [`typegen::TypeGenerator`] assembles the declarations file.
//!
//! Nothing is executed: expressions outside the supported subset fail with a
//! [`error::ResolveError`] for that query only.
pub mod error;
pub mod extract;
pub mod generator;
pub mod host;
pub mod options;
pub mod query;
pub mod resolve;
pub mod schema;
pub mod slice;
pub mod ts;
pub mod typegen;

pub use extract::find_queries_in_source;
pub use extract::ExtractedModule;
pub use extract::ExtractedProjection;
pub use extract::ExtractedQuery;
pub use generator::SchemaTypeGenerator;
pub use options::ResolveOptions;
pub use options::TypeGenOptions;
pub use resolve::resolve_expression;
pub use slice::extract_slice_parameters;
pub use typegen::TypeGenerator;
