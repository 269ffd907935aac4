use crate::extract::QueryVariable;
use scope_js::loc::Loc;
use scope_js::loc::Position;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Error returned by a [`crate::host::ModuleHost`].
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
  message: String,
}

impl HostError {
  pub fn new(message: impl Into<String>) -> HostError {
    HostError {
      message: message.into(),
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

/// Why an expression could not be statically resolved to a string.
///
/// Diagnostic codes (prefix `RE`) are assigned per variant and are stable; see [`ResolveErrorKind::code`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveErrorKind {
  #[error("unsupported expression type: {0}")]
  UnsupportedExpression(&'static str),
  #[error("unsupported template tag \"{0}\"")]
  UnsupportedTag(String),
  #[error("unsupported literal type: {0}")]
  UnsupportedLiteral(&'static str),
  #[error("unsupported declarator for \"{0}\": only simple identifiers can be resolved")]
  UnsupportedDeclarator(String),
  #[error("variable \"{0}\" has no initializer")]
  MissingInitializer(String),
  #[error("namespace import \"{0}\" cannot be resolved")]
  NamespaceImport(String),
  #[error("cannot resolve \"{name}\": {kind} bindings are not supported")]
  UnsupportedBinding { name: String, kind: &'static str },
  #[error("{0} functions are not statically evaluable")]
  NotStaticallyEvaluable(&'static str),
  #[error("unsupported parameter: only simple identifiers with optional defaults can be bound")]
  UnsupportedParameter,
  #[error("spread arguments are not supported")]
  SpreadArgument,
  #[error("no argument or default value for parameter \"{0}\"")]
  MissingArgument(String),
  #[error("parameter \"{0}\" is not bound outside of a call")]
  UnboundParameter(String),
  #[error("expected exactly one reachable return statement, found {0}")]
  ReturnCount(usize),
  #[error("return statement has no argument")]
  MissingReturnArgument,
  #[error("{0}() called without a query argument")]
  MissingQueryArgument(String),
  #[error("expression evaluates to a function, not a string")]
  NotAString,
  #[error("callee does not evaluate to a function")]
  NotCallable,
  #[error("circular reference to \"{0}\"")]
  CircularReference(String),
  #[error("could not find binding for \"{0}\"")]
  UnboundIdentifier(String),
  #[error("could not find export \"{name}\" in {module}")]
  ExportNotFound { name: String, module: String },
  #[error("circular re-export of \"{name}\" through {module}")]
  CircularReExport { name: String, module: String },
  #[error("resolution timed out after {0:?}")]
  Timeout(Duration),
  #[error("{0}")]
  Host(#[from] HostError),
  #[error("resolution nested deeper than {0} steps")]
  DepthLimit(usize),
}

impl ResolveErrorKind {
  pub fn code(&self) -> &'static str {
    match self {
      ResolveErrorKind::UnsupportedExpression(_) => "RE0001",
      ResolveErrorKind::UnsupportedTag(_) => "RE0002",
      ResolveErrorKind::UnsupportedLiteral(_) => "RE0003",
      ResolveErrorKind::UnsupportedDeclarator(_) => "RE0004",
      ResolveErrorKind::MissingInitializer(_) => "RE0005",
      ResolveErrorKind::NamespaceImport(_) => "RE0006",
      ResolveErrorKind::UnsupportedBinding { .. } => "RE0007",
      ResolveErrorKind::NotStaticallyEvaluable(_) => "RE0008",
      ResolveErrorKind::UnsupportedParameter => "RE0009",
      ResolveErrorKind::SpreadArgument => "RE0010",
      ResolveErrorKind::MissingArgument(_) => "RE0011",
      ResolveErrorKind::UnboundParameter(_) => "RE0012",
      ResolveErrorKind::ReturnCount(_) => "RE0013",
      ResolveErrorKind::MissingReturnArgument => "RE0014",
      ResolveErrorKind::MissingQueryArgument(_) => "RE0015",
      ResolveErrorKind::NotAString => "RE0016",
      ResolveErrorKind::NotCallable => "RE0017",
      ResolveErrorKind::CircularReference(_) => "RE0018",
      ResolveErrorKind::UnboundIdentifier(_) => "RE0019",
      ResolveErrorKind::ExportNotFound { .. } => "RE0020",
      ResolveErrorKind::CircularReExport { .. } => "RE0021",
      ResolveErrorKind::Timeout(_) => "RE0022",
      ResolveErrorKind::Host(_) => "RE0023",
      ResolveErrorKind::DepthLimit(_) => "RE0024",
    }
  }

  /// An unresolved name or export, including re-export cycles.
  pub fn is_identifier_not_found(&self) -> bool {
    matches!(
      self,
      ResolveErrorKind::UnboundIdentifier(_)
        | ResolveErrorKind::ExportNotFound { .. }
        | ResolveErrorKind::CircularReExport { .. }
    )
  }

  pub fn is_timeout(&self) -> bool {
    matches!(self, ResolveErrorKind::Timeout(_))
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} in {filename}:{}:{}", .position.line, .position.column)]
pub struct ResolveError {
  pub kind: ResolveErrorKind,
  pub filename: String,
  pub loc: Loc,
  pub position: Position,
}

impl ResolveError {
  pub fn code(&self) -> &'static str {
    self.kind.code()
  }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// A query candidate that could not be resolved. Recorded per candidate; never aborts the module.
#[derive(Debug, Error, Clone)]
#[error("Error while extracting query from variable \"{}\" in {filename}: {cause}", .variable.name)]
pub struct QueryExtractionError {
  pub variable: QueryVariable,
  pub filename: String,
  #[source]
  pub cause: ResolveError,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluateError {
  #[error("failed to parse query: {0}")]
  Parse(String),
  #[error("failed to evaluate query type: {0}")]
  Evaluate(String),
  #[error("Invalid projection syntax: Projections must be enclosed in curly braces, (e.g., \"{{_id, title}}\"). Received: \"{0}\"")]
  InvalidProjection(String),
}

#[derive(Debug, Error, Clone)]
#[error("Error while evaluating query from variable \"{}\" in {filename}: {cause}", .variable.name)]
pub struct QueryEvaluationError {
  pub variable: QueryVariable,
  pub filename: String,
  #[source]
  pub cause: EvaluateError,
}

/// Any per-query error collected while generating types for a module.
#[derive(Debug, Error, Clone)]
pub enum QueryError {
  #[error(transparent)]
  Extraction(#[from] QueryExtractionError),
  #[error(transparent)]
  Evaluation(#[from] QueryEvaluationError),
}

/// Fatal errors building a schema type generator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
  #[error("Duplicate type name \"{name}\" in schema \"{schema_id}\". Type names must be unique within the same schema.")]
  DuplicateTypeName { name: String, schema_id: String },
  #[error("invalid schema JSON: {0}")]
  Json(String),
}

impl From<serde_json::Error> for SchemaError {
  fn from(err: serde_json::Error) -> Self {
    SchemaError::Json(err.to_string())
  }
}
