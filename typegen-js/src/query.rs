use crate::error::EvaluateError;
use crate::schema::SchemaDecl;
use crate::schema::TypeNode;
use crate::slice::extract_slice_parameters;
use indexmap::IndexMap;
use serde_json::Value;

/// Parameter values supplied when parsing a query.
pub type QueryParams = IndexMap<String, Value>;

/// The query language front end: a parser and a schema-aware result type evaluator.
pub trait QueryBackend: Send + Sync {
  type Ast;

  fn parse(&self, query: &str, params: &QueryParams) -> Result<Self::Ast, EvaluateError>;

  /// The type of the value `ast` produces when run against any dataset conforming to `schema`.
  fn evaluate(&self, ast: &Self::Ast, schema: &[SchemaDecl]) -> Result<TypeNode, EvaluateError>;

  /// Whether `ast` is a bare object projection such as `{_id, title}`.
  fn is_object(&self, ast: &Self::Ast) -> bool;
}

/// Parses `query`, binding every slice-bound parameter to `0` so that parsers that validate slice bounds accept it.
pub fn safe_parse_query<B: QueryBackend + ?Sized>(backend: &B, query: &str) -> Result<B::Ast, EvaluateError> {
  let params: QueryParams = extract_slice_parameters(query).map(|name| (name, Value::from(0))).collect();
  backend.parse(query, &params)
}

#[cfg(test)]
mod tests {
  use super::safe_parse_query;
  use super::QueryBackend;
  use super::QueryParams;
  use crate::error::EvaluateError;
  use crate::schema::SchemaDecl;
  use crate::schema::TypeNode;

  struct EchoParams;

  impl QueryBackend for EchoParams {
    type Ast = QueryParams;

    fn parse(&self, _query: &str, params: &QueryParams) -> Result<QueryParams, EvaluateError> {
      Ok(params.clone())
    }

    fn evaluate(&self, _ast: &QueryParams, _schema: &[SchemaDecl]) -> Result<TypeNode, EvaluateError> {
      Ok(TypeNode::Unknown)
    }

    fn is_object(&self, _ast: &QueryParams) -> bool {
      false
    }
  }

  #[test]
  fn test_slice_params_default_to_zero() {
    let params = safe_parse_query(&EchoParams, "*[_type == $type][$start...$end]").unwrap();
    assert_eq!(params.keys().collect::<Vec<_>>(), vec!["start", "end"]);
    assert!(params.values().all(|v| *v == 0));
  }
}
