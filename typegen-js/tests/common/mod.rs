#![allow(dead_code)]

use scope_js::ast::build::AstBuilder;
use scope_js::ast::node::Node;
use scope_js::ast::stmt::Stmt;
use scope_js::module::Module;
use scope_js::module::ModuleId;
use scope_js::module::Program;
use std::sync::Arc;
use std::sync::Once;
use tracing_subscriber::EnvFilter;
use typegen_js::error::EvaluateError;
use typegen_js::host::MemoryHost;
use typegen_js::host::ModuleHost;
use typegen_js::query::QueryBackend;
use typegen_js::query::QueryParams;
use typegen_js::schema::SchemaDecl;
use typegen_js::schema::TypeNode;

static INIT: Once = Once::new();

/// Routes `tracing` output through the test harness; set `RUST_LOG` to see it.
pub fn init_tracing() {
  INIT.call_once(|| {
    let _ = tracing_subscriber::fmt()
      .with_env_filter(EnvFilter::from_default_env())
      .with_test_writer()
      .try_init();
  });
}

pub fn program(b: &AstBuilder, body: Vec<Node<Stmt>>) -> Program {
  Program::synthetic(b.top_level(body))
}

/// Loads `path` from `host` as the module to scan.
pub fn entry(host: &MemoryHost, path: &str) -> Arc<Module> {
  let id = ModuleId::new(path);
  Module::new(id.clone(), host.load(&id).unwrap())
}

/// A query backend with canned results: each query maps to a fixed type node, and `"!"` fails to parse.
#[derive(Default)]
pub struct CannedBackend {
  pub results: Vec<(String, TypeNode)>,
}

impl CannedBackend {
  pub fn with(mut self, query: &str, node: TypeNode) -> CannedBackend {
    self.results.push((query.to_string(), node));
    self
  }
}

impl QueryBackend for CannedBackend {
  type Ast = (String, QueryParams);

  fn parse(&self, query: &str, params: &QueryParams) -> Result<Self::Ast, EvaluateError> {
    if query == "!" {
      return Err(EvaluateError::Parse("unexpected token \"!\"".to_string()));
    };
    Ok((query.to_string(), params.clone()))
  }

  fn evaluate(&self, ast: &Self::Ast, _schema: &[SchemaDecl]) -> Result<TypeNode, EvaluateError> {
    self
      .results
      .iter()
      .find(|(query, _)| *query == ast.0)
      .map(|(_, node)| node.clone())
      .ok_or_else(|| EvaluateError::Evaluate(format!("no canned type for {}", ast.0)))
  }

  fn is_object(&self, ast: &Self::Ast) -> bool {
    ast.0.trim_start().starts_with('{')
  }
}
