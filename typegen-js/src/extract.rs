use crate::error::QueryExtractionError;
use crate::host::ModuleHost;
use crate::options::ResolveOptions;
use crate::resolve::resolve_expression;
use crate::resolve::EvalScope;
use crate::resolve::ResolutionContext;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use scope_js::ast::expr::Expr;
use scope_js::ast::node::Node;
use scope_js::ast::pat::Pat;
use scope_js::ast::stmt::VarDecl;
use scope_js::loc::Loc;
use scope_js::loc::SourceRange;
use scope_js::module::Module;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use tracing::debug_span;
use tracing::warn;

// Resolution recurses once per nested step, up to `ResolveOptions::max_depth`.
const RESOLVE_STACK_SIZE: usize = 64 * 1024 * 1024;

static RESOLVE_POOL: Lazy<Option<ThreadPool>> = Lazy::new(|| {
  ThreadPoolBuilder::new()
    .stack_size(RESOLVE_STACK_SIZE)
    .thread_name(|i| format!("typegen-resolve-{i}"))
    .build()
    .map_err(|err| warn!(error = %err, "could not create resolver thread pool, using the global pool"))
    .ok()
});

/// The variable a query was assigned to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryVariable {
  pub name: String,
  /// Byte offsets of the declarator's identifier.
  pub loc: Loc,
  pub range: SourceRange,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractedQuery {
  pub filename: String,
  pub variable: QueryVariable,
  pub query: String,
}

/// An object projection such as `{_id, title}`, to be typed once per document type it applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractedProjection {
  pub filename: String,
  pub variable: QueryVariable,
  pub projection: String,
}

/// Result of scanning one module: resolved queries and per-candidate failures, both in declaration order.
///
/// Source scanning only finds queries; `projections` are supplied by callers that collect them separately.
#[derive(Clone, Debug, Default)]
pub struct ExtractedModule {
  pub filename: String,
  pub queries: Vec<ExtractedQuery>,
  pub projections: Vec<ExtractedProjection>,
  pub errors: Vec<QueryExtractionError>,
}

struct Candidate {
  decl: Node<VarDecl>,
  variable: QueryVariable,
  initializer: Node<Expr>,
}

type VarDeclNode = Node<VarDecl>;

#[derive(Visitor)]
#[visitor(VarDeclNode(enter))]
struct CandidateCollector {
  module: Arc<Module>,
  options: ResolveOptions,
  candidates: Vec<Candidate>,
}

impl CandidateCollector {
  fn enter_var_decl_node(&mut self, node: &VarDeclNode) {
    let marker = &self.options.ignore_marker;
    if node.stx.leading_comments.iter().any(|c| c.contains(marker.as_str())) {
      debug!(filename = %self.module.id, offset = node.loc.0, "skipping declaration marked {marker}");
      return;
    };
    for declarator in node.stx.declarators.iter() {
      let Pat::Id(id) = declarator.pattern.stx.as_ref() else {
        continue;
      };
      let Some(initializer) = &declarator.initializer else {
        continue;
      };
      if !is_query_candidate(initializer, &self.options) {
        continue;
      };
      self.candidates.push(Candidate {
        decl: node.clone(),
        variable: QueryVariable {
          name: id.stx.name.clone(),
          loc: id.loc,
          range: self.module.range(id.loc),
        },
        initializer: initializer.clone(),
      });
    }
  }
}

/// A tagged template with an allow-listed tag, or a call to something named like a wrapper helper.
///
/// This is syntactic only. Whether a wrapper call really refers to the imported helper is decided during resolution.
fn is_query_candidate(expr: &Node<Expr>, options: &ResolveOptions) -> bool {
  match expr.stx.as_ref() {
    Expr::TaggedTemplate(tagged) => match tagged.stx.function.stx.as_ref() {
      Expr::Id(tag) => options.is_query_tag(&tag.stx.name),
      _ => false,
    },
    Expr::Call(call) => match call.stx.callee.stx.as_ref() {
      Expr::Id(callee) => options.is_wrapper(&callee.stx.name),
      Expr::Member(member) => options.is_wrapper(&member.stx.right),
      _ => false,
    },
    _ => false,
  }
}

/// Finds every query-shaped variable declaration in `module` and resolves each one independently.
///
/// Candidates are resolved in parallel, each with its own [`ResolutionContext`]; a failing candidate is recorded in `errors` and does not affect the others.
pub fn find_queries_in_source(module: &Arc<Module>, host: &dyn ModuleHost, options: &ResolveOptions) -> ExtractedModule {
  let filename = module.id.to_string();
  let mut collector = CandidateCollector {
    module: module.clone(),
    options: options.clone(),
    candidates: Vec::new(),
  };
  module.program.top_level.drive(&mut collector);
  let candidates = collector.candidates;
  debug!(filename = %filename, candidates = candidates.len(), "collected query candidates");

  let resolve_all = || -> Vec<Result<ExtractedQuery, QueryExtractionError>> {
    candidates
      .into_par_iter()
      .map(|candidate| {
        let _span = debug_span!("resolve_query", filename = %filename, variable = %candidate.variable.name).entered();
        let scope_id = module
          .scopes
          .enclosing_scope(candidate.decl.id)
          .unwrap_or_else(|| module.scopes.root());
        let scope = EvalScope::new(module.clone(), scope_id);
        let ctx = ResolutionContext::new(host, options);
        match resolve_expression(&candidate.initializer, &scope, &ctx) {
          Ok(query) => Ok(ExtractedQuery {
            filename: filename.clone(),
            variable: candidate.variable,
            query,
          }),
          Err(cause) => {
            warn!(code = cause.code(), error = %cause, "could not resolve query");
            Err(QueryExtractionError {
              variable: candidate.variable,
              filename: filename.clone(),
              cause,
            })
          }
        }
      })
      .collect()
  };
  let results = match RESOLVE_POOL.as_ref() {
    Some(pool) => pool.install(resolve_all),
    None => resolve_all(),
  };

  let mut extracted = ExtractedModule {
    filename,
    ..ExtractedModule::default()
  };
  for result in results {
    match result {
      Ok(query) => extracted.queries.push(query),
      Err(err) => extracted.errors.push(err),
    };
  }
  extracted
}
