//! Static resolution of expressions to the string they produce at runtime.
//!
//! The resolver walks from an expression through variable bindings, imports,
//! re-exports and function calls until it reaches literals, without executing
//! anything. Only a deliberately small subset of JavaScript is understood:
//! anything else fails with a typed [`ResolveError`] rather than being guessed.
//!
//! Each top-level call owns a [`ResolutionContext`] with its start time and
//! timeout, a cache of modules loaded so far, and (threaded along each path
//! through the expression graph) visited sets that turn cycles into errors.
//! Visited sets only ever grow along a path; sibling sub-expressions each
//! continue from their parent's set. Nesting is also bounded by
//! [`ResolveOptions::max_depth`], so a long acyclic chain fails with a typed
//! error instead of exhausting the stack.
mod call;
mod module;

use crate::error::ResolveError;
use crate::error::ResolveErrorKind;
use crate::error::ResolveResult;
use crate::host::ModuleHost;
use crate::options::ResolveOptions;
use ahash::AHashMap;
use ahash::AHashSet;
use parking_lot::Mutex;
use scope_js::ast::expr::Expr;
use scope_js::ast::expr::IdExpr;
use scope_js::ast::expr::LitTemplatePart;
use scope_js::ast::func::Func;
use scope_js::ast::node::Node;
use scope_js::ast::node::NodeId;
use scope_js::ast::pat::Pat;
use scope_js::loc::Loc;
use scope_js::module::Module;
use scope_js::module::ModuleId;
use scope_js::scope::Definition;
use scope_js::scope::ImportKind;
use scope_js::scope::ScopeId;
use scope_js::scope::Variable;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;
use tracing::trace;

/// State for one top-level resolution. Not meant to be shared between concurrent top-level calls.
pub struct ResolutionContext<'a> {
  host: &'a dyn ModuleHost,
  options: &'a ResolveOptions,
  started: Instant,
  timeout: Duration,
  modules: Mutex<AHashMap<ModuleId, Arc<Module>>>,
  next_frame: AtomicU32,
  depth: AtomicUsize,
}

impl<'a> ResolutionContext<'a> {
  pub fn new(host: &'a dyn ModuleHost, options: &'a ResolveOptions) -> ResolutionContext<'a> {
    ResolutionContext {
      host,
      options,
      started: Instant::now(),
      timeout: options.timeout(),
      modules: Mutex::new(AHashMap::new()),
      next_frame: AtomicU32::new(1),
      depth: AtomicUsize::new(0),
    }
  }

  pub fn options(&self) -> &ResolveOptions {
    self.options
  }

  pub fn elapsed(&self) -> Duration {
    self.started.elapsed()
  }

  /// Number of distinct modules loaded through the host so far.
  pub fn loaded_modules(&self) -> usize {
    self.modules.lock().len()
  }

  fn check_timeout(&self) -> Result<(), ResolveErrorKind> {
    if self.elapsed() >= self.timeout {
      return Err(ResolveErrorKind::Timeout(self.timeout));
    };
    Ok(())
  }

  fn enter_depth(&self) -> Result<DepthGuard<'_>, ResolveErrorKind> {
    let depth = self.depth.fetch_add(1, Ordering::Relaxed) + 1;
    let guard = DepthGuard { depth: &self.depth };
    if depth > self.options.max_depth {
      return Err(ResolveErrorKind::DepthLimit(self.options.max_depth));
    };
    Ok(guard)
  }
}

// Held for the duration of one nested step.
struct DepthGuard<'c> {
  depth: &'c AtomicUsize,
}

impl Drop for DepthGuard<'_> {
  fn drop(&mut self) {
    self.depth.fetch_sub(1, Ordering::Relaxed);
  }
}

/// A lexical scope in a module, plus the parameter bindings of the calls being evaluated.
#[derive(Clone)]
pub struct EvalScope {
  pub module: Arc<Module>,
  pub scope: ScopeId,
  pub frame: Option<Arc<CallFrame>>,
}

impl EvalScope {
  pub fn new(module: Arc<Module>, scope: ScopeId) -> EvalScope {
    EvalScope {
      module,
      scope,
      frame: None,
    }
  }

  pub fn module_scope(module: Arc<Module>) -> EvalScope {
    let scope = module.scopes.root();
    EvalScope::new(module, scope)
  }

  fn with_scope(&self, scope: ScopeId) -> EvalScope {
    EvalScope {
      module: self.module.clone(),
      scope,
      frame: self.frame.clone(),
    }
  }

  fn frame_id(&self) -> u32 {
    self.frame.as_ref().map_or(0, |f| f.id)
  }

  fn error(&self, loc: Loc, kind: ResolveErrorKind) -> ResolveError {
    error_at(&self.module, loc, kind)
  }
}

/// Overrides the references to a function's parameters for one call.
pub struct CallFrame {
  id: u32,
  // The call expression that created this frame.
  site: CallSite,
  module: Arc<Module>,
  func_scope: ScopeId,
  bindings: AHashMap<String, Binding>,
  // Frame the callee closed over, for parameters of enclosing functions.
  parent: Option<Arc<CallFrame>>,
}

enum Binding {
  // Evaluated where the call was made.
  Argument { expr: Node<Expr>, scope: EvalScope },
  // Evaluated inside the callee, with this frame.
  Default(Node<Expr>),
}

/// A function value: the function plus the frame it closed over.
#[derive(Clone)]
pub(crate) struct Closure {
  func: Node<Func>,
  module: Arc<Module>,
  env: Option<Arc<CallFrame>>,
}

pub(crate) enum Value {
  Str(String),
  Func(Closure),
}

type IdentifierKey = (ModuleId, NodeId, ScopeId, u32);
type ExportKey = (ModuleId, String);
type CallSite = (ModuleId, NodeId);

/// A call expression, the call that made the frame it runs in, and the function it invokes.
///
/// Frame ids are fresh per call, so recursion is detected on sites instead: a
/// function re-entered from the same call expression under the same enclosing
/// call repeats a state already on the path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct CallKey {
  site: CallSite,
  caller_site: Option<CallSite>,
  callee: (ModuleId, NodeId),
}

/// Identifier entries, module exports and calls already on the current resolution path.
#[derive(Clone, Default)]
pub(crate) struct Visited {
  identifiers: Arc<AHashSet<IdentifierKey>>,
  exports: Arc<AHashSet<ExportKey>>,
  calls: Arc<AHashSet<CallKey>>,
}

impl Visited {
  fn enter_identifier(&self, key: IdentifierKey) -> Option<Visited> {
    if self.identifiers.contains(&key) {
      return None;
    };
    let mut identifiers = self.identifiers.as_ref().clone();
    identifiers.insert(key);
    Some(Visited {
      identifiers: Arc::new(identifiers),
      exports: self.exports.clone(),
      calls: self.calls.clone(),
    })
  }

  fn enter_export(&self, key: ExportKey) -> Option<Visited> {
    if self.exports.contains(&key) {
      return None;
    };
    let mut exports = self.exports.as_ref().clone();
    exports.insert(key);
    Some(Visited {
      identifiers: self.identifiers.clone(),
      exports: Arc::new(exports),
      calls: self.calls.clone(),
    })
  }

  fn enter_call(&self, key: CallKey) -> Option<Visited> {
    if self.calls.contains(&key) {
      return None;
    };
    let mut calls = self.calls.as_ref().clone();
    calls.insert(key);
    Some(Visited {
      identifiers: self.identifiers.clone(),
      exports: self.exports.clone(),
      calls: Arc::new(calls),
    })
  }
}

pub(crate) fn error_at(module: &Module, loc: Loc, kind: ResolveErrorKind) -> ResolveError {
  ResolveError {
    kind,
    filename: module.id.to_string(),
    loc,
    position: module.range(loc).start,
  }
}

/// Resolves `expr`, evaluated in `scope`, to the string it produces at runtime.
pub fn resolve_expression(expr: &Node<Expr>, scope: &EvalScope, ctx: &ResolutionContext) -> ResolveResult<String> {
  match ctx.eval(expr, scope, &Visited::default())? {
    Value::Str(value) => Ok(value),
    Value::Func(_) => Err(scope.error(expr.loc, ResolveErrorKind::NotAString)),
  }
}

impl ResolutionContext<'_> {
  pub(crate) fn eval(&self, expr: &Node<Expr>, scope: &EvalScope, visited: &Visited) -> ResolveResult<Value> {
    self.check_timeout().map_err(|k| scope.error(expr.loc, k))?;
    let _depth = self.enter_depth().map_err(|k| scope.error(expr.loc, k))?;
    trace!(
      kind = expr.stx.kind_name(),
      module = %scope.module.id,
      offset = expr.loc.0,
      "resolving"
    );
    match expr.stx.as_ref() {
      Expr::TaggedTemplate(tagged) => {
        match tagged.stx.function.stx.as_ref() {
          Expr::Id(tag) if self.options.is_query_tag(&tag.stx.name) => {}
          Expr::Id(tag) => {
            return Err(scope.error(tagged.loc, ResolveErrorKind::UnsupportedTag(tag.stx.name.clone())));
          }
          other => {
            return Err(scope.error(tagged.loc, ResolveErrorKind::UnsupportedTag(other.kind_name().to_string())));
          }
        };
        self.eval_template(&tagged.stx.parts, scope, visited).map(Value::Str)
      }
      Expr::LitTemplate(template) => self.eval_template(&template.stx.parts, scope, visited).map(Value::Str),
      Expr::LitStr(lit) => Ok(Value::Str(lit.stx.value.clone())),
      Expr::LitNum(lit) => Ok(Value::Str(lit.stx.value.to_string())),
      Expr::LitBool(lit) => Ok(Value::Str(lit.stx.value.to_string())),
      Expr::LitBigInt(lit) => Ok(Value::Str(lit.stx.value.clone())),
      Expr::LitNull(_) | Expr::LitRegex(_) => {
        Err(scope.error(expr.loc, ResolveErrorKind::UnsupportedLiteral(expr.stx.kind_name())))
      }
      Expr::Id(id) => self.eval_identifier(id, scope, visited),
      Expr::Call(call) => self.eval_call(call, scope, visited),
      Expr::ArrowFunc(arrow) => Ok(Value::Func(Closure {
        func: arrow.stx.func.clone(),
        module: scope.module.clone(),
        env: scope.frame.clone(),
      })),
      Expr::Func(func) => Ok(Value::Func(Closure {
        func: func.stx.func.clone(),
        module: scope.module.clone(),
        env: scope.frame.clone(),
      })),
      other => Err(scope.error(expr.loc, ResolveErrorKind::UnsupportedExpression(other.kind_name()))),
    }
  }

  fn eval_string(&self, expr: &Node<Expr>, scope: &EvalScope, visited: &Visited) -> ResolveResult<String> {
    match self.eval(expr, scope, visited)? {
      Value::Str(value) => Ok(value),
      Value::Func(_) => Err(scope.error(expr.loc, ResolveErrorKind::NotAString)),
    }
  }

  // Interpolations are independent: each resolves from the template's own visited set.
  fn eval_template(&self, parts: &[LitTemplatePart], scope: &EvalScope, visited: &Visited) -> ResolveResult<String> {
    let mut out = String::new();
    for part in parts.iter() {
      match part {
        LitTemplatePart::String(chunk) => out.push_str(chunk),
        LitTemplatePart::Substitution(expr) => out.push_str(&self.eval_string(expr, scope, visited)?),
      };
    }
    Ok(out)
  }

  fn eval_identifier(&self, id: &Node<IdExpr>, scope: &EvalScope, visited: &Visited) -> ResolveResult<Value> {
    let name = &id.stx.name;
    let key = (scope.module.id.clone(), id.id, scope.scope, scope.frame_id());
    let visited = visited
      .enter_identifier(key)
      .ok_or_else(|| scope.error(id.loc, ResolveErrorKind::CircularReference(name.clone())))?;
    let variable = scope
      .module
      .scopes
      .lookup(scope.scope, name)
      .ok_or_else(|| scope.error(id.loc, ResolveErrorKind::UnboundIdentifier(name.clone())))?;
    self.eval_variable(variable, id.loc, scope, &visited)
  }

  /// Evaluates a variable's binding. `loc` is where the variable is referenced from, in `scope`'s module.
  fn eval_variable(&self, variable: &Variable, loc: Loc, scope: &EvalScope, visited: &Visited) -> ResolveResult<Value> {
    let name = &variable.name;
    let Some(definition) = variable.definitions.last() else {
      return Err(scope.error(loc, ResolveErrorKind::UnboundIdentifier(name.clone())));
    };
    match definition {
      Definition::Variable { decl, index } => {
        let declarator = &decl.stx.declarators[*index];
        if !matches!(declarator.pattern.stx.as_ref(), Pat::Id(_)) {
          return Err(scope.error(declarator.pattern.loc, ResolveErrorKind::UnsupportedDeclarator(name.clone())));
        };
        let Some(initializer) = &declarator.initializer else {
          return Err(scope.error(declarator.pattern.loc, ResolveErrorKind::MissingInitializer(name.clone())));
        };
        let decl_scope = scope.module.scopes.enclosing_scope(decl.id).unwrap_or(variable.scope);
        self.eval(initializer, &scope.with_scope(decl_scope), visited)
      }
      Definition::ImportBinding {
        decl,
        kind,
        imported,
        local,
      } => {
        if *kind == ImportKind::Namespace {
          return Err(scope.error(local.loc, ResolveErrorKind::NamespaceImport(name.clone())));
        };
        let target = self
          .load_module(&decl.stx.module, &scope.module)
          .map_err(|k| scope.error(decl.loc, k))?;
        self.resolve_export(&target, imported, (scope.module.as_ref(), local.loc), visited)
      }
      Definition::FunctionName { func, .. } => Ok(Value::Func(Closure {
        func: func.clone(),
        module: scope.module.clone(),
        env: scope.frame.clone(),
      })),
      Definition::Parameter { .. } => self.eval_parameter(variable, loc, scope, visited),
      Definition::CatchParam { .. } => Err(scope.error(loc, ResolveErrorKind::UnsupportedBinding {
        name: name.clone(),
        kind: definition.kind_name(),
      })),
    }
  }

  fn eval_parameter(&self, variable: &Variable, loc: Loc, scope: &EvalScope, visited: &Visited) -> ResolveResult<Value> {
    let name = &variable.name;
    let frame = std::iter::successors(scope.frame.as_ref(), |f| f.parent.as_ref())
      .find(|f| f.func_scope == variable.scope && f.module.id == scope.module.id)
      .ok_or_else(|| scope.error(loc, ResolveErrorKind::UnboundParameter(name.clone())))?;
    match frame.bindings.get(name) {
      Some(Binding::Argument { expr, scope: arg_scope }) => self.eval(expr, arg_scope, visited),
      Some(Binding::Default(expr)) => {
        let callee_scope = EvalScope {
          module: frame.module.clone(),
          scope: frame.func_scope,
          frame: Some(frame.clone()),
        };
        self.eval(expr, &callee_scope, visited)
      }
      None => Err(scope.error(loc, ResolveErrorKind::UnboundParameter(name.clone()))),
    }
  }

  fn new_frame_id(&self) -> u32 {
    self.next_frame.fetch_add(1, Ordering::Relaxed)
  }
}
