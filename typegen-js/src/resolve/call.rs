use super::Binding;
use super::CallFrame;
use super::CallKey;
use super::Closure;
use super::EvalScope;
use super::ResolutionContext;
use super::Value;
use super::Visited;
use crate::error::ResolveErrorKind;
use crate::error::ResolveResult;
use ahash::AHashMap;
use scope_js::ast::expr::CallExpr;
use scope_js::ast::expr::Expr;
use scope_js::ast::func::FuncBody;
use scope_js::ast::node::Node;
use scope_js::ast::pat::Pat;
use scope_js::ast::stmt::ReturnStmt;
use scope_js::ast::stmt::Stmt;
use scope_js::scope::Definition;
use scope_js::scope::ImportKind;
use std::sync::Arc;

impl ResolutionContext<'_> {
  pub(super) fn eval_call(&self, call: &Node<CallExpr>, scope: &EvalScope, visited: &Visited) -> ResolveResult<Value> {
    if let Some(wrapper) = self.wrapper_name(&call.stx.callee, scope) {
      let Some(first) = call.stx.arguments.first() else {
        return Err(scope.error(call.loc, ResolveErrorKind::MissingQueryArgument(wrapper)));
      };
      if first.stx.spread {
        return Err(scope.error(first.loc, ResolveErrorKind::SpreadArgument));
      };
      return self.eval(&first.stx.value, scope, visited);
    };

    let Value::Func(closure) = self.eval(&call.stx.callee, scope, visited)? else {
      return Err(scope.error(call.stx.callee.loc, ResolveErrorKind::NotCallable));
    };
    let visited = visited
      .enter_call(CallKey {
        site: (scope.module.id.clone(), call.id),
        caller_site: scope.frame.as_ref().map(|f| f.site.clone()),
        callee: (closure.module.id.clone(), closure.func.id),
      })
      .ok_or_else(|| {
        let name = match call.stx.callee.stx.as_ref() {
          Expr::Id(id) => id.stx.name.clone(),
          _ => "function".to_string(),
        };
        scope.error(call.loc, ResolveErrorKind::CircularReference(name))
      })?;
    self.call_closure(&closure, call, scope, &visited)
  }

  /// Name of the allow-listed identity helper the callee refers to, if it is imported from an allow-listed module.
  fn wrapper_name(&self, callee: &Node<Expr>, scope: &EvalScope) -> Option<String> {
    let imported_from = |name: &str, kinds: &[ImportKind]| {
      let variable = scope.module.scopes.lookup(scope.scope, name)?;
      match variable.definitions.last()? {
        Definition::ImportBinding {
          decl, kind, imported, ..
        } if kinds.contains(kind) && self.options.is_wrapper_source(&decl.stx.module) => Some(imported.clone()),
        _ => None,
      }
    };
    match callee.stx.as_ref() {
      Expr::Id(id) => {
        imported_from(&id.stx.name, &[ImportKind::Named]).filter(|imported| self.options.is_wrapper(imported))
      }
      // `ns.defineQuery(...)` with `import * as ns from "groq"`.
      Expr::Member(member) => match member.stx.left.stx.as_ref() {
        Expr::Id(ns) if self.options.is_wrapper(&member.stx.right) => {
          imported_from(&ns.stx.name, &[ImportKind::Namespace]).map(|_| member.stx.right.clone())
        }
        _ => None,
      },
      _ => None,
    }
  }

  fn call_closure(
    &self,
    closure: &Closure,
    call: &Node<CallExpr>,
    caller: &EvalScope,
    visited: &Visited,
  ) -> ResolveResult<Value> {
    let func = &closure.func;
    let arguments = &call.stx.arguments;
    let call_loc = call.loc;
    if func.stx.async_ {
      return Err(caller.error(call_loc, ResolveErrorKind::NotStaticallyEvaluable("async")));
    };
    if func.stx.generator {
      return Err(caller.error(call_loc, ResolveErrorKind::NotStaticallyEvaluable("generator")));
    };
    if let Some(spread) = arguments.iter().find(|a| a.stx.spread) {
      return Err(caller.error(spread.loc, ResolveErrorKind::SpreadArgument));
    };
    let callee = EvalScope::module_scope(closure.module.clone());
    let func_scope = closure
      .module
      .scopes
      .scope_created_by(func.id)
      .ok_or_else(|| callee.error(func.loc, ResolveErrorKind::UnsupportedExpression("Function")))?;

    let mut bindings = AHashMap::new();
    for (i, param) in func.stx.parameters.iter().enumerate() {
      let Pat::Id(id) = param.stx.pattern.stx.as_ref() else {
        return Err(callee.error(param.loc, ResolveErrorKind::UnsupportedParameter));
      };
      if param.stx.rest {
        return Err(callee.error(param.loc, ResolveErrorKind::UnsupportedParameter));
      };
      let name = id.stx.name.clone();
      let binding = match arguments.get(i) {
        Some(arg) if !is_undefined(&arg.stx.value, caller) => Binding::Argument {
          expr: arg.stx.value.clone(),
          scope: caller.clone(),
        },
        _ => match &param.stx.default_value {
          Some(default) => Binding::Default(default.clone()),
          None => return Err(caller.error(call_loc, ResolveErrorKind::MissingArgument(name))),
        },
      };
      bindings.insert(name, binding);
    }

    let frame = Arc::new(CallFrame {
      id: self.new_frame_id(),
      site: (caller.module.id.clone(), call.id),
      module: closure.module.clone(),
      func_scope,
      bindings,
      parent: closure.env.clone(),
    });
    let body_scope = EvalScope {
      module: closure.module.clone(),
      scope: func_scope,
      frame: Some(frame),
    };
    match &func.stx.body {
      FuncBody::Expression(expr) => self.eval(expr, &body_scope, visited),
      FuncBody::Block(body) => {
        let returns = find_returns(body);
        let [ret] = returns.as_slice() else {
          return Err(body_scope.error(func.loc, ResolveErrorKind::ReturnCount(returns.len())));
        };
        let Some(value) = &ret.stx.value else {
          return Err(body_scope.error(ret.loc, ResolveErrorKind::MissingReturnArgument));
        };
        let ret_scope = closure.module.scopes.enclosing_scope(ret.id).unwrap_or(func_scope);
        self.eval(value, &body_scope.with_scope(ret_scope), visited)
      }
    }
  }
}

// The literal identifier `undefined`, unless something shadows it.
fn is_undefined(expr: &Node<Expr>, scope: &EvalScope) -> bool {
  match expr.stx.as_ref() {
    Expr::Id(id) => id.stx.name == "undefined" && scope.module.scopes.lookup(scope.scope, "undefined").is_none(),
    _ => false,
  }
}

/// Return statements reachable through straight-line code, both arms of `if`, nested blocks and `try` blocks.
///
/// Loops, `switch`, `catch`/`finally` and nested functions are not traversed, so a return only reachable through them is not found.
pub(crate) fn find_returns(body: &[Node<Stmt>]) -> Vec<&Node<ReturnStmt>> {
  let mut out = Vec::new();
  for stmt in body.iter() {
    collect_returns(stmt, &mut out);
  }
  out
}

fn collect_returns<'a>(stmt: &'a Node<Stmt>, out: &mut Vec<&'a Node<ReturnStmt>>) {
  match stmt.stx.as_ref() {
    Stmt::Return(ret) => out.push(ret),
    Stmt::If(if_stmt) => {
      collect_returns(&if_stmt.stx.consequent, out);
      if let Some(alternate) = &if_stmt.stx.alternate {
        collect_returns(alternate, out);
      }
    }
    Stmt::Block(block) => {
      for stmt in block.stx.body.iter() {
        collect_returns(stmt, out);
      }
    }
    Stmt::Try(try_stmt) => {
      for stmt in try_stmt.stx.wrapped.stx.body.iter() {
        collect_returns(stmt, out);
      }
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::find_returns;
  use scope_js::ast::build::AstBuilder;

  #[test]
  fn test_find_returns_supported_subset() {
    let b = AstBuilder::new();
    let body = vec![
      b.if_stmt(b.id("a"), b.ret(Some(b.str("x"))), Some(b.block(vec![b.ret(Some(b.str("y")))]))),
      b.try_stmt(vec![b.ret(Some(b.str("z")))], Some(vec![b.ret(Some(b.str("caught")))])),
    ];
    assert_eq!(find_returns(&body).len(), 3);
  }

  #[test]
  fn test_find_returns_skips_loops() {
    use scope_js::ast::stmt::WhileStmt;
    let b = AstBuilder::new();
    let body = vec![b.stmt(WhileStmt {
      condition: b.bool(true),
      body: b.ret(Some(b.str("x"))),
    })];
    assert!(find_returns(&body).is_empty());
  }
}
