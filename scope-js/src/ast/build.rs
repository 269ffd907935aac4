use super::expr::ArrowFuncExpr;
use super::expr::CallArg;
use super::expr::CallExpr;
use super::expr::Expr;
use super::expr::FuncExpr;
use super::expr::IdExpr;
use super::expr::LitBigIntExpr;
use super::expr::LitBoolExpr;
use super::expr::LitNullExpr;
use super::expr::LitNumExpr;
use super::expr::LitRegexExpr;
use super::expr::LitStrExpr;
use super::expr::LitTemplateExpr;
use super::expr::LitTemplatePart;
use super::expr::MemberExpr;
use super::expr::TaggedTemplateExpr;
use super::func::Func;
use super::func::FuncBody;
use super::func::ParamDecl;
use super::node::Node;
use super::node::NodeId;
use super::pat::IdPat;
use super::pat::Pat;
use super::stmt::BlockStmt;
use super::stmt::CatchBlock;
use super::stmt::ExportDefaultExprStmt;
use super::stmt::ExportListStmt;
use super::stmt::ExportName;
use super::stmt::ExportNames;
use super::stmt::FuncDecl;
use super::stmt::IfStmt;
use super::stmt::ImportName;
use super::stmt::ImportNames;
use super::stmt::ImportStmt;
use super::stmt::ReturnStmt;
use super::stmt::Stmt;
use super::stmt::TopLevel;
use super::stmt::TryStmt;
use super::stmt::VarDecl;
use super::stmt::VarDeclMode;
use super::stmt::VarDeclarator;
use crate::loc::Loc;
use crate::num::JsNumber;
use derive_visitor::Drive;
use std::cell::Cell;

/// Allocates node IDs and provides shorthands for assembling ASTs.
///
/// Front ends that produce this AST from source text use `node_at`, which is what every other helper bottoms out in. The shorthands are mostly useful for synthesized programs and tests, and leave locations empty.
#[derive(Default)]
pub struct AstBuilder {
  next_id: Cell<u32>,
}

impl AstBuilder {
  pub fn new() -> AstBuilder {
    AstBuilder::default()
  }

  pub fn next_id(&self) -> NodeId {
    let id = self.next_id.get();
    self.next_id.set(id + 1);
    NodeId(id)
  }

  pub fn node_at<S: Drive>(&self, loc: Loc, stx: S) -> Node<S> {
    Node::new(self.next_id(), loc, stx)
  }

  pub fn node<S: Drive>(&self, stx: S) -> Node<S> {
    self.node_at(Loc::default(), stx)
  }

  /// Builds the inner node and wraps it in its enum node, both at `loc`.
  pub fn wrap_at<S: Drive, E: Drive>(&self, loc: Loc, stx: S) -> Node<E>
  where
    Node<S>: Into<E>,
  {
    let inner = self.node_at(loc, stx);
    inner.wrap(self.next_id(), Into::into)
  }

  pub fn expr<S: Drive>(&self, stx: S) -> Node<Expr>
  where
    Node<S>: Into<Expr>,
  {
    self.wrap_at(Loc::default(), stx)
  }

  pub fn stmt<S: Drive>(&self, stx: S) -> Node<Stmt>
  where
    Node<S>: Into<Stmt>,
  {
    self.wrap_at(Loc::default(), stx)
  }

  pub fn top_level(&self, body: Vec<Node<Stmt>>) -> Node<TopLevel> {
    self.node(TopLevel { body })
  }

  // Expressions.

  pub fn id(&self, name: &str) -> Node<Expr> {
    self.expr(IdExpr {
      name: name.to_string(),
    })
  }

  pub fn str(&self, value: &str) -> Node<Expr> {
    self.expr(LitStrExpr {
      value: value.to_string(),
    })
  }

  pub fn num(&self, value: f64) -> Node<Expr> {
    self.expr(LitNumExpr {
      value: JsNumber(value),
    })
  }

  pub fn bool(&self, value: bool) -> Node<Expr> {
    self.expr(LitBoolExpr { value })
  }

  pub fn bigint(&self, value: &str) -> Node<Expr> {
    self.expr(LitBigIntExpr {
      value: value.to_string(),
    })
  }

  pub fn null(&self) -> Node<Expr> {
    self.expr(LitNullExpr {})
  }

  pub fn regex(&self, value: &str) -> Node<Expr> {
    self.expr(LitRegexExpr {
      value: value.to_string(),
    })
  }

  pub fn template(&self, parts: Vec<LitTemplatePart>) -> Node<Expr> {
    self.expr(LitTemplateExpr { parts })
  }

  pub fn tagged(&self, function: Node<Expr>, parts: Vec<LitTemplatePart>) -> Node<Expr> {
    self.expr(TaggedTemplateExpr { function, parts })
  }

  /// Shorthand for a template tagged with a bare identifier.
  pub fn tagged_id(&self, tag: &str, parts: Vec<LitTemplatePart>) -> Node<Expr> {
    self.tagged(self.id(tag), parts)
  }

  pub fn arg(&self, value: Node<Expr>) -> Node<CallArg> {
    self.node(CallArg {
      spread: false,
      value,
    })
  }

  pub fn spread(&self, value: Node<Expr>) -> Node<CallArg> {
    self.node(CallArg {
      spread: true,
      value,
    })
  }

  pub fn call_with(&self, callee: Node<Expr>, arguments: Vec<Node<CallArg>>) -> Node<Expr> {
    self.expr(CallExpr {
      optional_chaining: false,
      callee,
      arguments,
    })
  }

  pub fn call(&self, callee: Node<Expr>, arguments: Vec<Node<Expr>>) -> Node<Expr> {
    let arguments = arguments.into_iter().map(|a| self.arg(a)).collect();
    self.call_with(callee, arguments)
  }

  pub fn member(&self, left: Node<Expr>, right: &str) -> Node<Expr> {
    self.expr(MemberExpr {
      optional_chaining: false,
      left,
      right: right.to_string(),
    })
  }

  pub fn id_pat(&self, name: &str) -> Node<IdPat> {
    self.node(IdPat {
      name: name.to_string(),
    })
  }

  pub fn pat(&self, name: &str) -> Node<Pat> {
    let id = self.id_pat(name);
    id.wrap(self.next_id(), Into::into)
  }

  pub fn param(&self, name: &str) -> Node<ParamDecl> {
    self.node(ParamDecl {
      rest: false,
      pattern: self.pat(name),
      default_value: None,
    })
  }

  pub fn param_default(&self, name: &str, default_value: Node<Expr>) -> Node<ParamDecl> {
    self.node(ParamDecl {
      rest: false,
      pattern: self.pat(name),
      default_value: Some(default_value),
    })
  }

  pub fn func(&self, parameters: Vec<Node<ParamDecl>>, body: FuncBody) -> Node<Func> {
    let arrow = matches!(body, FuncBody::Expression(_));
    self.node(Func {
      arrow,
      async_: false,
      generator: false,
      parameters,
      body,
    })
  }

  pub fn arrow(&self, parameters: Vec<Node<ParamDecl>>, body: Node<Expr>) -> Node<Expr> {
    let func = self.func(parameters, FuncBody::Expression(body));
    self.expr(ArrowFuncExpr { func })
  }

  pub fn arrow_block(&self, parameters: Vec<Node<ParamDecl>>, body: Vec<Node<Stmt>>) -> Node<Expr> {
    let func = self.node(Func {
      arrow: true,
      async_: false,
      generator: false,
      parameters,
      body: FuncBody::Block(body),
    });
    self.expr(ArrowFuncExpr { func })
  }

  pub fn func_expr(&self, name: Option<&str>, func: Node<Func>) -> Node<Expr> {
    self.expr(FuncExpr {
      name: name.map(|n| self.id_pat(n)),
      func,
    })
  }

  // Statements.

  pub fn declarator(&self, name: &str, initializer: Option<Node<Expr>>) -> VarDeclarator {
    VarDeclarator {
      pattern: self.pat(name),
      initializer,
    }
  }

  pub fn var_decl(
    &self,
    export: bool,
    mode: VarDeclMode,
    declarators: Vec<VarDeclarator>,
    leading_comments: Vec<String>,
  ) -> Node<Stmt> {
    self.stmt(VarDecl {
      export,
      mode,
      declarators,
      leading_comments,
    })
  }

  pub fn const_decl(&self, name: &str, initializer: Node<Expr>) -> Node<Stmt> {
    let declarator = self.declarator(name, Some(initializer));
    self.var_decl(false, VarDeclMode::Const, vec![declarator], Vec::new())
  }

  pub fn export_const(&self, name: &str, initializer: Node<Expr>) -> Node<Stmt> {
    let declarator = self.declarator(name, Some(initializer));
    self.var_decl(true, VarDeclMode::Const, vec![declarator], Vec::new())
  }

  pub fn block(&self, body: Vec<Node<Stmt>>) -> Node<Stmt> {
    self.stmt(BlockStmt { body })
  }

  pub fn ret(&self, value: Option<Node<Expr>>) -> Node<Stmt> {
    self.stmt(ReturnStmt { value })
  }

  pub fn if_stmt(&self, test: Node<Expr>, consequent: Node<Stmt>, alternate: Option<Node<Stmt>>) -> Node<Stmt> {
    self.stmt(IfStmt {
      test,
      consequent,
      alternate,
    })
  }

  pub fn try_stmt(&self, wrapped: Vec<Node<Stmt>>, catch: Option<Vec<Node<Stmt>>>) -> Node<Stmt> {
    let wrapped = self.node(BlockStmt { body: wrapped });
    let catch = catch.map(|body| {
      self.node(CatchBlock {
        parameter: None,
        body,
      })
    });
    self.stmt(TryStmt {
      wrapped,
      catch,
      finally: None,
    })
  }

  pub fn func_decl(&self, export: bool, name: &str, function: Node<Func>) -> Node<Stmt> {
    self.stmt(FuncDecl {
      export,
      export_default: false,
      name: Some(self.id_pat(name)),
      function,
    })
  }

  /// `import def, { importable as alias, ... } from "module"`.
  pub fn import(&self, module: &str, default: Option<&str>, names: &[(&str, &str)]) -> Node<Stmt> {
    let names = (!names.is_empty()).then(|| {
      ImportNames::Specific(
        names
          .iter()
          .map(|(importable, alias)| {
            self.node(ImportName {
              importable: importable.to_string(),
              alias: self.id_pat(alias),
            })
          })
          .collect(),
      )
    });
    self.stmt(ImportStmt {
      type_only: false,
      default: default.map(|d| self.id_pat(d)),
      names,
      module: module.to_string(),
    })
  }

  pub fn import_all(&self, module: &str, alias: &str) -> Node<Stmt> {
    self.stmt(ImportStmt {
      type_only: false,
      default: None,
      names: Some(ImportNames::All(self.id_pat(alias))),
      module: module.to_string(),
    })
  }

  pub fn export_default(&self, expression: Node<Expr>) -> Node<Stmt> {
    self.stmt(ExportDefaultExprStmt { expression })
  }

  /// `export { target as alias, ... }`, optionally `from` another module.
  pub fn export_list(&self, names: &[(&str, &str)], from: Option<&str>) -> Node<Stmt> {
    let names = names
      .iter()
      .map(|(target, alias)| {
        self.node(ExportName {
          target: target.to_string(),
          alias: alias.to_string(),
        })
      })
      .collect();
    self.stmt(ExportListStmt {
      type_only: false,
      names: ExportNames::Specific(names),
      from: from.map(|f| f.to_string()),
    })
  }

  /// `export * from "module"`.
  pub fn export_all(&self, from: &str) -> Node<Stmt> {
    self.stmt(ExportListStmt {
      type_only: false,
      names: ExportNames::All(None),
      from: Some(from.to_string()),
    })
  }

  /// `export * as alias from "module"`.
  pub fn export_all_as(&self, alias: &str, from: &str) -> Node<Stmt> {
    self.stmt(ExportListStmt {
      type_only: false,
      names: ExportNames::All(Some(self.id_pat(alias))),
      from: Some(from.to_string()),
    })
  }
}

/// Template part helpers, so template construction reads close to the source it models.
pub fn quasi(text: &str) -> LitTemplatePart {
  LitTemplatePart::String(text.to_string())
}

pub fn subst(expr: Node<Expr>) -> LitTemplatePart {
  LitTemplatePart::Substitution(expr)
}

#[cfg(test)]
mod tests {
  use super::AstBuilder;
  use crate::ast::expr::Expr;
  use crate::ast::stmt::Stmt;

  #[test]
  fn test_ids_are_unique() {
    let b = AstBuilder::new();
    let a = b.id("a");
    let c = b.id("c");
    assert_ne!(a.id, c.id);
    let Expr::Id(inner) = a.stx.as_ref() else {
      panic!("expected identifier");
    };
    assert_ne!(inner.id, a.id);
  }

  #[test]
  fn test_const_decl_shape() {
    let b = AstBuilder::new();
    let stmt = b.const_decl("q", b.str("*"));
    let Stmt::VarDecl(decl) = stmt.stx.as_ref() else {
      panic!("expected var decl");
    };
    assert_eq!(decl.stx.declarators.len(), 1);
    assert!(decl.stx.declarators[0].initializer.is_some());
  }
}
