use crate::ast::expr::FuncExpr;
use crate::ast::expr::IdExpr;
use crate::ast::func::Func;
use crate::ast::node::Node;
use crate::ast::pat::IdPat;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::CatchBlock;
use crate::ast::stmt::FuncDecl;
use crate::ast::stmt::ImportNames;
use crate::ast::stmt::ImportStmt;
use crate::ast::stmt::ReturnStmt;
use crate::ast::stmt::SwitchStmt;
use crate::ast::stmt::TopLevel;
use crate::ast::stmt::VarDecl;
use crate::ast::stmt::VarDeclMode;
use crate::scope::Definition;
use crate::scope::ImportKind;
use crate::scope::Reference;
use crate::scope::ScopeId;
use crate::scope::ScopeKind;
use crate::scope::ScopeTree;
use crate::scope::Variable;
use derive_visitor::Drive;
use derive_visitor::Visitor;

type BlockStmtNode = Node<BlockStmt>;
type CatchBlockNode = Node<CatchBlock>;
type FuncDeclNode = Node<FuncDecl>;
type FuncExprNode = Node<FuncExpr>;
type FuncNode = Node<Func>;
type IdExprNode = Node<IdExpr>;
type ImportStmtNode = Node<ImportStmt>;
type ReturnStmtNode = Node<ReturnStmt>;
type SwitchStmtNode = Node<SwitchStmt>;
type VarDeclNode = Node<VarDecl>;

/// Computes the scope tree of a module.
///
/// Declarations are placed where they are visible for the whole scope (`var` and
/// parameters in the nearest closure, `let`/`const`/functions/classes in the
/// current block, imports in the module scope). References are not resolved
/// eagerly; use [`ScopeTree::lookup`] from the recorded enclosing scope.
pub fn bind(top_level: &Node<TopLevel>) -> ScopeTree {
  let mut visitor = BindVisitor::new();
  top_level.drive(&mut visitor);
  visitor.tree
}

#[derive(Visitor)]
#[visitor(
  BlockStmtNode,
  CatchBlockNode,
  FuncDeclNode(enter),
  FuncExprNode,
  FuncNode,
  IdExprNode(enter),
  ImportStmtNode(enter),
  ReturnStmtNode(enter),
  SwitchStmtNode,
  VarDeclNode(enter)
)]
struct BindVisitor {
  tree: ScopeTree,
  scope_stack: Vec<ScopeId>,
}

impl BindVisitor {
  fn new() -> BindVisitor {
    let tree = ScopeTree::with_root();
    let root = tree.root();
    BindVisitor {
      tree,
      scope_stack: vec![root],
    }
  }

  fn current(&self) -> ScopeId {
    *self.scope_stack.last().expect("module scope is never popped")
  }

  fn push_scope<S: Drive>(&mut self, kind: ScopeKind, creator: &Node<S>) {
    let parent = self.current();
    let id = self.tree.push(parent, kind, creator.id);
    self.scope_stack.push(id);
  }

  fn pop_scope(&mut self) {
    self.scope_stack.pop();
  }

  fn declare(&mut self, scope: ScopeId, name: &str, def: Definition) {
    self
      .tree
      .data_mut(scope)
      .variables
      .entry(name.to_string())
      .or_insert_with(|| Variable {
        name: name.to_string(),
        scope,
        definitions: Vec::new(),
      })
      .definitions
      .push(def);
  }

  fn declare_import(&mut self, decl: &ImportStmtNode, local: &Node<IdPat>, kind: ImportKind, imported: &str) {
    let root = self.tree.root();
    self.declare(root, &local.stx.name, Definition::ImportBinding {
      decl: decl.clone(),
      kind,
      imported: imported.to_string(),
      local: local.clone(),
    });
  }

  pub fn enter_block_stmt_node(&mut self, node: &BlockStmtNode) {
    self.push_scope(ScopeKind::Block, node);
  }

  pub fn exit_block_stmt_node(&mut self, _node: &BlockStmtNode) {
    self.pop_scope();
  }

  pub fn enter_catch_block_node(&mut self, node: &CatchBlockNode) {
    self.push_scope(ScopeKind::Block, node);
    if let Some(param) = &node.stx.parameter {
      let scope = self.current();
      for name in param.stx.bound_names() {
        let raw = name.stx.name.clone();
        self.declare(scope, &raw, Definition::CatchParam { name });
      }
    }
  }

  pub fn exit_catch_block_node(&mut self, _node: &CatchBlockNode) {
    self.pop_scope();
  }

  pub fn enter_func_decl_node(&mut self, node: &FuncDeclNode) {
    // The function's own scope is pushed when its Func node is entered, after this.
    if let Some(name) = &node.stx.name {
      let scope = self.current();
      self.declare(scope, &name.stx.name, Definition::FunctionName {
        name: name.clone(),
        func: node.stx.function.clone(),
      });
    }
  }

  pub fn enter_func_expr_node(&mut self, node: &FuncExprNode) {
    if let Some(name) = &node.stx.name {
      self.push_scope(ScopeKind::FunctionExpressionName, node);
      let scope = self.current();
      self.declare(scope, &name.stx.name, Definition::FunctionName {
        name: name.clone(),
        func: node.stx.func.clone(),
      });
    }
  }

  pub fn exit_func_expr_node(&mut self, node: &FuncExprNode) {
    if node.stx.name.is_some() {
      self.pop_scope();
    }
  }

  pub fn enter_func_node(&mut self, node: &FuncNode) {
    let kind = if node.stx.arrow {
      ScopeKind::ArrowFunction
    } else {
      ScopeKind::NonArrowFunction
    };
    self.push_scope(kind, node);
    let scope = self.current();
    for (index, param) in node.stx.parameters.iter().enumerate() {
      for name in param.stx.pattern.stx.bound_names() {
        self.declare(scope, &name.stx.name, Definition::Parameter {
          func: node.clone(),
          index,
        });
      }
    }
  }

  pub fn exit_func_node(&mut self, _node: &FuncNode) {
    self.pop_scope();
  }

  pub fn enter_id_expr_node(&mut self, node: &IdExprNode) {
    let scope = self.current();
    self.tree.enclosing.insert(node.id, scope);
    self.tree.data_mut(scope).references.push(Reference {
      node: node.id,
      name: node.stx.name.clone(),
    });
  }

  pub fn enter_import_stmt_node(&mut self, node: &ImportStmtNode) {
    if let Some(default) = &node.stx.default {
      self.declare_import(node, default, ImportKind::Default, "default");
    }
    match &node.stx.names {
      Some(ImportNames::All(alias)) => {
        self.declare_import(node, alias, ImportKind::Namespace, &alias.stx.name);
      }
      Some(ImportNames::Specific(names)) => {
        for name in names.iter() {
          self.declare_import(node, &name.stx.alias, ImportKind::Named, &name.stx.importable);
        }
      }
      None => {}
    }
  }

  pub fn enter_return_stmt_node(&mut self, node: &ReturnStmtNode) {
    let scope = self.current();
    self.tree.enclosing.insert(node.id, scope);
  }

  pub fn enter_switch_stmt_node(&mut self, node: &SwitchStmtNode) {
    self.push_scope(ScopeKind::Block, node);
  }

  pub fn exit_switch_stmt_node(&mut self, _node: &SwitchStmtNode) {
    self.pop_scope();
  }

  pub fn enter_var_decl_node(&mut self, node: &VarDeclNode) {
    let current = self.current();
    self.tree.enclosing.insert(node.id, current);
    let target = match node.stx.mode {
      VarDeclMode::Var => self.tree.closure_of(current),
      VarDeclMode::Const | VarDeclMode::Let => current,
    };
    for (index, declarator) in node.stx.declarators.iter().enumerate() {
      for name in declarator.pattern.stx.bound_names() {
        self.declare(target, &name.stx.name, Definition::Variable {
          decl: node.clone(),
          index,
        });
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::bind;
  use crate::ast::build::AstBuilder;
  use crate::ast::func::FuncBody;
  use crate::ast::stmt::VarDeclMode;
  use crate::scope::Definition;
  use crate::scope::ImportKind;
  use crate::scope::ScopeKind;

  #[test]
  fn test_var_hoists_out_of_blocks() {
    let b = AstBuilder::new();
    let inner = b.var_decl(false, VarDeclMode::Var, vec![b.declarator("v", Some(b.str("x")))], Vec::new());
    let lexical = b.var_decl(false, VarDeclMode::Let, vec![b.declarator("l", Some(b.str("y")))], Vec::new());
    let top = b.top_level(vec![b.block(vec![inner, lexical])]);
    let tree = bind(&top);
    let root = tree.get(tree.root());
    assert!(root.variable("v").is_some());
    assert!(root.variable("l").is_none());
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.get(root.children[0]).variable_names(), vec!["l"]);
  }

  #[test]
  fn test_parameters_and_function_names() {
    let b = AstBuilder::new();
    let func = b.func(vec![b.param("a"), b.param("b")], FuncBody::Expression(b.id("a")));
    let func_id = func.id;
    let top = b.top_level(vec![b.func_decl(false, "make", func)]);
    let tree = bind(&top);
    let scope = tree.scope_created_by(func_id).unwrap();
    assert_eq!(tree.get(scope).kind, ScopeKind::ArrowFunction);
    let a = tree.lookup(scope, "a").unwrap();
    assert!(matches!(a.definitions[0], Definition::Parameter { index: 0, .. }));
    let make = tree.lookup(scope, "make").unwrap();
    assert_eq!(make.scope, tree.root());
    assert!(matches!(make.definitions[0], Definition::FunctionName { .. }));
    assert_eq!(tree.get(scope).references().len(), 1);
  }

  #[test]
  fn test_named_function_expression_is_self_scoped() {
    let b = AstBuilder::new();
    let func = b.func(Vec::new(), FuncBody::Block(vec![b.ret(Some(b.str("x")))]));
    let top = b.top_level(vec![b.const_decl("f", b.func_expr(Some("inner"), func))]);
    let tree = bind(&top);
    assert!(tree.lookup(tree.root(), "inner").is_none());
    assert!(tree.lookup(tree.root(), "f").is_some());
  }

  #[test]
  fn test_import_bindings_land_in_module_scope() {
    let b = AstBuilder::new();
    let top = b.top_level(vec![
      b.import("./queries", Some("def"), &[("q", "local")]),
      b.import_all("./ns", "ns"),
    ]);
    let tree = bind(&top);
    let names = tree.get(tree.root()).variable_names();
    assert_eq!(names, vec!["def", "local", "ns"]);
    let Definition::ImportBinding { kind, imported, .. } = &tree.lookup(tree.root(), "local").unwrap().definitions[0] else {
      panic!("expected import binding");
    };
    assert_eq!(*kind, ImportKind::Named);
    assert_eq!(imported, "q");
  }
}
