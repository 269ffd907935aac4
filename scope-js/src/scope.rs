//! Lexical scope tree for one module.
//!
//! Scopes are stored in a flat arena indexed by [`ScopeId`]. Each scope owns the
//! [`Variable`]s declared in it (after hoisting) and the [`Reference`]s made from
//! it. Variables carry one or more [`Definition`]s that point back at the
//! declaring syntax, so a consumer can go from a use site to the expression that
//! produced the value.
use crate::ast::expr::Expr;
use crate::ast::func::Func;
use crate::ast::node::Node;
use crate::ast::node::NodeId;
use crate::ast::pat::IdPat;
use crate::ast::stmt::ImportStmt;
use crate::ast::stmt::VarDecl;
use ahash::AHashMap;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(u32);

impl ScopeId {
  pub fn raw(self) -> u32 {
    self.0
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ScopeKind {
  Module,
  NonArrowFunction,
  ArrowFunction,
  Block,
  /// The dedicated scope for a named function expression's own name.
  FunctionExpressionName,
}

impl ScopeKind {
  /// Whether `var` declarations hoist to this scope.
  pub fn is_closure(self) -> bool {
    matches!(
      self,
      ScopeKind::Module | ScopeKind::NonArrowFunction | ScopeKind::ArrowFunction
    )
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ImportKind {
  Default,
  Named,
  Namespace,
}

#[derive(Clone, Debug)]
pub enum Definition {
  /// `index` selects the declarator within the declaration.
  Variable { decl: Node<VarDecl>, index: usize },
  /// `imported` is the name exported by the source module: `default` for default imports, and the local name for namespace imports.
  ImportBinding {
    decl: Node<ImportStmt>,
    kind: ImportKind,
    imported: String,
    local: Node<IdPat>,
  },
  FunctionName { name: Node<IdPat>, func: Node<Func> },
  Parameter { func: Node<Func>, index: usize },
  CatchParam { name: Node<IdPat> },
}

impl Definition {
  pub fn kind_name(&self) -> &'static str {
    match self {
      Definition::Variable { .. } => "Variable",
      Definition::ImportBinding { .. } => "ImportBinding",
      Definition::FunctionName { .. } => "FunctionName",
      Definition::Parameter { .. } => "Parameter",
      Definition::CatchParam { .. } => "CatchParam",
    }
  }

  /// Initializer of a variable definition's declarator, if any.
  pub fn initializer(&self) -> Option<&Node<Expr>> {
    match self {
      Definition::Variable { decl, index } => decl.stx.declarators.get(*index)?.initializer.as_ref(),
      _ => None,
    }
  }
}

#[derive(Clone, Debug)]
pub struct Variable {
  pub name: String,
  pub scope: ScopeId,
  // Redeclarations (e.g. `var x; var x = 1;`) add more definitions; the last one wins for resolution.
  pub definitions: Vec<Definition>,
}

#[derive(Clone, Debug)]
pub struct Reference {
  pub node: NodeId,
  pub name: String,
}

#[derive(Clone, Debug)]
pub struct ScopeData {
  pub id: ScopeId,
  pub parent: Option<ScopeId>,
  pub kind: ScopeKind,
  pub children: Vec<ScopeId>,
  pub(crate) variables: AHashMap<String, Variable>,
  pub(crate) references: Vec<Reference>,
}

impl ScopeData {
  pub fn variable(&self, name: &str) -> Option<&Variable> {
    self.variables.get(name)
  }

  pub fn references(&self) -> &[Reference] {
    &self.references
  }

  /// Declared names, sorted for stable iteration.
  pub fn variable_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.variables.keys().map(|n| n.as_str()).collect();
    names.sort_unstable();
    names
  }
}

#[derive(Clone, Debug)]
pub struct ScopeTree {
  pub(crate) scopes: Vec<ScopeData>,
  // Scope created by a node (functions, blocks, catch clauses, switch statements, named function expressions).
  pub(crate) created: AHashMap<NodeId, ScopeId>,
  // Scope a node appears in, recorded for declarations, references and returns.
  pub(crate) enclosing: AHashMap<NodeId, ScopeId>,
}

impl ScopeTree {
  pub(crate) fn with_root() -> ScopeTree {
    ScopeTree {
      scopes: vec![ScopeData {
        id: ScopeId(0),
        parent: None,
        kind: ScopeKind::Module,
        children: Vec::new(),
        variables: AHashMap::new(),
        references: Vec::new(),
      }],
      created: AHashMap::new(),
      enclosing: AHashMap::new(),
    }
  }

  pub(crate) fn push(&mut self, parent: ScopeId, kind: ScopeKind, creator: NodeId) -> ScopeId {
    let id = ScopeId(self.scopes.len() as u32);
    self.scopes.push(ScopeData {
      id,
      parent: Some(parent),
      kind,
      children: Vec::new(),
      variables: AHashMap::new(),
      references: Vec::new(),
    });
    self.scopes[parent.0 as usize].children.push(id);
    self.created.insert(creator, id);
    id
  }

  pub(crate) fn data_mut(&mut self, id: ScopeId) -> &mut ScopeData {
    &mut self.scopes[id.0 as usize]
  }

  pub fn root(&self) -> ScopeId {
    ScopeId(0)
  }

  pub fn len(&self) -> usize {
    self.scopes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.scopes.is_empty()
  }

  pub fn get(&self, id: ScopeId) -> &ScopeData {
    &self.scopes[id.0 as usize]
  }

  pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
    self.get(id).parent
  }

  /// The scope itself, then each parent up to the module scope.
  pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
    std::iter::successors(Some(id), move |s| self.parent(*s))
  }

  /// Nearest scope that `var` declarations in `id` hoist to.
  pub fn closure_of(&self, id: ScopeId) -> ScopeId {
    self
      .ancestors(id)
      .find(|s| self.get(*s).kind.is_closure())
      .unwrap_or_else(|| self.root())
  }

  /// Scope created by the given node (e.g. a function's own scope).
  pub fn scope_created_by(&self, node: NodeId) -> Option<ScopeId> {
    self.created.get(&node).copied()
  }

  /// Scope the given node appears in. Only recorded for declarations, identifier references and return statements.
  pub fn enclosing_scope(&self, node: NodeId) -> Option<ScopeId> {
    self.enclosing.get(&node).copied()
  }

  /// Finds the nearest variable with this name visible from `scope`.
  pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Variable> {
    self
      .ancestors(scope)
      .find_map(|s| self.get(s).variables.get(name))
  }
}
