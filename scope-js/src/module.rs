use crate::ast::node::Node;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::TopLevel;
use crate::bind::bind;
use crate::loc::LineIndex;
use crate::loc::Loc;
use crate::loc::SourceRange;
use crate::scope::ScopeTree;
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::Arc;

/// Identifies a loaded module; usually its resolved file path.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub struct ModuleId(pub String);

impl ModuleId {
  pub fn new(id: impl Into<String>) -> ModuleId {
    ModuleId(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl Display for ModuleId {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A parsed module as handed over by a front end.
#[derive(Clone, Debug)]
pub struct Program {
  pub top_level: Node<TopLevel>,
  pub lines: LineIndex,
}

impl Program {
  pub fn new(top_level: Node<TopLevel>, source: &str) -> Program {
    Program {
      top_level,
      lines: LineIndex::new(source),
    }
  }

  /// A program without source text, so every location maps to line 1.
  pub fn synthetic(top_level: Node<TopLevel>) -> Program {
    Program {
      top_level,
      lines: LineIndex::default(),
    }
  }
}

/// A module with its scope tree computed.
#[derive(Debug)]
pub struct Module {
  pub id: ModuleId,
  pub program: Program,
  pub scopes: ScopeTree,
}

impl Module {
  pub fn new(id: ModuleId, program: Program) -> Arc<Module> {
    let scopes = bind(&program.top_level);
    Arc::new(Module {
      id,
      program,
      scopes,
    })
  }

  pub fn body(&self) -> &[Node<Stmt>] {
    &self.program.top_level.stx.body
  }

  pub fn range(&self, loc: Loc) -> SourceRange {
    self.program.lines.range(loc)
  }

  /// Sources of the module's `import` and `export ... from` statements, in order.
  pub fn dependencies(&self) -> Vec<&str> {
    self
      .body()
      .iter()
      .filter_map(|stmt| match stmt.stx.as_ref() {
        Stmt::Import(import) => Some(import.stx.module.as_str()),
        Stmt::ExportList(export) => export.stx.from.as_deref(),
        _ => None,
      })
      .collect()
  }
}
