use super::expr::Expr;
use super::func::Func;
use super::node::Node;
use super::pat::IdPat;
use super::pat::Pat;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use derive_visitor::Drive;
use serde::Serialize;

#[derive(Debug, Drive, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Stmt {
  Block(Node<BlockStmt>),
  Empty(Node<EmptyStmt>),
  ExportDefaultExpr(Node<ExportDefaultExprStmt>),
  ExportList(Node<ExportListStmt>),
  Expr(Node<ExprStmt>),
  FuncDecl(Node<FuncDecl>),
  If(Node<IfStmt>),
  Import(Node<ImportStmt>),
  Return(Node<ReturnStmt>),
  Switch(Node<SwitchStmt>),
  Try(Node<TryStmt>),
  VarDecl(Node<VarDecl>),
  While(Node<WhileStmt>),
}

#[derive(Debug, Drive, Serialize)]
pub struct TopLevel {
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct BlockStmt {
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct EmptyStmt {}

// `export default <expr>`. Function declarations use FuncDecl with `export_default` instead.
#[derive(Debug, Drive, Serialize)]
pub struct ExportDefaultExprStmt {
  pub expression: Node<Expr>,
}

#[derive(Debug, Drive, Serialize)]
pub struct ExportName {
  // For a local export list this is the local binding; for a re-export it's the name exported by `from`.
  #[drive(skip)]
  pub target: String,
  #[drive(skip)]
  pub alias: String,
}

#[derive(Debug, Drive, Serialize)]
pub enum ExportNames {
  // `export * from "m"` when None, `export * as ns from "m"` otherwise.
  All(Option<Node<IdPat>>),
  Specific(Vec<Node<ExportName>>),
}

#[derive(Debug, Drive, Serialize)]
pub struct ExportListStmt {
  #[drive(skip)]
  pub type_only: bool,
  pub names: ExportNames,
  #[drive(skip)]
  pub from: Option<String>,
}

#[derive(Debug, Drive, Serialize)]
pub struct ExprStmt {
  pub expr: Node<Expr>,
}

#[derive(Debug, Drive, Serialize)]
pub struct FuncDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub export_default: bool,
  pub name: Option<Node<IdPat>>, // Name can only be omitted in a default export.
  pub function: Node<Func>,
}

#[derive(Debug, Drive, Serialize)]
pub struct IfStmt {
  pub test: Node<Expr>,
  pub consequent: Node<Stmt>,
  pub alternate: Option<Node<Stmt>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct ImportName {
  #[drive(skip)]
  pub importable: String,
  pub alias: Node<IdPat>,
}

#[derive(Debug, Drive, Serialize)]
pub enum ImportNames {
  // `import * as ns from "m"`.
  All(Node<IdPat>),
  Specific(Vec<Node<ImportName>>),
}

#[derive(Debug, Drive, Serialize)]
pub struct ImportStmt {
  #[drive(skip)]
  pub type_only: bool,
  pub default: Option<Node<IdPat>>,
  pub names: Option<ImportNames>,
  #[drive(skip)]
  pub module: String,
}

#[derive(Debug, Drive, Serialize)]
pub struct ReturnStmt {
  pub value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct SwitchBranch {
  // If None, it's `default`.
  pub case: Option<Node<Expr>>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct SwitchStmt {
  pub test: Node<Expr>,
  pub branches: Vec<Node<SwitchBranch>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct CatchBlock {
  pub parameter: Option<Node<Pat>>,
  pub body: Vec<Node<Stmt>>, // Not a BlockStmt, as the scope starts with the parameter.
}

#[derive(Debug, Drive, Serialize)]
pub struct TryStmt {
  pub wrapped: Node<BlockStmt>,
  pub catch: Option<Node<CatchBlock>>,
  pub finally: Option<Node<BlockStmt>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Drive, Serialize)]
pub enum VarDeclMode {
  Const,
  Let,
  Var,
}

#[derive(Debug, Drive, Serialize)]
pub struct VarDeclarator {
  pub pattern: Node<Pat>,
  pub initializer: Option<Node<Expr>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct VarDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub mode: VarDeclMode,
  pub declarators: Vec<VarDeclarator>,
  // Text of the comments directly preceding the declaration (or its `export` keyword), without delimiters.
  #[drive(skip)]
  pub leading_comments: Vec<String>,
}

#[derive(Debug, Drive, Serialize)]
pub struct WhileStmt {
  pub condition: Node<Expr>,
  pub body: Node<Stmt>,
}
