use super::expr::Expr;
use super::node::Node;
use super::pat::Pat;
use super::stmt::Stmt;
use derive_more::derive::From;
use derive_visitor::Drive;
use serde::Serialize;

// This common type exists for better downstream usage, as one type is easier to match on than arrow functions, function expressions and function declarations separately.
#[derive(Debug, Drive, Serialize)]
pub struct Func {
  #[drive(skip)]
  pub arrow: bool,
  #[drive(skip)]
  pub async_: bool,
  #[drive(skip)]
  pub generator: bool,
  pub parameters: Vec<Node<ParamDecl>>,
  pub body: FuncBody,
}

#[derive(Debug, Drive, Serialize)]
pub struct ParamDecl {
  #[drive(skip)]
  pub rest: bool,
  pub pattern: Node<Pat>,
  pub default_value: Option<Node<Expr>>,
}

// A function body is not a block statement: parameters and body declarations share the function's scope.
#[derive(Debug, Drive, From, Serialize)]
pub enum FuncBody {
  Block(Vec<Node<Stmt>>),
  // If arrow function.
  Expression(Node<Expr>),
}
