use super::func::Func;
use super::node::Node;
use super::pat::IdPat;
use crate::num::JsNumber;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use derive_visitor::Drive;
use serde::Serialize;

// We must wrap each variant with Node<T> as otherwise we won't be able to visit Node<T> instead of just T.
#[derive(Debug, Drive, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Expr {
  ArrowFunc(Node<ArrowFuncExpr>),
  Binary(Node<BinaryExpr>),
  Call(Node<CallExpr>),
  Func(Node<FuncExpr>),
  Id(Node<IdExpr>),
  Member(Node<MemberExpr>),
  TaggedTemplate(Node<TaggedTemplateExpr>),

  // Literals.
  LitArr(Node<LitArrExpr>),
  LitBigInt(Node<LitBigIntExpr>),
  LitBool(Node<LitBoolExpr>),
  LitNull(Node<LitNullExpr>),
  LitNum(Node<LitNumExpr>),
  LitObj(Node<LitObjExpr>),
  LitRegex(Node<LitRegexExpr>),
  LitStr(Node<LitStrExpr>),
  LitTemplate(Node<LitTemplateExpr>),
}

impl Expr {
  /// Short name of the expression kind, for diagnostics.
  pub fn kind_name(&self) -> &'static str {
    match self {
      Expr::ArrowFunc(_) => "ArrowFunctionExpression",
      Expr::Binary(_) => "BinaryExpression",
      Expr::Call(_) => "CallExpression",
      Expr::Func(_) => "FunctionExpression",
      Expr::Id(_) => "Identifier",
      Expr::Member(_) => "MemberExpression",
      Expr::TaggedTemplate(_) => "TaggedTemplateExpression",
      Expr::LitArr(_) => "ArrayExpression",
      Expr::LitBigInt(_) => "BigIntLiteral",
      Expr::LitBool(_) => "BooleanLiteral",
      Expr::LitNull(_) => "NullLiteral",
      Expr::LitNum(_) => "NumericLiteral",
      Expr::LitObj(_) => "ObjectExpression",
      Expr::LitRegex(_) => "RegExpLiteral",
      Expr::LitStr(_) => "StringLiteral",
      Expr::LitTemplate(_) => "TemplateLiteral",
    }
  }
}

#[derive(Debug, Drive, Serialize)]
pub struct ArrowFuncExpr {
  pub func: Node<Func>, // Always has `arrow` set.
}

#[derive(Debug, Drive, Serialize)]
pub struct BinaryExpr {
  #[drive(skip)]
  pub operator: String,
  pub left: Node<Expr>,
  pub right: Node<Expr>,
}

#[derive(Debug, Drive, Serialize)]
pub struct CallArg {
  #[drive(skip)]
  pub spread: bool,
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, Serialize)]
pub struct CallExpr {
  #[drive(skip)]
  pub optional_chaining: bool,
  pub callee: Node<Expr>,
  pub arguments: Vec<Node<CallArg>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct FuncExpr {
  // The name is only bound inside the function itself.
  pub name: Option<Node<IdPat>>,
  pub func: Node<Func>,
}

#[derive(Debug, Drive, Serialize)]
pub struct IdExpr {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, Serialize)]
pub struct MemberExpr {
  #[drive(skip)]
  pub optional_chaining: bool,
  pub left: Node<Expr>,
  #[drive(skip)]
  pub right: String,
}

#[derive(Debug, Drive, Serialize)]
pub struct TaggedTemplateExpr {
  pub function: Node<Expr>,
  pub parts: Vec<LitTemplatePart>,
}

#[derive(Debug, Drive, Serialize)]
pub struct LitArrExpr {
  pub elements: Vec<Node<Expr>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct LitBigIntExpr {
  #[drive(skip)]
  pub value: String, // Without the trailing `n`.
}

#[derive(Debug, Drive, Serialize)]
pub struct LitBoolExpr {
  #[drive(skip)]
  pub value: bool,
}

#[derive(Debug, Drive, Serialize)]
pub struct LitNullExpr {}

#[derive(Debug, Drive, Serialize)]
pub struct LitNumExpr {
  #[drive(skip)]
  pub value: JsNumber,
}

#[derive(Debug, Drive, Serialize)]
pub struct LitObjMember {
  #[drive(skip)]
  pub key: String,
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, Serialize)]
pub struct LitObjExpr {
  pub members: Vec<Node<LitObjMember>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct LitRegexExpr {
  #[drive(skip)]
  pub value: String, // Including delimiter slashes and any flags.
}

#[derive(Debug, Drive, Serialize)]
pub struct LitStrExpr {
  #[drive(skip)]
  pub value: String,
}

#[derive(Debug, Drive, Serialize)]
pub struct LitTemplateExpr {
  pub parts: Vec<LitTemplatePart>,
}

// Parts alternate, but consecutive strings or substitutions are allowed; the cooked value is stored.
#[derive(Debug, Drive, Serialize)]
pub enum LitTemplatePart {
  Substitution(Node<Expr>),
  #[drive(skip)]
  String(String),
}
