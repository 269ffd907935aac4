use super::expr::Expr;
use super::node::Node;
use derive_more::derive::From;
use derive_more::derive::TryInto;
use derive_visitor::Drive;
use serde::Serialize;

#[derive(Debug, Drive, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Pat {
  Arr(Node<ArrPat>),
  Id(Node<IdPat>),
  Obj(Node<ObjPat>),
}

impl Pat {
  /// Every name bound by the pattern, depth first.
  pub fn bound_names(&self) -> Vec<Node<IdPat>> {
    let mut out = Vec::new();
    self.collect_names(&mut out);
    out
  }

  fn collect_names(&self, out: &mut Vec<Node<IdPat>>) {
    match self {
      Pat::Id(id) => out.push(id.clone()),
      Pat::Arr(arr) => {
        for elem in arr.stx.elements.iter().flatten() {
          elem.target.stx.collect_names(out);
        }
        if let Some(rest) = &arr.stx.rest {
          rest.stx.collect_names(out);
        }
      }
      Pat::Obj(obj) => {
        for prop in obj.stx.properties.iter() {
          prop.stx.target.stx.collect_names(out);
        }
        if let Some(rest) = &obj.stx.rest {
          rest.stx.collect_names(out);
        }
      }
    }
  }
}

#[derive(Debug, Drive, Serialize)]
pub struct IdPat {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, Serialize)]
pub struct ArrPatElem {
  pub target: Node<Pat>,
  pub default_value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct ArrPat {
  // Holes are None.
  pub elements: Vec<Option<ArrPatElem>>,
  pub rest: Option<Node<Pat>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct ObjPatProp {
  #[drive(skip)]
  pub key: String,
  pub target: Node<Pat>,
  pub default_value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, Serialize)]
pub struct ObjPat {
  pub properties: Vec<Node<ObjPatProp>>,
  pub rest: Option<Node<Pat>>,
}
