use crate::loc::Loc;
use derive_visitor::Drive;
use derive_visitor::Event;
use derive_visitor::Visitor;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;

/// Identity of a node, unique within the program it was built for.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub struct NodeId(pub u32);

// Syntax is shared behind an Arc: clones are shallow and nodes are Send + Sync.
pub struct Node<S: Drive> {
  pub id: NodeId,
  pub loc: Loc,
  pub stx: Arc<S>,
}

impl<S: Drive> Node<S> {
  pub fn new(id: NodeId, loc: Loc, stx: S) -> Node<S> {
    Node {
      id,
      loc,
      stx: Arc::new(stx),
    }
  }

  /// Wraps the node inside another node with the same loc, with syntax derived from the provided callback.
  pub fn wrap<T: Drive, F: FnOnce(Node<S>) -> T>(self, id: NodeId, f: F) -> Node<T> {
    let loc = self.loc;
    Node::new(id, loc, f(self))
  }
}

impl<S: Drive> Clone for Node<S> {
  fn clone(&self) -> Self {
    Node {
      id: self.id,
      loc: self.loc,
      stx: Arc::clone(&self.stx),
    }
  }
}

// Visitors see the Node itself (so they can match `Node<T>` types) before and after its syntax.
impl<S: Drive> Drive for Node<S> {
  fn drive<V: Visitor>(&self, visitor: &mut V) {
    visitor.visit(self, Event::Enter);
    self.stx.drive(visitor);
    visitor.visit(self, Event::Exit);
  }
}

impl<S: Debug + Drive> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}

impl<S: Serialize + Drive> Serialize for Node<S> {
  fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
    self.stx.as_ref().serialize(serializer)
  }
}
