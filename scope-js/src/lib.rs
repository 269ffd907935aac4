//! AST and lexical scope model for JavaScript/TypeScript modules.
//!
//! A front end builds the syntax tree (see [`ast::build::AstBuilder`]) and wraps it
//! in a [`module::Program`]; [`module::Module::new`] then computes the scope tree
//! with [`bind::bind`]. Every node carries a [`ast::node::NodeId`] that is unique
//! within its program, which together with a [`module::ModuleId`] gives a stable
//! identity for analyses that need to detect revisiting a node.
pub mod ast;
pub mod bind;
pub mod loc;
pub mod module;
pub mod num;
pub mod scope;
