pub mod build;
pub mod expr;
pub mod func;
pub mod node;
pub mod pat;
pub mod stmt;
