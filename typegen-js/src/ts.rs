//! A small TypeScript type AST and its printer.
//!
//! Only the constructs the generators emit are modelled. Printing follows the layout of common TypeScript code generators: two-space indentation, one member per line, `;` after every member and declaration.
use scope_js::num::JsNumber;
use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TsKeyword {
  String,
  Number,
  Boolean,
  Null,
  Unknown,
  Never,
  UniqueSymbol,
}

impl TsKeyword {
  fn as_str(self) -> &'static str {
    match self {
      TsKeyword::String => "string",
      TsKeyword::Number => "number",
      TsKeyword::Boolean => "boolean",
      TsKeyword::Null => "null",
      TsKeyword::Unknown => "unknown",
      TsKeyword::Never => "never",
      TsKeyword::UniqueSymbol => "unique symbol",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "$t")]
pub enum TsType {
  Keyword { keyword: TsKeyword },
  StringLit { value: String },
  NumberLit { value: JsNumber },
  BooleanLit { value: bool },
  Reference { name: String, args: Vec<TsType> },
  Union { types: Vec<TsType> },
  Intersection { types: Vec<TsType> },
  Literal { members: Vec<TsProperty> },
  /// A type followed by a block comment.
  Annotated { ty: Box<TsType>, comment: String },
}

impl TsType {
  pub fn keyword(keyword: TsKeyword) -> TsType {
    TsType::Keyword { keyword }
  }

  pub fn unknown() -> TsType {
    TsType::keyword(TsKeyword::Unknown)
  }

  pub fn never() -> TsType {
    TsType::keyword(TsKeyword::Never)
  }

  pub fn string_lit(value: impl Into<String>) -> TsType {
    TsType::StringLit { value: value.into() }
  }

  pub fn reference(name: impl Into<String>) -> TsType {
    TsType::Reference {
      name: name.into(),
      args: Vec::new(),
    }
  }

  pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> TsType {
    TsType::Reference {
      name: name.into(),
      args,
    }
  }

  pub fn union(types: Vec<TsType>) -> TsType {
    TsType::Union { types }
  }

  /// `unknown`, possibly with a comment attached.
  pub fn is_unknown(&self) -> bool {
    match self {
      TsType::Keyword { keyword } => *keyword == TsKeyword::Unknown,
      TsType::Annotated { ty, .. } => ty.is_unknown(),
      _ => false,
    }
  }

  fn needs_parens_in_intersection(&self) -> bool {
    matches!(self, TsType::Union { .. })
  }

  fn print(&self, out: &mut String, indent: usize) {
    match self {
      TsType::Keyword { keyword } => out.push_str(keyword.as_str()),
      TsType::StringLit { value } => out.push_str(&quote(value)),
      TsType::NumberLit { value } => write!(out, "{value}").expect("writing to a String cannot fail"),
      TsType::BooleanLit { value } => write!(out, "{value}").expect("writing to a String cannot fail"),
      TsType::Reference { name, args } => {
        out.push_str(name);
        if !args.is_empty() {
          out.push('<');
          for (i, arg) in args.iter().enumerate() {
            if i > 0 {
              out.push_str(", ");
            }
            arg.print(out, indent);
          }
          out.push('>');
        }
      }
      TsType::Union { types } => {
        for (i, ty) in types.iter().enumerate() {
          if i > 0 {
            out.push_str(" | ");
          }
          ty.print(out, indent);
        }
      }
      TsType::Intersection { types } => {
        for (i, ty) in types.iter().enumerate() {
          if i > 0 {
            out.push_str(" & ");
          }
          if ty.needs_parens_in_intersection() {
            out.push('(');
            ty.print(out, indent);
            out.push(')');
          } else {
            ty.print(out, indent);
          }
        }
      }
      TsType::Literal { members } => print_members(members, out, indent),
      TsType::Annotated { ty, comment } => {
        ty.print(out, indent);
        write!(out, " /*{comment}*/").expect("writing to a String cannot fail");
      }
    }
  }
}

impl Display for TsType {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let mut out = String::new();
    self.print(&mut out, 0);
    f.write_str(&out)
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "$t")]
pub enum PropertyKey {
  Identifier { name: String },
  String { value: String },
  /// `[name]`, e.g. a unique symbol.
  Computed { name: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TsProperty {
  pub key: PropertyKey,
  pub optional: bool,
  pub ty: TsType,
}

impl TsProperty {
  fn print(&self, out: &mut String, indent: usize) {
    match &self.key {
      PropertyKey::Identifier { name } => out.push_str(name),
      PropertyKey::String { value } => out.push_str(&quote(value)),
      PropertyKey::Computed { name } => write!(out, "[{name}]").expect("writing to a String cannot fail"),
    };
    if self.optional {
      out.push('?');
    }
    out.push_str(": ");
    self.ty.print(out, indent);
    out.push(';');
  }
}

fn print_members(members: &[TsProperty], out: &mut String, indent: usize) {
  if members.is_empty() {
    out.push_str("{}");
    return;
  }
  out.push_str("{\n");
  for member in members.iter() {
    push_indent(out, indent + 1);
    member.print(out, indent + 1);
    out.push('\n');
  }
  push_indent(out, indent);
  out.push('}');
}

fn push_indent(out: &mut String, level: usize) {
  for _ in 0..level {
    out.push_str("  ");
  }
}

/// A double-quoted string literal with JSON escapes, which are also valid in TypeScript.
fn quote(value: &str) -> String {
  serde_json::to_string(value).expect("strings always serialize")
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TsInterface {
  pub name: String,
  pub members: Vec<TsProperty>,
}

/// A top-level statement of the generated file.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "$t")]
pub enum TsDecl {
  /// `import type { names } from "module";`
  ImportType {
    names: Vec<String>,
    module: String,
    comments: Vec<String>,
  },
  /// `export declare const name: ty;`
  DeclareConst {
    name: String,
    ty: TsType,
    comments: Vec<String>,
  },
  /// `export type name<params> = ty;`
  TypeAlias {
    name: String,
    params: Vec<String>,
    ty: TsType,
    exported: bool,
    comments: Vec<String>,
  },
  /// `declare module "module" { interface ... }`
  DeclareModule {
    module: String,
    interface: TsInterface,
    comments: Vec<String>,
  },
}

impl TsDecl {
  pub fn type_alias(name: impl Into<String>, ty: TsType) -> TsDecl {
    TsDecl::TypeAlias {
      name: name.into(),
      params: Vec::new(),
      ty,
      exported: true,
      comments: Vec::new(),
    }
  }

  /// Adds `// <comment>` lines above the declaration. Comments are written verbatim after `//`.
  pub fn with_comments(mut self, lines: Vec<String>) -> TsDecl {
    match &mut self {
      TsDecl::ImportType { comments, .. }
      | TsDecl::DeclareConst { comments, .. }
      | TsDecl::TypeAlias { comments, .. }
      | TsDecl::DeclareModule { comments, .. } => comments.extend(lines),
    };
    self
  }

  pub fn comments(&self) -> &[String] {
    match self {
      TsDecl::ImportType { comments, .. }
      | TsDecl::DeclareConst { comments, .. }
      | TsDecl::TypeAlias { comments, .. }
      | TsDecl::DeclareModule { comments, .. } => comments,
    }
  }
}

impl Display for TsDecl {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let mut out = String::new();
    for comment in self.comments() {
      writeln!(out, "//{comment}")?;
    }
    match self {
      TsDecl::ImportType { names, module, .. } => {
        write!(out, "import type {{ {} }} from {};", names.join(", "), quote(module))?;
      }
      TsDecl::DeclareConst { name, ty, .. } => {
        write!(out, "export declare const {name}: ")?;
        ty.print(&mut out, 0);
        out.push(';');
      }
      TsDecl::TypeAlias {
        name,
        params,
        ty,
        exported,
        ..
      } => {
        if *exported {
          out.push_str("export ");
        }
        write!(out, "type {name}")?;
        if !params.is_empty() {
          write!(out, "<{}>", params.join(", "))?;
        }
        out.push_str(" = ");
        ty.print(&mut out, 0);
        out.push(';');
      }
      TsDecl::DeclareModule { module, interface, .. } => {
        writeln!(out, "declare module {} {{", quote(module))?;
        write!(out, "  interface {} ", interface.name)?;
        print_members(&interface.members, &mut out, 1);
        out.push_str("\n}");
      }
    };
    f.write_str(&out)
  }
}
