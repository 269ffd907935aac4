use crate::error::HostError;
use ahash::AHashMap;
use parking_lot::RwLock;
use scope_js::module::ModuleId;
use scope_js::module::Program;

/// Environment that turns import specifiers into loaded programs.
///
/// Calls may block (e.g. to read and parse a file). Repeat loads of the same module within one resolution are cached by the caller; deduplicating across resolutions is up to the host.
pub trait ModuleHost: Send + Sync {
  /// Resolve `specifier` as imported from `importer`.
  fn resolve(&self, specifier: &str, importer: &ModuleId) -> Result<ModuleId, HostError>;
  /// Load and parse a module previously returned by `resolve`.
  fn load(&self, module: &ModuleId) -> Result<Program, HostError>;
}

const RESOLVE_SUFFIXES: &[&str] = &["", ".ts", ".tsx", ".js", ".jsx", ".mjs", "/index.ts", "/index.tsx", "/index.js"];

/// In-memory host keyed by absolute `/`-separated paths.
///
/// Relative specifiers are joined onto the importer's directory and tried with common extensions; bare specifiers must be registered under their exact name.
#[derive(Default)]
pub struct MemoryHost {
  modules: RwLock<AHashMap<ModuleId, Program>>,
}

impl MemoryHost {
  pub fn new() -> MemoryHost {
    MemoryHost::default()
  }

  pub fn insert(&self, id: impl Into<String>, program: Program) {
    self.modules.write().insert(ModuleId::new(id), program);
  }

  pub fn contains(&self, id: &str) -> bool {
    self.modules.read().contains_key(&ModuleId::new(id))
  }
}

impl ModuleHost for MemoryHost {
  fn resolve(&self, specifier: &str, importer: &ModuleId) -> Result<ModuleId, HostError> {
    let base = if specifier.starts_with("./") || specifier.starts_with("../") {
      join_relative(importer.as_str(), specifier)
    } else {
      specifier.to_string()
    };
    RESOLVE_SUFFIXES
      .iter()
      .map(|suffix| format!("{base}{suffix}"))
      .find(|candidate| self.contains(candidate))
      .map(ModuleId)
      .ok_or_else(|| HostError::new(format!("Cannot find module \"{specifier}\" from {importer}")))
  }

  fn load(&self, module: &ModuleId) -> Result<Program, HostError> {
    self
      .modules
      .read()
      .get(module)
      .cloned()
      .ok_or_else(|| HostError::new(format!("missing module {module}")))
  }
}

/// Joins `specifier` onto the directory containing `importer`, normalizing `.` and `..` segments.
pub fn join_relative(importer: &str, specifier: &str) -> String {
  let mut segments: Vec<&str> = importer.split('/').collect();
  // Drop the importer's file name.
  segments.pop();
  for part in specifier.split('/') {
    match part {
      "" | "." => {}
      ".." => {
        // Never pop the leading empty segment of an absolute path.
        if segments.len() > 1 {
          segments.pop();
        }
      }
      _ => segments.push(part),
    }
  }
  segments.join("/")
}

#[cfg(test)]
mod tests {
  use super::join_relative;
  use super::MemoryHost;
  use super::ModuleHost;
  use scope_js::ast::build::AstBuilder;
  use scope_js::module::ModuleId;
  use scope_js::module::Program;

  #[test]
  fn test_join_relative() {
    assert_eq!(join_relative("/src/app/page.ts", "./queries"), "/src/app/queries");
    assert_eq!(join_relative("/src/app/page.ts", "../lib/q.ts"), "/src/lib/q.ts");
    assert_eq!(join_relative("/page.ts", "../../x"), "/x");
  }

  #[test]
  fn test_resolve_tries_extensions() {
    let b = AstBuilder::new();
    let host = MemoryHost::new();
    host.insert("/src/queries.ts", Program::synthetic(b.top_level(Vec::new())));
    host.insert("/src/lib/index.js", Program::synthetic(b.top_level(Vec::new())));
    let importer = ModuleId::new("/src/page.tsx");
    assert_eq!(host.resolve("./queries", &importer).unwrap().as_str(), "/src/queries.ts");
    assert_eq!(host.resolve("./lib", &importer).unwrap().as_str(), "/src/lib/index.js");
    let err = host.resolve("./missing", &importer).unwrap_err();
    assert!(err.message().contains("./missing"));
    assert!(host.load(&ModuleId::new("/src/queries.ts")).is_ok());
  }
}
