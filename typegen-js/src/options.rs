use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// Settings for statically resolving query expressions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolveOptions {
  /// Budget for one top-level resolution, checked cooperatively.
  pub timeout_ms: u64,
  /// Most nested evaluation steps one top-level resolution may take before failing.
  pub max_depth: usize,
  /// Identifiers that mark a tagged template as a query.
  pub tag_allow_list: Vec<String>,
  /// Identity helpers whose first argument is the query.
  pub wrapper_allow_list: Vec<String>,
  /// Modules the wrapper helpers must be imported from.
  pub wrapper_sources: Vec<String>,
  /// Declarations with a leading comment containing this marker are skipped.
  pub ignore_marker: String,
}

impl Default for ResolveOptions {
  fn default() -> Self {
    ResolveOptions {
      timeout_ms: 100,
      max_depth: 1024,
      tag_allow_list: vec!["groq".to_string()],
      wrapper_allow_list: vec!["defineQuery".to_string()],
      wrapper_sources: vec!["groq".to_string(), "next-sanity".to_string()],
      ignore_marker: "@sanity-typegen-ignore".to_string(),
    }
  }
}

impl ResolveOptions {
  pub fn from_json(json: &str) -> Result<ResolveOptions, serde_json::Error> {
    serde_json::from_str(json)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }

  pub fn is_query_tag(&self, name: &str) -> bool {
    self.tag_allow_list.iter().any(|t| t == name)
  }

  pub fn is_wrapper(&self, name: &str) -> bool {
    self.wrapper_allow_list.iter().any(|w| w == name)
  }

  pub fn is_wrapper_source(&self, module: &str) -> bool {
    self.wrapper_sources.iter().any(|s| s == module)
  }
}

/// Settings for assembling the generated declarations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeGenOptions {
  /// Path of the schema file, shown in a `// Source:` comment on the default schema declaration.
  pub schema_path: Option<String>,
  /// Paths in comments are made relative to this directory when they are under it.
  pub root: Option<String>,
  /// Emit the query map inside `declare module "@sanity/client"`.
  pub overload_client_methods: bool,
  /// Emit the schema and query maps inside `declare module "groq"`.
  pub augment_groq_module: bool,
}

impl Default for TypeGenOptions {
  fn default() -> Self {
    TypeGenOptions {
      schema_path: None,
      root: None,
      overload_client_methods: true,
      augment_groq_module: true,
    }
  }
}

impl TypeGenOptions {
  pub fn from_json(json: &str) -> Result<TypeGenOptions, serde_json::Error> {
    serde_json::from_str(json)
  }
}
