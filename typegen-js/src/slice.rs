use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

// `[start..end]` or `[start...end]`, each bound an integer or a `$param`.
static SLICE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\[(\$(\w+)|\d+)\.\.\.?(\$(\w+)|\d+)\]").expect("slice pattern is valid"));

/// Names of parameters used as array slice bounds in `query`, deduplicated in order of first appearance.
///
/// This is a shallow textual scan: parameters anywhere else in the query are not reported. Calling again restarts the scan.
pub fn extract_slice_parameters(query: &str) -> impl Iterator<Item = String> + '_ {
  SLICE
    .captures_iter(query)
    .flat_map(|caps| [caps.get(2), caps.get(4)])
    .flatten()
    .map(|m| m.as_str().to_string())
    .unique()
}
