use core::hash::Hash;
use core::hash::Hasher;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

// This provides Eq for f64, and formats the way `String(n)` does for the values that show up in source.
#[derive(Copy, Clone, Debug)]
pub struct JsNumber(pub f64);

impl Display for JsNumber {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    let v = self.0;
    if v.is_nan() {
      return f.write_str("NaN");
    };
    if v.is_infinite() {
      return f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
    };
    if v == 0.0 {
      // Includes -0.
      return f.write_str("0");
    };
    let abs = v.abs();
    if abs >= 1e21 || abs < 1e-6 {
      // Rust writes `1e21` and `1e-7`; JS writes `1e+21` and `1e-7`.
      let s = format!("{:e}", v);
      return match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{}e+{}", mantissa, exp),
        _ => f.write_str(&s),
      };
    };
    if v.fract() == 0.0 {
      return write!(f, "{}", v as i128);
    };
    write!(f, "{}", v)
  }
}

impl PartialEq for JsNumber {
  fn eq(&self, other: &Self) -> bool {
    if self.0.is_nan() {
      return other.0.is_nan();
    };
    self.0.eq(&other.0)
  }
}

impl Eq for JsNumber {}

impl Hash for JsNumber {
  fn hash<H: Hasher>(&self, state: &mut H) {
    if !self.0.is_nan() {
      self.0.to_bits().hash(state);
    };
  }
}

impl Serialize for JsNumber {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::JsNumber;

  #[test]
  fn test_formats_like_js() {
    assert_eq!(JsNumber(10.0).to_string(), "10");
    assert_eq!(JsNumber(-0.0).to_string(), "0");
    assert_eq!(JsNumber(1.5).to_string(), "1.5");
    assert_eq!(JsNumber(0.1).to_string(), "0.1");
    assert_eq!(JsNumber(f64::NAN).to_string(), "NaN");
    assert_eq!(JsNumber(f64::NEG_INFINITY).to_string(), "-Infinity");
    assert_eq!(JsNumber(1e21).to_string(), "1e+21");
    assert_eq!(JsNumber(1e-7).to_string(), "1e-7");
  }
}
