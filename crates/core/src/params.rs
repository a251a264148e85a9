//! Pure helper functions for extracting typed parameters from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value is not the expected type, the default is returned.
//! Range checks happen later, in the config's own validation.

use glam::DVec3;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a vector from `params[name]`.
///
/// Accepts a three-element numeric array `[x, y, z]` or a single number,
/// which is splatted to all three axes. Anything else yields `default`.
pub fn param_vec3(params: &Value, name: &str, default: DVec3) -> DVec3 {
    match params.get(name) {
        Some(Value::Array(items)) if items.len() == 3 => {
            let xyz: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
            xyz.map(|v| DVec3::new(v[0], v[1], v[2]))
                .unwrap_or(default)
        }
        Some(v) => v.as_f64().map(DVec3::splat).unwrap_or(default),
        None => default,
    }
}
