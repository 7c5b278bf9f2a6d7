//! Forgiving deserializers for style attributes.
//!
//! A hand-edited layout with one odd style value must still load. Values of
//! the wrong shape are read as absent, so the resolver's default applies.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A string attribute. Numbers are kept in their decimal form.
pub(crate) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            log::debug!("ignoring style value {}", other);
            None
        }
    })
}

/// A finite number, also accepted as a numeric string.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let parsed = parsed.filter(|v| v.is_finite());
    if parsed.is_none() {
        if let Some(v) = value.filter(|v| !v.is_null()) {
            log::debug!("ignoring numeric style value {}", v);
        }
    }
    Ok(parsed)
}

/// A unit enum such as `TextAlign`. Names match case-insensitively; unknown
/// names read as absent.
pub(crate) fn variant<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let name = s.trim().to_ascii_lowercase();
            let parsed = serde_json::from_value(Value::String(name)).ok();
            if parsed.is_none() {
                log::debug!("ignoring unknown style keyword {:?}", s);
            }
            parsed
        }
        Some(other) => {
            log::debug!("ignoring style value {}", other);
            None
        }
    })
}
