//! Serde helper for partial-update payloads.

use serde::{Deserialize, Deserializer};

/// Deserializes a field that distinguishes "absent" from "null".
///
/// Combine with `#[serde(default)]`:
///
/// - field missing → `None`
/// - field is `null` → `Some(None)`
/// - field has a value → `Some(Some(value))`
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use taskboard_shared::models::nullable;
///
/// #[derive(Deserialize)]
/// struct Body {
///     #[serde(default, deserialize_with = "nullable::deserialize")]
///     note: Option<Option<String>>,
/// }
///
/// let absent: Body = serde_json::from_str("{}").unwrap();
/// assert_eq!(absent.note, None);
///
/// let cleared: Body = serde_json::from_str(r#"{"note": null}"#).unwrap();
/// assert_eq!(cleared.note, Some(None));
/// ```
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
