use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a transport entry that may be switched off.
///
/// `null` and `false` yield `None`; `true` is rejected since it carries no
/// settings.
pub fn enabled<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Bool(true) => Err(D::Error::custom(
            "transport must be a settings object or false",
        )),
        other => T::deserialize(other).map(Some).map_err(D::Error::custom),
    }
}

pub fn default_true() -> bool {
    true
}
