//! Lenient field decoders for upstream payloads
//!
//! Upstream senders emit `null` for numbers they do not know and for list
//! slots they could not fill. Neither may reject the surrounding message.

use serde::{Deserialize, Deserializer};

/// `null` decodes as `T::default()`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null` list elements are dropped; a `null` list stays `None`
pub(crate) fn skip_null_elements<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.map(|items| items.into_iter().flatten().collect()))
}
