use serde::{Deserialize, Deserializer};

/// Deserializes a field that peers may send as `null` (nil slices and maps
/// are encoded that way), falling back to the type's default.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
