pub mod analysis;
pub mod document;
pub mod tender;

pub use analysis::*;
pub use document::*;
pub use tender::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that the backend may send as `null`, falling back to
/// the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
