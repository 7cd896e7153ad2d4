use crate::error::Result;

/// Persistent string key-value storage shared by the session store and
/// playback positions.
///
/// Methods take `&self`; implementations guard their own state so a single
/// store can be shared behind an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key.
    fn clear(&self) -> Result<()>;

    /// Returns true when nothing is stored.
    fn is_empty(&self) -> bool;
}
