//! Error types for the persistent collections.
//!
//! Absence is normally represented with `Option`. The only operation that
//! reports it as an error is the forced lookup, [`PersistentHashMap::lookup`].
//!
//! [`PersistentHashMap::lookup`]: super::PersistentHashMap::lookup

/// Represents a forced lookup of a key that is not present.
///
/// # Examples
///
/// ```rust
/// use lambars_persistent::persistent::KeyNotFoundError;
///
/// let error = KeyNotFoundError {
///     collection_name: "PersistentHashMap",
///     method_name: "lookup",
/// };
/// assert_eq!(
///     format!("{}", error),
///     "PersistentHashMap::lookup: key not present"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFoundError {
    /// The name of the collection that was queried.
    pub collection_name: &'static str,
    /// The name of the method that required the key.
    pub method_name: &'static str,
}

impl std::fmt::Display for KeyNotFoundError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}::{}: key not present",
            self.collection_name, self.method_name
        )
    }
}

impl std::error::Error for KeyNotFoundError {}
