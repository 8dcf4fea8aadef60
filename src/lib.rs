//! # lambars-persistent
//!
//! Persistent (immutable) collections with structural sharing.
//!
//! ## Overview
//!
//! Every update returns a new version of the collection and leaves the old
//! one untouched. Unchanged parts are shared between versions by reference
//! counting, so keeping many versions alive is cheap.
//!
//! - **`PersistentHashMap`**: Hash Array Mapped Trie keyed by `Hash + Eq`
//! - **`PersistentTreeSet`**: weight-balanced binary search tree ordered by `Ord`
//! - **Type Classes**: `Foldable` and `Functor` over both collections
//!
//! ## Feature Flags
//!
//! - `typeclass`: Type class traits (`Functor`, `Foldable`)
//! - `persistent`: Persistent data structures
//! - `arc`: Use `Arc` instead of `Rc` so collections are `Send + Sync`
//! - `fxhash` / `ahash`: Alternative key hashers for the map
//! - `log`: Emit `trace` events on structural transitions
//! - `full`: Enable all features except `arc`
//!
//! ## Example
//!
//! ```rust
//! use lambars_persistent::prelude::*;
//!
//! let scores = PersistentHashMap::new()
//!     .insert("alice", 3)
//!     .insert("bob", 5);
//! let total = scores.clone().fold_left(0, |sum, score| sum + score);
//! assert_eq!(total, 8);
//!
//! let ids: PersistentTreeSet<u32> = [7, 2, 9].into_iter().collect();
//! assert_eq!(ids.first(), Some(&2));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the type classes and collections.
///
/// # Usage
///
/// ```rust
/// use lambars_persistent::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "typeclass")]
    pub use crate::typeclass::*;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;
}

#[cfg(feature = "typeclass")]
pub mod typeclass;

#[cfg(feature = "persistent")]
pub mod persistent;
