//! Type class traits used by the persistent collections.
//!
//! - [`TypeConstructor`]: Higher-kinded type emulation via GATs
//! - [`Foldable`]: Folding over structures to produce summary values
//! - [`Functor`]: Mapping over container values
//!
//! `PersistentHashMap<K, _>` is a `Functor` and `Foldable` over its values.
//! `PersistentTreeSet` is only `Foldable`, because mapping a set needs an
//! `Ord` bound on the result type that `Functor` cannot express.

mod foldable;
mod functor;
mod higher;

pub use foldable::Foldable;
pub use functor::Functor;
pub use higher::TypeConstructor;
