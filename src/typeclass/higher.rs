//! Higher-Kinded Type emulation through Generic Associated Types.
//!
//! Rust has no native higher-kinded types, so a container such as
//! `PersistentHashMap<K, _>` cannot be named without its value type.
//! [`TypeConstructor`] recovers that ability with a GAT: `WithType<B>`
//! is "the same container, holding `B` instead".
//!
//! # Example
//!
//! ```rust
//! use lambars_persistent::typeclass::TypeConstructor;
//!
//! fn rewrap<T: TypeConstructor>(_value: T) -> T::WithType<String>
//! where
//!     T::WithType<String>: Default,
//! {
//!     Default::default()
//! }
//!
//! let none: Option<String> = rewrap(Some(42));
//! assert_eq!(none, None);
//! ```

/// A type constructor applied to some inner type.
///
/// # Laws
///
/// `<F as TypeConstructor>::WithType<F::Inner>` is `F` itself.
pub trait TypeConstructor {
    /// The type the constructor is currently applied to.
    type Inner;

    /// The same constructor applied to `B`.
    type WithType<B>: TypeConstructor<Inner = B>;
}

impl<A> TypeConstructor for Option<A> {
    type Inner = A;
    type WithType<B> = Option<B>;
}

impl<T> TypeConstructor for Vec<T> {
    type Inner = T;
    type WithType<B> = Vec<B>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn option_inner_type_is_correct() {
        fn assert_inner<T: TypeConstructor<Inner = i32>>() {}
        assert_inner::<Option<i32>>();
    }

    #[rstest]
    fn vec_with_type_produces_correct_type() {
        fn transform<T: TypeConstructor>(_value: T) -> T::WithType<char>
        where
            T::WithType<char>: Default,
        {
            Default::default()
        }

        let result: Vec<char> = transform(vec![1, 2, 3]);
        assert!(result.is_empty());
    }
}
