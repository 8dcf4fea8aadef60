//! Functor type class - mapping over container values.
//!
//! A `Functor` applies a function to every element while keeping the shape
//! of the container. Persistent collections map every element, so the
//! function is `FnMut` rather than `FnOnce`.
//!
//! # Laws
//!
//! ```text
//! fa.fmap(|x| x) == fa
//! fa.fmap(f).fmap(g) == fa.fmap(|x| g(f(x)))
//! ```
//!
//! # Examples
//!
//! ```rust
//! use lambars_persistent::typeclass::Functor;
//!
//! let doubled: Vec<i32> = vec![1, 2, 3].fmap(|n| n * 2);
//! assert_eq!(doubled, vec![2, 4, 6]);
//! ```

use super::higher::TypeConstructor;

/// A type class for types that can have a function mapped over their contents.
pub trait Functor: TypeConstructor {
    /// Applies `function` to each element, consuming the container.
    fn fmap<B, F>(self, function: F) -> Self::WithType<B>
    where
        F: FnMut(Self::Inner) -> B;

    /// Applies `function` to a reference of each element.
    fn fmap_ref<B, F>(&self, function: F) -> Self::WithType<B>
    where
        F: FnMut(&Self::Inner) -> B;
}

impl<A> Functor for Option<A> {
    #[inline]
    fn fmap<B, F>(self, function: F) -> Option<B>
    where
        F: FnMut(A) -> B,
    {
        self.map(function)
    }

    #[inline]
    fn fmap_ref<B, F>(&self, function: F) -> Option<B>
    where
        F: FnMut(&A) -> B,
    {
        self.as_ref().map(function)
    }
}

impl<T> Functor for Vec<T> {
    #[inline]
    fn fmap<B, F>(self, function: F) -> Vec<B>
    where
        F: FnMut(T) -> B,
    {
        self.into_iter().map(function).collect()
    }

    #[inline]
    fn fmap_ref<B, F>(&self, function: F) -> Vec<B>
    where
        F: FnMut(&T) -> B,
    {
        self.iter().map(function).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn option_fmap_preserves_none() {
        let none: Option<i32> = None;
        assert_eq!(none.fmap(|n| n.to_string()), None);
    }

    #[rstest]
    fn vec_fmap_ref_keeps_original() {
        let words = vec!["a".to_string(), "bcd".to_string()];
        let lengths = words.fmap_ref(String::len);
        assert_eq!(lengths, vec![1, 3]);
        assert_eq!(words.len(), 2);
    }

    #[rstest]
    fn composition_law_holds_for_vec() {
        let values = vec![1, 2, 3];
        let composed = values.clone().fmap(|n| (n + 1) * 10);
        let sequenced = values.fmap(|n| n + 1).fmap(|n| n * 10);
        assert_eq!(composed, sequenced);
    }
}
