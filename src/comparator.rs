//! Ordering policies for [`AVLTreeMap`](crate::AVLTreeMap).
//!
//! The map is ordered by any [`Compare`] implementation. Besides the comparators
//! from the `compare` crate ([`natural`](compare::natural), `.rev()`, `.borrowing()`,
//! closures returning [`Ordering`]) this module adapts a plain strict-weak-ordering
//! predicate into a comparator.
//!
//! Two keys `a` and `b` are *equivalent* when neither orders before the other.
//!
//! ```
//! use wabi_avl::AVLTreeMap;
//! use wabi_avl::comparator::less_by;
//!
//! // Case-insensitive keys: "Apple" and "apple" are equivalent.
//! let mut map = AVLTreeMap::with_cmp(less_by(|a: &&str, b: &&str| {
//!     a.to_ascii_lowercase() < b.to_ascii_lowercase()
//! }));
//! assert!(map.insert("Apple", 1).1);
//! assert!(!map.insert("apple", 2).1);
//! assert_eq!(map.get(&"APPLE"), Some(&1));
//! ```

use core::cmp::Ordering;
use core::fmt;

pub use compare::{Compare, Natural, natural};

/// Comparator built from a "less than" predicate.
///
/// Yields [`Ordering::Less`] when `less(a, b)`, [`Ordering::Greater`] when
/// `less(b, a)`, and [`Ordering::Equal`] otherwise. The predicate must be a strict
/// weak ordering; the map's behavior is unspecified otherwise.
#[derive(Clone, Copy, Default)]
pub struct Less<F>(F);

impl<F> Less<F> {
    /// Wraps `less` as a comparator.
    pub const fn new(less: F) -> Self {
        Less(less)
    }
}

impl<F> fmt::Debug for Less<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Less")
    }
}

impl<T: ?Sized, F> Compare<T> for Less<F>
where
    F: Fn(&T, &T) -> bool,
{
    fn compare(&self, l: &T, r: &T) -> Ordering {
        if (self.0)(l, r) {
            Ordering::Less
        } else if (self.0)(r, l) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Returns a comparator ordering keys by the predicate `less`.
///
/// # Examples
///
/// ```
/// use wabi_avl::AVLTreeMap;
/// use wabi_avl::comparator::less_by;
///
/// let mut map = AVLTreeMap::with_cmp(less_by(|a: &i32, b: &i32| a > b));
/// map.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
pub const fn less_by<F>(less: F) -> Less<F> {
    Less::new(less)
}

/// Returns true if neither `a` nor `b` orders before the other under `cmp`.
pub fn equivalent<T, C>(cmp: &C, a: &T, b: &T) -> bool
where
    T: ?Sized,
    C: Compare<T> + ?Sized,
{
    cmp.compare(a, b) == Ordering::Equal
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn less_maps_predicate_to_ordering() {
        let cmp = less_by(|a: &i32, b: &i32| a < b);
        assert_eq!(cmp.compare(&1, &2), Ordering::Less);
        assert_eq!(cmp.compare(&2, &1), Ordering::Greater);
        assert_eq!(cmp.compare(&2, &2), Ordering::Equal);
    }

    #[test]
    fn equivalence_is_mutual_non_ordering() {
        // Order by the value mod 10 only.
        let cmp = less_by(|a: &u32, b: &u32| a % 10 < b % 10);
        assert!(equivalent(&cmp, &3, &13));
        assert!(!equivalent(&cmp, &3, &4));
    }

    #[test]
    fn natural_and_reversed() {
        let cmp = natural::<i32>();
        assert!(equivalent(&cmp, &5, &5));
        assert_eq!(cmp.compare(&1, &2), Ordering::Less);
        assert_eq!(cmp.rev().compare(&1, &2), Ordering::Greater);
    }
}
