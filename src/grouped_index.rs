// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Grouped index vectors: compressed mappings from a flat sequence of elements
//! to an ordered partition of groups.
//!
//! Every group owns a contiguous, possibly empty, half-open range of element
//! positions, and groups appear in element order.  Two representations are
//! provided:
//!
//! - [`SparseGroupIndex`] stores an index pointer array `ptr` of length
//!   `groups + 1`; group `g` owns `ptr[g]..ptr[g + 1]`.  For example
//!   `[0, 3, 6, 7]` describes `[[0, 1, 2], [3, 4, 5], [6]]`.
//! - [`DenseGroupIndex`] stores the owning group of every element.  For
//!   example `[0, 1, 1, 4]` with five groups describes
//!   `[[0], [1, 2], [], [], [3]]`.
//!
//! Both implement [`GroupedIndex`], and are statically dispatched, since
//! `group_of` is called once per element during topology traversal.

mod dense;
mod sparse;

pub use dense::{DenseGroupIndex, DenseGroups};
pub use sparse::{SparseGroupIndex, SparseGroups};

use std::ops::Range;

/// The contract shared by the sparse and dense grouped index vectors.
pub trait GroupedIndex {
    /// Iterator over the element ranges of all groups, in group order.
    type Groups<'a>: DoubleEndedIterator<Item = Range<usize>> + ExactSizeIterator + Clone
    where
        Self: 'a;

    /// Returns the number of groups.
    fn size(&self) -> usize;

    /// Returns the total number of elements across all groups.
    fn element_count(&self) -> usize;

    /// Returns an iterator over the element ranges of all groups.
    ///
    /// The structure is immutable, so iterating again reproduces the same
    /// ranges.
    fn groups(&self) -> Self::Groups<'_>;

    /// Returns the element range owned by `group`.
    ///
    /// # Panics
    ///
    /// If `group` is not smaller than [`size`][GroupedIndex::size].
    fn element_range(&self, group: usize) -> Range<usize>;

    /// Returns the group that owns `element`.
    ///
    /// # Panics
    ///
    /// If `element` is not smaller than
    /// [`element_count`][GroupedIndex::element_count].
    fn group_of(&self, element: usize) -> usize;
}

/// Iterates two grouped index vectors with the same number of groups in
/// lock-step, yielding the element ranges of each group as a pair.
///
/// # Panics
///
/// If the two vectors don't have the same number of groups.
pub fn zip_groups<'a, A, B>(
    first: &'a A,
    second: &'a B,
) -> std::iter::Zip<A::Groups<'a>, B::Groups<'a>>
where
    A: GroupedIndex,
    B: GroupedIndex,
{
    assert_eq!(
        first.size(),
        second.size(),
        "Grouped index vectors with different group counts can't be zipped."
    );
    first.groups().zip(second.groups())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_groups() {
        let branches_per_node = SparseGroupIndex::new(vec![0, 2, 2, 3]);
        let sensors_per_node = DenseGroupIndex::new(vec![1, 1, 2, 2], 3);

        let zipped = zip_groups(&branches_per_node, &sensors_per_node).collect::<Vec<_>>();
        assert_eq!(zipped, vec![(0..2, 0..0), (2..2, 0..2), (2..3, 2..4)]);

        // zipping is symmetric and restartable.
        let reversed = zip_groups(&sensors_per_node, &branches_per_node)
            .map(|(a, b)| (b, a))
            .collect::<Vec<_>>();
        assert_eq!(reversed, zipped);
    }

    #[test]
    fn test_zip_empty_groups() {
        let first = SparseGroupIndex::new(vec![]);
        let second = DenseGroupIndex::new(vec![], 0);
        assert_eq!(zip_groups(&first, &second).count(), 0);
    }

    #[test]
    #[should_panic(expected = "different group counts")]
    fn test_zip_mismatched_sizes() {
        let first = SparseGroupIndex::new(vec![0, 1, 2]);
        let second = DenseGroupIndex::new(vec![0, 1, 2], 3);
        let _ = zip_groups(&first, &second);
    }

    /// Both representations of the same partition must behave identically.
    #[test]
    fn test_sparse_and_dense_agree() {
        let sparse = SparseGroupIndex::new(vec![0, 0, 3, 3, 4, 6, 6]);
        let dense = DenseGroupIndex::new(vec![1, 1, 1, 3, 4, 4], 6);

        assert_eq!(sparse.size(), dense.size());
        assert_eq!(sparse.element_count(), dense.element_count());
        assert!(sparse.groups().eq(dense.groups()));
        assert!(sparse.groups().rev().eq(dense.groups().rev()));
        for group in 0..sparse.size() {
            assert_eq!(sparse.element_range(group), dense.element_range(group));
        }
        for element in 0..sparse.element_count() {
            assert_eq!(sparse.group_of(element), dense.group_of(element));
        }
    }
}
