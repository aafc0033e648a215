// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The index pointer representation of a grouped index vector.

use std::ops::Range;

use super::GroupedIndex;

/// A grouped index vector backed by an index pointer array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseGroupIndex {
    indptr: Vec<usize>,
}

impl Default for SparseGroupIndex {
    fn default() -> Self {
        Self { indptr: vec![0] }
    }
}

impl SparseGroupIndex {
    /// Creates a new `SparseGroupIndex` from an index pointer array.
    ///
    /// An empty array is treated as `[0]`, i.e. zero groups.  The array must
    /// be non-decreasing.
    pub fn new(indptr: Vec<usize>) -> Self {
        if indptr.is_empty() {
            return Self::default();
        }
        debug_assert!(
            indptr.windows(2).all(|w| w[0] <= w[1]),
            "Index pointers must be non-decreasing."
        );
        Self { indptr }
    }

    /// Creates a new `SparseGroupIndex` from the number of elements in each
    /// group.
    pub fn from_counts(counts: impl IntoIterator<Item = usize>) -> Self {
        let mut indptr = vec![0];
        let mut total = 0;
        for count in counts {
            total += count;
            indptr.push(total);
        }
        Self { indptr }
    }

    /// Returns the underlying index pointer array.
    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }
}

impl GroupedIndex for SparseGroupIndex {
    type Groups<'a> = SparseGroups<'a>;

    fn size(&self) -> usize {
        self.indptr.len() - 1
    }

    fn element_count(&self) -> usize {
        self.indptr[self.indptr.len() - 1]
    }

    fn groups(&self) -> SparseGroups<'_> {
        SparseGroups {
            indptr: &self.indptr,
            front: 0,
            back: self.size(),
        }
    }

    fn element_range(&self, group: usize) -> Range<usize> {
        self.indptr[group]..self.indptr[group + 1]
    }

    /// Binary search over the index pointers, O(log groups).
    fn group_of(&self, element: usize) -> usize {
        assert!(
            element < self.element_count(),
            "Element {element} out of range for {} elements.",
            self.element_count()
        );
        // the last group whose start is not after `element`.  Empty groups
        // sharing that start come before it, so they are skipped.
        self.indptr.partition_point(|&start| start <= element) - 1
    }
}

/// An iterator over the element ranges of a [`SparseGroupIndex`].
#[derive(Clone, Debug)]
pub struct SparseGroups<'a> {
    indptr: &'a [usize],
    front: usize,
    back: usize,
}

impl Iterator for SparseGroups<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let group = self.front;
        self.front += 1;
        Some(self.indptr[group]..self.indptr[group + 1])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for SparseGroups<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.indptr[self.back]..self.indptr[self.back + 1])
    }

    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl ExactSizeIterator for SparseGroups<'_> {}
