// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The element-to-group representation of a grouped index vector.

use std::ops::Range;

use super::GroupedIndex;

/// A grouped index vector that stores the owning group of every element.
///
/// The owner array must be sorted, so that the elements of a group are
/// contiguous.  Groups without elements, including leading and trailing ones,
/// are accounted for by the separate group count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DenseGroupIndex {
    owners: Vec<usize>,
    groups_size: usize,
}

impl DenseGroupIndex {
    /// Creates a new `DenseGroupIndex` from the owning group of each element
    /// and the total number of groups.
    pub fn new(owners: Vec<usize>, groups_size: usize) -> Self {
        debug_assert!(
            owners.windows(2).all(|w| w[0] <= w[1]),
            "Group owners must be sorted."
        );
        debug_assert!(
            owners.last().map_or(true, |&last| last < groups_size),
            "Group owners must be smaller than the number of groups."
        );
        Self {
            owners,
            groups_size,
        }
    }

    /// Returns the owning group of every element.
    pub fn owners(&self) -> &[usize] {
        &self.owners
    }
}

impl GroupedIndex for DenseGroupIndex {
    type Groups<'a> = DenseGroups<'a>;

    fn size(&self) -> usize {
        self.groups_size
    }

    fn element_count(&self) -> usize {
        self.owners.len()
    }

    fn groups(&self) -> DenseGroups<'_> {
        DenseGroups {
            owners: &self.owners,
            front_group: 0,
            front_pos: 0,
            back_group: self.groups_size,
            back_pos: self.owners.len(),
        }
    }

    fn element_range(&self, group: usize) -> Range<usize> {
        assert!(
            group < self.groups_size,
            "Group {group} out of range for {} groups.",
            self.groups_size
        );
        let start = self.owners.partition_point(|&owner| owner < group);
        let end = start + self.owners[start..].partition_point(|&owner| owner == group);
        start..end
    }

    /// Direct lookup, O(1).
    fn group_of(&self, element: usize) -> usize {
        assert!(
            element < self.owners.len(),
            "Element {element} out of range for {} elements.",
            self.owners.len()
        );
        self.owners[element]
    }
}

/// An iterator over the element ranges of a [`DenseGroupIndex`].
///
/// Each step extends the boundary left by the previous step in the direction
/// of travel, so a full traversal visits every element once.
#[derive(Clone, Debug)]
pub struct DenseGroups<'a> {
    owners: &'a [usize],
    // the next group from the front, and where its elements start.
    front_group: usize,
    front_pos: usize,
    // one past the next group from the back, and where its elements end.
    back_group: usize,
    back_pos: usize,
}

impl Iterator for DenseGroups<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front_group >= self.back_group {
            return None;
        }
        let group = self.front_group;
        let start = self.front_pos;
        let mut end = start;
        while end < self.back_pos && self.owners[end] == group {
            end += 1;
        }
        self.front_group += 1;
        self.front_pos = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back_group - self.front_group;
        (len, Some(len))
    }

    /// Skips groups with a binary search instead of scanning their elements.
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.len() {
            self.front_group = self.back_group;
            self.front_pos = self.back_pos;
            return None;
        }
        self.front_group += n;
        let group = self.front_group;
        self.front_pos += self.owners[self.front_pos..self.back_pos]
            .partition_point(|&owner| owner < group);
        self.next()
    }
}

impl DoubleEndedIterator for DenseGroups<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front_group >= self.back_group {
            return None;
        }
        self.back_group -= 1;
        let group = self.back_group;
        let end = self.back_pos;
        let mut start = end;
        while start > self.front_pos && self.owners[start - 1] == group {
            start -= 1;
        }
        self.back_pos = start;
        Some(start..end)
    }

    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.len() {
            self.back_group = self.front_group;
            self.back_pos = self.front_pos;
            return None;
        }
        self.back_group -= n;
        let group = self.back_group;
        self.back_pos = self.front_pos
            + self.owners[self.front_pos..self.back_pos].partition_point(|&owner| owner < group);
        self.next_back()
    }
}

impl ExactSizeIterator for DenseGroups<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_and_ranges() {
        let index = DenseGroupIndex::new(vec![0, 1, 1, 4], 5);
        assert_eq!(index.size(), 5);
        assert_eq!(index.element_count(), 4);
        assert!(index.groups().eq([0..1, 1..3, 3..3, 3..3, 3..4]));
        assert_eq!(index.groups().len(), 5);
    }

    #[test]
    fn test_leading_and_trailing_empty_groups() {
        let index = DenseGroupIndex::new(vec![2, 2, 3], 6);
        assert!(index.groups().eq([0..0, 0..0, 0..2, 2..3, 3..3, 3..3]));
        assert_eq!(index.element_range(0), 0..0);
        assert_eq!(index.element_range(2), 0..2);
        assert_eq!(index.element_range(5), 3..3);
    }

    #[test]
    fn test_empty_index() {
        let index = DenseGroupIndex::default();
        assert_eq!(index.size(), 0);
        assert_eq!(index.groups().next(), None);

        let no_elements = DenseGroupIndex::new(vec![], 3);
        assert!(no_elements.groups().eq([0..0, 0..0, 0..0]));
    }

    #[test]
    fn test_group_of() {
        let owners = vec![0, 0, 2, 3, 3, 3, 6];
        let index = DenseGroupIndex::new(owners.clone(), 8);
        for (element, owner) in owners.iter().enumerate() {
            assert_eq!(index.group_of(element), *owner);
            assert!(index.element_range(*owner).contains(&element));
        }
    }

    #[test]
    fn test_forward_and_backward_agree() {
        let index = DenseGroupIndex::new(vec![0, 0, 2, 3, 3, 3, 6], 8);
        let forward = index.groups().collect::<Vec<_>>();
        let mut backward = index.groups().rev().collect::<Vec<_>>();
        backward.reverse();
        assert_eq!(forward, backward);

        for (group, range) in forward.iter().enumerate() {
            assert_eq!(index.element_range(group), *range);
        }
    }

    #[test]
    fn test_meet_in_the_middle() {
        let index = DenseGroupIndex::new(vec![0, 1, 1, 2, 4, 4], 5);
        let mut groups = index.groups();
        assert_eq!(groups.next(), Some(0..1));
        assert_eq!(groups.next_back(), Some(4..6));
        assert_eq!(groups.next_back(), Some(4..4));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.next(), Some(1..3));
        assert_eq!(groups.next_back(), Some(3..4));
        assert_eq!(groups.next(), None);
        assert_eq!(groups.next_back(), None);
    }

    #[test]
    fn test_skipping_groups() {
        let index = DenseGroupIndex::new(vec![0, 0, 2, 3, 3, 3, 6], 8);
        for n in 0..8 {
            assert_eq!(index.groups().nth(n), Some(index.element_range(n)));
            assert_eq!(index.groups().nth_back(n), Some(index.element_range(7 - n)));
        }
        assert_eq!(index.groups().nth(8), None);
        assert_eq!(index.groups().nth_back(8), None);

        let mut groups = index.groups();
        assert_eq!(groups.nth(2), Some(2..3));
        assert_eq!(groups.nth_back(1), Some(6..7));
        assert_eq!(groups.len(), 3);
        assert!(groups.clone().eq([3..6, 6..6, 6..6]));
        assert_eq!(groups.nth(1), Some(6..6));
        assert_eq!(groups.next_back(), Some(6..6));
        assert_eq!(groups.next(), None);

        let mut exhausted = index.groups();
        assert_eq!(exhausted.nth(10), None);
        assert_eq!(exhausted.next_back(), None);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_group_of_out_of_range() {
        DenseGroupIndex::new(vec![0, 1], 2).group_of(2);
    }
}
