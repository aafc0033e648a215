// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Lines, the only branch type in the network model.

use crate::dataset::ColumnarBuffer;
use crate::types::{Id, IntS, UpdateChange};

use super::{
    restore_status_if_available, set_status_if_available, Attribute, AttributeKind, Updatable,
    UpdateRecord,
};

/// A line connecting two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub id: Id,
    pub from_node: Id,
    pub to_node: Id,
    pub from_status: bool,
    pub to_status: bool,
    pub r1: f64,
    pub x1: f64,
}

impl Line {
    pub fn new(id: Id, from_node: Id, to_node: Id, r1: f64, x1: f64) -> Self {
        Self {
            id,
            from_node,
            to_node,
            from_status: true,
            to_status: true,
            r1,
            x1,
        }
    }

    /// Returns true if the line is connected at both ends.
    pub fn is_energized(&self) -> bool {
        self.from_status && self.to_status
    }
}

/// An update of the connection statuses of a branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchUpdate {
    pub id: Id,
    pub from_status: IntS,
    pub to_status: IntS,
}

impl BranchUpdate {
    pub fn new(id: Id, from_status: IntS, to_status: IntS) -> Self {
        Self {
            id,
            from_status,
            to_status,
        }
    }
}

impl UpdateRecord for BranchUpdate {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::new("id", AttributeKind::Id),
        Attribute::new("from_status", AttributeKind::IntS),
        Attribute::new("to_status", AttributeKind::IntS),
    ];

    fn id(&self) -> Id {
        self.id
    }

    fn from_columns(columns: &ColumnarBuffer, index: usize) -> Self {
        Self {
            id: columns.id(index),
            from_status: columns.int_s("from_status", index),
            to_status: columns.int_s("to_status", index),
        }
    }
}

impl Updatable for Line {
    type Update = BranchUpdate;

    /// Status changes alter both the topology and the branch parameters.
    fn update(&mut self, update: &BranchUpdate) -> UpdateChange {
        let from_changed = set_status_if_available(&mut self.from_status, update.from_status);
        let to_changed = set_status_if_available(&mut self.to_status, update.to_status);
        let changed = from_changed || to_changed;
        UpdateChange::new(changed, changed)
    }

    fn inverse(&self, update: &BranchUpdate) -> BranchUpdate {
        BranchUpdate {
            id: update.id,
            from_status: restore_status_if_available(self.from_status, update.from_status),
            to_status: restore_status_if_available(self.to_status, update.to_status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NA_INT_S;

    #[test]
    fn test_update() {
        let mut line = Line::new(3, 1, 2, 0.1, 0.2);
        assert!(line.is_energized());

        let change = line.update(&BranchUpdate::new(3, 0, NA_INT_S));
        assert_eq!(change, UpdateChange::new(true, true));
        assert!(!line.from_status);
        assert!(line.to_status);
        assert!(!line.is_energized());

        // applying the same update again changes nothing.
        let change = line.update(&BranchUpdate::new(3, 0, NA_INT_S));
        assert_eq!(change, UpdateChange::default());

        let change = line.update(&BranchUpdate::new(3, NA_INT_S, NA_INT_S));
        assert_eq!(change, UpdateChange::default());
    }

    #[test]
    fn test_inverse() {
        let line = Line::new(3, 1, 2, 0.1, 0.2);

        assert_eq!(
            line.inverse(&BranchUpdate::new(3, NA_INT_S, NA_INT_S)),
            BranchUpdate::new(3, NA_INT_S, NA_INT_S)
        );
        assert_eq!(
            line.inverse(&BranchUpdate::new(3, 0, NA_INT_S)),
            BranchUpdate::new(3, 1, NA_INT_S)
        );
        assert_eq!(
            line.inverse(&BranchUpdate::new(3, 1, 0)),
            BranchUpdate::new(3, 1, 1)
        );
    }

    #[test]
    fn test_inverse_round_trip() {
        let mut line = Line::new(3, 1, 2, 0.1, 0.2);
        let original = line.clone();
        let update = BranchUpdate::new(3, 0, 0);

        let inverse = line.inverse(&update);
        line.update(&update);
        assert_ne!(line, original);

        assert_eq!(line.update(&inverse), UpdateChange::new(true, true));
        assert_eq!(line, original);
    }
}
