// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Scalar types, the shared "not available" sentinels, and the small value
//! types that flow through the update pipeline.

/// Identifier of a component instance.
pub type Id = i32;

/// Small signed integer used for status and enum-like fields.
pub type IntS = i8;

/// Marks an absent identifier in an update record.
pub const NA_ID: Id = Id::MIN;

/// Marks an absent small integer field in an update record.
pub const NA_INT_S: IntS = IntS::MIN;

/// Marks an absent real field in an update record.
pub const NA_REAL: f64 = f64::NAN;

/// Values that have a reserved "not available" representation.
pub trait IsNa: Copy {
    /// The reserved "not available" value.
    const NA: Self;

    /// Returns true if the value is the "not available" value.
    fn is_na(&self) -> bool;
}

impl IsNa for Id {
    const NA: Self = NA_ID;

    fn is_na(&self) -> bool {
        *self == NA_ID
    }
}

impl IsNa for IntS {
    const NA: Self = NA_INT_S;

    fn is_na(&self) -> bool {
        *self == NA_INT_S
    }
}

impl IsNa for f64 {
    const NA: Self = NA_REAL;

    fn is_na(&self) -> bool {
        self.is_nan()
    }
}

/// The storage slot of a single component instance inside a
/// [`ComponentState`][crate::ComponentState].
///
/// `group` identifies the component type's collection and `pos` the position
/// inside that collection, in construction order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationRef {
    pub group: usize,
    pub pos: usize,
}

impl LocationRef {
    pub fn new(group: usize, pos: usize) -> Self {
        Self { group, pos }
    }
}

impl std::fmt::Display for LocationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.group, self.pos)
    }
}

/// Summary of what an update changed.
///
/// Summaries of several updates are combined with `|`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateChange {
    /// Whether the topology (connection statuses) changed.
    pub topo: bool,
    /// Whether any electrical parameter changed.
    pub param: bool,
}

impl UpdateChange {
    pub fn new(topo: bool, param: bool) -> Self {
        Self { topo, param }
    }

    /// Returns true if either the topology or a parameter changed.
    pub fn any(&self) -> bool {
        self.topo || self.param
    }
}

impl std::ops::BitOr for UpdateChange {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            topo: self.topo || rhs.topo,
            param: self.param || rhs.param,
        }
    }
}

impl std::ops::BitOrAssign for UpdateChange {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}
