// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Appliances: components connected to a single node.

use crate::dataset::ColumnarBuffer;
use crate::types::{Id, IntS, UpdateChange};

use super::{
    restore_if_available, restore_status_if_available, set_if_available,
    set_status_if_available, Attribute, AttributeKind, Updatable, UpdateRecord,
};

/// A voltage source behind an internal impedance.
#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub id: Id,
    pub node: Id,
    pub status: bool,
    pub u_ref: f64,
    pub u_ref_angle: f64,
    pub sk: f64,
}

impl Source {
    pub fn new(id: Id, node: Id, status: bool, u_ref: f64, sk: f64) -> Self {
        Self {
            id,
            node,
            status,
            u_ref,
            u_ref_angle: 0.0,
            sk,
        }
    }
}

/// An update of the status and reference voltage of a source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceUpdate {
    pub id: Id,
    pub status: IntS,
    pub u_ref: f64,
    pub u_ref_angle: f64,
}

impl SourceUpdate {
    pub fn new(id: Id, status: IntS, u_ref: f64, u_ref_angle: f64) -> Self {
        Self {
            id,
            status,
            u_ref,
            u_ref_angle,
        }
    }
}

impl UpdateRecord for SourceUpdate {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::new("id", AttributeKind::Id),
        Attribute::new("status", AttributeKind::IntS),
        Attribute::new("u_ref", AttributeKind::Real),
        Attribute::new("u_ref_angle", AttributeKind::Real),
    ];

    fn id(&self) -> Id {
        self.id
    }

    fn from_columns(columns: &ColumnarBuffer, index: usize) -> Self {
        Self {
            id: columns.id(index),
            status: columns.int_s("status", index),
            u_ref: columns.real("u_ref", index),
            u_ref_angle: columns.real("u_ref_angle", index),
        }
    }
}

impl Updatable for Source {
    type Update = SourceUpdate;

    /// A source is the reference of its island, so switching it alters the
    /// topology.
    fn update(&mut self, update: &SourceUpdate) -> UpdateChange {
        let status_changed = set_status_if_available(&mut self.status, update.status);
        let u_ref_changed = set_if_available(&mut self.u_ref, update.u_ref);
        let angle_changed = set_if_available(&mut self.u_ref_angle, update.u_ref_angle);
        UpdateChange::new(
            status_changed,
            status_changed || u_ref_changed || angle_changed,
        )
    }

    fn inverse(&self, update: &SourceUpdate) -> SourceUpdate {
        SourceUpdate {
            id: update.id,
            status: restore_status_if_available(self.status, update.status),
            u_ref: restore_if_available(self.u_ref, update.u_ref),
            u_ref_angle: restore_if_available(self.u_ref_angle, update.u_ref_angle),
        }
    }
}

/// A symmetric load with a specified power.
#[derive(Clone, Debug, PartialEq)]
pub struct SymLoad {
    pub id: Id,
    pub node: Id,
    pub status: bool,
    pub p_specified: f64,
    pub q_specified: f64,
}

impl SymLoad {
    pub fn new(id: Id, node: Id, status: bool, p_specified: f64, q_specified: f64) -> Self {
        Self {
            id,
            node,
            status,
            p_specified,
            q_specified,
        }
    }
}

/// An update of the status and specified power of a load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadUpdate {
    pub id: Id,
    pub status: IntS,
    pub p_specified: f64,
    pub q_specified: f64,
}

impl LoadUpdate {
    pub fn new(id: Id, status: IntS, p_specified: f64, q_specified: f64) -> Self {
        Self {
            id,
            status,
            p_specified,
            q_specified,
        }
    }
}

impl UpdateRecord for LoadUpdate {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::new("id", AttributeKind::Id),
        Attribute::new("status", AttributeKind::IntS),
        Attribute::new("p_specified", AttributeKind::Real),
        Attribute::new("q_specified", AttributeKind::Real),
    ];

    fn id(&self) -> Id {
        self.id
    }

    fn from_columns(columns: &ColumnarBuffer, index: usize) -> Self {
        Self {
            id: columns.id(index),
            status: columns.int_s("status", index),
            p_specified: columns.real("p_specified", index),
            q_specified: columns.real("q_specified", index),
        }
    }
}

impl Updatable for SymLoad {
    type Update = LoadUpdate;

    /// Loads don't take part in the topology; every change is a parameter
    /// change.
    fn update(&mut self, update: &LoadUpdate) -> UpdateChange {
        let status_changed = set_status_if_available(&mut self.status, update.status);
        let p_changed = set_if_available(&mut self.p_specified, update.p_specified);
        let q_changed = set_if_available(&mut self.q_specified, update.q_specified);
        UpdateChange::new(false, status_changed || p_changed || q_changed)
    }

    fn inverse(&self, update: &LoadUpdate) -> LoadUpdate {
        LoadUpdate {
            id: update.id,
            status: restore_status_if_available(self.status, update.status),
            p_specified: restore_if_available(self.p_specified, update.p_specified),
            q_specified: restore_if_available(self.q_specified, update.q_specified),
        }
    }
}
