// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Measurement sensors.

use crate::dataset::ColumnarBuffer;
use crate::types::{Id, UpdateChange};

use super::{
    restore_if_available, set_if_available, Attribute, AttributeKind, Updatable, UpdateRecord,
};

/// A symmetric voltage sensor measuring a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SymVoltageSensor {
    pub id: Id,
    pub measured_object: Id,
    pub u_sigma: f64,
    pub u_measured: f64,
    pub u_angle_measured: f64,
}

impl SymVoltageSensor {
    pub fn new(
        id: Id,
        measured_object: Id,
        u_sigma: f64,
        u_measured: f64,
        u_angle_measured: f64,
    ) -> Self {
        Self {
            id,
            measured_object,
            u_sigma,
            u_measured,
            u_angle_measured,
        }
    }
}

/// An update of the measured values of a voltage sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoltageSensorUpdate {
    pub id: Id,
    pub u_sigma: f64,
    pub u_measured: f64,
    pub u_angle_measured: f64,
}

impl VoltageSensorUpdate {
    pub fn new(id: Id, u_sigma: f64, u_measured: f64, u_angle_measured: f64) -> Self {
        Self {
            id,
            u_sigma,
            u_measured,
            u_angle_measured,
        }
    }
}

impl UpdateRecord for VoltageSensorUpdate {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::new("id", AttributeKind::Id),
        Attribute::new("u_sigma", AttributeKind::Real),
        Attribute::new("u_measured", AttributeKind::Real),
        Attribute::new("u_angle_measured", AttributeKind::Real),
    ];

    fn id(&self) -> Id {
        self.id
    }

    fn from_columns(columns: &ColumnarBuffer, index: usize) -> Self {
        Self {
            id: columns.id(index),
            u_sigma: columns.real("u_sigma", index),
            u_measured: columns.real("u_measured", index),
            u_angle_measured: columns.real("u_angle_measured", index),
        }
    }
}

impl Updatable for SymVoltageSensor {
    type Update = VoltageSensorUpdate;

    fn update(&mut self, update: &VoltageSensorUpdate) -> UpdateChange {
        let sigma_changed = set_if_available(&mut self.u_sigma, update.u_sigma);
        let u_changed = set_if_available(&mut self.u_measured, update.u_measured);
        let angle_changed = set_if_available(&mut self.u_angle_measured, update.u_angle_measured);
        UpdateChange::new(false, sigma_changed || u_changed || angle_changed)
    }

    fn inverse(&self, update: &VoltageSensorUpdate) -> VoltageSensorUpdate {
        VoltageSensorUpdate {
            id: update.id,
            u_sigma: restore_if_available(self.u_sigma, update.u_sigma),
            u_measured: restore_if_available(self.u_measured, update.u_measured),
            u_angle_measured: restore_if_available(self.u_angle_measured, update.u_angle_measured),
        }
    }
}

/// A symmetric current sensor measuring a branch terminal.
#[derive(Clone, Debug, PartialEq)]
pub struct SymCurrentSensor {
    pub id: Id,
    pub measured_object: Id,
    pub i_sigma: f64,
    pub i_angle_sigma: f64,
    pub i_measured: f64,
    pub i_angle_measured: f64,
}

impl SymCurrentSensor {
    pub fn new(
        id: Id,
        measured_object: Id,
        i_sigma: f64,
        i_angle_sigma: f64,
        i_measured: f64,
        i_angle_measured: f64,
    ) -> Self {
        Self {
            id,
            measured_object,
            i_sigma,
            i_angle_sigma,
            i_measured,
            i_angle_measured,
        }
    }
}

/// An update of the measured values of a current sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurrentSensorUpdate {
    pub id: Id,
    pub i_sigma: f64,
    pub i_angle_sigma: f64,
    pub i_measured: f64,
    pub i_angle_measured: f64,
}

impl CurrentSensorUpdate {
    pub fn new(
        id: Id,
        i_sigma: f64,
        i_angle_sigma: f64,
        i_measured: f64,
        i_angle_measured: f64,
    ) -> Self {
        Self {
            id,
            i_sigma,
            i_angle_sigma,
            i_measured,
            i_angle_measured,
        }
    }
}

impl UpdateRecord for CurrentSensorUpdate {
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::new("id", AttributeKind::Id),
        Attribute::new("i_sigma", AttributeKind::Real),
        Attribute::new("i_angle_sigma", AttributeKind::Real),
        Attribute::new("i_measured", AttributeKind::Real),
        Attribute::new("i_angle_measured", AttributeKind::Real),
    ];

    fn id(&self) -> Id {
        self.id
    }

    fn from_columns(columns: &ColumnarBuffer, index: usize) -> Self {
        Self {
            id: columns.id(index),
            i_sigma: columns.real("i_sigma", index),
            i_angle_sigma: columns.real("i_angle_sigma", index),
            i_measured: columns.real("i_measured", index),
            i_angle_measured: columns.real("i_angle_measured", index),
        }
    }
}

impl Updatable for SymCurrentSensor {
    type Update = CurrentSensorUpdate;

    fn update(&mut self, update: &CurrentSensorUpdate) -> UpdateChange {
        let sigma_changed = set_if_available(&mut self.i_sigma, update.i_sigma);
        let angle_sigma_changed = set_if_available(&mut self.i_angle_sigma, update.i_angle_sigma);
        let i_changed = set_if_available(&mut self.i_measured, update.i_measured);
        let angle_changed = set_if_available(&mut self.i_angle_measured, update.i_angle_measured);
        UpdateChange::new(
            false,
            sigma_changed || angle_sigma_changed || i_changed || angle_changed,
        )
    }

    fn inverse(&self, update: &CurrentSensorUpdate) -> CurrentSensorUpdate {
        CurrentSensorUpdate {
            id: update.id,
            i_sigma: restore_if_available(self.i_sigma, update.i_sigma),
            i_angle_sigma: restore_if_available(self.i_angle_sigma, update.i_angle_sigma),
            i_measured: restore_if_available(self.i_measured, update.i_measured),
            i_angle_measured: restore_if_available(self.i_angle_measured, update.i_angle_measured),
        }
    }
}
