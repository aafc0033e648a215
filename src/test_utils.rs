// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains fixtures
//! shared by the tests of all modules.
//!
//! The sample network looks like this:
//!
//! ```text
//!  source 20            load 30        load 31
//!     |                   |              |
//!  node 1 ---line 10--- node 2 ---line 11--- node 3        node 4 -- load 32
//!     |                   |
//!  voltage sensor 40   current sensor 50 (on line 10)
//! ```

use crate::component::{
    Component, Line, LoadUpdate, Node, Source, SymCurrentSensor, SymLoad, SymVoltageSensor,
};
use crate::types::{Id, NA_ID, NA_INT_S};

/// Returns the components of the sample network.
pub(crate) fn sample_components() -> Vec<Component> {
    vec![
        Node::new(1, 10.0e3).into(),
        Node::new(2, 10.0e3).into(),
        Node::new(3, 10.0e3).into(),
        Node::new(4, 10.0e3).into(),
        Line::new(10, 1, 2, 0.1, 0.2).into(),
        Line::new(11, 2, 3, 0.1, 0.2).into(),
        Source::new(20, 1, true, 1.0, 1e10).into(),
        SymLoad::new(30, 2, true, 1e6, 1e5).into(),
        SymLoad::new(31, 3, true, 2e6, 2e5).into(),
        SymLoad::new(32, 4, true, 3e6, 3e5).into(),
        SymVoltageSensor::new(40, 1, 0.01, 10.0e3, 0.0).into(),
        SymCurrentSensor::new(50, 10, 0.1, 0.01, 100.0, 0.0).into(),
    ]
}

/// Returns a load update that only sets the active power.
pub(crate) fn load_p(id: Id, p_specified: f64) -> LoadUpdate {
    LoadUpdate::new(id, NA_INT_S, p_specified, f64::NAN)
}

/// Returns a load update without an id, that only sets the active power.
pub(crate) fn anonymous_load_p(p_specified: f64) -> LoadUpdate {
    load_p(NA_ID, p_specified)
}
