// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Grid Batch Update

This is a library for applying batches of update scenarios to the components
of an electrical network model, for example to run a power flow calculation
once per time step of a load profile.

## Components and state

The network model is a [`ComponentState`], created from a closed set of
component types (nodes, lines, sources, loads and sensors) with the
[`try_new`][ComponentState::try_new] method.  Every component is stored at a
[`LocationRef`]: the group of its component type and its position within that
group, in construction order.

## Update batches

An [`UpdateDataset`][dataset::UpdateDataset] holds, per component type, the
update records of every scenario.  Records can be stored row by row or column
by column, and scenarios can have a fixed or a variable number of records.
Fields that should be left untouched hold the "not available" sentinels from
[`types`].

Records address components by id, or, when no record carries an id and every
scenario updates all components of the type, by position.

## Resolution

Looking up the location of every record in every scenario is the expensive
part of applying a batch.  [`BatchSequence`][update::BatchSequence] analyses
the whole batch up front with
[`analyze_independence`][update::analyze_independence]:

- Batches that mix records with and without ids, or that have more records per
  scenario than there are components, are rejected.
- When every scenario addresses the same components in the same order, the
  locations of the first scenario are resolved once and reused for all of
  them.
- Otherwise, every scenario is resolved separately.

## Running a batch

[`BatchRunner`] applies every scenario to the base state, rebuilds the
[`Topology`][topology::Topology] when a scenario changes connection statuses,
and calls a calculation callback with a [`ScenarioView`].  Two disciplines are
available, see [`ScenarioDiscipline`].
*/

pub mod types;
pub use types::{Id, IntS, LocationRef, UpdateChange};

mod error;
pub use error::Error;

mod config;
pub use config::{BatchConfig, ScenarioDiscipline};

pub mod grouped_index;

pub mod component;
pub use component::{Component, ComponentType, ComponentUpdate};

mod state;
pub use state::ComponentState;

pub mod dataset;

pub mod update;

pub mod topology;

mod batch;
pub use batch::{BatchRunner, ScenarioView};

#[cfg(test)]
mod test_utils;
