// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Resolution of update records to storage locations, and the batch-wide
//! cache of resolved sequences.

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::{debug, trace, warn};

use crate::component::{ComponentType, ComponentUpdate};
use crate::dataset::UpdateDataset;
use crate::state::ComponentState;
use crate::types::{Id, LocationRef};
use crate::Error;

use super::properties::{analyze_independence, BatchProperties};

/// Returns the storage location of every record, in record order.
///
/// With `known_count` set, record `i` addresses the `i`-th component of the
/// type in construction order, and identifiers are ignored.  Otherwise every
/// record is looked up by its identifier.
///
/// Returns an error if a record belongs to another component type, if an
/// identifier is unknown or belongs to another component type, or if there are
/// more positional records than `known_count`.
pub fn resolve(
    state: &ComponentState,
    component_type: ComponentType,
    records: &[ComponentUpdate],
    known_count: Option<usize>,
) -> Result<Vec<LocationRef>, Error> {
    if let Some(record) = records
        .iter()
        .find(|record| record.component_type() != component_type)
    {
        return Err(Error::invalid_component(format!(
            "Can't resolve a {} update as {component_type}.",
            record.component_type()
        )));
    }
    resolve_ids(
        state,
        component_type,
        records.iter().map(ComponentUpdate::id),
        records.len(),
        known_count,
    )
}

/// Resolves the records of `component_type` in a scenario of the update
/// batch, the way `properties` prescribes.
pub fn resolve_sequence(
    state: &ComponentState,
    dataset: &UpdateDataset,
    scenario: usize,
    component_type: ComponentType,
    properties: &BatchProperties,
) -> Result<Vec<LocationRef>, Error> {
    if properties.component_type != component_type {
        return Err(Error::invalid_component(format!(
            "Can't resolve {component_type} updates with the properties of {}.",
            properties.component_type
        )));
    }
    let ids = dataset.scenario_ids(component_type, scenario)?;
    resolve_ids(
        state,
        component_type,
        ids.iter().copied(),
        ids.len(),
        properties.elements_per_scenario(),
    )
}

fn resolve_ids(
    state: &ComponentState,
    component_type: ComponentType,
    ids: impl Iterator<Item = Id>,
    len: usize,
    known_count: Option<usize>,
) -> Result<Vec<LocationRef>, Error> {
    match known_count {
        Some(known_count) => {
            if len > known_count {
                return Err(Error::internal(format!(
                    "Got {len} positional {component_type} updates for {known_count} elements."
                )));
            }
            let group = state.group_of(component_type);
            Ok((0..len).map(|pos| LocationRef::new(group, pos)).collect())
        }
        None => ids
            .map(|id| {
                state
                    .location_of_type(component_type, id)
                    .inspect(|location| trace!("Resolved {component_type}:{id} to {location}."))
            })
            .collect(),
    }
}

/// The resolved locations of a whole update batch.
///
/// Analyses and validates every component type in the batch up front.  For
/// independent component types the locations of the first scenario are
/// resolved once and reused for every scenario; other component types are
/// resolved again for every scenario.
#[derive(Clone, Debug, Default)]
pub struct BatchSequence {
    properties: BTreeMap<ComponentType, BatchProperties>,
    cached: BTreeMap<ComponentType, Vec<LocationRef>>,
}

/// `BatchSequence` instantiation.
impl BatchSequence {
    /// Creates a new [`BatchSequence`] for resolving `dataset` against
    /// `state`.
    ///
    /// Returns an error if the records of any component type can't be
    /// resolved against `state`.
    pub fn try_new(state: &ComponentState, dataset: &UpdateDataset) -> Result<Self, Error> {
        let mut sequence = Self::default();

        for component_type in dataset.component_types() {
            let properties =
                analyze_independence(dataset, component_type, state.count(component_type))?;
            properties.validate()?;

            if !properties.is_independent() {
                warn!(
                    "Update data for {component_type} differs between scenarios, resolving every scenario separately."
                );
            } else if dataset.batch_size() > 0 {
                let locations =
                    resolve_sequence(state, dataset, 0, component_type, &properties)?;
                debug!(
                    "Cached {} locations for {component_type} updates.",
                    locations.len()
                );
                sequence.cached.insert(component_type, locations);
            }

            sequence.properties.insert(component_type, properties);
        }

        Ok(sequence)
    }
}

/// `BatchSequence` queries.
impl BatchSequence {
    /// Returns the properties of a component type in the batch, if the batch
    /// has a buffer for it.
    pub fn properties(&self, component_type: ComponentType) -> Option<&BatchProperties> {
        self.properties.get(&component_type)
    }

    pub fn is_cached(&self, component_type: ComponentType) -> bool {
        self.cached.contains_key(&component_type)
    }

    /// Returns true if every component type in the batch is independent.
    pub fn is_independent(&self) -> bool {
        self.properties
            .values()
            .all(BatchProperties::is_independent)
    }

    pub fn component_types(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.properties.keys().copied()
    }

    /// Returns the locations of the records of `component_type` in a
    /// scenario.
    ///
    /// Cached sequences are borrowed, all others are resolved on demand.
    pub fn sequence<'a>(
        &'a self,
        state: &ComponentState,
        dataset: &UpdateDataset,
        component_type: ComponentType,
        scenario: usize,
    ) -> Result<Cow<'a, [LocationRef]>, Error> {
        if let Some(cached) = self.cached.get(&component_type) {
            // also rejects out of range scenarios.
            dataset.elements_in_scenario(component_type, scenario)?;
            return Ok(Cow::Borrowed(cached));
        }
        match self.properties.get(&component_type) {
            Some(properties) => Ok(Cow::Owned(resolve_sequence(
                state,
                dataset,
                scenario,
                component_type,
                properties,
            )?)),
            None if dataset.contains(component_type) => Err(Error::internal(format!(
                "Update data for {component_type} was not analysed."
            ))),
            None => Ok(Cow::Borrowed(&[])),
        }
    }
}
