// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Application of resolved update records, and their inverse.

use tracing::trace;

use crate::component::{Component, ComponentType, ComponentUpdate};
use crate::dataset::UpdateDataset;
use crate::state::ComponentState;
use crate::types::{IsNa, LocationRef, UpdateChange};
use crate::Error;

use super::sequence::BatchSequence;

/// Checks that every record can be applied at its location, without touching
/// the state.
fn check_updates(
    state: &ComponentState,
    records: &[ComponentUpdate],
    locations: &[LocationRef],
) -> Result<(), Error> {
    if records.len() != locations.len() {
        return Err(Error::internal(format!(
            "Got {} update records for {} locations.",
            records.len(),
            locations.len()
        )));
    }
    for (record, location) in records.iter().zip(locations) {
        let component = state.component(*location)?;
        if component.component_type() != record.component_type() {
            return Err(Error::invalid_component(format!(
                "Can't apply a {} update to {}:{}.",
                record.component_type(),
                component.component_type(),
                component.id()
            )));
        }
        if !record.id().is_na() && record.id() != component.id() {
            return Err(Error::internal(format!(
                "Update for {}:{} was resolved to {}:{}.",
                record.component_type(),
                record.id(),
                component.component_type(),
                component.id()
            )));
        }
    }
    Ok(())
}

fn apply_checked(
    state: &mut ComponentState,
    records: &[ComponentUpdate],
    locations: &[LocationRef],
    changed: &mut Vec<LocationRef>,
) -> Result<UpdateChange, Error> {
    let mut change = UpdateChange::default();
    for (record, location) in records.iter().zip(locations) {
        let component_change = state.component_mut(*location)?.update(record)?;
        if component_change.any() {
            trace!("Updated {}:{}.", record.component_type(), record.id());
            changed.push(*location);
        }
        change |= component_change;
    }
    Ok(change)
}

/// Applies every record to the component at the matching location.
///
/// The locations of all components that actually changed are appended to
/// `changed`, in record order.  Returns what changed overall.
///
/// All records are checked before the first one is applied, so an error
/// leaves `state` untouched.
pub fn apply_updates(
    state: &mut ComponentState,
    records: &[ComponentUpdate],
    locations: &[LocationRef],
    changed: &mut Vec<LocationRef>,
) -> Result<UpdateChange, Error> {
    check_updates(state, records, locations)?;
    apply_checked(state, records, locations, changed)
}

/// Returns, for every record, the record that restores the fields it would
/// change at its location.
pub fn compute_inverse(
    state: &ComponentState,
    records: &[ComponentUpdate],
    locations: &[LocationRef],
) -> Result<Vec<ComponentUpdate>, Error> {
    check_updates(state, records, locations)?;
    records
        .iter()
        .zip(locations)
        .map(|(record, location)| state.component(*location)?.inverse(record))
        .collect()
}

/// Applies all update records of a scenario.
///
/// Every component type of the scenario is resolved and checked before the
/// first record is applied, so an error leaves `state` untouched.
pub fn update_scenario(
    state: &mut ComponentState,
    dataset: &UpdateDataset,
    sequence: &BatchSequence,
    scenario: usize,
    changed: &mut Vec<LocationRef>,
) -> Result<UpdateChange, Error> {
    let mut resolved = Vec::new();
    for component_type in dataset.component_types() {
        let records = dataset.scenario_records(component_type, scenario)?;
        let locations = sequence.sequence(state, dataset, component_type, scenario)?;
        check_updates(state, &records, &locations)?;
        resolved.push((records, locations));
    }

    let mut change = UpdateChange::default();
    for (records, locations) in resolved {
        change |= apply_checked(state, &records, &locations, changed)?;
    }
    Ok(change)
}

/// What a scenario is about to change for one component type.
///
/// `records` are the inverse update records, for reporting what a scenario
/// changes.  `components` are copies of the addressed components, which
/// [`restore`] writes back, so that fields holding "not available" values are
/// restored as well.
#[derive(Clone, Debug, PartialEq)]
pub struct InverseUpdate {
    pub component_type: ComponentType,
    pub records: Vec<ComponentUpdate>,
    pub locations: Vec<LocationRef>,
    pub components: Vec<Component>,
}

/// Computes what restores `state` after the given scenario is applied to it.
pub fn inverse_scenario(
    state: &ComponentState,
    dataset: &UpdateDataset,
    sequence: &BatchSequence,
    scenario: usize,
) -> Result<Vec<InverseUpdate>, Error> {
    dataset
        .component_types()
        .map(|component_type| {
            let records = dataset.scenario_records(component_type, scenario)?;
            let locations = sequence.sequence(state, dataset, component_type, scenario)?;
            let components = locations
                .iter()
                .map(|location| state.component(*location).cloned())
                .collect::<Result<_, Error>>()?;
            Ok(InverseUpdate {
                component_type,
                records: compute_inverse(state, &records, &locations)?,
                locations: locations.into_owned(),
                components,
            })
        })
        .collect()
}

/// Writes back the components saved by [`inverse_scenario`].
///
/// All locations are checked before the first component is written, so an
/// error leaves `state` untouched.
pub fn restore(state: &mut ComponentState, inverse: &[InverseUpdate]) -> Result<(), Error> {
    for update in inverse {
        if update.components.len() != update.locations.len() {
            return Err(Error::internal(format!(
                "Got {} saved components for {} locations.",
                update.components.len(),
                update.locations.len()
            )));
        }
        for (saved, location) in update.components.iter().zip(&update.locations) {
            let current = state.component(*location)?;
            if current.component_type() != saved.component_type() || current.id() != saved.id() {
                return Err(Error::invalid_component(format!(
                    "Can't restore {}:{} over {}:{}.",
                    saved.component_type(),
                    saved.id(),
                    current.component_type(),
                    current.id()
                )));
            }
        }
    }
    for update in inverse {
        for (saved, location) in update.components.iter().zip(&update.locations) {
            *state.component_mut(*location)? = saved.clone();
        }
    }
    Ok(())
}
