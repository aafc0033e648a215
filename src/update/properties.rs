// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Batch-wide analysis of the identifiers of a component type.

use tracing::debug;

use crate::component::ComponentType;
use crate::dataset::UpdateDataset;
use crate::types::IsNa;
use crate::Error;

/// What a whole update batch looks like for a single component type.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchProperties {
    pub component_type: ComponentType,
    /// Whether any scenario has records of the component type.
    pub has_any_elements: bool,
    /// Whether no record in any scenario has an identifier.
    pub ids_all_na: bool,
    /// Whether some records have an identifier and others don't.
    pub ids_part_na: bool,
    /// Whether the records are stored with a fixed stride per scenario.
    ///
    /// Recorded for diagnostics only, no decision depends on it.
    pub dense: bool,
    /// Whether every scenario has the same number of records.
    pub uniform: bool,
    pub is_columnar: bool,
    /// Whether every scenario has the same identifiers, in the same order,
    /// as the first one.
    pub update_ids_match: bool,
    /// The number of records per scenario, if uniform.
    pub elements_ps_in_update: Option<usize>,
    /// The number of components of this type in the base state.
    pub elements_in_base: usize,
}

impl BatchProperties {
    /// Returns true if the records carry no identifiers at all.
    pub fn no_id(&self) -> bool {
        !self.has_any_elements || self.ids_all_na
    }

    /// Returns true if the records can be matched to the base components by
    /// position, the same way for every scenario.
    pub fn qualify_for_optional_id(&self) -> bool {
        self.update_ids_match
            && self.ids_all_na
            && self.uniform
            && self.elements_ps_in_update == Some(self.elements_in_base)
    }

    /// Returns true if every scenario addresses the same components through
    /// a full set of identifiers.
    pub fn provided_ids_valid(&self) -> bool {
        self.is_empty_component()
            || (self.update_ids_match && !(self.ids_all_na || self.ids_part_na))
    }

    pub fn is_empty_component(&self) -> bool {
        !self.has_any_elements
    }

    /// Returns true if the locations resolved for one scenario are valid for
    /// every scenario of the batch.
    pub fn is_independent(&self) -> bool {
        self.qualify_for_optional_id() || self.provided_ids_valid()
    }

    /// Returns the number of base components that positional records map to,
    /// or `None` if records must be resolved by identifier.
    pub fn elements_per_scenario(&self) -> Option<usize> {
        if self.qualify_for_optional_id() {
            self.elements_ps_in_update
        } else {
            None
        }
    }

    /// Checks that the update batch can be resolved against the base state.
    ///
    /// Component types without any records are always valid.
    pub fn validate(&self) -> Result<(), Error> {
        if self.is_empty_component() {
            return Ok(());
        }
        let component_type = self.component_type;

        if let Some(per_scenario) = self.elements_ps_in_update {
            if per_scenario > self.elements_in_base {
                return Err(Error::dataset_error(format!(
                    "Update data has more {component_type} elements per scenario than the input data: {per_scenario} > {}.",
                    self.elements_in_base
                )));
            }
        }
        if self.ids_part_na {
            return Err(Error::ambiguous_ids(format!(
                "Some {component_type} update records have an id and others don't."
            )));
        }
        if self.ids_all_na && self.elements_ps_in_update != Some(self.elements_in_base) {
            return Err(Error::dataset_error(format!(
                "Update data without ids for {component_type} must have exactly {} elements per scenario.",
                self.elements_in_base
            )));
        }
        Ok(())
    }
}

/// Analyses the identifiers of all records of `component_type` in the update
/// batch.
///
/// The analysis itself never fails on malformed data: call
/// [`BatchProperties::validate`] on the result for that.
pub fn analyze_independence(
    dataset: &UpdateDataset,
    component_type: ComponentType,
    elements_in_base: usize,
) -> Result<BatchProperties, Error> {
    let uniform = dataset.is_uniform(component_type);

    let mut any_present = false;
    let mut any_absent = false;
    let mut update_ids_match = true;

    if dataset.batch_size() > 0 {
        let first = dataset.scenario_ids(component_type, 0)?;
        for scenario in 0..dataset.batch_size() {
            let ids = dataset.scenario_ids(component_type, scenario)?;
            for id in ids.iter() {
                if id.is_na() {
                    any_absent = true;
                } else {
                    any_present = true;
                }
            }
            if ids.as_ref() != first.as_ref() {
                update_ids_match = false;
            }
        }
    }

    let ids_all_na = !any_present;
    let properties = BatchProperties {
        component_type,
        has_any_elements: dataset.total_elements(component_type) > 0,
        ids_all_na,
        ids_part_na: any_absent && !ids_all_na,
        dense: dataset.is_dense(component_type),
        uniform,
        is_columnar: dataset.is_columnar(component_type),
        update_ids_match,
        elements_ps_in_update: dataset.uniform_elements_per_scenario(component_type),
        elements_in_base,
    };

    debug!(
        "Update data for {component_type}: independent={}, positional={}, uniform={}, ids_match={}.",
        properties.is_independent(),
        properties.qualify_for_optional_id(),
        properties.uniform,
        properties.update_ids_match
    );

    Ok(properties)
}
