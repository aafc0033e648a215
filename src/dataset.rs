// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The update batch: per component type, a buffer of update records for every
//! scenario.

mod columnar;

pub use columnar::{Column, ColumnarBuffer};

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;

use crate::component::{ComponentType, ComponentUpdate};
use crate::grouped_index::{GroupedIndex, SparseGroupIndex};
use crate::types::Id;
use crate::Error;

/// How the records of a buffer are divided over the scenarios.
#[derive(Clone, Debug, PartialEq)]
pub enum ScenarioLayout {
    /// Every scenario has the same number of records.
    Uniform(usize),
    /// Scenario `s` owns the records `indptr[s]..indptr[s + 1]`.
    Indexed(Vec<usize>),
}

/// The records of a buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum BufferData {
    /// One update record per element.
    Row(Vec<ComponentUpdate>),
    /// One column per attribute.
    Columnar(ColumnarBuffer),
}

impl BufferData {
    pub fn len(&self) -> usize {
        match self {
            Self::Row(records) => records.len(),
            Self::Columnar(columns) => columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Layout {
    Uniform(usize),
    Indexed(SparseGroupIndex),
}

#[derive(Clone, Debug, PartialEq)]
struct ComponentBuffer {
    layout: Layout,
    data: BufferData,
}

impl ComponentBuffer {
    fn scenario_range(&self, scenario: usize) -> Range<usize> {
        match &self.layout {
            Layout::Uniform(per_scenario) => {
                let start = scenario * per_scenario;
                start..start + per_scenario
            }
            Layout::Indexed(indptr) => indptr.element_range(scenario),
        }
    }
}

/// A batch of update scenarios.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateDataset {
    batch_size: usize,
    buffers: BTreeMap<ComponentType, ComponentBuffer>,
}

/// `UpdateDataset` instantiation.
impl UpdateDataset {
    /// Creates an empty dataset with `batch_size` scenarios.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            buffers: BTreeMap::new(),
        }
    }

    /// Adds the update records of a component type to the dataset.
    ///
    /// Returns an error if the layout doesn't fit the number of records and
    /// scenarios, if the component type is already present, or if the
    /// records belong to another component type.
    pub fn add_buffer(
        &mut self,
        component_type: ComponentType,
        layout: ScenarioLayout,
        data: BufferData,
    ) -> Result<(), Error> {
        if self.buffers.contains_key(&component_type) {
            return Err(Error::dataset_error(format!(
                "Component {component_type} is already present in the update data."
            )));
        }
        Self::check_component_type(component_type, &data)?;

        let len = data.len();
        let layout = match layout {
            ScenarioLayout::Uniform(per_scenario) => {
                let Some(expected) = per_scenario.checked_mul(self.batch_size) else {
                    return Err(Error::dataset_error(format!(
                        "Component {component_type} has too many elements per scenario: {per_scenario} for {} scenarios.",
                        self.batch_size
                    )));
                };
                if expected != len {
                    return Err(Error::dataset_error(format!(
                        "Component {component_type} has {len} elements, expected {expected} for {} scenarios of {per_scenario}.",
                        self.batch_size
                    )));
                }
                Layout::Uniform(per_scenario)
            }
            ScenarioLayout::Indexed(indptr) => {
                self.check_indptr(component_type, &indptr, len)?;
                Layout::Indexed(SparseGroupIndex::new(indptr))
            }
        };

        self.buffers
            .insert(component_type, ComponentBuffer { layout, data });
        Ok(())
    }

    /// Adds the update records of a component type, and returns the dataset.
    pub fn with_buffer(
        mut self,
        component_type: ComponentType,
        layout: ScenarioLayout,
        data: BufferData,
    ) -> Result<Self, Error> {
        self.add_buffer(component_type, layout, data)?;
        Ok(self)
    }

    fn check_component_type(component_type: ComponentType, data: &BufferData) -> Result<(), Error> {
        let found = match data {
            BufferData::Row(records) => records
                .iter()
                .map(ComponentUpdate::component_type)
                .find(|found| *found != component_type),
            BufferData::Columnar(columns) => {
                Some(columns.component_type()).filter(|found| *found != component_type)
            }
        };
        match found {
            Some(found) => Err(Error::invalid_component(format!(
                "Update data for {component_type} contains {found} records."
            ))),
            None => Ok(()),
        }
    }

    fn check_indptr(
        &self,
        component_type: ComponentType,
        indptr: &[usize],
        len: usize,
    ) -> Result<(), Error> {
        if indptr.len() != self.batch_size + 1 {
            return Err(Error::dataset_error(format!(
                "Index pointers of {component_type} have {} entries, expected {}.",
                indptr.len(),
                self.batch_size + 1
            )));
        }
        if indptr.first() != Some(&0) || indptr.last() != Some(&len) {
            return Err(Error::dataset_error(format!(
                "Index pointers of {component_type} must start at 0 and end at {len}."
            )));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::dataset_error(format!(
                "Index pointers of {component_type} must be non-decreasing."
            )));
        }
        Ok(())
    }
}

/// Dataset queries.
///
/// Component types that are not present behave like a uniform buffer without
/// any records.
impl UpdateDataset {
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns an iterator over the component types present in the dataset.
    pub fn component_types(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.buffers.keys().copied()
    }

    pub fn contains(&self, component_type: ComponentType) -> bool {
        self.buffers.contains_key(&component_type)
    }

    /// Returns the number of records of a component type across all
    /// scenarios.
    pub fn total_elements(&self, component_type: ComponentType) -> usize {
        self.buffers
            .get(&component_type)
            .map_or(0, |buffer| buffer.data.len())
    }

    pub fn is_columnar(&self, component_type: ComponentType) -> bool {
        matches!(
            self.buffers.get(&component_type),
            Some(ComponentBuffer {
                data: BufferData::Columnar(_),
                ..
            })
        )
    }

    /// Returns true if the records of a component type are stored with a
    /// fixed stride per scenario.
    pub fn is_dense(&self, component_type: ComponentType) -> bool {
        !matches!(
            self.buffers.get(&component_type),
            Some(ComponentBuffer {
                layout: Layout::Indexed(_),
                ..
            })
        )
    }

    /// Returns true if every scenario has the same number of records of a
    /// component type.
    pub fn is_uniform(&self, component_type: ComponentType) -> bool {
        self.uniform_elements_per_scenario(component_type).is_some()
    }

    /// Returns the number of records per scenario of a component type, if it
    /// is the same for every scenario.
    pub fn uniform_elements_per_scenario(&self, component_type: ComponentType) -> Option<usize> {
        let Some(buffer) = self.buffers.get(&component_type) else {
            return Some(0);
        };
        match &buffer.layout {
            Layout::Uniform(per_scenario) => Some(*per_scenario),
            Layout::Indexed(indptr) => {
                let mut counts = indptr.groups().map(|range| range.len());
                match counts.next() {
                    Some(first) => counts.all(|count| count == first).then_some(first),
                    None => Some(0),
                }
            }
        }
    }

    /// Returns the number of records of a component type in a scenario.
    pub fn elements_in_scenario(
        &self,
        component_type: ComponentType,
        scenario: usize,
    ) -> Result<usize, Error> {
        self.check_scenario(scenario)?;
        Ok(self
            .buffers
            .get(&component_type)
            .map_or(0, |buffer| buffer.scenario_range(scenario).len()))
    }

    /// Returns the update records of a component type in a scenario.
    ///
    /// Row data is borrowed, columnar data is gathered into new records.
    pub fn scenario_records(
        &self,
        component_type: ComponentType,
        scenario: usize,
    ) -> Result<Cow<'_, [ComponentUpdate]>, Error> {
        self.check_scenario(scenario)?;
        let Some(buffer) = self.buffers.get(&component_type) else {
            return Ok(Cow::Borrowed(&[]));
        };
        let range = buffer.scenario_range(scenario);
        Ok(match &buffer.data {
            BufferData::Row(records) => Cow::Borrowed(&records[range]),
            BufferData::Columnar(columns) => Cow::Owned(columns.records(range)),
        })
    }

    /// Returns the ids of the update records of a component type in a
    /// scenario.
    ///
    /// The id column of columnar data is borrowed.
    pub fn scenario_ids(
        &self,
        component_type: ComponentType,
        scenario: usize,
    ) -> Result<Cow<'_, [Id]>, Error> {
        self.check_scenario(scenario)?;
        let Some(buffer) = self.buffers.get(&component_type) else {
            return Ok(Cow::Borrowed(&[]));
        };
        let range = buffer.scenario_range(scenario);
        Ok(match &buffer.data {
            BufferData::Row(records) => {
                Cow::Owned(records[range].iter().map(ComponentUpdate::id).collect())
            }
            BufferData::Columnar(columns) => columns.ids(range),
        })
    }

    fn check_scenario(&self, scenario: usize) -> Result<(), Error> {
        if scenario >= self.batch_size {
            return Err(Error::dataset_error(format!(
                "Scenario {scenario} out of range for a batch of {} scenarios.",
                self.batch_size
            )));
        }
        Ok(())
    }
}
