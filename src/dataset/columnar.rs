// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Column oriented storage of update records.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;

use crate::component::{AttributeKind, ComponentType, ComponentUpdate};
use crate::types::{Id, IntS, NA_ID, NA_INT_S, NA_REAL};
use crate::Error;

/// The values of a single update attribute, one per record.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Id(Vec<Id>),
    IntS(Vec<IntS>),
    Real(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Id(values) => values.len(),
            Self::IntS(values) => values.len(),
            Self::Real(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> AttributeKind {
        match self {
            Self::Id(_) => AttributeKind::Id,
            Self::IntS(_) => AttributeKind::IntS,
            Self::Real(_) => AttributeKind::Real,
        }
    }
}

/// Update records of a single component type, stored as one column per
/// attribute.
///
/// Attributes without a column are "not available" in every record.  In
/// particular, a buffer without an `id` column carries no identifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnarBuffer {
    component_type: ComponentType,
    len: usize,
    columns: BTreeMap<&'static str, Column>,
}

impl ColumnarBuffer {
    /// Creates a buffer of `len` records without any columns.
    pub fn new(component_type: ComponentType, len: usize) -> Self {
        Self {
            component_type,
            len,
            columns: BTreeMap::new(),
        }
    }

    /// Adds a column to the buffer.
    ///
    /// Returns an error if the component type's update records have no
    /// attribute of that name and kind, or if the column length doesn't
    /// match the buffer.
    pub fn with_column(mut self, name: &str, column: Column) -> Result<Self, Error> {
        let component_type = self.component_type;
        let attribute = component_type
            .update_attributes()
            .iter()
            .find(|attribute| attribute.name == name)
            .ok_or_else(|| {
                Error::invalid_component(format!(
                    "Attribute {name} does not exist on {component_type} updates."
                ))
            })?;
        if attribute.kind != column.kind() {
            return Err(Error::invalid_component(format!(
                "Attribute {name} of {component_type} updates expects {:?} values, got {:?}.",
                attribute.kind,
                column.kind()
            )));
        }
        if column.len() != self.len {
            return Err(Error::dataset_error(format!(
                "Column {name} of {component_type} has {} values, expected {}.",
                column.len(),
                self.len
            )));
        }

        self.columns.insert(attribute.name, column);
        Ok(self)
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the buffer has a column for the given attribute.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub(crate) fn id(&self, index: usize) -> Id {
        match self.columns.get("id") {
            Some(Column::Id(values)) => values[index],
            _ => NA_ID,
        }
    }

    pub(crate) fn int_s(&self, name: &str, index: usize) -> IntS {
        match self.columns.get(name) {
            Some(Column::IntS(values)) => values[index],
            _ => NA_INT_S,
        }
    }

    pub(crate) fn real(&self, name: &str, index: usize) -> f64 {
        match self.columns.get(name) {
            Some(Column::Real(values)) => values[index],
            _ => NA_REAL,
        }
    }

    /// Returns the ids of the records in `range`, borrowing the id column
    /// when there is one.
    pub(crate) fn ids(&self, range: Range<usize>) -> Cow<'_, [Id]> {
        match self.columns.get("id") {
            Some(Column::Id(values)) => Cow::Borrowed(&values[range]),
            _ => Cow::Owned(vec![NA_ID; range.len()]),
        }
    }

    /// Gathers the records in `range` from the columns.
    pub(crate) fn records(&self, range: Range<usize>) -> Vec<ComponentUpdate> {
        range
            .map(|index| ComponentUpdate::from_columns(self.component_type, self, index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{BranchUpdate, LoadUpdate};
    use crate::types::IsNa;

    #[test]
    fn test_column_validation() {
        let buffer = ColumnarBuffer::new(ComponentType::SymLoad, 2);

        assert!(buffer
            .clone()
            .with_column("u_ref", Column::Real(vec![1.0, 1.0]))
            .is_err_and(|e| e
                == Error::invalid_component("Attribute u_ref does not exist on sym_load updates.")));

        assert!(buffer
            .clone()
            .with_column("status", Column::Real(vec![1.0, 1.0]))
            .is_err_and(|e| e
                == Error::invalid_component(
                    "Attribute status of sym_load updates expects IntS values, got Real."
                )));

        assert!(buffer
            .clone()
            .with_column("p_specified", Column::Real(vec![1.0]))
            .is_err_and(|e| e
                == Error::dataset_error("Column p_specified of sym_load has 1 values, expected 2.")));

        assert!(buffer
            .with_column("p_specified", Column::Real(vec![1.0, 2.0]))
            .is_ok_and(|b| b.has_column("p_specified") && !b.has_column("id")));
    }

    #[test]
    fn test_records() -> Result<(), Error> {
        let buffer = ColumnarBuffer::new(ComponentType::SymLoad, 3)
            .with_column("id", Column::Id(vec![30, 31, 32]))?
            .with_column("p_specified", Column::Real(vec![1.0, 2.0, 3.0]))?;

        let records = buffer.records(1..3);
        assert_eq!(records.len(), 2);
        let ComponentUpdate::SymLoad(LoadUpdate {
            id,
            status,
            p_specified,
            q_specified,
        }) = records[0]
        else {
            panic!("Expected a sym_load update, got {:?}", records[0]);
        };
        assert_eq!(id, 31);
        assert!(status.is_na());
        assert_eq!(p_specified, 2.0);
        assert!(q_specified.is_na());

        assert_eq!(buffer.ids(0..2), Cow::Borrowed(&[30, 31][..]));

        Ok(())
    }

    #[test]
    fn test_missing_id_column() -> Result<(), Error> {
        let buffer = ColumnarBuffer::new(ComponentType::Line, 2)
            .with_column("from_status", Column::IntS(vec![0, 1]))?;

        assert_eq!(buffer.ids(0..2).as_ref(), &[NA_ID, NA_ID]);
        assert_eq!(
            buffer.records(0..2),
            vec![
                ComponentUpdate::from(BranchUpdate::new(NA_ID, 0, NA_INT_S)),
                ComponentUpdate::from(BranchUpdate::new(NA_ID, 1, NA_INT_S)),
            ]
        );

        Ok(())
    }
}
