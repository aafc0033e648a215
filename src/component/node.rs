// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

use crate::dataset::ColumnarBuffer;
use crate::types::{Id, UpdateChange};

use super::{Attribute, AttributeKind, Updatable, UpdateRecord};

/// A node of the electrical network.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: Id,
    pub u_rated: f64,
}

impl Node {
    pub fn new(id: Id, u_rated: f64) -> Self {
        Self { id, u_rated }
    }
}

/// An update record that only carries an identifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseUpdate {
    pub id: Id,
}

impl BaseUpdate {
    pub fn new(id: Id) -> Self {
        Self { id }
    }
}

impl UpdateRecord for BaseUpdate {
    const ATTRIBUTES: &'static [Attribute] = &[Attribute::new("id", AttributeKind::Id)];

    fn id(&self) -> Id {
        self.id
    }

    fn from_columns(columns: &ColumnarBuffer, index: usize) -> Self {
        Self {
            id: columns.id(index),
        }
    }
}

impl Updatable for Node {
    type Update = BaseUpdate;

    fn update(&mut self, _update: &BaseUpdate) -> UpdateChange {
        UpdateChange::default()
    }

    fn inverse(&self, update: &BaseUpdate) -> BaseUpdate {
        *update
    }
}
