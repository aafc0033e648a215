// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The component store that batch updates are resolved against and applied
//! to.

use std::collections::HashMap;

use crate::component::{Component, ComponentType};
use crate::types::{Id, IsNa, LocationRef};
use crate::Error;

/// `IdMap` stores the storage location of every component, so that
/// components can be retrieved from their ids.
pub(crate) type IdMap = HashMap<Id, LocationRef>;

/// Owns all components of a network model.
///
/// Components are stored in one group per [`ComponentType`], at positions in
/// construction order.
#[derive(Clone, Debug)]
pub struct ComponentState {
    groups: Vec<Vec<Component>>,
    id_map: IdMap,
}

impl Default for ComponentState {
    fn default() -> Self {
        Self {
            groups: vec![Vec::new(); ComponentType::ALL.len()],
            id_map: IdMap::new(),
        }
    }
}

/// `ComponentState` instantiation.
impl ComponentState {
    /// Creates a new [`ComponentState`] from the given components.
    ///
    /// Returns an error if a component has no id, or if an id is used more
    /// than once.
    pub fn try_new(components: impl IntoIterator<Item = Component>) -> Result<Self, Error> {
        let mut state = Self::default();

        for component in components {
            let cid = component.id();
            let component_type = component.component_type();

            if cid.is_na() {
                return Err(Error::dataset_error(format!(
                    "Component of type {component_type} has no id."
                )));
            }
            if state.id_map.contains_key(&cid) {
                return Err(Error::dataset_error(format!(
                    "Duplicate component ID found: {cid}"
                )));
            }

            let group = &mut state.groups[component_type.group()];
            let location = LocationRef::new(component_type.group(), group.len());
            group.push(component);
            state.id_map.insert(cid, location);
        }

        Ok(state)
    }
}

/// Component retrieval.
impl ComponentState {
    /// Returns the location of the component with the given id.
    pub fn location_of(&self, id: Id) -> Result<LocationRef, Error> {
        self.id_map
            .get(&id)
            .copied()
            .ok_or_else(|| Error::component_not_found(format!("Component with id {id} not found.")))
    }

    /// Returns the location of the component with the given id, and checks
    /// that it has the expected type.
    pub fn location_of_type(
        &self,
        component_type: ComponentType,
        id: Id,
    ) -> Result<LocationRef, Error> {
        let location = self.location_of(id)?;
        if location.group != component_type.group() {
            return Err(Error::id_wrong_type(format!(
                "Component with id {id} is a {}, not a {component_type}.",
                ComponentType::ALL[location.group]
            )));
        }
        Ok(location)
    }

    /// Returns the component at the given location.
    pub fn component(&self, location: LocationRef) -> Result<&Component, Error> {
        self.groups
            .get(location.group)
            .and_then(|group| group.get(location.pos))
            .ok_or_else(|| {
                Error::component_not_found(format!("No component at location {location}."))
            })
    }

    /// Returns the component at the given location, for mutation.
    pub fn component_mut(&mut self, location: LocationRef) -> Result<&mut Component, Error> {
        self.groups
            .get_mut(location.group)
            .and_then(|group| group.get_mut(location.pos))
            .ok_or_else(|| {
                Error::component_not_found(format!("No component at location {location}."))
            })
    }

    /// Returns the id of the component at the given location.
    pub fn id_of(&self, location: LocationRef) -> Result<Id, Error> {
        self.component(location).map(Component::id)
    }

    /// Returns the storage group that holds the components of the given type.
    pub fn group_of(&self, component_type: ComponentType) -> usize {
        component_type.group()
    }

    /// Returns the number of components of the given type.
    pub fn count(&self, component_type: ComponentType) -> usize {
        self.groups[component_type.group()].len()
    }

    /// Returns an iterator over the components of the given type, in storage
    /// order.
    pub fn components(&self, component_type: ComponentType) -> std::slice::Iter<'_, Component> {
        self.groups[component_type.group()].iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Line, Node, SymLoad};
    use crate::test_utils::sample_components;
    use crate::types::NA_ID;

    #[test]
    fn test_component_validation() {
        let mut components = sample_components();
        assert!(ComponentState::try_new(components.clone()).is_ok());

        components.push(Node::new(2, 10.0e3).into());
        assert!(ComponentState::try_new(components.clone())
            .is_err_and(|e| e == Error::dataset_error("Duplicate component ID found: 2")));

        components.pop();
        components.push(SymLoad::new(NA_ID, 1, true, 0.0, 0.0).into());
        assert!(ComponentState::try_new(components.clone())
            .is_err_and(|e| e == Error::dataset_error("Component of type sym_load has no id.")));

        components.pop();
        assert!(ComponentState::try_new(components).is_ok());
    }

    #[test]
    fn test_locations() -> Result<(), Error> {
        let state = ComponentState::try_new(sample_components())?;

        let node_group = ComponentType::Node.group();
        let load_group = ComponentType::SymLoad.group();

        assert_eq!(state.location_of(1)?, LocationRef::new(node_group, 0));
        assert_eq!(state.location_of(3)?, LocationRef::new(node_group, 2));
        assert_eq!(state.location_of(31)?, LocationRef::new(load_group, 1));
        assert_eq!(
            state.location_of(99),
            Err(Error::component_not_found("Component with id 99 not found."))
        );

        assert_eq!(
            state.location_of_type(ComponentType::SymLoad, 31)?,
            LocationRef::new(load_group, 1)
        );
        assert_eq!(
            state.location_of_type(ComponentType::Line, 31),
            Err(Error::id_wrong_type(
                "Component with id 31 is a sym_load, not a line."
            ))
        );

        Ok(())
    }

    #[test]
    fn test_components() -> Result<(), Error> {
        let mut state = ComponentState::try_new(sample_components())?;

        assert_eq!(state.count(ComponentType::Node), 4);
        assert_eq!(state.count(ComponentType::Line), 2);
        assert_eq!(state.count(ComponentType::SymLoad), 3);
        assert_eq!(state.group_of(ComponentType::Line), 1);
        assert!(state
            .components(ComponentType::Line)
            .map(Component::id)
            .eq([10, 11]));

        let location = state.location_of(10)?;
        assert_eq!(state.id_of(location)?, 10);
        assert_eq!(
            state.component(location)?,
            &Component::from(Line::new(10, 1, 2, 0.1, 0.2))
        );

        if let Component::Line(line) = state.component_mut(location)? {
            line.from_status = false;
        }
        assert!(matches!(
            state.component(location)?,
            Component::Line(Line {
                from_status: false,
                ..
            })
        ));

        let missing = LocationRef::new(ComponentType::Line.group(), 5);
        assert_eq!(
            state.component(missing),
            Err(Error::component_not_found(
                "No component at location (1, 5)."
            ))
        );

        Ok(())
    }
}
