// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The closed set of component types that can be stored in a
//! [`ComponentState`][crate::ComponentState] and updated in batches.
//!
//! Each component type has a stored record (e.g. [`Line`]) and an update
//! record (e.g. [`BranchUpdate`]).  Update records use the "not available"
//! sentinels from [`types`][crate::types] for fields that should be left
//! untouched.

mod appliance;
mod line;
mod node;
mod sensor;

pub use appliance::{LoadUpdate, Source, SourceUpdate, SymLoad};
pub use line::{BranchUpdate, Line};
pub use node::{BaseUpdate, Node};
pub use sensor::{CurrentSensorUpdate, SymCurrentSensor, SymVoltageSensor, VoltageSensorUpdate};

use crate::dataset::ColumnarBuffer;
use crate::types::{Id, IntS, IsNa, UpdateChange};
use crate::Error;

/// The value type of an update attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttributeKind {
    Id,
    IntS,
    Real,
}

/// A named attribute of an update record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
}

impl Attribute {
    pub(crate) const fn new(name: &'static str, kind: AttributeKind) -> Self {
        Self { name, kind }
    }
}

/// Behaviour shared by all update record types.
pub trait UpdateRecord: Copy {
    /// The attributes of the update record, in declaration order.
    const ATTRIBUTES: &'static [Attribute];

    /// Returns the identifier of the component to update, which may be
    /// [`NA_ID`][crate::types::NA_ID].
    fn id(&self) -> Id;

    /// Builds the record at `index` from a columnar buffer.  Missing columns
    /// read as "not available".
    fn from_columns(columns: &ColumnarBuffer, index: usize) -> Self;
}

/// Behaviour shared by all stored component types.
pub trait Updatable {
    type Update: UpdateRecord;

    /// Applies all available fields of `update` and reports what changed.
    fn update(&mut self, update: &Self::Update) -> UpdateChange;

    /// Returns the update that restores the current value of every field
    /// that `update` would set.
    fn inverse(&self, update: &Self::Update) -> Self::Update;
}

/// Sets `target` to `value`, unless `value` is not available.
///
/// Returns true if `target` changed.
pub(crate) fn set_if_available<T: IsNa + PartialEq>(target: &mut T, value: T) -> bool {
    if value.is_na() || *target == value {
        return false;
    }
    *target = value;
    true
}

/// Sets a connection status from its integer representation, unless the
/// value is not available.
///
/// Returns true if the status changed.
pub(crate) fn set_status_if_available(target: &mut bool, value: IntS) -> bool {
    if value.is_na() || *target == (value != 0) {
        return false;
    }
    *target = value != 0;
    true
}

/// Returns `current` if `update` is available, and "not available" otherwise.
pub(crate) fn restore_if_available<T: IsNa>(current: T, update: T) -> T {
    if update.is_na() {
        T::NA
    } else {
        current
    }
}

/// Like [`restore_if_available`], for connection statuses.
pub(crate) fn restore_status_if_available(current: bool, update: IntS) -> IntS {
    if update.is_na() {
        IntS::NA
    } else {
        IntS::from(current)
    }
}

/// A macro for defining the `ComponentType`, `Component` and
/// `ComponentUpdate` enums, and for dispatching from them to the concrete
/// component types.
macro_rules! Components {
    ($(
        ($variant:ident, $name:literal, $component:ident, $update:ident)
    ),*) => {
        /// The type of a component.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ComponentType {
            $(
                $variant,
            )*
        }

        impl ComponentType {
            /// All component types, in storage group order.
            pub const ALL: &'static [ComponentType] = &[$(Self::$variant,)*];

            /// Returns the name of the component type.
            pub fn name(self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $name,
                    )*
                }
            }

            /// Returns the attributes of the component type's update record.
            pub fn update_attributes(self) -> &'static [Attribute] {
                match self {
                    $(
                        Self::$variant => <$update as UpdateRecord>::ATTRIBUTES,
                    )*
                }
            }

            /// Returns the storage group of the component type.
            pub fn group(self) -> usize {
                self as usize
            }
        }

        impl std::fmt::Display for ComponentType {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.name())
            }
        }

        /// A stored component of any type.
        #[derive(Clone, Debug, PartialEq)]
        pub enum Component {
            $(
                $variant($component),
            )*
        }

        impl Component {
            /// Returns the identifier of the component.
            pub fn id(&self) -> Id {
                match self {
                    $(
                        Self::$variant(c) => c.id,
                    )*
                }
            }

            /// Returns the type of the component.
            pub fn component_type(&self) -> ComponentType {
                match self {
                    $(
                        Self::$variant(_) => ComponentType::$variant,
                    )*
                }
            }

            /// Applies `update` to the component.
            ///
            /// Returns an error if `update` belongs to another component type.
            pub fn update(&mut self, update: &ComponentUpdate) -> Result<UpdateChange, Error> {
                match (self, update) {
                    $(
                        (Self::$variant(c), ComponentUpdate::$variant(u)) => Ok(c.update(u)),
                    )*
                    (component, update) => Err(Error::invalid_component(format!(
                        "Can't apply a {} update to {}:{}.",
                        update.component_type(),
                        component.component_type(),
                        component.id()
                    ))),
                }
            }

            /// Returns the update that would restore the fields that `update`
            /// sets.
            ///
            /// Returns an error if `update` belongs to another component type.
            pub fn inverse(&self, update: &ComponentUpdate) -> Result<ComponentUpdate, Error> {
                match (self, update) {
                    $(
                        (Self::$variant(c), ComponentUpdate::$variant(u)) => {
                            Ok(ComponentUpdate::$variant(c.inverse(u)))
                        }
                    )*
                    (component, update) => Err(Error::invalid_component(format!(
                        "Can't invert a {} update on {}:{}.",
                        update.component_type(),
                        component.component_type(),
                        component.id()
                    ))),
                }
            }
        }

        /// An update record of any component type.
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub enum ComponentUpdate {
            $(
                $variant($update),
            )*
        }

        impl ComponentUpdate {
            /// Returns the identifier of the component to update, which may be
            /// [`NA_ID`][crate::types::NA_ID].
            pub fn id(&self) -> Id {
                match self {
                    $(
                        Self::$variant(u) => u.id(),
                    )*
                }
            }

            /// Returns the component type the update belongs to.
            pub fn component_type(&self) -> ComponentType {
                match self {
                    $(
                        Self::$variant(_) => ComponentType::$variant,
                    )*
                }
            }

            pub(crate) fn from_columns(
                component_type: ComponentType,
                columns: &ColumnarBuffer,
                index: usize,
            ) -> Self {
                match component_type {
                    $(
                        ComponentType::$variant => {
                            Self::$variant($update::from_columns(columns, index))
                        }
                    )*
                }
            }
        }

        $(
            impl From<$component> for Component {
                fn from(component: $component) -> Self {
                    Self::$variant(component)
                }
            }

            impl From<$update> for ComponentUpdate {
                fn from(update: $update) -> Self {
                    Self::$variant(update)
                }
            }
        )*
    };
}

Components!(
    (Node, "node", Node, BaseUpdate),
    (Line, "line", Line, BranchUpdate),
    (Source, "source", Source, SourceUpdate),
    (SymLoad, "sym_load", SymLoad, LoadUpdate),
    (SymVoltageSensor, "sym_voltage_sensor", SymVoltageSensor, VoltageSensorUpdate),
    (SymCurrentSensor, "sym_current_sensor", SymCurrentSensor, CurrentSensorUpdate)
);
