// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Resolution and application of batch updates.
//!
//! Applying a scenario of an [`UpdateDataset`][crate::dataset::UpdateDataset]
//! happens in three steps:
//!
//! 1. [`analyze_independence`] inspects the identifiers of a component type
//!    across all scenarios of the batch, and decides whether a single
//!    resolution can be reused for every scenario.
//! 2. [`resolve_sequence`] turns the update records of a scenario into the
//!    storage locations of the components they address.  [`BatchSequence`]
//!    caches the result for independent component types.
//! 3. [`apply_updates`] writes the records to those locations, and
//!    [`compute_inverse`] produces the records that undo them.

mod apply;
mod properties;
mod sequence;

pub use apply::{
    apply_updates, compute_inverse, inverse_scenario, restore, update_scenario, InverseUpdate,
};
pub use properties::{analyze_independence, BatchProperties};
pub use sequence::{resolve, resolve_sequence, BatchSequence};
