// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Running a calculation over every scenario of an update batch.

use std::borrow::Cow;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::config::{BatchConfig, ScenarioDiscipline};
use crate::dataset::UpdateDataset;
use crate::state::ComponentState;
use crate::topology::Topology;
use crate::types::{LocationRef, UpdateChange};
use crate::update::{inverse_scenario, restore, update_scenario, BatchSequence};
use crate::Error;

/// The state of the model while a single scenario is applied to it.
#[derive(Clone, Copy, Debug)]
pub struct ScenarioView<'a> {
    /// The index of the scenario in the batch.
    pub index: usize,
    pub state: &'a ComponentState,
    /// What the scenario's update changed compared to the base state.
    pub change: UpdateChange,
    /// The locations of the components the update changed.
    pub changed: &'a [LocationRef],
    pub topology: &'a Topology,
}

/// Applies the scenarios of an update batch to a base state, and runs a
/// calculation on each of them.
#[derive(Clone, Debug, Default)]
pub struct BatchRunner {
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Calls `calc` once for every scenario in `dataset`, with the scenario
    /// applied to `state`, and returns the results in scenario order.
    ///
    /// The whole batch is validated before the first scenario runs.  `state`
    /// is the same before and after the call, also when an error is returned.
    ///
    /// Scenarios that don't change the topology share the topology of the
    /// base state.
    pub fn run<T, F>(
        &self,
        state: &mut ComponentState,
        dataset: &UpdateDataset,
        calc: F,
    ) -> Result<Vec<T>, Error>
    where
        T: Send,
        F: Fn(ScenarioView<'_>) -> Result<T, Error> + Sync,
    {
        info!(
            "Running {} scenarios with {:?}.",
            dataset.batch_size(),
            self.config.discipline
        );

        let sequence = BatchSequence::try_new(state, dataset)?;
        let topology = Topology::build(state)?;

        match self.config.discipline {
            ScenarioDiscipline::CopyPerScenario => {
                self.run_copies(state, dataset, &sequence, &topology, &calc)
            }
            ScenarioDiscipline::SequentialRestore => {
                Self::run_in_place(state, dataset, &sequence, &topology, &calc)
            }
        }
    }

    fn run_copies<T, F>(
        &self,
        base: &ComponentState,
        dataset: &UpdateDataset,
        sequence: &BatchSequence,
        topology: &Topology,
        calc: &F,
    ) -> Result<Vec<T>, Error>
    where
        T: Send,
        F: Fn(ScenarioView<'_>) -> Result<T, Error> + Sync,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| Error::internal(format!("Can't build the thread pool: {e}")))?;

        pool.install(|| {
            (0..dataset.batch_size())
                .into_par_iter()
                .map(|scenario| {
                    let mut state = base.clone();
                    Self::run_scenario(&mut state, dataset, sequence, topology, scenario, calc)
                })
                .collect()
        })
    }

    fn run_in_place<T, F>(
        state: &mut ComponentState,
        dataset: &UpdateDataset,
        sequence: &BatchSequence,
        topology: &Topology,
        calc: &F,
    ) -> Result<Vec<T>, Error>
    where
        F: Fn(ScenarioView<'_>) -> Result<T, Error>,
    {
        (0..dataset.batch_size())
            .map(|scenario| {
                let inverse = inverse_scenario(state, dataset, sequence, scenario)?;
                let result =
                    Self::run_scenario(state, dataset, sequence, topology, scenario, calc);
                restore(state, &inverse)?;
                result
            })
            .collect()
    }

    fn run_scenario<T, F>(
        state: &mut ComponentState,
        dataset: &UpdateDataset,
        sequence: &BatchSequence,
        base_topology: &Topology,
        scenario: usize,
        calc: &F,
    ) -> Result<T, Error>
    where
        F: Fn(ScenarioView<'_>) -> Result<T, Error>,
    {
        let mut changed = Vec::new();
        let change = update_scenario(state, dataset, sequence, scenario, &mut changed)?;

        let topology = if change.topo {
            debug!("Scenario {scenario} changed the topology.");
            Cow::Owned(Topology::build(state)?)
        } else {
            Cow::Borrowed(base_topology)
        };

        calc(ScenarioView {
            index: scenario,
            state,
            change,
            changed: &changed,
            topology: &topology,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::component::{BranchUpdate, Component, ComponentType, SymLoad};
    use crate::dataset::{BufferData, ScenarioLayout};
    use crate::test_utils::{load_p, sample_components};
    use crate::types::{Id, IsNa, NA_ID, NA_INT_S, NA_REAL};

    fn active_power(state: &ComponentState, id: Id) -> Result<f64, Error> {
        match state.component(state.location_of(id)?)? {
            Component::SymLoad(load) => Ok(load.p_specified),
            component => Err(Error::internal(format!(
                "{} is not a load.",
                component.component_type()
            ))),
        }
    }

    fn batch_dataset() -> Result<UpdateDataset, Error> {
        UpdateDataset::new(3)
            .with_buffer(
                ComponentType::SymLoad,
                ScenarioLayout::Uniform(1),
                BufferData::Row(vec![
                    load_p(30, 2e6).into(),
                    load_p(30, 3e6).into(),
                    load_p(30, 4e6).into(),
                ]),
            )?
            .with_buffer(
                ComponentType::Line,
                ScenarioLayout::Indexed(vec![0, 0, 1, 2]),
                BufferData::Row(vec![
                    BranchUpdate::new(11, NA_INT_S, 0).into(),
                    BranchUpdate::new(11, 1, 1).into(),
                ]),
            )
    }

    fn runners() -> [BatchRunner; 3] {
        [
            BatchRunner::default(),
            BatchRunner::new(BatchConfig {
                discipline: ScenarioDiscipline::CopyPerScenario,
                threads: 2,
            }),
            BatchRunner::new(BatchConfig {
                discipline: ScenarioDiscipline::SequentialRestore,
                threads: 0,
            }),
        ]
    }

    #[test]
    fn test_scenarios_see_their_updates() -> Result<(), Error> {
        let original = ComponentState::try_new(sample_components())?;

        for runner in runners() {
            let mut state = original.clone();
            let results = runner.run(&mut state, &batch_dataset()?, |view| {
                Ok((
                    view.index,
                    active_power(view.state, 30)?,
                    view.change,
                    view.changed.len(),
                    view.topology.island_count(),
                ))
            })?;

            assert_eq!(
                results,
                vec![
                    (0, 2e6, UpdateChange::new(false, true), 1, 2),
                    (1, 3e6, UpdateChange::new(true, true), 2, 3),
                    (2, 4e6, UpdateChange::new(false, true), 1, 2),
                ],
                "{:?}",
                runner.config()
            );
            assert_eq!(active_power(&state, 30)?, 1e6);
            for component_type in ComponentType::ALL {
                assert!(state
                    .components(*component_type)
                    .eq(original.components(*component_type)));
            }
        }

        Ok(())
    }

    #[test]
    fn test_invalid_batch() -> Result<(), Error> {
        let dataset = UpdateDataset::new(2).with_buffer(
            ComponentType::SymLoad,
            ScenarioLayout::Uniform(1),
            BufferData::Row(vec![load_p(30, 2e6).into(), load_p(99, 3e6).into()]),
        )?;

        for runner in runners() {
            let mut state = ComponentState::try_new(sample_components())?;
            let calls = AtomicUsize::new(0);
            let result = runner.run(&mut state, &dataset, |view| {
                calls.fetch_add(1, Ordering::SeqCst);
                active_power(view.state, 30)
            });

            // the first scenario is fine, the second one can't be resolved.
            assert!(result
                .is_err_and(|e| e == Error::component_not_found("Component with id 99 not found.")));
            assert!(calls.load(Ordering::SeqCst) <= 1);
            assert_eq!(active_power(&state, 30)?, 1e6);
        }

        let dataset = UpdateDataset::new(1).with_buffer(
            ComponentType::Line,
            ScenarioLayout::Uniform(1),
            BufferData::Row(vec![BranchUpdate::new(NA_ID, 0, 0).into()]),
        )?;
        let mut state = ComponentState::try_new(sample_components())?;
        let calls = AtomicUsize::new(0);
        let result = BatchRunner::default().run(&mut state, &dataset, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert!(result.is_err_and(|e| e
            == Error::dataset_error(
                "Update data without ids for line must have exactly 2 elements per scenario."
            )));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        Ok(())
    }

    #[test]
    fn test_state_restored_after_calculation_error() -> Result<(), Error> {
        let mut state = ComponentState::try_new(sample_components())?;
        let runner = BatchRunner::new(BatchConfig {
            discipline: ScenarioDiscipline::SequentialRestore,
            threads: 0,
        });

        let result: Result<Vec<()>, Error> = runner.run(&mut state, &batch_dataset()?, |view| {
            if view.change.topo {
                return Err(Error::internal("Calculation failed."));
            }
            Ok(())
        });

        assert!(result.is_err_and(|e| e == Error::internal("Calculation failed.")));
        assert_eq!(active_power(&state, 30)?, 1e6);
        assert!(matches!(
            state.component(state.location_of(11)?)?,
            Component::Line(line) if line.is_energized()
        ));

        Ok(())
    }

    #[test]
    fn test_not_available_base_values_survive() -> Result<(), Error> {
        let mut components = sample_components();
        components.push(SymLoad::new(33, 4, true, NA_REAL, 2e5).into());
        let original = ComponentState::try_new(components)?;

        // only the first scenario sets the active power.
        let dataset = UpdateDataset::new(2).with_buffer(
            ComponentType::SymLoad,
            ScenarioLayout::Indexed(vec![0, 1, 1]),
            BufferData::Row(vec![load_p(33, 5e6).into()]),
        )?;

        for runner in runners() {
            let mut state = original.clone();
            let results =
                runner.run(&mut state, &dataset, |view| active_power(view.state, 33))?;

            assert_eq!(results.len(), 2);
            assert_eq!(results[0], 5e6, "{:?}", runner.config());
            assert!(results[1].is_na(), "{:?}", runner.config());
            assert!(active_power(&state, 33)?.is_na());
        }

        Ok(())
    }

    #[test]
    fn test_empty_batch() -> Result<(), Error> {
        let mut state = ComponentState::try_new(sample_components())?;
        let results = BatchRunner::default().run(&mut state, &UpdateDataset::new(0), |view| {
            Ok(view.index)
        })?;
        assert!(results.is_empty());

        // a batch without any buffers runs every scenario on the base state.
        let results = BatchRunner::default().run(&mut state, &UpdateDataset::new(2), |view| {
            Ok((view.change, view.topology.island_count()))
        })?;
        assert_eq!(results, vec![(UpdateChange::default(), 2); 2]);

        Ok(())
    }
}
