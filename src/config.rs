// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the `BatchRunner`.

/// How scenarios of a batch are applied to the base state.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub enum ScenarioDiscipline {
    /// Every scenario is applied to a private copy of the base state.
    ///
    /// Scenarios run in parallel on a thread pool.  Peak memory grows with the
    /// number of worker threads.
    #[default]
    CopyPerScenario,

    /// Scenarios are applied one after the other to the caller's state, and
    /// each one is rolled back with its inverse update before the next one
    /// starts.
    SequentialRestore,
}

/// Configuration options for the `BatchRunner`.
#[derive(Clone, Default, Debug)]
pub struct BatchConfig {
    /// The scenario discipline to use.
    pub discipline: ScenarioDiscipline,

    /// Number of worker threads for `ScenarioDiscipline::CopyPerScenario`.
    /// `0` lets the thread pool pick one thread per available CPU.
    pub threads: usize,
}
