//! Chained counters.
//!
//! Each stage's control outputs drive the next stage's control inputs within the same step, so a downstream
//! stage counts the wrap events of its upstream stage. Stages never share state: the only coupling is the
//! `CtrlOut` to `CtrlIn` message passed along the chain.

use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::counter::Counter;
use crate::port::{CounterInput, CtrlIn, CtrlOut, CtrlShape, PortError};

#[allow(missing_docs)]
#[allow(variant_size_differences)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("a chain needs at least one counter")]
    Empty,
    #[error("stage {stage} drives {upstream:?} but stage {} expects {downstream:?}", .stage + 1)]
    ShapeMismatch { stage: usize, upstream: CtrlShape, downstream: CtrlShape },
    #[error("tied inputs of stage {stage} do not match its ports: {error}")]
    TiedInput { stage: usize, error: PortError },
}

/// Outputs of one chain step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutput {
    /// Count of every stage before this step's update, head first.
    pub outs: Vec<u64>,
    /// Control outputs of the tail stage.
    pub ctrl: CtrlOut,
}

/// A stage: a counter and its tied data inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Stage {
    counter: Counter,
    tied: CounterInput,
}

/// Counters chained head to tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    stages: Vec<Stage>,
}

impl Chain {
    /// Builds a chain from `(counter, tied inputs)` pairs, head first.
    ///
    /// The tied inputs provide every data input of the stage for every step. Their `ctrl` field is replaced by
    /// the head's control input for the head, and by the upstream stage's control output for every other stage.
    pub fn new(stages: Vec<(Counter, CounterInput)>) -> Result<Self, ChainError> {
        if stages.is_empty() {
            return Err(ChainError::Empty);
        }

        for (stage, ((upstream, _), (downstream, _))) in stages.iter().tuple_windows().enumerate() {
            let upstream = upstream.ports().ctrl_out_shape();
            let downstream = downstream.ports().ctrl_in_shape();
            if upstream != downstream {
                return Err(ChainError::ShapeMismatch { stage, upstream, downstream });
            }
        }

        let stages = stages
            .into_iter()
            .enumerate()
            .map(|(stage, (counter, tied))| {
                let shape = counter.ports().ctrl_in_shape();
                let ctrl = CtrlIn {
                    wrap: shape.wrap.then_some(false),
                    change: shape.change.then_some(false),
                    reset: false,
                };
                counter
                    .ports()
                    .check(&CounterInput { ctrl, ..tied })
                    .map_err(|error| ChainError::TiedInput { stage, error })?;
                Ok(Stage { counter, tied })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(stages = stages.len(), "counter chain built");
        Ok(Self { stages })
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize { self.stages.len() }

    /// Returns whether the chain has no stage. Always false for a constructed chain.
    pub fn is_empty(&self) -> bool { self.stages.is_empty() }

    /// Returns the counters, head first.
    pub fn counters(&self) -> impl Iterator<Item = &Counter> { self.stages.iter().map(|stage| &stage.counter) }

    /// Returns the current count of every stage, head first.
    pub fn counts(&self) -> Vec<u64> { self.counters().map(Counter::count).collect() }

    /// Advances every stage by one step, driving the head with `ctrl`.
    pub fn step(&mut self, mut ctrl: CtrlIn) -> Result<ChainOutput, PortError> {
        let mut outs = Vec::with_capacity(self.stages.len());
        let mut ctrl_out = CtrlOut::default();

        for stage in &mut self.stages {
            let output = stage.counter.step(&CounterInput { ctrl, ..stage.tied })?;
            outs.push(output.out);
            ctrl_out = output.ctrl;
            ctrl = output.ctrl.into();
        }

        Ok(ChainOutput { outs, ctrl: ctrl_out })
    }
}
