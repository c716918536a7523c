//! Finite state machine (Mealy machine).

/// Finite state machine (Mealy machine).
///
/// The machine is described by [`Fsm::transition`], which computes (1) the current-cycle output and (2) the
/// next-cycle state from the current-cycle input and state. Both are combinational in the input and the state.
pub trait Fsm {
    /// Input of one cycle.
    type Input;

    /// Output of one cycle.
    type Output;

    /// State carried between cycles.
    type State;

    /// Returns the state after reset.
    fn init(&self) -> Self::State;

    /// Computes the current-cycle output and the next-cycle state.
    fn transition(&self, input: &Self::Input, state: &Self::State) -> (Self::Output, Self::State);

    /// Feeds `inputs` to the machine starting from `state`, and returns the outputs of every cycle.
    ///
    /// `state` holds the state after the last cycle on return.
    fn run<I: IntoIterator<Item = Self::Input>>(&self, state: &mut Self::State, inputs: I) -> Vec<Self::Output> {
        inputs
            .into_iter()
            .map(|input| {
                let (output, state_next) = self.transition(&input, state);
                *state = state_next;
                output
            })
            .collect()
    }
}
