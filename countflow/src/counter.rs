//! Counter modules.
//!
//! The next-state logic is a single combinational function of the current count, the configuration and the
//! step's inputs. Defaults for absent inputs are applied only by the `resolve_*` functions.

use tracing::trace;

use crate::config::{ChangeCtrl, CountType, ValidatedConfig, WrapCtrl};
use crate::fsm::Fsm;
use crate::num::truncate;
use crate::port::{CounterInput, CounterOutput, CtrlOut, PortError, Ports};

/// Returns the increment of this step, 1 when the counter has no increment input.
pub fn resolve_inc(input: &CounterInput) -> u64 { input.inc.unwrap_or(1) }

/// Returns the effective ceiling of this step, `count_max` when the counter has no max input.
pub fn resolve_max(config: &ValidatedConfig, input: &CounterInput) -> u64 { input.max.unwrap_or(config.count_max()) }

/// Returns the wrap target of this step.
///
/// A custom wrap target is taken from the input. Otherwise the target is derived from the count type: `max`
/// for a down-counter or an up/down-counter counting down, 0 for everything else.
pub fn resolve_wrap_to(config: &ValidatedConfig, input: &CounterInput, max: u64) -> u64 {
    match input.wrap_to {
        Some(wrap_to) if config.custom_wrap() => wrap_to,
        _ => match config.count_type() {
            CountType::UpDown => {
                if counts_down(input) {
                    max
                } else {
                    0
                }
            }
            CountType::Down => max,
            CountType::Up | CountType::UpMod => 0,
        },
    }
}

fn counts_down(input: &CounterInput) -> bool { input.up_down.unwrap_or(false) }

/// Combinational signals of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    wrap: bool,
    next: u64,
}

impl ValidatedConfig {
    fn step(&self, count: u64, input: &CounterInput) -> Step {
        let width = self.count_width();
        let multi_step = self.inc_max() > 1;
        let down_selected = counts_down(input);

        let inc = resolve_inc(input);
        let max = resolve_max(self, input);

        let eq_0 = count == 0;
        let eq_max = count == max;

        let sum = u128::from(count) + u128::from(inc);
        let up_custom = (sum % (u128::from(max) + 1)) as u64;
        let up_custom_wrap = sum > u128::from(max);

        // A zero modulus is treated as an absent one.
        let (mod_out, overflow) = match input.mod_n.filter(|&mod_n| mod_n != 0) {
            Some(mod_n) => ((sum % u128::from(mod_n)) as u64, sum >= u128::from(mod_n)),
            None => (truncate(sum, width), false),
        };

        let wrap = match self.wrap_ctrl() {
            WrapCtrl::External => input.ctrl.wrap.unwrap_or(false),
            WrapCtrl::TieFalse => false,
            WrapCtrl::Internal => match self.count_type() {
                CountType::UpDown => {
                    if down_selected {
                        eq_0
                    } else {
                        eq_max
                    }
                }
                CountType::Down => eq_0,
                CountType::Up => {
                    if multi_step {
                        up_custom_wrap
                    } else {
                        eq_max
                    }
                }
                CountType::UpMod => overflow,
            },
        };

        let wrap_to = resolve_wrap_to(self, input, max);

        let up = if !multi_step || (self.wrap_ctrl() == WrapCtrl::External && self.custom_wrap()) {
            truncate(sum, width)
        } else {
            up_custom
        };
        // Underflow wraps at the register width.
        let down = truncate(u128::from(count).wrapping_sub(u128::from(inc)), width);

        let next_in_seq = match self.count_type() {
            CountType::UpDown => {
                if down_selected {
                    down
                } else {
                    up
                }
            }
            CountType::Up => up,
            CountType::Down => down,
            CountType::UpMod => mod_out,
        };

        // The modulo and overflow arithmetic above already produced a wrapped value.
        let prewrapped = self.wrap_ctrl() == WrapCtrl::Internal
            && (self.count_type() == CountType::UpMod
                || (self.count_type() == CountType::Up && multi_step && !self.custom_wrap()));
        let next = if prewrapped || !wrap { next_in_seq } else { wrap_to };

        Step { wrap, next }
    }
}

impl Fsm for ValidatedConfig {
    type Input = CounterInput;
    type Output = CounterOutput;
    type State = u64;

    fn init(&self) -> u64 { self.reset_val() }

    /// Computes `out` and `ctrl_out` of this step, and the count of the next step.
    ///
    /// `input` is expected to have passed [`Ports::check`]. Absent inputs are resolved to their defaults.
    fn transition(&self, input: &CounterInput, count: &u64) -> (CounterOutput, u64) {
        let count = *count;
        let Step { wrap, next } = self.step(count, input);
        let ctrl_in = &input.ctrl;

        let new_on_clk = match self.change_ctrl() {
            ChangeCtrl::External => {
                if ctrl_in.change.unwrap_or(false) {
                    next
                } else {
                    count
                }
            }
            ChangeCtrl::TieTrue => next,
        };
        let count_next = if ctrl_in.reset { self.reset_val() } else { new_on_clk };

        let ctrl = CtrlOut {
            wrap: match self.wrap_ctrl() {
                WrapCtrl::External => Some(wrap),
                WrapCtrl::Internal | WrapCtrl::TieFalse => None,
            },
            change: match self.change_ctrl() {
                ChangeCtrl::External => Some(wrap && ctrl_in.change.unwrap_or(false)),
                ChangeCtrl::TieTrue => None,
            },
            reset: ctrl_in.reset,
        };

        (CounterOutput { out: count, ctrl }, count_next)
    }
}

/// Counter instance: a validated configuration and the count it exclusively owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    config: ValidatedConfig,
    ports: Ports,
    count: u64,
}

impl Counter {
    /// Creates a new counter holding its reset value.
    pub fn new(config: ValidatedConfig) -> Self { Self { config, ports: Ports::new(&config), count: config.init() } }

    /// Returns the configuration.
    pub fn config(&self) -> &ValidatedConfig { &self.config }

    /// Returns the declared ports.
    pub fn ports(&self) -> &Ports { &self.ports }

    /// Returns the current count.
    pub fn count(&self) -> u64 { self.count }

    /// Advances the counter by one step.
    ///
    /// The returned `out` is the count before the update; the updated count becomes visible on the next step.
    pub fn step(&mut self, input: &CounterInput) -> Result<CounterOutput, PortError> {
        self.ports.check(input)?;
        let (output, count_next) = self.config.transition(input, &self.count);
        if output.ctrl.reset {
            trace!(count = self.count, reset_val = count_next, "counter reset");
        } else if count_next != self.count {
            trace!(count = self.count, count_next, "counter updated");
        }
        self.count = count_next;
        Ok(output)
    }
}
