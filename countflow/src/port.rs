//! Per-step inputs and outputs of a counter.
//!
//! Which optional inputs exist is decided by the configuration. [`Ports`] captures that decision once, and
//! [`Ports::check`] is the only place a step's inputs are matched against it.

use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::config::ValidatedConfig;

/// Control inputs of a counter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtrlIn {
    /// Wrap request. Present iff the wrap control is external.
    pub wrap: Option<bool>,
    /// Update request. Present iff the change control is external.
    pub change: Option<bool>,
    /// Synchronous reset.
    pub reset: bool,
}

/// Control outputs of a counter, used to drive a downstream counter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtrlOut {
    /// Wrap decision. Present iff the wrap control is external.
    pub wrap: Option<bool>,
    /// Asserted when the counter updates and wraps in the same step. Present iff the change control is external.
    pub change: Option<bool>,
    /// Reset, forwarded unchanged.
    pub reset: bool,
}

/// Which optional fields a control bundle carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtrlShape {
    /// `wrap` is present.
    pub wrap: bool,
    /// `change` is present.
    pub change: bool,
}

impl CtrlIn {
    /// Control input that only drives `reset`.
    pub fn reset(reset: bool) -> Self { Self { wrap: None, change: None, reset } }

    /// Sets the wrap request.
    pub fn with_wrap(self, wrap: bool) -> Self { Self { wrap: Some(wrap), ..self } }

    /// Sets the update request.
    pub fn with_change(self, change: bool) -> Self { Self { change: Some(change), ..self } }

    /// Returns which optional fields are present.
    pub fn shape(&self) -> CtrlShape { CtrlShape { wrap: self.wrap.is_some(), change: self.change.is_some() } }
}

impl CtrlOut {
    /// Returns which optional fields are present.
    pub fn shape(&self) -> CtrlShape { CtrlShape { wrap: self.wrap.is_some(), change: self.change.is_some() } }
}

impl From<CtrlOut> for CtrlIn {
    fn from(out: CtrlOut) -> Self { Self { wrap: out.wrap, change: out.change, reset: out.reset } }
}

/// Inputs of one counter step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterInput {
    /// Selects counting down for this step. Present iff the count type is up/down.
    pub up_down: Option<bool>,
    /// Increment of this step. Present iff the increment bound is not 1.
    pub inc: Option<u64>,
    /// Wrap target of this step. Present iff the counter has a custom wrap.
    pub wrap_to: Option<u64>,
    /// Effective ceiling of this step. Present iff the wrap is internal and the count type is not modulo.
    pub max: Option<u64>,
    /// Modulus of this step. Present iff the count type is modulo.
    pub mod_n: Option<u64>,
    /// Control inputs.
    pub ctrl: CtrlIn,
}

impl CounterInput {
    /// Input with no optional data fields and the given control bundle.
    pub fn new(ctrl: CtrlIn) -> Self { Self { ctrl, ..Self::default() } }

    /// Sets `up_down`.
    pub fn up_down(self, up_down: bool) -> Self { Self { up_down: Some(up_down), ..self } }

    /// Sets `inc`.
    pub fn inc(self, inc: u64) -> Self { Self { inc: Some(inc), ..self } }

    /// Sets `wrap_to`.
    pub fn wrap_to(self, wrap_to: u64) -> Self { Self { wrap_to: Some(wrap_to), ..self } }

    /// Sets `max`.
    pub fn max(self, max: u64) -> Self { Self { max: Some(max), ..self } }

    /// Sets `mod_n`.
    pub fn mod_n(self, mod_n: u64) -> Self { Self { mod_n: Some(mod_n), ..self } }
}

/// Outputs of one counter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterOutput {
    /// Count before this step's update.
    pub out: u64,
    /// Control outputs.
    pub ctrl: CtrlOut,
}

#[allow(missing_docs)]
#[allow(variant_size_differences)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("input `{0}` is required by the configuration but missing")]
    Missing(&'static str),
    #[error("input `{0}` is not declared by the configuration")]
    Unexpected(&'static str),
    #[error("input `{port}` has value {value}, outside [{min}, {max}]")]
    OutOfRange { port: &'static str, value: u64, min: u64, max: u64 },
}

/// A declared port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Port {
    /// Port name.
    pub name: &'static str,
    /// Bit width.
    pub width: u32,
}

/// The input ports a configuration declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ports {
    config: ValidatedConfig,
}

impl Ports {
    /// Derives the ports of `config`.
    pub fn new(config: &ValidatedConfig) -> Self { Self { config: *config } }

    /// Shape of the control input bundle.
    pub fn ctrl_in_shape(&self) -> CtrlShape {
        CtrlShape { wrap: self.config.has_wrap_ctrl(), change: self.config.has_change_ctrl() }
    }

    /// Shape of the control output bundle. It mirrors the control input bundle.
    pub fn ctrl_out_shape(&self) -> CtrlShape { self.ctrl_in_shape() }

    /// Iterates over the declared input ports in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        let config = self.config;
        let ports = [
            (config.has_up_down(), "up_down", 1),
            (config.has_inc(), "inc", config.inc_width()),
            (config.has_wrap_to(), "wrap_to", config.count_width()),
            (config.has_max(), "max", config.count_width()),
            (config.has_mod_n(), "mod_n", config.mod_n_width()),
            (config.has_wrap_ctrl(), "ctrl_in_wrap", 1),
            (config.has_change_ctrl(), "ctrl_in_change", 1),
            (true, "ctrl_in_reset", 1),
        ];
        ports.into_iter().filter(|(present, ..)| *present).map(|(_, name, width)| Port { name, width })
    }

    /// Checks that `input` carries exactly the declared inputs, each within its range.
    pub fn check(&self, input: &CounterInput) -> Result<(), PortError> {
        let config = &self.config;
        let count_max = config.count_max();

        presence("up_down", config.has_up_down(), input.up_down)?;
        presence("inc", config.has_inc(), input.inc)?;
        presence("wrap_to", config.has_wrap_to(), input.wrap_to)?;
        presence("max", config.has_max(), input.max)?;
        presence("mod_n", config.has_mod_n(), input.mod_n)?;
        presence("ctrl_in_wrap", config.has_wrap_ctrl(), input.ctrl.wrap)?;
        presence("ctrl_in_change", config.has_change_ctrl(), input.ctrl.change)?;

        range("inc", input.inc, 0, config.inc_max())?;
        range("wrap_to", input.wrap_to, 0, count_max)?;
        range("max", input.max, 0, count_max)?;
        range("mod_n", input.mod_n, 1, count_max.saturating_add(1))?;
        Ok(())
    }
}

impl fmt::Display for Ports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.iter().map(|port| format!("{}[{}]", port.name, port.width)).join(", "))
    }
}

fn presence<T>(port: &'static str, declared: bool, value: Option<T>) -> Result<(), PortError> {
    match (declared, value.is_some()) {
        (true, false) => Err(PortError::Missing(port)),
        (false, true) => Err(PortError::Unexpected(port)),
        _ => Ok(()),
    }
}

fn range(port: &'static str, value: Option<u64>, min: u64, max: u64) -> Result<(), PortError> {
    match value {
        Some(value) if value < min || value > max => Err(PortError::OutOfRange { port, value, min, max }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CountType, CounterConfig, CtrlLoc};

    fn ports(config: CounterConfig) -> Ports { Ports::new(&config.validate().unwrap()) }

    #[test]
    fn plain_counter_only_has_max_and_reset() {
        let ports = ports(CounterConfig::new(7));
        assert_eq!(ports.to_string(), "max[3], ctrl_in_reset[1]");
        assert_eq!(ports.check(&CounterInput::new(CtrlIn::reset(false)).max(7)), Ok(()));
        assert_eq!(ports.check(&CounterInput::new(CtrlIn::reset(false))), Err(PortError::Missing("max")));
        assert_eq!(
            ports.check(&CounterInput::new(CtrlIn::reset(false)).max(7).inc(1)),
            Err(PortError::Unexpected("inc"))
        );
    }

    #[test]
    fn modulo_counter_ports() {
        let ports = ports(
            CounterConfig::new(9).count_type(CountType::UpMod).inc_max(3).change_ctrl(CtrlLoc::External),
        );
        let names = ports.iter().map(|port| port.name).collect::<Vec<_>>();
        assert_eq!(names, ["inc", "mod_n", "ctrl_in_change", "ctrl_in_reset"]);
        assert_eq!(ports.ctrl_in_shape(), CtrlShape { wrap: false, change: true });

        let input = CounterInput::new(CtrlIn::reset(false).with_change(true)).inc(3).mod_n(10);
        assert_eq!(ports.check(&input), Ok(()));
        assert_eq!(
            ports.check(&input.mod_n(0)),
            Err(PortError::OutOfRange { port: "mod_n", value: 0, min: 1, max: 10 })
        );
        assert_eq!(ports.check(&input.inc(4)), Err(PortError::OutOfRange { port: "inc", value: 4, min: 0, max: 3 }));
    }

    #[test]
    fn external_controls_are_required() {
        let ports = ports(
            CounterConfig::new(3)
                .wrap_ctrl(CtrlLoc::External)
                .change_ctrl(CtrlLoc::External)
                .custom_wrap(true)
                .count_type(CountType::UpDown),
        );
        let input = CounterInput::new(CtrlIn::reset(false).with_change(true)).up_down(false).wrap_to(2);
        assert_eq!(ports.check(&input), Err(PortError::Missing("ctrl_in_wrap")));

        let input = CounterInput { ctrl: input.ctrl.with_wrap(false), ..input };
        assert_eq!(ports.check(&input), Ok(()));
        assert_eq!(
            ports.check(&input.wrap_to(4)),
            Err(PortError::OutOfRange { port: "wrap_to", value: 4, min: 0, max: 3 })
        );
    }

    #[test]
    fn ctrl_out_feeds_ctrl_in() {
        let out = CtrlOut { wrap: None, change: Some(true), reset: true };
        let ctrl = CtrlIn::from(out);
        assert_eq!(ctrl, CtrlIn::reset(true).with_change(true));
        assert_eq!(ctrl.shape(), out.shape());
    }
}
