//! Counter configuration and its validator.
//!
//! A [`CounterConfig`] is the raw, elaboration-time description of a counter. It is only usable after
//! [`validate`] turns it into a [`ValidatedConfig`], which is immutable for the lifetime of the counter.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::num::bits_for;

/// Location of a control decision.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CtrlLoc {
    /// Driven by the caller through a control input.
    External,
    /// Derived by the counter itself.
    #[default]
    Internal,
    /// Constant false.
    TieFalse,
    /// Constant true.
    TieTrue,
}

/// Counting direction and semantics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountType {
    /// Counts upward.
    #[default]
    Up,
    /// Counts downward.
    Down,
    /// Counts upward or downward, selected per step.
    UpDown,
    /// Counts upward modulo a per-step modulus.
    UpMod,
}

/// Where the wrap decision of a validated counter comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapCtrl {
    /// Taken from `ctrl_in.wrap`.
    External,
    /// Derived from the count type.
    Internal,
    /// Never wraps.
    TieFalse,
}

/// Where the update decision of a validated counter comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeCtrl {
    /// Taken from `ctrl_in.change`.
    External,
    /// Updates on every step.
    TieTrue,
}

impl From<WrapCtrl> for CtrlLoc {
    fn from(ctrl: WrapCtrl) -> Self {
        match ctrl {
            WrapCtrl::External => Self::External,
            WrapCtrl::Internal => Self::Internal,
            WrapCtrl::TieFalse => Self::TieFalse,
        }
    }
}

impl From<ChangeCtrl> for CtrlLoc {
    fn from(ctrl: ChangeCtrl) -> Self {
        match ctrl {
            ChangeCtrl::External => Self::External,
            ChangeCtrl::TieTrue => Self::TieTrue,
        }
    }
}

/// Raw counter parameters.
///
/// Integers are signed so that every out-of-range value a caller can write down is representable and rejected by
/// [`validate`] with a precise error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterConfig {
    /// Inclusive upper bound of the count.
    pub count_max: i64,
    /// Upper bound of the per-step increment.
    #[serde(default = "default_inc_max")]
    pub inc_max: i64,
    /// Value loaded on reset.
    #[serde(default)]
    pub reset_val: i64,
    /// Source of the wrap decision.
    #[serde(default)]
    pub wrap_ctrl: CtrlLoc,
    /// Source of the update decision.
    #[serde(default = "default_change_ctrl")]
    pub change_ctrl: CtrlLoc,
    /// Counting direction.
    #[serde(default)]
    pub count_type: CountType,
    /// Whether the wrap target is supplied per step.
    #[serde(default)]
    pub custom_wrap: bool,
    /// Accumulated timing offset of the inputs, carried as metadata.
    #[serde(default)]
    pub input_delay: i64,
}

fn default_inc_max() -> i64 { 1 }

fn default_change_ctrl() -> CtrlLoc { CtrlLoc::TieTrue }

impl CounterConfig {
    /// Creates a plain up-counter over `[0, count_max]` that wraps internally and updates on every step.
    pub fn new(count_max: i64) -> Self {
        Self {
            count_max,
            inc_max: default_inc_max(),
            reset_val: 0,
            wrap_ctrl: CtrlLoc::Internal,
            change_ctrl: default_change_ctrl(),
            count_type: CountType::Up,
            custom_wrap: false,
            input_delay: 0,
        }
    }

    /// Sets the increment bound.
    pub fn inc_max(self, inc_max: i64) -> Self { Self { inc_max, ..self } }

    /// Sets the reset value.
    pub fn reset_val(self, reset_val: i64) -> Self { Self { reset_val, ..self } }

    /// Sets the wrap control location.
    pub fn wrap_ctrl(self, wrap_ctrl: CtrlLoc) -> Self { Self { wrap_ctrl, ..self } }

    /// Sets the change control location.
    pub fn change_ctrl(self, change_ctrl: CtrlLoc) -> Self { Self { change_ctrl, ..self } }

    /// Sets the count type.
    pub fn count_type(self, count_type: CountType) -> Self { Self { count_type, ..self } }

    /// Enables or disables the per-step wrap target.
    pub fn custom_wrap(self, custom_wrap: bool) -> Self { Self { custom_wrap, ..self } }

    /// Sets the input delay metadata.
    pub fn input_delay(self, input_delay: i64) -> Self { Self { input_delay, ..self } }

    /// Validates the configuration. See [`validate`].
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> { validate(self) }
}

#[allow(missing_docs)]
#[allow(variant_size_differences)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invariant 1 violated: input delay must be non-negative, got {0}")]
    NegativeInputDelay(i64),
    #[error("invariant 2 violated: count max must be non-negative, got {0}")]
    NegativeCountMax(i64),
    #[error("invariant 3 violated: reset value {reset_val} is outside [0, {count_max}]")]
    ResetValOutOfRange { reset_val: i64, count_max: i64 },
    #[error("invariant 4 violated: increment max {inc_max} is outside (0, {count_max}]")]
    IncMaxOutOfRange { inc_max: i64, count_max: i64 },
    #[error("invariant 5 violated: wrap control cannot be tied true")]
    WrapTiedTrue,
    #[error("invariant 6 violated: change control must be external or tied true, got {0:?}")]
    IllegalChangeCtrl(CtrlLoc),
    #[error("invariant 7 violated: {count_type:?} counter with increment max {inc_max} needs an internal custom wrap")]
    BackwardStepNeedsInternalWrap { count_type: CountType, inc_max: u64 },
    #[error("invariant 8 violated: up counter with increment max {inc_max} cannot use an external wrap with the default target")]
    UpStepExternalDefaultWrap { inc_max: u64 },
}

impl ConfigError {
    /// Returns the number of the violated invariant.
    pub fn invariant(&self) -> u8 {
        match self {
            Self::NegativeInputDelay(_) => 1,
            Self::NegativeCountMax(_) => 2,
            Self::ResetValOutOfRange { .. } => 3,
            Self::IncMaxOutOfRange { .. } => 4,
            Self::WrapTiedTrue => 5,
            Self::IllegalChangeCtrl(_) => 6,
            Self::BackwardStepNeedsInternalWrap { .. } => 7,
            Self::UpStepExternalDefaultWrap { .. } => 8,
        }
    }
}

/// Counter configuration that satisfies every invariant.
///
/// The only way to obtain one is through [`validate`], so downstream code never re-checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CounterConfig", into = "CounterConfig")]
pub struct ValidatedConfig {
    count_max: u64,
    inc_max: u64,
    reset_val: u64,
    wrap_ctrl: WrapCtrl,
    change_ctrl: ChangeCtrl,
    count_type: CountType,
    custom_wrap: bool,
    input_delay: u64,
}

impl ValidatedConfig {
    /// Inclusive upper bound of the count.
    pub fn count_max(&self) -> u64 { self.count_max }

    /// Upper bound of the per-step increment.
    pub fn inc_max(&self) -> u64 { self.inc_max }

    /// Value loaded on reset.
    pub fn reset_val(&self) -> u64 { self.reset_val }

    /// Source of the wrap decision.
    pub fn wrap_ctrl(&self) -> WrapCtrl { self.wrap_ctrl }

    /// Source of the update decision.
    pub fn change_ctrl(&self) -> ChangeCtrl { self.change_ctrl }

    /// Counting direction.
    pub fn count_type(&self) -> CountType { self.count_type }

    /// Whether the wrap target is supplied per step.
    pub fn custom_wrap(&self) -> bool { self.custom_wrap }

    /// Accumulated timing offset of the inputs.
    pub fn input_delay(&self) -> u64 { self.input_delay }

    /// Width of the count register, and of every count-valued port.
    pub fn count_width(&self) -> u32 { bits_for(self.count_max) }

    /// Width of the increment port.
    pub fn inc_width(&self) -> u32 { bits_for(self.inc_max) }

    /// Width of the modulus port, wide enough for `count_max + 1`.
    pub fn mod_n_width(&self) -> u32 { bits_for(self.count_max.saturating_add(1)) }

    /// Whether the step has an `up_down` input.
    pub fn has_up_down(&self) -> bool { self.count_type == CountType::UpDown }

    /// Whether the step has an `inc` input.
    pub fn has_inc(&self) -> bool { self.inc_max != 1 }

    /// Whether the step has a `wrap_to` input.
    pub fn has_wrap_to(&self) -> bool { self.custom_wrap }

    /// Whether the step has a `max` input.
    pub fn has_max(&self) -> bool { self.wrap_ctrl == WrapCtrl::Internal && self.count_type != CountType::UpMod }

    /// Whether the step has a `mod_n` input.
    pub fn has_mod_n(&self) -> bool { self.count_type == CountType::UpMod }

    /// Whether the control bundles carry a `wrap` field.
    pub fn has_wrap_ctrl(&self) -> bool { self.wrap_ctrl == WrapCtrl::External }

    /// Whether the control bundles carry a `change` field.
    pub fn has_change_ctrl(&self) -> bool { self.change_ctrl == ChangeCtrl::External }
}

impl TryFrom<CounterConfig> for ValidatedConfig {
    type Error = ConfigError;

    fn try_from(config: CounterConfig) -> Result<Self, Self::Error> { validate(config) }
}

impl From<ValidatedConfig> for CounterConfig {
    fn from(config: ValidatedConfig) -> Self {
        // Every field fits in `i64`: validation started from `i64` values.
        Self {
            count_max: config.count_max as i64,
            inc_max: config.inc_max as i64,
            reset_val: config.reset_val as i64,
            wrap_ctrl: config.wrap_ctrl.into(),
            change_ctrl: config.change_ctrl.into(),
            count_type: config.count_type,
            custom_wrap: config.custom_wrap,
            input_delay: config.input_delay as i64,
        }
    }
}

/// Validates a counter configuration.
///
/// Invariants are checked in order and the first violation is returned.
pub fn validate(config: CounterConfig) -> Result<ValidatedConfig, ConfigError> {
    let result = check(config);
    match &result {
        Ok(_) => debug!(?config, "counter configuration accepted"),
        Err(error) => debug!(?config, %error, "counter configuration rejected"),
    }
    result
}

fn check(config: CounterConfig) -> Result<ValidatedConfig, ConfigError> {
    let CounterConfig { count_max, inc_max, reset_val, wrap_ctrl, change_ctrl, count_type, custom_wrap, input_delay } =
        config;

    let input_delay = u64::try_from(input_delay).map_err(|_| ConfigError::NegativeInputDelay(input_delay))?;
    let count_max_u = u64::try_from(count_max).map_err(|_| ConfigError::NegativeCountMax(count_max))?;

    if !(0..=count_max).contains(&reset_val) {
        return Err(ConfigError::ResetValOutOfRange { reset_val, count_max });
    }
    if inc_max <= 0 || inc_max > count_max {
        return Err(ConfigError::IncMaxOutOfRange { inc_max, count_max });
    }
    // Both are within `[0, count_max]` now.
    let reset_val = reset_val as u64;
    let inc_max = inc_max as u64;

    let wrap_ctrl = match wrap_ctrl {
        CtrlLoc::External => WrapCtrl::External,
        CtrlLoc::Internal => WrapCtrl::Internal,
        CtrlLoc::TieFalse => WrapCtrl::TieFalse,
        CtrlLoc::TieTrue => return Err(ConfigError::WrapTiedTrue),
    };
    let change_ctrl = match change_ctrl {
        CtrlLoc::External => ChangeCtrl::External,
        CtrlLoc::TieTrue => ChangeCtrl::TieTrue,
        loc @ (CtrlLoc::Internal | CtrlLoc::TieFalse) => return Err(ConfigError::IllegalChangeCtrl(loc)),
    };

    let multi_step = inc_max > 1;
    match count_type {
        CountType::UpDown | CountType::Down => {
            if multi_step && !(custom_wrap && wrap_ctrl == WrapCtrl::Internal) {
                return Err(ConfigError::BackwardStepNeedsInternalWrap { count_type, inc_max });
            }
        }
        CountType::Up => {
            if multi_step && wrap_ctrl == WrapCtrl::External && !custom_wrap {
                return Err(ConfigError::UpStepExternalDefaultWrap { inc_max });
            }
        }
        CountType::UpMod => {}
    }

    Ok(ValidatedConfig {
        count_max: count_max_u,
        inc_max,
        reset_val,
        wrap_ctrl,
        change_ctrl,
        count_type,
        custom_wrap,
        input_delay,
    })
}
