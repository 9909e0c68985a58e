//! Simulated processes exposed over the command protocol.
//!
//! A process describes the variables it accepts ([`Process::inputs`]), the
//! variables it produces ([`Process::outputs`]), and advances a caller-supplied
//! state by a time interval ([`Process::update`]). Each connection owns its own
//! instance, built by [`construct`] from the shared [`ProcessConfig`].
//!
//! New variants are added to [`ProcessKind`]; callers only ever see
//! `Box<dyn Process>`.

mod counter;

use serde_json::{Number, Value};
use tracing::warn;

use simproc_config::ProcessConfig;

pub use self::counter::CounterProcess;

/// Tracing target for process construction.
pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Behaviour shared by every simulated process.
pub trait Process: Send {
    /// Descriptor of the state variables the process reads.
    ///
    /// Maps each variable name to an object carrying at least `_type`.
    fn inputs(&self) -> Value;

    /// Descriptor of the variables the process writes, including the
    /// `_apply` merge semantics for each.
    fn outputs(&self) -> Value;

    /// Advances `state` by `interval` and returns the updated variables.
    ///
    /// Implementations must tolerate missing or mistyped variables by falling
    /// back to a per-variable default and must not fail for any JSON input.
    fn update(&mut self, state: &Value, interval: f64) -> Value;
}

/// Known process variants, selected by the record's `process` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessKind {
    /// `counter(t + dt) = counter(t) + rate * dt`.
    Counter,
}

impl ProcessKind {
    /// Every registered variant.
    pub const ALL: &'static [Self] = &[Self::Counter];

    /// Looks up a variant by its exact name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }

    /// Canonical name used in process records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
        }
    }

    fn build(self, config: &ProcessConfig) -> Box<dyn Process> {
        match self {
            Self::Counter => Box::new(CounterProcess::new(config.rate())),
        }
    }
}

/// Builds a fresh process from the shared record.
///
/// Unknown names fall back to a counter with default parameters; the
/// record's own parameters are ignored in that case.
#[must_use]
pub fn construct(config: &ProcessConfig) -> Box<dyn Process> {
    if let Some(kind) = ProcessKind::parse(config.name()) {
        return kind.build(config);
    }
    warn!(
        target: PROCESS_TARGET,
        process = config.name(),
        fallback = ProcessKind::Counter.as_str(),
        "unknown process name, using default counter"
    );
    Box::new(CounterProcess::default())
}

/// Largest magnitude below which every integral `f64` is exactly an `i64`.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Encodes a float so integral values print without a fractional part.
///
/// Non-finite values have no JSON representation and become `null`.
pub(crate) fn number_value(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= EXACT_INTEGER_LIMIT {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "integral and within the exactly representable range"
        )]
        let integral = value as i64;
        return Value::from(integral);
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}
