//! Reference process: a counter that grows linearly with time.

use serde_json::{Value, json};

use simproc_config::DEFAULT_RATE;

use super::{Process, number_value};

/// Counter advanced by `rate` units per unit of interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterProcess {
    rate: f64,
}

impl Default for CounterProcess {
    fn default() -> Self {
        Self::new(DEFAULT_RATE)
    }
}

impl CounterProcess {
    /// Builds a counter with the given rate.
    #[must_use]
    pub const fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Process for CounterProcess {
    fn inputs(&self) -> Value {
        json!({
            "counter": {"_type": "number"}
        })
    }

    fn outputs(&self) -> Value {
        json!({
            "counter": {"_type": "number", "_apply": "set"}
        })
    }

    fn update(&mut self, state: &Value, interval: f64) -> Value {
        let current = state
            .get("counter")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        #[expect(clippy::float_arithmetic, reason = "the counter is a float model")]
        let next = current + self.rate * interval;
        json!({ "counter": number_value(next) })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1.0, json!({"counter": 5}), 2.0, json!({"counter": 7}))]
    #[case(0.5, json!({"counter": 1}), 3.0, json!({"counter": 2.5}))]
    #[case(2.0, json!({"counter": -4}), 0.0, json!({"counter": -4}))]
    #[case(1.0, json!({"counter": 1.25}), 0.25, json!({"counter": 1.5}))]
    fn adds_rate_times_interval(
        #[case] rate: f64,
        #[case] state: Value,
        #[case] interval: f64,
        #[case] expected: Value,
    ) {
        let mut counter = CounterProcess::new(rate);
        assert_eq!(counter.update(&state, interval), expected);
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"counter": "three"}))]
    #[case(json!({"counter": null}))]
    #[case(json!({"other": 9}))]
    #[case(json!([1, 2]))]
    fn missing_or_malformed_counter_starts_at_zero(#[case] state: Value) {
        let mut counter = CounterProcess::default();
        assert_eq!(counter.update(&state, 4.0), json!({"counter": 4}));
    }

    #[test]
    fn schemas_are_stable() {
        let counter = CounterProcess::default();
        assert_eq!(counter.inputs(), counter.inputs());
        assert_eq!(
            counter.outputs(),
            json!({"counter": {"_type": "number", "_apply": "set"}})
        );
    }

    #[test]
    fn repeated_steps_match_a_single_long_step() {
        let mut counter = CounterProcess::new(1.5);
        let mut state = json!({"counter": 2});
        for _ in 0..8 {
            state = counter.update(&state, 0.25);
        }
        let single = counter.update(&json!({"counter": 2}), 2.0);
        assert_eq!(state, single);
    }

    #[test]
    fn update_keeps_no_state_between_calls() {
        let mut counter = CounterProcess::default();
        let first = counter.update(&json!({"counter": 1}), 1.0);
        let second = counter.update(&json!({"counter": 1}), 1.0);
        assert_eq!(first, second);
    }
}
