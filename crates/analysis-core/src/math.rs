//! Shared numeric helpers for the indicator calculators.
//!
//! Every function here follows the same degradation rule as [`Metric`]:
//! undefined operands and empty inputs yield `Undefined`, never NaN and never
//! a panic.

use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::Metric;

/// Division with the safe-divide rule: `Undefined` when the denominator is
/// zero or either operand is undefined.
pub fn safe_divide(numerator: Metric, denominator: Metric) -> Metric {
    match (numerator, denominator) {
        (Metric::Defined(n), Metric::Defined(d)) if d != 0.0 => Metric::new(n / d),
        _ => Metric::Undefined,
    }
}

/// Percentage change from `previous` to `current`, ×100. Undefined when the
/// previous value is zero or either operand is undefined.
pub fn percentage_change(previous: Metric, current: Metric) -> Metric {
    safe_divide(current.sub(previous), previous).map(|v| v * 100.0)
}

/// Period-over-period percentage changes for a value sequence. The result has
/// one entry per consecutive pair; a change is undefined unless both values
/// are defined and the earlier one is nonzero.
pub fn period_changes(values: &[Metric]) -> Vec<Metric> {
    values
        .windows(2)
        .map(|w| percentage_change(w[0], w[1]))
        .collect()
}

fn defined_values(values: &[Metric]) -> Vec<f64> {
    values.iter().filter_map(Metric::value).collect()
}

/// Mean over the defined entries; `Undefined` when none are defined.
pub fn mean(values: &[Metric]) -> Metric {
    let defined = defined_values(values);
    if defined.is_empty() {
        return Metric::Undefined;
    }
    Metric::new((&defined).mean())
}

/// Mean over the defined entries of the last `n` values.
pub fn tail_mean(values: &[Metric], n: usize) -> Metric {
    let start = values.len().saturating_sub(n);
    mean(&values[start..])
}

/// Sample standard deviation over the defined entries; `Undefined` with fewer
/// than two of them.
pub fn std_dev(values: &[Metric]) -> Metric {
    let defined = defined_values(values);
    if defined.len() < 2 {
        return Metric::Undefined;
    }
    Metric::new((&defined).std_dev())
}

/// Round a plain value to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Median over the defined entries; `Undefined` when none are defined.
pub fn median(values: &[Metric]) -> Metric {
    let defined = defined_values(values);
    if defined.is_empty() {
        return Metric::Undefined;
    }
    Metric::new(Data::new(defined).median())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn safe_divide_never_raises() {
        assert_eq!(
            safe_divide(Metric::Defined(10.0), Metric::Defined(0.0)),
            Metric::Undefined
        );
        assert_eq!(
            safe_divide(Metric::Undefined, Metric::Defined(3.0)),
            Metric::Undefined
        );
        assert_eq!(
            safe_divide(Metric::Defined(10.0), Metric::Undefined),
            Metric::Undefined
        );
        assert_eq!(
            safe_divide(Metric::Defined(10.0), Metric::Defined(4.0)),
            Metric::Defined(2.5)
        );
    }

    #[test]
    fn percentage_change_handles_zero_base() {
        assert_eq!(
            percentage_change(Metric::Defined(0.0), Metric::Defined(5.0)),
            Metric::Undefined
        );
        assert_relative_eq!(
            percentage_change(Metric::Defined(100.0), Metric::Defined(110.0))
                .value()
                .unwrap(),
            10.0
        );
    }

    #[test]
    fn period_changes_skip_gaps() {
        let values = [
            Metric::Defined(100.0),
            Metric::Undefined,
            Metric::Defined(121.0),
        ];
        let changes = period_changes(&values);
        assert_eq!(changes, vec![Metric::Undefined, Metric::Undefined]);
    }

    #[test]
    fn mean_and_std_skip_undefined() {
        let values = [
            Metric::Defined(10.0),
            Metric::Undefined,
            Metric::Defined(20.0),
        ];
        assert_relative_eq!(mean(&values).value().unwrap(), 15.0);
        // Sample std dev of [10, 20]
        assert_relative_eq!(std_dev(&values).value().unwrap(), 7.0710678, epsilon = 1e-6);
        assert_eq!(std_dev(&values[..2]), Metric::Undefined);
    }

    #[test]
    fn tail_mean_takes_last_n() {
        let values = [
            Metric::Defined(1.0),
            Metric::Defined(2.0),
            Metric::Defined(3.0),
            Metric::Defined(4.0),
        ];
        assert_relative_eq!(tail_mean(&values, 3).value().unwrap(), 3.0);
        assert_relative_eq!(tail_mean(&values, 10).value().unwrap(), 2.5);
    }

    #[test]
    fn median_skips_undefined() {
        let values = [
            Metric::Defined(1.0),
            Metric::Undefined,
            Metric::Defined(3.0),
            Metric::Defined(2.0),
        ];
        assert_relative_eq!(median(&values).value().unwrap(), 2.0);
        assert_eq!(median(&[Metric::Undefined]), Metric::Undefined);
    }
}
