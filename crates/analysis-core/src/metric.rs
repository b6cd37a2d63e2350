use serde::de::Deserializer;
use serde::{Deserialize, Serialize, Serializer};

/// A single numeric metric: either a defined finite value or explicitly
/// undefined.
///
/// "Undefined" is distinct from zero. A company reporting zero inventory has
/// `Defined(0.0)`; a company whose statements never mention inventory has
/// `Undefined`. Arithmetic on metrics propagates `Undefined` instead of
/// producing NaN or panicking, and the constructors reject non-finite input,
/// so a `Defined` value is always a real number.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Metric {
    Defined(f64),
    #[default]
    Undefined,
}

impl Metric {
    /// Wrap a raw value, mapping NaN and infinities to `Undefined`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Metric::Defined(value)
        } else {
            Metric::Undefined
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Metric::Undefined, Metric::new)
    }

    pub const fn is_defined(&self) -> bool {
        matches!(self, Metric::Defined(_))
    }

    pub const fn value(&self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(*v),
            Metric::Undefined => None,
        }
    }

    pub fn unwrap_or(self, default: f64) -> f64 {
        match self {
            Metric::Defined(v) => v,
            Metric::Undefined => default,
        }
    }

    /// Apply `f` to a defined value; the result is re-checked for finiteness.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Metric::Defined(v) => Metric::new(f(v)),
            Metric::Undefined => Metric::Undefined,
        }
    }

    pub fn add(self, other: Metric) -> Metric {
        match (self, other) {
            (Metric::Defined(a), Metric::Defined(b)) => Metric::new(a + b),
            _ => Metric::Undefined,
        }
    }

    pub fn sub(self, other: Metric) -> Metric {
        match (self, other) {
            (Metric::Defined(a), Metric::Defined(b)) => Metric::new(a - b),
            _ => Metric::Undefined,
        }
    }

    pub fn mul(self, other: Metric) -> Metric {
        match (self, other) {
            (Metric::Defined(a), Metric::Defined(b)) => Metric::new(a * b),
            _ => Metric::Undefined,
        }
    }

    /// Round a defined value to `decimals` places (display convention carried
    /// through the indicator outputs).
    pub fn rounded(self, decimals: u32) -> Metric {
        let factor = 10f64.powi(decimals as i32);
        self.map(|v| (v * factor).round() / factor)
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Defined(v) => serializer.serialize_f64(*v),
            Metric::Undefined => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Metric::from_option(Option::<f64>::deserialize(deserializer)?))
    }
}

/// A coverage ratio (operating income or EBITDA over interest expense).
///
/// `Unbounded` marks the no-interest-burden case: a company with zero or
/// unreported interest expense. It is not a numeric infinity: it carries
/// through scoring as its own state and always outranks any finite coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    Finite(f64),
    Unbounded,
    Undefined,
}

impl Coverage {
    /// Build a coverage ratio from a numerator and an interest-expense metric.
    /// Interest that is zero, negative, or undefined means no measurable
    /// interest burden.
    pub fn from_ratio(numerator: Metric, interest_expense: Metric) -> Self {
        match interest_expense {
            Metric::Defined(i) if i > 0.0 => match numerator {
                Metric::Defined(n) => Coverage::Finite(n / i),
                Metric::Undefined => Coverage::Undefined,
            },
            _ => Coverage::Unbounded,
        }
    }

    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Coverage::Unbounded)
    }

    pub const fn as_finite(&self) -> Option<f64> {
        match self {
            Coverage::Finite(v) => Some(*v),
            _ => None,
        }
    }

    /// `Unbounded` exceeds every threshold; `Undefined` exceeds none.
    pub fn exceeds(&self, threshold: f64) -> bool {
        match self {
            Coverage::Finite(v) => *v > threshold,
            Coverage::Unbounded => true,
            Coverage::Undefined => false,
        }
    }
}
