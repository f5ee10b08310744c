use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Inclusive range and step for a constrained integer.
///
/// Setters clamp out-of-range values into `[lower, upper]`. The range is
/// never inverted: [`IntConstraints::new`] and deserialization both check it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IntRange")]
pub struct IntConstraints {
    lower: i64,
    upper: i64,
    step: i64,
}

#[derive(Deserialize)]
struct IntRange {
    lower: i64,
    upper: i64,
    step: i64,
}

impl TryFrom<IntRange> for IntConstraints {
    type Error = TypesError;

    fn try_from(r: IntRange) -> Result<Self, Self::Error> {
        Self::new(r.lower, r.upper, r.step)
    }
}

impl IntConstraints {
    /// The fixed range used by percentage properties.
    pub const PERCENT: IntConstraints = IntConstraints {
        lower: 0,
        upper: 100,
        step: 1,
    };

    pub const UNBOUNDED: IntConstraints = IntConstraints {
        lower: i64::MIN,
        upper: i64::MAX,
        step: 1,
    };

    pub fn new(lower: i64, upper: i64, step: i64) -> Result<Self, TypesError> {
        if lower > upper {
            return Err(TypesError::InvalidRange {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }
        Ok(Self { lower, upper, step })
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.lower, self.upper)
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

impl Default for IntConstraints {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Inclusive range and step for a constrained float.
///
/// Setters clamp out-of-range values into `[lower, upper]`. NaN is kept as is.
/// Bounds are ordered and never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FloatRange")]
pub struct FloatConstraints {
    lower: f64,
    upper: f64,
    step: f64,
}

#[derive(Deserialize)]
struct FloatRange {
    lower: f64,
    upper: f64,
    step: f64,
}

impl TryFrom<FloatRange> for FloatConstraints {
    type Error = TypesError;

    fn try_from(r: FloatRange) -> Result<Self, Self::Error> {
        Self::new(r.lower, r.upper, r.step)
    }
}

impl FloatConstraints {
    /// Non-negative precision values, stepping by a thousandth.
    pub const PRECISION: FloatConstraints = FloatConstraints {
        lower: 0.0,
        upper: f64::MAX,
        step: 0.001,
    };

    pub const UNBOUNDED: FloatConstraints = FloatConstraints {
        lower: f64::MIN,
        upper: f64::MAX,
        step: 1.0,
    };

    pub fn new(lower: f64, upper: f64, step: f64) -> Result<Self, TypesError> {
        if lower.is_nan() || upper.is_nan() || lower > upper {
            return Err(TypesError::InvalidRange {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }
        Ok(Self { lower, upper, step })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        value.clamp(self.lower, self.upper)
    }
}

impl Default for FloatConstraints {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}
