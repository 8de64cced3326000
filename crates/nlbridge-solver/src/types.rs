use serde::{Deserialize, Serialize};

/// Optimization sense of a source objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

/// Expression simplification level requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimplifyLevel {
    /// No simplification at all.
    None,
    /// Basic simplifications, e.g. `x+1+1 -> x+2`.
    #[default]
    Basic,
    /// Simplifications without developing, e.g. `x*x + x^2 -> 2x^2`.
    Advanced,
    /// Full polynomial developing, e.g. `x*(x-1) + x -> x^2`.
    Full,
}

impl SimplifyLevel {
    /// Map the numeric option value, `None` when out of range.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(SimplifyLevel::None),
            1 => Some(SimplifyLevel::Basic),
            2 => Some(SimplifyLevel::Advanced),
            3 => Some(SimplifyLevel::Full),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            SimplifyLevel::None => 0,
            SimplifyLevel::Basic => 1,
            SimplifyLevel::Advanced => 2,
            SimplifyLevel::Full => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SimplifyLevel::None => "none",
            SimplifyLevel::Basic => "basic",
            SimplifyLevel::Advanced => "advanced",
            SimplifyLevel::Full => "full",
        }
    }
}

/// Bounds for a variable or constraint. Infinite ends mean unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// `(-inf, +inf)`
    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Build from optional ends, `None` meaning unbounded on that side.
    pub fn from_options(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self::new(
            lower.unwrap_or(f64::NEG_INFINITY),
            upper.unwrap_or(f64::INFINITY),
        )
    }

    pub fn has_finite_lower(&self) -> bool {
        self.lower.is_finite()
    }

    pub fn has_finite_upper(&self) -> bool {
        self.upper.is_finite()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn simplify_level_accepts_zero_through_three() {
        assert_eq!(SimplifyLevel::from_level(0), Some(SimplifyLevel::None));
        assert_eq!(SimplifyLevel::from_level(3), Some(SimplifyLevel::Full));
        assert_eq!(SimplifyLevel::from_level(4), None);
        assert_eq!(SimplifyLevel::from_level(-1), None);
        assert_eq!(SimplifyLevel::default().level(), 1);
    }

    #[test]
    fn bounds_from_missing_ends_are_unbounded() {
        let bounds = Bounds::from_options(None, Some(2.0));
        assert_eq!(bounds.lower, f64::NEG_INFINITY);
        assert_eq!(bounds.upper, 2.0);
        assert!(!bounds.has_finite_lower());
        assert!(bounds.has_finite_upper());
        assert!(bounds.contains(-1e300));
        assert_eq!(Bounds::default(), Bounds::unbounded());
    }
}
