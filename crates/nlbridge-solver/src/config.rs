//! Run options embedded in a compiled model.

use crate::types::SimplifyLevel;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ABS_EPS_F: f64 = 1e-7;
pub const DEFAULT_REL_EPS_F: f64 = 1e-3;
pub const DEFAULT_EPS_H: f64 = 1e-8;
pub const DEFAULT_RANDOM_SEED: i64 = 1;
pub const DEFAULT_OBJECTIVE_NUMBER: u32 = 1;

/// Option block as written by the modeling language.
///
/// Every field is optional; unset fields fall back to engine defaults in
/// [`NlOptions::resolve`]. Serialized keys follow the solver keyword names
/// (`obj_numb`, `init_obj_value`, `inHC4`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlOptions {
    /// Absolute precision on the objective.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_eps_f: Option<f64>,
    /// Relaxation value of the equality constraints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps_h: Option<f64>,
    /// Also try feasibility with the inner-HC4 upper-bounding step.
    #[serde(rename = "inHC4", skip_serializing_if = "Option::is_none")]
    pub in_hc4: Option<bool>,
    /// Known upper bound on the objective to start from.
    #[serde(rename = "init_obj_value", skip_serializing_if = "Option::is_none")]
    pub initial_loup: Option<f64>,
    /// Activate the KKT contractor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kkt: Option<bool>,
    /// Which objective to translate: 0 = none, 1 = first.
    #[serde(rename = "obj_numb", skip_serializing_if = "Option::is_none")]
    pub objective_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<i64>,
    /// Relative precision on the objective.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_eps_f: Option<f64>,
    /// Certify feasibility of equalities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rigor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simpl_level: Option<i64>,
    /// Time limit in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<i64>,
}

impl NlOptions {
    /// Create an option block with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abs_eps_f(mut self, eps: f64) -> Self {
        self.abs_eps_f = Some(eps);
        self
    }

    pub fn with_rel_eps_f(mut self, eps: f64) -> Self {
        self.rel_eps_f = Some(eps);
        self
    }

    pub fn with_eps_h(mut self, eps: f64) -> Self {
        self.eps_h = Some(eps);
        self
    }

    pub fn with_initial_loup(mut self, value: f64) -> Self {
        self.initial_loup = Some(value);
        self
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn with_random_seed(mut self, seed: i64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_simpl_level(mut self, level: i64) -> Self {
        self.simpl_level = Some(level);
        self
    }

    pub fn with_rigor(mut self, enabled: bool) -> Self {
        self.rigor = Some(enabled);
        self
    }

    pub fn with_kkt(mut self, enabled: bool) -> Self {
        self.kkt = Some(enabled);
        self
    }

    pub fn with_in_hc4(mut self, enabled: bool) -> Self {
        self.in_hc4 = Some(enabled);
        self
    }

    /// Select the objective row (1-based); 0 disables the objective.
    pub fn with_objective_number(mut self, number: u32) -> Self {
        self.objective_number = Some(number);
        self
    }

    pub fn with_trace(mut self, level: i64) -> Self {
        self.trace = Some(level);
        self
    }

    /// Check if no option is set.
    pub fn is_empty(&self) -> bool {
        self.abs_eps_f.is_none()
            && self.eps_h.is_none()
            && self.in_hc4.is_none()
            && self.initial_loup.is_none()
            && self.kkt.is_none()
            && self.objective_number.is_none()
            && self.random_seed.is_none()
            && self.rel_eps_f.is_none()
            && self.rigor.is_none()
            && self.simpl_level.is_none()
            && self.timeout.is_none()
            && self.trace.is_none()
    }

    /// Objective selector with its default applied.
    pub fn objective_number(&self) -> u32 {
        self.objective_number.unwrap_or(DEFAULT_OBJECTIVE_NUMBER)
    }

    /// Apply engine defaults. Values the engine would reject are dropped
    /// with a warning and replaced by the default.
    pub fn resolve(&self) -> OptimizerSettings {
        let settings = OptimizerSettings {
            abs_eps_f: positive_or_default("abs_eps_f", self.abs_eps_f, DEFAULT_ABS_EPS_F),
            rel_eps_f: positive_or_default("rel_eps_f", self.rel_eps_f, DEFAULT_REL_EPS_F),
            eps_h: positive_or_default("eps_h", self.eps_h, DEFAULT_EPS_H),
            timeout: self.timeout.filter(|seconds| {
                let accepted = *seconds > 0.0;
                if !accepted {
                    reject("timeout", seconds);
                }
                accepted
            }),
            random_seed: self.random_seed.unwrap_or(DEFAULT_RANDOM_SEED),
            simplify_level: match self.simpl_level {
                Some(level) => SimplifyLevel::from_level(level).unwrap_or_else(|| {
                    reject("simpl_level", &level);
                    SimplifyLevel::default()
                }),
                None => SimplifyLevel::default(),
            },
            initial_loup: self.initial_loup.unwrap_or(f64::INFINITY),
            rigor: self.rigor.unwrap_or(false),
            kkt: self.kkt.unwrap_or(false),
            in_hc4: self.in_hc4.unwrap_or(true),
            objective_number: self.objective_number(),
            trace: self.trace.unwrap_or(0),
        };
        tracing::debug!(
            component = "options",
            operation = "resolve",
            status = "success",
            explicit = !self.is_empty(),
            objective_number = settings.objective_number,
            simplify_level = settings.simplify_level.as_str(),
            "Resolved run options"
        );
        settings
    }
}

fn positive_or_default(name: &'static str, value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 => v,
        Some(v) => {
            reject(name, &v);
            default
        }
        None => default,
    }
}

fn reject(name: &'static str, value: &dyn std::fmt::Debug) {
    tracing::warn!(
        component = "options",
        operation = "resolve",
        status = "ignored",
        option = name,
        value = ?value,
        "Ignoring out-of-range run option"
    );
}

/// Run options after defaults are applied.
///
/// `random_seed` and `trace` are carried through without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    pub abs_eps_f: f64,
    pub rel_eps_f: f64,
    pub eps_h: f64,
    /// `None` means no time limit.
    pub timeout: Option<f64>,
    pub random_seed: i64,
    pub simplify_level: SimplifyLevel,
    pub initial_loup: f64,
    pub rigor: bool,
    pub kkt: bool,
    pub in_hc4: bool,
    pub objective_number: u32,
    pub trace: i64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        NlOptions::new().resolve()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_options_new_is_empty() {
        assert!(NlOptions::new().is_empty());
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let settings = NlOptions::new().resolve();
        assert_eq!(settings.abs_eps_f, 1e-7);
        assert_eq!(settings.rel_eps_f, 1e-3);
        assert_eq!(settings.eps_h, 1e-8);
        assert_eq!(settings.timeout, None);
        assert_eq!(settings.random_seed, 1);
        assert_eq!(settings.simplify_level, SimplifyLevel::Basic);
        assert_eq!(settings.initial_loup, f64::INFINITY);
        assert!(!settings.rigor);
        assert!(!settings.kkt);
        assert!(settings.in_hc4);
        assert_eq!(settings.objective_number, 1);
        assert_eq!(settings.trace, 0);
    }

    #[test]
    fn test_builder_pattern() {
        let settings = NlOptions::new()
            .with_abs_eps_f(1e-4)
            .with_rel_eps_f(1e-2)
            .with_eps_h(1e-6)
            .with_timeout(30.0)
            .with_random_seed(-3)
            .with_simpl_level(3)
            .with_initial_loup(12.5)
            .with_rigor(true)
            .with_kkt(true)
            .with_in_hc4(false)
            .with_objective_number(2)
            .with_trace(2)
            .resolve();

        assert_eq!(settings.abs_eps_f, 1e-4);
        assert_eq!(settings.rel_eps_f, 1e-2);
        assert_eq!(settings.eps_h, 1e-6);
        assert_eq!(settings.timeout, Some(30.0));
        assert_eq!(settings.random_seed, -3);
        assert_eq!(settings.simplify_level, SimplifyLevel::Full);
        assert_eq!(settings.initial_loup, 12.5);
        assert!(settings.rigor);
        assert!(settings.kkt);
        assert!(!settings.in_hc4);
        assert_eq!(settings.objective_number, 2);
        assert_eq!(settings.trace, 2);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let settings = NlOptions::new()
            .with_abs_eps_f(0.0)
            .with_rel_eps_f(-1.0)
            .with_eps_h(-1e-3)
            .with_timeout(-1.0)
            .with_simpl_level(7)
            .resolve();

        assert_eq!(settings.abs_eps_f, DEFAULT_ABS_EPS_F);
        assert_eq!(settings.rel_eps_f, DEFAULT_REL_EPS_F);
        assert_eq!(settings.eps_h, DEFAULT_EPS_H);
        assert_eq!(settings.timeout, None);
        assert_eq!(settings.simplify_level, SimplifyLevel::Basic);
    }

    #[test]
    fn test_zero_objective_number_is_kept() {
        let options = NlOptions::new().with_objective_number(0);
        assert_eq!(options.objective_number(), 0);
        assert_eq!(options.resolve().objective_number, 0);
    }

    #[test]
    fn test_keywords_deserialize() {
        let options: NlOptions = serde_json::from_str(
            r#"{"obj_numb": 0, "init_obj_value": 4.0, "inHC4": false, "timeout": 10.0}"#,
        )
        .unwrap();
        assert_eq!(options.objective_number, Some(0));
        assert_eq!(options.initial_loup, Some(4.0));
        assert_eq!(options.in_hc4, Some(false));
        assert_eq!(options.timeout, Some(10.0));
        assert!(options.kkt.is_none());

        let rendered = serde_json::to_string(&NlOptions::new().with_kkt(true)).unwrap();
        assert_eq!(rendered, r#"{"kkt":true}"#);
    }
}
