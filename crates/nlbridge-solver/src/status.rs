//! Engine outcome types.

/// Final status of an optimizer run, as reported back to the modeling language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerStatus {
    /// Global minimum found within the requested precision.
    Success,
    /// Proven that no feasible point exists below the initial bound.
    Infeasible,
    /// No feasible point found, infeasibility not proven.
    NoFeasibleFound,
    /// Objective appears unbounded below.
    UnboundedObjective,
    /// Time limit reached.
    TimeOut,
    /// Search finished without reaching the precision requirements.
    UnreachedPrecision,
}

impl OptimizerStatus {
    /// Result code written to the solution file.
    pub fn solve_result_num(self) -> u32 {
        match self {
            OptimizerStatus::Success => 0,
            OptimizerStatus::Infeasible => 200,
            OptimizerStatus::NoFeasibleFound => 201,
            OptimizerStatus::UnboundedObjective => 300,
            OptimizerStatus::TimeOut => 400,
            OptimizerStatus::UnreachedPrecision => 402,
        }
    }

    /// Whether a primal point is reported along with the status.
    pub fn has_solution(self) -> bool {
        !matches!(
            self,
            OptimizerStatus::Infeasible | OptimizerStatus::NoFeasibleFound
        )
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizerStatus::Success => "success",
            OptimizerStatus::Infeasible => "infeasible",
            OptimizerStatus::NoFeasibleFound => "no_feasible_found",
            OptimizerStatus::UnboundedObjective => "unbounded_objective",
            OptimizerStatus::TimeOut => "time_out",
            OptimizerStatus::UnreachedPrecision => "unreached_precision",
        }
    }

    /// One-line explanation for solver messages.
    pub fn message(self) -> &'static str {
        match self {
            OptimizerStatus::Success => "Optimization success: global minimum found",
            OptimizerStatus::Infeasible => "Infeasible problem",
            OptimizerStatus::NoFeasibleFound => "No feasible point found",
            OptimizerStatus::UnboundedObjective => "Unbounded objective function",
            OptimizerStatus::TimeOut => "Time limit reached",
            OptimizerStatus::UnreachedPrecision => "Unreached precision",
        }
    }
}

impl std::fmt::Display for OptimizerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_codes() {
        assert_eq!(OptimizerStatus::Success.solve_result_num(), 0);
        assert_eq!(OptimizerStatus::Infeasible.solve_result_num(), 200);
        assert_eq!(OptimizerStatus::NoFeasibleFound.solve_result_num(), 201);
        assert_eq!(OptimizerStatus::UnboundedObjective.solve_result_num(), 300);
        assert_eq!(OptimizerStatus::TimeOut.solve_result_num(), 400);
        assert_eq!(OptimizerStatus::UnreachedPrecision.solve_result_num(), 402);
    }

    #[test]
    fn test_solution_reported_unless_infeasible() {
        assert!(OptimizerStatus::Success.has_solution());
        assert!(OptimizerStatus::TimeOut.has_solution());
        assert!(OptimizerStatus::UnboundedObjective.has_solution());
        assert!(!OptimizerStatus::Infeasible.has_solution());
        assert!(!OptimizerStatus::NoFeasibleFound.has_solution());
    }

    #[test]
    fn test_display_uses_snake_case() {
        assert_eq!(OptimizerStatus::TimeOut.to_string(), "time_out");
        assert!(OptimizerStatus::Infeasible.message().contains("Infeasible"));
    }
}
