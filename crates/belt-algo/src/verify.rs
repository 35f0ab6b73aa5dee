//! Independent check of a solved assignment.
//!
//! Re-evaluates every generated constraint, every variable domain and the
//! bilinear even-split relation on the assignment. Solvers work to their own
//! tolerances, so a clean report is the evidence that a decoded balancer
//! really balances.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use belt_core::BalancerResult;

use crate::formulation::nonlinear::even_split_residual;
use crate::formulation::BalancerModel;
use crate::lp::ConstraintFamily;
use crate::solve::Assignment;

/// Default absolute tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// What a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "family", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A generated linear constraint.
    Constraint(ConstraintFamily),
    /// A variable bound.
    Bound,
    /// Integrality of a binary or integer variable.
    Integrality,
    /// `t = e·x/(1+z)` on a splitter output.
    EvenSplit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub name: String,
    pub magnitude: f64,
}

/// Outcome of [`verify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub tolerance: f64,
    pub constraints_checked: usize,
    pub variables_checked: usize,
    pub splits_checked: usize,
    pub violations: Vec<Violation>,
}

impl VerificationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Largest violation magnitude, 0 when clean.
    pub fn max_violation(&self) -> f64 {
        self.violations
            .iter()
            .map(|v| v.magnitude)
            .fold(0.0, f64::max)
    }

    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> + '_ {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Verification: {} constraints, {} variables, {} splits checked (tolerance {:e})",
            self.constraints_checked, self.variables_checked, self.splits_checked, self.tolerance
        )?;
        if self.is_ok() {
            return write!(f, "  all checks passed");
        }
        write!(f, "  {} violation(s):", self.violations.len())?;
        for v in &self.violations {
            let kind = match v.kind {
                ViolationKind::Constraint(family) => family.to_string(),
                ViolationKind::Bound => "bound".to_string(),
                ViolationKind::Integrality => "integrality".to_string(),
                ViolationKind::EvenSplit => "even split".to_string(),
            };
            write!(f, "\n    [{}] {}: {:e}", kind, v.name, v.magnitude)?;
        }
        Ok(())
    }
}

/// Check `assignment` against `model` within `tolerance`.
///
/// Only a malformed assignment is an error; violations are reported.
pub fn verify(
    model: &BalancerModel,
    assignment: &Assignment,
    tolerance: f64,
) -> BalancerResult<VerificationReport> {
    let milp = model.milp();
    assignment.check_shape(milp)?;
    let values = assignment.values();
    let mut violations = Vec::new();

    for c in milp.constraints() {
        let magnitude = c.violation(values);
        if magnitude > tolerance {
            violations.push(Violation {
                kind: ViolationKind::Constraint(c.family),
                name: c.name.clone(),
                magnitude,
            });
        }
    }

    for (spec, &value) in milp.vars().iter().zip(values) {
        let below = spec.domain.lower() - value;
        let above = value - spec.domain.upper();
        let out_of_bounds = below.max(above);
        if out_of_bounds > tolerance {
            violations.push(Violation {
                kind: ViolationKind::Bound,
                name: spec.name.clone(),
                magnitude: out_of_bounds,
            });
        }
        if spec.domain.is_integral() {
            let fractional = (value - value.round()).abs();
            if fractional > tolerance {
                violations.push(Violation {
                    kind: ViolationKind::Integrality,
                    name: spec.name.clone(),
                    magnitude: fractional,
                });
            }
        }
    }

    let vars = model.variables();
    let mut splits_checked = 0;
    for (route, c) in model.space().splitter_output_cargos() {
        let s = route.producer;
        let residual = even_split_residual(
            values[vars.t[&(route, c)].index()],
            values[vars.e[&route].index()],
            values[vars.x[&(s, c)].index()],
            values[vars.z[&s].index()],
        );
        splits_checked += 1;
        if residual.abs() > tolerance {
            violations.push(Violation {
                kind: ViolationKind::EvenSplit,
                name: format!("t[{route},{c}]"),
                magnitude: residual.abs(),
            });
        }
    }

    let report = VerificationReport {
        tolerance,
        constraints_checked: milp.constraints().len(),
        variables_checked: milp.num_vars(),
        splits_checked,
        violations,
    };
    if report.is_ok() {
        debug!(
            constraints = report.constraints_checked,
            splits = report.splits_checked,
            "assignment verified"
        );
    } else {
        warn!(
            violations = report.violations.len(),
            max = report.max_violation(),
            "assignment violates the model"
        );
    }
    Ok(report)
}
