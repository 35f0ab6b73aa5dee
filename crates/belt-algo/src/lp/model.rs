//! Solver-independent mixed-integer linear program.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::expr::{LinearExpr, VarId};

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VarDomain {
    Binary,
    Integer { min: f64, max: f64 },
    Continuous { min: f64, max: f64 },
}

impl VarDomain {
    pub fn lower(&self) -> f64 {
        match self {
            VarDomain::Binary => 0.0,
            VarDomain::Integer { min, .. } | VarDomain::Continuous { min, .. } => *min,
        }
    }

    pub fn upper(&self) -> f64 {
        match self {
            VarDomain::Binary => 1.0,
            VarDomain::Integer { max, .. } | VarDomain::Continuous { max, .. } => *max,
        }
    }

    pub fn is_integral(&self) -> bool {
        !matches!(self, VarDomain::Continuous { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            VarDomain::Binary => "binary",
            VarDomain::Integer { .. } => "integer",
            VarDomain::Continuous { .. } => "continuous",
        }
    }
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSpec {
    /// Stable, human-readable name such as `t[s1,j2,c1]`.
    pub name: String,
    pub domain: VarDomain,
}

/// Constraint relation, read as `lhs <relation> rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        }
    }
}

/// Constraint families of the balancer formulation, numbered as they are
/// generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    VolumeDefinition,
    FanDefinition,
    FlowAggregation,
    Topology,
    TrafficBalance,
    Capacity,
    CargoConservation,
    DegreeBounds,
    EvenSplit,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 9] = [
        ConstraintFamily::VolumeDefinition,
        ConstraintFamily::FanDefinition,
        ConstraintFamily::FlowAggregation,
        ConstraintFamily::Topology,
        ConstraintFamily::TrafficBalance,
        ConstraintFamily::Capacity,
        ConstraintFamily::CargoConservation,
        ConstraintFamily::DegreeBounds,
        ConstraintFamily::EvenSplit,
    ];

    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConstraintFamily::VolumeDefinition => "volume definition",
            ConstraintFamily::FanDefinition => "fan-in/out definition",
            ConstraintFamily::FlowAggregation => "splitter flow aggregation",
            ConstraintFamily::Topology => "topology",
            ConstraintFamily::TrafficBalance => "traffic balance",
            ConstraintFamily::Capacity => "capacity",
            ConstraintFamily::CargoConservation => "cargo conservation",
            ConstraintFamily::DegreeBounds => "degree bounds",
            ConstraintFamily::EvenSplit => "even-split linearization",
        }
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}

/// A named linear constraint in canonical form: variables on the left,
/// constant on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub family: ConstraintFamily,
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Build `lhs <relation> rhs` from arbitrary expressions on both sides.
    pub fn new(
        name: impl Into<String>,
        family: ConstraintFamily,
        lhs: impl Into<LinearExpr>,
        relation: Relation,
        rhs: impl Into<LinearExpr>,
    ) -> Self {
        let (lhs, constant) = (lhs.into() - rhs.into()).split_constant();
        Self {
            name: name.into(),
            family,
            lhs,
            relation,
            rhs: if constant == 0.0 { 0.0 } else { -constant },
        }
    }

    /// How far `values` is from satisfying the constraint. Zero when it holds.
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.lhs.evaluate(values);
        match self.relation {
            Relation::Eq => (lhs - self.rhs).abs(),
            Relation::Le => (lhs - self.rhs).max(0.0),
            Relation::Ge => (self.rhs - lhs).max(0.0),
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

/// Variables, constraints and objective of one MILP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilpModel {
    vars: Vec<VarSpec>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    sense: Sense,
}

impl MilpModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable and return its handle.
    pub fn add_var(&mut self, name: impl Into<String>, domain: VarDomain) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(VarSpec {
            name: name.into(),
            domain,
        });
        id
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn set_objective(&mut self, sense: Sense, objective: LinearExpr) {
        self.sense = sense;
        self.objective = objective;
    }

    pub fn vars(&self) -> &[VarSpec] {
        &self.vars
    }

    pub fn var(&self, id: VarId) -> Option<&VarSpec> {
        self.vars.get(id.0)
    }

    /// Name of `id`, or its raw handle when it is not declared here.
    pub fn var_name(&self, id: VarId) -> String {
        self.var(id)
            .map(|spec| spec.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraints_in(
        &self,
        family: ConstraintFamily,
    ) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Constraint counts per family. Families with no constraints are listed
    /// with a zero count.
    pub fn family_counts(&self) -> BTreeMap<ConstraintFamily, usize> {
        let mut counts: BTreeMap<ConstraintFamily, usize> =
            ConstraintFamily::ALL.iter().map(|&f| (f, 0)).collect();
        for c in &self.constraints {
            *counts.entry(c.family).or_insert(0) += 1;
        }
        counts
    }

    /// Variable counts per domain label.
    pub fn domain_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for spec in &self.vars {
            *counts.entry(spec.domain.label()).or_insert(0) += 1;
        }
        counts
    }

    /// Render an expression with variable names.
    pub fn format_expr(&self, expr: &LinearExpr) -> String {
        let mut out = String::new();
        for (var, coef) in expr.terms() {
            let sign = if coef < 0.0 { "-" } else { "+" };
            if out.is_empty() {
                if coef < 0.0 {
                    out.push('-');
                }
            } else {
                out.push_str(&format!(" {sign} "));
            }
            let magnitude = coef.abs();
            if magnitude != 1.0 {
                out.push_str(&format!("{magnitude} "));
            }
            out.push_str(&self.var_name(var));
        }
        let constant = expr.constant_term();
        if out.is_empty() {
            out.push_str(&format!("{constant}"));
        } else if constant != 0.0 {
            let sign = if constant < 0.0 { "-" } else { "+" };
            out.push_str(&format!(" {sign} {}", constant.abs()));
        }
        out
    }

    /// Render a constraint as `name: lhs <rel> rhs`.
    pub fn format_constraint(&self, constraint: &Constraint) -> String {
        format!(
            "{}: {} {} {}",
            constraint.name,
            self.format_expr(&constraint.lhs),
            constraint.relation.symbol(),
            constraint.rhs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_canonical_form() {
        let mut model = MilpModel::new();
        let x = model.add_var("x", VarDomain::Continuous { min: 0.0, max: 2.0 });
        let e = model.add_var("e", VarDomain::Binary);
        // x <= 2e + 1
        let c = Constraint::new(
            "c",
            ConstraintFamily::EvenSplit,
            LinearExpr::from(x),
            Relation::Le,
            2.0 * e + 1.0,
        );
        assert_eq!(c.lhs.coefficient(x), 1.0);
        assert_eq!(c.lhs.coefficient(e), -2.0);
        assert_eq!(c.rhs, 1.0);
        assert_eq!(model.format_constraint(&c), "c: x - 2 e <= 1");
    }

    #[test]
    fn test_violation() {
        let a = VarId(0);
        let eq = Constraint::new("eq", ConstraintFamily::Topology, a, Relation::Eq, 1.0);
        let le = Constraint::new("le", ConstraintFamily::Capacity, a, Relation::Le, 1.0);
        let ge = Constraint::new("ge", ConstraintFamily::DegreeBounds, a, Relation::Ge, 1.0);
        assert_eq!(eq.violation(&[1.5]), 0.5);
        assert_eq!(le.violation(&[0.5]), 0.0);
        assert_eq!(le.violation(&[1.25]), 0.25);
        assert_eq!(ge.violation(&[0.25]), 0.75);
    }

    #[test]
    fn test_family_counts_include_empty_families() {
        let mut model = MilpModel::new();
        let a = model.add_var("a", VarDomain::Binary);
        model.add_constraint(Constraint::new(
            "t",
            ConstraintFamily::Topology,
            a,
            Relation::Eq,
            1.0,
        ));
        let counts = model.family_counts();
        assert_eq!(counts.len(), 9);
        assert_eq!(counts[&ConstraintFamily::Topology], 1);
        assert_eq!(counts[&ConstraintFamily::EvenSplit], 0);
    }

    #[test]
    fn test_domains() {
        let mut model = MilpModel::new();
        model.add_var("e", VarDomain::Binary);
        model.add_var("n", VarDomain::Integer { min: 0.0, max: 2.0 });
        model.add_var("t", VarDomain::Continuous { min: 0.0, max: 1.0 });
        let counts = model.domain_counts();
        assert_eq!(counts["binary"], 1);
        assert_eq!(counts["integer"], 1);
        assert_eq!(counts["continuous"], 1);
        assert_eq!(model.vars()[1].domain.upper(), 2.0);
        assert!(model.vars()[1].domain.is_integral());
        assert!(!model.vars()[2].domain.is_integral());
    }

    #[test]
    fn test_family_numbering() {
        assert_eq!(ConstraintFamily::VolumeDefinition.number(), 1);
        assert_eq!(ConstraintFamily::EvenSplit.number(), 9);
        assert_eq!(
            ConstraintFamily::DegreeBounds.to_string(),
            "8. degree bounds"
        );
    }
}
