//! Human-readable and CPLEX LP renderings of a generated model.

use std::fmt::{self, Write as _};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use belt_core::BalancerResult;

use crate::formulation::BalancerModel;
use crate::lp::{ConstraintFamily, LinearExpr, MilpModel, Relation, Sense, VarDomain};

/// Terms per line in LP output. CPLEX rejects lines longer than 510
/// characters.
const LP_TERMS_PER_LINE: usize = 6;

/// Counts describing a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub inbound: usize,
    pub outbound: usize,
    pub splitters: usize,
    pub cargos: usize,
    pub routes: usize,
    pub splitter_outputs: usize,
    pub binary_vars: usize,
    pub integer_vars: usize,
    pub continuous_vars: usize,
    /// `(family, count)` in family order.
    pub constraints: Vec<(ConstraintFamily, usize)>,
}

impl ModelSummary {
    pub fn of(model: &BalancerModel) -> Self {
        let space = model.space();
        let milp = model.milp();
        let domains = milp.domain_counts();
        let count = |label: &str| domains.get(label).copied().unwrap_or(0);
        Self {
            inbound: space.inbound().len(),
            outbound: space.outbound().len(),
            splitters: space.splitters().len(),
            cargos: space.cargos().len(),
            routes: space.routes().len(),
            splitter_outputs: space.splitter_outputs().count(),
            binary_vars: count("binary"),
            integer_vars: count("integer"),
            continuous_vars: count("continuous"),
            constraints: milp.family_counts().into_iter().collect(),
        }
    }

    pub fn total_vars(&self) -> usize {
        self.binary_vars + self.integer_vars + self.continuous_vars
    }

    pub fn total_constraints(&self) -> usize {
        self.constraints.iter().map(|(_, n)| n).sum()
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Belt Balancer Model")?;
        writeln!(f, "===================")?;
        writeln!(
            f,
            "Belts: {} inbound, {} outbound | Splitters: {} | Cargo types: {}",
            self.inbound, self.outbound, self.splitters, self.cargos
        )?;
        writeln!(
            f,
            "Routes: {} ({} from splitters)",
            self.routes, self.splitter_outputs
        )?;
        writeln!(
            f,
            "Variables: {} ({} binary, {} integer, {} continuous)",
            self.total_vars(),
            self.binary_vars,
            self.integer_vars,
            self.continuous_vars
        )?;
        write!(f, "Constraints: {}", self.total_constraints())?;
        for (family, n) in &self.constraints {
            write!(f, "\n  {:<32} {:>8}", family.to_string(), n)?;
        }
        Ok(())
    }
}

/// Full listing of variables and constraints grouped by family.
pub fn dump(model: &BalancerModel) -> String {
    let milp = model.milp();
    let mut out = String::new();
    let _ = writeln!(out, "{}", ModelSummary::of(model));
    let _ = writeln!(out);

    let _ = writeln!(out, "Variables ({}):", milp.num_vars());
    for spec in milp.vars() {
        let _ = writeln!(out, "  {} {}", spec.name, domain_text(&spec.domain));
    }

    let _ = writeln!(out);
    let sense = match milp.sense() {
        Sense::Minimize => "minimize",
        Sense::Maximize => "maximize",
    };
    let _ = writeln!(out, "Objective: {sense} {}", milp.format_expr(milp.objective()));

    for family in ConstraintFamily::ALL {
        let rows: Vec<_> = milp.constraints_in(family).collect();
        let _ = writeln!(out);
        let _ = writeln!(out, "Constraints {family} ({}):", rows.len());
        for c in rows {
            let _ = writeln!(out, "  {}", milp.format_constraint(c));
        }
    }
    out
}

fn domain_text(domain: &VarDomain) -> String {
    match domain {
        VarDomain::Binary => "binary".to_string(),
        VarDomain::Integer { min, max } => format!("integer [{min}, {max}]"),
        VarDomain::Continuous { min, max } => format!("continuous [{min}, {max}]"),
    }
}

/// Variable and row names with characters the LP format rejects replaced.
fn lp_name(name: &str) -> String {
    name.chars()
        .map(|ch| match ch {
            '[' => '(',
            ']' => ')',
            ':' => '.',
            ch => ch,
        })
        .collect()
}

fn lp_expr(milp: &MilpModel, expr: &LinearExpr) -> String {
    let mut out = String::new();
    for (k, (var, coef)) in expr.terms().enumerate() {
        if k > 0 && k % LP_TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        let sign = if coef < 0.0 { '-' } else { '+' };
        let magnitude = coef.abs();
        if magnitude == 1.0 {
            let _ = write!(out, " {sign} {}", lp_name(&milp.var_name(var)));
        } else {
            let _ = write!(out, " {sign} {magnitude} {}", lp_name(&milp.var_name(var)));
        }
    }
    if out.is_empty() {
        out.push_str(" 0");
    }
    out
}

/// CPLEX LP rendering of the model.
pub fn to_lp(model: &BalancerModel) -> String {
    let milp = model.milp();
    let config = model.config();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "\\ Belt balancer: {} inbound, {} outbound, {} splitters",
        config.inbound, config.outbound, config.splitters
    );
    let _ = writeln!(
        out,
        "{}",
        match milp.sense() {
            Sense::Minimize => "Minimize",
            Sense::Maximize => "Maximize",
        }
    );
    let _ = writeln!(out, " obj:{}", lp_expr(milp, milp.objective()));

    let _ = writeln!(out, "Subject To");
    for c in milp.constraints() {
        let relation = match c.relation {
            Relation::Eq => "=",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        };
        let _ = writeln!(
            out,
            " {}:{} {} {}",
            lp_name(&c.name),
            lp_expr(milp, &c.lhs),
            relation,
            c.rhs
        );
    }

    let _ = writeln!(out, "Bounds");
    for spec in milp.vars() {
        match spec.domain {
            VarDomain::Binary => {}
            VarDomain::Integer { min, max } | VarDomain::Continuous { min, max } => {
                let _ = writeln!(out, " {} <= {} <= {}", min, lp_name(&spec.name), max);
            }
        }
    }

    let generals: Vec<String> = milp
        .vars()
        .iter()
        .filter(|s| matches!(s.domain, VarDomain::Integer { .. }))
        .map(|s| lp_name(&s.name))
        .collect();
    if !generals.is_empty() {
        let _ = writeln!(out, "Generals");
        for chunk in generals.chunks(LP_TERMS_PER_LINE) {
            let _ = writeln!(out, " {}", chunk.join(" "));
        }
    }

    let binaries: Vec<String> = milp
        .vars()
        .iter()
        .filter(|s| matches!(s.domain, VarDomain::Binary))
        .map(|s| lp_name(&s.name))
        .collect();
    if !binaries.is_empty() {
        let _ = writeln!(out, "Binaries");
        for chunk in binaries.chunks(LP_TERMS_PER_LINE) {
            let _ = writeln!(out, " {}", chunk.join(" "));
        }
    }

    let _ = writeln!(out, "End");
    out
}

/// Write the CPLEX LP rendering to `path`.
pub fn write_lp(model: &BalancerModel, path: &Path) -> BalancerResult<()> {
    std::fs::write(path, to_lp(model))?;
    info!(path = %path.display(), "wrote LP model");
    Ok(())
}
