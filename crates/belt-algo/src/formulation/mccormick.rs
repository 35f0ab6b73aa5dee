//! Exact linearization of a bounded continuous variable times a binary.
//!
//! For `w = a·b` with `a ∈ [0, U]` and `b ∈ {0, 1}`:
//!
//! ```text
//! w <= U·b
//! w <= a
//! w >= a - U·(1 - b)
//! ```
//!
//! At `b = 0` the first row pins `w` to 0 and the third is slack; at `b = 1`
//! the second and third rows pin `w` to `a`. Exactness needs `U` to be a true
//! upper bound of `a`.

use crate::lp::{Constraint, ConstraintFamily, LinearExpr, MilpModel, Relation, VarId};

/// One product `product = continuous · binary` to linearize.
#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub product: VarId,
    pub continuous: VarId,
    pub binary: VarId,
    pub bound: f64,
}

/// Add the three envelope rows for `p` to `model` under `family`, named
/// `{name}:bin`, `{name}:cont` and `{name}:lb`.
pub fn linearize_product(model: &mut MilpModel, family: ConstraintFamily, name: &str, p: Product) {
    model.add_constraint(Constraint::new(
        format!("{name}:bin"),
        family,
        p.product,
        Relation::Le,
        p.bound * p.binary,
    ));
    model.add_constraint(Constraint::new(
        format!("{name}:cont"),
        family,
        p.product,
        Relation::Le,
        p.continuous,
    ));
    model.add_constraint(Constraint::new(
        format!("{name}:lb"),
        family,
        p.product,
        Relation::Ge,
        p.continuous - p.bound * (1.0 - LinearExpr::from(p.binary)),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::VarDomain;

    fn envelope(bound: f64) -> (MilpModel, Product) {
        let mut model = MilpModel::new();
        let a = model.add_var("a", VarDomain::Continuous { min: 0.0, max: bound });
        let b = model.add_var("b", VarDomain::Binary);
        let w = model.add_var("w", VarDomain::Continuous { min: 0.0, max: bound });
        let p = Product {
            product: w,
            continuous: a,
            binary: b,
            bound,
        };
        linearize_product(&mut model, ConstraintFamily::EvenSplit, "w", p);
        (model, p)
    }

    fn max_violation(model: &MilpModel, values: &[f64]) -> f64 {
        model
            .constraints()
            .iter()
            .map(|c| c.violation(values))
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_three_rows() {
        let (model, _) = envelope(2.0);
        assert_eq!(model.constraints().len(), 3);
        let names: Vec<&str> = model.constraints().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["w:bin", "w:cont", "w:lb"]);
    }

    #[test]
    fn test_exact_product_is_feasible() {
        let (model, _) = envelope(2.0);
        for a in [0.0, 0.5, 1.25, 2.0] {
            for b in [0.0, 1.0] {
                assert!(max_violation(&model, &[a, b, a * b]) < 1e-12);
            }
        }
    }

    #[test]
    fn test_wrong_product_is_cut_off() {
        let (model, _) = envelope(2.0);
        // b = 0 forces w = 0
        assert!(max_violation(&model, &[1.0, 0.0, 0.5]) > 0.0);
        // b = 1 forces w = a
        assert!(max_violation(&model, &[1.0, 1.0, 0.5]) > 0.0);
        assert!(max_violation(&model, &[1.0, 1.0, 1.5]) > 0.0);
    }
}
