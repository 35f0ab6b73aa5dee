//! Symbolic linear expressions over model variables.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Handle to a variable in a [`super::MilpModel`]. Dense, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// `Σ coef·var + constant`
///
/// Terms are kept merged and sorted by variable, with zero coefficients
/// dropped, so two expressions that mean the same thing compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    /// Sum of unit-coefficient terms.
    pub fn sum<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = VarId>,
    {
        let mut expr = Self::new();
        for var in vars {
            expr.add_term(var, 1.0);
        }
        expr
    }

    pub fn add_term(&mut self, var: VarId, coef: f64) {
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coef;
        if *entry == 0.0 {
            self.terms.remove(&var);
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(&v, &c)| (v, c))
    }

    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constant == 0.0
    }

    /// Split into the variable part and the constant.
    pub fn split_constant(mut self) -> (Self, f64) {
        let constant = std::mem::take(&mut self.constant);
        (self, constant)
    }

    /// Value under `values`, indexed by [`VarId`].
    ///
    /// Variables outside `values` count as zero; callers check the
    /// assignment shape first.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        let mut expr = Self::new();
        expr.add_term(var, 1.0);
        expr
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl<T: Into<LinearExpr>> AddAssign<T> for LinearExpr {
    fn add_assign(&mut self, rhs: T) {
        let rhs = rhs.into();
        for (var, coef) in rhs.terms {
            self.add_term(var, coef);
        }
        self.constant += rhs.constant;
    }
}

impl<T: Into<LinearExpr>> SubAssign<T> for LinearExpr {
    fn sub_assign(&mut self, rhs: T) {
        let rhs: LinearExpr = rhs.into();
        *self += -rhs;
    }
}

impl<T: Into<LinearExpr>> Add<T> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: T) -> LinearExpr {
        self += rhs;
        self
    }
}

impl<T: Into<LinearExpr>> Sub<T> for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: T) -> LinearExpr {
        self -= rhs;
        self
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1.0
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        if rhs == 0.0 {
            return LinearExpr::new();
        }
        LinearExpr {
            terms: self.terms.into_iter().map(|(v, c)| (v, c * rhs)).collect(),
            constant: self.constant * rhs,
        }
    }
}

impl Mul<VarId> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: VarId) -> LinearExpr {
        let mut expr = LinearExpr::new();
        expr.add_term(rhs, self);
        expr
    }
}

impl Mul<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn mul(self, rhs: LinearExpr) -> LinearExpr {
        rhs * self
    }
}

impl<T: Into<LinearExpr>> Add<T> for VarId {
    type Output = LinearExpr;

    fn add(self, rhs: T) -> LinearExpr {
        LinearExpr::from(self) + rhs
    }
}

impl<T: Into<LinearExpr>> Sub<T> for VarId {
    type Output = LinearExpr;

    fn sub(self, rhs: T) -> LinearExpr {
        LinearExpr::from(self) - rhs
    }
}

impl Add<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn add(self, rhs: LinearExpr) -> LinearExpr {
        rhs + self
    }
}

impl Sub<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        -rhs + self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_merge_and_cancel() {
        let a = VarId(0);
        let b = VarId(1);
        let expr = a + b + 2.0 * a - b;
        assert_eq!(expr.coefficient(a), 3.0);
        assert_eq!(expr.coefficient(b), 0.0);
        assert_eq!(expr.len(), 1);
    }

    #[test]
    fn test_evaluate() {
        let a = VarId(0);
        let b = VarId(1);
        let expr = 2.0 * a - 0.5 * b + 1.0;
        assert_eq!(expr.evaluate(&[1.0, 4.0]), 1.0);
    }

    #[test]
    fn test_complement_of_binary() {
        // U·(1 - e)
        let e = VarId(3);
        let expr = 2.0 * (1.0 - LinearExpr::from(e));
        assert_eq!(expr.coefficient(e), -2.0);
        assert_eq!(expr.constant_term(), 2.0);
    }

    #[test]
    fn test_sum_and_split() {
        let expr = LinearExpr::sum([VarId(0), VarId(1), VarId(2)]) + 5.0;
        let (vars, constant) = expr.split_constant();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars.constant_term(), 0.0);
        assert_eq!(constant, 5.0);
    }

    #[test]
    fn test_empty_sum() {
        let expr = LinearExpr::sum(std::iter::empty());
        assert!(expr.is_empty());
        assert!(expr.is_constant());
        assert_eq!(expr.evaluate(&[]), 0.0);
    }
}
