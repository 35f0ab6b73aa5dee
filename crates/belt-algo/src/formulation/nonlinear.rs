//! The even-split relation in its original bilinear form.
//!
//! A splitter passes each cargo to every active output in equal shares:
//!
//! ```text
//! t[s,q,c] = e[s,q] · x[s,c] / (1 + z[s])
//! ```
//!
//! The MILP never states this directly; family 9 encodes it through `xe` and
//! `tz`. The residual here is what the verifier checks a solved assignment
//! against.

/// `t - e·x/(1+z)`.
///
/// `z` is not required to be integral; the verifier passes solver values
/// as-is.
pub fn even_split_residual(t: f64, e: f64, x: f64, z: f64) -> f64 {
    t - e * x / (1.0 + z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_halves_inflow() {
        assert_eq!(even_split_residual(0.5, 1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_pass_through_keeps_inflow() {
        assert_eq!(even_split_residual(0.75, 1.0, 0.75, 0.0), 0.0);
    }

    #[test]
    fn test_inactive_output_carries_nothing() {
        assert_eq!(even_split_residual(0.0, 0.0, 2.0, 1.0), 0.0);
        assert_eq!(even_split_residual(0.25, 0.0, 2.0, 1.0), 0.25);
    }
}
