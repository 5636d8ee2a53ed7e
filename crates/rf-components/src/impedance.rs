//! Reference-impedance variants (§3 "External Port Spec") beyond the
//! constant scalar already provided by `rf_core::FixedImpedance`: a per-point
//! symbolic expression, and a one-port Touchstone-table interpolation (§6).

use std::sync::Arc;

use num_complex::Complex64;
use rf_core::{Error, NumericContext, ReferenceImpedance, Result};
use rf_resolver::Expr;

use crate::touchstone::TouchstoneOneShot;

fn eval_against(expr: &Expr, ctx: &NumericContext) -> Result<f64> {
    let lookup = |id: &str| if id == "freq" { Some(ctx.freq()) } else { ctx.get(id) };
    rf_resolver::eval(expr, &lookup)
        .map_err(|e| Error::Numeric(format!("reference impedance expression: {e}")))
}

/// The "scalar expression evaluated per point" and "frequency-dependent
/// function of freq plus named parameters" variants collapse to the same
/// shape here: real and imaginary parts are each an independent expression
/// over `freq` and the resolved parameter set. Two expressions rather than
/// one because the resolver's parameter bindings are real-only (§3's
/// parameter-expression invariant) — a reactive Z0 needs a separate
/// imaginary-part expression to stay within that invariant.
pub struct ExpressionImpedance {
    real: Expr,
    imag: Expr,
}

impl ExpressionImpedance {
    pub fn new(real_expr: &str, imag_expr: &str) -> rf_resolver::Result<Self> {
        Ok(Self {
            real: rf_resolver::parse(real_expr)?,
            imag: rf_resolver::parse(imag_expr)?,
        })
    }

    /// Convenience constructor for a purely real-valued impedance function.
    pub fn real_valued(expr: &str) -> rf_resolver::Result<Self> {
        Self::new(expr, "0")
    }
}

impl ReferenceImpedance for ExpressionImpedance {
    fn get_impedance(&self, ctx: &NumericContext) -> Result<Complex64> {
        let re = eval_against(&self.real, ctx)?;
        let im = eval_against(&self.imag, ctx)?;
        if !re.is_finite() || !im.is_finite() {
            return Err(Error::Numeric(
                "reference impedance expression produced a non-finite value".to_string(),
            ));
        }
        Ok(Complex64::new(re, im))
    }
}

/// "Interpolated from a one-port S-parameter file" variant (§6). The table
/// itself arrives through the same `TouchstoneOneShot` seam
/// `TouchstoneBlackBox` stamps from, keeping file parsing out of scope per
/// §1. `Z = Z0_file * (1 + S11) / (1 - S11)`, with `Z0_file` the table's
/// single stated reference impedance.
pub struct TouchstoneImpedance {
    table: Arc<dyn TouchstoneOneShot>,
}

impl TouchstoneImpedance {
    pub fn new(table: Arc<dyn TouchstoneOneShot>) -> Self {
        Self { table }
    }
}

impl ReferenceImpedance for TouchstoneImpedance {
    fn get_impedance(&self, ctx: &NumericContext) -> Result<Complex64> {
        if self.table.n_ports() != 1 {
            return Err(Error::Numeric(format!(
                "touchstone reference impedance table has {} ports, expected a one-port (.s1p) table",
                self.table.n_ports()
            )));
        }
        let s = self.table.s_at(ctx.freq());
        let s11 = s[(0, 0)];
        let z0_file = self.table.reference_impedances()[0];
        let one = Complex64::new(1.0, 0.0);
        let denom = one - s11;
        if denom.norm() < 1e-12 {
            return Err(Error::Numeric(
                "touchstone reference impedance: S11 == 1 is non-invertible".to_string(),
            ));
        }
        Ok(z0_file * (one + s11) / denom)
    }
}
