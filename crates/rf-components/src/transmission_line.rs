//! Ideal (possibly lossy) two-conductor transmission line, modeled with the
//! standard ABCD matrix and converted to admittance form.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{Component, NumericContext, Result};
use std::f64::consts::PI;

use crate::error::{require, Error};

const SPEED_OF_LIGHT: f64 = 299_792_458.0;

pub struct TransmissionLine {
    id: String,
    ports: Vec<String>,
    local: IndexMap<String, String>,
}

impl TransmissionLine {
    /// `z0`, `length` (meters), `velocity_factor` (0 < vf <= 1), and
    /// `loss_db_per_m` are all resolvable parameter expressions; the latter
    /// two default to `"1"` and `"0"` if not overridden by the caller.
    pub fn new(
        id: impl Into<String>,
        z0: impl Into<String>,
        length: impl Into<String>,
        velocity_factor: impl Into<String>,
        loss_db_per_m: impl Into<String>,
    ) -> Self {
        let mut local = IndexMap::new();
        local.insert("Z0".to_string(), z0.into());
        local.insert("length".to_string(), length.into());
        local.insert("velocity_factor".to_string(), velocity_factor.into());
        local.insert("loss_db_per_m".to_string(), loss_db_per_m.into());
        Self {
            id: id.into(),
            ports: vec!["1".to_string(), "2".to_string()],
            local,
        }
    }

    pub fn lossless(id: impl Into<String>, z0: impl Into<String>, length: impl Into<String>) -> Self {
        Self::new(id, z0, length, "1", "0")
    }
}

impl Component for TransmissionLine {
    fn id(&self) -> &str {
        &self.id
    }

    fn ports(&self) -> &[String] {
        &self.ports
    }

    fn local_params(&self) -> &IndexMap<String, String> {
        &self.local
    }

    fn ymatrix(&self, ctx: &NumericContext) -> Result<DMatrix<Complex64>> {
        let z0 = require(ctx, &self.id, "Z0")?;
        let length = require(ctx, &self.id, "length")?;
        let vf = require(ctx, &self.id, "velocity_factor")?;
        let loss_db_per_m = require(ctx, &self.id, "loss_db_per_m")?;

        if vf <= 0.0 {
            return Err(Error::Invalid {
                component: self.id.clone(),
                message: format!("velocity_factor must be positive, got {vf}"),
            }
            .into());
        }

        let beta = 2.0 * PI * ctx.freq() / (vf * SPEED_OF_LIGHT);
        let alpha_np_per_m = loss_db_per_m * std::f64::consts::LN_10 / 20.0;
        let gamma = Complex64::new(alpha_np_per_m, beta);
        let theta = gamma * length;

        let z0c = Complex64::new(z0, 0.0);
        let a = theta.cosh();
        let b = z0c * theta.sinh();
        let d = a;

        if b.norm() < 1e-300 {
            return Err(Error::Invalid {
                component: self.id.clone(),
                message: "degenerate transmission line: zero length or zero Z0".to_string(),
            }
            .into());
        }

        // ABCD -> Y for a reciprocal two-port (AD - BC = 1):
        // Y11 = D/B, Y12 = Y21 = -1/B, Y22 = A/B.
        let y11 = d / b;
        let y12 = -Complex64::new(1.0, 0.0) / b;
        let y22 = a / b;
        Ok(DMatrix::from_row_slice(2, 2, &[y11, y12, y12, y22]))
    }
}
