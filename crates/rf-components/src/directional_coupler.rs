//! Ideal quadrature (90-degree) directional coupler, §2 component table.
//! Ports in declaration order: input, through, coupled, isolated.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{Component, NumericContext, Result};

use crate::error::require;

pub struct DirectionalCoupler {
    id: String,
    ports: Vec<String>,
    local: IndexMap<String, String>,
}

impl DirectionalCoupler {
    pub fn new(
        id: impl Into<String>,
        coupling_db: impl Into<String>,
        loss_db: impl Into<String>,
        isolation_db: impl Into<String>,
        z0: impl Into<String>,
    ) -> Self {
        let mut local = IndexMap::new();
        local.insert("coupling_db".to_string(), coupling_db.into());
        local.insert("loss_db".to_string(), loss_db.into());
        local.insert("isolation_db".to_string(), isolation_db.into());
        local.insert("Z0".to_string(), z0.into());
        Self {
            id: id.into(),
            ports: vec![
                "input".to_string(),
                "through".to_string(),
                "coupled".to_string(),
                "isolated".to_string(),
            ],
            local,
        }
    }

    pub fn ideal(id: impl Into<String>, coupling_db: impl Into<String>) -> Self {
        Self::new(id, coupling_db, "0", "1000", "50")
    }
}

impl Component for DirectionalCoupler {
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
        let coupling_db = require(ctx, &self.id, "coupling_db")?;
        let loss_db = require(ctx, &self.id, "loss_db")?;
        let isolation_db = require(ctx, &self.id, "isolation_db")?;
        let z0 = require(ctx, &self.id, "Z0")?;

        let c = 10f64.powf(-coupling_db / 20.0);
        let t = (1.0 - c * c).max(0.0).sqrt();
        let loss_factor = 10f64.powf(-loss_db / 20.0);
        let iso = 10f64.powf(-isolation_db / 20.0);

        let jt = Complex64::new(0.0, -t * loss_factor);
        let cc = Complex64::new(-c * loss_factor, 0.0);
        let leak = Complex64::new(iso, 0.0);
        let zero = Complex64::new(0.0, 0.0);

        #[rustfmt::skip]
        let s = DMatrix::from_row_slice(4, 4, &[
            zero, jt,   cc,   leak,
            jt,   zero, leak, cc,
            cc,   leak, zero, jt,
            leak, cc,   jt,   zero,
        ]);

        let z0s = vec![Complex64::new(z0, 0.0); 4];
        rf_core::s_to_y(&s, &z0s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ideal_coupler_through_and_coupled_power_sum_to_unity() {
        let coupler = DirectionalCoupler::ideal("DC1", "10");
        let c = 10f64.powf(-10.0 / 20.0);
        let t = (1.0 - c * c).sqrt();
        assert!((c * c + t * t - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ymatrix_is_4x4_and_finite() {
        let coupler = DirectionalCoupler::ideal("DC1", "10");
        let ctx = NumericContext::new(
            1e9,
            [
                ("coupling_db".to_string(), 10.0),
                ("loss_db".to_string(), 0.0),
                ("isolation_db".to_string(), 1000.0),
                ("Z0".to_string(), 50.0),
            ],
        );
        let y = coupler.ymatrix(&ctx).unwrap();
        assert_eq!(y.nrows(), 4);
        assert_eq!(y.ncols(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert!(y[(i, j)].re.is_finite() && y[(i, j)].im.is_finite());
            }
        }
    }
}
