//! Two-terminal inductor (§2 component table).

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{Component, NumericContext, Result};
use std::f64::consts::PI;

use crate::error::require;

/// Admittance used in place of `1/(j*omega*L)` at DC, where the ideal
/// inductor is a short circuit. A literal infinity would poison every
/// downstream sum; this is large enough to behave as a short at any
/// realistic matrix scale without overflowing.
const DC_SHORT_ADMITTANCE: f64 = 1e12;

pub struct Inductor {
    id: String,
    ports: Vec<String>,
    local: IndexMap<String, String>,
}

impl Inductor {
    pub fn new(id: impl Into<String>, inductance: impl Into<String>) -> Self {
        let mut local = IndexMap::new();
        local.insert("L".to_string(), inductance.into());
        Self {
            id: id.into(),
            ports: vec!["1".to_string(), "2".to_string()],
            local,
        }
    }
}

impl Component for Inductor {
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
        let l = require(ctx, &self.id, "L")?;
        let omega = 2.0 * PI * ctx.freq();
        let y = if omega == 0.0 {
            Complex64::new(DC_SHORT_ADMITTANCE, 0.0)
        } else {
            -Complex64::new(0.0, 1.0) / Complex64::new(omega * l, 0.0)
        };
        Ok(DMatrix::from_row_slice(2, 2, &[y, -y, -y, y]))
    }
}
