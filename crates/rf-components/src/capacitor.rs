//! Two-terminal capacitor (§2 component table).

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{Component, NumericContext, Result};
use std::f64::consts::PI;

use crate::error::require;

pub struct Capacitor {
    id: String,
    ports: Vec<String>,
    local: IndexMap<String, String>,
}

impl Capacitor {
    pub fn new(id: impl Into<String>, capacitance: impl Into<String>) -> Self {
        let mut local = IndexMap::new();
        local.insert("C".to_string(), capacitance.into());
        Self {
            id: id.into(),
            ports: vec!["1".to_string(), "2".to_string()],
            local,
        }
    }
}

impl Component for Capacitor {
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
        let c = require(ctx, &self.id, "C")?;
        let omega = 2.0 * PI * ctx.freq();
        let y = Complex64::new(0.0, omega * c);
        Ok(DMatrix::from_row_slice(2, 2, &[y, -y, -y, y]))
    }
}
