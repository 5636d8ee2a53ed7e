//! Two-terminal resistor (§2 component table).

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{Component, NumericContext, Result};

use crate::error::{require, Error};

pub struct Resistor {
    id: String,
    ports: Vec<String>,
    local: IndexMap<String, String>,
}

impl Resistor {
    pub fn new(id: impl Into<String>, resistance: impl Into<String>) -> Self {
        let mut local = IndexMap::new();
        local.insert("R".to_string(), resistance.into());
        Self {
            id: id.into(),
            ports: vec!["1".to_string(), "2".to_string()],
            local,
        }
    }
}

impl Component for Resistor {
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
        let r = require(ctx, &self.id, "R")?;
        if r == 0.0 {
            return Err(Error::Invalid {
                component: self.id.clone(),
                message: "R must be nonzero (a shorted resistor is not representable as a finite admittance)".to_string(),
            }
            .into());
        }
        let y = Complex64::new(1.0 / r, 0.0);
        Ok(DMatrix::from_row_slice(2, 2, &[y, -y, -y, y]))
    }
}
