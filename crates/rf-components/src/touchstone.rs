//! Frequency-tabulated black-box component (e.g. loaded from a Touchstone
//! `.sNp` file). The table itself is supplied through the `TouchstoneOneShot`
//! trait so this crate stays agnostic to file parsing; `TabulatedOneShot` is
//! a simple in-memory reference implementation used by tests and callers
//! that have already parsed their own data.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rf_core::{Component, NumericContext, Result};
use std::sync::Arc;

use crate::error::Error;

/// Supplies an interpolated S-parameter matrix and per-port reference
/// impedances for a given frequency.
pub trait TouchstoneOneShot: Send + Sync {
    fn n_ports(&self) -> usize;
    fn s_at(&self, freq: f64) -> DMatrix<Complex64>;
    fn reference_impedances(&self) -> Vec<Complex64>;
}

/// In-memory frequency/S-matrix table with linear interpolation between the
/// two bracketing frequency samples, and linear extrapolation (continuing
/// the edge-pair slope) outside the tabulated range.
pub struct TabulatedOneShot {
    freqs: Vec<f64>,
    s_matrices: Vec<DMatrix<Complex64>>,
    z0: Vec<Complex64>,
}

impl TabulatedOneShot {
    /// `freqs` must be strictly increasing and the same length as
    /// `s_matrices`; every matrix must be square with dimension `z0.len()`.
    pub fn new(freqs: Vec<f64>, s_matrices: Vec<DMatrix<Complex64>>, z0: Vec<Complex64>) -> Self {
        assert_eq!(freqs.len(), s_matrices.len());
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
        for m in &s_matrices {
            assert_eq!(m.nrows(), z0.len());
            assert_eq!(m.ncols(), z0.len());
        }
        Self { freqs, s_matrices, z0 }
    }

    fn bracket(&self, freq: f64) -> (usize, usize, f64) {
        let n = self.freqs.len();
        if n == 1 {
            return (0, 0, 0.0);
        }
        if freq <= self.freqs[0] {
            let frac = (freq - self.freqs[0]) / (self.freqs[1] - self.freqs[0]);
            return (0, 1, frac);
        }
        if freq >= self.freqs[n - 1] {
            let frac = (freq - self.freqs[n - 2]) / (self.freqs[n - 1] - self.freqs[n - 2]);
            return (n - 2, n - 1, frac);
        }
        let hi = self.freqs.partition_point(|&f| f <= freq).max(1);
        let lo = hi - 1;
        let frac = (freq - self.freqs[lo]) / (self.freqs[hi] - self.freqs[lo]);
        (lo, hi, frac)
    }
}

impl TouchstoneOneShot for TabulatedOneShot {
    fn n_ports(&self) -> usize {
        self.z0.len()
    }

    fn s_at(&self, freq: f64) -> DMatrix<Complex64> {
        let (lo, hi, frac) = self.bracket(freq);
        if lo == hi {
            return self.s_matrices[lo].clone();
        }
        let a = &self.s_matrices[lo];
        let b = &self.s_matrices[hi];
        a + (b - a) * frac
    }

    fn reference_impedances(&self) -> Vec<Complex64> {
        self.z0.clone()
    }
}

pub struct TouchstoneBlackBox {
    id: String,
    ports: Vec<String>,
    local: IndexMap<String, String>,
    table: Arc<dyn TouchstoneOneShot>,
}

impl TouchstoneBlackBox {
    pub fn new(id: impl Into<String>, port_names: Vec<String>, table: Arc<dyn TouchstoneOneShot>) -> Result<Self> {
        let id = id.into();
        if port_names.len() != table.n_ports() {
            return Err(Error::Invalid {
                component: id,
                message: format!(
                    "{} port names given for a {}-port touchstone table",
                    port_names.len(),
                    table.n_ports()
                ),
            }
            .into());
        }
        Ok(Self {
            id,
            ports: port_names,
            local: IndexMap::new(),
            table,
        })
    }
}

impl Component for TouchstoneBlackBox {
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
        let s = self.table.s_at(ctx.freq());
        let z0 = self.table.reference_impedances();
        rf_core::s_to_y(&s, &z0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_port_table() -> TabulatedOneShot {
        TabulatedOneShot::new(
            vec![1e9, 2e9, 3e9],
            vec![
                DMatrix::from_element(1, 1, Complex64::new(0.1, 0.0)),
                DMatrix::from_element(1, 1, Complex64::new(0.2, 0.0)),
                DMatrix::from_element(1, 1, Complex64::new(0.3, 0.0)),
            ],
            vec![Complex64::new(50.0, 0.0)],
        )
    }

    #[test]
    fn interpolates_between_samples() {
        let table = one_port_table();
        let s = table.s_at(1.5e9);
        assert!((s[(0, 0)].re - 0.15).abs() < 1e-12);
    }

    #[test]
    fn extrapolates_below_and_above_range() {
        let table = one_port_table();
        let below = table.s_at(0.5e9);
        assert!((below[(0, 0)].re - 0.05).abs() < 1e-12);
        let above = table.s_at(3.5e9);
        assert!((above[(0, 0)].re - 0.35).abs() < 1e-12);
    }

    #[test]
    fn ymatrix_round_trips_through_s_to_y() {
        let table = Arc::new(one_port_table());
        let black_box = TouchstoneBlackBox::new("TS1", vec!["p1".to_string()], table).unwrap();
        let ctx = NumericContext::new(1e9, []);
        let y = black_box.ymatrix(&ctx).unwrap();
        assert_eq!(y.nrows(), 1);
    }

    #[test]
    fn port_count_mismatch_is_rejected() {
        let table = Arc::new(one_port_table());
        let result = TouchstoneBlackBox::new("TS1", vec!["p1".to_string(), "p2".to_string()], table);
        assert!(result.is_err());
    }
}
