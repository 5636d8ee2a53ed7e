//! Sweep specification, Cartesian expansion, and parallel dispatch (§4.7).
//!
//! Each evaluation point is independent: the only state crossing the
//! `rayon` boundary is `&CircuitModel`/`&StaticPackage` and the per-worker
//! factorization cache, which lives in a `thread_local!` inside
//! `rf_solver::cache` and is never shared across workers.

use indexmap::IndexMap;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;
use rf_core::{CircuitModel, NumericContext, StaticPackage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, PointError, PointResult, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    Linear,
    Log,
}

/// Exactly one entry of this shape is permitted per `SweepSpec`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencySweep {
    pub range: (f64, f64),
    pub points: usize,
    pub scale: Scale,
}

/// An explicit list of values for one non-frequency parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSweep {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SweepEntry {
    Frequency(FrequencySweep),
    Parameter(ParameterSweep),
}

/// A list of sweep entries: exactly one frequency entry, zero or more
/// parameter entries. The evaluation set is their Cartesian product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepSpec {
    pub entries: Vec<SweepEntry>,
}

impl SweepSpec {
    pub fn new(entries: Vec<SweepEntry>) -> Self {
        Self { entries }
    }

    fn validate(&self) -> Result<()> {
        let freq_count = self
            .entries
            .iter()
            .filter(|e| matches!(e, SweepEntry::Frequency(_)))
            .count();
        if freq_count != 1 {
            return Err(Error::InvalidSpec(format!(
                "expected exactly one frequency entry, found {freq_count}"
            )));
        }
        Ok(())
    }

    /// Expands this spec into the Cartesian product of the frequency list
    /// with every non-frequency parameter's value list. Parameter insertion
    /// order within each point's map follows entry declaration order.
    pub fn expand(&self) -> Result<Vec<SweepPoint>> {
        self.validate()?;

        let freq_entry = self
            .entries
            .iter()
            .find_map(|e| match e {
                SweepEntry::Frequency(f) => Some(f),
                SweepEntry::Parameter(_) => None,
            })
            .expect("validated: exactly one frequency entry");
        let param_entries: Vec<&ParameterSweep> = self
            .entries
            .iter()
            .filter_map(|e| match e {
                SweepEntry::Parameter(p) => Some(p),
                SweepEntry::Frequency(_) => None,
            })
            .collect();

        let freqs = generate_frequencies(freq_entry.range, freq_entry.points, freq_entry.scale);
        let grids = expand_parameter_grid(&param_entries);

        let mut points = Vec::with_capacity(freqs.len() * grids.len().max(1));
        for &freq in &freqs {
            for grid in &grids {
                points.push(SweepPoint {
                    freq,
                    parameters: grid.clone(),
                });
            }
        }
        Ok(points)
    }
}

fn generate_frequencies(range: (f64, f64), points: usize, scale: Scale) -> Vec<f64> {
    if points == 0 {
        return Vec::new();
    }
    if points == 1 {
        return vec![range.0];
    }
    let (start, end) = range;
    match scale {
        Scale::Linear => {
            let step = (end - start) / (points as f64 - 1.0);
            (0..points).map(|i| start + step * i as f64).collect()
        }
        Scale::Log => {
            let log_start = start.log10();
            let log_end = end.log10();
            let step = (log_end - log_start) / (points as f64 - 1.0);
            (0..points)
                .map(|i| 10f64.powf(log_start + step * i as f64))
                .collect()
        }
    }
}

fn expand_parameter_grid(entries: &[&ParameterSweep]) -> Vec<IndexMap<String, f64>> {
    let mut combos: Vec<IndexMap<String, f64>> = vec![IndexMap::new()];
    for entry in entries {
        let mut next = Vec::with_capacity(combos.len() * entry.values.len().max(1));
        for combo in &combos {
            for &v in &entry.values {
                let mut c = combo.clone();
                c.insert(entry.name.clone(), v);
                next.push(c);
            }
        }
        combos = next;
    }
    combos
}

/// One input point: a frequency and a flat map of non-frequency parameter
/// overrides, applied last (after globals and component locals) during
/// assembly.
#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub freq: f64,
    pub parameters: IndexMap<String, f64>,
}

/// `Ok` carries the S-matrix observed at the circuit's external ports, sized
/// to the number of external ports that mapped to an in-circuit net.
/// `Err` carries the rendered message of whichever layer's error fired —
/// per §7, errors are recorded against the sample, never propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointOutcome {
    Ok(DMatrix<Complex64>),
    Err(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub freq: f64,
    pub parameters: IndexMap<String, f64>,
    pub outcome: PointOutcome,
}

/// Per-point records plus an aggregate list of error messages; a nonempty
/// error list does not imply the whole sweep should be treated as failed —
/// that decision belongs to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResult {
    pub records: Vec<PointRecord>,
    pub errors: Vec<String>,
}

/// Resolves a circuit's global parameters at `freq`, then overlays
/// `overrides` (sweep bindings win), for use only by reference-impedance
/// evaluation — the per-component merge used for stamping itself lives in
/// `rf_solver::resolve_component_context`.
fn resolve_global_context(
    model: &CircuitModel,
    freq: f64,
    overrides: &IndexMap<String, f64>,
) -> PointResult<NumericContext> {
    let env = move |id: &str| if id == "freq" { Some(freq) } else { None };
    let mut resolved = rf_resolver::resolve_parameters(&model.global_parameters, &env)?;
    for (name, value) in overrides {
        resolved.insert(name.clone(), *value);
    }
    Ok(NumericContext::new(freq, resolved))
}

/// Structural pre-check on `model.global_parameters`: a pure dependency
/// cycle (or an undefined identifier, or a parse failure) reproduces the
/// same resolver error for every point the sweep would ever dispatch, so
/// it is caught once here, fatal to the whole sweep, instead of being
/// rediscovered independently on every worker. The frequency placeholder
/// is nonzero so it never itself triggers a spurious divide-by-freq error.
fn validate_global_parameters(model: &CircuitModel) -> Result<()> {
    let env = |id: &str| if id == "freq" { Some(1.0) } else { None };
    rf_resolver::resolve_parameters(&model.global_parameters, &env)?;
    Ok(())
}

fn evaluate_point_inner(
    model: &CircuitModel,
    static_pkg: &StaticPackage,
    freq: f64,
    overrides: &IndexMap<String, f64>,
) -> PointResult<DMatrix<Complex64>> {
    let y_ext = rf_solver::assemble_and_reduce(model, static_pkg, freq, overrides)?;
    let global_ctx = resolve_global_context(model, freq, overrides)?;
    let z0: Vec<Complex64> = model
        .external_ports
        .values()
        .map(|spec| spec.impedance.get_impedance(&global_ctx))
        .collect::<rf_core::Result<Vec<Complex64>>>()?;
    let s = rf_core::y_to_s(&y_ext, &z0)?;
    Ok(s)
}

fn evaluate_point(model: &CircuitModel, static_pkg: &StaticPackage, point: SweepPoint) -> PointRecord {
    let outcome = match evaluate_point_inner(model, static_pkg, point.freq, &point.parameters) {
        Ok(s) => PointOutcome::Ok(s),
        Err(e) => PointOutcome::Err(e.to_string()),
    };
    PointRecord {
        freq: point.freq,
        parameters: point.parameters,
        outcome,
    }
}

/// Validates `model`'s topology once up front (fatal to the whole sweep if
/// it fails — no point is ever evaluated), expands `spec` into a multiset
/// of evaluation points, and dispatches them across `rayon`'s global thread
/// pool. The order of `SweepResult::records` is not guaranteed.
pub fn run_sweep(model: &CircuitModel, static_pkg: &StaticPackage, spec: &SweepSpec) -> Result<SweepResult> {
    model.validate_topology()?;
    validate_global_parameters(model)?;
    let points = spec.expand()?;

    let records: Vec<PointRecord> = points
        .into_par_iter()
        .map(|point| evaluate_point(model, static_pkg, point))
        .collect();

    let errors = records
        .iter()
        .filter_map(|r| match &r.outcome {
            PointOutcome::Err(msg) => Some(msg.clone()),
            PointOutcome::Ok(_) => None,
        })
        .collect();

    Ok(SweepResult { records, errors })
}
