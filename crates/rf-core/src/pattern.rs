//! Stamp pattern compiler (§4.3): converts a `CircuitModel` + `NetlistGraph`
//! into a `StampPattern` that depends only on topology.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::component::CircuitModel;
use crate::netlist::NetlistGraph;

/// Two parallel COO coordinate arrays plus, per component (in declared
/// order), a half-open slice into those arrays. The pattern is a strict
/// function of the netlist: no parameter values are read, no component
/// `ymatrix` is invoked. Duplicate `(row, col)` pairs across components are
/// expected — summation at assembly time is the standard MNA stamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampPattern {
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
    pub component_slices: Vec<Range<usize>>,
}

impl StampPattern {
    pub fn nnz(&self) -> usize {
        self.rows.len()
    }
}

/// Walks each component once in declared order and emits the flat
/// `(rows, cols, per-component slice)` COO template, given the net -> index
/// map that the graph assigns (ground-first, if a ground net was chosen).
pub fn compile_pattern(
    model: &CircuitModel,
    graph: &NetlistGraph,
    node_index: &HashMap<String, usize>,
) -> StampPattern {
    let lookup: HashMap<(&str, &str), usize> = graph
        .connections()
        .iter()
        .map(|c| {
            (
                (c.component_id.as_str(), c.port_name.as_str()),
                node_index[&c.net_name],
            )
        })
        .collect();

    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut slices = Vec::with_capacity(model.components.len());
    let mut cursor = 0usize;

    for comp in &model.components {
        let ports = comp.ports();
        let n = ports.len();
        let nets: Vec<u32> = ports
            .iter()
            .map(|p| lookup[&(comp.id(), p.as_str())] as u32)
            .collect();

        for i in 0..n {
            for j in 0..n {
                rows.push(nets[i]);
                cols.push(nets[j]);
            }
        }
        slices.push(cursor..cursor + n * n);
        cursor += n * n;
    }

    StampPattern {
        rows,
        cols,
        component_slices: slices,
    }
}
