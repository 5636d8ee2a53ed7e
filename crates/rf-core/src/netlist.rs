//! NetlistGraph: the net-level connectivity view of a circuit.
//!
//! Captures connectivity strictly in terms of nets (nodes); provides the
//! stable index mapping used by the stamp pattern compiler and the assembler.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single `(component, port) -> net` binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConnection {
    pub component_id: String,
    pub port_name: String,
    pub net_name: String,
}

/// Net-level connectivity: set of net names plus the ordered list of
/// `(component, port, net)` records. Duplicates are permitted and retained
/// in insertion order (idempotent with respect to distinct inputs).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetlistGraph {
    nets: IndexSet<String>,
    connections: Vec<PortConnection>,
}

impl NetlistGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `component.port` is tied to `net_name`. Idempotent for
    /// distinct inputs; exact duplicates are retained (they are legitimate
    /// re-statements of the same tie, e.g. a multi-pin package).
    pub fn add_connection(
        &mut self,
        component_id: impl Into<String>,
        port_name: impl Into<String>,
        net_name: impl Into<String>,
    ) {
        let net_name = net_name.into();
        self.nets.insert(net_name.clone());
        self.connections.push(PortConnection {
            component_id: component_id.into(),
            port_name: port_name.into(),
            net_name,
        });
    }

    /// Sorted list of distinct net names.
    pub fn nodes(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self.nets.iter().cloned().collect();
        nodes.sort();
        nodes
    }

    pub fn connections(&self) -> &[PortConnection] {
        &self.connections
    }

    /// Number of distinct nets in the circuit.
    pub fn dimension(&self) -> usize {
        self.nets.len()
    }

    /// Net name -> matrix index. If `ground_net` is supplied and present it
    /// is assigned index 0; the remaining nets are sorted lexicographically
    /// and assigned `1..N`. Pure function of the current connection set.
    pub fn node_index(&self, ground_net: Option<&str>) -> HashMap<String, usize> {
        let mut nodes = self.nodes();
        let mut index = HashMap::with_capacity(nodes.len());

        if let Some(g) = ground_net {
            if let Some(pos) = nodes.iter().position(|n| n == g) {
                nodes.remove(pos);
                index.insert(g.to_string(), 0);
                for (i, n) in nodes.into_iter().enumerate() {
                    index.insert(n, i + 1);
                }
                return index;
            }
        }

        for (i, n) in nodes.into_iter().enumerate() {
            index.insert(n, i);
        }
        index
    }

    /// Returns the first net whose name matches `"gnd"` case-insensitively,
    /// if any. The chosen reference net for ground elimination (§4.6).
    pub fn ground_net(&self) -> Option<String> {
        self.nodes().into_iter().find(|n| n.eq_ignore_ascii_case("gnd"))
    }
}
