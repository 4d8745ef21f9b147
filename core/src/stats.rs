use std::collections::BTreeMap;

use tract_core::internal::*;
use tract_onnx::pb;

/// Size and composition of a graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    /// Computing nodes: sources and constants are not counted.
    pub nodes: usize,
    pub op_counts: BTreeMap<String, usize>,
    /// Number of scalar values stored in the graph's constants.
    pub parameters: usize,
    /// Fused multiply-adds for one inference, when it does not depend on symbols.
    pub fma: Option<u64>,
}

fn tensor_len(t: &pb::TensorProto) -> usize {
    t.dims.iter().map(|d| (*d).max(0) as usize).product()
}

/// Number of values an ONNX `Constant` node holds.
fn constant_len(node: &pb::NodeProto) -> usize {
    node.attribute
        .iter()
        .map(|attr| match attr.name.as_str() {
            "value" => attr.t.as_ref().map(tensor_len).unwrap_or(0),
            "value_floats" => attr.floats.len(),
            "value_ints" => attr.ints.len(),
            "value_strings" => attr.strings.len(),
            "value_float" | "value_int" | "value_string" => 1,
            _ => 0,
        })
        .sum()
}

impl GraphStats {
    /// Statistics of an ONNX graph as it is serialized.
    ///
    /// The protobuf carries no cost information, so `fma` is always `None`.
    pub fn from_proto(model: &pb::ModelProto) -> GraphStats {
        let Some(graph) = model.graph.as_ref() else {
            return GraphStats::default();
        };
        let mut stats = GraphStats {
            parameters: graph.initializer.iter().map(tensor_len).sum(),
            ..GraphStats::default()
        };
        for node in &graph.node {
            if node.op_type == "Constant" {
                stats.parameters += constant_len(node);
                continue;
            }
            stats.nodes += 1;
            *stats.op_counts.entry(node.op_type.clone()).or_insert(0) += 1;
        }
        stats
    }

    /// Attach a multiply-add count, typically computed on a typed translation.
    pub fn with_fma(self, fma: Option<u64>) -> GraphStats {
        GraphStats { fma, ..self }
    }

    pub fn from_typed(model: &TypedModel) -> TractResult<GraphStats> {
        let mut stats = GraphStats { fma: Some(0), ..GraphStats::default() };
        for node in model.nodes() {
            let name = node.op.name();
            if name == "Source" {
                continue;
            }
            if name == "Const" {
                if let Some(k) = node.outputs.first().and_then(|o| o.fact.konst.as_ref()) {
                    stats.parameters += k.len();
                }
                continue;
            }
            stats.nodes += 1;
            *stats.op_counts.entry(name.to_string()).or_insert(0) += 1;
            let inputs = model.node_input_facts(node.id)?;
            for (cost, count) in node.op.cost(&inputs)? {
                if !matches!(cost, Cost::FMA(_)) {
                    continue;
                }
                match count.to_i64() {
                    Ok(n) => stats.fma = stats.fma.map(|fma| fma + n.max(0) as u64),
                    Err(_) => {
                        trace!("Symbolic cost {count} for node {}", node.name);
                        stats.fma = None;
                    }
                }
            }
        }
        Ok(stats)
    }

    pub fn total_ops(&self) -> usize {
        self.op_counts.values().sum()
    }

    /// Op counts by decreasing frequency, ties by name.
    pub fn op_counts_sorted(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> =
            self.op_counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts
    }
}
