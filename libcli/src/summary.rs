use human_repr::HumanCount;
use itertools::Itertools;
use tidy_core::model::ModelInfo;
use tidy_core::stats::GraphStats;

use crate::table::{Align, Table};

/// Format a count with a metric suffix: `999`, `1.2k`, `3.4M`.
pub fn human_count(n: u64) -> String {
    n.human_count_bare().to_string()
}

fn fma_cell(fma: Option<u64>) -> String {
    fma.map(human_count).unwrap_or_else(|| "?".to_string())
}

pub fn opcount_table(stats: &GraphStats) -> Table {
    let mut table = Table::new(["Op", "Count"]).with_align(1, Align::Right);
    for (op, count) in stats.op_counts_sorted() {
        table.push_row([op.to_string(), count.to_string()]);
    }
    table.push_row(["Total".to_string(), stats.total_ops().to_string()]);
    table
}

pub fn metrics_table(stats: &GraphStats) -> Table {
    let mut table = Table::new(["Metric", "Total"]).with_align(1, Align::Right);
    table.push_row(["Nodes".to_string(), stats.nodes.to_string()]);
    table.push_row(["Parameters".to_string(), human_count(stats.parameters as u64)]);
    table.push_row(["FMA".to_string(), fma_cell(stats.fma)]);
    table
}

/// Peak FP32 throughput of reference accelerators, in FLOP/s.
const HARDWARE: &[(&str, f64)] = &[("A100", 19.5e12)];

/// Estimated inferences per second, counting two FLOPs per multiply-add.
pub fn hardware_table(stats: &GraphStats) -> Table {
    let mut table = Table::new(["Hardware", "Throughput"]).with_align(1, Align::Right);
    let flops = stats.fma.filter(|fma| *fma > 0).map(|fma| 2.0 * fma as f64);
    for (name, peak) in HARDWARE {
        let cell = match flops {
            Some(flops) => format!("{} it/s", (peak / flops).human_count_bare()),
            None => "?".to_string(),
        };
        table.push_row([name.to_string(), cell]);
    }
    table
}

fn delta(before: usize, after: usize) -> String {
    match after.cmp(&before) {
        std::cmp::Ordering::Less => format!("-{}", before - after),
        std::cmp::Ordering::Equal => "=".to_string(),
        std::cmp::Ordering::Greater => format!("+{}", after - before),
    }
}

/// Side by side metrics and per-op counts of a graph before and after simplification.
pub fn comparison_table(before: &GraphStats, after: &GraphStats) -> Table {
    let mut table = Table::new(["", "Before", "After", "Delta"])
        .with_align(1, Align::Right)
        .with_align(2, Align::Right)
        .with_align(3, Align::Right);
    table.push_row([
        "Nodes".to_string(),
        before.nodes.to_string(),
        after.nodes.to_string(),
        delta(before.nodes, after.nodes),
    ]);
    table.push_row([
        "Parameters".to_string(),
        human_count(before.parameters as u64),
        human_count(after.parameters as u64),
        delta(before.parameters, after.parameters),
    ]);
    for op in before.op_counts.keys().chain(after.op_counts.keys()).unique().sorted() {
        let b = before.op_counts.get(op).copied().unwrap_or(0);
        let a = after.op_counts.get(op).copied().unwrap_or(0);
        table.push_row([op.to_string(), b.to_string(), a.to_string(), delta(b, a)]);
    }
    table
}

pub fn info_table(info: &ModelInfo) -> Table {
    let mut table = Table::new(["Field", "Value"]);
    let producer = format!("{} {}", info.producer_name, info.producer_version);
    let rows = [
        ("IR version", info.ir_version.to_string()),
        ("Producer", producer.trim().to_string()),
        ("Domain", info.domain.clone()),
        ("Model version", info.model_version.to_string()),
        ("Graph", info.graph_name.clone()),
        ("Opsets", info.opsets.iter().join(", ")),
        ("Inputs", info.inputs.join(", ")),
        ("Outputs", info.outputs.join(", ")),
        ("Nodes", info.nodes.to_string()),
        ("Initializers", info.initializers.to_string()),
    ];
    for (field, value) in rows {
        table.push_row([field.to_string(), value]);
    }
    table
}

/// Graph statistics as pretty printed JSON.
pub fn stats_json(name: &str, stats: &GraphStats) -> anyhow::Result<String> {
    let value = serde_json::json!({ "model": name, "stats": stats });
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn info_json(info: &ModelInfo) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(info)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use tidy_core::model::OnnxModel;
    use tidy_core::test_models;

    #[test]
    fn human_counts() {
        assert_eq!(human_count(0), "0");
        assert_eq!(human_count(999), "999");
        assert_eq!(human_count(1_234), "1.2k");
        assert_eq!(human_count(25_600_000), "25.6M");
    }

    #[test]
    fn human_counts_round_up_to_next_unit() {
        for n in [999_950, 999_999] {
            let s = human_count(n);
            assert!(s.starts_with('1') && s.ends_with('M'), "{n} rendered as {s}");
        }
    }

    #[test]
    fn opcount_table_is_sorted() {
        let stats = GraphStats {
            nodes: 4,
            op_counts: [("Relu".to_string(), 1), ("Conv".to_string(), 3)].into_iter().collect(),
            parameters: 0,
            fma: None,
        };
        let table = opcount_table(&stats);
        assert_eq!(table.rows()[0], vec!["Conv".to_string(), "3".to_string()]);
        assert_eq!(table.rows()[1], vec!["Relu".to_string(), "1".to_string()]);
        assert_eq!(table.rows()[2], vec!["Total".to_string(), "4".to_string()]);
    }

    #[test]
    fn metrics_with_unknown_cost() {
        let stats = GraphStats { nodes: 2, parameters: 1500, ..GraphStats::default() };
        let table = metrics_table(&stats);
        assert_eq!(table.rows()[1][1], "1.5k");
        assert_eq!(table.rows()[2][1], "?");
    }

    #[test]
    fn hardware_throughput() {
        let stats = GraphStats { fma: Some(975_000), ..GraphStats::default() };
        let table = hardware_table(&stats);
        assert_eq!(table.rows()[0][0], "A100");
        assert!(table.rows()[0][1].ends_with("M it/s"), "{}", table.rows()[0][1]);
        for fma in [None, Some(0)] {
            let table = hardware_table(&GraphStats { fma, ..GraphStats::default() });
            assert_eq!(table.rows()[0][1], "?");
        }
    }

    #[test]
    fn comparison_deltas() {
        let before = GraphStats::from_proto(&test_models::relu_chain(&[1, 4]));
        let mut after = before.clone();
        after.op_counts.remove("Identity");
        after.nodes = 2;
        let table = comparison_table(&before, &after);
        assert_eq!(table.rows()[0], vec!["Nodes", "3", "2", "-1"]);
        let identity = table.rows().iter().find(|r| r[0] == "Identity").unwrap();
        assert_eq!(identity[3], "-1");
        let relu = table.rows().iter().find(|r| r[0] == "Relu").unwrap();
        assert_eq!(relu[3], "=");
    }

    #[test]
    fn info_table_and_json() -> anyhow::Result<()> {
        let info = OnnxModel::from_proto(test_models::relu_chain(&[1, 4])).info();
        let rendered = info_table(&info).to_string();
        assert!(rendered.contains("ai.onnx 13"));
        assert!(rendered.contains("tidy-tests"));
        let json: serde_json::Value = serde_json::from_str(&info_json(&info)?)?;
        assert_eq!(json["ir_version"], 7);
        assert_eq!(json["opsets"][0]["version"], 13);
        Ok(())
    }

    #[test]
    fn stats_as_json() -> anyhow::Result<()> {
        let stats = GraphStats::from_proto(&test_models::relu_chain(&[1, 4]));
        let json: serde_json::Value = serde_json::from_str(&stats_json("relu_chain", &stats)?)?;
        assert_eq!(json["model"], "relu_chain");
        assert_eq!(json["stats"]["op_counts"]["Add"], 1);
        assert_eq!(json["stats"]["parameters"], 4);
        assert!(json["stats"]["fma"].is_null());
        Ok(())
    }
}
