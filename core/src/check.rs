use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tract_onnx::prelude::*;

use crate::inputs::{has_concrete_inputs, random_inputs};

/// Outcome of comparing a simplified graph against its reference.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Check {
    /// Every round produced matching outputs.
    Passed { rounds: usize },
    /// No round was requested.
    Disabled,
    /// The comparison could not run, typically because of symbolic input shapes.
    Skipped(String),
    /// Outputs diverged.
    Failed(String),
}

impl Check {
    pub fn is_ok(&self) -> bool {
        matches!(self, Check::Passed { .. } | Check::Disabled)
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Check::Passed { rounds } => write!(f, "ok ({rounds} round(s))"),
            Check::Disabled => write!(f, "ok (disabled)"),
            Check::Skipped(why) => write!(f, "skipped: {why}"),
            Check::Failed(why) => write!(f, "failed: {why}"),
        }
    }
}

/// Run both models on the same random inputs and compare their outputs.
///
/// Errors from running either model are propagated: only diverging outputs
/// make a `Check::Failed`.
pub fn check_equivalence(
    reference: &TypedModel,
    candidate: &TypedModel,
    rounds: usize,
    seed: u64,
) -> TractResult<Check> {
    if rounds == 0 {
        return Ok(Check::Disabled);
    }
    if !has_concrete_inputs(reference)? {
        return Ok(Check::Skipped("inputs have symbolic dimensions".to_string()));
    }
    let reference_outputs = reference.output_outlets()?.len();
    let candidate_outputs = candidate.output_outlets()?.len();
    if reference_outputs != candidate_outputs {
        return Ok(Check::Failed(format!(
            "output count differs: {reference_outputs} != {candidate_outputs}"
        )));
    }
    let reference_plan = reference.clone().into_runnable().context("Preparing reference model")?;
    let candidate_plan = candidate.clone().into_runnable().context("Preparing simplified model")?;
    let mut rng = SmallRng::seed_from_u64(seed);
    for round in 0..rounds {
        let inputs = random_inputs(reference, &mut rng)?;
        let expected = reference_plan
            .run(inputs.clone())
            .with_context(|| format!("Running reference model (round {round})"))?;
        let got = candidate_plan
            .run(inputs)
            .with_context(|| format!("Running simplified model (round {round})"))?;
        for (ix, (expected, got)) in expected.iter().zip(got.iter()).enumerate() {
            if let Err(e) = expected.close_enough(got, true) {
                debug!("Round {round}, output #{ix}: {e:?}");
                return Ok(Check::Failed(format!("output #{ix} in round {round}: {e}")));
            }
        }
        trace!("Round {round} matched on {} output(s)", expected.len());
    }
    Ok(Check::Passed { rounds })
}
