use anyhow::Context;
use tract_onnx::prelude::*;

use crate::check::{Check, check_equivalence};
use crate::inputs::{InputShape, apply_input_shapes};
use crate::model::OnnxModel;
use crate::stats::GraphStats;

#[derive(Clone, Debug)]
pub struct SimplifyOptions {
    pub input_shapes: Vec<InputShape>,
    /// Lower the decluttered graph to tract's runtime operators.
    ///
    /// Optimized graphs run faster but are tied to tract and can usually not
    /// be serialized back.
    pub optimize: bool,
    /// Number of random input rounds used to validate the result. 0 disables the check.
    pub check_rounds: usize,
    pub seed: u64,
}

impl Default for SimplifyOptions {
    fn default() -> SimplifyOptions {
        SimplifyOptions { input_shapes: vec![], optimize: false, check_rounds: 1, seed: 0 }
    }
}

/// A simplified graph and how it compares to its source.
#[derive(Debug)]
pub struct Simplified {
    pub model: TypedModel,
    pub check: Check,
    pub before: GraphStats,
    pub after: GraphStats,
}

impl Simplified {
    pub fn check_ok(&self) -> bool {
        self.check.is_ok()
    }
}

/// Typed translation of the model, before any simplification pass.
pub fn typed_model(model: &OnnxModel, input_shapes: &[InputShape]) -> TractResult<TypedModel> {
    let mut inference = model.inference_model()?;
    apply_input_shapes(&mut inference, input_shapes)?;
    let typed = inference.into_typed().context("Analysing and typing the model")?;
    debug!("Typed model: {} nodes", typed.nodes().len());
    Ok(typed)
}

/// Simplify a model with tract's decluttering passes and validate the result.
pub fn simplify(model: &OnnxModel, options: &SimplifyOptions) -> TractResult<Simplified> {
    let reference = typed_model(model, &options.input_shapes)?;

    let mut simplified = reference.clone().into_decluttered().context("Decluttering")?;
    debug!("Decluttered model: {} nodes", simplified.nodes().len());
    if options.optimize {
        simplified = simplified.into_optimized().context("Optimizing")?;
        debug!("Optimized model: {} nodes", simplified.nodes().len());
    }

    let check = check_equivalence(&reference, &simplified, options.check_rounds, options.seed)?;
    match &check {
        Check::Failed(why) => warn!("Simplified model does not match its source: {why}"),
        Check::Skipped(why) => warn!("Check skipped: {why}"),
        _ => info!("Check: {check}"),
    }

    let before = GraphStats::from_proto(model.proto());
    let after = GraphStats::from_typed(&simplified)?;
    info!("Simplified {}: {} -> {} nodes", model.name(), before.nodes, after.nodes);
    Ok(Simplified { model: simplified, check, before, after })
}
