use anyhow::Context;
use clap::ArgMatches;
use nu_ansi_term::{Color, Style};
use tidy_core::prelude::*;

pub const DEFAULT_MODEL: &str = "./resources/models/unet/unet.onnx";

pub struct Parameters {
    pub model: OnnxModel,
}

impl Parameters {
    pub fn from_clap(matches: &ArgMatches) -> TractResult<Parameters> {
        let path = matches.value_of("model").unwrap_or(DEFAULT_MODEL);
        info!("Loading model from {path:?}");
        let model = OnnxModel::load(path)?;
        Ok(Parameters { model })
    }
}

pub fn simplify_options(matches: &ArgMatches) -> TractResult<SimplifyOptions> {
    let defaults = SimplifyOptions::default();
    let input_shapes = matches
        .values_of("input-shape")
        .map(|values| values.map(|v| v.parse()).collect::<TractResult<Vec<InputShape>>>())
        .transpose()?
        .unwrap_or_default();
    let check_rounds = match matches.value_of("check-rounds") {
        Some(v) => v.parse().with_context(|| format!("Invalid --check-rounds value {v:?}"))?,
        None => defaults.check_rounds,
    };
    let seed = match matches.value_of("seed") {
        Some(v) => v.parse().with_context(|| format!("Invalid --seed value {v:?}"))?,
        None => defaults.seed,
    };
    let optimize = matches.is_present("optimize");
    Ok(SimplifyOptions { input_shapes, optimize, check_rounds, seed })
}

/// Header style, only when stdout is a terminal.
pub fn header_style() -> Option<Style> {
    atty::is(atty::Stream::Stdout).then(|| Color::Cyan.bold())
}
