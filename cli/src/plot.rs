use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ArgMatches;
use tidy_core::prelude::*;
use tidy_libcli::graphviz::{DotOptions, render_dot, render_svg};

use crate::params::{Parameters, simplify_options};

fn write_dot(model: &TypedModel, name: &str, options: &DotOptions, path: &Path) -> TractResult<()> {
    let mut file = fs_err::File::create(path)?;
    render_dot(model, name, options, &mut file)?;
    file.flush()?;
    info!("Wrote dot graph to {path:?}");
    Ok(())
}

pub fn handle(params: &Parameters, matches: &ArgMatches) -> TractResult<()> {
    let options = simplify_options(matches)?;
    let graph = if matches.is_present("source") {
        typed_model(&params.model, &options.input_shapes)?
    } else {
        simplify(&params.model, &options)?.model
    };
    let dot_options =
        DotOptions { konst: matches.is_present("const"), facts: matches.is_present("facts") };
    let name = params.model.name();

    let svg = matches.value_of("svg").map(PathBuf::from);
    match (matches.value_of("output"), &svg) {
        (Some(dot), svg) => {
            write_dot(&graph, &name, &dot_options, Path::new(dot))?;
            if let Some(svg) = svg {
                render_svg(Path::new(dot), svg)?;
            }
        }
        (None, Some(svg)) => {
            let dir = tempfile::tempdir()?;
            let dot = dir.path().join("graph.dot");
            write_dot(&graph, &name, &dot_options, &dot)?;
            render_svg(&dot, svg)?;
        }
        (None, None) => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            render_dot(&graph, &name, &dot_options, &mut lock)?;
        }
    }
    if let (true, Some(svg)) = (matches.is_present("open"), &svg) {
        debug!("Opening {svg:?}");
        opener::open(svg).with_context(|| format!("Opening {svg:?}"))?;
    }
    Ok(())
}
