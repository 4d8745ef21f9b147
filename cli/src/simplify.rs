use std::path::Path;

use anyhow::bail;
use clap::ArgMatches;
use tidy_core::prelude::*;
use tidy_libcli::summary::comparison_table;

use crate::params::{Parameters, header_style, simplify_options};

/// Short verdict printed after the comparison table.
pub fn verdict(check: &Check) -> &'static str {
    match check {
        Check::Passed { .. } | Check::Disabled => "ok",
        Check::Skipped(_) => "skipped",
        Check::Failed(_) => "failed",
    }
}

/// Save the simplified graph if asked to. A graph that failed its check is
/// never written.
fn persist(simplified: &Simplified, output: Option<&Path>) -> TractResult<()> {
    if let Check::Failed(why) = &simplified.check {
        if let Some(output) = output {
            warn!("Not writing {output:?}");
        }
        bail!("Simplified model does not match its source: {why}");
    }
    if let Some(output) = output {
        save_nnef(&simplified.model, output)?;
    }
    Ok(())
}

pub fn handle(params: &Parameters, matches: &ArgMatches) -> TractResult<()> {
    let options = simplify_options(matches)?;
    println!("{}", params.model.opset_version()?);

    let simplified = simplify(&params.model, &options)?;
    let table = comparison_table(&simplified.before, &simplified.after)
        .with_title(params.model.name());
    println!("{}", table.render(header_style()));
    println!("check: {}", verdict(&simplified.check));

    persist(&simplified, matches.value_of("output").map(Path::new))
}
