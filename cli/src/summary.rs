use clap::ArgMatches;
use tidy_core::prelude::*;
use tidy_libcli::summary::{hardware_table, metrics_table, opcount_table, stats_json};

use crate::params::{Parameters, header_style, simplify_options};

/// Stats of the source protobuf, or of the simplified graph when asked.
///
/// The source graph's multiply-adds come from its typed translation.
pub fn graph_stats(
    model: &OnnxModel,
    options: &SimplifyOptions,
    simplified: bool,
) -> TractResult<GraphStats> {
    if simplified {
        return Ok(simplify(model, options)?.after);
    }
    let fma = match typed_model(model, &options.input_shapes)
        .and_then(|typed| GraphStats::from_typed(&typed))
    {
        Ok(typed) => typed.fma,
        Err(e) => {
            warn!("Could not compute the cost of {}: {e:?}", model.name());
            None
        }
    };
    Ok(GraphStats::from_proto(model.proto()).with_fma(fma))
}

pub fn handle(params: &Parameters, matches: &ArgMatches) -> TractResult<()> {
    let options = simplify_options(matches)?;
    let stats = graph_stats(&params.model, &options, matches.is_present("simplified"))?;
    let name = params.model.name();
    if matches.is_present("json") {
        println!("{}", stats_json(&name, &stats)?);
        return Ok(());
    }
    let style = header_style();
    println!("{}", opcount_table(&stats).with_title(format!("{name}: operators")).render(style));
    println!("{}", metrics_table(&stats).with_title(format!("{name}: metrics")).render(style));
    println!("{}", hardware_table(&stats).with_title(format!("{name}: hardware")).render(style));
    Ok(())
}
