#[macro_use]
extern crate log;

use std::process;

use clap::{Arg, ArgMatches, Command, crate_version};
use tidy_core::prelude::*;

use crate::params::Parameters;

mod info;
mod params;
mod plot;
mod simplify;
mod summary;

fn simplify_args(command: Command<'static>, default_rounds: &'static str) -> Command<'static> {
    command
        .arg(
            Arg::new("input-shape")
                .short('i')
                .long("input-shape")
                .takes_value(true)
                .multiple_occurrences(true)
                .number_of_values(1)
                .help("Override an input shape, as name:1,3,224,224 or positional 1,3,224,224"),
        )
        .arg(
            Arg::new("optimize")
                .long("optimize")
                .help("Lower the decluttered graph to tract's runtime operators"),
        )
        .arg(
            Arg::new("check-rounds")
                .long("check-rounds")
                .takes_value(true)
                .default_value(default_rounds)
                .help("Random input rounds used to validate the simplified graph (0 disables)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .takes_value(true)
                .default_value("0")
                .help("Seed of the random check inputs"),
        )
}

fn app() -> Command<'static> {
    let opset = Command::new("opset").about("Print the opset version of the first import").arg(
        Arg::new("all").long("all").help("Print every imported opset as `domain version`"),
    );

    let info = Command::new("info")
        .about("Print the model metadata")
        .arg(Arg::new("json").long("json").help("Output JSON"));

    let simplify = simplify_args(
        Command::new("simplify").about("Simplify the graph and compare it to its source"),
        "1",
    )
    .arg(
        Arg::new("output")
            .short('o')
            .long("output")
            .takes_value(true)
            .help("Save the simplified graph as an NNEF archive (.tar, .tgz or .tar.gz)"),
    );

    let summary = simplify_args(
        Command::new("summary").about("Print op counts and metrics of the graph"),
        "0",
    )
    .arg(Arg::new("json").long("json").help("Output JSON"))
    .arg(Arg::new("simplified").long("simplified").help("Summarize the simplified graph"));

    let plot = simplify_args(Command::new("plot").about("Draw the graph with Graphviz"), "0")
        .arg(Arg::new("output").short('o').long("output").takes_value(true).help("Dot file path"))
        .arg(
            Arg::new("svg")
                .long("svg")
                .takes_value(true)
                .help("Render to SVG with the external dot program"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .requires("svg")
                .help("Open the SVG with the default viewer once rendered"),
        )
        .arg(Arg::new("const").long("const").help("Also draw constant nodes"))
        .arg(Arg::new("facts").long("facts").help("Label edges with their facts"))
        .arg(Arg::new("source").long("source").help("Draw the graph before decluttering"));

    Command::new("tidy")
        .version(crate_version!())
        .about("Read, simplify and inspect ONNX models")
        .arg(
            Arg::new("model")
                .takes_value(true)
                .default_value(params::DEFAULT_MODEL)
                .help("Sets the model to use"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(opset)
        .subcommand(info)
        .subcommand(simplify)
        .subcommand(summary)
        .subcommand(plot)
}

fn log_filter(verbosity: u64) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("tidy={level},tract={level}")
}

/// Entrypoint for the command-line interface.
fn main() {
    let matches = app().get_matches();

    let env = env_logger::Env::default()
        .filter_or(env_logger::DEFAULT_FILTER_ENV, log_filter(matches.occurrences_of("verbose")));
    env_logger::Builder::from_env(env).format_timestamp_nanos().init();

    if let Err(e) = handle(matches) {
        error!("{e:?}");
        process::exit(1)
    }
}

/// Print the opset, simplify, and keep only the check verdict.
fn script(params: &Parameters) -> TractResult<()> {
    let opset = params.model.opset_version()?;
    println!("{opset}");
    let simplified = simplify(&params.model, &SimplifyOptions::default())?;
    info!("Check flag: {}", simplified.check_ok());
    Ok(())
}

fn handle(matches: ArgMatches) -> TractResult<()> {
    let params = Parameters::from_clap(&matches)?;
    match matches.subcommand() {
        None => script(&params),
        Some(("opset", m)) => info::handle_opset(&params, m.is_present("all")),
        Some(("info", m)) => info::handle_info(&params, m.is_present("json")),
        Some(("simplify", m)) => simplify::handle(&params, m),
        Some(("summary", m)) => summary::handle(&params, m),
        Some(("plot", m)) => plot::handle(&params, m),
        Some((other, _)) => anyhow::bail!("Unknown subcommand {other}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn model_defaults_to_unet() -> TractResult<()> {
        let matches = app().try_get_matches_from(["tidy"])?;
        assert_eq!(matches.value_of("model"), Some(params::DEFAULT_MODEL));
        assert!(matches.subcommand().is_none());
        Ok(())
    }

    #[test]
    fn model_then_subcommand() -> TractResult<()> {
        let matches =
            app().try_get_matches_from(["tidy", "-vv", "m.onnx", "simplify", "-i", "x:1,3"])?;
        assert_eq!(matches.value_of("model"), Some("m.onnx"));
        assert_eq!(matches.occurrences_of("verbose"), 2);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "simplify");
        assert_eq!(sub.values_of("input-shape").unwrap().collect::<Vec<_>>(), ["x:1,3"]);
        assert_eq!(sub.value_of("check-rounds"), Some("1"));
        Ok(())
    }

    #[test]
    fn subcommand_without_model() -> TractResult<()> {
        let matches = app().try_get_matches_from(["tidy", "opset", "--all"])?;
        assert_eq!(matches.value_of("model"), Some(params::DEFAULT_MODEL));
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "opset");
        assert!(sub.is_present("all"));
        Ok(())
    }

    #[test]
    fn plot_skips_check_by_default() -> TractResult<()> {
        let matches = app().try_get_matches_from(["tidy", "m.onnx", "plot", "--svg", "g.svg"])?;
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.value_of("check-rounds"), Some("0"));
        assert_eq!(sub.value_of("svg"), Some("g.svg"));
        Ok(())
    }

    #[test]
    fn open_needs_svg() -> TractResult<()> {
        assert!(app().try_get_matches_from(["tidy", "m.onnx", "plot", "--open"]).is_err());
        let matches =
            app().try_get_matches_from(["tidy", "m.onnx", "plot", "--svg", "g.svg", "--open"])?;
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.is_present("open"));
        Ok(())
    }

    #[test]
    fn script_on_model_file() -> TractResult<()> {
        use prost::Message;
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("unet.onnx");
        let mut proto = tidy_core::test_models::relu_chain(&[1, 4]);
        proto.opset_import.insert(0, tidy_core::test_models::opset("ai.onnx.ml", 3));
        fs_err::write(&path, proto.encode_to_vec())?;
        let path = path.to_string_lossy().to_string();
        let params = Parameters::from_clap(&app().try_get_matches_from(["tidy", path.as_str()])?)?;
        assert_eq!(params.model.opset_version()?, 3);
        script(&params)?;
        Ok(())
    }

    #[test]
    fn script_fails_without_opset() -> TractResult<()> {
        let mut proto = tidy_core::test_models::relu_chain(&[1, 4]);
        proto.opset_import.clear();
        let params = Parameters { model: OnnxModel::from_proto(proto) };
        assert!(script(&params).is_err());
        Ok(())
    }

    #[test]
    fn verbosity_filters() {
        assert_eq!(log_filter(0), "tidy=warn,tract=warn");
        assert_eq!(log_filter(1), "tidy=info,tract=info");
        assert_eq!(log_filter(7), "tidy=trace,tract=trace");
    }
}
