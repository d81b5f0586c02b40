//! `filtergen` command line front end

mod config;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use filtergen_definition::{DefinitionDocument, DefinitionSchema};
use filtergen_expand::{Pipeline, PreprocessStrategy, UnknownStrategyPolicy};

use crate::config::GeneratorConfig;
use crate::output::{EmitKind, OutputFormat};

fn schema_arg() -> Arg {
    Arg::new("schema")
        .long("schema")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("Definition schema (defaults to config, then the bundled schema)")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("Configuration file (defaults to the nearest filtergen.toml)")
}

fn cli() -> Command {
    Command::new("filtergen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Expand filter benchmark definitions into concrete configurations")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (-v info, -vv debug); RUST_LOG overrides"),
        )
        .subcommand(
            Command::new("expand")
                .about("Validate, merge and expand a definition")
                .arg(
                    Arg::new("definition")
                        .required(true)
                        .value_name("DEFINITION")
                        .value_parser(value_parser!(PathBuf))
                        .help("Benchmark definition (.json, .yaml or .yml)"),
                )
                .arg(schema_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the result here instead of stdout"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(value_parser!(OutputFormat))
                        .help("Output format"),
                )
                .arg(
                    Arg::new("emit")
                        .long("emit")
                        .value_parser(value_parser!(EmitKind))
                        .help("Write flat configurations or the expanded definition"),
                )
                .arg(
                    Arg::new("lenient")
                        .long("lenient")
                        .action(ArgAction::SetTrue)
                        .help("Pass entries through when the preprocess name is unknown"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check definitions against the schema")
                .arg(
                    Arg::new("definitions")
                        .required(true)
                        .num_args(1..)
                        .value_name("DEFINITION")
                        .value_parser(value_parser!(PathBuf))
                        .help("Benchmark definitions to check"),
                )
                .arg(schema_arg())
                .arg(config_arg()),
        )
        .subcommand(Command::new("strategies").about("List recognised preprocess strategies"))
        .subcommand(Command::new("init-config").about("Print a default filtergen.toml"))
}

/// Setup logging; warnings are always shown, `-v` adds more
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_schema(flag: Option<&PathBuf>, config: &GeneratorConfig) -> anyhow::Result<DefinitionSchema> {
    match flag.or(config.schema.path.as_ref()) {
        Some(path) => DefinitionSchema::from_path(path)
            .with_context(|| format!("failed to load schema {}", path.display())),
        None => DefinitionSchema::bundled().context("failed to compile bundled schema"),
    }
}

fn load_document(path: &Path) -> anyhow::Result<DefinitionDocument> {
    DefinitionDocument::from_path(path)
        .with_context(|| format!("failed to load definition {}", path.display()))
}

fn expand(args: &ArgMatches) -> anyhow::Result<bool> {
    let config = GeneratorConfig::resolve(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let schema = load_schema(args.get_one::<PathBuf>("schema"), &config)?;

    let policy = if args.get_flag("lenient") {
        UnknownStrategyPolicy::Passthrough
    } else {
        config.pipeline.unknown_strategy
    };
    let format = args
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or(config.output.format);
    let emit = args
        .get_one::<EmitKind>("emit")
        .copied()
        .unwrap_or(config.output.emit);

    let Some(path) = args.get_one::<PathBuf>("definition") else {
        anyhow::bail!("missing definition path");
    };
    let document = load_document(path)?;

    let result = Pipeline::new(schema)
        .with_policy(policy)
        .run(document)
        .with_context(|| format!("failed to expand {}", path.display()))?;

    let rendered = output::render(&result, emit, format)?;
    output::write_output(args.get_one::<PathBuf>("output").map(PathBuf::as_path), &rendered)?;

    Ok(true)
}

fn validate(args: &ArgMatches) -> anyhow::Result<bool> {
    let config = GeneratorConfig::resolve(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let schema = load_schema(args.get_one::<PathBuf>("schema"), &config)?;

    let mut failures = 0usize;
    for path in args.get_many::<PathBuf>("definitions").into_iter().flatten() {
        let checked = load_document(path).and_then(|document| {
            schema
                .validate(document)
                .with_context(|| format!("{} does not match the schema", path.display()))
        });

        match checked {
            Ok(_) => println!("ok      {}", path.display()),
            Err(e) => {
                failures += 1;
                println!("FAILED  {}: {e:#}", path.display());
            }
        }
    }

    if failures > 0 {
        tracing::warn!("{} definition(s) failed validation", failures);
    }
    Ok(failures == 0)
}

fn strategies() {
    for strategy in PreprocessStrategy::ALL {
        println!("{:<34} {}", strategy.name(), strategy.description());
    }
}

/// Dispatch a subcommand; `Ok(false)` means it ran but reported failures
fn run(matches: &ArgMatches) -> anyhow::Result<bool> {
    match matches.subcommand() {
        Some(("expand", args)) => expand(args),
        Some(("validate", args)) => validate(args),
        Some(("strategies", _)) => {
            strategies();
            Ok(true)
        }
        Some(("init-config", _)) => {
            print!("{}", GeneratorConfig::default_toml());
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    setup_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn expand_flags_parse() {
        let matches = cli()
            .try_get_matches_from([
                "filtergen", "-vv", "expand", "fpr.yaml", "--format", "yaml", "--emit",
                "definition", "--lenient",
            ])
            .unwrap();

        assert_eq!(matches.get_count("verbose"), 2);
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "expand");
        assert_eq!(args.get_one::<OutputFormat>("format"), Some(&OutputFormat::Yaml));
        assert_eq!(args.get_one::<EmitKind>("emit"), Some(&EmitKind::Definition));
        assert!(args.get_flag("lenient"));
    }

    #[test]
    fn validate_takes_many_definitions() {
        let matches = cli()
            .try_get_matches_from(["filtergen", "validate", "a.json", "b.yml"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();

        assert_eq!(args.get_many::<PathBuf>("definitions").unwrap().count(), 2);
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(cli()
            .try_get_matches_from(["filtergen", "expand", "fpr.json", "--format", "toml"])
            .is_err());
    }

    #[test]
    fn expand_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let definition = dir.path().join("fpr.json");
        std::fs::write(
            &definition,
            r#"{
                "name": "fpr",
                "parameter": {"k": [4], "s": [8, 16, 4, 1, 10], "n_elements": [1000]},
                "preprocess": "preprocess_s",
                "benchmarks": [{"filter": {"type": "Cuckoo", "variant": "Standard4"}}]
            }"#,
        )
        .unwrap();
        let config = dir.path().join("filtergen.toml");
        std::fs::write(&config, GeneratorConfig::default_toml()).unwrap();
        let target = dir.path().join("out/configs.json");

        let argv: Vec<OsString> = vec![
            "filtergen".into(),
            "expand".into(),
            definition.into(),
            "--config".into(),
            config.into(),
            "--output".into(),
            target.clone().into(),
        ];
        let matches = cli().try_get_matches_from(argv).unwrap();

        assert!(run(&matches).unwrap());
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(written["configs"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn validate_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"name": "bad", "benchmarks": []}"#).unwrap();
        let config = dir.path().join("filtergen.toml");
        std::fs::write(&config, "").unwrap();

        let argv: Vec<OsString> = vec![
            "filtergen".into(),
            "validate".into(),
            bad.into(),
            "--config".into(),
            config.into(),
        ];
        let matches = cli().try_get_matches_from(argv).unwrap();

        assert!(!run(&matches).unwrap());
    }
}
