//! `fieldlock` command-line entry point

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use fieldlock_cli::{check_field, diff_documents, load_labeler, read_document, strip_document};
use fieldlock_ownership::UserId;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("fieldlock")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect field ownership in JSON documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML store config supplying field labels"),
        )
        .subcommand(
            Command::new("diff")
                .about("Print the fields an edit would claim")
                .arg(file_arg("old", "Document before the edit"))
                .arg(file_arg("new", "Document after the edit"))
                .arg(user_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Check whether a user may write a field")
                .arg(file_arg("doc", "Persisted document with ownership metadata"))
                .arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .help("Field path, e.g. items[2].amount"),
                )
                .arg(user_arg()),
        )
        .subcommand(
            Command::new("strip")
                .about("Split a persisted document into content and ownership")
                .arg(file_arg("doc", "Persisted document with ownership metadata")),
        )
}

fn file_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .help(help)
}

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .required(true)
        .help("Acting user id")
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn path_arg(args: &ArgMatches, name: &str) -> Result<PathBuf> {
    args.get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing --{name}"))
}

fn string_arg<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("missing --{name}"))
}

/// Run the selected subcommand, returning the process exit code
fn run(matches: &ArgMatches) -> Result<i32> {
    let labeler = load_labeler(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("diff", args)) => {
            let old = read_document(&path_arg(args, "old")?)?;
            let new = read_document(&path_arg(args, "new")?)?;
            let user = UserId::from(string_arg(args, "user")?);

            let claims = diff_documents(old, new, &user);
            println!("{}", serde_json::to_string_pretty(&claims)?);
            Ok(0)
        }
        Some(("check", args)) => {
            let doc = read_document(&path_arg(args, "doc")?)?;
            let user = UserId::from(string_arg(args, "user")?);

            let verdict = check_field(doc, string_arg(args, "path")?, &user, &labeler)?;
            println!("{verdict}");
            Ok(verdict.exit_code())
        }
        Some(("strip", args)) => {
            let doc = read_document(&path_arg(args, "doc")?)?;
            println!("{}", serde_json::to_string_pretty(&strip_document(doc))?);
            Ok(0)
        }
        _ => Ok(2),
    }
}

fn main() {
    init_logging();
    let matches = cli().get_matches();

    match run(&matches) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}
