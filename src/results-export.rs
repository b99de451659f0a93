//! A simple CLI tool for exporting the results of D-Voting elections.
//! This uses the client's own aggregation code, and produces exactly the
//! `result.json` document the web front end offers for download.

use std::fs;

use clap::{Arg, ArgAction, ArgMatches, Command};

use dvoting_client::{
    config::Config,
    logging::init_logging,
    model::{
        election::{ElectionInfo, Status},
        results::{DirectorySink, ResultExport},
    },
};

const PROGRAM_NAME: &str = "results-export";

const ABOUT_TEXT: &str = "Export the results of a D-Voting election.

EXIT CODES:
     0: Export succeeded.
   255: Ran successfully, but the election has no results yet.
 Other: Error.";

const ELECTION_PATH: &str = "ELECTION_PATH";

const ELECTION_PATH_HELP: &str = "The path to a JSON dump of an election,\n\
as returned by `GET /evoting/elections/<election_id>`";

const OUTPUT_DIR: &str = "OUTPUT_DIR";

const OUTPUT_DIR_HELP: &str = "Write result.json into this directory instead of printing it";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(ELECTION_PATH)
                .help(ELECTION_PATH_HELP)
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(OUTPUT_DIR)
                .short('o')
                .long("output")
                .help(OUTPUT_DIR_HELP)
                .action(ArgAction::Set),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON dump.
    Format(String),
    /// The election has not reached the point where results exist.
    NoResults(Status),
}

/// Load the dump and build the export document.
fn export(path: &str) -> Result<ResultExport, Error> {
    let json = fs::read_to_string(path).map_err(|e| Error::IO(e.to_string()))?;
    let election = ElectionInfo::from_json(&json).map_err(|e| Error::Format(e.to_string()))?;
    if election.status != Status::ResultAvailable {
        return Err(Error::NoResults(election.status));
    }
    Ok(election.export())
}

/// Write the document where it was asked for.
fn output(export: &ResultExport, dir: Option<&String>) -> Result<(), Error> {
    match dir {
        Some(dir) => {
            let mut sink = DirectorySink::new(dir);
            export
                .save(&mut sink)
                .map_err(|e| Error::IO(e.to_string()))?;
            println!(
                "Exported {} vote{} to {dir}.",
                export.number_of_votes,
                if export.number_of_votes != 1 { "s" } else { "" }
            );
        }
        None => {
            let json = export.to_json().map_err(|e| Error::Format(e.to_string()))?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Run the export, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    // Required argument, clap guarantees it is present.
    let Some(path) = args.get_one::<String>(ELECTION_PATH) else {
        return 2;
    };
    let result = export(path).and_then(|export| output(&export, args.get_one(OUTPUT_DIR)));
    match result {
        Ok(()) => 0,
        Err(Error::IO(msg)) => {
            println!("IO error: {}", msg);
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid election dump: {}", msg);
            1
        }
        Err(Error::NoResults(status)) => {
            println!("No results available yet: the election is {}.", status);
            255
        }
    }
}

fn main() {
    // Logging is optional for this tool: only set it up if configured.
    if let Ok(config) = Config::load() {
        if config.log_config().exists() {
            if let Err(e) = init_logging(config.log_config()) {
                eprintln!("{e}");
            }
        }
    }

    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}
