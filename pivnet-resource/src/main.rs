#[macro_use]
extern crate log;

use commons::prelude_errors::*;
use pivnet_resource::concourse::{CheckRequest, InRequest, OutRequest};
use pivnet_resource::config::{CliOptions, Command, ResourceSettings};
use pivnet_resource::{check, clients, fetch, publish, validator};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Write};

/// Crates whose log output is shown.
static LOG_TARGETS: &[&str] = &["pivnet_resource", "pivnet", "s3", "commons"];

fn main() -> Result<(), Error> {
    let cli = CliOptions::from_args_with_argv0(std::env::args_os()).unwrap_or_else(|e| e.exit());

    match cli.command {
        Command::Check => {
            let request: CheckRequest = read_request()?;
            let settings = prepare(&cli, &request.source)?;
            validator::validate_check(&request)?;

            let service = clients::release_service(&settings)?;
            write_response(&check::run(&service, &settings, &request)?)
        }
        Command::In { ref destination } => {
            let request: InRequest = read_request()?;
            let settings = prepare(&cli, &request.source)?;
            validator::validate_in(&request)?;

            let service = clients::release_service(&settings)?;
            write_response(&fetch::run(&service, &settings, &request, destination)?)
        }
        Command::Out { ref sources } => {
            let request: OutRequest = read_request()?;
            let settings = prepare(&cli, &request.source)?;
            validator::validate_out(&request)?;

            let service = clients::release_service(&settings)?;
            let store = clients::object_store(&settings)?;
            write_response(&publish::run(
                &service, &store, &settings, &request, sources,
            )?)
        }
    }
}

/// Assemble settings and set up logging.
fn prepare(
    cli: &CliOptions,
    source: &pivnet_resource::concourse::Source,
) -> Fallible<ResourceSettings> {
    let settings = ResourceSettings::assemble(cli, source)?;
    commons::init_logging(LOG_TARGETS, settings.verbosity);
    debug!("resource settings:\n{:#?}", settings);
    Ok(settings)
}

fn read_request<T: DeserializeOwned>() -> Fallible<T> {
    serde_json::from_reader(io::stdin().lock()).context("failed to parse request from stdin")
}

fn write_response<T: Serialize>(response: &T) -> Fallible<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, response)?;
    writeln!(out)?;
    Ok(())
}
