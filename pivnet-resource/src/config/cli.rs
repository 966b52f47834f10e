//! Command-line options for pivnet-resource.

use super::ResourceSettings;
use commons::prelude_errors::*;
use commons::MergeOptions;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Names under which the binary may be installed, one per operation.
static OPERATION_NAMES: &[&str] = &["check", "in", "out"];

/// CLI configuration flags, top-level.
#[derive(Debug, StructOpt)]
#[structopt(name = "pivnet-resource")]
pub struct CliOptions {
    /// Verbosity level
    #[structopt(short = "v", parse(from_occurrences))]
    pub verbosity: u64,

    #[structopt(subcommand)]
    pub command: Command,
}

/// Resource operation to run.
#[derive(Debug, PartialEq, Eq, StructOpt)]
pub enum Command {
    /// Report new product versions
    #[structopt(name = "check")]
    Check,

    /// Download a release into the destination directory
    #[structopt(name = "in")]
    In {
        /// Destination directory
        #[structopt(parse(from_os_str))]
        destination: PathBuf,
    },

    /// Publish a release from the sources directory
    #[structopt(name = "out")]
    Out {
        /// Sources directory
        #[structopt(parse(from_os_str))]
        sources: PathBuf,
    },
}

impl CliOptions {
    /// Parse arguments, dispatching on the program name when the binary is
    /// invoked through a `check`, `in` or `out` link.
    pub fn from_args_with_argv0<I, T>(args: I) -> std::result::Result<Self, structopt::clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        use structopt::StructOpt;

        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let operation = args
            .first()
            .and_then(|argv0| Path::new(argv0).file_name())
            .and_then(|name| name.to_str())
            .filter(|name| OPERATION_NAMES.contains(name))
            .map(OsString::from);
        if let Some(operation) = operation {
            args.insert(1, operation);
        }

        Self::from_iter_safe(args)
    }
}

impl MergeOptions<&CliOptions> for ResourceSettings {
    fn try_merge(&mut self, opts: &CliOptions) -> Fallible<()> {
        if opts.verbosity > 0 {
            self.verbosity = self
                .verbosity
                .max(commons::verbosity_to_level(opts.verbosity));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_subcommands() {
        let check = CliOptions::from_args_with_argv0(vec!["pivnet-resource", "check"]).unwrap();
        assert_eq!(check.command, Command::Check);
        assert_eq!(check.verbosity, 0);

        let fetch =
            CliOptions::from_args_with_argv0(vec!["pivnet-resource", "-vv", "in", "/tmp/dest"])
                .unwrap();
        assert_eq!(
            fetch.command,
            Command::In {
                destination: PathBuf::from("/tmp/dest")
            }
        );
        assert_eq!(fetch.verbosity, 2);
    }

    #[test]
    fn cli_dispatch_on_program_name() {
        let check = CliOptions::from_args_with_argv0(vec!["/opt/resource/check"]).unwrap();
        assert_eq!(check.command, Command::Check);

        let publish =
            CliOptions::from_args_with_argv0(vec!["/opt/resource/out", "/tmp/build"]).unwrap();
        assert_eq!(
            publish.command,
            Command::Out {
                sources: PathBuf::from("/tmp/build")
            }
        );
    }

    #[test]
    fn cli_requires_directories() {
        assert!(CliOptions::from_args_with_argv0(vec!["/opt/resource/out"]).is_err());
        assert!(CliOptions::from_args_with_argv0(vec!["pivnet-resource", "in"]).is_err());
        assert!(CliOptions::from_args_with_argv0(vec!["pivnet-resource"]).is_err());
    }

    #[test]
    fn cli_verbosity_overrides_default() {
        let mut settings = ResourceSettings::default();
        assert_eq!(settings.verbosity, log::LevelFilter::Info);

        let cli = CliOptions::from_args_with_argv0(vec!["pivnet-resource", "-v", "check"]).unwrap();
        settings.try_merge(&cli).unwrap();
        assert_eq!(settings.verbosity, log::LevelFilter::Debug);

        let quiet = CliOptions::from_args_with_argv0(vec!["pivnet-resource", "check"]).unwrap();
        settings.try_merge(&quiet).unwrap();
        assert_eq!(settings.verbosity, log::LevelFilter::Debug);
    }
}
