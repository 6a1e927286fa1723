//! Command-line interface.
//!
//! Flags override values from the TOML file; each flag can also be set
//! through a `STATIC_HOST_*` environment variable.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(name = "static-host")]
#[command(about = "Static site hosting front end", long_about = None)]
pub struct Cli {
    /// Path to the TOML service configuration
    #[arg(short, long, env = "STATIC_HOST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the site and control servers (default)
    Serve,
    /// Validate a routing document and print its normalized form
    Check {
        /// Routing document to check
        path: PathBuf,
    },
}

#[derive(Debug, Default, Args)]
pub struct OverrideArgs {
    /// Domain suffix served by this instance
    #[arg(long, env = "STATIC_HOST_DOMAIN_SUFFIX", global = true)]
    pub domain_suffix: Option<String>,

    /// Host label marking a direct deployment reference
    #[arg(long, env = "STATIC_HOST_REF_LABEL", global = true)]
    pub ref_label: Option<String>,

    /// Host label marking an alias
    #[arg(long, env = "STATIC_HOST_ALIAS_LABEL", global = true)]
    pub alias_label: Option<String>,

    /// Directory backing the object store
    #[arg(long, env = "STATIC_HOST_STORAGE_ROOT", global = true)]
    pub storage_root: Option<String>,

    /// Key prefix under which deployments are stored
    #[arg(long, env = "STATIC_HOST_STORAGE_PREFIX", global = true)]
    pub storage_prefix: Option<String>,

    /// JSON file seeding the alias metadata store
    #[arg(long, env = "STATIC_HOST_METADATA_FILE", global = true)]
    pub metadata_file: Option<String>,

    /// Site listener address
    #[arg(long, env = "STATIC_HOST_BIND_ADDRESS", global = true)]
    pub bind_address: Option<String>,

    /// Control listener address
    #[arg(long, env = "STATIC_HOST_CONTROL_ADDRESS", global = true)]
    pub control_address: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "STATIC_HOST_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,
}

impl From<OverrideArgs> for ConfigOverrides {
    fn from(args: OverrideArgs) -> Self {
        ConfigOverrides {
            domain_suffix: args.domain_suffix,
            ref_label: args.ref_label,
            alias_label: args.alias_label,
            storage_root: args.storage_root,
            storage_prefix: args.storage_prefix,
            metadata_file: args.metadata_file,
            bind_address: args.bind_address,
            control_address: args.control_address,
            log_level: args.log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::try_parse_from(["static-host", "--domain-suffix", "example.com"]).unwrap();
        assert!(cli.command.is_none());
        let overrides = ConfigOverrides::from(cli.overrides);
        assert_eq!(overrides.domain_suffix.as_deref(), Some("example.com"));
        assert!(overrides.bind_address.is_none());
    }

    #[test]
    fn test_check_subcommand() {
        let cli = Cli::try_parse_from(["static-host", "check", "site.json"]).unwrap();
        match cli.command {
            Some(Command::Check { path }) => assert_eq!(path, PathBuf::from("site.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
