use clap::{Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "fsvault",
    about = "Encrypted key-value storage in per-key files",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Directory the storage folder lives in (defaults to the platform data directory).
    #[arg(long, global = true)]
    pub location: Option<String>,
    /// Storage folder name inside the location.
    #[arg(long, global = true)]
    pub folder: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a value under a key, replacing any previous value.
    Set { key: String, value: String },
    /// Print the value stored under a key.
    Get { key: String },
    /// Remove a key (succeeds when the key is absent).
    Remove { key: String },
    /// List every stored key.
    Keys,
    /// Round-trip a probe entry through the encrypted store.
    Health,
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_subcommand() {
        let cli =
            Cli::try_parse_from(["fsvault", "set", "count", "1"]).expect("parse should succeed");
        assert_eq!(
            cli.command,
            Command::Set {
                key: "count".into(),
                value: "1".into()
            }
        );
    }

    #[test]
    fn global_overrides_follow_subcommand() {
        let args = ["fsvault", "keys", "--location", "/tmp/data", "--folder", "x"];
        let cli = Cli::try_parse_from(args).expect("parse should succeed");
        assert_eq!(cli.command, Command::Keys);
        assert_eq!(cli.location.as_deref(), Some("/tmp/data"));
        assert_eq!(cli.folder.as_deref(), Some("x"));
    }

    #[test]
    fn requires_a_subcommand() {
        assert!(Cli::try_parse_from(["fsvault"]).is_err());
    }

    #[test]
    fn parses_config_init_subcommand() {
        let cli = Cli::try_parse_from(["fsvault", "config", "init"]).expect("parse should succeed");
        assert_eq!(cli.command, Command::Config(ConfigCommand::Init));
    }
}
