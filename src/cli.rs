use clap::{Parser, Subcommand};

/// Maintenance endpoint for the cleanup_old_games database procedure
#[derive(Parser)]
#[command(name = "cleanup-games", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP endpoint
    Serve {
        /// Port to bind (overrides CLEANUP_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the cleanup once and print the JSON result
    Invoke,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_accepted() {
        let cli = Cli::try_parse_from(["cleanup-games"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_port_override() {
        let cli = Cli::try_parse_from(["cleanup-games", "serve", "--port", "9001"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(9001) })));
    }

    #[test]
    fn test_invoke_subcommand() {
        let cli = Cli::try_parse_from(["cleanup-games", "invoke"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Invoke)));
    }
}
