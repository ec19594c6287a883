//! Command-line arguments

use clap::{ArgAction, Parser, Subcommand};
use datafiles_client::{Config, DataFileId};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "datafiles")]
#[command(about = "Create, upload, inspect and update data files")]
#[command(version)]
pub struct Cli {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:8000", env = "DATAFILES_BASE_URL", global = true)]
    pub base_url: String,

    /// Session cookie value
    #[arg(long, env = "DATAFILES_SESSION_ID", hide_env_values = true, global = true)]
    pub session_id: Option<String>,

    /// CSRF token
    #[arg(long, env = "DATAFILES_CSRF_TOKEN", hide_env_values = true, global = true)]
    pub csrf_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", env = "DATAFILES_TIMEOUT_SECS", global = true)]
    pub timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, env = "DATAFILES_DEBUG", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create a data file from a remote URL
    AddUrl {
        /// URL the server fetches the data from
        url: String,
    },

    /// Create a data file from pasted text (argument, --file, or stdin)
    AddText {
        /// Text content
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Upload a local file (Ctrl-C cancels)
    Upload {
        /// File to upload
        path: PathBuf,

        /// Do not print progress
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show a data file
    Get {
        id: DataFileId,
    },

    /// Set whether the first row is a column header
    SetHeader {
        id: DataFileId,

        #[arg(action = ArgAction::Set)]
        header: bool,
    },

    /// List data files
    List {
        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// Items to skip
        #[arg(long)]
        offset: Option<u32>,
    },
}

impl Cli {
    /// Client configuration from the parsed arguments
    pub fn config(&self) -> Config {
        let mut config = Config::new(&self.base_url).with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(session) = &self.session_id {
            config = config.with_session(session);
        }
        if let Some(token) = &self.csrf_token {
            config = config.with_csrf_token(token);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("datafiles").chain(args.iter().copied())).unwrap()
    }

    #[rstest]
    #[case(&["add-url", "http://x/y.csv"], Command::AddUrl { url: "http://x/y.csv".into() })]
    #[case(&["add-text", "a,b"], Command::AddText { text: Some("a,b".into()), file: None })]
    #[case(&["add-text", "--file", "in.csv"], Command::AddText { text: None, file: Some("in.csv".into()) })]
    #[case(&["add-text"], Command::AddText { text: None, file: None })]
    #[case(&["upload", "people.csv", "-q"], Command::Upload { path: "people.csv".into(), quiet: true })]
    #[case(&["get", "7"], Command::Get { id: 7 })]
    #[case(&["set-header", "7", "false"], Command::SetHeader { id: 7, header: false })]
    #[case(&["list", "--limit", "10"], Command::List { limit: Some(10), offset: None })]
    fn test_parse_commands(#[case] args: &[&str], #[case] expected: Command) {
        assert_eq!(parse(args).command, expected);
    }

    #[rstest]
    #[case(&["get", "seven"])]
    #[case(&["set-header", "7", "maybe"])]
    #[case(&["add-text", "a,b", "--file", "in.csv"])]
    #[case(&["add-url"])]
    fn test_rejects_invalid(#[case] args: &[&str]) {
        let result = Cli::try_parse_from(std::iter::once("datafiles").chain(args.iter().copied()));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_args() {
        let cli = parse(&[
            "get",
            "1",
            "--base-url",
            "http://db.example:8000",
            "--csrf-token",
            "tok",
            "--timeout-secs",
            "5",
        ]);
        let config = cli.config();
        assert_eq!(config.base_url(), "http://db.example:8000");
        assert_eq!(config.csrf_token.as_deref(), Some("tok"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
