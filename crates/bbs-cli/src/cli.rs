use std::path::PathBuf;

use bbs_core::BoardVariant;
use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `bbsync` binary.
#[derive(Debug, Parser)]
#[command(name = "bbsync", version, about = "bbsync - text board mirror and poster")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Protocol variant of the board: classic, a, b, c
    #[arg(long, global = true, default_value = "classic")]
    pub variant: BoardVariant,

    /// Mirror store root (defaults to the configured store root)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sync a board's thread listing into the local index
    Subjects {
        board_url: String,
    },
    /// Fetch one thread's content (differentially when possible)
    Thread {
        board_url: String,
        /// Content file name, e.g. 1234567890.dat
        file: String,
    },
    /// Submit a reply, or a new thread when --thread is omitted
    Post {
        board_url: String,
        /// Thread key to reply to
        #[arg(long)]
        thread: Option<String>,
        /// Subject for a new thread
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        body: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        mail: String,
    },
    /// Print the stored index without touching the network
    Entries {
        board_url: String,
    },
    /// Set a thread's read marker
    MarkRead {
        board_url: String,
        file: String,
        marker: u32,
    },
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{BoardVariant, Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bbsync",
            "thread",
            "https://jbbs.example.org/game/12345/",
            "1600000000.cgi",
            "--variant",
            "b",
            "--verbose",
        ])
        .expect("cli should parse");

        assert_eq!(cli.variant, BoardVariant::VariantB);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Thread { ref file, .. } if file == "1600000000.cgi"));
    }

    #[test]
    fn post_requires_body() {
        assert!(Cli::try_parse_from(["bbsync", "post", "https://x.example/b/"]).is_err());

        let cli = Cli::try_parse_from([
            "bbsync",
            "post",
            "https://x.example/b/",
            "--thread",
            "123",
            "--body",
            "hi",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::Post {
                thread, body, name, ..
            } => {
                assert_eq!(thread.as_deref(), Some("123"));
                assert_eq!(body, "hi");
                assert!(name.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn mark_read_takes_marker() {
        let cli = Cli::try_parse_from(["bbsync", "mark-read", "https://x.example/b/", "1.dat", "42"])
            .expect("cli should parse");
        assert!(matches!(cli.command, Commands::MarkRead { marker: 42, .. }));
    }
}
