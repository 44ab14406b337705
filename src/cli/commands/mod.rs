use crate::diary::EntryMode;
use clap::{Parser, Subcommand};

/// `iris-diary` - autonomous reflection diary for an AI assistant.
#[derive(Parser, Debug)]
#[command(name = "iris-diary")]
#[command(version)]
#[command(about = "An autonomous reflection diary for an AI assistant.", long_about = None)]
pub struct Cli {
    /// Session to act on (defaults to `diary.active_session`)
    #[arg(long, global = true)]
    pub session: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the background diary worker until Ctrl-C
    Daemon,

    /// Run one governed attempt, as the scheduler would
    Attempt,

    /// Write an entry now, bypassing the admission governor
    Force {
        /// Pin the entry mode (directive, exploratory, reflective, casual)
        #[arg(long)]
        mode: Option<EntryMode>,
    },

    /// Show the most recent entries, newest first
    List {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Case-insensitive search over titles, bodies and tags
    Search {
        query: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show configuration, governor state and component health
    Status,
}
