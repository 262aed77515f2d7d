//! CLI module - Command-line interface for recipeshare
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// recipeshare - share recipes, search them, keep a private search history
#[derive(Parser)]
#[command(name = "recipeshare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Session token printed by `login`
    #[arg(long, global = true, env = "RECIPESHARE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a default config file and print a fresh encryption key
    #[command(alias = "--init")]
    Init,

    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// YYYY-MM-DD
        #[arg(long)]
        birthdate: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },

    /// Log in and print a session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged in account
    Whoami,

    /// Change the password of the logged in account
    Passwd {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },

    /// Browse and manage recipes
    #[command(alias = "r")]
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },

    /// Search recipes (recorded in your history when logged in)
    #[command(alias = "s")]
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Autocomplete a partial query
    Suggest {
        #[arg(required = true)]
        partial: Vec<String>,
    },

    /// Show or clear your search history
    #[command(alias = "h")]
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },

    /// Show the media feed
    Feed {
        /// Only recipes uploaded by users
        #[arg(long)]
        community: bool,
        /// Continue after this recipe id
        #[arg(long)]
        cursor: Option<i32>,
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Like or unlike a recipe
    Like { id: i32 },

    /// Save or unsave a recipe
    Save { id: i32 },

    /// Show your profile, or set its picture
    Profile {
        /// New profile image URL
        #[arg(long)]
        image_url: Option<String>,
    },

    /// List your own and saved recipes
    Cookbook,

    /// Remove expired sessions
    PurgeSessions,
}

#[derive(Subcommand)]
pub enum RecipeCommands {
    /// List visible recipes
    #[command(alias = "ls")]
    List,
    /// Show one recipe
    Show { id: i32 },
    /// Publish a recipe from a JSON file
    Create {
        #[arg(long)]
        file: std::path::PathBuf,
    },
    /// Replace a recipe with the contents of a JSON file
    Update {
        id: i32,
        #[arg(long)]
        file: std::path::PathBuf,
    },
    /// Delete one of your recipes
    #[command(alias = "rm")]
    Delete { id: i32 },
    /// List categories
    Categories,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// Show history, newest first
    #[command(alias = "ls")]
    List,
    /// Delete one entry
    #[command(alias = "rm")]
    Delete {
        id: String,
        /// "history" or "log", as shown by `history list`
        #[arg(long)]
        source: crate::domain::HistorySource,
    },
    /// Clear all, today's, or a date range of history
    Clear {
        #[arg(long, conflicts_with_all = ["from", "to"])]
        today: bool,
        /// RFC 3339 timestamp or YYYY-MM-DD (start of day, local time)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// RFC 3339 timestamp or YYYY-MM-DD (end of day, local time)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
}

pub use commands::*;
