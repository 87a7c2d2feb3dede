//! Command-line interface definitions.

use amity_domain::Audience;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Amity - friend requests and relationship queries over a local database
#[derive(Parser, Debug)]
#[command(name = "amity")]
#[command(about = "Manage friendships between identities", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./amity.toml when present)
    #[arg(short, long, env = "AMITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the config file)
    #[arg(short, long, env = "AMITY_DATABASE")]
    pub database: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new identity
    Register {
        /// Contact handle (e.g. an email address)
        handle: String,

        /// Who may send this identity friend requests
        #[arg(long, default_value = "everyone", value_parser = parse_audience)]
        friend_requests: Audience,
    },

    /// Change who may send an identity friend requests
    Privacy {
        /// Identity handle
        handle: String,

        /// New audience (everyone, friends_of_friends, friends, nobody)
        #[arg(value_parser = parse_audience)]
        friend_requests: Audience,
    },

    /// Send a friend request
    Send {
        /// Requesting identity handle
        from: String,

        /// Handle of the identity to befriend
        to: String,
    },

    /// Accept a pending friend request
    Accept {
        /// Handle of the identity that sent the request
        requester: String,

        /// Handle of the identity that received it
        requested: String,
    },

    /// Deny (delete) a pending friend request
    Deny {
        /// Handle of the identity that sent the request
        requester: String,

        /// Handle of the identity that received it
        requested: String,
    },

    /// List pending requests sent and received
    Requests {
        /// Identity handle
        handle: String,
    },

    /// List friends
    Friends {
        /// Identity handle
        handle: String,
    },

    /// List friends of friends
    Fof {
        /// Identity handle
        handle: String,
    },

    /// Classify the relationship between two identities
    Relationship {
        /// First identity handle
        a: String,

        /// Second identity handle
        b: String,
    },

    /// List friends two identities have in common
    Mutual {
        /// First identity handle
        a: String,

        /// Second identity handle
        b: String,
    },
}

fn parse_audience(s: &str) -> Result<Audience, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let cli = Cli::try_parse_from(["amity", "send", "alice", "bob"]).unwrap();
        match cli.command {
            Command::Send { from, to } => {
                assert_eq!(from, "alice");
                assert_eq!(to, "bob");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_parse_register_audience() {
        let cli = Cli::try_parse_from([
            "amity",
            "--database",
            "test.db",
            "register",
            "carol",
            "--friend-requests",
            "nobody",
        ])
        .unwrap();

        assert_eq!(cli.database, Some(PathBuf::from("test.db")));
        assert!(matches!(
            cli.command,
            Command::Register { friend_requests: Audience::Nobody, .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_audience() {
        assert!(Cli::try_parse_from(["amity", "privacy", "carol", "strangers"]).is_err());
    }
}
