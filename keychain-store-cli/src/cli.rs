//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keychain_store::Accessibility;

/// Inspect and edit a scoped secure store.
#[derive(Parser, Debug)]
#[command(name = "keychain-store")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Storage backend.
    #[arg(long, value_enum, default_value_t = BackendKind::File, global = true)]
    pub backend: BackendKind,

    /// Path of the file backend document (default: platform data directory).
    #[arg(long, env = "KEYCHAIN_STORE_PATH", global = true)]
    pub store_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Which account and access group the command operates on.
#[derive(Args, Debug)]
pub struct ScopeArgs {
    /// JSON store configuration (`account`, `access_group`, `accessibility`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Account items are scoped to. Overrides the configuration file.
    #[arg(long, env = "KEYCHAIN_STORE_ACCOUNT", global = true)]
    pub account: Option<String>,

    /// Access group items are scoped to. Overrides the configuration file.
    #[arg(long, env = "KEYCHAIN_STORE_ACCESS_GROUP", global = true)]
    pub access_group: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Unencrypted JSON document. Development only.
    File,
    /// Apple Keychain Services (requires the `keychain` feature).
    Keychain,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value stored under a key.
    Get {
        key: String,
        /// Print the raw bytes base64-encoded.
        #[arg(long)]
        base64: bool,
    },

    /// Store a value, creating or replacing the item.
    Set {
        key: String,
        value: String,
        /// Decode VALUE from base64 before storing.
        #[arg(long)]
        base64: bool,
        /// Accessibility applied when the item is created.
        #[arg(long)]
        accessibility: Option<Accessibility>,
    },

    /// Replace the value of an existing item.
    Update {
        key: String,
        value: String,
        /// Decode VALUE from base64 before storing.
        #[arg(long)]
        base64: bool,
    },

    /// Delete one item.
    Delete { key: String },

    /// Exit with status 0 if the key exists, 1 otherwise.
    Has { key: String },

    /// List the keys of the store.
    Keys,

    /// Delete every item of the store.
    Clear,
}
