//! Developer CLI for `keychain-store`.

mod cli;
mod commands;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use eyre::{eyre, WrapErr};
use keychain_store::backend::FileBackend;
use keychain_store::{KeychainStore, SecureStorageBackend, StoreConfig};
use tracing_subscriber::EnvFilter;

use cli::{BackendKind, Cli, ScopeArgs};

fn main() -> eyre::Result<ExitCode> {
    // RUST_LOG=keychain_store=debug shows every backend round trip.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.scope)?;
    let backend = open_backend(cli.backend, cli.store_path)?;
    let store = KeychainStore::from_config(backend, &config)
        .wrap_err("invalid store configuration")?;
    tracing::debug!(identity = %store.identity(), "store opened");

    let mut stdout = std::io::stdout().lock();
    if commands::execute(&store, cli.command, &mut stdout)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Merges the optional configuration file with command-line overrides.
fn resolve_config(scope: &ScopeArgs) -> eyre::Result<StoreConfig> {
    let mut config = match &scope.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<StoreConfig>(&raw)
                .wrap_err_with(|| format!("failed to parse {}", path.display()))?
        }
        None => {
            let account = scope
                .account
                .clone()
                .ok_or_else(|| eyre!("--account (or KEYCHAIN_STORE_ACCOUNT) is required"))?;
            StoreConfig::new(account, None)
        }
    };
    if let Some(account) = &scope.account {
        config.account.clone_from(account);
    }
    if scope.access_group.is_some() {
        config.access_group.clone_from(&scope.access_group);
    }
    Ok(config)
}

fn default_store_path() -> eyre::Result<PathBuf> {
    let dir = dirs::data_dir().ok_or_else(|| eyre!("no platform data directory; pass --store-path"))?;
    Ok(dir.join("keychain-store").join("store.json"))
}

fn open_backend(
    kind: BackendKind,
    store_path: Option<PathBuf>,
) -> eyre::Result<Box<dyn SecureStorageBackend>> {
    match kind {
        BackendKind::File => {
            let path = match store_path {
                Some(path) => path,
                None => default_store_path()?,
            };
            tracing::debug!(path = %path.display(), "using file backend");
            let backend = FileBackend::new(&path)
                .wrap_err_with(|| format!("failed to prepare {}", path.display()))?;
            Ok(Box::new(backend))
        }
        BackendKind::Keychain => keychain_backend(),
    }
}

#[cfg(all(feature = "keychain", target_vendor = "apple"))]
fn keychain_backend() -> eyre::Result<Box<dyn SecureStorageBackend>> {
    Ok(Box::new(keychain_store::backend::KeychainBackend::new()))
}

#[cfg(not(all(feature = "keychain", target_vendor = "apple")))]
fn keychain_backend() -> eyre::Result<Box<dyn SecureStorageBackend>> {
    eyre::bail!("the keychain backend requires an Apple target and the `keychain` feature")
}
