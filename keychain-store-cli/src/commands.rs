//! Command execution.

use std::io::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use eyre::WrapErr;
use keychain_store::{KeychainStore, SecureStorageBackend};

use crate::cli::Command;

fn payload(value: String, base64: bool) -> eyre::Result<Vec<u8>> {
    if base64 {
        STANDARD.decode(value).wrap_err("VALUE is not valid base64")
    } else {
        Ok(value.into_bytes())
    }
}

/// Runs one command against `store`, writing results to `out`.
///
/// Returns `false` when `get` or `has` addresses a missing key. Absence is
/// not an error.
pub fn execute<B: SecureStorageBackend, W: Write>(
    store: &KeychainStore<B>,
    command: Command,
    out: &mut W,
) -> eyre::Result<bool> {
    match command {
        Command::Get { key, base64 } => {
            let Some(bytes) = store.get(&key)? else {
                tracing::info!(%key, "not found");
                return Ok(false);
            };
            if base64 {
                writeln!(out, "{}", STANDARD.encode(bytes))?;
            } else {
                match String::from_utf8(bytes) {
                    Ok(text) => writeln!(out, "{text}")?,
                    Err(err) => {
                        eyre::bail!("{key} is not valid UTF-8 ({err}); retry with --base64")
                    }
                }
            }
        }
        Command::Set {
            key,
            value,
            base64,
            accessibility,
        } => {
            let data = payload(value, base64)?;
            let accessibility = accessibility.unwrap_or_else(|| store.default_accessibility());
            store.set_with_accessibility(&key, &data, accessibility)?;
        }
        Command::Update { key, value, base64 } => {
            store.update(&key, &payload(value, base64)?)?;
        }
        Command::Delete { key } => store.delete(&key)?,
        Command::Has { key } => {
            if !store.has_key(&key)? {
                return Ok(false);
            }
        }
        Command::Keys => {
            let mut keys = store.all_keys()?;
            keys.sort();
            for key in keys {
                writeln!(out, "{key}")?;
            }
        }
        Command::Clear => {
            let report = store.delete_all()?;
            writeln!(out, "deleted {} item(s)", report.deleted)?;
            if !report.is_complete() {
                for (key, err) in &report.failed {
                    tracing::warn!(%key, "not deleted: {err}");
                }
                eyre::bail!("{} item(s) could not be deleted", report.failed.len());
            }
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use keychain_store::backend::FileBackend;
    use keychain_store::{Accessibility, StoreError};

    use super::*;

    fn run<B: SecureStorageBackend>(store: &KeychainStore<B>, command: Command) -> (bool, String) {
        let mut out = Vec::new();
        let found = execute(store, command, &mut out).expect("execute");
        (found, String::from_utf8(out).expect("utf8"))
    }

    fn set(key: &str, value: &str) -> Command {
        Command::Set {
            key: key.to_string(),
            value: value.to_string(),
            base64: false,
            accessibility: None,
        }
    }

    #[test]
    fn test_commands_against_file_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("store.json")).expect("backend");
        let store = KeychainStore::new(backend, "alice", None).expect("store");

        run(&store, set("pin", "0000"));
        run(&store, set("card", "4111"));
        let (_, keys) = run(&store, Command::Keys);
        assert_eq!(keys, "card\npin\n");

        let (found, value) = run(
            &store,
            Command::Get {
                key: "pin".to_string(),
                base64: false,
            },
        );
        assert!(found);
        assert_eq!(value, "0000\n");

        let (found, _) = run(
            &store,
            Command::Has {
                key: "missing".to_string(),
            },
        );
        assert!(!found);

        let (_, summary) = run(&store, Command::Clear);
        assert_eq!(summary, "deleted 2 item(s)\n");
        assert!(store.all_keys().expect("keys").is_empty());
    }

    #[test]
    fn test_base64_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("store.json")).expect("backend");
        let store = KeychainStore::new(backend, "alice", None).expect("store");

        run(
            &store,
            Command::Set {
                key: "blob".to_string(),
                value: "//79".to_string(),
                base64: true,
                accessibility: Some(Accessibility::AfterFirstUnlock),
            },
        );
        assert_eq!(store.get("blob").expect("get"), Some(vec![0xff, 0xfe, 0xfd]));

        let mut out = Vec::new();
        let text = Command::Get {
            key: "blob".to_string(),
            base64: false,
        };
        assert!(execute(&store, text, &mut out).is_err());

        let (_, encoded) = run(
            &store,
            Command::Get {
                key: "blob".to_string(),
                base64: true,
            },
        );
        assert_eq!(encoded, "//79\n");
    }

    #[test]
    fn test_update_of_missing_key_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("store.json")).expect("backend");
        let store = KeychainStore::new(backend, "alice", None).expect("store");

        let mut out = Vec::new();
        let update = Command::Update {
            key: "pin".to_string(),
            value: "1".to_string(),
            base64: false,
        };
        let err = execute(&store, update, &mut out).expect_err("missing item");
        assert_eq!(err.downcast_ref::<StoreError>(), Some(&StoreError::ItemNotFound));
    }
}
