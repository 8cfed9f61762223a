use std::io::Write;
use std::{fs, path::Path, path::PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use super::parsing::env_optional;

/// Reads the signing key persisted next to the crate, generating one on first start.
///
/// A freshly generated key is written with `create_new` so two processes booting at
/// once converge on whichever key hit the disk first.
pub(super) fn load_or_create_secret_key() -> String {
    let path = secret_file_path();

    if let Some(existing) = read_key(&path) {
        return existing;
    }

    let new_key = generate_secret_key();

    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            tracing::warn!(error = %err, path = %parent.display(), "Failed to create secret key directory");
        }
    }

    match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;

                if let Err(err) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
                    tracing::warn!(error = %err, path = %path.display(), "Failed to restrict secret key file");
                }
            }

            if let Err(err) = file.write_all(new_key.as_bytes()) {
                tracing::warn!(error = %err, path = %path.display(), "Failed to persist secret key");
            }
            new_key
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            read_key(&path).unwrap_or(new_key)
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to create secret key file");
            new_key
        }
    }
}

fn read_key(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn generate_secret_key() -> String {
    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn secret_file_path() -> PathBuf {
    env_optional("QBANK_SECRET_KEY_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".secret_key"))
}
