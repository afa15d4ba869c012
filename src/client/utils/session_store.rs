use keyring::Entry;

const SERVICE: &str = "carematch_app";
const USER: &str = "carematch_session";

fn fallback_allowed() -> bool {
    std::env::var("SESSION_FALLBACK").unwrap_or_default() == "true"
}

fn fallback_path() -> std::path::PathBuf {
    std::path::Path::new("data").join("session_token.txt")
}

pub fn save_session_token(token: &str) -> anyhow::Result<()> {
    let entry = Entry::new(SERVICE, USER);
    match entry.set_password(token) {
        Ok(()) => Ok(()),
        Err(_e) => {
            // Keyring failed. Fall back to a local file only when explicitly
            // allowed; never persist to disk silently.
            if fallback_allowed() {
                let path = fallback_path();
                if let Some(parent) = path.parent() {
                    let _ = std::fs::create_dir_all(parent);
                }
                std::fs::write(&path, token)?;
                log::warn!("keyring unavailable, persisted session token to fallback file");
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "keyring unavailable and file fallback disabled"
                ))
            }
        }
    }
}

pub fn load_session_token() -> Option<String> {
    let entry = Entry::new(SERVICE, USER);
    match entry.get_password() {
        Ok(t) => {
            if t.trim().is_empty() {
                None
            } else {
                Some(t)
            }
        }
        Err(_e) => {
            if fallback_allowed() {
                let path = fallback_path();
                if path.exists() {
                    if let Ok(s) = std::fs::read_to_string(&path) {
                        let t = s.trim().to_string();
                        if !t.is_empty() {
                            return Some(t);
                        }
                    }
                }
            }
            None
        }
    }
}

pub fn clear_session_token() -> anyhow::Result<()> {
    let entry = Entry::new(SERVICE, USER);
    let _ = entry.delete_password();
    if fallback_allowed() {
        let path = fallback_path();
        if path.exists() {
            let _ = std::fs::remove_file(&path);
        }
    }
    Ok(())
}
