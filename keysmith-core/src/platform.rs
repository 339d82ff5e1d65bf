//! Platform-specific paths for the vault file

use std::path::PathBuf;

/// Environment variable overriding the vault file location
pub const VAULT_PATH_ENV: &str = "KEYSMITH_VAULT";

/// Get the platform-specific data directory for storing application data
///
/// Returns:
/// - Windows: %LOCALAPPDATA%\Keysmith
/// - macOS: ~/Library/Application Support/Keysmith
/// - Linux/Other: ~/.local/share/Keysmith
pub fn get_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".data")))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("Keysmith")
}

/// Get the default vault file path
pub fn get_default_vault_path() -> PathBuf {
    get_data_dir().join("vault.dat")
}

/// Pick the vault path: an explicit path wins, then `KEYSMITH_VAULT`, then
/// the platform default.
pub fn resolve_vault_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            std::env::var_os(VAULT_PATH_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(get_default_vault_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir() {
        let dir = get_data_dir();
        assert!(dir.to_string_lossy().ends_with("Keysmith"));
    }

    #[test]
    fn test_get_default_vault_path() {
        let path = get_default_vault_path();
        assert!(path.to_string_lossy().ends_with("vault.dat"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/somewhere/vault.dat");
        assert_eq!(resolve_vault_path(Some(explicit.clone())), explicit);
    }

    // Only test that touches the process environment; the variable is
    // restored before the assertions run.
    #[test]
    fn test_env_override_and_precedence() {
        let previous = std::env::var_os(VAULT_PATH_ENV);
        let from_env = PathBuf::from("/tmp/keysmith-env/vault.dat");
        let explicit = PathBuf::from("/tmp/keysmith-explicit/vault.dat");

        std::env::set_var(VAULT_PATH_ENV, &from_env);
        let resolved_env = resolve_vault_path(None);
        let resolved_explicit = resolve_vault_path(Some(explicit.clone()));

        std::env::set_var(VAULT_PATH_ENV, "");
        let resolved_empty = resolve_vault_path(None);

        match previous {
            Some(value) => std::env::set_var(VAULT_PATH_ENV, value),
            None => std::env::remove_var(VAULT_PATH_ENV),
        }

        assert_eq!(resolved_env, from_env);
        assert_eq!(resolved_explicit, explicit);
        assert_eq!(resolved_empty, get_default_vault_path());
    }
}
