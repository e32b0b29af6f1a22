use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Default directory for the per-user word files.
    pub fn data_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("stava"),
            )
        } else {
            ProjectDirs::from("", "", "stava").map(|proj_dirs| proj_dirs.data_dir().to_path_buf())
        }
    }

    /// Location of the persisted settings file.
    pub fn settings_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("stava")
                    .join("settings.json"),
            )
        } else {
            ProjectDirs::from("", "", "stava")
                .map(|proj_dirs| proj_dirs.config_dir().join("settings.json"))
        }
    }
}

/// Turn a profile name into a safe file stem: lowercase, alphanumerics
/// plus `-` and `_` only. Anything left empty becomes "user".
pub fn sanitize_user(user: &str) -> String {
    let safe: String = user
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if safe.is_empty() {
        "user".to_string()
    } else {
        safe
    }
}

/// The word file for this run: an explicit `--file` override wins, then
/// a per-user file under the data dir, then a plain `words.csv` for the
/// anonymous default profile.
pub fn resolve_store_path(
    file_override: Option<&Path>,
    user: Option<&str>,
    data_dir: &Path,
) -> PathBuf {
    if let Some(path) = file_override {
        return path.to_path_buf();
    }
    match user {
        Some(user) => data_dir.join(format!("{}.csv", sanitize_user(user))),
        None => data_dir.join("words.csv"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_user("Anna"), "anna");
        assert_eq!(sanitize_user("little-bro_2"), "little-bro_2");
    }

    #[test]
    fn sanitize_strips_path_hostile_characters() {
        assert_eq!(sanitize_user("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_user("a b/c"), "abc");
    }

    #[test]
    fn sanitize_empty_falls_back() {
        assert_eq!(sanitize_user(""), "user");
        assert_eq!(sanitize_user("!!!"), "user");
    }

    #[test]
    fn file_override_wins() {
        let path = resolve_store_path(
            Some(Path::new("/tmp/custom.csv")),
            Some("anna"),
            Path::new("/data"),
        );
        assert_eq!(path, PathBuf::from("/tmp/custom.csv"));
    }

    #[test]
    fn user_selects_a_per_user_file() {
        let path = resolve_store_path(None, Some("Anna B"), Path::new("/data"));
        assert_eq!(path, PathBuf::from("/data/annab.csv"));
    }

    #[test]
    fn no_user_uses_the_shared_file() {
        let path = resolve_store_path(None, None, Path::new("/data"));
        assert_eq!(path, PathBuf::from("/data/words.csv"));
    }
}
