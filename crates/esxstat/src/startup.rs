//! Checks and messages run once before the daemon starts

use std::path::{Path, PathBuf};

use tracing::{error, info};

/// One-line startup banner with name, version and project URL
#[must_use]
pub fn banner() -> String {
    format!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_REPOSITORY")
    )
}

pub fn log_banner() {
    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        repository = env!("CARGO_PKG_REPOSITORY"),
        "starting {}",
        banner()
    );
}

/// Paths from `required` that do not exist
#[must_use]
pub fn missing_files(required: &[PathBuf]) -> Vec<&Path> {
    required
        .iter()
        .map(PathBuf::as_path)
        .filter(|path| !path.exists())
        .collect()
}

/// Abort startup if any required file is missing
///
/// # Errors
/// Returns error listing every missing path
pub fn check_required_files(required: &[PathBuf]) -> eyre::Result<()> {
    let missing = missing_files(required);
    if missing.is_empty() {
        return Ok(());
    }

    let list = missing
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    error!(missing = %list, "required files are missing");
    eyre::bail!("missing required files: {list}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_names_crate() {
        let banner = banner();
        assert!(banner.starts_with("esxstat "));
        assert!(banner.contains(env!("CARGO_PKG_VERSION")));
        assert!(banner.contains("github.com"));
    }

    #[test]
    fn test_existing_files_pass() {
        let required = vec![PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")];
        assert!(missing_files(&required).is_empty());
        assert!(check_required_files(&required).is_ok());
    }

    #[test]
    fn test_missing_files_listed() {
        let required = vec![
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"),
            PathBuf::from("/nonexistent/one.pem"),
            PathBuf::from("/nonexistent/two.pem"),
        ];
        assert_eq!(missing_files(&required).len(), 2);

        let err = check_required_files(&required).unwrap_err().to_string();
        assert!(err.contains("/nonexistent/one.pem"));
        assert!(err.contains("/nonexistent/two.pem"));
    }

    #[test]
    fn test_no_required_files() {
        assert!(check_required_files(&[]).is_ok());
    }
}
