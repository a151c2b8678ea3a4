use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("fingerpaint"),
            )
        } else {
            ProjectDirs::from("", "", "fingerpaint")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Where the tracing log channel writes (a TUI owns the terminal,
    /// so operator-visible diagnostics go to a file).
    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("fingerpaint.log"))
    }

    /// Where completed game sessions are appended.
    pub fn results_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("sessions.csv"))
    }
}
