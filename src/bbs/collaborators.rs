//! External collaborators consumed by the session: the station-log (`heard`) and
//! uptime utilities, and the operator's info text.
//!
//! Utilities are run with stdin closed so they can never consume the caller's input.
//! Their stdout is relayed verbatim; a missing program or a non-zero exit is reported
//! as [`BbsError::CollaboratorUnavailable`].

use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, warn};
use tokio::process::Command;

use crate::errors::{BbsError, Result};

/// Text written to the info file when the operator has not provided one.
pub const DEFAULT_INFO_TEXT: &str = "\
This is a Really Simple BBS.

Leave public messages with 'send' and private ones with 'sendp'.
Messages addressed to you can be listed with 'listm' and read with 'readm'.

Edit this file to describe your station.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collaborators {
    pub heard_command: Vec<String>,
    pub uptime_command: Vec<String>,
    pub info_file: PathBuf,
}

impl Collaborators {
    /// Output of the heard-stations utility.
    pub async fn heard(&self) -> Result<String> {
        run_utility(&self.heard_command, "Heard stations").await
    }

    /// Output of the host uptime utility.
    pub async fn uptime(&self) -> Result<String> {
        run_utility(&self.uptime_command, "Uptime").await
    }

    /// The operator's info text, read fresh on every call.
    pub async fn info_text(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.info_file).await.map_err(|e| {
            warn!("info file {} unreadable: {}", self.info_file.display(), e);
            BbsError::CollaboratorUnavailable("Info not available.".to_string())
        })
    }
}

async fn run_utility(command: &[String], label: &str) -> Result<String> {
    let unavailable = || BbsError::CollaboratorUnavailable(format!("{} not available.", label));
    let (program, args) = command.split_first().ok_or_else(unavailable)?;
    debug!("running {} {:?}", program, args);
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            warn!("{} failed to start: {}", program, e);
            if e.kind() == std::io::ErrorKind::NotFound {
                BbsError::CollaboratorUnavailable(format!("{} utility not found.", program))
            } else {
                unavailable()
            }
        })?;
    if !output.status.success() {
        warn!("{} exited with {}", program, output.status);
        return Err(unavailable());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Write [`DEFAULT_INFO_TEXT`] to `path` unless the file already exists.
pub async fn ensure_info_file(path: &Path) -> std::io::Result<bool> {
    if tokio::fs::try_exists(path).await? {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, DEFAULT_INFO_TEXT).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_commands(heard: &[&str], uptime: &[&str], info: PathBuf) -> Collaborators {
        Collaborators {
            heard_command: heard.iter().map(|s| s.to_string()).collect(),
            uptime_command: uptime.iter().map(|s| s.to_string()).collect(),
            info_file: info,
        }
    }

    #[tokio::test]
    async fn relays_utility_stdout() {
        let c = with_commands(&["echo", "N1ABC-7  145.050"], &["echo", "up 3 days"], PathBuf::new());
        assert_eq!(c.heard().await.unwrap(), "N1ABC-7  145.050");
        assert_eq!(c.uptime().await.unwrap(), "up 3 days");
    }

    #[tokio::test]
    async fn missing_or_failing_utility_is_unavailable() {
        let c = with_commands(&["/nonexistent/mheard"], &["false"], PathBuf::new());
        match c.heard().await {
            Err(BbsError::CollaboratorUnavailable(msg)) => assert!(msg.contains("not found")),
            other => panic!("unexpected {:?}", other),
        }
        match c.uptime().await {
            Err(BbsError::CollaboratorUnavailable(msg)) => assert_eq!(msg, "Uptime not available."),
            other => panic!("unexpected {:?}", other),
        }
        let empty = with_commands(&[], &[], PathBuf::new());
        assert!(matches!(empty.heard().await, Err(BbsError::CollaboratorUnavailable(_))));
    }

    #[tokio::test]
    async fn info_file_is_seeded_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("share").join("info.txt");
        assert!(ensure_info_file(&path).await.unwrap());
        assert!(!ensure_info_file(&path).await.unwrap());
        let c = with_commands(&["true"], &["true"], path.clone());
        assert_eq!(c.info_text().await.unwrap(), DEFAULT_INFO_TEXT);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(c.info_text().await, Err(BbsError::CollaboratorUnavailable(_))));
    }
}
