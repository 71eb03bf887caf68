use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Pause between two consecutive tab opens.
pub const DEFAULT_TAB_PACING: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start browser opener `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Rejected(String),
}

/// Opens one URL in a new browser tab.
#[async_trait]
pub trait TabLauncher: Send + Sync {
    async fn open_tab(&self, url: &str) -> Result<(), LaunchError>;
}

/// Hands URLs to the platform's default browser opener.
#[derive(Debug, Clone, Default)]
pub struct SystemBrowserLauncher;

impl SystemBrowserLauncher {
    pub fn new() -> Self {
        Self
    }
}

/// Program and arguments that open `url` with the platform handler. The URL is
/// always one argv entry and never passes through a shell.
fn opener_invocation(url: &str) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("open", vec![url.to_string()])
    } else if cfg!(target_os = "windows") {
        (
            "rundll32",
            vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()],
        )
    } else {
        ("xdg-open", vec![url.to_string()])
    }
}

#[async_trait]
impl TabLauncher for SystemBrowserLauncher {
    async fn open_tab(&self, url: &str) -> Result<(), LaunchError> {
        let (program, args) = opener_invocation(url);
        let mut child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_string(),
                source,
            })?;
        // The opener hands the URL to the browser and exits; reap it.
        let status = child.wait().await.map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;
        if !status.success() {
            return Err(LaunchError::Rejected(format!("`{program}` exited with {status}")));
        }
        Ok(())
    }
}

/// Records URLs instead of opening them (dry runs and tests).
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TabLauncher for RecordingLauncher {
    async fn open_tab(&self, url: &str) -> Result<(), LaunchError> {
        let mut opened = self
            .opened
            .lock()
            .map_err(|_| LaunchError::Rejected("recording launcher mutex poisoned".into()))?;
        opened.push(url.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TabStatus {
    Opened,
    Failed(String),
}

/// What happened to one URL handed to [`TabOpener::open_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabOutcome {
    pub url: String,
    pub status: TabStatus,
}

impl TabOutcome {
    pub fn is_opened(&self) -> bool {
        matches!(self.status, TabStatus::Opened)
    }
}

/// Opens URLs one after another with a fixed pause after each.
pub struct TabOpener {
    launcher: Arc<dyn TabLauncher>,
    pacing: Duration,
}

impl TabOpener {
    pub fn new(launcher: Arc<dyn TabLauncher>) -> Self {
        Self {
            launcher,
            pacing: DEFAULT_TAB_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Open every URL in order. Failures are logged and reported per item,
    /// never raised; callers that do not care may ignore the outcomes.
    pub async fn open_all(&self, urls: &[String]) -> Vec<TabOutcome> {
        let mut outcomes = Vec::with_capacity(urls.len());
        for url in urls {
            let status = match self.launcher.open_tab(url).await {
                Ok(()) => {
                    debug!(%url, "opened tab");
                    TabStatus::Opened
                }
                Err(err) => {
                    warn!(%url, error = %err, "could not open tab");
                    TabStatus::Failed(err.to_string())
                }
            };
            outcomes.push(TabOutcome {
                url: url.clone(),
                status,
            });
            tokio::time::sleep(self.pacing).await;
        }
        info!(
            requested = urls.len(),
            opened = outcomes.iter().filter(|o| o.is_opened()).count(),
            "finished opening tabs"
        );
        outcomes
    }
}
