// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the persisted config and the active scan, and
// runs scan passes off the UI thread.
//
// scanimage blocks for as long as the feeder runs, so every pass goes through
// `tokio::task::spawn_blocking`. The active scan (orchestrator plus session)
// sits behind a `Mutex` that the worker holds for the length of a pass.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scanwerk_core::{AppConfig, ControlPanel};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{ScanJob, ScanSource};
use scanwerk_scan::{ScanOrchestrator, ScanSession, SessionStep, SystemRunner};
use tracing::{info, warn};

use super::data_dir;

/// A job waiting on the user between passes.
struct ActiveScan {
    orchestrator: ScanOrchestrator<SystemRunner>,
    session: ScanSession,
}

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// All fields are cheaply cloneable (Arc-wrapped) so that the struct can be
/// passed into closures and async blocks without lifetime issues.
#[derive(Clone)]
pub struct AppServices {
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
    active: Arc<Mutex<Option<ActiveScan>>>,
}

impl AppServices {
    /// Initialise all services.  Call once at app startup.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        info!(path = %dir.display(), "initialising app services");
        let config = load_config(&dir).unwrap_or_default();
        Ok(Self::with_config(dir, config))
    }

    /// Defaults only, settings are not persisted past this run.
    pub fn fallback() -> Self {
        Self::with_config(std::env::temp_dir().join("scanwerk"), AppConfig::default())
    }

    fn with_config(data_dir: PathBuf, config: AppConfig) -> Self {
        Self {
            data_dir,
            config: Arc::new(Mutex::new(config)),
            active: Arc::new(Mutex::new(None)),
        }
    }

    // -- Config --------------------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        lock(&self.config).clone()
    }

    /// Validate, update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        *lock(&self.config) = config.clone();
        persist_config(&self.data_dir, config)
    }

    // -- Scanning ------------------------------------------------------------

    /// Snapshot `panel` into a job against the saved config.
    ///
    /// Settings edits only reach a job once `save_config` accepts them.
    pub fn build_job(&self, panel: &ControlPanel, source: ScanSource) -> Result<ScanJob> {
        panel.build_job(source, &self.config())
    }

    /// Start `job`: prepare the work directory and run its first pass.
    ///
    /// A two-sided job comes back as `SessionStep::AwaitingFlip` and stays
    /// active until `confirm_flip`.
    pub async fn begin_scan(&self, job: ScanJob) -> Result<SessionStep> {
        let config = self.config();
        let active = Arc::clone(&self.active);
        run_blocking(move || {
            let mut slot = lock(&active);
            if slot.is_some() {
                return Err(ScanwerkError::InvalidState(
                    "another scan is waiting for the stack to be flipped".into(),
                ));
            }
            let orchestrator = ScanOrchestrator::from_config(&config, SystemRunner)?;
            let mut session = ScanSession::new(job);
            let step = session.begin(&orchestrator)?;
            if matches!(step, SessionStep::AwaitingFlip { .. }) {
                *slot = Some(ActiveScan {
                    orchestrator,
                    session,
                });
            }
            Ok(step)
        })
        .await
    }

    /// The stack has been turned over: run the back pass and finish the job.
    pub async fn confirm_flip(&self) -> Result<SessionStep> {
        let active = Arc::clone(&self.active);
        run_blocking(move || {
            let mut scan = lock(&active).take().ok_or_else(|| {
                ScanwerkError::InvalidState("no scan is waiting for the back pass".into())
            })?;
            scan.session.confirm_flip(&scan.orchestrator)
        })
        .await
    }
}

/// Run `f` on tokio's blocking pool and wait for it.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        warn!(error = %e, "scan worker did not finish");
        ScanwerkError::Io(std::io::Error::other(e))
    })?
}

/// Lock `mutex`, carrying on past a poisoned lock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// -- Config persistence (JSON file) ------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let svc = AppServices::with_config(dir.path().to_path_buf(), AppConfig::default());
        let config = AppConfig {
            device: "test:scanner".into(),
            nice: 5,
            ..Default::default()
        };
        svc.save_config(&config).unwrap();
        assert_eq!(load_config(dir.path()), Some(config));
    }

    #[test]
    fn invalid_config_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let svc = AppServices::with_config(dir.path().to_path_buf(), AppConfig::default());
        let config = AppConfig {
            device: String::new(),
            ..Default::default()
        };
        assert!(svc.save_config(&config).is_err());
        assert!(load_config(dir.path()).is_none());
        assert_eq!(svc.config(), AppConfig::default());
    }

    #[test]
    fn rejected_edits_never_reach_a_job() {
        let dir = tempfile::tempdir().unwrap();
        let saved = AppConfig {
            device: "test:scanner".into(),
            ..Default::default()
        };
        let svc = AppServices::with_config(dir.path().to_path_buf(), saved.clone());

        let mut edited = saved.clone();
        edited.device = String::new();
        edited.gamma.black = edited.gamma.white;
        assert!(svc.save_config(&edited).is_err());

        let panel = ControlPanel::new(saved.recipients.clone());
        let job = svc.build_job(&panel, ScanSource::Flatbed).unwrap();
        assert_eq!(job.device, "test:scanner");
        assert_eq!(job.gamma, saved.gamma);
    }

    #[test]
    fn saved_edits_reach_the_next_job() {
        let dir = tempfile::tempdir().unwrap();
        let svc = AppServices::with_config(dir.path().to_path_buf(), AppConfig::default());
        let config = AppConfig {
            device: "other:scanner".into(),
            ..Default::default()
        };
        svc.save_config(&config).unwrap();

        let job = svc
            .build_job(&ControlPanel::default(), ScanSource::Flatbed)
            .unwrap();
        assert_eq!(job.device, "other:scanner");
    }

    #[test]
    fn corrupt_config_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(load_config(dir.path()).is_none());
    }

    #[tokio::test]
    async fn flip_without_a_waiting_scan_is_invalid() {
        let svc = AppServices::fallback();
        assert!(matches!(
            svc.confirm_flip().await,
            Err(ScanwerkError::InvalidState(_))
        ));
    }
}
