use conciliador::{ReconcileConfig, ReconciliationResult, Source, import};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

#[derive(Clone, Debug)]
pub struct FileChangeEvent;

#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<Mutex<AppStateInner>>,
    pub file_change_tx: broadcast::Sender<FileChangeEvent>,
}

pub struct AppStateInner {
    pub internal_path: PathBuf,
    pub bank_path: PathBuf,
    pub config: ReconcileConfig,

    // derived data
    pub result: ReconciliationResult,
}

impl AppStateInner {
    fn new(internal_path: PathBuf, bank_path: PathBuf, config: ReconcileConfig) -> Self {
        let result = config.reconcile(&[], &[]);
        AppStateInner {
            internal_path,
            bank_path,
            config,
            result,
        }
    }

    fn reload(&mut self) -> anyhow::Result<()> {
        let internal = import::read_ledger(&self.internal_path, Source::Internal)?;
        let bank = import::read_ledger(&self.bank_path, Source::Bank)?;
        self.result = self.config.reconcile(&internal, &bank);

        tracing::info!(
            "Reconciled {} internal and {} bank transactions",
            internal.len(),
            bank.len()
        );
        Ok(())
    }
}

impl AppState {
    pub fn new(
        internal_path: PathBuf,
        bank_path: PathBuf,
        config: ReconcileConfig,
        file_change_tx: broadcast::Sender<FileChangeEvent>,
    ) -> anyhow::Result<Self> {
        let mut state = AppStateInner::new(internal_path, bank_path, config);
        state.reload()?;

        Ok(Self {
            inner: Arc::new(Mutex::new(state)),
            file_change_tx,
        })
    }

    pub fn lock(&self) -> MutexGuard<'_, AppStateInner> {
        // a panic while holding the lock leaves the last result intact
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Re-read both ledgers. On failure the previous result is kept.
    pub fn reload(&self) -> anyhow::Result<()> {
        self.lock().reload()
    }
}
