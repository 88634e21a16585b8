use std::sync::Arc;

use anyhow::anyhow;
use chrono_tz::Tz;
use tracing::error;

use herald_db::TableStore;

use crate::directory::Directory;
use crate::error::{ApiError, ApiResult};
use crate::schedule::Schedule;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn TableStore>,
    /// Zone every stored `Datetime` is read and written in.
    pub tz: Tz,
}

impl AppStateInner {
    pub fn new(store: Arc<dyn TableStore>, tz: Tz) -> AppState {
        Arc::new(Self { store, tz })
    }

    pub fn directory(&self) -> Directory<'_> {
        Directory::new(self.store.as_ref())
    }

    pub fn schedule(&self) -> Schedule<'_> {
        Schedule::new(self.store.as_ref(), self.tz)
    }
}

/// Runs a store operation off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&AppStateInner) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Persistence(anyhow!("store task failed: {}", e))
        })?
}
