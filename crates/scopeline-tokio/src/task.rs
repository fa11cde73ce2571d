use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use scopeline_runtime::{ConfigError, ManagerConfig, ScopeManager};
use tokio::task::JoinHandle;

use crate::lane::{TASK_BRANCH, TaskLane};

/// A disabled manager over a fresh [`TaskLane`].
pub fn manager() -> ScopeManager {
    ScopeManager::with_substrate(Arc::new(TaskLane::new()))
}

/// A manager over a fresh [`TaskLane`], configured from `SCOPELINE_*`
/// environment variables.
pub fn manager_from_env() -> Result<ScopeManager, ConfigError> {
    let config = ManagerConfig::from_env()?;
    Ok(manager_from_config(config))
}

pub fn manager_from_config(config: ManagerConfig) -> ScopeManager {
    ScopeManager::from_config(config, Arc::new(TaskLane::new()))
}

/// Spawns `fut` as a Tokio task on a fork of the current branch.
///
/// The task starts out seeing whatever scope was active when `spawn` was
/// called, and the scopes it enters stay private to it.
pub fn spawn<F>(manager: &ScopeManager, fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let branch = manager.fork();
    tracing::trace!(manager = %manager.name(), branch = %branch.id(), "spawning scoped task");
    tokio::spawn(TASK_BRANCH.scope(RefCell::new(branch), fut))
}

/// Runs `callback` after `delay` on a fork of the current branch.
pub fn set_timeout<F>(manager: &ScopeManager, delay: Duration, callback: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    spawn(manager, async move {
        tokio::time::sleep(delay).await;
        callback();
    })
}
