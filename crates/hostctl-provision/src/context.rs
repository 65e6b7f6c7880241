use std::sync::Arc;

use hostctl_audit::AuditRecorder;
use hostctl_core::SystemPaths;
use hostctl_exec::CommandRunner;
use hostctl_saga::SagaEngine;

/// Shared dependencies of every provisioning workflow.
///
/// The runner sits behind an `Arc` so rollback closures registered with the
/// saga engine can hold their own handle to it.
pub struct ProvisionContext<R> {
    runner: Arc<R>,
    engine: SagaEngine,
    recorder: AuditRecorder,
    paths: SystemPaths,
}

impl<R> ProvisionContext<R>
where
    R: CommandRunner,
{
    #[must_use]
    pub fn new(runner: R, recorder: AuditRecorder, paths: SystemPaths) -> Self {
        Self {
            runner: Arc::new(runner),
            engine: SagaEngine::new(),
            recorder,
            paths,
        }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Owned handle for rollback closures.
    #[must_use]
    pub fn runner_handle(&self) -> Arc<R> {
        Arc::clone(&self.runner)
    }

    #[must_use]
    pub fn engine(&self) -> &SagaEngine {
        &self.engine
    }

    #[must_use]
    pub fn recorder(&self) -> &AuditRecorder {
        &self.recorder
    }

    #[must_use]
    pub fn paths(&self) -> &SystemPaths {
        &self.paths
    }
}
