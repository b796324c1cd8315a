// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process-wide interception of uncaught failures.

use crate::NormalizerError;
use crate::failure::GlobalFailure;
use crate::normalizer::ErrorNormalizer;
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::info;

static INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

struct HookGuard;

impl HookGuard {
    fn enter() -> Option<Self> {
        if IN_HOOK.with(|flag| flag.replace(true)) {
            None
        } else {
            Some(Self)
        }
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        IN_HOOK.with(|flag| flag.set(false));
    }
}

/// Installed global interception.
///
/// Panics are routed to [`ErrorNormalizer::handle_global`] before the
/// previously installed hook runs. Failed supervised tasks take the same
/// route. Installation happens at most once per process.
#[derive(Clone)]
pub struct GlobalHooks {
    normalizer: ErrorNormalizer,
}

impl fmt::Debug for GlobalHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalHooks").finish_non_exhaustive()
    }
}

impl GlobalHooks {
    /// Install the panic hook. A second call fails with
    /// [`NormalizerError::AlreadyInstalled`].
    pub fn install(normalizer: ErrorNormalizer) -> Result<Self, NormalizerError> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(NormalizerError::AlreadyInstalled);
        }

        let previous = panic::take_hook();
        let hook_normalizer = normalizer.clone();
        panic::set_hook(Box::new(move |info| {
            // A panic inside the pipeline itself goes straight to the
            // previous hook.
            if let Some(_guard) = HookGuard::enter() {
                let failure = GlobalFailure::from_panic(info)
                    .detect_stale(hook_normalizer.stale_signatures());
                hook_normalizer.handle_global(failure);
            }
            previous(info);
        }));

        info!(target: "awui.errors", "global error hooks installed");
        Ok(Self { normalizer })
    }

    /// Whether [`GlobalHooks::install`] has succeeded in this process.
    pub fn is_installed() -> bool {
        INSTALLED.load(Ordering::SeqCst)
    }

    /// The normalizer failures are routed to.
    pub fn normalizer(&self) -> &ErrorNormalizer {
        &self.normalizer
    }

    /// Spawn `task` and route its error through the global path.
    pub fn supervise<F, E>(&self, task: F) -> Result<JoinHandle<()>, NormalizerError>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        self.normalizer.supervise(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_guard_blocks_reentry_and_resets_after_panic() {
        let outer = HookGuard::enter();
        assert!(outer.is_some());
        assert!(HookGuard::enter().is_none());
        drop(outer);

        let unwound = panic::catch_unwind(|| {
            let _guard = HookGuard::enter();
            panic!("handler failed");
        });
        assert!(unwound.is_err());
        assert!(HookGuard::enter().is_some());
    }
}
