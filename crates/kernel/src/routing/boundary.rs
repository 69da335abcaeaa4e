//! Loading boundary - the inner layer around every composed route.
//!
//! Only reachable after the access guard has allowed a navigation. Holds a
//! lazily loadable component and resolves it on demand:
//! `Unresolved -> Resolved | Failed`. While unresolved it offers a loading
//! placeholder. If the navigation's cancellation token fires before the
//! load completes, the result is discarded and the load reports
//! [`LoadOutcome::Abandoned`].

use std::time::Duration;

use portico_sdk::{ComponentRef, LoadError, View};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Markup shown while a component is loading.
pub const LOADING_MARKUP: &str = r#"<div class="portico-loading" aria-busy="true">Loading…</div>"#;

/// The lazily loaded component of a composed route.
#[derive(Debug, Clone)]
pub struct LazyComponent {
    component: ComponentRef,
}

impl LazyComponent {
    pub(crate) fn new(component: ComponentRef) -> Self {
        Self { component }
    }

    /// Human-readable component name.
    pub fn describe(&self) -> String {
        self.component.describe()
    }

    /// Whether both wrap the very same component reference.
    pub fn same_component(&self, other: &LazyComponent) -> bool {
        std::sync::Arc::ptr_eq(&self.component, &other.component)
    }

    /// Start a load bound to `cancel`. Nothing is fetched until
    /// [`PendingLoad::resolve`] is awaited.
    pub fn begin(&self, cancel: CancellationToken, timeout: Option<Duration>) -> PendingLoad {
        PendingLoad {
            component: self.component.clone(),
            cancel,
            timeout,
            state: LoadState::Unresolved,
        }
    }
}

/// State of a component load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unresolved,
    Resolved(View),
    Failed(LoadError),
}

/// How a load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Resolved(View),
    Failed(LoadError),
    /// The navigation was superseded; whatever the loader produced was
    /// dropped.
    Abandoned,
}

/// An in-progress load for one navigation.
#[derive(Debug)]
pub struct PendingLoad {
    component: ComponentRef,
    cancel: CancellationToken,
    timeout: Option<Duration>,
    state: LoadState,
}

impl PendingLoad {
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// What to display right now: the placeholder while unresolved, the
    /// view once resolved, nothing after a failure.
    pub fn current_view(&self) -> Option<View> {
        match &self.state {
            LoadState::Unresolved => Some(View::new(LOADING_MARKUP)),
            LoadState::Resolved(view) => Some(view.clone()),
            LoadState::Failed(_) => None,
        }
    }

    /// Resolve the component.
    ///
    /// Calls the loader at most once: after a resolution or failure the
    /// stored result is returned again. An abandoned load leaves the state
    /// `Unresolved` and never calls the loader again.
    pub async fn resolve(&mut self) -> LoadOutcome {
        match &self.state {
            LoadState::Resolved(view) => return LoadOutcome::Resolved(view.clone()),
            LoadState::Failed(err) => return LoadOutcome::Failed(err.clone()),
            LoadState::Unresolved => {}
        }
        if self.cancel.is_cancelled() {
            return LoadOutcome::Abandoned;
        }

        let name = self.component.describe();
        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!(component = %name, "load abandoned");
                return LoadOutcome::Abandoned;
            }
            result = load_with_timeout(&self.component, self.timeout) => result,
        };

        // The token may have fired in the same poll the load completed.
        if self.cancel.is_cancelled() {
            debug!(component = %name, "load finished after navigation moved on; discarded");
            return LoadOutcome::Abandoned;
        }

        match result {
            Ok(view) => {
                debug!(component = %name, "component resolved");
                self.state = LoadState::Resolved(view.clone());
                LoadOutcome::Resolved(view)
            }
            Err(err) => {
                debug!(component = %name, error = %err, "component failed to load");
                self.state = LoadState::Failed(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }
}

async fn load_with_timeout(
    component: &ComponentRef,
    timeout: Option<Duration>,
) -> Result<View, LoadError> {
    let Some(limit) = timeout else {
        return component.load().await;
    };
    match tokio::time::timeout(limit, component.load()).await {
        Ok(result) => result,
        Err(_) => Err(LoadError::TimedOut {
            component: component.describe(),
            millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
