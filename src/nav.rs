use std::{fmt, sync::Arc};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Unauthenticated entry point.
    Landing,
    Dashboard,
    WeeklyReview,
    Settings,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Dashboard => "/dashboard",
            Route::WeeklyReview => "/dashboard/weekly",
            Route::Settings => "/dashboard/settings",
        }
    }

    pub fn requires_session(self) -> bool {
        self != Route::Landing
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Records where the app wants to be; rendering the route is someone else's job.
#[derive(Clone)]
pub struct Navigator {
    current: Arc<watch::Sender<Route>>,
}

impl Navigator {
    pub fn new(start: Route) -> Self {
        let (sender, _) = watch::channel(start);
        Self {
            current: Arc::new(sender),
        }
    }

    pub fn navigate(&self, route: Route) {
        let previous = self.current.send_replace(route);
        if previous != route {
            debug!(from = %previous, to = %route, "navigate");
        }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Landing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_landing_is_public() {
        assert!(!Route::Landing.requires_session());
        assert!(Route::Dashboard.requires_session());
        assert!(Route::Settings.requires_session());
        assert_eq!(Route::WeeklyReview.to_string(), "/dashboard/weekly");
    }

    #[tokio::test]
    async fn subscribers_see_navigation() {
        let navigator = Navigator::default();
        let mut changes = navigator.subscribe();
        navigator.clone().navigate(Route::Settings);

        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow(), Route::Settings);
        assert_eq!(navigator.current(), Route::Settings);
    }
}
