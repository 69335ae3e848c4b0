//! Routes and the route guard

use crate::session::Session;
use std::fmt;
use std::str::FromStr;

/// Application routes. Everything except [`Route::Login`] requires an
/// authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Users,
    Teams,
    Gifticon,
    Analytics,
    Settings,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Dashboard,
        Route::Users,
        Route::Teams,
        Route::Gifticon,
        Route::Analytics,
        Route::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Users => "/users",
            Route::Teams => "/teams",
            Route::Gifticon => "/gifticon",
            Route::Analytics => "/analytics",
            Route::Settings => "/settings",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim().trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        Route::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .ok_or_else(|| format!("unknown route: {}", s))
    }
}

/// Outcome of guarding a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Session restore is still running.
    Loading,
    Redirect(Route),
    Allow(Route),
}

/// Decides whether `route` may be shown for `session`.
pub fn guard(session: &Session, route: Route) -> Guard {
    if !route.requires_auth() {
        return Guard::Allow(route);
    }
    if session.is_loading {
        return Guard::Loading;
    }
    if session.is_authenticated {
        Guard::Allow(route)
    } else {
        Guard::Redirect(Route::Login)
    }
}
