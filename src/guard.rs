//! Route guarding.
//!
//! [`RouteGuard::can_enter`] is a pure decision over a route entry and the
//! current [`Session`]; it keeps no memory between navigations.
//! [`RouteTable::navigate`] resolves a path against the table and follows
//! redirects until a route admits the session.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::session::Session;
use crate::Result;

/// Default login route.
pub const LOGIN_PATH: &str = "/login";

/// Default entry point of the protected area.
pub const HOME_PATH: &str = "/dashboard";

/// Redirects followed by [`RouteTable::navigate`] before giving up.
pub const MAX_REDIRECTS: usize = 8;

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    /// Requires an authenticated session.
    #[serde(default)]
    pub protected: bool,
    /// Unconditional redirect, e.g. `/` to the login page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl Route {
    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            protected: false,
            redirect: None,
        }
    }

    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            protected: true,
            redirect: None,
        }
    }

    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            protected: false,
            redirect: Some(target.into()),
        }
    }
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

impl GuardDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Navigation policy over session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login: String,
    home: String,
}

impl RouteGuard {
    pub fn new(login: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            home: home.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login
    }

    pub fn home_path(&self) -> &str {
        &self.home
    }

    /// Decide whether `route` is reachable with `session`.
    ///
    /// - the login route admits only anonymous sessions and sends an
    ///   authenticated one to the home route
    /// - a protected route admits only authenticated sessions and sends
    ///   everyone else to the login route
    /// - anything else is allowed
    pub fn can_enter(&self, route: &Route, session: &Session) -> GuardDecision {
        if let Some(target) = &route.redirect {
            return GuardDecision::Redirect(target.clone());
        }

        if route.path == self.login {
            return if session.is_authenticated {
                GuardDecision::Redirect(self.home.clone())
            } else {
                GuardDecision::Allow
            };
        }

        if route.protected && !session.is_authenticated {
            return GuardDecision::Redirect(self.login.clone());
        }

        GuardDecision::Allow
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LOGIN_PATH, HOME_PATH)
    }
}

/// Result of [`RouteTable::navigate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Path finally rendered.
    pub destination: String,
    /// Redirect targets followed on the way, in order.
    pub redirects: Vec<String>,
}

/// The application's routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Find the entry for `path`. Exact match only.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Navigate to `path`, following guard redirects.
    ///
    /// Unknown paths redirect to the login route.
    pub fn navigate(&self, guard: &RouteGuard, path: &str, session: &Session) -> Result<Navigation> {
        let mut current = path.to_string();
        let mut redirects = Vec::new();

        loop {
            let decision = match self.resolve(&current) {
                Some(route) => guard.can_enter(route, session),
                None if current == guard.login_path() => GuardDecision::Allow,
                None => GuardDecision::Redirect(guard.login_path().to_string()),
            };

            match decision {
                GuardDecision::Allow => {
                    return Ok(Navigation {
                        destination: current,
                        redirects,
                    })
                }
                GuardDecision::Redirect(target) => {
                    if redirects.len() == MAX_REDIRECTS {
                        return Err(SessionError::RedirectLoop(path.to_string()));
                    }
                    redirects.push(target.clone());
                    current = target;
                }
            }
        }
    }
}

impl Default for RouteTable {
    /// `/login`, `/` redirecting to login, and the protected `/dashboard`.
    fn default() -> Self {
        Self::new(vec![
            Route::public(LOGIN_PATH),
            Route::redirect("/", LOGIN_PATH),
            Route::protected(HOME_PATH),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous() -> Session {
        Session::default()
    }

    fn authenticated() -> Session {
        Session {
            token: Some("tok".into()),
            is_authenticated: true,
            ..Session::default()
        }
    }

    #[test]
    fn test_protected_requires_session() {
        let guard = RouteGuard::default();
        let route = Route::protected("/dashboard");
        assert_eq!(
            guard.can_enter(&route, &anonymous()),
            GuardDecision::Redirect("/login".into())
        );
        assert!(guard.can_enter(&route, &authenticated()).is_allow());
    }

    #[test]
    fn test_login_route_bounces_authenticated() {
        let guard = RouteGuard::default();
        let route = Route::public("/login");
        assert!(guard.can_enter(&route, &anonymous()).is_allow());
        assert_eq!(
            guard.can_enter(&route, &authenticated()),
            GuardDecision::Redirect("/dashboard".into())
        );
    }

    #[test]
    fn test_public_route_always_allowed() {
        let guard = RouteGuard::default();
        let route = Route::public("/about");
        assert!(guard.can_enter(&route, &anonymous()).is_allow());
        assert!(guard.can_enter(&route, &authenticated()).is_allow());
    }

    #[test]
    fn test_pending_session_is_not_authenticated() {
        let guard = RouteGuard::default();
        let pending = Session {
            loading: true,
            ..Session::default()
        };
        assert!(!guard.can_enter(&Route::protected("/dashboard"), &pending).is_allow());
    }

    #[test]
    fn test_custom_paths() {
        let guard = RouteGuard::new("/signin", "/home");
        assert_eq!(
            guard.can_enter(&Route::protected("/home"), &anonymous()),
            GuardDecision::Redirect("/signin".into())
        );
        assert_eq!(
            guard.can_enter(&Route::public("/signin"), &authenticated()),
            GuardDecision::Redirect("/home".into())
        );
    }

    #[test]
    fn test_navigate_root_anonymous() {
        let table = RouteTable::default();
        let nav = table
            .navigate(&RouteGuard::default(), "/", &anonymous())
            .unwrap();
        assert_eq!(nav.destination, "/login");
        assert_eq!(nav.redirects, vec!["/login".to_string()]);
    }

    #[test]
    fn test_navigate_root_authenticated_lands_home() {
        let table = RouteTable::default();
        let nav = table
            .navigate(&RouteGuard::default(), "/", &authenticated())
            .unwrap();
        assert_eq!(nav.destination, "/dashboard");
        assert_eq!(nav.redirects.len(), 2);
    }

    #[test]
    fn test_navigate_unknown_path() {
        let table = RouteTable::default();
        let nav = table
            .navigate(&RouteGuard::default(), "/nowhere", &anonymous())
            .unwrap();
        assert_eq!(nav.destination, "/login");
    }

    #[test]
    fn test_navigate_detects_loop() {
        let table = RouteTable::new(vec![Route::redirect("/a", "/b"), Route::redirect("/b", "/a")]);
        let err = table
            .navigate(&RouteGuard::default(), "/a", &anonymous())
            .unwrap_err();
        assert!(matches!(err, SessionError::RedirectLoop(_)));
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"[
            {"path": "/login"},
            {"path": "/dashboard", "protected": true},
            {"path": "/", "redirect": "/login"}
        ]"#;
        let table: RouteTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.routes().len(), 3);
        assert!(table.resolve("/dashboard").unwrap().protected);
        assert!(!table.resolve("/login").unwrap().protected);
        assert_eq!(
            table.resolve("/").unwrap().redirect.as_deref(),
            Some("/login")
        );
    }
}
