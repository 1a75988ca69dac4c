//! Role gating for dashboard paths.
//!
//! A [`RouteGuard`] admits a navigation only when the session holds a token
//! and the stored role equals the guard's role. Decisions are never cached:
//! every [`Navigator::navigate`] call reads the session again, so a logout or
//! role change is seen by the very next navigation.

use std::collections::BTreeMap;

use crate::session::{Role, SessionStore};

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authorized,
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    required: Role,
}

impl RouteGuard {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn required(&self) -> Role {
        self.required
    }

    pub fn check(&self, session: &SessionStore) -> Access {
        let has_token = session.token().is_some_and(|t| !t.is_empty());
        let role_matches = session.role().as_deref() == Some(self.required.as_str());

        if has_token && role_matches {
            Access::Authorized
        } else {
            Access::Unauthorized
        }
    }
}

/// A dashboard screen and the role allowed to see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub screen: &'static str,
    pub guard: Option<RouteGuard>,
}

impl Route {
    fn public(pattern: &'static str, screen: &'static str) -> Self {
        Self {
            pattern,
            screen,
            guard: None,
        }
    }

    fn guarded(pattern: &'static str, screen: &'static str, role: Role) -> Self {
        Self {
            pattern,
            screen,
            guard: Some(RouteGuard::new(role)),
        }
    }

    /// Match a concrete path, returning `:param` captures and the number of
    /// literal segments matched
    fn matches(&self, path: &str) -> Option<(usize, BTreeMap<String, String>)> {
        let pattern: Vec<&str> = segments(self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        let mut literal = 0;
        for (expected, got) in pattern.iter().zip(&actual) {
            if let Some(name) = expected.strip_prefix(':') {
                params.insert(name.to_string(), got.to_string());
            } else if expected == got {
                literal += 1;
            } else {
                return None;
            }
        }
        Some((literal, params))
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Admin screens under `/`, owner screens under `/business-dashboard`
    pub fn dashboard() -> Self {
        Self::new(vec![
            Route::public(LOGIN_PATH, "login"),
            Route::guarded("/", "businesses", Role::Admin),
            Route::guarded("/business", "businesses", Role::Admin),
            Route::guarded("/business/add", "add-business", Role::Admin),
            Route::guarded("/business/:businessId", "business-detail", Role::Admin),
            Route::guarded("/listusers", "users", Role::Admin),
            Route::guarded("/business-dashboard", "owner-dashboard", Role::BusinessOwner),
            Route::guarded("/business-dashboard/events/add", "add-event", Role::BusinessOwner),
            Route::guarded(
                "/business-dashboard/business-owner-list",
                "owner-businesses",
                Role::BusinessOwner,
            ),
        ])
    }

    /// Most specific route for a path; literal segments outrank parameters
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter_map(|route| route.matches(path).map(|(score, params)| (score, route, params)))
            .max_by_key(|(score, _, _)| *score)
            .map(|(_, route, params)| RouteMatch { route, params })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render {
        screen: &'static str,
        params: BTreeMap<String, String>,
    },
    /// Guard refused; the attempted entry was replaced by the login page
    Redirect { to: &'static str },
    NotFound,
}

/// In-process history stack driven by the route table
#[derive(Debug)]
pub struct Navigator {
    table: RouteTable,
    session: SessionStore,
    history: Vec<String>,
}

impl Navigator {
    pub fn new(table: RouteTable, session: SessionStore) -> Self {
        Self {
            table,
            session,
            history: Vec::new(),
        }
    }

    pub fn navigate(&mut self, path: &str) -> Navigation {
        let Some(found) = self.table.resolve(path) else {
            tracing::debug!(path, "No route for path");
            return Navigation::NotFound;
        };
        let RouteMatch { route, params } = found;
        let (screen, guard) = (route.screen, route.guard);

        if let Some(guard) = guard {
            if guard.check(&self.session) == Access::Unauthorized {
                tracing::info!(path, required = %guard.required(), "Navigation refused, redirecting to login");
                self.replace(LOGIN_PATH);
                return Navigation::Redirect { to: LOGIN_PATH };
            }
        }

        self.history.push(path.to_string());
        Navigation::Render { screen, params }
    }

    /// Go to the landing page for the signed-in role
    pub fn land(&mut self, role: Role) -> Navigation {
        self.navigate(role.landing_path())
    }

    fn replace(&mut self, path: &str) {
        match self.history.last_mut() {
            Some(last) if last == LOGIN_PATH => {}
            Some(last) => *last = path.to_string(),
            None => self.history.push(path.to_string()),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Step back one entry
    pub fn back(&mut self) -> Option<&str> {
        if self.history.len() > 1 {
            self.history.pop();
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeBackend;
    use crate::session::{MemoryStorage, SessionStorage, ACCESS_TOKEN_KEY, ROLE_KEY};
    use axum::{routing::post, Json, Router};
    use serde_json::json;
    use std::sync::Arc;

    fn session(token: Option<&str>, role: Option<&str>) -> SessionStore {
        let storage = MemoryStorage::new();
        if let Some(token) = token {
            storage.set(ACCESS_TOKEN_KEY, token);
        }
        if let Some(role) = role {
            storage.set(ROLE_KEY, role);
        }
        SessionStore::new(Arc::new(storage))
    }

    #[test]
    fn test_guard_denies_any_other_role() {
        let guard = RouteGuard::new(Role::Admin);
        for role in ["BusinessOwner", "admin", "Customer", ""] {
            assert_eq!(guard.check(&session(Some("tok"), Some(role))), Access::Unauthorized);
        }
        assert_eq!(guard.check(&session(None, None)), Access::Unauthorized);
        assert_eq!(guard.check(&session(Some("tok"), Some("Admin"))), Access::Authorized);
    }

    #[test]
    fn test_guard_requires_token_even_with_matching_role() {
        let store = SessionStore::in_memory();
        store.set_session("", "BusinessOwner");
        assert_eq!(
            RouteGuard::new(Role::BusinessOwner).check(&store),
            Access::Unauthorized
        );
    }

    #[test]
    fn test_literal_segments_outrank_params() {
        let table = RouteTable::dashboard();

        let add = table.resolve("/business/add").unwrap();
        assert_eq!(add.route.screen, "add-business");

        let detail = table.resolve("/business/b42?tab=events").unwrap();
        assert_eq!(detail.route.screen, "business-detail");
        assert_eq!(detail.params["businessId"], "b42");

        assert!(table.resolve("/nope/at/all").is_none());
    }

    #[test]
    fn test_redirect_replaces_history_entry() {
        let session = SessionStore::in_memory();
        let mut nav = Navigator::new(RouteTable::dashboard(), session.clone());

        assert!(matches!(nav.navigate(LOGIN_PATH), Navigation::Render { screen: "login", .. }));
        assert_eq!(nav.navigate("/listusers"), Navigation::Redirect { to: LOGIN_PATH });
        assert_eq!(nav.history(), [LOGIN_PATH.to_string()]);

        session.set_session("tok", "Admin");
        assert!(matches!(nav.navigate("/listusers"), Navigation::Render { screen: "users", .. }));
        assert_eq!(nav.back(), Some(LOGIN_PATH));
    }

    #[test]
    fn test_decision_is_not_cached() {
        let session = SessionStore::in_memory();
        session.set_session("tok", "Admin");
        let mut nav = Navigator::new(RouteTable::dashboard(), session.clone());

        assert!(matches!(nav.navigate("/"), Navigation::Render { .. }));
        assert!(matches!(nav.navigate("/business"), Navigation::Render { .. }));

        session.clear_session();
        assert_eq!(nav.navigate("/"), Navigation::Redirect { to: LOGIN_PATH });
        assert_eq!(nav.current(), Some(LOGIN_PATH));
        assert_eq!(nav.history().len(), 2);
    }

    #[tokio::test]
    async fn test_business_owner_login_scenario() {
        let backend = FakeBackend::start(Router::new().route(
            "/api/v1/auth/login",
            post(|| async {
                Json(json!({ "data": { "accessToken": "owner-token", "role": "BusinessOwner" } }))
            }),
        ))
        .await;
        let session = SessionStore::in_memory();
        let client = backend.client(session.clone());
        let mut nav = Navigator::new(RouteTable::dashboard(), session.clone());

        let role = client.login("owner@hangout.vn", "secret1").await.unwrap();
        assert_eq!(session.token().as_deref(), Some("owner-token"));
        assert_eq!(session.role().as_deref(), Some("BusinessOwner"));

        assert_eq!(nav.navigate("/listusers"), Navigation::Redirect { to: LOGIN_PATH });
        assert!(matches!(
            nav.land(role),
            Navigation::Render { screen: "owner-dashboard", .. }
        ));
        assert_eq!(nav.current(), Some("/business-dashboard"));
    }
}
