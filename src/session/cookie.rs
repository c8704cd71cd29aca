//! Session cookie extraction and attribute policy.

use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};

use crate::config::{CounterConfig, Environment};
use crate::session::store::SessionId;

/// How the session cookie is named and scoped for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub name: String,
    pub path: String,
    pub max_age: Duration,
    pub same_site: SameSite,
    pub secure: bool,
    pub partitioned: bool,
}

impl CookiePolicy {
    /// Attributes for a deployment environment.
    ///
    /// Production sits behind a TLS-terminating edge with the UI on another
    /// origin, so the cookie must be cross-site capable (`SameSite=None`,
    /// `Secure`, `Partitioned`). Development keeps it same-site only.
    pub fn for_environment(
        environment: Environment,
        name: impl Into<String>,
        path: impl Into<String>,
        max_age: Duration,
    ) -> Self {
        let production = environment == Environment::Production;
        Self {
            name: name.into(),
            path: path.into(),
            max_age,
            same_site: if production {
                SameSite::None
            } else {
                SameSite::Strict
            },
            secure: production,
            partitioned: production,
        }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::for_environment(
            config.deployment.environment,
            config.session.cookie_name.clone(),
            config.session.path.clone(),
            config.session.ttl(),
        )
    }

    /// Session id carried by the request, if any.
    ///
    /// Every `Cookie` field line is inspected; the first cookie with a
    /// matching name and non-empty value wins.
    pub fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|line| Cookie::split_parse(line).filter_map(Result::ok))
            .find(|cookie| cookie.name() == self.name && !cookie.value().is_empty())
            .map(|cookie| cookie.value().to_string())
    }

    /// Cookie binding the client to `id`.
    pub fn build(&self, id: &SessionId) -> Cookie<'static> {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        Cookie::build((self.name.clone(), id.as_str().to_string()))
            .path(self.path.clone())
            .max_age(cookie::time::Duration::seconds(max_age))
            .same_site(self.same_site)
            .secure(self.secure)
            .partitioned(self.partitioned)
            .http_only(true)
            .build()
    }

    /// `Set-Cookie` header value for `id`.
    pub fn header_value(
        &self,
        id: &SessionId,
    ) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
        HeaderValue::from_str(&self.build(id).to_string())
    }
}
