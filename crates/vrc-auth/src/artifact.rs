use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the primary session cookie
pub const AUTH_COOKIE: &str = "auth";

/// Session cookies obtained from a successful login.
///
/// An artifact is immutable once constructed; re-authentication always
/// produces a new one. It serializes as a plain name-to-value object, which
/// is also the on-disk format of the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionArtifact {
    cookies: BTreeMap<String, String>,
}

impl SessionArtifact {
    pub fn from_cookies(cookies: BTreeMap<String, String>) -> Self {
        Self { cookies }
    }

    /// Parse the `Set-Cookie` values of a login response.
    ///
    /// HTTP/1 folding is handled by also splitting each value on commas;
    /// every segment contributes its leading `name=value` pair and the
    /// attributes after the first `;` are ignored.
    pub fn parse_set_cookie<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut cookies = BTreeMap::new();
        for value in values {
            for part in value.split(',') {
                let item = part.split(';').next().unwrap_or("").trim();
                if let Some((name, cookie_value)) = item.split_once('=') {
                    let name = name.trim();
                    if !name.is_empty() {
                        cookies.insert(name.to_string(), cookie_value.trim().to_string());
                    }
                }
            }
        }
        Self { cookies }
    }

    /// A structurally valid artifact carries a non-empty primary auth cookie.
    pub fn is_valid(&self) -> bool {
        self.cookies
            .get(AUTH_COOKIE)
            .is_some_and(|value| !value.is_empty())
    }

    pub fn auth(&self) -> Option<&str> {
        self.cookies.get(AUTH_COOKIE).map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Render the `Cookie` request header attached to authenticated calls
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
