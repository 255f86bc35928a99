//! Domain models for Kakoune sessions, clients, and the ambient context.

use std::env;
use std::fmt;

const SESSION_VAR: &str = "KKS_SESSION";
const CLIENT_VAR: &str = "KKS_CLIENT";
const BUFFER_VAR: &str = "KKS_BUFFER";

/// A named Kakoune server instance. An empty name means "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Session {
    pub name: String,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_set(&self) -> bool {
        !self.name.is_empty()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One UI endpoint attached to a session. An empty name means "no specific client".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Client {
    pub name: String,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_set(&self) -> bool {
        !self.name.is_empty()
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Snapshot of the session, client, and buffer the tool runs under.
///
/// Populated once from the environment Kakoune exports to its child shells, then optionally
/// overridden by explicit command-line flags. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub session: Session,
    pub client: Client,
    pub buffer: Option<String>,
}

impl Context {
    /// Read the ambient context from `KKS_SESSION`, `KKS_CLIENT`, and `KKS_BUFFER`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a context from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            session: Session::new(read(SESSION_VAR).unwrap_or_default()),
            client: Client::new(read(CLIENT_VAR).unwrap_or_default()),
            buffer: read(BUFFER_VAR),
        }
    }

    /// Apply explicit overrides; `None` and empty values keep the ambient setting.
    pub fn with_overrides(
        mut self,
        session: Option<String>,
        client: Option<String>,
        buffer: Option<String>,
    ) -> Self {
        if let Some(session) = session.filter(|s| !s.is_empty()) {
            self.session = Session::new(session);
        }
        if let Some(client) = client.filter(|c| !c.is_empty()) {
            self.client = Client::new(client);
        }
        if let Some(buffer) = buffer.filter(|b| !b.is_empty()) {
            self.buffer = Some(buffer);
        }
        self
    }
}

/// Map a free-form name onto the characters Kakoune accepts in session names.
pub fn sanitize_session_name(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_ambient_context_from_variables() {
        let ctx = Context::from_lookup(lookup(&[
            ("KKS_SESSION", "proj"),
            ("KKS_CLIENT", "client0"),
        ]));
        assert_eq!(ctx.session, Session::new("proj"));
        assert_eq!(ctx.client, Client::new("client0"));
        assert_eq!(ctx.buffer, None);
    }

    #[test]
    fn empty_variables_count_as_unset() {
        let ctx = Context::from_lookup(lookup(&[("KKS_SESSION", ""), ("KKS_BUFFER", "")]));
        assert!(!ctx.session.is_set());
        assert_eq!(ctx.buffer, None);
    }

    #[test]
    fn flags_override_ambient_values() {
        let ctx = Context::from_lookup(lookup(&[("KKS_SESSION", "proj"), ("KKS_CLIENT", "c1")]))
            .with_overrides(Some("other".into()), Some(String::new()), None);
        assert_eq!(ctx.session.name, "other");
        assert_eq!(ctx.client.name, "c1");
    }

    #[test]
    fn sanitizes_session_names() {
        assert_eq!(sanitize_session_name("my.repo name"), "my-repo-name");
        assert_eq!(sanitize_session_name("kks_2-x"), "kks_2-x");
    }
}
