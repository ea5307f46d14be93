//! Upstream server registry
//!
//! Holds the set of configured CI servers. Built once at startup from the
//! environment, immutable afterwards; concurrent lookups take no lock.
//!
//! # Security
//!
//! Tokens are stored behind the [`Token`] newtype, which renders as
//! `[redacted]` in `Debug` output and is deliberately not serializable.
//! The only way a raw token value leaves this module is through
//! [`Token::reveal`], called by the relay to build the outbound
//! `Authorization` header.

use std::fmt;

use serde::Serialize;

/// How many numbered `CI_SERVER_{n}_*` slots the loader scans.
const MAX_NUMBERED_SERVERS: usize = 10;

/// Bearer credential for one upstream.
#[derive(Clone)]
pub struct Token(String);

impl Token {
    /// Wrap a raw credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw credential, for building the outbound `Authorization`
    /// header. Must never be copied into anything that crosses back to
    /// the caller.
    #[must_use]
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// One configured CI backend.
#[derive(Debug, Clone)]
pub struct UpstreamServer {
    /// Stable opaque identifier, unique within the registry.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// Normalized absolute URL, no trailing slash. All outbound calls
    /// are `base_url + "/api/" + endpoint`.
    pub base_url: String,
    /// Secret bearer credential.
    pub token: Token,
    /// Declared upstream flavor. Carried through, not interpreted.
    pub kind: String,
}

/// Token-free view of an upstream, safe to hand to the browser.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicServer {
    /// Logical server id, used in proxy routes.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Declared upstream flavor.
    #[serde(rename = "type")]
    pub kind: String,
    /// Base URL (needed client-side for building links).
    pub url: String,
}

/// Immutable set of configured upstreams, in load order.
#[derive(Debug, Default)]
pub struct UpstreamRegistry {
    servers: Vec<UpstreamServer>,
}

impl UpstreamRegistry {
    /// Build a registry from an explicit server list. Load order is
    /// preserved.
    #[must_use]
    pub fn new(servers: Vec<UpstreamServer>) -> Self {
        Self { servers }
    }

    /// Build the registry from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the registry from a variable source.
    ///
    /// Two configuration shapes are recognized:
    /// - a single unnumbered upstream (`CI_SERVER_URL` / `CI_SERVER_TOKEN`),
    ///   registered as `server-0`;
    /// - numbered upstreams `CI_SERVER_1_*` through `CI_SERVER_10_*`,
    ///   registered as `server-1` .. `server-10`.
    ///
    /// An entry is included only when both its URL and token are present
    /// and non-empty. Trailing slashes are stripped from URLs.
    pub fn from_vars<F>(vars: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| vars(key).filter(|v| !v.is_empty());
        let mut servers = Vec::new();

        if let (Some(url), Some(token)) = (present("CI_SERVER_URL"), present("CI_SERVER_TOKEN")) {
            servers.push(UpstreamServer {
                id: "server-0".to_string(),
                name: vars("CI_SERVER_NAME").unwrap_or_else(|| "CI Server".to_string()),
                base_url: url.trim_end_matches('/').to_string(),
                token: Token::new(token),
                kind: vars("CI_SERVER_TYPE").unwrap_or_else(|| "auto".to_string()),
            });
        }

        for n in 1..=MAX_NUMBERED_SERVERS {
            let url = present(&format!("CI_SERVER_{n}_URL"));
            let token = present(&format!("CI_SERVER_{n}_TOKEN"));
            if let (Some(url), Some(token)) = (url, token) {
                servers.push(UpstreamServer {
                    id: format!("server-{n}"),
                    name: vars(&format!("CI_SERVER_{n}_NAME"))
                        .unwrap_or_else(|| format!("CI Server {n}")),
                    base_url: url.trim_end_matches('/').to_string(),
                    token: Token::new(token),
                    kind: vars(&format!("CI_SERVER_{n}_TYPE"))
                        .unwrap_or_else(|| "auto".to_string()),
                });
            }
        }

        Self { servers }
    }

    /// Resolve a logical server id.
    ///
    /// Unknown ids yield `None`, never a fallback server. Should the
    /// registry ever hold duplicate ids, the first loaded entry wins.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&UpstreamServer> {
        self.servers.iter().find(|s| s.id == id)
    }

    /// Token-free listing for client-side discovery, in load order.
    #[must_use]
    pub fn list_public(&self) -> Vec<PublicServer> {
        self.servers
            .iter()
            .map(|s| PublicServer {
                id: s.id.clone(),
                name: s.name.clone(),
                kind: s.kind.clone(),
                url: s.base_url.clone(),
            })
            .collect()
    }

    /// Number of configured upstreams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Whether no upstream is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Iterate over configured upstreams in load order.
    pub fn iter(&self) -> impl Iterator<Item = &UpstreamServer> {
        self.servers.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn registry_from(pairs: &[(&str, &str)]) -> UpstreamRegistry {
        let map = vars(pairs);
        UpstreamRegistry::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn loads_single_server_with_defaults() {
        let registry = registry_from(&[
            ("CI_SERVER_URL", "https://ci.example.com/"),
            ("CI_SERVER_TOKEN", "secret-abc"),
        ]);

        assert_eq!(registry.len(), 1);
        let server = registry.get("server-0").unwrap();
        assert_eq!(server.name, "CI Server");
        assert_eq!(server.base_url, "https://ci.example.com");
        assert_eq!(server.kind, "auto");
        assert_eq!(server.token.reveal(), "secret-abc");
    }

    #[test]
    fn loads_numbered_servers_in_order() {
        let registry = registry_from(&[
            ("CI_SERVER_2_URL", "https://two.example.com"),
            ("CI_SERVER_2_TOKEN", "tok-2"),
            ("CI_SERVER_2_NAME", "Second"),
            ("CI_SERVER_2_TYPE", "jenkins"),
            ("CI_SERVER_1_URL", "https://one.example.com"),
            ("CI_SERVER_1_TOKEN", "tok-1"),
        ]);

        let ids: Vec<&str> = registry.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["server-1", "server-2"]);

        let second = registry.get("server-2").unwrap();
        assert_eq!(second.name, "Second");
        assert_eq!(second.kind, "jenkins");
        assert_eq!(registry.get("server-1").unwrap().name, "CI Server 1");
    }

    #[test]
    fn entry_without_token_is_excluded() {
        let registry = registry_from(&[
            ("CI_SERVER_URL", "https://ci.example.com"),
            ("CI_SERVER_1_URL", "https://one.example.com"),
            ("CI_SERVER_1_TOKEN", ""),
        ]);

        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_ids_resolve_first_wins() {
        let first = UpstreamServer {
            id: "server-3".to_string(),
            name: "First".to_string(),
            base_url: "https://first.example.com".to_string(),
            token: Token::new("tok-first"),
            kind: "auto".to_string(),
        };
        let mut second = first.clone();
        second.name = "Second".to_string();
        second.base_url = "https://second.example.com".to_string();
        second.token = Token::new("tok-second");

        let registry = UpstreamRegistry::new(vec![first, second]);

        let resolved = registry.get("server-3").unwrap();
        assert_eq!(resolved.name, "First");
        assert_eq!(resolved.token.reveal(), "tok-first");

        // The listing is a view of load order, not of id resolution.
        let names: Vec<String> = registry.list_public().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn unknown_id_resolves_to_none() {
        let registry = registry_from(&[
            ("CI_SERVER_URL", "https://ci.example.com"),
            ("CI_SERVER_TOKEN", "secret"),
        ]);

        assert!(registry.get("server-99").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn public_listing_carries_no_token() {
        let registry = registry_from(&[
            ("CI_SERVER_URL", "https://ci.example.com"),
            ("CI_SERVER_TOKEN", "leak-canary-9000"),
        ]);

        let listing = serde_json::to_string(&registry.list_public()).unwrap();
        assert!(!listing.contains("leak-canary-9000"));
        assert!(!listing.contains("token"));
        assert!(listing.contains("\"type\":\"auto\""));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = Token::new("leak-canary-9000");
        assert_eq!(format!("{token:?}"), "[redacted]");
        let server = UpstreamServer {
            id: "server-0".to_string(),
            name: "CI".to_string(),
            base_url: "https://ci.example.com".to_string(),
            token,
            kind: "auto".to_string(),
        };
        assert!(!format!("{server:?}").contains("leak-canary-9000"));
    }

    #[test]
    fn empty_registry_lists_empty() {
        let registry = registry_from(&[]);
        assert_eq!(registry.list_public(), Vec::<PublicServer>::new());
    }
}
