//! Route classification by ordered path prefixes.
//!
//! Precedence: every public prefix is checked before any protected prefix,
//! and within each group the first configured match wins. A path that
//! matches both a public and a protected prefix is therefore public.

use serde::{Deserialize, Serialize};

use stratix_core::config::GateConfig;

/// Access class of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    /// Reachable without a session.
    Public,
    /// Requires a verified principal.
    Protected,
    /// Matched no prefix.
    Unclassified,
}

impl std::fmt::Display for RouteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteClass::Public => write!(f, "public"),
            RouteClass::Protected => write!(f, "protected"),
            RouteClass::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Single ordered table of `(prefix, class)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<(String, RouteClass)>,
}

impl RouteTable {
    /// Builds the table with all public prefixes ahead of the protected ones.
    pub fn new<P, Q, S, T>(public: P, protected: Q) -> Self
    where
        P: IntoIterator<Item = S>,
        Q: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let entries = public
            .into_iter()
            .map(|p| (p.into(), RouteClass::Public))
            .chain(
                protected
                    .into_iter()
                    .map(|p| (p.into(), RouteClass::Protected)),
            )
            .collect();

        Self { entries }
    }

    /// Builds the table from gate configuration.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(
            config.public_prefixes.iter().cloned(),
            config.protected_prefixes.iter().cloned(),
        )
    }

    /// Classifies `path` with plain `starts_with` matching.
    pub fn classify(&self, path: &str) -> RouteClass {
        self.entries
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
            .map(|(_, class)| *class)
            .unwrap_or(RouteClass::Unclassified)
    }

    /// The table in evaluation order.
    pub fn entries(&self) -> &[(String, RouteClass)] {
        &self.entries
    }
}

/// Whether `path` is already in the form a downstream URL parser would
/// produce.
///
/// Dot segments (also percent-encoded), empty interior segments, backslashes
/// and encoded separators are rejected: any of them can make the classified
/// path differ from the path that is finally served.
pub fn is_canonical_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if path.contains('\\') {
        return false;
    }

    let lowered = rest.to_ascii_lowercase();
    if lowered.contains("%2f") || lowered.contains("%5c") {
        return false;
    }

    let segments: Vec<&str> = lowered.split('/').collect();
    let last = segments.len().saturating_sub(1);
    segments.iter().enumerate().all(|(index, segment)| {
        let decoded = segment.replace("%2e", ".");
        match decoded.as_str() {
            "." | ".." => false,
            "" => index == last,
            _ => true,
        }
    })
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::from_config(&GateConfig::default())
    }
}
