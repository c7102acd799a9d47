//! Catalogue of The Old Reader API endpoints.
//!
//! Each [`Endpoint`] describes one remote operation: the HTTP verb, the
//! parameter names it accepts and the parameters it sends by default. The
//! table is a `const` slice indexed once into a process-wide map on first
//! lookup and never mutated afterwards.
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Root of every relative endpoint path.
pub const BASE_PATH: &str = "/reader/api/0/";

/// Parameter sent with every call unless a descriptor overrides it.
const BASELINE_DEFAULTS: &[(&str, &str)] = &[("output", "json")];

/// Caller-supplied (or merged) request parameters, keyed by name.
pub type Params = BTreeMap<String, String>;

/// HTTP verb used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Parameters are encoded into the query string.
    Get,
    /// Parameters are encoded as an `application/x-www-form-urlencoded` body.
    Post,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Immutable descriptor for one remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    id: &'static str,
    verb: Verb,
    params: Option<&'static [&'static str]>,
    defaults: &'static [(&'static str, &'static str)],
}

impl Endpoint {
    pub const fn get(id: &'static str) -> Self {
        Self {
            id,
            verb: Verb::Get,
            params: None,
            defaults: &[],
        }
    }

    pub const fn post(id: &'static str) -> Self {
        Self {
            id,
            verb: Verb::Post,
            params: None,
            defaults: &[],
        }
    }

    /// Restrict caller parameters to `names`. An empty slice accepts nothing.
    pub const fn accepts(mut self, names: &'static [&'static str]) -> Self {
        self.params = Some(names);
        self
    }

    pub const fn defaults(mut self, defaults: &'static [(&'static str, &'static str)]) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The allow-list, or `None` when every caller parameter passes through.
    pub fn allowed_params(&self) -> Option<&'static [&'static str]> {
        self.params
    }

    pub fn default_params(&self) -> &'static [(&'static str, &'static str)] {
        self.defaults
    }

    /// Absolute identifiers start with `/` and are requested verbatim.
    pub fn is_absolute(&self) -> bool {
        self.id.starts_with('/')
    }

    /// Request path for this endpoint.
    pub fn path(&self) -> String {
        if self.is_absolute() {
            self.id.to_string()
        } else {
            format!("{BASE_PATH}{}", self.id)
        }
    }

    /// Drop caller parameters the endpoint does not accept.
    ///
    /// Without an allow-list every parameter is kept. With one, only listed
    /// names survive, so an empty allow-list yields an empty map.
    pub fn sanitize(&self, params: &Params) -> Params {
        match self.params {
            None => params.clone(),
            Some(allowed) => params
                .iter()
                .filter(|(key, _)| allowed.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    /// Merge the baseline `output=json`, the descriptor defaults and the
    /// sanitized caller parameters, later sources winning on collision.
    ///
    /// Filtering happens before the merge, so a disallowed caller key can
    /// never replace a default.
    pub fn build_params(&self, params: &Params) -> Params {
        let mut merged: Params = BASELINE_DEFAULTS
            .iter()
            .chain(self.defaults.iter())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        merged.extend(self.sanitize(params));
        merged
    }
}

const STREAM_QUERY: &[&str] = &["s", "xt", "n", "r", "c", "nt", "ot"];

static CATALOGUE: &[Endpoint] = &[
    Endpoint::post("accounts/ClientLogin")
        .accepts(&["client", "Email", "Passwd"])
        .defaults(&[("accountType", "HOSTED_OR_GOOGLE"), ("service", "reader")]),
    Endpoint::get("status"),
    Endpoint::get("token"),
    Endpoint::get("user-info"),
    Endpoint::get("preference/list"),
    Endpoint::get("friend/list"),
    Endpoint::post("friend/edit").accepts(&["action", "u"]),
    Endpoint::post("comment/edit").accepts(&["action", "i", "comment"]),
    Endpoint::get("tag/list"),
    Endpoint::get("preference/stream/list"),
    Endpoint::post("preference/stream/set"),
    Endpoint::post("rename-tag").accepts(&["s", "dest"]),
    Endpoint::post("disable-tag").accepts(&["s"]),
    Endpoint::get("unread-count"),
    Endpoint::get("subscription/list"),
    Endpoint::post("subscription/quickadd").accepts(&["quickadd"]),
    Endpoint::post("subscription/edit").accepts(&["ac", "s", "t", "a", "r"]),
    Endpoint::get("stream/items/ids").accepts(STREAM_QUERY),
    Endpoint::post("stream/items/contents").accepts(&["i", "output"]),
    Endpoint::get("stream/contents").accepts(&["s", "xt", "n", "r", "c", "nt", "ot", "output"]),
    Endpoint::post("mark-all-as-read").accepts(&["s", "ts"]),
    Endpoint::post("edit-tag").accepts(&["i", "a", "r", "annotation"]),
    Endpoint::get("/reader/subscriptions/export"),
    Endpoint::get("/reader/atom"),
];

static INDEX: OnceLock<HashMap<&'static str, &'static Endpoint>> = OnceLock::new();

fn index() -> &'static HashMap<&'static str, &'static Endpoint> {
    INDEX.get_or_init(|| CATALOGUE.iter().map(|e| (e.id, e)).collect())
}

/// Find the descriptor for `id`.
pub fn lookup(id: &str) -> Option<&'static Endpoint> {
    index().get(id).copied()
}

/// Every endpoint in catalogue order.
pub fn all() -> impl Iterator<Item = &'static Endpoint> {
    CATALOGUE.iter()
}
