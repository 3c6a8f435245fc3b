//! Local route rendering
//!
//! Turns the optional routes JSON (`{"/api/*": "backend:9000"}`) into Caddyfile
//! `handle` blocks. Nothing here is fatal: every problem with the file degrades
//! to a comment that ends up in the generated Caddyfile instead of the routes.

use serde_json::Value;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Schemes accepted as-is on a target URL
pub const KNOWN_SCHEMES: [&str; 4] = ["http://", "https://", "ws://", "wss://"];

/// Scheme prepended to targets that have none
pub const DEFAULT_SCHEME: &str = "http://";

/// A single path matcher and the upstream it proxies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Caddy path matcher, used verbatim
    pub path_matcher: String,
    /// Normalized upstream URL, always carrying a known scheme
    pub target_url: String,
}

impl RouteEntry {
    /// Create an entry, normalizing the target URL
    pub fn new(path_matcher: impl Into<String>, target_url: &str) -> Self {
        Self {
            path_matcher: path_matcher.into(),
            target_url: normalize_target_url(target_url),
        }
    }

    /// Render the Caddyfile block for this route
    pub fn to_caddy_block(&self) -> String {
        format!(
            "\n    handle {} {{\n        reverse_proxy {} {{\n            header_up Host {{http.reverse_proxy.upstream.hostport}}\n        }}\n    }}",
            self.path_matcher, self.target_url
        )
    }
}

/// Routes in the order they appear in the source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table from a parsed JSON object, skipping non-string targets
    pub fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        let mut entries = Vec::with_capacity(object.len());

        for (path_matcher, target) in object {
            let Some(target_url) = target.as_str() else {
                warn!(
                    key = %path_matcher,
                    value = %target,
                    "Skipping invalid route entry: both key and value must be strings"
                );
                continue;
            };

            if !has_known_scheme(target_url) {
                warn!(
                    path = %path_matcher,
                    target = %target_url,
                    "Target URL has no valid scheme, defaulting to {}{}",
                    DEFAULT_SCHEME,
                    target_url
                );
            }

            entries.push(RouteEntry::new(path_matcher.as_str(), target_url));
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render every route, newline separated, in source order
    pub fn to_caddy_config(&self) -> String {
        self.entries
            .iter()
            .map(RouteEntry::to_caddy_block)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of reading the routes file
///
/// Every variant except `Rendered` stands for a degraded run where the
/// Caddyfile gets an explanatory comment instead of routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutesOutcome {
    /// No file at the configured path
    NotFound,
    /// The path exists but is a directory or other non-regular file
    NotAFile(PathBuf),
    /// The file has no content at all
    Empty,
    /// The content is not JSON
    InvalidJson,
    /// Valid JSON, but not an object
    NotAnObject,
    /// `{}`
    NoRoutesDefined,
    /// An object whose entries were all rejected
    NoValidRoutes,
    /// Any other I/O failure, with the error text
    ReadError(String),
    /// At least one route was rendered
    Rendered(RouteTable),
}

impl RoutesOutcome {
    /// Whether any routes made it into the output
    pub fn has_routes(&self) -> bool {
        matches!(self, RoutesOutcome::Rendered(_))
    }

    /// The text to substitute for the routes placeholder
    pub fn into_fragment(self) -> String {
        match self {
            RoutesOutcome::Rendered(table) => table.to_caddy_config(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RoutesOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutesOutcome::NotFound => f.write_str("# No local routes file provided."),
            RoutesOutcome::NotAFile(path) => write!(f, "# {} is not a file.", path.display()),
            RoutesOutcome::Empty => f.write_str("# Routes file is empty."),
            RoutesOutcome::InvalidJson => f.write_str("# Invalid JSON in routes file."),
            RoutesOutcome::NotAnObject => {
                f.write_str("# Routes file does not contain a JSON object.")
            }
            RoutesOutcome::NoRoutesDefined => {
                f.write_str("# No routes defined in the JSON object.")
            }
            RoutesOutcome::NoValidRoutes => {
                f.write_str("# No valid routes were processed from routes.json.")
            }
            RoutesOutcome::ReadError(e) => write!(f, "# Error reading routes file: {}", e),
            RoutesOutcome::Rendered(table) => f.write_str(&table.to_caddy_config()),
        }
    }
}

/// Whether the URL already starts with a scheme Caddy can proxy to
pub fn has_known_scheme(url: &str) -> bool {
    KNOWN_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

/// Prepend `http://` to URLs without a known scheme
pub fn normalize_target_url(url: &str) -> String {
    if has_known_scheme(url) {
        url.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, url)
    }
}

/// Read and classify the routes file at `path`
pub fn load_routes(path: &Path) -> RoutesOutcome {
    info!(path = %path.display(), "Attempting to read routes");

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        // Unreachable paths (missing, under a non-directory, no search permission) count as absent
        Err(e) => {
            info!(path = %path.display(), reason = %e, "No routes configuration file found, skipping local routes");
            return RoutesOutcome::NotFound;
        }
    };

    if !metadata.is_file() {
        warn!(path = %path.display(), "Routes path is not a file, skipping local routes");
        return RoutesOutcome::NotAFile(path.to_path_buf());
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return read_error(path, e),
    };

    parse_routes(path, &content)
}

/// Classify already-read routes content
fn parse_routes(path: &Path, content: &str) -> RoutesOutcome {
    if content.is_empty() {
        warn!(path = %path.display(), "Routes file is empty, skipping local routes");
        return RoutesOutcome::Empty;
    }

    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Routes file is not valid JSON, no local routes will be added");
            return RoutesOutcome::InvalidJson;
        }
    };

    let Value::Object(object) = value else {
        warn!(path = %path.display(), "Routes file is not a JSON object, skipping local routes");
        return RoutesOutcome::NotAnObject;
    };

    if object.is_empty() {
        warn!(path = %path.display(), "Routes file contains an empty JSON object, no routes to add");
        return RoutesOutcome::NoRoutesDefined;
    }

    info!(path = %path.display(), entries = object.len(), "Processing routes configuration");
    let table = RouteTable::from_json_object(&object);

    if table.is_empty() {
        warn!(path = %path.display(), "No valid routes were processed");
        return RoutesOutcome::NoValidRoutes;
    }

    info!(routes = table.len(), "Generated local routes configuration");
    RoutesOutcome::Rendered(table)
}

fn read_error(path: &Path, e: io::Error) -> RoutesOutcome {
    error!(path = %path.display(), error = %e, "Error reading routes file");
    RoutesOutcome::ReadError(e.to_string())
}

/// Render the routes placeholder replacement for the file at `path`
///
/// Never fails; degraded cases produce a comment line.
pub fn render(path: &Path) -> String {
    load_routes(path).into_fragment()
}
