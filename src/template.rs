//! Caddyfile template materialization
//!
//! Placeholders understood in the template:
//! - `{$PROXY_PORT}` or `{$PROXY_PORT:-443}`: the inline default is ignored,
//!   the resolved setting always wins
//! - `{$HCC_ENV_URL}`
//! - `{{LOCAL_ROUTES_PLACEHOLDER}}`: the rendered local routes
//!
//! A placeholder missing from the template is not an error.

use crate::config::Settings;
use crate::error::EntrypointError;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::path::Path;
use tracing::{debug, info};

/// Matches `{$PROXY_PORT}` with an optional `:-<digits>` default
pub const PROXY_PORT_PATTERN: &str = r"\{\$PROXY_PORT(:-\d+)?\}";

/// Literal upstream URL placeholder
pub const HCC_ENV_URL_PLACEHOLDER: &str = "{$HCC_ENV_URL}";

/// Literal local routes placeholder
pub const LOCAL_ROUTES_PLACEHOLDER: &str = "{{LOCAL_ROUTES_PLACEHOLDER}}";

const RULE: &str = "----------------------------------";

static PROXY_PORT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(PROXY_PORT_PATTERN).expect("valid port placeholder pattern"));

/// Substitute every placeholder in `template`
///
/// Passes run in a fixed order: port, upstream URL, routes. Replacement
/// values are inserted literally.
pub fn render_template(template: &str, settings: &Settings, routes_fragment: &str) -> String {
    let content = PROXY_PORT_REGEX.replace_all(template, NoExpand(&settings.proxy_port));
    let content = content.replace(HCC_ENV_URL_PLACEHOLDER, &settings.hcc_env_url);
    content.replace(LOCAL_ROUTES_PLACEHOLDER, routes_fragment)
}

/// Read the template, substitute placeholders and write the Caddyfile
///
/// Returns the generated content. The output file is only touched once the
/// template has been read successfully.
pub fn materialize(
    template_path: &Path,
    output_path: &Path,
    settings: &Settings,
    routes_fragment: &str,
) -> Result<String, EntrypointError> {
    let template = std::fs::read_to_string(template_path)
        .map_err(|e| EntrypointError::template(template_path, e))?;
    debug!(path = %template_path.display(), bytes = template.len(), "Template loaded");

    let content = render_template(&template, settings, routes_fragment);

    std::fs::write(output_path, &content).map_err(|e| EntrypointError::OutputWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    info!(path = %output_path.display(), bytes = content.len(), "Caddyfile written");

    Ok(content)
}

/// Echo the generated Caddyfile to stdout for operators
pub fn print_generated(output_path: &Path, content: &str) {
    println!("\nGenerated Caddyfile ({}):", output_path.display());
    println!("{}", RULE);
    println!("{}", content);
    println!("{}\n", RULE);
}
