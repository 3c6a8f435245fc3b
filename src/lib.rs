//! Caddy entrypoint - renders a Caddyfile and hands off to Caddy
//!
//! Runs once at container start:
//! - Reads settings from the environment, with defaults
//! - Renders local routes from an optional JSON map of path matcher to upstream
//! - Substitutes placeholders in the Caddyfile template and writes the result
//! - Replaces itself with `caddy run` pointed at the generated file

pub mod config;
pub mod error;
pub mod process;
pub mod routes;
pub mod template;

use config::Settings;
use error::EntrypointError;
use process::{Executor, ProxyInvocation};
use tracing::{info, warn};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// What to do after the Caddyfile is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Replace this process with Caddy
    #[default]
    Exec,
    /// Stop after writing the Caddyfile
    RenderOnly,
}

impl Mode {
    /// Parse command line arguments (without the program name)
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mode = Mode::Exec;
        for arg in args {
            match arg.as_ref() {
                "--render-only" => mode = Mode::RenderOnly,
                other => warn!(argument = %other, "Ignoring unknown argument"),
            }
        }
        mode
    }
}

/// Generate the Caddyfile and return the command that should run it
pub fn generate(settings: &Settings) -> Result<ProxyInvocation, EntrypointError> {
    let outcome = routes::load_routes(&settings.routes_json_path);
    if !outcome.has_routes() {
        info!(reason = %outcome, "Caddyfile will contain no local routes");
    }
    let routes_fragment = outcome.into_fragment();

    let content = template::materialize(
        &settings.caddyfile_template_path,
        &settings.caddyfile_output_path,
        settings,
        &routes_fragment,
    )?;
    template::print_generated(&settings.caddyfile_output_path, &content);

    Ok(ProxyInvocation::caddy_run(
        settings.caddy_bin.clone(),
        &settings.caddyfile_output_path,
    ))
}

/// Full startup sequence
///
/// In [`Mode::Exec`] this only returns on failure.
pub fn run<E: Executor + ?Sized>(
    settings: &Settings,
    executor: &E,
    mode: Mode,
) -> Result<(), EntrypointError> {
    let invocation = generate(settings)?;

    match mode {
        Mode::Exec => match process::handoff(executor, &invocation)? {},
        Mode::RenderOnly => {
            info!(command = %invocation.command_line(), "Render only, not executing Caddy");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_args() {
        assert_eq!(Mode::from_args(Vec::<String>::new()), Mode::Exec);
        assert_eq!(Mode::from_args(["--render-only"]), Mode::RenderOnly);
        assert_eq!(Mode::from_args(["--verbose"]), Mode::Exec);
        assert_eq!(Mode::from_args(["--verbose", "--render-only"]), Mode::RenderOnly);
    }
}
