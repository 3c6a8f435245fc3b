use caddy_entrypoint::config::Settings;
use caddy_entrypoint::process::SystemExecutor;
use caddy_entrypoint::{Mode, PKG_NAME, VERSION};
use tracing::{error, info};
use tracing_subscriber::fmt::writer::MakeWriterExt;

fn main() -> anyhow::Result<()> {
    // Errors go to stderr, progress to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caddy_entrypoint=info".into()),
        )
        .with_writer(
            std::io::stderr
                .with_max_level(tracing::Level::ERROR)
                .or_else(std::io::stdout),
        )
        .init();

    let mode = Mode::from_args(std::env::args().skip(1));
    let settings = Settings::from_env();

    print_startup_banner(&settings, mode);

    caddy_entrypoint::run(&settings, &SystemExecutor, mode).map_err(|e| {
        error!(error = %e, "Caddy entrypoint failed");
        e
    })?;

    Ok(())
}

fn print_startup_banner(settings: &Settings, mode: Mode) {
    info!(
        name = PKG_NAME,
        version = VERSION,
        render_only = mode == Mode::RenderOnly,
        "Starting Caddy frontend proxy entrypoint"
    );
    info!(
        proxy_port = %settings.proxy_port,
        hcc_env_url = %settings.hcc_env_url,
        "Proxy settings"
    );
    info!(
        routes_json = %settings.routes_json_path.display(),
        template = %settings.caddyfile_template_path.display(),
        output = %settings.caddyfile_output_path.display(),
        caddy_bin = %settings.caddy_bin,
        "File locations"
    );
}
