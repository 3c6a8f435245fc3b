use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable holding the listen port
pub const PROXY_PORT_VAR: &str = "PROXY_PORT";
/// Environment variable holding the upstream environment URL
pub const HCC_ENV_URL_VAR: &str = "HCC_ENV_URL";
/// Environment variable holding the routes JSON path
pub const ROUTES_JSON_PATH_VAR: &str = "ROUTES_JSON_PATH";
/// Environment variable holding the Caddyfile template path
pub const CADDYFILE_TEMPLATE_PATH_VAR: &str = "CADDYFILE_TEMPLATE_PATH";
/// Environment variable holding the generated Caddyfile path
pub const CADDYFILE_OUTPUT_PATH_VAR: &str = "CADDYFILE_OUTPUT_PATH";
/// Environment variable overriding the proxy executable
pub const CADDY_BIN_VAR: &str = "CADDY_BIN";

/// Source of configuration values, keyed by environment variable name
pub trait EnvSource {
    /// Look up a value. `None` means the default applies.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        // Non-unicode values fall back to the default like unset ones
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Startup settings for the entrypoint
///
/// Built once before any file is touched and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Port substituted for `{$PROXY_PORT}` (default: 443)
    pub proxy_port: String,

    /// Upstream base URL substituted for `{$HCC_ENV_URL}`
    pub hcc_env_url: String,

    /// Optional route-mapping JSON (default: /config/routes.json)
    pub routes_json_path: PathBuf,

    /// Caddyfile template to read
    pub caddyfile_template_path: PathBuf,

    /// Where the generated Caddyfile is written
    pub caddyfile_output_path: PathBuf,

    /// Proxy executable, resolved through PATH (default: caddy)
    pub caddy_bin: String,
}

impl Settings {
    /// Build settings from the process environment
    pub fn from_env() -> Self {
        Self::from_source(&ProcessEnv)
    }

    /// Build settings from any key/value source, applying defaults for missing keys
    pub fn from_source<S: EnvSource + ?Sized>(source: &S) -> Self {
        Self {
            proxy_port: source
                .var(PROXY_PORT_VAR)
                .unwrap_or_else(default_proxy_port),
            hcc_env_url: source
                .var(HCC_ENV_URL_VAR)
                .unwrap_or_else(default_hcc_env_url),
            routes_json_path: source
                .var(ROUTES_JSON_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_routes_json_path),
            caddyfile_template_path: source
                .var(CADDYFILE_TEMPLATE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_caddyfile_template_path),
            caddyfile_output_path: source
                .var(CADDYFILE_OUTPUT_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_caddyfile_output_path),
            caddy_bin: source.var(CADDY_BIN_VAR).unwrap_or_else(default_caddy_bin),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy_port: default_proxy_port(),
            hcc_env_url: default_hcc_env_url(),
            routes_json_path: default_routes_json_path(),
            caddyfile_template_path: default_caddyfile_template_path(),
            caddyfile_output_path: default_caddyfile_output_path(),
            caddy_bin: default_caddy_bin(),
        }
    }
}

fn default_proxy_port() -> String {
    "443".to_string()
}

fn default_hcc_env_url() -> String {
    "https://api.stage.hcc.example.com".to_string()
}

fn default_routes_json_path() -> PathBuf {
    PathBuf::from("/config/routes.json")
}

fn default_caddyfile_template_path() -> PathBuf {
    PathBuf::from("/etc/caddy/Caddyfile.template")
}

fn default_caddyfile_output_path() -> PathBuf {
    PathBuf::from("/etc/caddy/Caddyfile")
}

fn default_caddy_bin() -> String {
    "caddy".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_source_empty() {
        let settings = Settings::from_source(&HashMap::new());

        assert_eq!(settings.proxy_port, "443");
        assert_eq!(settings.hcc_env_url, "https://api.stage.hcc.example.com");
        assert_eq!(settings.routes_json_path, PathBuf::from("/config/routes.json"));
        assert_eq!(
            settings.caddyfile_template_path,
            PathBuf::from("/etc/caddy/Caddyfile.template")
        );
        assert_eq!(
            settings.caddyfile_output_path,
            PathBuf::from("/etc/caddy/Caddyfile")
        );
        assert_eq!(settings.caddy_bin, "caddy");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_overrides_from_source() {
        let settings = Settings::from_source(&source(&[
            ("PROXY_PORT", "8443"),
            ("HCC_ENV_URL", "https://console.example.com"),
            ("ROUTES_JSON_PATH", "/tmp/routes.json"),
            ("CADDYFILE_TEMPLATE_PATH", "/tmp/Caddyfile.template"),
            ("CADDYFILE_OUTPUT_PATH", "/tmp/Caddyfile"),
            ("CADDY_BIN", "/usr/local/bin/caddy"),
        ]));

        assert_eq!(settings.proxy_port, "8443");
        assert_eq!(settings.hcc_env_url, "https://console.example.com");
        assert_eq!(settings.routes_json_path, PathBuf::from("/tmp/routes.json"));
        assert_eq!(
            settings.caddyfile_template_path,
            PathBuf::from("/tmp/Caddyfile.template")
        );
        assert_eq!(settings.caddyfile_output_path, PathBuf::from("/tmp/Caddyfile"));
        assert_eq!(settings.caddy_bin, "/usr/local/bin/caddy");
    }

    #[test]
    fn test_partial_overrides_keep_other_defaults() {
        let settings = Settings::from_source(&source(&[("PROXY_PORT", "9000")]));

        assert_eq!(settings.proxy_port, "9000");
        assert_eq!(settings.hcc_env_url, "https://api.stage.hcc.example.com");
        assert_eq!(settings.caddy_bin, "caddy");
    }

    #[test]
    fn test_empty_value_is_used_verbatim() {
        let settings = Settings::from_source(&source(&[("HCC_ENV_URL", "")]));
        assert_eq!(settings.hcc_env_url, "");
    }

    #[test]
    fn test_unrelated_keys_ignored() {
        let settings = Settings::from_source(&source(&[("PORT", "1234")]));
        assert_eq!(settings.proxy_port, "443");
    }
}
