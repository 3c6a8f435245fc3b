//! Handoff to the Caddy process
//!
//! On Unix the entrypoint replaces its own process image with Caddy, so Caddy
//! keeps the container's PID and signals. Once that succeeds nothing after it
//! runs here.

use crate::error::EntrypointError;
use std::convert::Infallible;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Config adapter passed to `caddy run`
pub const CADDYFILE_ADAPTER: &str = "caddyfile";

/// A fully resolved proxy command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyInvocation {
    /// Executable name or path, looked up on PATH
    pub program: String,
    /// Arguments after the program name
    pub args: Vec<OsString>,
}

impl ProxyInvocation {
    /// `caddy run --config <config_path> --adapter caddyfile`
    pub fn caddy_run(program: impl Into<String>, config_path: &Path) -> Self {
        Self {
            program: program.into(),
            args: vec![
                OsString::from("run"),
                OsString::from("--config"),
                config_path.as_os_str().to_os_string(),
                OsString::from("--adapter"),
                OsString::from(CADDYFILE_ADAPTER),
            ],
        }
    }

    /// Human readable command line for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Something that can hand the process over to the proxy
pub trait Executor {
    /// Replace the current process with `invocation`.
    ///
    /// Only returns if the handoff failed.
    fn exec(&self, invocation: &ProxyInvocation) -> io::Error;
}

/// Executor backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    #[cfg(unix)]
    fn exec(&self, invocation: &ProxyInvocation) -> io::Error {
        use std::os::unix::process::CommandExt;

        invocation.to_command().exec()
    }

    #[cfg(not(unix))]
    fn exec(&self, invocation: &ProxyInvocation) -> io::Error {
        // No image replacement available: run to completion and mirror the exit status
        match invocation.to_command().status() {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(e) => e,
        }
    }
}

/// Transfer control to the proxy
///
/// `Ok` is uninhabited: a successful handoff never comes back.
pub fn handoff<E: Executor + ?Sized>(
    executor: &E,
    invocation: &ProxyInvocation,
) -> Result<Infallible, EntrypointError> {
    info!(command = %invocation.command_line(), "Executing Caddy");

    let e = executor.exec(invocation);
    Err(EntrypointError::exec(invocation.program.clone(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FailingExecutor {
        kind: io::ErrorKind,
        calls: RefCell<Vec<ProxyInvocation>>,
    }

    impl FailingExecutor {
        fn new(kind: io::ErrorKind) -> Self {
            Self {
                kind,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Executor for FailingExecutor {
        fn exec(&self, invocation: &ProxyInvocation) -> io::Error {
            self.calls.borrow_mut().push(invocation.clone());
            io::Error::from(self.kind)
        }
    }

    #[test]
    fn test_caddy_run_arguments() {
        let invocation = ProxyInvocation::caddy_run("caddy", Path::new("/etc/caddy/Caddyfile"));

        assert_eq!(invocation.program, "caddy");
        assert_eq!(
            invocation.args,
            vec![
                OsString::from("run"),
                OsString::from("--config"),
                OsString::from("/etc/caddy/Caddyfile"),
                OsString::from("--adapter"),
                OsString::from("caddyfile"),
            ]
        );
        assert_eq!(
            invocation.command_line(),
            "caddy run --config /etc/caddy/Caddyfile --adapter caddyfile"
        );
    }

    #[test]
    fn test_to_command() {
        let invocation = ProxyInvocation::caddy_run("/opt/caddy", Path::new("/tmp/Caddyfile"));
        let cmd = invocation.to_command();

        assert_eq!(cmd.get_program(), "/opt/caddy");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["run", "--config", "/tmp/Caddyfile", "--adapter", "caddyfile"]);
    }

    #[test]
    fn test_handoff_passes_invocation_to_executor() {
        let executor = FailingExecutor::new(io::ErrorKind::Other);
        let invocation = ProxyInvocation::caddy_run("caddy", Path::new("/etc/caddy/Caddyfile"));

        let err = handoff(&executor, &invocation).unwrap_err();

        assert_eq!(executor.calls.borrow().as_slice(), &[invocation]);
        assert!(matches!(err, EntrypointError::Exec { .. }));
    }

    #[test]
    fn test_handoff_missing_binary() {
        let executor = FailingExecutor::new(io::ErrorKind::NotFound);
        let invocation = ProxyInvocation::caddy_run("caddy", Path::new("/etc/caddy/Caddyfile"));

        let err = handoff(&executor, &invocation).unwrap_err();

        assert!(matches!(err, EntrypointError::ProxyNotFound { ref program, .. } if program == "caddy"));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_reports_missing_binary() {
        let invocation = ProxyInvocation::caddy_run(
            "/nonexistent/caddy-entrypoint-test-binary",
            Path::new("/tmp/Caddyfile"),
        );

        let err = SystemExecutor.exec(&invocation);
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
