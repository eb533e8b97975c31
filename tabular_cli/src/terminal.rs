//! Terminal checks for progress rendering
//!
//! Progress bars draw on stderr while tables and results go to stdout, so
//! the two streams are judged separately. Decisions are made on a
//! [`TerminalProfile`] snapshot rather than the live process.

use is_terminal::IsTerminal;
use std::env;
use std::io::{stderr, stdout};

/// Environment variables set by common CI runners
const CI_VARS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Snapshot of what progress rendering depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalProfile {
    pub stderr_tty: bool,
    pub stdout_tty: bool,
    pub ci: bool,
    pub no_color: bool,
    pub term: Option<String>,
}

impl TerminalProfile {
    /// Profile of the current process
    pub fn detect() -> Self {
        Self::from_env(stderr().is_terminal(), stdout().is_terminal(), |name| {
            env::var(name).ok()
        })
    }

    /// Profile built from explicit TTY flags and an environment lookup
    pub fn from_env<F>(stderr_tty: bool, stdout_tty: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            stderr_tty,
            stdout_tty,
            ci: is_ci_with(&lookup),
            no_color: lookup("NO_COLOR").is_some_and(|value| !value.is_empty()),
            term: lookup("TERM"),
        }
    }

    fn dumb_term(&self) -> bool {
        matches!(self.term.as_deref(), None | Some("") | Some("dumb"))
    }

    /// Whether animated bars redraw properly on stderr
    ///
    /// CI runners may allocate a TTY, but their logs cannot redraw lines.
    pub fn animated_progress(&self) -> bool {
        self.stderr_tty && !self.ci && !self.dumb_term()
    }

    /// Whether stdout output should be colored
    pub fn stdout_color(&self) -> bool {
        self.stdout_tty && !self.no_color && !self.dumb_term()
    }

    /// Backend to suggest when none is configured for this terminal
    pub fn suggested_backend(&self) -> &'static str {
        if self.animated_progress() {
            "rich"
        } else {
            "simple"
        }
    }
}

fn is_ci_with<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    CI_VARS.iter().any(|var| match lookup(var) {
        Some(value) => !value.is_empty() && value != "false" && value != "0",
        None => false,
    })
}

/// Whether stdout output should be colored
pub fn stdout_supports_color() -> bool {
    TerminalProfile::detect().stdout_color()
}
