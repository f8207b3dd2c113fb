//! Terminal report for the patch and check commands.
//!
//! One line per package file, led by a status badge, then a closing summary.
//! Colors follow `--color` unless `NO_COLOR` is set.

use std::io::Write;
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// `NO_COLOR` beats `--color`, which beats TTY detection
pub fn resolve_color_choice(flag: Option<&str>) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// State of one package file in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Written by this run
    Written,
    /// Would be written without `--dry-run`
    Planned,
    /// Already in published form
    Patched,
    /// Still in wasm-pack's original form
    Pending,
}

impl FileState {
    fn label(self) -> &'static str {
        match self {
            FileState::Written => "OK",
            FileState::Planned => "DRY RUN",
            FileState::Patched => "PATCHED",
            FileState::Pending => "PENDING",
        }
    }

    fn color(self) -> Color {
        match self {
            FileState::Written | FileState::Planned | FileState::Patched => Color::Green,
            FileState::Pending => Color::Yellow,
        }
    }
}

pub struct StyledOutput {
    stdout: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    /// ` OK  patched pkg/package.json (name = @scope/pkg)`
    ///
    /// `action` may be empty; `detail` is dimmed and omitted when empty.
    pub fn file_line(&mut self, state: FileState, action: &str, path: &Path, detail: &str) {
        let mut badge = ColorSpec::new();
        badge
            .set_bg(Some(state.color()))
            .set_fg(Some(Color::White))
            .set_bold(true);
        self.styled(&badge, &format!(" {} ", state.label()));

        if action.is_empty() {
            let _ = write!(self.stdout, " {}", path.display());
        } else {
            let _ = write!(self.stdout, " {} {}", action, path.display());
        }

        if !detail.is_empty() {
            let mut dim = ColorSpec::new();
            dim.set_fg(Some(Color::White));
            self.styled(&dim, &format!(" ({})", detail));
        }
        let _ = writeln!(self.stdout);
    }

    /// Indented remark under the file lines; a mismatch is shown as a warning
    pub fn note(&mut self, text: &str, warn: bool) {
        let mut spec = ColorSpec::new();
        if warn {
            spec.set_fg(Some(Color::Yellow)).set_bold(true);
        } else {
            spec.set_fg(Some(Color::White));
        }
        self.styled(&spec, &format!("  {}", text));
        let _ = writeln!(self.stdout);
    }

    /// Closing line, green when the package is in the expected state
    pub fn summary(&mut self, ok: bool, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(if ok { Color::Green } else { Color::Red }))
            .set_bold(true);
        self.styled(&spec, text);
        let _ = writeln!(self.stdout);
        let _ = self.stdout.flush();
    }

    fn styled(&mut self, spec: &ColorSpec, text: &str) {
        let _ = self.stdout.set_color(spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }
}
