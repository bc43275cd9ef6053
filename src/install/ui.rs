//! Terminal output helpers for the installer
//!
//! Colors are only emitted when stdout is a terminal.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout() -> StandardStream {
    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Render an argv for display, escaping spaces in every argument after the
/// program name.
pub fn shell_display<S: AsRef<str>>(argv: &[S]) -> String {
    let mut parts = argv.iter().map(AsRef::as_ref);
    let Some(first) = parts.next() else {
        return String::new();
    };
    std::iter::once(first.to_string())
        .chain(parts.map(|a| a.replace(' ', "\\ ")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Section header: `==> message`.
pub fn ohai(message: &str) {
    ohai_emphasized(message, None, "");
}

/// Section header with one underlined fragment, e.g. a user or group name.
pub fn ohai_emphasized(before: &str, emphasized: Option<&str>, after: &str) {
    let mut out = stdout();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true));
    let _ = write!(out, "==>");
    let _ = out.set_color(ColorSpec::new().set_bold(true));
    let _ = write!(out, " {before}");
    if let Some(text) = emphasized {
        let _ = out.set_color(ColorSpec::new().set_underline(true));
        let _ = write!(out, "{text}");
        let _ = out.set_color(ColorSpec::new().set_bold(true));
    }
    let _ = write!(out, "{after}");
    let _ = out.reset();
    let _ = writeln!(out);
}

pub fn warn(message: &str) {
    let mut out = stdout();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(out, "Warning");
    let _ = out.reset();
    let _ = writeln!(out, ": {}", message.trim_end());
}

pub fn print_paths(paths: &[PathBuf]) {
    let mut out = stdout();
    for path in paths {
        let _ = writeln!(out, "{}", path.display());
    }
}

/// Report a fatal error and its fix on stderr.
pub fn error(message: &str, fix: Option<&str>) {
    let choice = if std::io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut err = StandardStream::stderr(choice);
    let _ = err.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = writeln!(err, "{message}");
    let _ = err.reset();
    if let Some(fix) = fix {
        let _ = writeln!(err, "{fix}");
    }
}

/// Ring the terminal bell.
pub fn bell() {
    let mut out = std::io::stdout();
    let _ = out.write_all(b"\x07");
    let _ = out.flush();
}
