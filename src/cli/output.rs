//! Handles all user-facing output for the CLI.
//!
//! Diffs and file headers go to stdout through `termcolor`; findings and
//! error reports go to stderr.

use std::io::Write;
use std::path::Path;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::consistency::Inconsistency;

pub fn color_choice(color: bool) -> ColorChoice {
    if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Prints a `==> path <==` banner before a file's output.
pub fn print_header(path: &Path, color: bool) {
    let mut stdout = StandardStream::stdout(color_choice(color));
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "==> {} <==", path.display());
    let _ = stdout.reset();
}

/// Prints a line diff from the file's text to its canonical rendering.
pub fn print_file_diff(path: &Path, original: &str, canonical: &str, color: bool) {
    let mut stdout = StandardStream::stdout(color_choice(color));
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    let _ = writeln!(stdout, "--- {}", path.display());
    let _ = writeln!(stdout, "+++ {} (canonical)", path.display());
    let _ = stdout.reset();

    let changeset = Changeset::new(original, canonical, "\n");
    print_diff(&mut stdout, &changeset.diffs);
    let _ = stdout.reset();
}

/// Prints one finding as `path:line:column: message`.
pub fn print_finding(path: &Path, text: &str, finding: &Inconsistency) {
    match finding.span {
        Some(span) => {
            let (line, column) = span.line_col(text);
            eprintln!("{}:{}:{}: {}", path.display(), line, column, finding);
        }
        None => eprintln!("{}: {}", path.display(), finding),
    }
}

pub fn print_report(report: &miette::Report) {
    eprintln!("{report:?}");
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                let _ = stdout.reset();
                write_lines(stdout, ' ', x);
            }
            Difference::Add(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                write_lines(stdout, '+', x);
            }
            Difference::Rem(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                write_lines(stdout, '-', x);
            }
        }
    }
}

// A chunk may span several lines, including empty ones.
fn write_lines(stdout: &mut StandardStream, marker: char, chunk: &str) {
    for line in chunk.split('\n') {
        let _ = writeln!(stdout, "{}{}", marker, line);
    }
}
