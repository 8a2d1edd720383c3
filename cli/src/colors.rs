//! Semantic color helpers for consistent CLI output.

use colored::{ColoredString, Colorize};

/// Semantic color helpers.
///
/// | Element | Color |
/// |---------|-------|
/// | Success, amounts | Green |
/// | Errors | Red |
/// | Warnings, addresses | Yellow |
/// | Hints | Cyan |
/// | Chains | Magenta |
/// | Paths | Blue |
/// | Labels | White+Bold |
pub struct Colors;

impl Colors {
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    pub fn error(s: &str) -> ColoredString {
        s.red()
    }

    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn info(s: &str) -> ColoredString {
        s.cyan()
    }

    pub fn path(s: &str) -> ColoredString {
        s.blue()
    }

    pub fn address(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn amount(s: &str) -> ColoredString {
        s.green()
    }

    pub fn chain(s: &str) -> ColoredString {
        s.magenta()
    }

    pub fn key(s: &str) -> ColoredString {
        s.white().bold()
    }

    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }
}
