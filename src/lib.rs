#![allow(clippy::module_inception)]

use std::{rc::Rc, sync::Once};

use crate::errors::errors::{Error, ErrorTip};

pub mod assembler;
pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }

    pub fn is_null(&self) -> bool {
        self.1.as_str() == "<null>"
    }
}

#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

static TRACING_INIT: Once = Once::new();

/// Installs a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Finds the line holding byte offset `position` of `source`.
///
/// Returns the 1-based line number, the line text and the offset within
/// the line. An offset one past the end maps to the end of the last line.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;
    if pos > source.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;
    let mut last = None;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();
        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }
        last = Some((line_number, line.to_string(), pos - start));
        start = end;
        line_number += 1;
    }

    last
}

/// Prints a front-end error with the offending line underlined.
///
/// ```text
/// Error: UnexpectedToken (Expected an expression)
/// -> main.elz
///    |
/// 20 | x = 1 + ;
///    | --------^
/// ```
pub fn display_error(error: &Error, source: &str, file: &str) {
    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }

    let position = error.get_position();
    let located = if position.is_null() {
        None
    } else {
        get_line_at_position(source, position.0)
    };
    let Some((line, line_text, line_pos)) = located else {
        eprintln!("-> {}: {}", file, error);
        return;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    eprintln!("-> {}", file);
    eprintln!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    eprintln!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let start = string.len() - string.trim_start_matches([' ', '\t']).len();
    (&string[start..], start)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{get_line_at_position, remove_starting_whitespace};

    const SOURCE: &str = "x = 1\nfn main() {\n    let y = x\n}\n";

    #[test]
    fn test_get_line_at_position() {
        assert_eq!(
            get_line_at_position(SOURCE, 4),
            Some((1, String::from("x = 1\n"), 4))
        );
        assert_eq!(
            get_line_at_position(SOURCE, 22),
            Some((3, String::from("    let y = x\n"), 4))
        );
    }

    #[test]
    fn test_position_at_end_of_source() {
        let (line, text, pos) = get_line_at_position(SOURCE, SOURCE.len() as u32).unwrap();
        assert_eq!(line, 4);
        assert_eq!(text, "}\n");
        assert_eq!(pos, 2);

        assert_eq!(get_line_at_position(SOURCE, 500), None);
    }

    #[test]
    fn test_remove_starting_whitespace() {
        assert_eq!(remove_starting_whitespace("    let y"), ("let y", 4));
        assert_eq!(remove_starting_whitespace("x"), ("x", 0));
    }
}
