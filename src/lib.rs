#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod driver;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

/// A location in the source text.
///
/// `line` and `col` are 1-based; `offset` is the byte offset from the start
/// of the source. Positions only ever move forward within one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub col: u32,
    pub offset: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(line: u32, col: u32, offset: u32, file: Rc<String>) -> Self {
        Position {
            line,
            col,
            offset,
            file,
        }
    }

    pub fn null() -> Self {
        Position::new(0, 0, 0, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn at(position: Position) -> Self {
        Span {
            start: position.clone(),
            end: position,
        }
    }

    pub fn null() -> Self {
        Span::at(Position::null())
    }
}

/// Returns the text of the line containing `position`, without its line
/// terminator, or `None` when the line does not exist in `source`.
pub fn get_line_at_position(source: &str, position: &Position) -> Option<String> {
    if position.line == 0 {
        return None;
    }

    source
        .split('\n')
        .nth((position.line - 1) as usize)
        .map(|line| line.trim_end_matches('\r').to_string())
}

/// Renders an error with a caret under the offending column:
///
/// ```text
/// Error: VariableNotDeclared (Variable `y` not declared)
/// -> fib.ks
///   |
/// 3 | x + y
///   | ----^
/// ```
pub fn render_error(error: &Error, source: &str) -> String {
    let position = error.get_position();
    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    out.push_str(&format!("-> {}:{}:{}\n", position.file, position.line, position.col));

    let Some(line_text) = get_line_at_position(source, position) else {
        return out;
    };

    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    out.push_str(&format!("{:>padding$}\n", "|"));
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = (position.col as usize).saturating_sub(removed_whitespace).max(1);
    out.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));

    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
