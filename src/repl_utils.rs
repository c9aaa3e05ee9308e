//! Utility helpers for interactive REPL input handling.
//!
//! `is_complete_input(input: &str) -> bool` decides whether the text read so
//! far forms a complete top-level input or whether more lines should be read.
//! It ignores brackets inside string literals and comments.

/// Returns true when the given `input` looks like a complete top-level
/// program piece: brackets are balanced and strings and block comments are
/// closed.
///
/// This is a heuristic, not a parser. Mismatched or extra closing brackets
/// count as complete so that the evaluator reports the syntax error.
pub fn is_complete_input(src: &str) -> bool {
    let mut bracket_stack: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut in_line_comment = false;
    let mut in_block_comment = false;
    let mut escape = false;
    let mut chars = src.chars().peekable();

    while let Some(ch) = chars.next() {
        if escape {
            escape = false;
            continue;
        }

        if in_line_comment {
            if ch == '\n' || ch == '\r' {
                in_line_comment = false;
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                let _ = chars.next();
                in_block_comment = false;
            }
            continue;
        }

        if let Some(q) = quote {
            match ch {
                '\\' => escape = true,
                // string literals cannot span lines
                '\n' => return true,
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '/' if chars.peek() == Some(&'/') => {
                let _ = chars.next();
                in_line_comment = true;
            }
            '/' if chars.peek() == Some(&'*') => {
                let _ = chars.next();
                in_block_comment = true;
            }
            '(' => bracket_stack.push(')'),
            '[' => bracket_stack.push(']'),
            '{' => bracket_stack.push('}'),
            ')' | ']' | '}' => match bracket_stack.pop() {
                Some(expected) if expected == ch => {}
                _ => return true,
            },
            _ => {}
        }
    }

    quote.is_none() && !in_block_comment && bracket_stack.is_empty()
}
