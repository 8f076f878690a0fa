//! Line Tokenizer
//!
//! Splits one line of user input into whitespace-separated tokens.
//!
//! Two kinds of segments are kept whole even when they contain spaces:
//!
//! - double-quoted strings (`"hello world"`, with `\"` escapes)
//! - JSON literals opened by `[` or `{`, up to the matching close bracket
//!
//! The quotes and brackets stay **inside** the token. Decoding them is the
//! job of the command that receives the token, so `SET a "x y"` hands
//! `"x y"` (quotes included) to the `SET` handler.
//!
//! The tokenizer never fails. An unterminated quote or bracket simply runs
//! to the end of the line.

/// Splits `line` into tokens.
///
/// # Example
///
/// ```
/// use kvshell::protocol::tokenize;
///
/// let tokens = tokenize(r#"ARR/SET list ["a", "b c"] 60"#);
/// assert_eq!(tokens, vec!["ARR/SET", "list", r#"["a", "b c"]"#, "60"]);
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for c in line.chars() {
        if in_quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_quote = true;
                current.push(c);
            }
            '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ']' | '}' if depth > 0 => {
                depth -= 1;
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
