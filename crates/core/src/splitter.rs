/// Splits composite SQL text into individual statements.
///
/// A `;` terminates a statement only outside of:
/// - single-quoted strings (with the `''` escape),
/// - double-quoted identifiers,
/// - backtick-quoted identifiers,
/// - `--` and `#` line comments,
/// - `/* ... */` block comments (non-nested),
/// - dollar-quoted bodies `$tag$ ... $tag$` with tag chars `[A-Za-z0-9_]`.
///
/// Statements are trimmed; empty ones are discarded.
pub fn split_statements(sql: &str) -> Vec<String> {
    let chars: Vec<char> = sql.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;
    let mut index = 0usize;

    while index < chars.len() {
        let ch = chars[index];
        match &state {
            State::Normal => match ch {
                ';' => {
                    flush(&mut current, &mut statements);
                    index += 1;
                }
                '\'' => {
                    state = State::Single;
                    current.push(ch);
                    index += 1;
                }
                '"' => {
                    state = State::Double;
                    current.push(ch);
                    index += 1;
                }
                '`' => {
                    state = State::Backtick;
                    current.push(ch);
                    index += 1;
                }
                '#' => {
                    state = State::LineComment;
                    current.push(ch);
                    index += 1;
                }
                '-' if chars.get(index + 1) == Some(&'-') => {
                    state = State::LineComment;
                    current.push_str("--");
                    index += 2;
                }
                '/' if chars.get(index + 1) == Some(&'*') => {
                    state = State::BlockComment;
                    current.push_str("/*");
                    index += 2;
                }
                '$' => {
                    if let Some(tag) = dollar_tag(&chars, index) {
                        current.push('$');
                        current.push_str(&tag);
                        current.push('$');
                        index += tag.chars().count() + 2;
                        state = State::Dollar(tag);
                    } else {
                        current.push(ch);
                        index += 1;
                    }
                }
                _ => {
                    current.push(ch);
                    index += 1;
                }
            },
            State::Single => {
                current.push(ch);
                if ch == '\'' {
                    if chars.get(index + 1) == Some(&'\'') {
                        current.push('\'');
                        index += 2;
                        continue;
                    }
                    state = State::Normal;
                }
                index += 1;
            }
            State::Double => {
                current.push(ch);
                if ch == '"' {
                    state = State::Normal;
                }
                index += 1;
            }
            State::Backtick => {
                current.push(ch);
                if ch == '`' {
                    state = State::Normal;
                }
                index += 1;
            }
            State::LineComment => {
                current.push(ch);
                if ch == '\n' {
                    state = State::Normal;
                }
                index += 1;
            }
            State::BlockComment => {
                if ch == '*' && chars.get(index + 1) == Some(&'/') {
                    current.push_str("*/");
                    index += 2;
                    state = State::Normal;
                } else {
                    current.push(ch);
                    index += 1;
                }
            }
            State::Dollar(tag) => {
                if ch == '$' && closes_dollar(&chars, index, tag) {
                    current.push('$');
                    current.push_str(tag);
                    current.push('$');
                    index += tag.chars().count() + 2;
                    state = State::Normal;
                } else {
                    current.push(ch);
                    index += 1;
                }
            }
        }
    }

    flush(&mut current, &mut statements);
    statements
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Normal,
    Single,
    Double,
    Backtick,
    LineComment,
    BlockComment,
    Dollar(String),
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

/// Reads the tag of a dollar-quote opener starting at `chars[start] == '$'`.
/// Returns `None` when the `$` does not begin a dollar quote.
fn dollar_tag(chars: &[char], start: usize) -> Option<String> {
    let mut tag = String::new();
    let mut index = start + 1;
    while let Some(ch) = chars.get(index) {
        if ch.is_ascii_alphanumeric() || *ch == '_' {
            tag.push(*ch);
            index += 1;
        } else if *ch == '$' {
            return Some(tag);
        } else {
            return None;
        }
    }
    None
}

fn closes_dollar(chars: &[char], start: usize, tag: &str) -> bool {
    let mut index = start + 1;
    for expected in tag.chars() {
        if chars.get(index) != Some(&expected) {
            return false;
        }
        index += 1;
    }
    chars.get(index) == Some(&'$')
}
