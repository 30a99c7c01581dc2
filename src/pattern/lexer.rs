use super::{PatternError, PatternResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexKind {
    Open,
    Close,
    Pattern,
    Name,
    Char,
    EscapedChar,
    Modifier,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexToken {
    pub kind: LexKind,
    pub index: usize,
    pub value: String,
}

impl LexToken {
    fn new(kind: LexKind, index: usize, value: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            value: value.into(),
        }
    }
}

/// Splits a path pattern into tokens. Indices are byte offsets into `pattern`.
#[tracing::instrument(level = "trace", fields(pattern_len = pattern.len() as u64))]
pub fn lex(pattern: &str) -> PatternResult<Vec<LexToken>> {
    let chars: Vec<(usize, char)> = pattern.char_indices().collect();
    let mut tokens = Vec::with_capacity(chars.len() + 1);
    let mut i = 0usize;

    while i < chars.len() {
        let (index, ch) = chars[i];

        match ch {
            '*' | '+' | '?' => {
                tokens.push(LexToken::new(LexKind::Modifier, index, ch));
                i += 1;
            }
            '\\' => {
                let Some(&(escaped_index, escaped)) = chars.get(i + 1) else {
                    return Err(PatternError::DanglingEscape {
                        pattern: pattern.to_string(),
                        index,
                    });
                };
                tokens.push(LexToken::new(LexKind::EscapedChar, escaped_index, escaped));
                i += 2;
            }
            '{' => {
                tokens.push(LexToken::new(LexKind::Open, index, ch));
                i += 1;
            }
            '}' => {
                tokens.push(LexToken::new(LexKind::Close, index, ch));
                i += 1;
            }
            ':' => {
                let mut name = String::new();
                let mut j = i + 1;

                while let Some(&(_, c)) = chars.get(j) {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    name.push(c);
                    j += 1;
                }

                if name.is_empty() {
                    return Err(PatternError::MissingParameterName {
                        pattern: pattern.to_string(),
                        index,
                    });
                }

                tokens.push(LexToken::new(LexKind::Name, index, name));
                i = j;
            }
            '(' => {
                let (body, next) = lex_group(pattern, &chars, i)?;
                tokens.push(LexToken::new(LexKind::Pattern, index, body));
                i = next;
            }
            _ => {
                tokens.push(LexToken::new(LexKind::Char, index, ch));
                i += 1;
            }
        }
    }

    tokens.push(LexToken::new(LexKind::End, pattern.len(), ""));

    Ok(tokens)
}

/// Reads a balanced `( ... )` body starting at `chars[open]`, returning the
/// body and the position just past the closing parenthesis.
fn lex_group(pattern: &str, chars: &[(usize, char)], open: usize) -> PatternResult<(String, usize)> {
    let open_index = chars[open].0;
    let mut depth = 1usize;
    let mut body = String::new();
    let mut j = open + 1;

    if let Some(&(index, '?')) = chars.get(j) {
        return Err(PatternError::GroupStartsWithQuestion {
            pattern: pattern.to_string(),
            index,
        });
    }

    while let Some(&(index, c)) = chars.get(j) {
        if c == '\\' {
            body.push(c);
            if let Some(&(_, escaped)) = chars.get(j + 1) {
                body.push(escaped);
            }
            j += 2;
            continue;
        }

        if c == ')' {
            depth -= 1;
            if depth == 0 {
                j += 1;
                break;
            }
        } else if c == '(' {
            depth += 1;
            if !matches!(chars.get(j + 1), Some(&(_, '?'))) {
                return Err(PatternError::NestedCapturingGroup {
                    pattern: pattern.to_string(),
                    index,
                });
            }
        }

        body.push(c);
        j += 1;
    }

    if depth != 0 {
        return Err(PatternError::UnbalancedGroup {
            pattern: pattern.to_string(),
            index: open_index,
        });
    }

    if body.is_empty() {
        return Err(PatternError::EmptyGroup {
            pattern: pattern.to_string(),
            index: open_index,
        });
    }

    Ok((body, j))
}
