use super::lexer::{LexKind, LexToken, lex};
use super::{PatternError, PatternResult};
use crate::types::ParamKey;

/// Characters that attach to a directly following parameter as its prefix.
const PREFIXES: &str = "./";
pub const DEFAULT_PARAM_PATTERN: &str = "[^/#?]+?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifier {
    #[default]
    One,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Modifier {
    fn from_char(value: &str) -> Self {
        match value {
            "?" => Modifier::Optional,
            "*" => Modifier::ZeroOrMore,
            "+" => Modifier::OneOrMore,
            _ => Modifier::One,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::One => "",
            Modifier::Optional => "?",
            Modifier::ZeroOrMore => "*",
            Modifier::OneOrMore => "+",
        }
    }

    pub fn is_repeat(self) -> bool {
        matches!(self, Modifier::ZeroOrMore | Modifier::OneOrMore)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyToken {
    /// `None` for a plain `{...}` group that captures nothing.
    pub key: Option<ParamKey>,
    pub prefix: String,
    pub suffix: String,
    pub pattern: String,
    pub modifier: Modifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    Literal(String),
    Key(KeyToken),
}

pub fn parse_pattern(pattern: &str) -> PatternResult<Vec<PatternToken>> {
    let tokens = lex(pattern)?;
    PatternParser::new(pattern, &tokens).parse()
}

struct PatternParser<'a> {
    pattern: &'a str,
    tokens: &'a [LexToken],
    index: usize,
    next_unnamed: usize,
}

impl<'a> PatternParser<'a> {
    fn new(pattern: &'a str, tokens: &'a [LexToken]) -> Self {
        Self {
            pattern,
            tokens,
            index: 0,
            next_unnamed: 0,
        }
    }

    fn parse(mut self) -> PatternResult<Vec<PatternToken>> {
        let mut result = Vec::new();
        let mut path = String::new();

        while self.index < self.tokens.len() {
            let char_token = self.try_consume(LexKind::Char);
            let name = self.try_consume(LexKind::Name);
            let group = self.try_consume(LexKind::Pattern);

            if name.is_some() || group.is_some() {
                let mut prefix = char_token.unwrap_or_default();
                if !PREFIXES.contains(prefix.as_str()) {
                    path.push_str(&prefix);
                    prefix.clear();
                }

                flush_literal(&mut path, &mut result);

                let key = match name {
                    Some(name) => ParamKey::Named(name),
                    None => self.unnamed_key(),
                };
                let modifier = self.consume_modifier();

                result.push(PatternToken::Key(KeyToken {
                    key: Some(key),
                    prefix,
                    suffix: String::new(),
                    pattern: group.unwrap_or_else(|| DEFAULT_PARAM_PATTERN.to_string()),
                    modifier,
                }));
                continue;
            }

            if let Some(value) = char_token.or_else(|| self.try_consume(LexKind::EscapedChar)) {
                path.push_str(&value);
                continue;
            }

            flush_literal(&mut path, &mut result);

            if self.try_consume(LexKind::Open).is_some() {
                let prefix = self.consume_text();
                let name = self.try_consume(LexKind::Name);
                let group = self.try_consume(LexKind::Pattern);
                let suffix = self.consume_text();

                self.must_consume(LexKind::Close)?;

                let (key, pattern) = match (name, group) {
                    (Some(name), Some(group)) => (Some(ParamKey::Named(name)), group),
                    (Some(name), None) => {
                        (Some(ParamKey::Named(name)), DEFAULT_PARAM_PATTERN.to_string())
                    }
                    (None, Some(group)) => (Some(self.unnamed_key()), group),
                    (None, None) => (None, String::new()),
                };
                let modifier = self.consume_modifier();

                result.push(PatternToken::Key(KeyToken {
                    key,
                    prefix,
                    suffix,
                    pattern,
                    modifier,
                }));
                continue;
            }

            self.must_consume(LexKind::End)?;
        }

        Ok(result)
    }

    fn unnamed_key(&mut self) -> ParamKey {
        let key = ParamKey::Index(self.next_unnamed);
        self.next_unnamed += 1;
        key
    }

    fn consume_modifier(&mut self) -> Modifier {
        self.try_consume(LexKind::Modifier)
            .map(|value| Modifier::from_char(&value))
            .unwrap_or_default()
    }

    fn try_consume(&mut self, kind: LexKind) -> Option<String> {
        let token = self.tokens.get(self.index)?;
        if token.kind != kind {
            return None;
        }
        self.index += 1;
        Some(token.value.clone())
    }

    fn must_consume(&mut self, kind: LexKind) -> PatternResult<String> {
        if let Some(value) = self.try_consume(kind) {
            return Ok(value);
        }

        let (found, index) = self
            .tokens
            .get(self.index)
            .map(|token| (token.kind, token.index))
            .unwrap_or((LexKind::End, self.pattern.len()));

        Err(PatternError::UnexpectedToken {
            pattern: self.pattern.to_string(),
            index,
            found,
            expected: kind,
        })
    }

    fn consume_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(value) = self
            .try_consume(LexKind::Char)
            .or_else(|| self.try_consume(LexKind::EscapedChar))
        {
            text.push_str(&value);
        }
        text
    }
}

fn flush_literal(path: &mut String, result: &mut Vec<PatternToken>) {
    if !path.is_empty() {
        result.push(PatternToken::Literal(std::mem::take(path)));
    }
}
