use super::parser::{KeyToken, Modifier, PatternToken, parse_pattern};
use super::{PatternError, PatternResult};
use crate::types::{CaptureValues, ParamKey};
use regex::{Regex, RegexBuilder};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Characters that may trail a path without affecting a non-strict match.
const DELIMITER_CLASS: &str = "[/#?]";
const MATCH_ALL_SOURCE: &str = ".*";

/// Something a rule can be registered under.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// A path template such as `/users/:id` or `/test/(a|b)`.
    Path(String),
    /// A caller-built regular expression, used as-is.
    Regex(Regex),
    /// Matches every path with no captures.
    Any,
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Pattern::Path(value.to_string())
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Pattern::Path(value)
    }
}

impl From<Regex> for Pattern {
    fn from(value: Regex) -> Self {
        Pattern::Regex(value)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Path(path) => f.write_str(path),
            Pattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
            Pattern::Any => f.write_str("*"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    pub case_sensitive: bool,
    pub strict: bool,
}

/// Ordered keys of a matcher's capture groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSpec {
    keys: SmallVec<[ParamKey; 4]>,
}

impl ParamSpec {
    pub fn new(keys: impl IntoIterator<Item = ParamKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn keys(&self) -> &[ParamKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Any,
    Regex(Arc<Regex>),
}

impl Matcher {
    /// Attempts a match, returning one slot per capture group on success.
    pub fn captures(&self, path: &str) -> Option<CaptureValues> {
        match self {
            Matcher::Any => Some(CaptureValues::new()),
            Matcher::Regex(regex) => {
                let caps = regex.captures(path)?;
                Some(
                    caps.iter()
                        .skip(1)
                        .map(|m| m.map(|m| m.as_str().to_string()))
                        .collect(),
                )
            }
        }
    }

    pub fn is_match(&self, path: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Regex(regex) => regex.is_match(path),
        }
    }

    /// Regex source. Flags are not part of it, so equal sources do not imply
    /// equal matchers; see [`MergeKey`].
    pub fn source(&self) -> &str {
        match self {
            Matcher::Any => MATCH_ALL_SOURCE,
            Matcher::Regex(regex) => regex.as_str(),
        }
    }
}

/// Identity of a compiled pattern for merging registrations. Two patterns
/// with equal keys accept exactly the same paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeKey {
    Any,
    Path { source: String, case_sensitive: bool },
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub matcher: Matcher,
    pub params: Arc<ParamSpec>,
    /// `None` for caller-built regexes, whose flags cannot be inspected.
    pub merge_key: Option<MergeKey>,
}

#[tracing::instrument(level = "trace", skip(pattern), fields(pattern = %pattern))]
pub fn compile(pattern: &Pattern, options: CompileOptions) -> PatternResult<CompiledPattern> {
    match pattern {
        Pattern::Any => Ok(CompiledPattern {
            matcher: Matcher::Any,
            params: Arc::new(ParamSpec::default()),
            merge_key: Some(MergeKey::Any),
        }),
        Pattern::Regex(regex) => Ok(CompiledPattern {
            params: Arc::new(regex_param_spec(regex)),
            matcher: Matcher::Regex(Arc::new(regex.clone())),
            merge_key: None,
        }),
        Pattern::Path(path) => compile_path(path, options),
    }
}

fn compile_path(path: &str, options: CompileOptions) -> PatternResult<CompiledPattern> {
    let tokens = parse_pattern(path)?;
    let (source, keys) = tokens_to_source(&tokens, options.strict);

    let regex = RegexBuilder::new(&source)
        .case_insensitive(!options.case_sensitive)
        .build()
        .map_err(|source_err| PatternError::InvalidRegex {
            pattern: path.to_string(),
            source_regex: source.clone(),
            source: source_err,
        })?;

    tracing::trace!(regex = %source, params = keys.len() as u64, "pattern compiled");

    Ok(CompiledPattern {
        matcher: Matcher::Regex(Arc::new(regex)),
        params: Arc::new(ParamSpec::new(keys)),
        merge_key: Some(MergeKey::Path {
            source,
            case_sensitive: options.case_sensitive,
        }),
    })
}

fn tokens_to_source(tokens: &[PatternToken], strict: bool) -> (String, Vec<ParamKey>) {
    let mut route = String::from("^");
    let mut keys = Vec::new();

    for token in tokens {
        match token {
            PatternToken::Literal(text) => route.push_str(&regex::escape(text)),
            PatternToken::Key(key) => {
                push_key(&mut route, key);
                if let Some(name) = &key.key {
                    keys.push(name.clone());
                }
            }
        }
    }

    if !strict {
        route.push_str(DELIMITER_CLASS);
        route.push('?');
    }
    route.push('$');

    (route, keys)
}

fn push_key(route: &mut String, key: &KeyToken) {
    let prefix = regex::escape(&key.prefix);
    let suffix = regex::escape(&key.suffix);
    let pattern = &key.pattern;
    let modifier = key.modifier.as_str();

    if key.key.is_none() {
        route.push_str(&format!("(?:{prefix}{suffix}){modifier}"));
        return;
    }

    if prefix.is_empty() && suffix.is_empty() {
        if key.modifier.is_repeat() {
            route.push_str(&format!("((?:{pattern}){modifier})"));
        } else {
            route.push_str(&format!("({pattern}){modifier}"));
        }
        return;
    }

    if key.modifier.is_repeat() {
        let optional = if key.modifier == Modifier::ZeroOrMore { "?" } else { "" };
        route.push_str(&format!(
            "(?:{prefix}((?:{pattern})(?:{suffix}{prefix}(?:{pattern}))*){suffix}){optional}"
        ));
    } else {
        route.push_str(&format!("(?:{prefix}({pattern}){suffix}){modifier}"));
    }
}

fn regex_param_spec(regex: &Regex) -> ParamSpec {
    let mut next_unnamed = 0usize;
    ParamSpec::new(regex.capture_names().skip(1).map(|name| match name {
        Some(name) => ParamKey::Named(name.to_string()),
        None => {
            let key = ParamKey::Index(next_unnamed);
            next_unnamed += 1;
            key
        }
    }))
}
