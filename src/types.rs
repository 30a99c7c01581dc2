use smallvec::SmallVec;
use std::fmt;

pub type StaticString = &'static str;

/// Raw output of a successful match, one slot per capture group. Groups that
/// did not participate in the match are `None`.
pub type CaptureValues = SmallVec<[Option<String>; 4]>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Key of a captured parameter: its name, or its position among unnamed groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamKey {
    Named(String),
    Index(usize),
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Named(name) => f.write_str(name),
            ParamKey::Index(index) => write!(f, "{index}"),
        }
    }
}
