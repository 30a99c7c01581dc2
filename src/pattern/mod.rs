mod compiled;
mod error;
mod lexer;
mod parser;

pub use compiled::{CompileOptions, CompiledPattern, Matcher, MergeKey, ParamSpec, Pattern, compile};
pub use error::{PatternError, PatternResult};
pub use lexer::{LexKind, LexToken, lex};
pub use parser::{DEFAULT_PARAM_PATTERN, KeyToken, Modifier, PatternToken, parse_pattern};
