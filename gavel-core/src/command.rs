/// Tokenization of slash-command lines into a command name and arguments.
use regex::Regex;
use std::sync::OnceLock;

/// A parsed slash command from the first line of a comment.
///
/// The command name is always non-empty; an input that produces no tokens at
/// all yields `None` from [`tokenize`] rather than an empty `Command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// The arguments joined with single spaces, as exposed to templates and
    /// process outputs.
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    // Three alternatives, tried in order at each position:
    //   key="..."  (quoted value may contain escaped quotes)
    //   "..."      (standalone quoted token, quotes kept)
    //   any run of non-whitespace
    TOKEN_RE.get_or_init(|| {
        Regex::new(r#"\S+="[^"\\]*(?:\\.[^"\\]*)*"|"[^"\\]*(?:\\.[^"\\]*)*"|\S+"#)
            .expect("token regex is valid")
    })
}

/// Split a command line (trigger character already stripped) into a command
/// name and its arguments.
///
/// Quoted segments are consumed as single tokens and kept verbatim, quotes
/// included. No case normalization or trimming is applied beyond what the
/// token pattern itself excludes. Returns `None` for input with no tokens;
/// callers treat that as "no command".
pub fn tokenize(line: &str) -> Option<Command> {
    let mut tokens = token_re().find_iter(line).map(|m| m.as_str());

    let name = tokens.next()?.to_string();
    let args = tokens.map(|t| t.to_string()).collect();

    Some(Command { name, args })
}
