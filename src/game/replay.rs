// Input scripts for headless replays
//
// One numpad token per line (`5`, `6`, `3A`, `2BC`). `#` starts a comment,
// blank lines are skipped and `N*token` repeats a token N times.

use crate::engine::input::{GameInput, InputParseError};

/// Errors raised while reading an input script
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Line {line}: {source}")]
    Token {
        line: usize,
        #[source]
        source: InputParseError,
    },

    #[error("Line {line}: invalid repeat count '{count}'")]
    Repeat { line: usize, count: String },
}

/// Expand a script into one input per tick
pub fn parse_script(text: &str) -> Result<Vec<GameInput>, ScriptError> {
    let mut inputs = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let (count, token) = match content.split_once('*') {
            Some((count, token)) => {
                let count = count.trim();
                let parsed = count.parse::<usize>().map_err(|_| ScriptError::Repeat {
                    line,
                    count: count.to_string(),
                })?;
                (parsed, token)
            }
            None => (1, content),
        };

        let input = token
            .parse::<GameInput>()
            .map_err(|source| ScriptError::Token { line, source })?;
        inputs.extend(std::iter::repeat(input).take(count));
    }

    Ok(inputs)
}
