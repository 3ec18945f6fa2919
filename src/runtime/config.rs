use crate::runtime::error::{self, ScriptError};
use std::env::var;

/// Environment variable that caps the image size, in cells.
pub const MAX_CELLS_VAR: &str = "ITSY_MAX_CELLS";

/// Environment variable that caps how many instructions one execution may run.
pub const STEP_LIMIT_VAR: &str = "ITSY_STEP_LIMIT";

/// Settings for a compilation session and the executor that runs it's words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Hard limit on the image size.  `None` lets the image grow without bound.
    pub max_cells: Option<usize>,

    /// How many instructions one call to the executor may run before giving up.  Keeps
    /// `BEGIN ... AGAIN` loops from hanging the caller.
    pub step_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_cells: None,
            step_limit: 100_000,
        }
    }
}

impl Config {
    /// Start from the defaults and apply any overrides found in the environment.
    pub fn from_env() -> error::Result<Config> {
        let mut config = Config::default();

        if let Ok(value) = var(MAX_CELLS_VAR) {
            config.max_cells = Some(parse_count(MAX_CELLS_VAR, &value)?);
        }

        if let Ok(value) = var(STEP_LIMIT_VAR) {
            config.step_limit = parse_count(STEP_LIMIT_VAR, &value)?;
        }

        Ok(config)
    }
}

fn parse_count(key: &str, value: &str) -> error::Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ScriptError::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_must_be_whole_numbers() {
        assert_eq!(parse_count(MAX_CELLS_VAR, " 512 "), Ok(512));
        assert_eq!(
            parse_count(STEP_LIMIT_VAR, "lots"),
            Err(ScriptError::InvalidConfig {
                key: STEP_LIMIT_VAR.to_string(),
                value: "lots".to_string(),
            })
        );
    }
}
