use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Map verbosity count to tracing level
const fn get_verbosity_level(verbosity: u8, debug: bool) -> Option<tracing::Level> {
    match verbosity {
        0..=2 if debug => Some(tracing::Level::DEBUG),
        0 => None,
        1 => Some(tracing::Level::WARN),
        2 => Some(tracing::Level::INFO),
        3 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    }
}

/// Main entry point for the CLI - builds and returns the Action
///
/// # Errors
///
/// Returns an error if argument parsing, telemetry initialization, or action dispatch fails
pub fn start() -> Result<Action> {
    // A missing .env file is fine, variables may come from the environment.
    let _ = dotenvy::dotenv();

    let matches = commands::new().get_matches();

    let verbosity_level = get_verbosity_level(
        matches
            .get_one::<u8>(commands::logging::ARG_VERBOSITY)
            .copied()
            .unwrap_or(0),
        matches.get_flag(commands::logging::ARG_DEBUG),
    );

    telemetry::init(
        verbosity_level,
        matches.get_flag(commands::logging::ARG_LOG_JSON),
    )?;

    dispatch::handler(&matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn verbosity_levels() {
        assert_eq!(get_verbosity_level(0, false), None);
        assert_eq!(get_verbosity_level(1, false), Some(Level::WARN));
        assert_eq!(get_verbosity_level(2, false), Some(Level::INFO));
        assert_eq!(get_verbosity_level(3, false), Some(Level::DEBUG));
        assert_eq!(get_verbosity_level(9, false), Some(Level::TRACE));
    }

    #[test]
    fn debug_flag_raises_but_never_lowers() {
        assert_eq!(get_verbosity_level(0, true), Some(Level::DEBUG));
        assert_eq!(get_verbosity_level(2, true), Some(Level::DEBUG));
        assert_eq!(get_verbosity_level(4, true), Some(Level::TRACE));
    }
}
