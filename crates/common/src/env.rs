use std::env;

/// A set of environment variables a component needs before it can run.
///
/// Loading is fallible: a missing required variable is reported to the caller
/// instead of panicking, so binaries can exit with a readable message.
pub trait EnvVars: Sized {
    type Error;

    fn load() -> Result<Self, Self::Error>;
    fn get_env_var(&self, key: &str) -> Option<String>;
}

/// Reads `.env` from the working directory (or a parent) if one exists.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => tracing::debug!("[Env] loaded {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("[Env] no .env file found"),
        Err(e) => tracing::warn!("[Env] failed to parse .env: {}", e),
    }
}

/// Returns the variable's value, treating unset and blank values the same.
pub fn optional_env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
