mod env;
mod logging;

pub use env::{load_dotenv, optional_env_var, EnvVars};
pub use logging::setup_tracing;

pub fn get_current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
