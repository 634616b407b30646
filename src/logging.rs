use env_logger::Env;

/// Environment variable holding the log filter (`env_logger` syntax).
pub const LOG_ENV: &str = "MSH_LOG";

/// Install the global logger.
///
/// Silent unless `MSH_LOG` is set, so the uniform diagnostic stays the only
/// thing a user sees on standard error. Calling it twice is harmless.
pub fn init() {
    let mut builder = env_logger::Builder::from_env(Env::new().filter_or(LOG_ENV, "off"));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}
