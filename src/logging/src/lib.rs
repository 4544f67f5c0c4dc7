use log::debug;

/// Install the process-wide logger. The filter defaults to `info` and can be
/// overridden with `RUST_LOG`.
pub fn init_log() {
    init_log_with_default("info");
}

/// Same as [`init_log`] with an explicit fallback filter. Calling it more than
/// once is harmless, the first logger stays installed.
pub fn init_log_with_default(filter: &str) {
    use chrono::Utc;
    use std::io::Write;

    let env = env_logger::Env::default().default_filter_or(filter);
    let res = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            let level_style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S%.6f"),
                level_style.value(record.level()),
                record.file().unwrap_or("<unnamed>"),
                record.line().unwrap_or(0),
                &record.args()
            )
        })
        .try_init();

    if res.is_ok() {
        debug!("env_logger initialized, default filter: {}", filter);
    }
}
