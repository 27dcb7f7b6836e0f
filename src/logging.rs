pub const LOG_FILE_BASENAME: &str = "study-planner";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 5;
pub const LOG_ENV_VAR: &str = "STUDY_PLANNER_LOG";

/// Log filter: `STUDY_PLANNER_LOG`, then `RUST_LOG`, then the build default.
pub fn log_spec() -> String {
    let default_spec = if cfg!(debug_assertions) {
        "warn,study_planner_lib=debug"
    } else {
        "warn,study_planner_lib=info"
    };
    [LOG_ENV_VAR, "RUST_LOG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_spec.to_string())
}

/// File logging into `app_data_dir`, next to the task slot and settings.json.
#[cfg(all(feature = "app", not(test)))]
pub fn init_logging(
    app_data_dir: &std::path::Path,
) -> Result<(), flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    std::fs::create_dir_all(app_data_dir)?;

    Logger::try_with_str(log_spec())?
        .log_to_file(
            FileSpec::default()
                .directory(app_data_dir)
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        // stdout belongs to the rendered views.
        .duplicate_to_stderr(Duplicate::Warn)
        .start()?;

    install_panic_hook();

    log::info!(
        "logger initialized dir={} rotate_size_bytes={} keep_files={}",
        app_data_dir.display(),
        LOG_ROTATE_SIZE_BYTES,
        LOG_ROTATE_KEEP_FILES
    );
    Ok(())
}

#[cfg(all(feature = "app", not(test)))]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");
        let location = info
            .location()
            .map(|loc| format!("{loc}"))
            .unwrap_or_else(|| "<unknown>".to_string());
        log::error!("panic: payload={payload} location={location}");
        default_hook(info);
    }));
}
