use fern::{
    FormatCallback,
    colors::{Color, ColoredLevelConfig},
};
use log::{LevelFilter, Record};
use std::fmt::Arguments;
use std::path::PathBuf;

/// Daily log files live here.
fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("fidride"))
}

const fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Colored stderr at the requested verbosity,
/// plus a plain file log that always keeps our own `info` and up.
pub fn setup_logger(verbose: u8) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Blue);

    let make_formatter = |use_colors: bool| {
        move |out: FormatCallback, message: &Arguments, record: &Record| {
            let level = if use_colors {
                format!("{:5}", colors.color(record.level()))
            } else {
                format!("{:5}", record.level())
            };
            out.finish(format_args!(
                "{} {level} [{}:{}] {message}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.target(),
                record.line().unwrap_or_default(),
            ));
        }
    };

    let level = verbosity_level(verbose);
    let stderr_dispatcher = fern::Dispatch::new()
        .format(make_formatter(true))
        .level(level)
        .chain(std::io::stderr());

    let mut dispatcher = fern::Dispatch::new().chain(stderr_dispatcher);

    if let Some(dir) = log_dir().filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        let file = dir.join(format!(
            "fidride_{}.log",
            chrono::Local::now().format("%Y%m%d")
        ));
        let file_dispatcher = fern::Dispatch::new()
            .format(make_formatter(false))
            .level(LevelFilter::Warn)
            .level_for("fidride", level.max(LevelFilter::Info))
            .level_for("fidride_core", level.max(LevelFilter::Info))
            .chain(fern::log_file(file)?);
        dispatcher = dispatcher.chain(file_dispatcher);
    }

    dispatcher.apply()?;
    Ok(())
}
