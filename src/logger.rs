use log::{LevelFilter, Record};
use std::fmt::Arguments;
use std::io;

/// Installs the process logger on stderr. Stdout is left to command output.
/// `verbose` opens this crate up to debug output.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    dispatch(verbose, io::stderr()).apply()?;
    Ok(())
}

/// One console chain for every level, writing to `sink`.
pub fn dispatch(verbose: bool, sink: impl Into<fern::Output>) -> fern::Dispatch {
    let crate_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(console_format)
        .level(LevelFilter::Warn)
        .level_for("pokemon_learnset_core", crate_level)
        .chain(sink)
}

fn console_format(cb: fern::FormatCallback, message: &Arguments, record: &Record) {
    let line = record.line().map(|v| format!(":{v}"));

    cb.finish(format_args!(
        "[{:<5} {}{}] {}",
        record.level(),
        record.target(),
        line.unwrap_or_default(),
        message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use std::sync::mpsc;

    fn emit(logger: &dyn log::Log, level: Level, target: &str, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{message}"))
                .level(level)
                .target(target)
                .line(Some(41))
                .build(),
        );
    }

    #[test]
    fn every_level_goes_to_the_one_sink() {
        let (tx, rx) = mpsc::channel::<String>();
        let (_, logger) = dispatch(false, tx).into_log();

        emit(logger.as_ref(), Level::Info, "pokemon_learnset_core::data", "loaded datasets");
        emit(logger.as_ref(), Level::Warn, "pokemon_learnset_core::data", "moves dataset unavailable");
        emit(logger.as_ref(), Level::Debug, "pokemon_learnset_core::catalog", "assuming damaging");
        emit(logger.as_ref(), Level::Info, "other_crate", "chatter");

        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].starts_with("[INFO  pokemon_learnset_core::data:41] loaded datasets"));
        assert!(lines[1].starts_with("[WARN  pokemon_learnset_core::data:41]"));
    }

    #[test]
    fn verbose_admits_crate_debug() {
        let (tx, rx) = mpsc::channel::<String>();
        let (_, logger) = dispatch(true, tx).into_log();
        emit(logger.as_ref(), Level::Debug, "pokemon_learnset_core::catalog", "assuming damaging");
        emit(logger.as_ref(), Level::Debug, "other_crate", "chatter");
        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("assuming damaging"));
    }
}
