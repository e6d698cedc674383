use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Indexed by `LevelFilter as usize`.
const LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Writes `[LEVEL] target: message` lines to standard error.
pub struct StderrLogger {
    max_level: AtomicUsize,
}

impl StderrLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self {
            max_level: AtomicUsize::new(max_level as usize),
        }
    }

    #[must_use]
    pub fn max_level(&self) -> LevelFilter {
        LEVELS
            .get(self.max_level.load(Ordering::Relaxed))
            .copied()
            .unwrap_or(LevelFilter::Trace)
    }

    pub fn set_max_level(&self, level: LevelFilter) {
        self.max_level.store(level as usize, Ordering::Relaxed);
    }

    /// Install as the process logger, or retune the one installed by an
    /// earlier call.
    ///
    /// The level always takes effect, both on the process-wide logger and on
    /// the `log` crate's global filter.
    ///
    /// # Errors
    /// If a logger (this one or another) is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

        let max_level = self.max_level();
        let logger = LOGGER.get_or_init(|| self);
        logger.set_max_level(max_level);
        log::set_max_level(max_level);
        log::set_logger(logger)
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Format straight into the locked handle; no intermediate String.
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn filters_by_level() {
        let logger = StderrLogger::new(LevelFilter::Warn);
        let meta = |level| Metadata::builder().level(level).target("fc_rt").build();
        assert!(logger.enabled(&meta(Level::Error)));
        assert!(logger.enabled(&meta(Level::Warn)));
        assert!(!logger.enabled(&meta(Level::Info)));
        assert!(!logger.enabled(&meta(Level::Trace)));
    }

    #[test]
    fn level_can_be_changed_in_place() {
        let logger = StderrLogger::new(LevelFilter::Warn);
        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(!logger.enabled(&debug));
        logger.set_max_level(LevelFilter::Debug);
        assert_eq!(logger.max_level(), LevelFilter::Debug);
        assert!(logger.enabled(&debug));
    }

    #[test]
    fn off_disables_everything() {
        let logger = StderrLogger::new(LevelFilter::Off);
        let meta = Metadata::builder().level(Level::Error).build();
        assert!(!logger.enabled(&meta));
    }
}
