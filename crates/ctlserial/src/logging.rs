use clap::ValueEnum;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> tracing::level_filters::LevelFilter {
        match self {
            LogLevel::Error => tracing::level_filters::LevelFilter::ERROR,
            LogLevel::Warn => tracing::level_filters::LevelFilter::WARN,
            LogLevel::Info => tracing::level_filters::LevelFilter::INFO,
            LogLevel::Debug => tracing::level_filters::LevelFilter::DEBUG,
            LogLevel::Trace => tracing::level_filters::LevelFilter::TRACE,
        }
    }

    /// Level needed for a link session. Raw traffic is logged at debug.
    pub fn for_link(self, wire: bool) -> Self {
        match (self, wire) {
            (level, false) | (level @ LogLevel::Trace, true) => level,
            (_, true) => LogLevel::Debug,
        }
    }
}

/// Installs the stderr subscriber for a CLI run.
///
/// Device output is logged under `ctlserial::device` and raw traffic under
/// `ctlserial::wire`, interleaved with host diagnostics. Targets are printed so
/// each line can be attributed to the device, the link or the host.
pub fn init_logging(format: LogFormat, level: LogLevel, wire: bool) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.for_link(wire).as_filter())
        .with_ansi(false)
        .with_target(true);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
