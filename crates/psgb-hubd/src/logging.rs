use anyhow::Result;
use psgb_hub_core::LoggingOutput;
use tracing_appender::non_blocking;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Sets up the process-wide `tracing` subscriber and returns a guard that
/// must be held until shutdown when file output is in use — dropping it
/// early truncates the last buffered writes.
pub fn setup_tracing(logging: &psgb_hub_core::LoggingSettings) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = EnvFilter::new("info,hyper=warn,reqwest=warn,h2=warn,tower_http=warn");

    match logging.output {
        LoggingOutput::Stderr => {
            let level = parse_level(logging.console_level.as_deref(), tracing::Level::INFO);
            let writer = std::io::stderr.with_max_level(level);
            tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(writer).init();
            tracing::info!("logging initialized: console only ({level}+)");
            Ok(None)
        }
        LoggingOutput::File => {
            let level = parse_level(logging.file_level.as_deref(), tracing::Level::DEBUG);
            let appender = rolling::daily("logs", "psgb-hubd.log");
            let (writer, guard) = non_blocking(appender);
            let writer = writer.with_max_level(level);
            tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(writer).init();
            tracing::info!("logging initialized: file only, logs/psgb-hubd.log ({level}+)");
            Ok(Some(guard))
        }
        LoggingOutput::Both => {
            let console_level = parse_level(logging.console_level.as_deref(), tracing::Level::INFO);
            let file_level = parse_level(logging.file_level.as_deref(), tracing::Level::DEBUG);
            let appender = rolling::daily("logs", "psgb-hubd.log");
            let (file_writer, guard) = non_blocking(appender);

            let stderr = std::io::stderr.with_max_level(console_level);
            let file_writer = file_writer.with_max_level(file_level);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(stderr.and(file_writer))
                .init();
            tracing::info!("logging initialized: console ({console_level}+) and logs/psgb-hubd.log ({file_level}+)");
            Ok(Some(guard))
        }
    }
}

fn parse_level(raw: Option<&str>, default: tracing::Level) -> tracing::Level {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}
