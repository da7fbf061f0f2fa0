// Log formatting for the relay binary

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Emoji level prefix, local wall-clock time, then the event fields.
/// Events from outside this crate also carry their target.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let timestamp = Local::now().format("%H:%M:%S%.3f");
        let (emoji, level) = level_prefix(*metadata.level());

        write!(writer, "{} {} [{}]: ", emoji, level, timestamp)?;
        if !metadata.target().starts_with(CRATE_TARGET) {
            write!(writer, "{}: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

const CRATE_TARGET: &str = "allure_runtime";

fn level_prefix(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::TRACE => ("🔬", "TRACE"),
        Level::DEBUG => ("🐛", "DEBUG"),
        Level::INFO => ("ℹ️ ", "INFO"),
        Level::WARN => ("⚠️ ", "WARN"),
        Level::ERROR => ("❌", "ERROR"),
    }
}

/// `RUST_LOG` wins; otherwise crate debug output when verbose, warnings only when not
pub fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "allure_runtime=debug,warn"
    } else {
        "allure_runtime=warn,error"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .event_format(CustomFormatter)
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .try_init();
}
