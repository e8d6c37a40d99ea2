use core::fmt;
use std::fs::OpenOptions;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt as tracingfmt};

#[macro_export]
macro_rules! unimplemented_log {
    ( $($arg:tt)* ) => {{
        tracing::warn!(
            "unimplemented: {}",
            format_args!($($arg)*),
        );
    }};
}

/// if `cond` is false, logs a warning with your message.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

struct AlignedFormatter;

/// "crates/ghost-entities/src/dmr/components/bptc19696.rs" becomes "[entities/dmr] bptc19696.rs".
/// Paths outside a `ghost-*` crate are kept as they are.
fn short_location(file_path: &str) -> String {
    let Some((krate, module_file)) = file_path.split_once("/src/") else {
        return file_path.to_string();
    };
    let Some((_, krate)) = krate.rsplit_once("ghost-") else {
        return file_path.to_string();
    };
    match module_file.split_once('/') {
        Some((module, rest)) => {
            let filename = rest.rsplit('/').next().unwrap_or(rest);
            format!("[{}/{}] {}", krate, module, filename)
        }
        None => format!("[{}] {}", krate, module_file),
    }
}

/// Visitor to extract the time slot field value
struct SlotVisitor {
    slot: Option<String>,
}

impl tracing::field::Visit for SlotVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "slot" {
            self.slot = Some(format!("{:?}", value));
        }
    }
}

impl<S, N> FormatEvent<S, N> for AlignedFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: format::Writer<'_>, event: &tracing::Event<'_>) -> fmt::Result {
        let metadata = event.metadata();

        // Extract slot field if present
        let mut visitor = SlotVisitor { slot: None };
        event.record(&mut visitor);
        let has_slot = visitor.slot.is_some();
        let slot_str = visitor.slot.unwrap_or_else(|| "   ".to_string());

        let (color_level, color_reset) = match *metadata.level() {
            tracing::Level::ERROR => ("\x1b[31m", "\x1b[0m"),
            tracing::Level::WARN => ("\x1b[33m", "\x1b[0m"),
            tracing::Level::INFO => ("\x1b[32m", "\x1b[0m"),
            tracing::Level::DEBUG => ("\x1b[34m", "\x1b[0m"),
            tracing::Level::TRACE => ("\x1b[35m", "\x1b[0m"),
        };

        let formatted_path = format!("{} {}", slot_str, short_location(metadata.file().unwrap_or("unknown")));

        // Format: "LEVEL slot [module] file:line: message"
        let location = format!(
            "{}{:<5}{} {}:{}:",
            color_level,
            metadata.level(),
            color_reset,
            formatted_path,
            metadata.line().unwrap_or(0)
        );

        let mut message_buf = String::new();
        let message_writer = format::Writer::new(&mut message_buf);
        ctx.field_format().format_fields(message_writer, event)?;

        // Slot is already part of the prefix
        if has_slot {
            if let Some(slot_idx) = message_buf.find("slot=") {
                if let Some(space_idx) = message_buf[slot_idx..].find(' ') {
                    message_buf.replace_range(slot_idx..slot_idx + space_idx + 1, "");
                } else {
                    message_buf.truncate(slot_idx);
                }
            }
        }

        // Arrows mark frames entering or leaving a handler
        let mut padding = 64;
        if message_buf.starts_with("->") || message_buf.starts_with("<-") {
            padding -= 3;
        }

        write!(writer, "{:<width$} {}", location, message_buf, width = padding)?;
        writeln!(writer)
    }
}

static INIT_LOG: Once = Once::new();

/// Adds filter directives, skipping any that fail to parse
fn with_directives(mut filter: EnvFilter, directives: &[&str]) -> EnvFilter {
    for d in directives {
        if let Ok(directive) = d.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    let stdout_filter = EnvFilter::new("trace");
    // Without a log file, opening can't fail
    let _ = setup_logging(stdout_filter, None);
}

/// Sets up default logging to stdout and optionally, a verbose log file
/// Returns a guard, that needs to be kept alive for logging to file to work
pub fn setup_logging_default(verbose_logfile: Option<String>) -> std::io::Result<Option<WorkerGuard>> {
    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

pub fn get_default_stdout_filter() -> EnvFilter {
    with_directives(
        EnvFilter::new("info"),
        &[
            // Bit-level codec dumps are only useful in the log file
            "ghost_entities::dmr::components=warn",
            // Decoders and admission decisions
            "ghost_entities::dmr=debug",
            "security=warn",
            // Thin protocol handlers
            "ghost_entities::dstar=info",
            "ghost_entities::m17=info",
            "ghost_entities::ax25=info",
            "ghost_entities::nxdn=info",
            "ghost_entities::pocsag=info",
            "ghost_entities::ysf=info",
        ],
    )
}

fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("debug")
}

/// Sets up logging to stdout and optionally, a verbose log file
/// If an output file is requested, returns Some<WorkerGuard>. Keep this value alive
/// or logging to file may cease working. If no output file is provided, returns None.
fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> std::io::Result<Option<WorkerGuard>> {
    if let Some((outfile, outfile_filter)) = outfile {
        let file = OpenOptions::new().create(true).append(true).open(outfile)?;
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        INIT_LOG.call_once(|| {
            let file_layer = tracingfmt::layer()
                .event_format(AlignedFormatter)
                .with_writer(file_writer)
                .with_ansi(false);
            let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter);

            tracing_subscriber::registry()
                .with(file_layer.with_filter(outfile_filter))
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });

        Ok(Some(guard))
    } else {
        INIT_LOG.call_once(|| {
            let stdout_layer = tracingfmt::layer().event_format(AlignedFormatter);
            tracing_subscriber::registry()
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_location() {
        assert_eq!(
            short_location("crates/ghost-entities/src/dmr/components/bptc19696.rs"),
            "[entities/dmr] bptc19696.rs"
        );
        assert_eq!(short_location("crates/ghost-entities/src/dmr/control.rs"), "[entities/dmr] control.rs");
        assert_eq!(short_location("crates/ghost-core/src/bits.rs"), "[core] bits.rs");
        assert_eq!(short_location("bins/ghost-host/src/main.rs"), "[host] main.rs");
        assert_eq!(
            short_location("/home/user/.cargo/registry/src/index/toml-0.8.0/src/de.rs"),
            "/home/user/.cargo/registry/src/index/toml-0.8.0/src/de.rs"
        );
    }
}
