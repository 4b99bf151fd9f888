use tracing::field::{Field, Visit};
use tracing::span::Record;
use tracing::{Event, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::style::ProgressStyle;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding an `EnvFilter` directive, e.g. `RELSYNC_LOG=debug`.
pub const LOG_ENV_VAR: &str = "RELSYNC_LOG";

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

pub fn progress_bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-")
    .tick_strings(TICK_STRINGS)
}

pub fn spinner_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(&format!(
        "{{spinner:.green}} [{{elapsed_precise}}] {}",
        template
    ))
    .unwrap_or_else(|_| ProgressStyle::default_spinner())
    .tick_strings(TICK_STRINGS)
}

/// Installs the global subscriber: message-only console output plus progress bars for
/// instrumented spans. Verbosity comes from [LOG_ENV_VAR] and defaults to `info`.
pub fn initialize_logging() {
    let progress_bar_layer = IndicatifLayer::new();
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(progress_bar_layer.get_stdout_writer())
        .event_format(MessageOnlyFormat)
        .fmt_fields(MessageOnlyFields);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(progress_bar_layer)
        .init();
}

/// Field formatter that writes the `message` field verbatim and drops everything else.
pub struct MessageOnlyFields;

impl<'writer> FormatFields<'writer> for MessageOnlyFields {
    fn format_fields<R: RecordFields>(
        &self,
        mut writer: Writer<'writer>,
        fields: R,
    ) -> std::fmt::Result {
        struct MessageVisitor<'a> {
            writer: &'a mut dyn std::fmt::Write,
        }

        impl Visit for MessageVisitor<'_> {
            fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    let _ = write!(self.writer, "{value:?}");
                }
            }
        }

        fields.record(&mut MessageVisitor {
            writer: &mut writer,
        });
        Ok(())
    }

    fn add_fields(
        &self,
        _current: &'writer mut FormattedFields<Self>,
        _fields: &Record<'_>,
    ) -> std::fmt::Result {
        Ok(())
    }
}

/// Event formatter without level, target, timestamp or span context.
#[derive(Clone, Debug, Default)]
pub struct MessageOnlyFormat;

impl<S, N> FormatEvent<S, N> for MessageOnlyFormat
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
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
