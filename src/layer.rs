//! Bridge from `tracing` to a logtier [`Logger`].
use {
    crate::{Logger, Severity},
    std::fmt::Write as _,
    tracing::{
        field::{Field, Visit},
        Event, Level, Subscriber,
    },
    tracing_subscriber::{layer::Context, Layer},
};

/// A tracing layer that writes every event into a [`Logger`].
///
/// `TRACE` and `DEBUG` events map to [`Severity::Debug`]; the other levels
/// map one to one. The event's source file and line become the record
/// header's location.
///
/// # Example
/// ```no_run
/// use logtier::{LogTierLayer, LoggerBuilder};
/// use tracing_subscriber::prelude::*;
///
/// let logger = LoggerBuilder::new("./logs", "server").build();
/// tracing_subscriber::registry().with(LogTierLayer::new(logger)).init();
/// tracing::info!(port = 8080, "listening");
/// ```
pub struct LogTierLayer {
    logger: Logger,
}

impl LogTierLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

/// Map a tracing level onto a severity.
pub fn severity_for(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warning,
        Level::INFO => Severity::Info,
        _ => Severity::Debug,
    }
}

impl<S> Layer<S> for LogTierLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let severity = severity_for(metadata.level());
        if !self.logger.enabled(severity) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let (file, line) = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => (file, line),
            _ => ("???", 1),
        };
        self.logger
            .log(severity, file, line, format_args!("{}", visitor.finish()));
    }
}

/// Collects the `message` field followed by the other fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(mut self) -> String {
        if !self.fields.is_empty() {
            if !self.message.is_empty() {
                self.message.push(' ');
            }
            self.message.push_str(&self.fields);
        }
        self.message
    }

    fn separator(&mut self) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.separator();
            let _ = write!(self.fields, "{}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.separator();
            let _ = write!(self.fields, "{}={:?}", field.name(), value);
        }
    }
}
