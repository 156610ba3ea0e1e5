//! Trace/span engine.
//!
//! Span parentage is carried by explicit `Context` values handed from call
//! frame to call frame; nothing consults ambient or thread-local state. A
//! span ends when [`ActiveSpan::end`] runs or when the last handle to it
//! drops, so every exit path (error returns included) closes the span and
//! hands it to the exporter exactly once.

pub mod xray;

use opentelemetry::global::{self, BoxedTracer};
use opentelemetry::trace::{SpanBuilder, SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};

/// Instrumentation scope under which all spans are created.
const TRACER_NAME: &str = "rust-sample-app-tracer";

fn common_span_attributes() -> Vec<KeyValue> {
    vec![
        KeyValue::new("signal", "trace"),
        KeyValue::new("language", "rust"),
    ]
}

/// Creates spans with explicit parent/child linkage.
pub struct TraceEngine {
    tracer: BoxedTracer,
}

impl TraceEngine {
    pub fn new() -> Self {
        Self {
            tracer: global::tracer(TRACER_NAME),
        }
    }

    /// Open a root span for one inbound request.
    pub fn start_root(&self, name: &'static str) -> ActiveSpan {
        self.start(name, &Context::new())
    }

    /// Open a child span under `parent`. Children of the same parent are
    /// sequential: each ends before the next starts.
    pub fn start_child(&self, name: &'static str, parent: &ActiveSpan) -> ActiveSpan {
        self.start(name, &parent.cx)
    }

    fn start(&self, name: &'static str, parent_cx: &Context) -> ActiveSpan {
        let builder = SpanBuilder::from_name(name)
            .with_kind(SpanKind::Internal)
            .with_attributes(common_span_attributes());
        let span = self.tracer.build_with_context(builder, parent_cx);
        ActiveSpan {
            cx: parent_cx.with_span(span),
        }
    }
}

impl Default for TraceEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to an open span.
pub struct ActiveSpan {
    cx: Context,
}

impl ActiveSpan {
    /// Attach a key/value attribute to the span.
    pub fn set_attribute(&self, key: &'static str, value: String) {
        self.cx.span().set_attribute(KeyValue::new(key, value));
    }

    /// Append a timestamped event to the span.
    pub fn add_event(&self, text: impl Into<std::borrow::Cow<'static, str>>) {
        self.cx.span().add_event(text, Vec::new());
    }

    /// The 128-bit identifier of the trace this span belongs to.
    pub fn trace_id(&self) -> u128 {
        u128::from_be_bytes(self.cx.span().span_context().trace_id().to_bytes())
    }

    /// Record a failed operation on the span: the error is attached as an
    /// exception event and the span status becomes an error status.
    pub fn fail(&self, error: &dyn std::error::Error) {
        let span = self.cx.span();
        span.record_error(error);
        span.set_status(Status::error(error.to_string()));
    }

    /// End the span now instead of at drop time.
    pub fn end(&self) {
        self.cx.span().end();
    }
}
