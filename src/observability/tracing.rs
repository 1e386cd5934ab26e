//! Explicit call-boundary instrumentation.
//!
//! Every lookup and every downstream call runs inside a span opened here,
//! so business code never carries observation attributes itself.

use tracing::field::Empty;
use tracing::Span;

/// Open the span for one call. `outcome` is filled in by [`record_outcome`].
pub fn call_span(name: &'static str, contextual_name: &'static str, key: &str) -> Span {
    tracing::info_span!(
        "call",
        call.name = name,
        call.contextual_name = contextual_name,
        call.key = %key,
        call.outcome = Empty,
    )
}

/// Attach the outcome attribute.
pub fn record_outcome(span: &Span, outcome: &str) {
    span.record("call.outcome", outcome);
}
