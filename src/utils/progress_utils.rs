use indicatif::ProgressStyle;
use tracing::{info_span, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

pub fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("[{elapsed_precise} / {eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Span rendered as a progress bar while it is entered.
///
/// Without the indicatif layer installed the span is a plain tracing span.
pub fn progress_span(len: u64, message: &str) -> Span {
    let span = info_span!("progress", task = message);
    span.pb_set_style(&progress_style());
    span.pb_set_length(len);
    span.pb_set_message(message);

    span
}
