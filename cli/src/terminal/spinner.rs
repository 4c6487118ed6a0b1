use colored::*;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// A span that renders as a progress bar over `total` index lookups.
pub fn lookup_progress(total: usize) -> anyhow::Result<Span> {
    let span = info_span!("resolve", indicatif.pb_show = true);

    let style = ProgressStyle::with_template("{spinner:.blue} {msg} {pos}/{len} {wide_bar:.green/black}")?
        .tick_strings(TICKS)
        .progress_chars("━╸ ");

    span.pb_set_style(&style);
    span.pb_set_length(total as u64);
    span.pb_set_message(&format!("{}", "Querying package index".italic()));

    Ok(span)
}

/// Callback for the resolver that advances the bar of `span`.
pub fn advance(span: Span) -> Box<dyn Fn(usize) + Send + Sync> {
    Box::new(move |done| span.pb_set_position(done as u64))
}
