use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use super::records::PayloadStatusRecord;

pub const TOTAL_TIME_KEY: &str = "total_time";

/// Time spent in each stage (last status date minus first) plus the overall span.
///
/// Only min/max dates are used, so the result does not depend on record order.
pub fn compute_durations(records: &[PayloadStatusRecord]) -> BTreeMap<String, String> {
    let mut spans: BTreeMap<String, (DateTime<Utc>, DateTime<Utc>)> = BTreeMap::new();
    let mut overall: Option<(DateTime<Utc>, DateTime<Utc>)> = None;

    for record in records {
        widen(spans.entry(record.stage()).or_insert((record.date, record.date)), record.date);
        match overall.as_mut() {
            Some(span) => widen(span, record.date),
            None => overall = Some((record.date, record.date)),
        }
    }

    let mut durations: BTreeMap<String, String> = spans
        .into_iter()
        .map(|(stage, (first, last))| (stage, format_duration(last - first)))
        .collect();

    if let Some((first, last)) = overall {
        durations.insert(TOTAL_TIME_KEY.to_string(), format_duration(last - first));
    }

    durations
}

fn widen(span: &mut (DateTime<Utc>, DateTime<Utc>), date: DateTime<Utc>) {
    if date < span.0 {
        span.0 = date;
    }
    if date > span.1 {
        span.1 = date;
    }
}

/// HH:MM:SS.mmm; hours are not wrapped at 24
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.num_milliseconds().max(0);
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        ms / 3_600_000,
        (ms / 60_000) % 60,
        (ms / 1000) % 60,
        ms % 1000
    )
}
