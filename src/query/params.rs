use std::collections::{BTreeMap, HashMap};

use super::error::QueryError;
use super::types::{Endpoint, FilterKey, NormalizedQuery, QueryLimits, SortDirection, Verbosity};

/// Converts query-string values into a `NormalizedQuery`, applying endpoint defaults.
///
/// Empty values count as absent. Only type conversion happens here; sort
/// fields and timestamps are checked by `validate`.
pub fn normalize(
    params: &HashMap<String, String>,
    endpoint: Endpoint,
    limits: &QueryLimits,
) -> Result<NormalizedQuery, QueryError> {
    let page = positive_int(params, "page")?.unwrap_or(1);

    let requested_size = positive_int(params, "page_size")?.unwrap_or(limits.default_page_size);
    let page_size = if requested_size > limits.max_page_size {
        tracing::warn!(
            "page_size {} exceeds max {}, capping to max",
            requested_size,
            limits.max_page_size
        );
        limits.max_page_size
    } else {
        requested_size
    };

    let sort_by = value(params, "sort_by")
        .unwrap_or(endpoint.default_sort_by())
        .to_string();
    let sort_dir = value(params, "sort_dir")
        .unwrap_or(SortDirection::DEFAULT.as_str())
        .to_string();

    let verbosity = match value(params, "verbosity") {
        Some(v) => Verbosity::parse(v).ok_or(QueryError::InvalidVerbosity)?,
        None => Verbosity::default(),
    };

    let filters: BTreeMap<FilterKey, String> = FilterKey::ALL
        .iter()
        .filter_map(|key| value(params, key.name()).map(|v| (*key, v.to_string())))
        .collect();

    Ok(NormalizedQuery {
        page,
        page_size,
        sort_by,
        sort_dir,
        created_at_from: value(params, "created_at_from").map(str::to_string),
        created_at_to: value(params, "created_at_to").map(str::to_string),
        date_from: value(params, "date_from").map(str::to_string),
        date_to: value(params, "date_to").map(str::to_string),
        filters,
        verbosity,
    })
}

fn value<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn positive_int(params: &HashMap<String, String>, key: &'static str) -> Result<Option<u32>, QueryError> {
    match value(params, key) {
        None => Ok(None),
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(QueryError::InvalidInteger { param: key }),
        },
    }
}
