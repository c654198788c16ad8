use chrono::{DateTime, Utc};

use super::error::QueryError;
use super::types::{Endpoint, NormalizedQuery, QueryDescriptor, SortDirection, TimeRange, SORT_DIRECTIONS};

/// Checks a `NormalizedQuery` against the endpoint's rules and freezes it.
///
/// Order is fixed and the first failure wins: sort field, sort direction,
/// then timestamps.
pub fn validate(raw: NormalizedQuery, endpoint: Endpoint) -> Result<QueryDescriptor, QueryError> {
    let whitelist = endpoint.sort_by_whitelist();
    let sort_by = whitelist.get(&raw.sort_by).ok_or_else(|| QueryError::InvalidSortBy {
        choices: whitelist.describe(),
    })?;

    let sort_dir = SortDirection::parse(&raw.sort_dir)
        .ok_or_else(|| QueryError::InvalidSortDir { choices: SORT_DIRECTIONS.describe() })?;

    let (created_at, date) = validate_timestamps(&raw, endpoint.strict_timestamps())?;

    Ok(QueryDescriptor {
        page: raw.page,
        page_size: raw.page_size,
        sort_by,
        sort_dir,
        created_at,
        date,
        filters: raw.filters,
        verbosity: raw.verbosity,
    })
}

/// Parses the creation-time bounds, and in strict mode the status date bounds too.
pub fn validate_timestamps(raw: &NormalizedQuery, strict: bool) -> Result<(TimeRange, TimeRange), QueryError> {
    let created_at = range(
        ("created_at_from", raw.created_at_from.as_deref()),
        ("created_at_to", raw.created_at_to.as_deref()),
    )?;

    let date = if strict {
        range(("date_from", raw.date_from.as_deref()), ("date_to", raw.date_to.as_deref()))?
    } else {
        TimeRange::default()
    };

    Ok((created_at, date))
}

fn range(
    (from_param, from): (&'static str, Option<&str>),
    (to_param, to): (&'static str, Option<&str>),
) -> Result<TimeRange, QueryError> {
    let from = from.map(|v| parse_timestamp(from_param, v)).transpose()?;
    let to = to.map(|v| parse_timestamp(to_param, v)).transpose()?;

    if let (Some(start), Some(end)) = (from, to) {
        if start > end {
            return Err(QueryError::InvertedRange { from: from_param, to: to_param });
        }
    }

    Ok(TimeRange { from, to })
}

/// RFC 3339 is the only accepted format
fn parse_timestamp(param: &'static str, value: &str) -> Result<DateTime<Utc>, QueryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| QueryError::InvalidTimestamp { param })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::params::normalize;
    use crate::query::types::QueryLimits;
    use std::collections::HashMap;

    fn raw(endpoint: Endpoint, pairs: &[(&str, &str)]) -> NormalizedQuery {
        let params: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        normalize(&params, endpoint, &QueryLimits::default()).unwrap()
    }

    #[test]
    fn accepts_defaults_for_both_endpoints() {
        let q = validate(raw(Endpoint::AllPayloads, &[]), Endpoint::AllPayloads).unwrap();
        assert_eq!(q.sort_by(), "created_at");
        assert_eq!(q.sort_dir(), SortDirection::Desc);
        assert_eq!(q.offset(), 0);

        let q = validate(raw(Endpoint::ByRequestId, &[]), Endpoint::ByRequestId).unwrap();
        assert_eq!(q.sort_by(), "date");
    }

    #[test]
    fn unknown_sort_by_lists_every_choice_in_order() {
        let err = validate(raw(Endpoint::AllPayloads, &[("sort_by", "bogus_field")]), Endpoint::AllPayloads)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "sort_by must be one of created_at, updated_at, account, org_id, inventory_id, system_id"
        );

        let err = validate(raw(Endpoint::ByRequestId, &[("sort_by", "account")]), Endpoint::ByRequestId)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "sort_by must be one of service, source, status, status_msg, date, created_at"
        );
    }

    #[test]
    fn whitelists_are_per_endpoint() {
        assert!(validate(raw(Endpoint::ByRequestId, &[("sort_by", "service")]), Endpoint::ByRequestId).is_ok());
        assert!(validate(raw(Endpoint::AllPayloads, &[("sort_by", "service")]), Endpoint::AllPayloads).is_err());
        assert!(validate(raw(Endpoint::AllPayloads, &[("sort_by", "created_at")]), Endpoint::AllPayloads).is_ok());
        assert!(validate(raw(Endpoint::ByRequestId, &[("sort_by", "created_at")]), Endpoint::ByRequestId).is_ok());
    }

    #[test]
    fn rejects_unknown_sort_dir() {
        for bad in ["up", "ASC", "descending"] {
            let err = validate(raw(Endpoint::AllPayloads, &[("sort_dir", bad)]), Endpoint::AllPayloads)
                .unwrap_err();
            assert_eq!(err.to_string(), "sort_dir must be one of asc, desc");
        }
    }

    #[test]
    fn sort_by_is_reported_before_sort_dir_and_timestamps() {
        let err = validate(
            raw(
                Endpoint::AllPayloads,
                &[("sort_by", "nope"), ("sort_dir", "sideways"), ("created_at_from", "yesterday")],
            ),
            Endpoint::AllPayloads,
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::InvalidSortBy { .. }));
    }

    #[test]
    fn rejects_inverted_range_and_accepts_equal_bounds() {
        let err = validate(
            raw(
                Endpoint::AllPayloads,
                &[("created_at_from", "2024-02-01T00:00:00Z"), ("created_at_to", "2024-01-01T00:00:00Z")],
            ),
            Endpoint::AllPayloads,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "created_at_from must not be later than created_at_to");

        let q = validate(
            raw(
                Endpoint::AllPayloads,
                &[("created_at_from", "2024-01-01T00:00:00Z"), ("created_at_to", "2024-01-01T00:00:00Z")],
            ),
            Endpoint::AllPayloads,
        )
        .unwrap();
        assert_eq!(q.created_at().from, q.created_at().to);
    }

    #[test]
    fn compares_bounds_across_offsets() {
        // 01:00+02:00 is 23:00Z the previous day
        let err = validate(
            raw(
                Endpoint::AllPayloads,
                &[("created_at_from", "2024-01-02T01:00:00+02:00"), ("created_at_to", "2024-01-01T22:00:00Z")],
            ),
            Endpoint::AllPayloads,
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::InvertedRange { .. }));
    }

    #[test]
    fn rejects_unrecognized_timestamp_format() {
        let err = validate(raw(Endpoint::AllPayloads, &[("created_at_to", "2024-01-01")]), Endpoint::AllPayloads)
            .unwrap_err();
        assert_eq!(err, QueryError::InvalidTimestamp { param: "created_at_to" });
        assert_eq!(err.to_string(), "invalid timestamp format provided");
        assert!(!err.is_malformed());
    }

    #[test]
    fn date_range_is_only_checked_in_strict_mode() {
        let pairs = [("date_from", "not-a-date")];
        let q = validate(raw(Endpoint::AllPayloads, &pairs), Endpoint::AllPayloads).unwrap();
        assert_eq!(q.date(), TimeRange::default());

        let err = validate(raw(Endpoint::ByRequestId, &pairs), Endpoint::ByRequestId).unwrap_err();
        assert_eq!(err, QueryError::InvalidTimestamp { param: "date_from" });

        let err = validate(
            raw(
                Endpoint::ByRequestId,
                &[("date_from", "2024-03-01T00:00:00Z"), ("date_to", "2024-02-01T00:00:00Z")],
            ),
            Endpoint::ByRequestId,
        )
        .unwrap_err();
        assert_eq!(err, QueryError::InvertedRange { from: "date_from", to: "date_to" });
    }

    #[test]
    fn offset_follows_page_and_size() {
        let q = validate(raw(Endpoint::AllPayloads, &[("page", "3"), ("page_size", "25")]), Endpoint::AllPayloads)
            .unwrap();
        assert_eq!(q.page(), 3);
        assert_eq!(q.page_size(), 25);
        assert_eq!(q.offset(), 50);
    }
}
