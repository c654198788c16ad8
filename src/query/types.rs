use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;

/// Ordered list of accepted values plus a set for membership checks.
/// The list order is what error messages enumerate.
#[derive(Debug)]
pub struct Whitelist {
    fields: &'static [&'static str],
    lookup: HashSet<&'static str>,
}

impl Whitelist {
    fn new(fields: &'static [&'static str]) -> Self {
        Self {
            fields,
            lookup: fields.iter().copied().collect(),
        }
    }

    /// Returns the whitelisted entry matching `candidate`
    pub fn get(&self, candidate: &str) -> Option<&'static str> {
        self.lookup.get(candidate).copied()
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn describe(&self) -> String {
        self.fields.join(", ")
    }
}

pub static ALL_PAYLOADS_SORT_BY: Lazy<Whitelist> = Lazy::new(|| {
    Whitelist::new(&["created_at", "updated_at", "account", "org_id", "inventory_id", "system_id"])
});

pub static REQUEST_ID_SORT_BY: Lazy<Whitelist> = Lazy::new(|| {
    Whitelist::new(&["service", "source", "status", "status_msg", "date", "created_at"])
});

pub static SORT_DIRECTIONS: Lazy<Whitelist> = Lazy::new(|| Whitelist::new(&["asc", "desc"]));

/// Which endpoint a query is being translated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    AllPayloads,
    ByRequestId,
}

impl Endpoint {
    pub fn default_sort_by(&self) -> &'static str {
        match self {
            Endpoint::AllPayloads => "created_at",
            Endpoint::ByRequestId => "date",
        }
    }

    pub fn sort_by_whitelist(&self) -> &'static Whitelist {
        match self {
            Endpoint::AllPayloads => &ALL_PAYLOADS_SORT_BY,
            Endpoint::ByRequestId => &REQUEST_ID_SORT_BY,
        }
    }

    /// Strict mode also validates the status date range
    pub fn strict_timestamps(&self) -> bool {
        matches!(self, Endpoint::ByRequestId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const DEFAULT: SortDirection = SortDirection::Desc;

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// How much per-record detail the request id endpoint returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Minimal,
    Standard,
    Full,
}

impl Verbosity {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "0" => Some(Verbosity::Minimal),
            "1" => Some(Verbosity::Standard),
            "2" => Some(Verbosity::Full),
            _ => None,
        }
    }
}

/// Exact-match filters accepted by the all payloads endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Account,
    OrgId,
    InventoryId,
    SystemId,
}

impl FilterKey {
    pub const ALL: [FilterKey; 4] = [
        FilterKey::Account,
        FilterKey::OrgId,
        FilterKey::InventoryId,
        FilterKey::SystemId,
    ];

    /// Query-string key, which is also the column name
    pub fn name(&self) -> &'static str {
        match self {
            FilterKey::Account => "account",
            FilterKey::OrgId => "org_id",
            FilterKey::InventoryId => "inventory_id",
            FilterKey::SystemId => "system_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl From<&QueryConfig> for QueryLimits {
    fn from(config: &QueryConfig) -> Self {
        Self {
            default_page_size: config.default_page_size.max(1),
            max_page_size: config.max_page_size.max(1),
        }
    }
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self { default_page_size: 10, max_page_size: 100 }
    }
}

/// Query-string values after type conversion, before whitelist and timestamp checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_by: String,
    pub sort_dir: String,
    pub created_at_from: Option<String>,
    pub created_at_to: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub filters: BTreeMap<FilterKey, String>,
    pub verbosity: Verbosity,
}

/// Inclusive bounds; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// A validated query. Only `validate` builds one, and nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) sort_by: &'static str,
    pub(crate) sort_dir: SortDirection,
    pub(crate) created_at: TimeRange,
    pub(crate) date: TimeRange,
    pub(crate) filters: BTreeMap<FilterKey, String>,
    pub(crate) verbosity: Verbosity,
}

impl QueryDescriptor {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows skipped before the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn sort_by(&self) -> &'static str {
        self.sort_by
    }

    pub fn sort_dir(&self) -> SortDirection {
        self.sort_dir
    }

    pub fn created_at(&self) -> TimeRange {
        self.created_at
    }

    pub fn date(&self) -> TimeRange {
        self.date
    }

    pub fn filters(&self) -> &BTreeMap<FilterKey, String> {
        &self.filters
    }

    pub fn filter(&self, key: FilterKey) -> Option<&str> {
        self.filters.get(&key).map(String::as_str)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}
