//! Pagination query controls for list endpoints
//!
//! Reads the raw query-string controls, clamps the page window against the
//! configured limits and turns sort/cursor controls into [`SearchOptions`].

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};
use url::form_urlencoded;

/// Opaque filter handed to the data source. Empty when the caller has none.
pub type SearchCriteria = Map<String, Value>;

/// Raw pagination controls as they appear in the query string.
///
/// Every field is kept as text so that malformed values degrade to
/// "absent" during normalization instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationQuery {
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub last: Option<String>,
    pub page: Option<String>,
    pub current_page: Option<String>,
    pub page_size: Option<String>,
}

impl PaginationQuery {
    /// Reads the controls from a raw query string. A repeated key keeps its
    /// first occurrence; unknown keys are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut controls = Self::default();

        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "sortBy" => &mut controls.sort_by,
                "sortDirection" => &mut controls.sort_direction,
                "before" => &mut controls.before,
                "after" => &mut controls.after,
                "last" => &mut controls.last,
                "page" => &mut controls.page,
                "currentPage" => &mut controls.current_page,
                "pageSize" => &mut controls.page_size,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        controls
    }
}

/// Configured page size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Direction attached to one sort field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortDirection {
    /// No direction supplied for this field; serialized as `1`.
    Ascending,
    /// Direction token taken verbatim from `sortDirection`.
    Token(String),
}

impl SortDirection {
    pub fn is_descending(&self) -> bool {
        match self {
            Self::Ascending => false,
            Self::Token(token) => {
                let token = token.trim();
                token == "-1"
                    || token.eq_ignore_ascii_case("desc")
                    || token.eq_ignore_ascii_case("descending")
            }
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ascending => serializer.serialize_u8(1),
            Self::Token(token) => serializer.serialize_str(token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Normalized controls for a single list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageControls {
    pub page: Option<u64>,
    pub current_page: Option<u64>,
    pub page_size: u32,
    pub sort_by: Option<Vec<SortKey>>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub last: Option<String>,
}

/// Options passed to the data source alongside the criteria.
///
/// `extra` holds whatever the caller supplied; the pagination keys are only
/// present when the matching query control was given. Serializes as a single
/// flat object with `sortBy` rendered as an ordered `{field: direction}` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_sort_keys"
    )]
    pub sort_by: Option<Vec<SortKey>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn serialize_sort_keys<S: Serializer>(
    keys: &Option<Vec<SortKey>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match keys {
        Some(keys) => {
            let mut map = serializer.serialize_map(Some(keys.len()))?;
            for key in keys {
                map.serialize_entry(&key.field, &key.direction)?;
            }
            map.end()
        }
        None => serializer.serialize_none(),
    }
}

/// Clamps the page window against `settings` and parses the sort and
/// cursor controls. Never fails: unusable values are dropped.
pub fn normalize(query: &PaginationQuery, settings: &PaginationSettings) -> PageControls {
    let page_size = query
        .page_size
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|size| *size > 0)
        .map(|size| size.min(settings.max_page_size))
        .unwrap_or(settings.default_page_size);

    PageControls {
        page: parse_page_number(query.page.as_deref()),
        current_page: parse_page_number(query.current_page.as_deref()),
        page_size,
        sort_by: query
            .sort_by
            .as_deref()
            .and_then(|fields| parse_sort(fields, query.sort_direction.as_deref())),
        before: non_empty(query.before.as_deref()),
        after: non_empty(query.after.as_deref()),
        last: non_empty(query.last.as_deref()),
    }
}

fn parse_page_number(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|page| *page >= 1)
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| !value.is_empty()).map(str::to_string)
}

/// Pairs comma-separated fields with comma-separated directions by position.
///
/// A field without a (non-empty) direction at its own position is ascending.
/// Parsing stops at the first empty field name. A repeated field keeps its
/// first position and takes the later direction.
pub fn parse_sort(sort_by: &str, sort_direction: Option<&str>) -> Option<Vec<SortKey>> {
    let directions: Vec<&str> = sort_direction
        .map(|raw| raw.split(',').collect())
        .unwrap_or_default();

    let mut keys: Vec<SortKey> = Vec::new();
    for (i, field) in sort_by.split(',').enumerate() {
        if field.is_empty() {
            break;
        }

        let direction = directions
            .get(i)
            .filter(|token| !token.is_empty())
            .map(|token| SortDirection::Token(token.to_string()))
            .unwrap_or(SortDirection::Ascending);

        match keys.iter_mut().find(|key| key.field == field) {
            Some(existing) => existing.direction = direction,
            None => keys.push(SortKey {
                field: field.to_string(),
                direction,
            }),
        }
    }

    (!keys.is_empty()).then_some(keys)
}

/// Merges the pagination-derived keys into the caller's options.
///
/// Derived keys replace any caller value stored under the same name.
pub fn build_options(controls: &PageControls, options: Option<SearchOptions>) -> SearchOptions {
    let mut options = options.unwrap_or_default();

    if let Some(sort_by) = &controls.sort_by {
        options.extra.remove("sortBy");
        options.sort_by = Some(sort_by.clone());
    }
    if let Some(before) = &controls.before {
        options.extra.remove("before");
        options.before = Some(before.clone());
    }
    if let Some(after) = &controls.after {
        options.extra.remove("after");
        options.after = Some(after.clone());
    }
    if let Some(last) = &controls.last {
        options.extra.remove("last");
        options.last = Some(last.clone());
    }

    options
}
