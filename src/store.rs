//! In-memory data source implementing [`Paginatable`].
//!
//! Items are filtered by exact field match, sorted by the requested keys and
//! windowed either by cursor (item id) or by page number.

use axum::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::api::{PageRequest, PageResult, Paginatable, SearchCriteria, SortKey};
use crate::error::PaginateError;

/// Stable identifier used as the pagination cursor.
pub trait Identified {
    fn cursor(&self) -> String;
}

#[derive(Clone)]
pub struct MemoryStore<T> {
    items: Arc<RwLock<Vec<T>>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T> MemoryStore<T>
where
    T: Serialize + Clone + Identified,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, item: T) {
        self.items.write().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn query(
        &self,
        criteria: &SearchCriteria,
        request: &PageRequest,
    ) -> Result<PageResult<T>, PaginateError> {
        if let Some((key, _)) = criteria
            .iter()
            .find(|(_, value)| value.is_array() || value.is_object())
        {
            return Err(PaginateError::InvalidCriteria(format!(
                "criterion '{key}' must be a scalar value"
            )));
        }

        let snapshot: Vec<(T, Value)> = {
            let items = self.items.read();
            items
                .iter()
                .map(|item| serde_json::to_value(item).map(|json| (item.clone(), json)))
                .collect::<Result<_, _>>()
                .map_err(|e| PaginateError::Other(e.into()))?
        };

        let mut matched: Vec<(T, Value)> = snapshot
            .into_iter()
            .filter(|(_, json)| matches_criteria(json, criteria))
            .collect();

        if let Some(keys) = &request.options.sort_by {
            matched.sort_by(|(_, a), (_, b)| compare_by_keys(a, b, keys));
        }

        let per_page = request.page_size.max(1);
        let page_len = per_page as usize;
        let total = matched.len();
        let page_count = (total as u64).div_ceil(u64::from(per_page));

        let position = |cursor: &str| matched.iter().position(|(item, _)| item.cursor() == cursor);
        let options = &request.options;

        let cursor_start = if let Some(idx) = options.after.as_deref().and_then(position) {
            Some((idx + 1, idx + 1 + page_len))
        } else {
            options
                .before
                .as_deref()
                .and_then(position)
                .map(|idx| (idx.saturating_sub(page_len), idx))
        };

        let (start, end, current_page, page_count) = match cursor_start {
            // A cursor window may start mid-page: whatever precedes it counts
            // as ceil(start / per_page) pages so a previous page stays reachable.
            Some((start, end)) => {
                let start = start.min(total);
                let pages_before = start.div_ceil(page_len) as u64;
                let pages_from = (total - start).div_ceil(page_len) as u64;
                let page_count = pages_before + pages_from;
                let current_page = (pages_before + 1).min(page_count.max(1));
                (start, end.min(total), current_page, page_count)
            }
            None => {
                let requested = if options.last.as_deref().is_some_and(is_truthy) {
                    page_count
                } else {
                    request.page.or(request.current_page).unwrap_or(1)
                };
                // Pages past the end resolve to the last page.
                let current_page = requested.clamp(1, page_count.max(1));
                let start = usize::try_from(current_page - 1)
                    .unwrap_or(usize::MAX)
                    .saturating_mul(page_len)
                    .min(total);
                let end = start.saturating_add(page_len).min(total);
                (start, end, current_page, page_count)
            }
        };

        let items: Vec<T> = matched
            .into_iter()
            .skip(start)
            .take(end - start)
            .map(|(item, _)| item)
            .collect();

        Ok(PageResult {
            current_page,
            before: items.first().map(Identified::cursor),
            after: items.last().map(Identified::cursor),
            page_count,
            per_page,
            total: total as u64,
            items,
        })
    }
}

#[async_trait]
impl<T> Paginatable for MemoryStore<T>
where
    T: Serialize + Clone + Identified + Send + Sync,
{
    type Item = T;

    async fn paginate(
        &self,
        criteria: SearchCriteria,
        request: PageRequest,
    ) -> Result<PageResult<T>, PaginateError> {
        self.query(&criteria, &request)
    }
}

fn is_truthy(flag: &str) -> bool {
    !matches!(flag.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no")
}

/// Query-string criteria arrive as text, so `"3"` matches a numeric `3`.
fn matches_criteria(item: &Value, criteria: &SearchCriteria) -> bool {
    criteria.iter().all(|(key, expected)| match item.get(key) {
        Some(actual) if actual == expected => true,
        Some(actual @ (Value::Number(_) | Value::Bool(_))) => {
            expected.as_str() == Some(actual.to_string().as_str())
        }
        _ => false,
    })
}

fn compare_by_keys(a: &Value, b: &Value, keys: &[SortKey]) -> Ordering {
    keys.iter()
        .map(|key| {
            let ordering = compare_json(a.get(&key.field), b.get(&key.field));
            if key.direction.is_descending() {
                ordering.reverse()
            } else {
                ordering
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_) | Value::Object(_)) => 4,
    }
}

fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
