//! Navigation links for paginated responses

use serde::Serialize;
use url::form_urlencoded;

/// Query keys that describe the page window. They are stripped from the
/// incoming query and re-emitted per link.
pub const WINDOW_KEYS: [&str; 6] = ["before", "after", "last", "page", "currentPage", "pageSize"];

/// Sort controls travel with every link but are not filters.
pub const SORT_KEYS: [&str; 2] = ["sortBy", "sortDirection"];

/// Request path plus the query pairs that every link should carry over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBase {
    path: String,
    pairs: Vec<(String, String)>,
}

impl LinkBase {
    pub fn new(path: impl Into<String>, query: Option<&str>) -> Self {
        let pairs = query
            .map(|query| {
                form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .filter(|(key, _)| !WINDOW_KEYS.contains(&key.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: path.into(),
            pairs,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Preserved pairs that are neither window nor sort controls.
    pub fn filter_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .filter(|(key, _)| !SORT_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn href(&self, window: &[(&str, String)]) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            query.append_pair(key, value);
        }
        for (key, value) in window {
            query.append_pair(key, value);
        }
        format!("{}?{}", self.path, query.finish())
    }
}

/// Resolved window of the page being returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub current_page: u64,
    pub before: Option<String>,
    pub after: Option<String>,
    pub page_count: u64,
    pub per_page: u32,
}

impl PageWindow {
    pub fn has_next_pages(&self) -> bool {
        self.current_page < self.page_count
    }

    fn params(&self, page: u64) -> Vec<(&'static str, String)> {
        vec![
            ("page", page.to_string()),
            ("pageSize", self.per_page.to_string()),
            ("currentPage", self.current_page.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationLinks {
    pub first: String,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: String,
}

impl NavigationLinks {
    pub fn build(base: &LinkBase, window: &PageWindow) -> Self {
        let first = base.href(&window.params(1));

        let prev = (window.current_page > 1).then(|| {
            let mut params = window.params(window.current_page - 1);
            if let Some(before) = &window.before {
                params.push(("before", before.clone()));
            }
            base.href(&params)
        });

        let next = window.has_next_pages().then(|| {
            let mut params = window.params(window.current_page + 1);
            if let Some(after) = &window.after {
                params.push(("after", after.clone()));
            }
            base.href(&params)
        });

        let mut last_params = window.params(window.page_count.max(1));
        last_params.push(("last", "true".to_string()));
        let last = base.href(&last_params);

        Self {
            first,
            prev,
            next,
            last,
        }
    }
}
