//! API response types and pagination utilities

pub mod adapter;
pub mod links;
pub mod pagination;
pub mod response;

pub use adapter::{
    fetch_page, format_response, paginate, PageEnvelope, PageQuery, PageRequest, PageResult,
    Paginatable,
};
pub use links::{LinkBase, NavigationLinks, PageWindow};
pub use pagination::{
    build_options, normalize, parse_sort, PageControls, PaginationQuery, PaginationSettings,
    SearchCriteria, SearchOptions, SortDirection, SortKey,
};
pub use response::{Created, DataResponse};
