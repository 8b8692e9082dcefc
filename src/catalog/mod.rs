//! Program catalog: filters, shareable links, paging and sorting

pub mod cost;
pub mod options;
pub mod pagination;
pub mod query;
pub mod sort;
pub mod state;

pub use pagination::{pagination_range, PageItem};
pub use query::{CatalogQuery, FilterKind, Filters};
pub use state::{CatalogMode, CatalogState, Fetch, Load};

/// Results per page, and the size list mode always starts with
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page numbers shown either side of the current one
pub const PAGINATION_DELTA: usize = 2;
