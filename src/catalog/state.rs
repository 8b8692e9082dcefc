//! Catalog search view state machine
//!
//! Two modes: `Search` (server-paginated query built from the filters) and
//! `List` (the programs of one saved list, fetched by id and paginated
//! locally). Every transition that needs data returns a [`Fetch`] for the
//! caller to run; results come back through `apply_*` tagged with the
//! fetch's sequence number, and anything but the latest is dropped.

use crate::api::programs::ProgramFilter;
use crate::error::ApiResult;
use crate::models::{Paginated, Program, ProgramList, SortOrder};

use super::pagination::total_pages;
use super::query::{CatalogQuery, FilterKind, Filters};
use super::sort::sort_programs;
use super::DEFAULT_PAGE_SIZE;

/// Selected estimated-cost window, kept for display and links only
pub const DEFAULT_COST_RANGE: (u64, u64) = (1_000, 50_000);

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogMode {
    Search,
    List(ProgramList),
}

/// Work the caller must perform, then report back via `apply_*`
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    Search { seq: u64, filter: ProgramFilter },
    ByIds { seq: u64, ids: Vec<String> },
}

impl Fetch {
    pub fn seq(&self) -> u64 {
        match self {
            Fetch::Search { seq, .. } | Fetch::ByIds { seq, .. } => *seq,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Load {
    Idle,
    Loading,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CatalogState {
    filters: Filters,
    cost_range: (u64, u64),
    page: usize,
    page_size: usize,
    sort: Option<SortOrder>,
    mode: CatalogMode,
    /// Search: the current page. List: every program in the list.
    programs: Vec<Program>,
    total: usize,
    load: Load,
    seq: u64,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::from_query(CatalogQuery::default())
    }
}

impl CatalogState {
    /// Seed the view from a shared link
    pub fn from_query(query: CatalogQuery) -> Self {
        Self {
            filters: query.filters,
            cost_range: DEFAULT_COST_RANGE,
            page: query.page.max(1),
            page_size: query.limit.max(1),
            sort: query.sort,
            mode: CatalogMode::Search,
            programs: Vec::new(),
            total: 0,
            load: Load::Idle,
            seq: 0,
        }
    }

    // -- accessors ---------------------------------------------------------

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn cost_range(&self) -> (u64, u64) {
        self.cost_range
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }

    pub fn mode(&self) -> &CatalogMode {
        &self.mode
    }

    pub fn active_list(&self) -> Option<&ProgramList> {
        match &self.mode {
            CatalogMode::List(list) => Some(list),
            CatalogMode::Search => None,
        }
    }

    pub fn load(&self) -> &Load {
        &self.load
    }

    pub fn is_loading(&self) -> bool {
        self.load == Load::Loading
    }

    /// Total matching programs across all pages
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total, self.page_size)
    }

    /// Programs on the current page
    pub fn visible(&self) -> &[Program] {
        match self.mode {
            CatalogMode::Search => &self.programs,
            CatalogMode::List(_) => {
                let start = (self.page - 1).saturating_mul(self.page_size);
                if start >= self.programs.len() {
                    return &[];
                }
                let end = (start + self.page_size).min(self.programs.len());
                &self.programs[start..end]
            }
        }
    }

    /// Link reproducing the current view
    pub fn query(&self) -> CatalogQuery {
        CatalogQuery {
            filters: self.filters.clone(),
            page: self.page,
            limit: self.page_size,
            sort: self.sort,
        }
    }

    /// Backend request for the current search-mode view
    pub fn program_filter(&self) -> ProgramFilter {
        ProgramFilter {
            field_of_study: self.filters.field.first().cloned(),
            institution_country: self.filters.country.first().cloned(),
            institution_type: self.filters.kind.first().cloned(),
            institution_name: self.filters.institution_name.clone(),
            page: Some(self.page),
            limit: Some(self.page_size),
            sort: self.sort,
        }
    }

    // -- transitions -------------------------------------------------------

    /// Fetch for the current view, e.g. on first mount
    pub fn refresh(&mut self) -> Option<Fetch> {
        match &self.mode {
            CatalogMode::Search => Some(self.search_fetch()),
            CatalogMode::List(list) => {
                let ids = list.program_ids.clone();
                self.ids_fetch(ids)
            }
        }
    }

    /// Replace one filter's values. Always leaves list mode and goes to page 1.
    pub fn set_filter(&mut self, kind: FilterKind, values: Vec<String>) -> Fetch {
        *self.filters.get_mut(kind) = values;
        self.filters_changed()
    }

    /// Select or deselect one value of a filter
    pub fn toggle_filter_value(&mut self, kind: FilterKind, value: &str) -> Fetch {
        let values = self.filters.get_mut(kind);
        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }
        self.filters_changed()
    }

    /// Clear every multi-select filter; the cost window is untouched
    pub fn reset_filters(&mut self) -> Fetch {
        self.filters.clear();
        self.filters_changed()
    }

    pub fn set_cost_range(&mut self, min: u64, max: u64) {
        self.cost_range = (min.min(max), max.max(min));
    }

    fn filters_changed(&mut self) -> Fetch {
        if matches!(self.mode, CatalogMode::List(_)) {
            tracing::debug!("Filter changed, leaving list mode");
            self.mode = CatalogMode::Search;
        }
        self.page = 1;
        self.search_fetch()
    }

    /// Go to `page`. Search mode refetches; list mode re-slices.
    pub fn set_page(&mut self, page: usize) -> Option<Fetch> {
        let page = page.clamp(1, self.total_pages());
        if page == self.page {
            return None;
        }
        self.page = page;
        self.search_only()
    }

    pub fn set_page_size(&mut self, size: usize) -> Option<Fetch> {
        let size = size.max(1);
        if size == self.page_size {
            return None;
        }
        self.page_size = size;
        self.page = 1;
        self.search_only()
    }

    /// Search mode sorts server-side; list mode sorts what it already has
    pub fn set_sort(&mut self, sort: Option<SortOrder>) -> Option<Fetch> {
        if sort == self.sort {
            return None;
        }
        self.sort = sort;
        match self.mode {
            CatalogMode::Search => Some(self.search_fetch()),
            CatalogMode::List(_) => {
                self.sort_locally();
                None
            }
        }
    }

    /// Show one saved list. Clears filters and resets paging; an empty list
    /// resolves immediately without a request.
    pub fn enter_list(&mut self, list: ProgramList) -> Option<Fetch> {
        tracing::debug!("Entering list mode for {}", list.id);
        self.filters.clear();
        self.page = 1;
        self.page_size = DEFAULT_PAGE_SIZE;
        let ids = list.program_ids.clone();
        self.mode = CatalogMode::List(list);
        self.ids_fetch(ids)
    }

    pub fn exit_list(&mut self) -> Fetch {
        self.mode = CatalogMode::Search;
        self.page = 1;
        self.search_fetch()
    }

    /// A list was edited elsewhere. If it is the one on screen, adopt the
    /// new version and reload its programs.
    pub fn list_updated(&mut self, updated: &ProgramList) -> Option<Fetch> {
        match &mut self.mode {
            CatalogMode::List(active) if active.id == updated.id => {
                *active = updated.clone();
                let ids = updated.program_ids.clone();
                self.ids_fetch(ids)
            }
            _ => None,
        }
    }

    /// A list was deleted; leave list mode if it was the active one
    pub fn list_deleted(&mut self, id: &str) -> Option<Fetch> {
        match &self.mode {
            CatalogMode::List(active) if active.id == id => Some(self.exit_list()),
            _ => None,
        }
    }

    /// Membership of the active list changed without a refetch
    pub fn active_list_ids_changed(&mut self, list: &ProgramList) {
        if let CatalogMode::List(active) = &mut self.mode {
            if active.id == list.id {
                active.program_ids = list.program_ids.clone();
            }
        }
    }

    /// Remove a program from the list-mode view without refetching
    pub fn drop_program(&mut self, program_id: &str) {
        if !matches!(self.mode, CatalogMode::List(_)) {
            return;
        }
        self.programs.retain(|p| p.id != program_id);
        self.total = self.programs.len();
        self.page = self.page.min(self.total_pages());
    }

    // -- results -----------------------------------------------------------

    /// Returns false if the result was stale and ignored
    pub fn apply_search(&mut self, seq: u64, result: ApiResult<Paginated<Program>>) -> bool {
        if !self.accepts(seq) || !matches!(self.mode, CatalogMode::Search) {
            return false;
        }
        match result {
            Ok(page) => {
                self.total = page.total;
                self.programs = page.items;
                self.load = Load::Idle;
            }
            Err(e) => {
                tracing::warn!("Program search failed: {}", e);
                self.programs.clear();
                self.total = 0;
                self.load = Load::Failed(format!("Could not load programs: {}", e));
            }
        }
        true
    }

    /// Returns false if the result was stale and ignored
    pub fn apply_by_ids(&mut self, seq: u64, result: ApiResult<Vec<Program>>) -> bool {
        if !self.accepts(seq) || !matches!(self.mode, CatalogMode::List(_)) {
            return false;
        }
        match result {
            Ok(programs) => {
                self.programs = programs;
                self.sort_locally();
                self.total = self.programs.len();
                self.load = Load::Idle;
            }
            Err(e) => {
                tracing::warn!("Loading list programs failed: {}", e);
                self.programs.clear();
                self.total = 0;
                self.load = Load::Failed(format!("Could not load this list: {}", e));
            }
        }
        true
    }

    fn accepts(&self, seq: u64) -> bool {
        if seq != self.seq {
            tracing::debug!("Dropping stale catalog response #{} (latest #{})", seq, self.seq);
            return false;
        }
        true
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.load = Load::Loading;
        self.seq
    }

    fn search_fetch(&mut self) -> Fetch {
        let seq = self.next_seq();
        Fetch::Search {
            seq,
            filter: self.program_filter(),
        }
    }

    fn search_only(&mut self) -> Option<Fetch> {
        match self.mode {
            CatalogMode::Search => Some(self.search_fetch()),
            CatalogMode::List(_) => None,
        }
    }

    fn ids_fetch(&mut self, ids: Vec<String>) -> Option<Fetch> {
        let seq = self.next_seq();
        if ids.is_empty() {
            self.programs.clear();
            self.total = 0;
            self.load = Load::Idle;
            return None;
        }
        Some(Fetch::ByIds { seq, ids })
    }

    fn sort_locally(&mut self) {
        if let Some(order) = self.sort {
            sort_programs(&mut self.programs, order);
        }
    }
}
