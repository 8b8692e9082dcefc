//! Shareable catalog link: filters and paging as a query string
//!
//! Multi-valued filters are comma-joined (`country=Malaysia,UK`), matching the
//! links the web client produced. This is unrelated to the backend request,
//! which repeats keys instead (see `api::programs::ProgramFilter`).

use url::form_urlencoded;

use crate::models::SortOrder;

/// Which filter a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Country,
    Type,
    Ranking,
    Field,
    Institution,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::Country,
        FilterKind::Type,
        FilterKind::Ranking,
        FilterKind::Field,
        FilterKind::Institution,
    ];

    /// Query-string key
    pub fn key(&self) -> &'static str {
        match self {
            FilterKind::Country => "country",
            FilterKind::Type => "type",
            FilterKind::Ranking => "ranking",
            FilterKind::Field => "field",
            FilterKind::Institution => "institution_name",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FilterKind::Country => "Country",
            FilterKind::Type => "Type",
            FilterKind::Ranking => "Ranking",
            FilterKind::Field => "Field of study",
            FilterKind::Institution => "University",
        }
    }
}

/// Multi-select filter values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub country: Vec<String>,
    pub kind: Vec<String>,
    pub ranking: Vec<String>,
    pub field: Vec<String>,
    pub institution_name: Vec<String>,
}

impl Filters {
    pub fn get(&self, kind: FilterKind) -> &Vec<String> {
        match kind {
            FilterKind::Country => &self.country,
            FilterKind::Type => &self.kind,
            FilterKind::Ranking => &self.ranking,
            FilterKind::Field => &self.field,
            FilterKind::Institution => &self.institution_name,
        }
    }

    pub fn get_mut(&mut self, kind: FilterKind) -> &mut Vec<String> {
        match kind {
            FilterKind::Country => &mut self.country,
            FilterKind::Type => &mut self.kind,
            FilterKind::Ranking => &mut self.ranking,
            FilterKind::Field => &mut self.field,
            FilterKind::Institution => &mut self.institution_name,
        }
    }

    pub fn is_empty(&self) -> bool {
        FilterKind::ALL.iter().all(|k| self.get(*k).is_empty())
    }

    pub fn clear(&mut self) {
        *self = Filters::default();
    }
}

/// Everything a catalog link carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub filters: Filters,
    pub page: usize,
    pub limit: usize,
    pub sort: Option<SortOrder>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            page: 1,
            limit: super::DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl CatalogQuery {
    /// Encode as `page=1&limit=10&country=A,B...`; empty filters are omitted
    pub fn to_query_string(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        out.append_pair("page", &self.page.to_string());
        out.append_pair("limit", &self.limit.to_string());
        if let Some(sort) = self.sort {
            out.append_pair("sort", sort.as_str());
        }
        for kind in FilterKind::ALL {
            let values = self.filters.get(kind);
            if !values.is_empty() {
                out.append_pair(kind.key(), &values.join(","));
            }
        }
        out.finish()
    }

    /// Decode a query string, with or without a leading `?`. Unknown keys
    /// and malformed numbers fall back to defaults.
    pub fn parse(input: &str) -> Self {
        let input = input.trim().trim_start_matches('?');
        let mut query = CatalogQuery::default();

        for (key, value) in form_urlencoded::parse(input.as_bytes()) {
            match key.as_ref() {
                "page" => {
                    if let Some(page) = value.parse::<usize>().ok().filter(|p| *p > 0) {
                        query.page = page;
                    }
                }
                "limit" => {
                    if let Some(limit) = value.parse::<usize>().ok().filter(|l| *l > 0) {
                        query.limit = limit;
                    }
                }
                "sort" => query.sort = SortOrder::parse(&value),
                other => {
                    if let Some(kind) = FilterKind::ALL.iter().find(|k| k.key() == other) {
                        *query.filters.get_mut(*kind) = split_values(&value);
                    }
                }
            }
        }
        query
    }
}

fn split_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
