/// Query-string parameters accepted by the item collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    /// Exact match on `name`
    pub name: Option<String>,
    /// Free-text search over `name`
    pub search: Option<String>,
    /// Comma-separated fields, `-` prefix for descending
    pub ordering: Option<String>,
    /// 1-based page number or `last`
    pub page: Option<String>,
}

impl ItemQuery {
    /// Parse a raw query string. A repeated parameter keeps its last value;
    /// unknown parameters are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "name" => &mut query.name,
                "search" => &mut query.search,
                "ordering" => &mut query.ordering,
                "page" => &mut query.page,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        query
    }
}

/// Columns the collection may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderColumn {
    Id,
    Name,
    Price,
    CreatedAt,
}

impl OrderColumn {
    /// Resolve a public ordering field name.
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "name" => Some(OrderColumn::Name),
            "price" => Some(OrderColumn::Price),
            "created_at" => Some(OrderColumn::CreatedAt),
            _ => None,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderColumn::Id => "\"id\"",
            OrderColumn::Name => "\"name\"",
            // prices are stored as text
            OrderColumn::Price => "CAST(\"price\" AS REAL)",
            OrderColumn::CreatedAt => "\"created_at\"",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: OrderColumn,
    pub sort: SortDirection,
}

/// LIMIT/OFFSET of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}
