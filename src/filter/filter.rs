use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, ItemQuery, PageWindow, SqlResult};

const SELECT_COLUMNS: &str = "\"id\", \"name\", \"price\", \"created_at\"";

/// Filter, search and ordering applied to the item collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    pub name: Option<String>,
    pub search_terms: Vec<String>,
    pub order: Vec<FilterOrderInfo>,
}

impl ItemFilter {
    /// Empty `name` and `search` values are ignored.
    pub fn from_query(query: &ItemQuery) -> Self {
        let name = query.name.clone().filter(|n| !n.is_empty());
        let search_terms = query
            .search
            .as_deref()
            .map(FilterWhere::split_terms)
            .unwrap_or_default();
        let order = query
            .ordering
            .as_deref()
            .map(FilterOrder::parse)
            .unwrap_or_default();

        Self {
            name,
            search_terms,
            order,
        }
    }

    pub fn to_sql(&self, window: PageWindow) -> SqlResult {
        let where_sql = FilterWhere::generate(self.name.as_deref(), &self.search_terms);
        let order_sql = FilterOrder::generate(&self.order);

        let mut parts = vec![format!("SELECT {} FROM \"items\"", SELECT_COLUMNS)];
        if !where_sql.query.is_empty() {
            parts.push(where_sql.query);
        }
        parts.push(order_sql);
        parts.push(format!("LIMIT {} OFFSET {}", window.limit.max(0), window.offset.max(0)));

        SqlResult {
            query: parts.join(" "),
            params: where_sql.params,
        }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let where_sql = FilterWhere::generate(self.name.as_deref(), &self.search_terms);
        let mut query = "SELECT COUNT(*) AS count FROM \"items\"".to_string();
        if !where_sql.query.is_empty() {
            query.push(' ');
            query.push_str(&where_sql.query);
        }
        SqlResult {
            query,
            params: where_sql.params,
        }
    }
}
