use super::types::{FilterOrderInfo, OrderColumn, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `ordering=-price,name`. Unknown fields are dropped.
    pub fn parse(ordering: &str) -> Vec<FilterOrderInfo> {
        let mut out = Vec::new();
        for part in ordering.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (field, sort) = match trimmed.strip_prefix('-') {
                Some(field) => (field, SortDirection::Desc),
                None => (trimmed, SortDirection::Asc),
            };
            if let Some(column) = OrderColumn::from_field(field) {
                out.push(FilterOrderInfo { column, sort });
            }
        }
        out
    }

    /// ORDER BY clause; `id` always breaks ties so pages are stable.
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        let mut parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", i.column.to_sql(), i.sort.to_sql()))
            .collect();
        if !infos.iter().any(|i| i.column == OrderColumn::Id) {
            parts.push(format!("{} ASC", OrderColumn::Id.to_sql()));
        }
        format!("ORDER BY {}", parts.join(", "))
    }
}
