use super::types::SqlResult;

pub struct FilterWhere;

impl FilterWhere {
    /// WHERE clause for an exact `name` match plus every search term as a
    /// case-insensitive substring of `name`.
    pub fn generate(name: Option<&str>, search_terms: &[String]) -> SqlResult {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(name) = name {
            conditions.push("\"name\" = ?".to_string());
            params.push(name.to_string());
        }

        for term in search_terms {
            conditions.push("\"name\" LIKE ? ESCAPE '\\'".to_string());
            params.push(format!("%{}%", Self::escape_like(term)));
        }

        let query = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        SqlResult { query, params }
    }

    /// Split a search string into terms on whitespace and commas; double
    /// quotes keep a phrase together.
    pub fn split_terms(search: &str) -> Vec<String> {
        let mut terms = Vec::new();
        let mut current = String::new();
        let mut quoted = false;

        for c in search.chars() {
            match c {
                '"' => {
                    quoted = !quoted;
                    if !quoted && !current.trim().is_empty() {
                        terms.push(current.trim().to_string());
                        current.clear();
                    }
                }
                c if !quoted && (c.is_whitespace() || c == ',') => {
                    if !current.is_empty() {
                        terms.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            }
        }
        if !current.trim().is_empty() {
            terms.push(current.trim().to_string());
        }
        terms
    }

    fn escape_like(term: &str) -> String {
        let mut out = String::with_capacity(term.len());
        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }
}
