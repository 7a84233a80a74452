use crate::error::ApiError;

/// Record ids come straight from the path; anything that is not an integer
/// cannot name a record.
pub fn parse_item_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found())
}
