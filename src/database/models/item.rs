use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::str::FromStr;

use crate::database::DatabaseError;

/// A persisted item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Raw `items` row; prices are stored as decimal strings.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = DatabaseError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let price = Decimal::from_str(&row.price).map_err(|e| {
            DatabaseError::CorruptRecord(format!("item {} has invalid price '{}': {}", row.id, row.price, e))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            price,
            created_at: row.created_at,
        })
    }
}

/// Caller-supplied fields of a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub price: Decimal,
}

/// Caller-writable fields of an update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub price: Option<Decimal>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none()
    }
}
