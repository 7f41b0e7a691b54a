//! Item request/response models
//!
//! Models for the `/api/v1/items` endpoints and the minimal item index
//! used by clients to keep a local name/icon list in sync.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::pagination::{PaginationInfo, MAX_LIMIT};

/// The ways a client may identify an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemIdentifier {
    /// Store-assigned primary key
    InternalId(i64),
    /// Public market id scraped from listings
    PublicId(i64),
    ClassId(i64),
    /// Case-insensitive exact name
    Name(String),
}

impl ItemIdentifier {
    /// Parse a `{kind}/{value}` path pair, e.g. `class-id/310776`
    pub fn parse(kind: &str, value: &str) -> Result<Self, String> {
        let parse_id = |field: &str| {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("Invalid {}", field))
        };

        match kind {
            "internal-id" => parse_id("internal_id").map(ItemIdentifier::InternalId),
            "item-id" => parse_id("item_id").map(ItemIdentifier::PublicId),
            "class-id" => parse_id("class_id").map(ItemIdentifier::ClassId),
            "name" => {
                if value.trim().is_empty() {
                    Err("Invalid name".to_string())
                } else {
                    Ok(ItemIdentifier::Name(value.to_string()))
                }
            }
            other => Err(format!(
                "Unknown identifier kind '{}'. Must be one of: internal-id, item-id, class-id, name",
                other
            )),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ItemIdentifier::InternalId(_) => "internal-id",
            ItemIdentifier::PublicId(_) => "item-id",
            ItemIdentifier::ClassId(_) => "class-id",
            ItemIdentifier::Name(_) => "name",
        }
    }
}

impl fmt::Display for ItemIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemIdentifier::InternalId(id)
            | ItemIdentifier::PublicId(id)
            | ItemIdentifier::ClassId(id) => write!(f, "{}={}", self.kind(), id),
            ItemIdentifier::Name(name) => write!(f, "name={}", name),
        }
    }
}

/// Resolved handle to an item, as consumed by snapshot selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub internal_id: i64,
}

/// Item joined with its metadata row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub internal_id: i64,
    pub name: String,
    pub item_id: Option<i64>,
    pub added_at: NaiveDateTime,
    pub class_id: i64,
    pub background_color: String,
    pub icon_url: String,
}

impl ItemRecord {
    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            internal_id: self.internal_id,
        }
    }
}

/// Item as returned by the HTTP surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemResponse {
    pub name: String,
    pub item_id: Option<i64>,
    pub added_at: NaiveDateTime,
    pub background_color: String,
    pub icon_url: String,
    pub class_id: i64,
    pub full_icon_url: String,
}

impl ItemResponse {
    pub fn from_record(record: ItemRecord, icon_base_url: &str) -> Self {
        let full_icon_url = format!("{}{}", icon_base_url, record.icon_url);
        Self {
            name: record.name,
            item_id: record.item_id,
            added_at: record.added_at,
            background_color: record.background_color,
            icon_url: record.icon_url,
            class_id: record.class_id,
            full_icon_url,
        }
    }
}

/// Response for GET /api/v1/items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
    pub pagination: PaginationInfo,
}

pub const DEFAULT_RECENT_LIMIT: u64 = 10;

/// Query parameters for GET /api/v1/items/recent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentItemsQuery {
    pub limit: Option<String>,
}

impl RecentItemsQuery {
    pub fn limit(&self) -> u64 {
        self.limit
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 1.0)
            .map(|v| (v.floor() as u64).min(MAX_LIMIT))
            .unwrap_or(DEFAULT_RECENT_LIMIT)
    }
}

/// Name and icon of an item, as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalItem {
    pub name: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MinimalItemEntry {
    pub name: String,
    pub icon: String,
}

impl From<MinimalItem> for MinimalItemEntry {
    fn from(item: MinimalItem) -> Self {
        Self {
            name: item.name,
            icon: item.icon_url,
        }
    }
}

/// Response for GET /api/v1/items-minimal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsMinimalResponse {
    /// `added_at` of the newest item; clients send it back to /diff
    pub last_item: NaiveDateTime,
    pub items: Vec<MinimalItemEntry>,
}

/// Response for GET /api/v1/items-minimal/last
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsMinimalLastResponse {
    pub last_item: NaiveDateTime,
}

/// Query parameters for GET /api/v1/items-minimal/diff
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsMinimalDiffQuery {
    pub last_item: String,
}

impl ItemsMinimalDiffQuery {
    /// Accepts the serialized `last_item` form, Postgres text form, or RFC 3339
    pub fn since(&self) -> Result<NaiveDateTime, String> {
        let raw = self.last_item.trim();
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.naive_utc())
            })
            .ok_or_else(|| format!("Invalid last_item timestamp: '{}'", raw))
    }
}

/// Response for GET /api/v1/items-minimal/diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsMinimalDiffResponse {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub items: Vec<MinimalItemEntry>,
}
