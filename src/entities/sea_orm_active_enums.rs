//! Enums shared between entities

use std::cmp::Ordering;
use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Half of an order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(4))")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Sell requests; best price is the lowest
    #[sea_orm(string_value = "sell")]
    Sell,
    /// Buy requests; best price is the highest
    #[sea_orm(string_value = "buy")]
    Buy,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Sell => "sell",
            Side::Buy => "buy",
        }
    }

    /// Orders two prices by distance from this side's best price.
    ///
    /// `Less` means `a` is closer to the top of the book than `b`.
    pub fn cmp_from_best(&self, a: i64, b: i64) -> Ordering {
        match self {
            Side::Sell => a.cmp(&b),
            Side::Buy => b.cmp(&a),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
