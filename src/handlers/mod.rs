pub mod health;
pub mod items;
pub mod items_minimal;
pub mod router;
pub mod snapshots;
