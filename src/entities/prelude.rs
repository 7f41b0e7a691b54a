pub use super::depth_points::Entity as DepthPoints;
pub use super::discrete_orders::Entity as DiscreteOrders;
pub use super::item_metadata::Entity as ItemMetadata;
pub use super::item_snapshots::Entity as ItemSnapshots;
pub use super::items::Entity as Items;
