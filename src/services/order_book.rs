//! Order book assembly
//!
//! Resolves a snapshot, loads both of its sides concurrently and turns
//! each into price levels. The cumulative depth curve is authoritative;
//! discrete order rows are only used for a side that has no curve. When
//! both exist and disagree the curve still wins and the drift is logged.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::item::ItemRef;
use crate::models::order_book::{OrderBook, OrderBookLevel, Side, SnapshotRecord};
use crate::services::depth_curve::{self, DepthCurveError};
use crate::services::market_store::{SnapshotStore, StoreError};

/// Which snapshot to assemble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSelector {
    /// Most recent snapshot of a resolved item
    LatestFor(ItemRef),
    Id(i64),
}

#[derive(Debug, Error)]
pub enum OrderBookError {
    #[error("snapshot {snapshot_id} has corrupt depth data: {source}")]
    DataCorruption {
        snapshot_id: i64,
        #[source]
        source: DepthCurveError,
    },

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

#[derive(Clone)]
pub struct OrderBookAssembler {
    store: Arc<dyn SnapshotStore>,
}

impl OrderBookAssembler {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Build the order book for the selected snapshot.
    ///
    /// `Ok(None)` means the item has no snapshot or the id does not exist.
    pub async fn assemble(
        &self,
        selector: SnapshotSelector,
    ) -> Result<Option<OrderBook>, OrderBookError> {
        let snapshot = match selector {
            SnapshotSelector::LatestFor(item) => self.store.latest_snapshot_for(item).await?,
            SnapshotSelector::Id(snapshot_id) => self.store.snapshot_by_id(snapshot_id).await?,
        };

        let Some(snapshot) = snapshot else {
            debug!(?selector, "No snapshot for selector");
            return Ok(None);
        };

        self.assemble_snapshot(snapshot).await.map(Some)
    }

    pub async fn latest_for_item(&self, item: ItemRef) -> Result<Option<OrderBook>, OrderBookError> {
        self.assemble(SnapshotSelector::LatestFor(item)).await
    }

    pub async fn for_snapshot(&self, snapshot_id: i64) -> Result<Option<OrderBook>, OrderBookError> {
        self.assemble(SnapshotSelector::Id(snapshot_id)).await
    }

    async fn assemble_snapshot(&self, snapshot: SnapshotRecord) -> Result<OrderBook, OrderBookError> {
        let (sell_orders, buy_orders) = tokio::try_join!(
            self.side_levels(snapshot.snapshot_id, Side::Sell),
            self.side_levels(snapshot.snapshot_id, Side::Buy),
        )?;

        debug!(
            snapshot_id = snapshot.snapshot_id,
            sell_levels = sell_orders.len(),
            buy_levels = buy_orders.len(),
            "Assembled order book"
        );

        Ok(OrderBook::new(snapshot, sell_orders, buy_orders))
    }

    /// Levels for one side; an empty side is an empty list
    async fn side_levels(
        &self,
        snapshot_id: i64,
        side: Side,
    ) -> Result<Vec<OrderBookLevel>, OrderBookError> {
        let (curve, orders) = tokio::try_join!(
            self.store.depth_points(snapshot_id, side),
            self.store.discrete_orders(snapshot_id, side),
        )?;

        let corrupt = |source: DepthCurveError| OrderBookError::DataCorruption {
            snapshot_id,
            source,
        };

        if curve.is_empty() {
            let levels = depth_curve::levels_from_orders(side, &orders).map_err(corrupt)?;
            return Ok(levels.unwrap_or_default());
        }

        let levels = depth_curve::reconstruct(side, &curve)
            .map_err(corrupt)?
            .unwrap_or_default();

        if !orders.is_empty() {
            match depth_curve::levels_from_orders(side, &orders) {
                Ok(Some(discrete)) if discrete == levels => {}
                Ok(_) => warn!(
                    snapshot_id,
                    side = %side,
                    curve_levels = levels.len(),
                    discrete_levels = orders.len(),
                    "Discrete orders disagree with depth curve, using depth curve"
                ),
                Err(e) => warn!(
                    snapshot_id,
                    side = %side,
                    error = %e,
                    "Ignoring corrupt discrete orders, depth curve is present"
                ),
            }
        }

        Ok(levels)
    }
}
