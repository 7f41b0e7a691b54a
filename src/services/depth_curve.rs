//! Depth curve reconstruction
//!
//! Snapshots persist each side of the book as a cumulative depth curve:
//! for every recorded price, the quantity available at that price or
//! better. This module turns such a curve back into per-price levels by
//! differencing consecutive cumulative values, and turns literal discrete
//! orders into the same level shape so both storage forms are
//! interchangeable for callers.
//!
//! Points are ordered by cumulative quantity, with ties broken by distance
//! from the best price. For a well-formed curve that order is also
//! ascending distance from the best price, so any point that lands out of
//! price order afterwards means the stored curve shrinks somewhere. That is
//! reported as corruption rather than repaired.

use thiserror::Error;

use crate::models::order_book::{DepthPoint, DiscreteOrder, OrderBookLevel, Side};

/// Stored depth data that violates the curve invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepthCurveError {
    #[error("{side} side has non-positive price {price}")]
    InvalidPrice { side: Side, price: i64 },

    #[error("{side} side has negative quantity {quantity} at price {price}")]
    NegativeQuantity {
        side: Side,
        price: i64,
        quantity: i64,
    },

    #[error("{side} side has more than one level at price {price}")]
    DuplicatePrice { side: Side, price: i64 },

    #[error(
        "{side} side cumulative quantity drops from {inner_cumulative} at price {inner_price} \
         to {outer_cumulative} at price {outer_price}"
    )]
    NonMonotonic {
        side: Side,
        /// Price closer to the best price
        inner_price: i64,
        inner_cumulative: i64,
        /// Price further from the best price, with the smaller total
        outer_price: i64,
        outer_cumulative: i64,
    },

    #[error("{side} side cumulative quantity overflows at price {price}")]
    Overflow { side: Side, price: i64 },
}

/// Rebuild discrete levels from a cumulative depth curve.
///
/// Returns `Ok(None)` for an empty curve. Levels come back ordered from the
/// best price outwards: ascending price for sells, descending for buys.
/// Equal cumulative quantities produce zero-quantity levels, which are kept.
pub fn reconstruct(
    side: Side,
    points: &[DepthPoint],
) -> Result<Option<Vec<OrderBookLevel>>, DepthCurveError> {
    if points.is_empty() {
        return Ok(None);
    }

    for point in points {
        validate_price(side, point.price)?;
        if point.cumulative_quantity < 0 {
            return Err(DepthCurveError::NegativeQuantity {
                side,
                price: point.price,
                quantity: point.cumulative_quantity,
            });
        }
    }

    let mut ordered = points.to_vec();
    ordered.sort_by(|a, b| {
        a.cumulative_quantity
            .cmp(&b.cumulative_quantity)
            .then_with(|| side.cmp_from_best(a.price, b.price))
    });

    let mut levels = Vec::with_capacity(ordered.len());
    let mut previous: Option<DepthPoint> = None;

    for point in ordered {
        let quantity = match previous {
            None => point.cumulative_quantity,
            Some(prev) => {
                check_price_order(side, prev.price, point.price, || {
                    DepthCurveError::NonMonotonic {
                        side,
                        inner_price: point.price,
                        inner_cumulative: point.cumulative_quantity,
                        outer_price: prev.price,
                        outer_cumulative: prev.cumulative_quantity,
                    }
                })?;
                // Sorted by cumulative quantity, so never negative
                point.cumulative_quantity - prev.cumulative_quantity
            }
        };

        levels.push(OrderBookLevel {
            price: point.price,
            quantity,
            cumulative_quantity: point.cumulative_quantity,
        });
        previous = Some(point);
    }

    Ok(Some(levels))
}

/// Build levels from literal per-price orders, accumulating from the best
/// price outwards. Returns `Ok(None)` when there are no orders.
pub fn levels_from_orders(
    side: Side,
    orders: &[DiscreteOrder],
) -> Result<Option<Vec<OrderBookLevel>>, DepthCurveError> {
    if orders.is_empty() {
        return Ok(None);
    }

    for order in orders {
        validate_price(side, order.price)?;
        if order.quantity < 0 {
            return Err(DepthCurveError::NegativeQuantity {
                side,
                price: order.price,
                quantity: order.quantity,
            });
        }
    }

    let mut ordered = orders.to_vec();
    ordered.sort_by(|a, b| side.cmp_from_best(a.price, b.price));

    let mut levels: Vec<OrderBookLevel> = Vec::with_capacity(ordered.len());
    let mut cumulative: i64 = 0;

    for order in ordered {
        if levels.last().is_some_and(|last| last.price == order.price) {
            return Err(DepthCurveError::DuplicatePrice {
                side,
                price: order.price,
            });
        }
        cumulative = cumulative
            .checked_add(order.quantity)
            .ok_or(DepthCurveError::Overflow {
                side,
                price: order.price,
            })?;
        levels.push(OrderBookLevel {
            price: order.price,
            quantity: order.quantity,
            cumulative_quantity: cumulative,
        });
    }

    Ok(Some(levels))
}

fn validate_price(side: Side, price: i64) -> Result<(), DepthCurveError> {
    if price <= 0 {
        return Err(DepthCurveError::InvalidPrice { side, price });
    }
    Ok(())
}

/// `previous` was emitted before `current`, so it must sit strictly closer
/// to the best price.
fn check_price_order(
    side: Side,
    previous: i64,
    current: i64,
    non_monotonic: impl FnOnce() -> DepthCurveError,
) -> Result<(), DepthCurveError> {
    match side.cmp_from_best(previous, current) {
        std::cmp::Ordering::Less => Ok(()),
        std::cmp::Ordering::Equal => Err(DepthCurveError::DuplicatePrice {
            side,
            price: current,
        }),
        std::cmp::Ordering::Greater => Err(non_monotonic()),
    }
}
