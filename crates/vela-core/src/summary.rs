//! # Cart Summary
//!
//! Derived totals and per-line validation state.
//!
//! ## Re-derivation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every read recomputes the summary from the catalog + line store.      │
//! │                                                                         │
//! │  Catalog Snapshot ──┐                                                   │
//! │                     ├──► compute_summary() ──► totals + issue map       │
//! │  Cart Line Store ───┘         (pure)                                    │
//! │                                                                         │
//! │  No cached validation state exists to drift out of sync. Catalog and   │
//! │  cart are both small and in-memory, so recomputing on every change is  │
//! │  a deliberate simplicity-over-incrementality tradeoff.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The summary is what the cart panel renders and what `finalize` consults:
//! a line flagged here blocks checkout until corrected or removed.

use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

use crate::availability::check_availability;
use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::CartError;
use crate::validation::min_quantity_in_package;
use crate::{MAX_QTY_PER_LINE, MAX_TOTAL_VALUE_CENTS, QTY_EPSILON};

// =============================================================================
// Issue Types
// =============================================================================

/// Category of a per-line validation issue, for frontend badge styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    StockInsufficient,
    OrphanStock,
    MinPurchaseNotMet,
    QuantityLimitExceeded,
}

/// A validation issue attributed to one cart line.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineIssue {
    pub kind: IssueKind,
    pub message: String,
}

impl LineIssue {
    fn from_error(err: &CartError) -> Self {
        let kind = match err {
            CartError::OrphanStockViolation { .. } => IssueKind::OrphanStock,
            CartError::MinPurchaseNotMet { .. } => IssueKind::MinPurchaseNotMet,
            CartError::QuantityLimitExceeded { .. } => IssueKind::QuantityLimitExceeded,
            _ => IssueKind::StockInsufficient,
        };
        LineIssue {
            kind,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Derived cart state: totals plus the per-line validation map, keyed by
/// line id. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Monetary total over all lines, in cents.
    pub total_cents: i64,

    /// Number of lines.
    pub line_count: usize,

    /// Per-line validation issues. Empty map means every line is sellable.
    pub issues: BTreeMap<String, LineIssue>,

    /// Whether the cart total exceeds the maximum order value.
    pub total_value_exceeded: bool,
}

impl CartSummary {
    /// Whether `finalize` would accept this cart.
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty() && !self.total_value_exceeded
    }
}

// =============================================================================
// Computation
// =============================================================================

/// Recomputes the summary from scratch. Pure.
///
/// Each line gets at most one issue, checked in severity order: stock and
/// orphan-stock first (the checker), then minimum purchase, then the
/// per-line quantity limit.
pub fn compute_summary(catalog: &Catalog, cart: &Cart) -> CartSummary {
    let mut issues = BTreeMap::new();

    for line in cart.lines() {
        let Ok(product) = catalog.product(&line.product_id) else {
            continue;
        };
        let Ok(package) = product.package(&line.package_name) else {
            continue;
        };

        if let Some(warehouse_id) = line.warehouse_id.as_deref() {
            if let Err(err) = check_availability(
                catalog,
                cart.lines(),
                &line.product_id,
                warehouse_id,
                line.base_quantity,
                Some(&line.id),
            ) {
                issues.insert(line.id.clone(), LineIssue::from_error(&err));
                continue;
            }
        }

        let min_qty = min_quantity_in_package(product, package);
        if min_qty > 0.0 && line.quantity < min_qty - QTY_EPSILON {
            let err = CartError::MinPurchaseNotMet {
                product_id: line.product_id.clone(),
                minimum: product.min_purchase(),
                unit: product.base_unit.symbol().to_string(),
                base_quantity: line.base_quantity,
            };
            issues.insert(line.id.clone(), LineIssue::from_error(&err));
            continue;
        }

        if line.quantity > MAX_QTY_PER_LINE + QTY_EPSILON {
            let err = CartError::QuantityLimitExceeded {
                requested: line.quantity,
                max: MAX_QTY_PER_LINE,
            };
            issues.insert(line.id.clone(), LineIssue::from_error(&err));
        }
    }

    let total = cart.total();
    CartSummary {
        total_cents: total.cents(),
        line_count: cart.len(),
        issues,
        total_value_exceeded: total.cents() > MAX_TOTAL_VALUE_CENTS,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::catalog::{Product, StockLevel, Warehouse};

    fn catalog() -> Catalog {
        let mut water = Product::basic("prod_1", "Mineral Water 1L", 120);
        water.track_stock = true;
        water.min_purchase_quantity = Some(12.0);
        water.stock_levels = vec![StockLevel {
            warehouse_id: "wh_1".to_string(),
            quantity: 240.0,
        }];

        let caviar = Product::basic("prod_3", "Caviar 50g", 9_900_000);

        Catalog::new(
            vec![water, caviar],
            vec![Warehouse::store("wh_1", "Main Store")],
        )
    }

    fn water_line(catalog: &Catalog, quantity: f64) -> CartLine {
        let product = catalog.product("prod_1").unwrap();
        let package = product.package("UN").unwrap();
        CartLine::new(product, package, quantity, Some("wh_1".to_string()))
    }

    #[test]
    fn test_clean_cart_is_ready() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.push(water_line(&catalog, 12.0));

        let summary = compute_summary(&catalog, &cart);
        assert!(summary.is_ready());
        assert_eq!(summary.line_count, 1);
        assert_eq!(summary.total_cents, 12 * 120);
    }

    #[test]
    fn test_min_purchase_shortfall_is_flagged() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let line = water_line(&catalog, 8.0);
        let id = line.id.clone();
        cart.push(line);

        let summary = compute_summary(&catalog, &cart);
        assert!(!summary.is_ready());
        let issue = summary.issues.get(&id).expect("line should be flagged");
        assert_eq!(issue.kind, IssueKind::MinPurchaseNotMet);
        assert!(issue.message.contains("12"));
    }

    #[test]
    fn test_total_value_limit() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let product = catalog.product("prod_3").unwrap();
        let package = product.package("UN").unwrap();
        // 6 × 99,000.00 = 594,000.00 > 500,000.00
        cart.push(CartLine::new(product, package, 6.0, None));

        let summary = compute_summary(&catalog, &cart);
        assert!(summary.total_value_exceeded);
        assert!(summary.issues.is_empty());
        assert!(!summary.is_ready());
    }

    #[test]
    fn test_summary_rederives_after_store_changes() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let line = water_line(&catalog, 8.0);
        let id = line.id.clone();
        cart.push(line);

        assert_eq!(compute_summary(&catalog, &cart).issues.len(), 1);

        // no stale cache: fixing the line clears the issue on the next read
        cart.line_mut(&id).unwrap().set_quantity(12.0);
        assert!(compute_summary(&catalog, &cart).issues.is_empty());
    }
}
