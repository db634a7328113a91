//! # Stock Availability Checker
//!
//! The single source of truth every mutating cart operation consults.
//!
//! ## Check Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  check_availability(product, warehouse, requested_base_qty)             │
//! │                                                                         │
//! │  track_stock = false? ──► allowed, available = ∞                        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  in_cart = Σ base_quantity of OTHER lines on (product, warehouse)      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  in_cart + requested > stock + ε ──► StockInsufficient                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  remaining = stock − total                                              │
//! │  0 < remaining < minimum ──► OrphanStockViolation                       │
//! │        │                     (stock may be drained to exactly zero,    │
//! │        ▼                      or keep one more full minimum sellable)  │
//! │  allowed, available = stock                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! Reads only the catalog snapshot and the current lines. No side effects,
//! fully re-derivable, deterministic - which is what lets the summary rerun
//! the same checks on every read without divergence.

use crate::cart::CartLine;
use crate::catalog::Catalog;
use crate::error::{CartError, CartResult};
use crate::QTY_EPSILON;

// =============================================================================
// Check Result
// =============================================================================

/// Successful availability verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockAvailability {
    /// Warehouse stock in base units; `f64::INFINITY` for untracked products.
    pub available: f64,
}

// =============================================================================
// Checker
// =============================================================================

/// Checks whether a proposed allocation for `(product, warehouse)` is
/// satisfiable given everything already reserved by other cart lines.
///
/// ## Arguments
/// * `requested_base_qty` - the allocation being proposed, in base units
/// * `exclude_line_id` - line being replaced by its own updated value
///   (excluded from the reserved sum to avoid double counting)
///
/// ## Errors
/// * [`CartError::StockInsufficient`] - warehouse cannot cover the total
/// * [`CartError::OrphanStockViolation`] - the leftover would be a nonzero
///   amount below the product's minimum purchase, hence unsellable
pub fn check_availability(
    catalog: &Catalog,
    lines: &[CartLine],
    product_id: &str,
    warehouse_id: &str,
    requested_base_qty: f64,
    exclude_line_id: Option<&str>,
) -> CartResult<StockAvailability> {
    let product = catalog.product(product_id)?;

    if !product.track_stock {
        return Ok(StockAvailability {
            available: f64::INFINITY,
        });
    }

    let stock = product.stock_in(warehouse_id);
    let in_cart = reserved_base_quantity(lines, product_id, warehouse_id, exclude_line_id);

    let total = in_cart + requested_base_qty;
    if total > stock + QTY_EPSILON {
        return Err(CartError::StockInsufficient {
            product_id: product_id.to_string(),
            warehouse: catalog.warehouse_name(warehouse_id),
            requested: requested_base_qty,
            available: (stock - in_cart).max(0.0),
        });
    }

    let remaining = stock - total;
    let minimum = product.min_purchase();
    if minimum > 0.0 && remaining > QTY_EPSILON && remaining < minimum - QTY_EPSILON {
        return Err(CartError::OrphanStockViolation {
            warehouse: catalog.warehouse_name(warehouse_id),
            remaining,
            minimum,
        });
    }

    Ok(StockAvailability { available: stock })
}

/// Base units already reserved by cart lines on `(product, warehouse)`.
pub fn reserved_base_quantity(
    lines: &[CartLine],
    product_id: &str,
    warehouse_id: &str,
    exclude_line_id: Option<&str>,
) -> f64 {
    lines
        .iter()
        .filter(|l| {
            l.product_id == product_id
                && l.is_in_warehouse(warehouse_id)
                && Some(l.id.as_str()) != exclude_line_id
        })
        .map(|l| l.base_quantity)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Package, Product, StockLevel, Warehouse};

    fn catalog() -> Catalog {
        let mut water = Product::basic("prod_1", "Mineral Water 1L", 120);
        water.track_stock = true;
        water.min_purchase_quantity = Some(12.0);
        water.stock_levels = vec![
            StockLevel {
                warehouse_id: "wh_1".to_string(),
                quantity: 240.0,
            },
            StockLevel {
                warehouse_id: "wh_2".to_string(),
                quantity: 20.0,
            },
        ];

        let untracked = Product::basic("prod_2", "Gift Wrap", 250);

        Catalog::new(
            vec![water, untracked],
            vec![
                Warehouse::store("wh_1", "Main Store"),
                Warehouse::depot("wh_2", "Depot North"),
            ],
        )
    }

    fn line(product_id: &str, warehouse: &str, base_qty: f64) -> CartLine {
        let catalog = catalog();
        let product = catalog.product(product_id).unwrap();
        let package = product.package("UN").unwrap();
        CartLine::new(product, package, base_qty, Some(warehouse.to_string()))
    }

    #[test]
    fn test_untracked_is_always_available() {
        let catalog = catalog();
        let result = check_availability(&catalog, &[], "prod_2", "wh_1", 1_000_000.0, None);
        assert_eq!(result.unwrap().available, f64::INFINITY);
    }

    #[test]
    fn test_unknown_product_is_typed_error() {
        let catalog = catalog();
        assert!(matches!(
            check_availability(&catalog, &[], "prod_9", "wh_1", 1.0, None),
            Err(CartError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_insufficient_counts_other_lines() {
        let catalog = catalog();
        let lines = vec![line("prod_1", "wh_2", 12.0)];

        // 12 reserved + 10 requested > 20 in stock
        let err = check_availability(&catalog, &lines, "prod_1", "wh_2", 10.0, None).unwrap_err();
        match err {
            CartError::StockInsufficient {
                warehouse,
                requested,
                available,
                ..
            } => {
                assert_eq!(warehouse, "Depot North");
                assert_eq!(requested, 10.0);
                assert_eq!(available, 8.0);
            }
            other => panic!("expected StockInsufficient, got {other:?}"),
        }
    }

    #[test]
    fn test_exclude_line_avoids_double_counting() {
        let catalog = catalog();
        let existing = line("prod_1", "wh_2", 12.0);
        let id = existing.id.clone();
        let lines = vec![existing];

        // Replacing the line's own 12 with 20 drains the warehouse exactly
        let result = check_availability(&catalog, &lines, "prod_1", "wh_2", 20.0, Some(&id));
        assert!(result.is_ok());
    }

    #[test]
    fn test_orphan_stock_rejected() {
        let catalog = catalog();
        // 13 of 20 would leave 7, below the minimum purchase of 12
        let err = check_availability(&catalog, &[], "prod_1", "wh_2", 13.0, None).unwrap_err();
        match err {
            CartError::OrphanStockViolation {
                remaining, minimum, ..
            } => {
                assert_eq!(remaining, 7.0);
                assert_eq!(minimum, 12.0);
            }
            other => panic!("expected OrphanStockViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_orphan_stock_boundaries() {
        let catalog = catalog();
        // remaining exactly the minimum: allowed
        assert!(check_availability(&catalog, &[], "prod_1", "wh_2", 8.0, None).is_ok());
        // remaining exactly zero: allowed
        assert!(check_availability(&catalog, &[], "prod_1", "wh_2", 20.0, None).is_ok());
        // more than stock: insufficient, not orphan
        assert!(matches!(
            check_availability(&catalog, &[], "prod_1", "wh_2", 21.0, None),
            Err(CartError::StockInsufficient { .. })
        ));
    }

    #[test]
    fn test_epsilon_tolerance() {
        let catalog = catalog();
        // a hair over stock stays allowed within ε
        assert!(check_availability(&catalog, &[], "prod_1", "wh_2", 20.00005, None).is_ok());
        // a leftover within ε of zero is treated as drained, not orphaned
        assert!(check_availability(&catalog, &[], "prod_1", "wh_2", 19.99995, None).is_ok());
    }

    #[test]
    fn test_reserved_sum_scopes_by_warehouse() {
        let lines = vec![
            line("prod_1", "wh_1", 10.0),
            line("prod_1", "wh_2", 5.0),
            line("prod_1", "wh_1", 2.0),
        ];
        assert_eq!(reserved_base_quantity(&lines, "prod_1", "wh_1", None), 12.0);
        assert_eq!(reserved_base_quantity(&lines, "prod_1", "wh_2", None), 5.0);
        assert_eq!(reserved_base_quantity(&lines, "prod_2", "wh_1", None), 0.0);
    }
}
