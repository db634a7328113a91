//! # Validation Module
//!
//! Quantity rules and unit-of-measure conversions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Edit-buffer parsing (in-progress decimal typing stays a string)   │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Committed quantities are always validated numbers                 │
//! │  └── Finite, positive, whole-unit, within per-line limits              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Stock availability checker                                   │
//! │  └── Warehouse capacity and orphan-stock policy                        │
//! │                                                                         │
//! │  Defense in depth: the engine never holds an ambiguous quantity        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::catalog::{Package, Product};
use crate::error::{CartError, CartResult};
use crate::{MAX_QTY_PER_LINE, QTY_EPSILON};

// =============================================================================
// Quantity Validators
// =============================================================================

/// Validates a committed line quantity, counted in package units.
///
/// ## Rules
/// - Must be a finite number (NaN/∞ never reach the cart)
/// - Must be positive (> 0); removal is its own operation
/// - Must be a whole number unless `fractional_allowed`
/// - Must not exceed MAX_QTY_PER_LINE (50)
///
/// ## Example
/// ```rust
/// use vela_core::validation::validate_quantity;
///
/// assert!(validate_quantity(3.0, false).is_ok());
/// assert!(validate_quantity(2.5, true).is_ok());
/// assert!(validate_quantity(2.5, false).is_err());
/// assert!(validate_quantity(51.0, true).is_err());
/// ```
pub fn validate_quantity(qty: f64, fractional_allowed: bool) -> CartResult<()> {
    if !qty.is_finite() {
        return Err(CartError::InvalidQuantity {
            value: qty,
            reason: "must be a finite number".to_string(),
        });
    }

    if qty <= 0.0 {
        return Err(CartError::InvalidQuantity {
            value: qty,
            reason: "must be positive".to_string(),
        });
    }

    if !fractional_allowed && (qty - qty.round()).abs() > QTY_EPSILON {
        return Err(CartError::InvalidQuantity {
            value: qty,
            reason: "this package only sells whole units".to_string(),
        });
    }

    if qty > MAX_QTY_PER_LINE + QTY_EPSILON {
        return Err(CartError::QuantityLimitExceeded {
            requested: qty,
            max: MAX_QTY_PER_LINE,
        });
    }

    Ok(())
}

// =============================================================================
// Minimum Purchase Conversions
// =============================================================================

/// Minimum purchase expressed in a package's own units, for blocking checks.
///
/// ## Conversion
/// - No minimum on the product → 0 (nothing to enforce)
/// - Fractional factor-1 package of a measurable unit → the raw minimum
/// - Otherwise → `ceil(minimum / factor)` whole packages
pub fn min_quantity_in_package(product: &Product, package: &Package) -> f64 {
    let min = product.min_purchase();
    if min <= 0.0 {
        return 0.0;
    }

    if product.package_allows_fractional(package) {
        min
    } else {
        (min / package.factor).ceil()
    }
}

/// Quantity for a freshly added line, in package units.
///
/// One package unit, raised to the minimum purchase when one unit would sit
/// below it. The sizing minimum defaults to 1 base unit when the product has
/// no minimum (a new line is never empty).
pub fn initial_add_quantity(product: &Product, package: &Package) -> f64 {
    let min_base = product.min_purchase_or_one();

    let min_in_package = if product.package_allows_fractional(package) {
        min_base
    } else {
        (min_base / package.factor).ceil()
    };

    min_in_package.max(1.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
