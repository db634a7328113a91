//! # Error Types
//!
//! Domain-specific error types for vela-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vela-core errors (this file)                                          │
//! │  └── CartError        - Business-rule rejections                       │
//! │                                                                         │
//! │  vela-session errors (separate crate)                                  │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: CartError → ApiError → Frontend                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (warehouse name, amounts, limits)
//! 3. Errors are enum variants, never String
//! 4. Every variant is a recoverable, user-facing business outcome -
//!    a rejected mutation leaves the cart exactly as it was

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Business-rule rejections raised by the cart allocation engine.
///
/// None of these are system faults: each one corresponds to a message the
/// cashier sees, and the cart state before the operation is fully preserved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    /// A warehouse cannot cover the requested allocation.
    ///
    /// ## When This Occurs
    /// - Adding or growing a line beyond what the warehouse holds
    /// - Moving a line onto a warehouse with less stock than the line needs
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (12 UN from "Main Store")
    ///      │
    ///      ▼
    /// Checker: reserved 230 + requested 12 > stock 240
    ///      │
    ///      ▼
    /// StockInsufficient { warehouse: "Main Store", requested: 12, available: 10 }
    ///      │
    ///      ▼
    /// UI shows: "Main Store only has 10 left"
    /// ```
    #[error("Insufficient stock in {warehouse}: requested {requested}, available {available}")]
    StockInsufficient {
        product_id: String,
        warehouse: String,
        requested: f64,
        available: f64,
    },

    /// The allocation would strand stock below the minimum purchase quantity.
    ///
    /// ## Policy
    /// A warehouse may be drained to exactly zero, or must keep at least one
    /// more full minimum purchase sellable. Anything in between is orphan
    /// stock nobody can legally buy.
    #[error(
        "Allocation would leave {remaining} in {warehouse}, below the minimum purchase of {minimum}"
    )]
    OrphanStockViolation {
        warehouse: String,
        remaining: f64,
        minimum: f64,
    },

    /// A line sits below the product's minimum purchase quantity.
    ///
    /// Surfaced by the cart summary and by `finalize`; quantity edits below
    /// the minimum are allowed but flag the line until corrected.
    #[error("Minimum purchase for this product is {minimum} {unit}, line has {base_quantity}")]
    MinPurchaseNotMet {
        product_id: String,
        minimum: f64,
        unit: String,
        base_quantity: f64,
    },

    /// Cart already holds the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    LineLimitExceeded { max: usize },

    /// Line quantity exceeds the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityLimitExceeded { requested: f64, max: f64 },

    /// Cart total exceeds the maximum order value.
    #[error("Cart total {total} exceeds the maximum order value of {max}")]
    TotalValueExceeded { total: String, max: String },

    /// No warehouse in the catalog can satisfy the requested allocation.
    #[error("No warehouse has sufficient stock for product {product_id}")]
    NoWarehouseAvailable { product_id: String },

    /// Product cannot be found in the catalog snapshot.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The product has no package with the given name.
    #[error("Product {product_id} has no package named '{package}'")]
    PackageNotFound { product_id: String, package: String },

    /// Warehouse id is not part of the catalog snapshot.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(String),

    /// Cart line id does not reference a current line.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// A quantity value is unusable for this line.
    ///
    /// Covers negative, zero and non-finite input, and fractional quantities
    /// on packages that only sell whole units.
    #[error("Invalid quantity {value}: {reason}")]
    InvalidQuantity { value: f64, reason: String },

    /// A merge/split decision is outstanding.
    ///
    /// While the caller has not resolved (or discarded) the pending decision,
    /// every other mutating operation is refused.
    #[error("A merge/split decision is pending; resolve or discard it first")]
    MergeConflictPending,

    /// A resolution arrived with no decision outstanding.
    #[error("No merge/split decision is pending")]
    NoPendingConflict,

    /// Finalize refused because lines still carry validation issues.
    #[error("Cart cannot be finalized: {}", issues.join("; "))]
    FinalizeBlocked { issues: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
