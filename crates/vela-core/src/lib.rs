//! # vela-core: Pure Business Logic for Vela POS
//!
//! This crate is the **heart** of Vela POS. It contains the cart allocation
//! engine as pure functions and plain data, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Frontend (web UI)                          │   │
//! │  │    Catalog UI ──► Cart UI ──► Conflict Modal ──► Checkout UI   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ in-process API                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vela-session (API layer)                     │   │
//! │  │    add_line, update_quantity, resolve_merge_conflict, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vela-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌──────────┐  ┌────────────┐  │   │
//! │  │   │  catalog  │  │availability│  │  engine  │  │  summary   │  │   │
//! │  │   │  Product  │  │   stock    │  │ CartLine │  │  totals    │  │   │
//! │  │   │ Warehouse │  │   checks   │  │ mutation │  │ validation │  │   │
//! │  │   └───────────┘  └────────────┘  └──────────┘  └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Read-only catalog snapshot (products, packages, warehouses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Quantity and unit-conversion rules
//! - [`availability`] - Stock availability checker (pure)
//! - [`cart`] - Cart line store
//! - [`engine`] - Line mutation engine and merge/split resolver
//! - [`summary`] - Derived cart totals and per-line validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every check is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All rejections are typed, never strings or panics
//! 5. **Snapshot Catalog**: The catalog is injected and immutable for a session;
//!    the engine never reaches into shared globals
//!
//! ## Example Usage
//!
//! ```rust
//! use vela_core::catalog::{Catalog, Product, Warehouse};
//! use vela_core::engine::CartEngine;
//!
//! let catalog = Catalog::new(
//!     vec![Product::basic("prod_1", "Espresso Beans 1kg", 1850)],
//!     vec![Warehouse::store("wh_1", "Main Store")],
//! );
//! let mut engine = CartEngine::new(catalog);
//!
//! engine.add_line("prod_1", None).unwrap();
//! assert_eq!(engine.lines().len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod cart;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod money;
pub mod summary;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vela_core::CartEngine` instead of
// `use vela_core::engine::CartEngine`

pub use availability::{check_availability, StockAvailability};
pub use cart::{Cart, CartLine};
pub use catalog::{BaseUnit, Catalog, Package, Product, StockLevel, Warehouse};
pub use engine::{AddOutcome, CartEngine, EngineState, MergeChoice, MergeConflict};
pub use error::{CartError, CartResult};
pub use money::Money;
pub use summary::{CartSummary, LineIssue};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Keeps orders reviewable on one screen and delivery slips on one page.
/// Can be made configurable per-tenant in future versions.
pub const MAX_LINES: usize = 10;

/// Maximum quantity of a single line, counted in package units.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 500 instead of 50).
pub const MAX_QTY_PER_LINE: f64 = 50.0;

/// Maximum total cart value, in cents (500,000.00).
///
/// ## Business Reason
/// Orders above this require a sales representative, not the self-serve cart.
pub const MAX_TOTAL_VALUE_CENTS: i64 = 50_000_000;

/// Tolerance for base-quantity comparisons.
///
/// Stock levels and package factors are fractional for measurable units
/// (KG/L/M), so allocation sums are compared within this epsilon.
pub const QTY_EPSILON: f64 = 1e-4;
