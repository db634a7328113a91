//! # Cart Session
//!
//! Shared session state around the cart engine.
//!
//! ## Thread Safety
//! The engine is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple UI commands may access/modify the cart
//! 2. Only one command should modify the cart at a time
//! 3. The UI shell dispatches commands concurrently
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  Frontend Action          Session Call            Engine Change         │
//! │  ───────────────          ────────────            ─────────────         │
//! │                                                                         │
//! │  Click Product ──────────► add_line() ──────────► allocate + push/merge │
//! │                                                                         │
//! │  Change Quantity ────────► update_quantity() ───► re-check + set qty    │
//! │                                                                         │
//! │  Pick Package ───────────► update_package() ────► re-check + reprice    │
//! │                                                                         │
//! │  Pick Warehouse ─────────► update_warehouse() ──► re-check + move       │
//! │                                                                         │
//! │  Merge Dialog ───────────► resolve_merge_conflict() ► commit choice     │
//! │                                                                         │
//! │  Checkout ───────────────► finalize() ──────────► validate + clear      │
//! │                                                                         │
//! │  NOTE: All write operations acquire the Mutex lock exclusively.         │
//! │        Read operations also acquire the lock but release it quickly.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation returns the full cart response (lines + derived summary)
//! so the frontend never has to reconcile partial updates.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use vela_core::{
    AddOutcome, CartEngine, CartLine, CartSummary, Catalog, MergeChoice, MergeConflict,
};

// =============================================================================
// Response DTOs
// =============================================================================

/// Cart response including lines, the derived summary and any pending
/// merge/split decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub summary: CartSummary,
    pub pending_conflict: Option<MergeConflict>,
}

impl From<&CartEngine> for CartResponse {
    fn from(engine: &CartEngine) -> Self {
        CartResponse {
            lines: engine.lines().to_vec(),
            summary: engine.summary(),
            pending_conflict: engine.pending_conflict().cloned(),
        }
    }
}

/// Response to an add (or to resolving a pending decision): what happened,
/// plus the cart as it stands afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponse {
    pub outcome: AddOutcome,
    pub cart: CartResponse,
}

/// Response to a successful finalize.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    /// Charged total, in cents.
    pub total_cents: i64,

    /// Formatted total for the receipt line ("594.00").
    pub total_display: String,
}

// =============================================================================
// Cart Session
// =============================================================================

/// Shared cart session.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<CartEngine>>` because:
/// - `Arc`: Allows shared ownership across threads
/// - `Mutex`: Ensures only one thread modifies the cart at a time
///
/// ## Why Not RwLock?
/// Cart operations are quick and most of them modify state. A RwLock would
/// add complexity with minimal benefit.
#[derive(Debug, Clone)]
pub struct CartSession {
    engine: Arc<Mutex<CartEngine>>,
}

impl CartSession {
    /// Creates a session over a catalog snapshot with an empty cart.
    pub fn new(catalog: Catalog) -> Self {
        CartSession {
            engine: Arc::new(Mutex::new(CartEngine::new(catalog))),
        }
    }

    /// Executes a function with read access to the engine.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let summary = session.with_engine(|e| e.summary());
    /// ```
    pub fn with_engine<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartEngine) -> R,
    {
        let engine = self.engine.lock().expect("Cart mutex poisoned");
        f(&engine)
    }

    /// Executes a function with write access to the engine.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// session.with_engine_mut(|e| e.remove_line(&id))?;
    /// ```
    pub fn with_engine_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartEngine) -> R,
    {
        let mut engine = self.engine.lock().expect("Cart mutex poisoned");
        f(&mut engine)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Gets the current cart contents with the derived summary.
    pub fn cart(&self) -> CartResponse {
        debug!("cart read");
        self.with_engine(|engine| CartResponse::from(engine))
    }

    /// Adds a product to the cart.
    ///
    /// ## Behavior
    /// - New product+package: allocated to a warehouse and appended
    /// - Same product+package in cart: merged when only one option is valid,
    ///   otherwise the response carries a `DecisionRequired` outcome and the
    ///   session refuses further mutations until it is resolved
    pub fn add_line(
        &self,
        product_id: &str,
        package_name: Option<&str>,
    ) -> Result<AddResponse, ApiError> {
        debug!(product_id, ?package_name, "add_line");
        self.with_engine_mut(|engine| {
            let outcome = engine.add_line(product_id, package_name)?;
            Ok(AddResponse {
                outcome,
                cart: CartResponse::from(&*engine),
            })
        })
    }

    /// Resolves a pending merge/split decision.
    pub fn resolve_merge_conflict(&self, choice: MergeChoice) -> Result<AddResponse, ApiError> {
        debug!(?choice, "resolve_merge_conflict");
        self.with_engine_mut(|engine| {
            let outcome = engine.resolve_merge_conflict(choice)?;
            Ok(AddResponse {
                outcome,
                cart: CartResponse::from(&*engine),
            })
        })
    }

    /// Abandons a pending merge/split decision, if any.
    pub fn discard_merge_conflict(&self) -> CartResponse {
        self.with_engine_mut(|engine| {
            let discarded = engine.discard_merge_conflict();
            debug!(discarded, "discard_merge_conflict");
            CartResponse::from(&*engine)
        })
    }

    /// Sets a line's quantity (in package units).
    pub fn update_quantity(&self, line_id: &str, quantity: f64) -> Result<CartResponse, ApiError> {
        debug!(line_id, quantity, "update_quantity");
        self.mutate(|engine| engine.update_quantity(line_id, quantity))
    }

    /// Switches a line to another of its product's packages.
    pub fn update_package(
        &self,
        line_id: &str,
        package_name: &str,
    ) -> Result<CartResponse, ApiError> {
        debug!(line_id, package_name, "update_package");
        self.mutate(|engine| engine.update_package(line_id, package_name))
    }

    /// Moves a line to another warehouse.
    pub fn update_warehouse(
        &self,
        line_id: &str,
        warehouse_id: &str,
    ) -> Result<CartResponse, ApiError> {
        debug!(line_id, warehouse_id, "update_warehouse");
        self.mutate(|engine| engine.update_warehouse(line_id, warehouse_id))
    }

    /// Removes a line from the cart.
    pub fn remove_line(&self, line_id: &str) -> Result<CartResponse, ApiError> {
        debug!(line_id, "remove_line");
        self.mutate(|engine| engine.remove_line(line_id))
    }

    /// Finalizes the cart: validates every line, charges the total and
    /// clears the cart.
    pub fn finalize(&self) -> Result<FinalizeResponse, ApiError> {
        debug!("finalize");
        self.with_engine_mut(|engine| {
            let total = engine.finalize()?;
            Ok(FinalizeResponse {
                total_cents: total.cents(),
                total_display: total.to_string(),
            })
        })
    }

    fn mutate<F>(&self, f: F) -> Result<CartResponse, ApiError>
    where
        F: FnOnce(&mut CartEngine) -> vela_core::CartResult<()>,
    {
        self.with_engine_mut(|engine| {
            f(engine)?;
            Ok(CartResponse::from(&*engine))
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
