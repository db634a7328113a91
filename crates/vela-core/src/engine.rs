//! # Line Mutation Engine
//!
//! The state machine governing every cart mutation, built on top of the
//! stock availability checker.
//!
//! ## Engine States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Engine State Machine                                │
//! │                                                                         │
//! │            add_line (both merge and separate valid)                     │
//! │  ┌────────┐ ───────────────────────────────────► ┌──────────────────┐  │
//! │  │  Idle  │                                      │ AwaitingMerge-   │  │
//! │  │        │ ◄─────────────────────────────────── │ Decision(payload)│  │
//! │  └────────┘   resolve (merge | separate)         └──────────────────┘  │
//! │      │        or discard                                  │            │
//! │      │                                                    │            │
//! │      ▼                                                    ▼            │
//! │  every mutating operation runs                 every OTHER mutating    │
//! │  compute → validate → commit-or-reject         entry point is refused  │
//! │                                                (MergeConflictPending)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! Mutations are all-or-nothing: every validation runs before the first
//! write, so a rejection leaves the line store byte-for-byte unchanged.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::availability::check_availability;
use crate::cart::{Cart, CartLine};
use crate::catalog::{Catalog, Package, Product};
use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::summary::{self, CartSummary};
use crate::validation::{initial_add_quantity, validate_quantity};
use crate::{MAX_LINES, MAX_TOTAL_VALUE_CENTS};

// =============================================================================
// Engine State
// =============================================================================

/// Explicit engine state. A pending merge/split decision acts as a
/// mutual-exclusion gate over all other mutating operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineState {
    /// No decision outstanding; all operations accepted.
    Idle,
    /// Waiting for the caller to choose merge or separate.
    AwaitingMergeDecision(MergeConflict),
}

/// The payload of a pending merge/split decision.
///
/// Produced when adding a product+package that already has a cart line and
/// both "extend that line" and "start a new line in another warehouse" pass
/// the availability checker. The caller must pick one (or abandon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MergeConflict {
    pub product_id: String,
    pub package_name: String,
    /// Line that would grow on a merge.
    pub existing_line_id: String,
    /// Warehouse the existing line draws from.
    pub existing_warehouse_id: String,
    /// Warehouse a separate line would draw from.
    pub alternative_warehouse_id: String,
    /// Package units the addition represents.
    pub quantity_to_add: f64,
    /// Same amount in base units.
    pub base_quantity_to_add: f64,
}

/// The two resolutions of a pending decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MergeChoice {
    /// Grow the existing line.
    Merge,
    /// Allocate from the alternative warehouse instead (growing the line
    /// already there, if any).
    Separate,
}

/// Result of an add (or of resolving a pending decision).
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddOutcome {
    /// A new line was appended.
    Added {
        #[serde(rename = "lineId")]
        line_id: String,
    },
    /// An existing line grew.
    Merged {
        #[serde(rename = "lineId")]
        line_id: String,
        quantity: f64,
    },
    /// Both options are valid; the engine is now awaiting the decision.
    DecisionRequired(MergeConflict),
}

// =============================================================================
// Cart Engine
// =============================================================================

/// The cart allocation engine.
///
/// Owns the line store exclusively; consumes the catalog snapshot injected at
/// construction (never a module-level global). Single-threaded and
/// synchronous: each call runs compute → validate → commit-or-reject to
/// completion.
#[derive(Debug, Clone)]
pub struct CartEngine {
    catalog: Catalog,
    cart: Cart,
    state: EngineState,
}

impl CartEngine {
    /// Creates an engine over a catalog snapshot with an empty cart.
    pub fn new(catalog: Catalog) -> Self {
        CartEngine {
            catalog,
            cart: Cart::new(),
            state: EngineState::Idle,
        }
    }

    /// The catalog snapshot this engine allocates against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current cart lines, insertion order.
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Current engine state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// The pending decision, if one is outstanding.
    pub fn pending_conflict(&self) -> Option<&MergeConflict> {
        match &self.state {
            EngineState::AwaitingMergeDecision(conflict) => Some(conflict),
            EngineState::Idle => None,
        }
    }

    /// Derived totals and per-line validation, recomputed from scratch.
    pub fn summary(&self) -> CartSummary {
        summary::compute_summary(&self.catalog, &self.cart)
    }

    /// Guard at the top of every mutating operation.
    fn ensure_idle(&self) -> CartResult<()> {
        match self.state {
            EngineState::Idle => Ok(()),
            EngineState::AwaitingMergeDecision(_) => Err(CartError::MergeConflictPending),
        }
    }

    // =========================================================================
    // Add-Line Workflow
    // =========================================================================

    /// Adds a product to the cart in the given package (default: the base
    /// package).
    ///
    /// ## Behavior
    /// - Quantity is one package unit, raised to the product's minimum
    ///   purchase when one unit would sit below it
    /// - An existing `(product, package)` line grows when its warehouse can
    ///   cover the addition; a different warehouse starts a new line
    /// - When BOTH are possible the cart is left untouched and a
    ///   [`MergeConflict`] is surfaced for the caller to resolve
    pub fn add_line(
        &mut self,
        product_id: &str,
        package_name: Option<&str>,
    ) -> CartResult<AddOutcome> {
        self.ensure_idle()?;

        let product = self.catalog.product(product_id)?.clone();
        let package = match package_name {
            Some(name) => product.package(name)?.clone(),
            None => product.default_package()?.clone(),
        };

        let quantity_to_add = initial_add_quantity(&product, &package);
        let base_to_add = quantity_to_add * package.factor;
        let fractional = product.package_allows_fractional(&package);

        // Untracked products never touch warehouse stock.
        if !product.track_stock {
            if let Some(existing) = self.cart.find_by_product_package(&product.id, &package.name) {
                let id = existing.id.clone();
                return self.commit_merge(&id, quantity_to_add, fractional);
            }
            return self.commit_new_line(&product, &package, quantity_to_add, None, fractional);
        }

        if let Some(existing) = self.cart.find_by_product_package(&product.id, &package.name) {
            let existing_id = existing.id.clone();
            // Tracked lines always carry a warehouse.
            let existing_wh = existing
                .warehouse_id
                .clone()
                .unwrap_or_default();

            let can_merge = check_availability(
                &self.catalog,
                self.cart.lines(),
                &product.id,
                &existing_wh,
                base_to_add,
                None,
            )
            .is_ok();
            let alternative = self.find_alternative_warehouse(&product, &existing_wh, base_to_add);

            return match (can_merge, alternative) {
                (true, Some(alternative_warehouse_id)) => {
                    let conflict = MergeConflict {
                        product_id: product.id.clone(),
                        package_name: package.name.clone(),
                        existing_line_id: existing_id,
                        existing_warehouse_id: existing_wh,
                        alternative_warehouse_id,
                        quantity_to_add,
                        base_quantity_to_add: base_to_add,
                    };
                    self.state = EngineState::AwaitingMergeDecision(conflict.clone());
                    Ok(AddOutcome::DecisionRequired(conflict))
                }
                (true, None) => self.commit_merge(&existing_id, quantity_to_add, fractional),
                (false, Some(warehouse_id)) => self.commit_separate(
                    &product,
                    &package,
                    quantity_to_add,
                    warehouse_id,
                    fractional,
                ),
                (false, None) => Err(CartError::StockInsufficient {
                    product_id: product.id.clone(),
                    warehouse: "all warehouses".to_string(),
                    requested: base_to_add,
                    available: product.total_stock(),
                }),
            };
        }

        // No existing (product, package) line: pick a warehouse.
        let warehouse_id = self
            .preferred_warehouse(&product, base_to_add)
            .ok_or_else(|| CartError::NoWarehouseAvailable {
                product_id: product.id.clone(),
            })?;
        self.commit_new_line(&product, &package, quantity_to_add, Some(warehouse_id), fractional)
    }

    /// First warehouse able to take the allocation: the warehouse already
    /// used by another line of this product wins, then catalog order.
    fn preferred_warehouse(&self, product: &Product, base_qty: f64) -> Option<String> {
        let passes = |wh: &str| {
            check_availability(&self.catalog, self.cart.lines(), &product.id, wh, base_qty, None)
                .is_ok()
        };

        if let Some(wh) = self
            .cart
            .lines_for_product(&product.id)
            .filter_map(|l| l.warehouse_id.as_deref())
            .find(|wh| passes(wh))
        {
            return Some(wh.to_string());
        }

        product
            .stock_levels
            .iter()
            .find(|s| passes(&s.warehouse_id))
            .map(|s| s.warehouse_id.clone())
    }

    /// Any warehouse other than `exclude` holding stock that can take a fresh
    /// allocation of `base_qty`.
    fn find_alternative_warehouse(
        &self,
        product: &Product,
        exclude: &str,
        base_qty: f64,
    ) -> Option<String> {
        product
            .stock_levels
            .iter()
            .filter(|s| s.warehouse_id != exclude && s.quantity > 0.0)
            .find(|s| {
                check_availability(
                    &self.catalog,
                    self.cart.lines(),
                    &product.id,
                    &s.warehouse_id,
                    base_qty,
                    None,
                )
                .is_ok()
            })
            .map(|s| s.warehouse_id.clone())
    }

    /// Grows an existing line, re-validating the combined quantity first.
    fn commit_merge(
        &mut self,
        line_id: &str,
        quantity_to_add: f64,
        fractional: bool,
    ) -> CartResult<AddOutcome> {
        let current = self.cart.line(line_id)?.quantity;
        let new_quantity = current + quantity_to_add;
        validate_quantity(new_quantity, fractional)?;

        self.cart.line_mut(line_id)?.set_quantity(new_quantity);
        Ok(AddOutcome::Merged {
            line_id: line_id.to_string(),
            quantity: new_quantity,
        })
    }

    /// Appends a new line after the line-count and quantity gates.
    fn commit_new_line(
        &mut self,
        product: &Product,
        package: &Package,
        quantity: f64,
        warehouse_id: Option<String>,
        fractional: bool,
    ) -> CartResult<AddOutcome> {
        if self.cart.len() >= MAX_LINES {
            return Err(CartError::LineLimitExceeded { max: MAX_LINES });
        }
        validate_quantity(quantity, fractional)?;

        let line = CartLine::new(product, package, quantity, warehouse_id);
        let line_id = line.id.clone();
        self.cart.push(line);
        Ok(AddOutcome::Added { line_id })
    }

    /// Lands the addition in the given warehouse.
    ///
    /// A line already occupying the `(product, package, warehouse)` slot
    /// grows; otherwise a new line is appended. Slots stay unique either way.
    fn commit_separate(
        &mut self,
        product: &Product,
        package: &Package,
        quantity: f64,
        warehouse_id: String,
        fractional: bool,
    ) -> CartResult<AddOutcome> {
        let slot = self
            .cart
            .find_slot(&product.id, &package.name, Some(&warehouse_id), None)
            .map(|l| l.id.clone());
        match slot {
            Some(slot_id) => self.commit_merge(&slot_id, quantity, fractional),
            None => {
                self.commit_new_line(product, package, quantity, Some(warehouse_id), fractional)
            }
        }
    }

    // =========================================================================
    // Merge/Split Resolver
    // =========================================================================

    /// Resolves the pending merge/split decision.
    ///
    /// The catalog is immutable and the cart was frozen while the decision
    /// was pending, so the original availability verdict still holds; only
    /// the line-count/quantity limits are re-gated here. On a rejected
    /// resolution the decision stays pending so the caller can pick the
    /// other option or discard.
    pub fn resolve_merge_conflict(&mut self, choice: MergeChoice) -> CartResult<AddOutcome> {
        let conflict = match &self.state {
            EngineState::AwaitingMergeDecision(conflict) => conflict.clone(),
            EngineState::Idle => return Err(CartError::NoPendingConflict),
        };

        let product = self.catalog.product(&conflict.product_id)?.clone();
        let package = product.package(&conflict.package_name)?.clone();
        let fractional = product.package_allows_fractional(&package);

        let outcome = match choice {
            MergeChoice::Merge => self.commit_merge(
                &conflict.existing_line_id,
                conflict.quantity_to_add,
                fractional,
            )?,
            MergeChoice::Separate => self.commit_separate(
                &product,
                &package,
                conflict.quantity_to_add,
                conflict.alternative_warehouse_id.clone(),
                fractional,
            )?,
        };

        self.state = EngineState::Idle;
        Ok(outcome)
    }

    /// Abandons the pending decision without mutating the cart.
    ///
    /// Returns whether a decision was actually outstanding.
    pub fn discard_merge_conflict(&mut self) -> bool {
        match self.state {
            EngineState::AwaitingMergeDecision(_) => {
                self.state = EngineState::Idle;
                true
            }
            EngineState::Idle => false,
        }
    }

    // =========================================================================
    // Update Operations
    // =========================================================================

    /// Sets a line's quantity (package units), revalidating stock.
    ///
    /// Setting the current quantity is a successful no-op.
    pub fn update_quantity(&mut self, line_id: &str, new_quantity: f64) -> CartResult<()> {
        self.ensure_idle()?;

        let line = self.cart.line(line_id)?.clone();
        let product = self.catalog.product(&line.product_id)?.clone();
        let package = product.package(&line.package_name)?.clone();

        validate_quantity(new_quantity, product.package_allows_fractional(&package))?;

        if let Some(warehouse_id) = line.warehouse_id.as_deref() {
            check_availability(
                &self.catalog,
                self.cart.lines(),
                &line.product_id,
                warehouse_id,
                new_quantity * line.factor,
                Some(line_id),
            )?;
        }

        self.cart.line_mut(line_id)?.set_quantity(new_quantity);
        Ok(())
    }

    /// Moves a line onto another of the product's packages.
    ///
    /// The quantity keeps its numeric value, reinterpreted in the new
    /// package's units; the base quantity is recomputed with the new factor.
    /// A collision with an existing `(product, warehouse, package)` line is
    /// a forced merge validated as one combined allocation.
    pub fn update_package(&mut self, line_id: &str, new_package_name: &str) -> CartResult<()> {
        self.ensure_idle()?;

        let line = self.cart.line(line_id)?.clone();
        let product = self.catalog.product(&line.product_id)?.clone();
        let new_package = product.package(new_package_name)?.clone();

        if new_package.name == line.package_name {
            return Ok(());
        }

        let fractional = product.package_allows_fractional(&new_package);
        validate_quantity(line.quantity, fractional)?;

        let target = self
            .cart
            .find_slot(
                &line.product_id,
                &new_package.name,
                line.warehouse_id.as_deref(),
                Some(line_id),
            )
            .map(|t| (t.id.clone(), t.quantity));

        if let Some((target_id, target_quantity)) = target {
            let combined_quantity = line.quantity + target_quantity;
            validate_quantity(combined_quantity, fractional)?;

            if let Some(warehouse_id) = line.warehouse_id.as_deref() {
                let others = self.lines_without(&[line_id, &target_id]);
                check_availability(
                    &self.catalog,
                    &others,
                    &line.product_id,
                    warehouse_id,
                    combined_quantity * new_package.factor,
                    None,
                )?;
            }

            self.cart.remove(line_id)?;
            self.cart.line_mut(&target_id)?.set_quantity(combined_quantity);
            return Ok(());
        }

        if let Some(warehouse_id) = line.warehouse_id.as_deref() {
            check_availability(
                &self.catalog,
                self.cart.lines(),
                &line.product_id,
                warehouse_id,
                line.quantity * new_package.factor,
                Some(line_id),
            )?;
        }

        self.cart
            .line_mut(line_id)?
            .set_package(&product, &new_package, line.quantity);
        Ok(())
    }

    /// Moves a line onto another warehouse, merging on collision.
    pub fn update_warehouse(&mut self, line_id: &str, new_warehouse_id: &str) -> CartResult<()> {
        self.ensure_idle()?;

        let line = self.cart.line(line_id)?.clone();
        self.catalog.warehouse(new_warehouse_id)?;

        let Some(current_warehouse) = line.warehouse_id.clone() else {
            // Untracked lines have no warehouse to move.
            return Err(CartError::NoWarehouseAvailable {
                product_id: line.product_id.clone(),
            });
        };
        if current_warehouse == new_warehouse_id {
            return Ok(());
        }

        let product = self.catalog.product(&line.product_id)?.clone();
        let package = product.package(&line.package_name)?.clone();
        let fractional = product.package_allows_fractional(&package);

        let target = self
            .cart
            .find_slot(
                &line.product_id,
                &line.package_name,
                Some(new_warehouse_id),
                Some(line_id),
            )
            .map(|t| (t.id.clone(), t.quantity));

        if let Some((target_id, target_quantity)) = target {
            let combined_quantity = line.quantity + target_quantity;
            validate_quantity(combined_quantity, fractional)?;

            let others = self.lines_without(&[line_id, &target_id]);
            check_availability(
                &self.catalog,
                &others,
                &line.product_id,
                new_warehouse_id,
                combined_quantity * line.factor,
                None,
            )?;

            self.cart.remove(line_id)?;
            self.cart.line_mut(&target_id)?.set_quantity(combined_quantity);
            return Ok(());
        }

        check_availability(
            &self.catalog,
            self.cart.lines(),
            &line.product_id,
            new_warehouse_id,
            line.base_quantity,
            Some(line_id),
        )?;

        self.cart.line_mut(line_id)?.warehouse_id = Some(new_warehouse_id.to_string());
        Ok(())
    }

    /// Removes a line unconditionally.
    ///
    /// Validation state needs no cleanup: the summary re-derives it from the
    /// line store, so a removed line's issues disappear with it.
    pub fn remove_line(&mut self, line_id: &str) -> CartResult<()> {
        self.ensure_idle()?;
        self.cart.remove(line_id)?;
        Ok(())
    }

    /// Finalizes the cart: allowed only when the summary reports no line
    /// issues and the total is within limit. Clears all lines on success and
    /// returns the finalized total.
    ///
    /// Aggregates the summary's unresolved errors rather than re-deriving
    /// its own, so the rejection reflects exactly what the cart UI already
    /// shows.
    pub fn finalize(&mut self) -> CartResult<Money> {
        self.ensure_idle()?;

        let summary = self.summary();
        if !summary.issues.is_empty() {
            return Err(CartError::FinalizeBlocked {
                issues: summary
                    .issues
                    .values()
                    .map(|issue| issue.message.clone())
                    .collect(),
            });
        }
        if summary.total_value_exceeded {
            return Err(CartError::TotalValueExceeded {
                total: Money::from_cents(summary.total_cents).to_string(),
                max: Money::from_cents(MAX_TOTAL_VALUE_CENTS).to_string(),
            });
        }

        let total = self.cart.total();
        self.cart.clear();
        Ok(total)
    }

    /// Snapshot of all lines except the given ids (merge validation input).
    fn lines_without(&self, exclude: &[&str]) -> Vec<CartLine> {
        self.cart
            .lines()
            .iter()
            .filter(|l| !exclude.contains(&l.id.as_str()))
            .cloned()
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
