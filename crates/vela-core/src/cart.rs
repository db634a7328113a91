//! # Cart Line Store
//!
//! The ordered collection of cart lines owned by the mutation engine.
//!
//! ## Design Notes
//! - Insertion order is kept for display; the domain imposes no ordering
//! - Lines are unique by `(product_id, package_name, warehouse_id)`;
//!   an addition that would collide merges instead of duplicating
//! - Prices are frozen at the moment a line is created: the cart displays
//!   consistent numbers even if the catalog is refreshed for the next session
//! - `base_quantity` is derived state. Every quantity or package change goes
//!   through [`CartLine::set_quantity`] / [`CartLine::set_package`] so the
//!   two fields can never drift apart

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{Package, Product};
use crate::error::{CartError, CartResult};
use crate::money::Money;

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the cart: a product, in a package size, drawn from a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Opaque line identity (UUID v4), stable for the session.
    pub id: String,

    /// Product this line sells.
    pub product_id: String,

    /// Which of the product's packages the quantity counts.
    pub package_name: String,

    /// Quantity in package units. Whole-valued unless the package is the
    /// factor-1 package of a measurable base unit.
    pub quantity: f64,

    /// Quantity in base units: `quantity × factor`. Derived, never edited
    /// directly.
    pub base_quantity: f64,

    /// Package factor frozen on the line so base recomputation never needs
    /// a catalog round-trip.
    pub factor: f64,

    /// Price of one package unit in cents, frozen at creation.
    pub unit_price_cents: i64,

    /// Warehouse the stock is drawn from. `None` for untracked products.
    pub warehouse_id: Option<String>,

    /// When this line was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new line from catalog data, freezing price and factor.
    pub fn new(
        product: &Product,
        package: &Package,
        quantity: f64,
        warehouse_id: Option<String>,
    ) -> Self {
        CartLine {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            package_name: package.name.clone(),
            quantity,
            base_quantity: quantity * package.factor,
            factor: package.factor,
            unit_price_cents: product.package_price(package).cents(),
            warehouse_id,
            added_at: Utc::now(),
        }
    }

    /// Sets the quantity and recomputes the derived base quantity.
    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
        self.base_quantity = quantity * self.factor;
    }

    /// Moves the line onto another of the product's packages.
    ///
    /// Quantity is reinterpreted in the new package's units; base quantity
    /// and unit price are recomputed.
    pub fn set_package(&mut self, product: &Product, package: &Package, quantity: f64) {
        self.package_name = package.name.clone();
        self.factor = package.factor;
        self.unit_price_cents = product.package_price(package).cents();
        self.set_quantity(quantity);
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total: unit price × quantity, rounded to a cent.
    pub fn line_total(&self) -> Money {
        self.unit_price().line_total(self.quantity)
    }

    /// Whether this line draws from the given warehouse.
    pub fn is_in_warehouse(&self, warehouse_id: &str) -> bool {
        self.warehouse_id.as_deref() == Some(warehouse_id)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart: an insertion-ordered store of lines.
///
/// ## Invariants
/// - Lines are unique by `(product_id, package_name, warehouse_id)`
/// - Only the mutation engine writes this store
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    created_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    /// All lines, insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up a line by id.
    pub fn line(&self, id: &str) -> CartResult<&CartLine> {
        self.lines
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| CartError::LineNotFound(id.to_string()))
    }

    /// Mutable lookup by id.
    pub fn line_mut(&mut self, id: &str) -> CartResult<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| CartError::LineNotFound(id.to_string()))
    }

    /// First line matching `(product, package)`, any warehouse.
    pub fn find_by_product_package(
        &self,
        product_id: &str,
        package_name: &str,
    ) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id && l.package_name == package_name)
    }

    /// Line occupying an exact `(product, package, warehouse)` slot,
    /// optionally ignoring one line id (the line being moved).
    pub fn find_slot(
        &self,
        product_id: &str,
        package_name: &str,
        warehouse_id: Option<&str>,
        exclude_line_id: Option<&str>,
    ) -> Option<&CartLine> {
        self.lines.iter().find(|l| {
            l.product_id == product_id
                && l.package_name == package_name
                && l.warehouse_id.as_deref() == warehouse_id
                && Some(l.id.as_str()) != exclude_line_id
        })
    }

    /// Lines selling a given product, any package or warehouse.
    pub fn lines_for_product<'a>(
        &'a self,
        product_id: &'a str,
    ) -> impl Iterator<Item = &'a CartLine> + 'a {
        self.lines.iter().filter(move |l| l.product_id == product_id)
    }

    /// Appends a line. The engine is responsible for collision checks.
    pub fn push(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    /// Removes a line by id, returning it.
    pub fn remove(&mut self, id: &str) -> CartResult<CartLine> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| CartError::LineNotFound(id.to_string()))?;
        Ok(self.lines.remove(idx))
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Some(Utc::now());
    }

    /// Number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Monetary total over all lines.
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Package;

    fn product() -> Product {
        let mut p = Product::basic("prod_1", "Mineral Water 1L", 120);
        p.packages = vec![
            Package::base("UN"),
            Package {
                name: "CX6".to_string(),
                factor: 6.0,
                ean: None,
                override_price_cents: Some(660),
            },
        ];
        p
    }

    #[test]
    fn test_line_freezes_price_and_derives_base() {
        let p = product();
        let cx6 = p.package("CX6").unwrap().clone();
        let line = CartLine::new(&p, &cx6, 2.0, Some("wh_1".to_string()));

        assert_eq!(line.quantity, 2.0);
        assert_eq!(line.base_quantity, 12.0);
        assert_eq!(line.unit_price_cents, 660);
        assert_eq!(line.line_total().cents(), 1320);
    }

    #[test]
    fn test_set_quantity_keeps_base_consistent() {
        let p = product();
        let cx6 = p.package("CX6").unwrap().clone();
        let mut line = CartLine::new(&p, &cx6, 2.0, None);

        line.set_quantity(5.0);
        assert_eq!(line.base_quantity, 30.0);
        assert!((line.base_quantity - line.quantity * line.factor).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_package_recomputes_price_and_base() {
        let p = product();
        let cx6 = p.package("CX6").unwrap().clone();
        let un = p.package("UN").unwrap().clone();
        let mut line = CartLine::new(&p, &cx6, 2.0, None);

        line.set_package(&p, &un, 12.0);
        assert_eq!(line.package_name, "UN");
        assert_eq!(line.base_quantity, 12.0);
        assert_eq!(line.unit_price_cents, 120);
    }

    #[test]
    fn test_cart_lookup_and_removal() {
        let p = product();
        let un = p.package("UN").unwrap().clone();
        let mut cart = Cart::new();
        let line = CartLine::new(&p, &un, 3.0, Some("wh_1".to_string()));
        let id = line.id.clone();
        cart.push(line);

        assert_eq!(cart.len(), 1);
        assert!(cart.line(&id).is_ok());
        assert!(cart
            .find_by_product_package("prod_1", "UN")
            .is_some());
        assert!(cart
            .find_slot("prod_1", "UN", Some("wh_1"), None)
            .is_some());
        assert!(cart
            .find_slot("prod_1", "UN", Some("wh_1"), Some(&id))
            .is_none());

        let removed = cart.remove(&id).unwrap();
        assert_eq!(removed.id, id);
        assert!(cart.is_empty());
        assert!(matches!(cart.remove(&id), Err(CartError::LineNotFound(_))));
    }

    #[test]
    fn test_lines_for_product_spans_packages_and_warehouses() {
        let p = product();
        let un = p.package("UN").unwrap().clone();
        let cx6 = p.package("CX6").unwrap().clone();
        let mut cart = Cart::new();
        cart.push(CartLine::new(&p, &un, 3.0, Some("wh_1".to_string())));
        cart.push(CartLine::new(&p, &cx6, 1.0, Some("wh_2".to_string())));

        let ids: Vec<_> = cart.lines_for_product("prod_1").map(|l| l.id.clone()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(cart.lines_for_product("prod_9").count(), 0);
    }

    #[test]
    fn test_cart_total() {
        let p = product();
        let un = p.package("UN").unwrap().clone();
        let cx6 = p.package("CX6").unwrap().clone();
        let mut cart = Cart::new();
        cart.push(CartLine::new(&p, &un, 3.0, None)); // 3 × 1.20
        cart.push(CartLine::new(&p, &cx6, 1.0, None)); // 6.60

        assert_eq!(cart.total().cents(), 360 + 660);
    }
}
