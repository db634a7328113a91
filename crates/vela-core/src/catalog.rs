//! # Catalog Snapshot
//!
//! Read-only product and warehouse definitions for one cart session.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Package      │   │   Warehouse     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  name           │   │  id             │       │
//! │  │  base_unit      │   │  factor         │   │  name           │       │
//! │  │  price_cents    │   │  ean            │   │  kind           │       │
//! │  │  stock_levels ──┼─┐ │  override_price │   └─────────────────┘       │
//! │  └─────────────────┘ │ └─────────────────┘                             │
//! │                      │ ┌─────────────────┐                             │
//! │                      └►│   StockLevel    │  quantity in BASE units,    │
//! │                        │  warehouse_id   │  one entry per warehouse,   │
//! │                        │  quantity       │  catalog order preserved    │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Semantics
//! The catalog is a point-in-time read. It is handed to the engine by value
//! (explicit dependency injection - no module-level singletons) and treated
//! as immutable for the whole cart session. A production deployment layering
//! this over a live inventory service would revalidate at commit time; that
//! is out of scope here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CartError, CartResult};
use crate::money::Money;

// =============================================================================
// Base Unit
// =============================================================================

/// The canonical unit of measure a product's stock is counted in.
///
/// ## Measurable vs Countable
/// KG/L/M/M2/M3 are *measurable*: a customer can buy 2.5 KG, so the factor-1
/// package of such a product accepts fractional quantities. UN is countable
/// and only ever sells whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum BaseUnit {
    /// Discrete units (pieces).
    Un,
    /// Kilograms.
    Kg,
    /// Liters.
    L,
    /// Meters.
    M,
    /// Square meters.
    M2,
    /// Cubic meters.
    M3,
}

impl BaseUnit {
    /// Whether the factor-1 package of this unit accepts fractional quantities.
    #[inline]
    pub const fn allows_fractional(&self) -> bool {
        !matches!(self, BaseUnit::Un)
    }

    /// Display symbol, as printed on labels and in messages.
    pub const fn symbol(&self) -> &'static str {
        match self {
            BaseUnit::Un => "UN",
            BaseUnit::Kg => "KG",
            BaseUnit::L => "L",
            BaseUnit::M => "M",
            BaseUnit::M2 => "M2",
            BaseUnit::M3 => "M3",
        }
    }
}

impl Default for BaseUnit {
    fn default() -> Self {
        BaseUnit::Un
    }
}

// =============================================================================
// Package
// =============================================================================

/// A sellable unit bundling `factor` base units (e.g., a case of 6).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Package {
    /// Package name, unique within a product ("UN", "CX6", "PAL48"...).
    pub name: String,

    /// Number of base units per package. Always > 0; the factor-1 package
    /// is always present and represents the base unit itself.
    pub factor: f64,

    /// Barcode (EAN-13) for this package size, if printed.
    pub ean: Option<String>,

    /// Price override in cents. When absent the package sells at
    /// `product.price_cents × factor`.
    pub override_price_cents: Option<i64>,
}

impl Package {
    /// Creates the factor-1 package representing the base unit.
    pub fn base(name: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            factor: 1.0,
            ean: None,
            override_price_cents: None,
        }
    }

    /// Creates a multi-unit package without a price override.
    pub fn bundle(name: impl Into<String>, factor: f64) -> Self {
        Package {
            name: name.into(),
            factor,
            ean: None,
            override_price_cents: None,
        }
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// Stock held by one warehouse for one product, in base units.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockLevel {
    pub warehouse_id: String,
    pub quantity: f64,
}

// =============================================================================
// Batches (informational)
// =============================================================================

/// Lot consumption policy recorded on the product.
///
/// ## Note
/// Display-only. The engine allocates against warehouse totals and never
/// selects which batch satisfies a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    Fifo,
    Lifo,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        BatchPolicy::Fifo
    }
}

/// A lot/expiry record shown alongside the product. Informational only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Batch {
    pub code: String,
    pub quantity: f64,
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name shown in the catalog and on the cart.
    pub name: String,

    /// Price of ONE base unit, in cents.
    pub price_cents: i64,

    /// Canonical unit of measure for stock quantities.
    pub base_unit: BaseUnit,

    /// Whether stock is tracked per warehouse for this product.
    /// Untracked products sell without any warehouse assignment.
    pub track_stock: bool,

    /// Smallest base-unit amount that may be sold at once.
    ///
    /// Absent means no minimum applies for blocking purposes; the initial
    /// add still sizes the first line to at least one package unit.
    pub min_purchase_quantity: Option<f64>,

    /// Sellable packages, catalog order. The factor-1 package comes first.
    pub packages: Vec<Package>,

    /// Per-warehouse stock in base units, catalog order. Order matters:
    /// warehouse selection walks this list front to back.
    pub stock_levels: Vec<StockLevel>,

    /// Lot consumption policy (display only, see [`BatchPolicy`]).
    pub batch_policy: BatchPolicy,

    /// Lot/expiry records (display only).
    pub batches: Vec<Batch>,
}

impl Product {
    /// Creates a minimal untracked product with a single base-unit package.
    ///
    /// Handy for products sold without inventory control (services, made to
    /// order) and for examples.
    pub fn basic(id: impl Into<String>, name: impl Into<String>, price_cents: i64) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price_cents,
            base_unit: BaseUnit::Un,
            track_stock: false,
            min_purchase_quantity: None,
            packages: vec![Package::base("UN")],
            stock_levels: Vec::new(),
            batch_policy: BatchPolicy::default(),
            batches: Vec::new(),
        }
    }

    /// Returns the base-unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Looks up a package by name.
    pub fn package(&self, name: &str) -> CartResult<&Package> {
        self.packages
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| CartError::PackageNotFound {
                product_id: self.id.clone(),
                package: name.to_string(),
            })
    }

    /// The default package: first in catalog order (the base unit).
    pub fn default_package(&self) -> CartResult<&Package> {
        self.packages
            .first()
            .ok_or_else(|| CartError::PackageNotFound {
                product_id: self.id.clone(),
                package: "<default>".to_string(),
            })
    }

    /// Unit price of a package: its override, else base price × factor.
    pub fn package_price(&self, package: &Package) -> Money {
        match package.override_price_cents {
            Some(cents) => Money::from_cents(cents),
            None => self.price().scale(package.factor),
        }
    }

    /// Stock held in one warehouse, in base units. Zero when unlisted.
    pub fn stock_in(&self, warehouse_id: &str) -> f64 {
        self.stock_levels
            .iter()
            .find(|s| s.warehouse_id == warehouse_id)
            .map(|s| s.quantity)
            .unwrap_or(0.0)
    }

    /// Total stock across all warehouses, in base units.
    pub fn total_stock(&self) -> f64 {
        self.stock_levels.iter().map(|s| s.quantity).sum()
    }

    /// Minimum purchase for blocking purposes: 0 when absent.
    #[inline]
    pub fn min_purchase(&self) -> f64 {
        self.min_purchase_quantity.unwrap_or(0.0)
    }

    /// Minimum purchase for initial-add sizing: 1 when absent or zero.
    #[inline]
    pub fn min_purchase_or_one(&self) -> f64 {
        let min = self.min_purchase();
        if min > 0.0 {
            min
        } else {
            1.0
        }
    }

    /// Whether a package of this product accepts fractional quantities.
    ///
    /// Only the factor-1 package of a measurable base unit does.
    pub fn package_allows_fractional(&self, package: &Package) -> bool {
        package.factor == 1.0 && self.base_unit.allows_fractional()
    }
}

// =============================================================================
// Warehouse
// =============================================================================

/// Warehouse category, shown next to the name in the warehouse picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WarehouseKind {
    /// Storefront stock, sellable over the counter.
    Store,
    /// Distribution depot, ships to the customer.
    Depot,
}

/// A stock-holding location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub kind: WarehouseKind,
}

impl Warehouse {
    /// Creates a storefront warehouse.
    pub fn store(id: impl Into<String>, name: impl Into<String>) -> Self {
        Warehouse {
            id: id.into(),
            name: name.into(),
            kind: WarehouseKind::Store,
        }
    }

    /// Creates a distribution depot.
    pub fn depot(id: impl Into<String>, name: impl Into<String>) -> Self {
        Warehouse {
            id: id.into(),
            name: name.into(),
            kind: WarehouseKind::Depot,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The read-only catalog snapshot the engine allocates against.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Catalog {
    products: Vec<Product>,
    warehouses: Vec<Warehouse>,
}

impl Catalog {
    /// Builds a snapshot from product and warehouse definitions.
    pub fn new(products: Vec<Product>, warehouses: Vec<Warehouse>) -> Self {
        Catalog {
            products,
            warehouses,
        }
    }

    /// Looks up a product by id.
    pub fn product(&self, id: &str) -> CartResult<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CartError::ProductNotFound(id.to_string()))
    }

    /// Looks up a warehouse by id.
    pub fn warehouse(&self, id: &str) -> CartResult<&Warehouse> {
        self.warehouses
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| CartError::WarehouseNotFound(id.to_string()))
    }

    /// Display name for a warehouse id; falls back to the raw id so error
    /// messages stay printable even for stale snapshots.
    pub fn warehouse_name(&self, id: &str) -> String {
        self.warehouse(id)
            .map(|w| w.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    /// All products, catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All warehouses, catalog order.
    pub fn warehouses(&self) -> &[Warehouse] {
        &self.warehouses
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked_product() -> Product {
        Product {
            id: "prod_1".to_string(),
            name: "Mineral Water 1L".to_string(),
            price_cents: 120,
            base_unit: BaseUnit::Un,
            track_stock: true,
            min_purchase_quantity: Some(12.0),
            packages: vec![
                Package::base("UN"),
                Package {
                    name: "CX6".to_string(),
                    factor: 6.0,
                    ean: Some("5601234567890".to_string()),
                    override_price_cents: Some(660),
                },
            ],
            stock_levels: vec![
                StockLevel {
                    warehouse_id: "wh_1".to_string(),
                    quantity: 240.0,
                },
                StockLevel {
                    warehouse_id: "wh_2".to_string(),
                    quantity: 20.0,
                },
            ],
            batch_policy: BatchPolicy::Fifo,
            batches: Vec::new(),
        }
    }

    #[test]
    fn test_base_unit_fractional() {
        assert!(!BaseUnit::Un.allows_fractional());
        assert!(BaseUnit::Kg.allows_fractional());
        assert!(BaseUnit::M3.allows_fractional());
        assert_eq!(BaseUnit::Kg.symbol(), "KG");
    }

    #[test]
    fn test_package_lookup() {
        let product = tracked_product();
        assert_eq!(product.package("CX6").unwrap().factor, 6.0);
        assert!(matches!(
            product.package("PAL48"),
            Err(CartError::PackageNotFound { .. })
        ));
        assert_eq!(product.default_package().unwrap().name, "UN");
    }

    #[test]
    fn test_package_price_override_and_scaling() {
        let product = tracked_product();
        // CX6 carries an override: 6.60, not 6 × 1.20 = 7.20
        let cx6 = product.package("CX6").unwrap();
        assert_eq!(product.package_price(cx6).cents(), 660);
        // UN has no override: base price
        let un = product.package("UN").unwrap();
        assert_eq!(product.package_price(un).cents(), 120);
    }

    #[test]
    fn test_stock_lookups() {
        let product = tracked_product();
        assert_eq!(product.stock_in("wh_1"), 240.0);
        assert_eq!(product.stock_in("wh_2"), 20.0);
        assert_eq!(product.stock_in("wh_9"), 0.0);
        assert_eq!(product.total_stock(), 260.0);
    }

    #[test]
    fn test_min_purchase_defaults() {
        let product = tracked_product();
        assert_eq!(product.min_purchase(), 12.0);

        let basic = Product::basic("prod_x", "Gift Wrap", 250);
        assert_eq!(basic.min_purchase(), 0.0);
        assert_eq!(basic.min_purchase_or_one(), 1.0);
    }

    #[test]
    fn test_fractional_only_on_base_package_of_measurable_unit() {
        let mut bulk = Product::basic("prod_k", "Arborio Rice", 450);
        bulk.base_unit = BaseUnit::Kg;
        bulk.packages = vec![Package::base("KG"), Package::bundle("SACO5", 5.0)];

        let kg = bulk.package("KG").unwrap().clone();
        let saco = bulk.package("SACO5").unwrap().clone();
        assert!(bulk.package_allows_fractional(&kg));
        assert!(!bulk.package_allows_fractional(&saco));

        let unit = tracked_product();
        let un = unit.package("UN").unwrap().clone();
        assert!(!unit.package_allows_fractional(&un));
    }

    #[test]
    fn test_catalog_lookups() {
        let catalog = Catalog::new(
            vec![tracked_product()],
            vec![
                Warehouse::store("wh_1", "Main Store"),
                Warehouse::depot("wh_2", "Depot North"),
            ],
        );

        assert_eq!(catalog.product("prod_1").unwrap().name, "Mineral Water 1L");
        assert!(matches!(
            catalog.product("prod_9"),
            Err(CartError::ProductNotFound(_))
        ));
        assert_eq!(catalog.warehouse("wh_2").unwrap().kind, WarehouseKind::Depot);
        assert_eq!(catalog.warehouse_name("wh_1"), "Main Store");
        assert_eq!(catalog.warehouse_name("wh_404"), "wh_404");
    }
}
