//! End-to-end session walkthrough.
//!
//! Builds a small two-warehouse catalog, drives the cart through an add,
//! a merge/split decision, a quantity edit and a finalize, and prints the
//! resulting receipt. Run with:
//!
//! ```sh
//! RUST_LOG=vela=debug cargo run -p vela-session --example pos_session
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;

use vela_core::{AddOutcome, Catalog, MergeChoice, Package, Product, StockLevel, Warehouse};
use vela_session::CartSession;

fn stock(warehouse_id: &str, quantity: f64) -> StockLevel {
    StockLevel {
        warehouse_id: warehouse_id.to_string(),
        quantity,
    }
}

fn demo_catalog() -> Catalog {
    let mut water = Product::basic("prod_1", "Mineral Water 1L", 120);
    water.track_stock = true;
    water.min_purchase_quantity = Some(12.0);
    water.packages = vec![Package::base("UN"), Package::bundle("CX12", 12.0)];
    water.stock_levels = vec![stock("wh_1", 240.0), stock("wh_2", 20.0)];

    let mut soda = Product::basic("prod_4", "Orange Soda 330ml", 250);
    soda.track_stock = true;
    soda.packages = vec![Package::base("UN"), Package::bundle("CX6", 6.0)];
    soda.stock_levels = vec![stock("wh_1", 240.0), stock("wh_2", 60.0)];

    Catalog::new(
        vec![water, soda],
        vec![
            Warehouse::store("wh_1", "Main Store"),
            Warehouse::depot("wh_2", "Depot North"),
        ],
    )
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,vela=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let session = CartSession::new(demo_catalog());

    // Water sizes itself to the minimum purchase (12 UN).
    let response = session.add_line("prod_1", None).unwrap();
    info!(outcome = ?response.outcome, "added water");

    // Two six-packs of soda: the second add can merge into the existing
    // line or open a separate line in the depot, so a decision comes back.
    session.add_line("prod_4", Some("CX6")).unwrap();
    let response = session.add_line("prod_4", Some("CX6")).unwrap();
    if let AddOutcome::DecisionRequired(conflict) = &response.outcome {
        info!(
            existing = %conflict.existing_warehouse_id,
            alternative = %conflict.alternative_warehouse_id,
            "merge/split decision required; merging"
        );
        session.resolve_merge_conflict(MergeChoice::Merge).unwrap();
    }

    let cart = session.cart();
    for line in &cart.lines {
        info!(
            product = %line.product_id,
            package = %line.package_name,
            quantity = line.quantity,
            warehouse = ?line.warehouse_id,
            "cart line"
        );
    }
    info!(
        total_cents = cart.summary.total_cents,
        ready = cart.summary.is_ready(),
        "cart summary"
    );

    let receipt = session.finalize().unwrap();
    info!(total = %receipt.total_display, "sale finalized");
}
