//! Pullsheet binary - runs the order pipeline against an exported sheet.
//!
//! Usage: `pullsheet <orders.csv> [report title]`
//!
//! Without arguments the binary still bootstraps the database and seeds the
//! menu, which is handy for preparing a fresh install.

use pullsheet::config::database::{create_connection, create_tables};
use pullsheet::config::menu::{load_config, seed_menu};
use pullsheet::core::backstock::load_available_backstock;
use pullsheet::core::reference::{
    load_flavor_info, load_flavor_mapping, load_header_mapping, load_protein_info,
};
use pullsheet::core::report::{build_order_report, save_report};
use pullsheet::errors::Result;
use pullsheet::intake::read_order_csv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging, honoring RUST_LOG when set
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 2. Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // 3. Connect to the database and ensure the schema exists
    let db = create_connection().await?;
    create_tables(&db).await?;
    info!("Database ready");

    // 4. Seed the menu reference data on a fresh install
    let menu_path =
        std::env::var("PULLSHEET_MENU").unwrap_or_else(|_| "menu.toml".to_string());
    if std::path::Path::new(&menu_path).exists() {
        let menu = load_config(&menu_path)?;
        let inserted = seed_menu(&db, &menu).await?;
        if inserted > 0 {
            info!("Seeded {inserted} menu rows from {menu_path}");
        }
    } else {
        warn!("Menu file {menu_path} not found; skipping seeding");
    }

    // 5. Without an order sheet there is nothing further to do
    let Some(sheet_path) = std::env::args().nth(1) else {
        info!("No order sheet given; database is bootstrapped");
        return Ok(());
    };
    let title = std::env::args()
        .nth(2)
        .unwrap_or_else(|| format!("Orders {}", chrono::Utc::now().format("%Y-%m-%d")));

    // 6. Read the sheet and load the reference-data snapshots
    let rows = read_order_csv(&sheet_path)?;
    info!("Read {} rows from {sheet_path}", rows.len());

    let headers = load_header_mapping(&db).await?;
    let flavors = load_flavor_mapping(&db).await?;
    let protein_info = load_protein_info(&db).await?;
    let flavor_info = load_flavor_info(&db).await?;
    let lots = load_available_backstock(&db).await?;

    // 7. Run the pipeline
    let report = build_order_report(&rows, &headers, &flavors, &protein_info, &flavor_info, &lots)?;

    if !report.order_errors.is_empty() {
        for problem in &report.order_errors {
            warn!("{problem}");
        }
        error!(
            "{} row(s) need fixing before this sheet can be processed",
            report.order_errors.len()
        );
        return Ok(());
    }

    for meal in &report.meals {
        info!(
            "{} / {}: cook {} ({}oz ordered, {}oz from backstock)",
            meal.protein_label, meal.flavor_label, meal.weight_lb_oz, meal.ordered_weight,
            meal.backstock_weight
        );
    }

    // 8. Persist the report and consume the allocated backstock
    let saved = save_report(&db, &title, &report).await?;
    info!(
        "Report {} saved: {} orders, {} meals, {:.1}oz total cooking weight",
        saved.id, report.stats.num_orders, report.stats.num_meals,
        report.stats.total_protein_weight
    );

    Ok(())
}
