use dotenvy::dotenv;
use erp_ledger::{
    config::{self, database},
    core::{facade::Facade, supplier},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Failed to load application configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let database_url = database::get_database_url();
    if database_url == database::DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to {}: {}", database_url, e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog on first run
    if let Some(catalog) = &app_config.seed {
        config::seed::seed_catalog(&db, catalog)
            .await
            .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    }

    // 6. Reorder anything running low, then report revenue
    let facade = Facade::new(db);
    for message in facade.reorder_sweep().await? {
        info!("{}", message);
    }

    let report = facade.sales_performance_report(None, None).await?;
    for row in &report.store_sales {
        info!("{}: {:.2}", row.store_name, row.total_sales);
    }
    for row in &report.product_sales {
        info!(
            "{} / {}: {:.2}",
            row.store_name,
            row.product_name.as_deref().unwrap_or("(untracked)"),
            row.total_sales
        );
    }

    for s in supplier::list_suppliers(facade.connection()).await? {
        let performance = supplier::supplier_performance(
            facade.connection(),
            s.id,
            app_config.performance_window_days,
        )
        .await?;
        info!(
            "{}: {} delivered orders in {} days, {:.2} total",
            s.name,
            performance.delivered_orders,
            performance.window_days,
            performance.delivered_amount
        );
    }

    Ok(())
}
