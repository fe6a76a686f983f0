//! SeaORM integration example: annotate every statement on a connection.
//!
//! Run with: cargo run --example sea_orm --features sea-orm

use intermix::{AnnotateExt, QueryLabels};
use sea_orm::{ConnectionTrait, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,intermix=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/test".into());

    tracing::info!("Connecting to database...");

    let db = Database::connect(&database_url).await?;

    let labels = QueryLabels::new("demo-app", 1)
        .with_dag("nightly_rollup")
        .with_task("sum_invoices");
    let annotated_db = db.with_annotation(labels);

    // Every statement through annotated_db now carries the metadata
    // comment. Example query (would work with actual entities):
    //
    // let invoices = Invoices::find()
    //     .filter(invoices::Column::Open.eq(true))
    //     .all(&annotated_db)
    //     .await?;

    annotated_db.execute_unprepared("select 1;").await?;

    tracing::info!("Database connection established with annotation enabled");

    // You can also access the inner connection if needed
    let _inner = annotated_db.inner();

    Ok(())
}
