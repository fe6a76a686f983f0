//! Basic example showing how to annotate SQL text.
//!
//! Run with: cargo run --example basic

use intermix::QueryLabels;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,intermix=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let labels = QueryLabels::new("demo-app", 1)
        .with_dag("nightly_rollup")
        .with_task("sum_invoices");

    // The macro captures this exact call site: file, line, function.
    let annotated = intermix::annotate!("select * from invoices;", labels);
    tracing::info!(%annotated, "annotated query");

    // Annotating again is a no-op: the existing annotation is detected.
    let again = intermix::annotate!(annotated, labels);
    assert_eq!(again, annotated);

    // The embedded record decodes back for diagnostics.
    let token = intermix::extract_token(&annotated).expect("token present");
    let record = intermix::decode(token).expect("token decodes");
    tracing::info!(
        function = %record.function,
        file = %record.file,
        line = %record.linenumber,
        "decoded call site"
    );

    // Option: force re-annotation of already-annotated SQL.
    // let labels = labels.with_override(true);

    // Option: attach free-form metadata.
    // let labels = labels.with_meta_entry("team", "data-eng");
}
