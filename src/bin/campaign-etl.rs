/// Загрузка CSV кампаний в реляционное хранилище

use anyhow::Context;

use campaign_ml::{run_etl, PipelineConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = PipelineConfig::from_args().context("loading configuration")?;
    let written = run_etl(&config)
        .with_context(|| format!("ETL from {}", config.source.display()))?;

    println!(
        "Loaded {} rows into {} ({})",
        written,
        config.store.table,
        config.store.database.display()
    );
    Ok(())
}
