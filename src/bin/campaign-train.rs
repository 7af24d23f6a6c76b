/// Обучение классификатора успешности и вывод метрик

use anyhow::Context;

use campaign_ml::{run_training, PipelineConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = PipelineConfig::from_args().context("loading configuration")?;
    let report = run_training(&config)
        .with_context(|| format!("training on {}", config.source.display()))?;

    println!("{report}");
    println!("Model saved to {}", config.training.artifact.display());
    Ok(())
}
