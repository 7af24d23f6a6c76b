/// API сервер для классификатора кампаний

use anyhow::Context;

use campaign_ml::server::{app, AppState};
use campaign_ml::{CampaignClassifier, PipelineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = PipelineConfig::from_args().context("loading configuration")?;
    let artifact = &config.training.artifact;
    let classifier = CampaignClassifier::load(artifact)
        .with_context(|| format!("loading model artifact {}", artifact.display()))?;
    tracing::info!(
        "Loaded model trained at {} with {} features",
        classifier.trained_at(),
        classifier.features().n_features()
    );

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str())
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    tracing::info!("Server listening on http://{}", config.server.bind);
    axum::serve(listener, app(AppState::new(classifier))).await?;
    Ok(())
}
