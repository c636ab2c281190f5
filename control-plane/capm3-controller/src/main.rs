use capm3_controller::{config::ControllerConfig, init_tracing, runtime};
use envconfig::Envconfig;
use kube::Client;
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    // kube's rustls stack needs a process-wide provider when none is set.
    if let Err(e) = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::aws_lc_rs::default_provider(),
    ) {
        tracing::debug!(
            ?e,
            "CryptoProvider already installed or incompatible; proceeding"
        );
    }

    let cfg = ControllerConfig::init_from_env()?;
    info!(?cfg, "Starting Metal3MachineTemplate controller");

    let client = Client::try_default().await?;
    runtime::run_all(client, cfg).await
}
