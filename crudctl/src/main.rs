use clap::Parser;
use crudctl::{AdminSeed, Application, Config, seed_admin_account, telemetry};

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

/// Provision the configured operator and exit
async fn seed_admin(config: &Config) -> anyhow::Result<()> {
    match seed_admin_account(config).await? {
        AdminSeed::Created(_) => println!("Operator '{}' created.", config.admin_username),
        AdminSeed::AlreadyExists(_) => println!("Operator '{}' already exists.", config.admin_username),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before anything else that might build a TLS client
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = crudctl::config::Args::parse();
    let config = Config::load(&args)?;
    config.validate()?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry(config.enable_otel_export)?;
    tracing::debug!("{:?}", args);

    if args.seed_admin {
        let result = seed_admin(&config).await;
        telemetry::shutdown_telemetry();
        return result;
    }

    // Run the application with graceful shutdown on SIGTERM/Ctrl+C
    Application::new(config).await?.serve(shutdown_signal()).await
}
