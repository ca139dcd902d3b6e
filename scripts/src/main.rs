use clap::Parser;
use scripts::{cli::Cli, config::NetworkConfig, errors::ScriptError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        chain,
        env_dir,
        priv_key,
        rpc_url,
        project_root,
        deployments_path,
        command,
    } = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = NetworkConfig::load(&chain, &env_dir, rpc_url, priv_key)?;

    command
        .run(&config, project_root, &deployments_path)
        .await
}
