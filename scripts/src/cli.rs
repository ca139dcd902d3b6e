//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use alloy_primitives::{Address, B256};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    commands::{
        check_deployment, deploy_allowlist_minter, deploy_cre8ors, deploy_transfers,
        grant_admin_role, set_transfer_hooks,
    },
    config::NetworkConfig,
    constants::{
        ALLOWLIST_MINTER_CONTRACT_KEY, CHAIN_ENV_VAR, CRE8ORS_CONTRACT_KEY,
        DEFAULT_DEPLOYMENTS_PATH, TRANSFER_HOOK_CONTRACT_KEY,
    },
    deployer::{ContractDeployer, ForgeDeployer},
    errors::ScriptError,
    types::{ContractKind, DeployedContract},
    utils::{
        address_or_deployed, parse_addr_from_deployments_file, setup_client,
        write_deployed_address,
    },
};

/// Deploy and configure the Cre8ors contracts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the target network, selecting the `.env.<CHAIN>` file to load
    #[arg(long, env = CHAIN_ENV_VAR)]
    pub chain: String,

    /// Directory containing the per-network environment files
    #[arg(long, default_value = ".")]
    pub env_dir: PathBuf,

    /// Private key of the deployer, overriding `PRIVATE_KEY`
    #[arg(short, long)]
    pub priv_key: Option<String>,

    /// Network RPC URL, overriding `RPC_URL`
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// Root of the forge project containing the contract sources
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Path to a `deployments.json` file
    #[arg(short, long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: String,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy and configuration scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the Cre8ors collection contract
    DeployCre8ors(DeployCre8orsArgs),
    /// Deploy the allowlist minter
    DeployAllowlistMinter(DeployAllowlistMinterArgs),
    /// Deploy and verify the transfer hook contract
    DeployTransfers,
    /// Grant `ADMIN_ROLE` on the Cre8ors contract
    GrantAdminRole(GrantAdminRoleArgs),
    /// Register the transfer hook on the Cre8ors contract
    SetTransferHooks(SetTransferHooksArgs),
    /// Check that a recorded deployment has code on chain
    CheckDeployment(CheckDeploymentArgs),
}

impl Command {
    /// Run the script against the configured network
    pub async fn run(
        self,
        config: &NetworkConfig,
        project_root: PathBuf,
        deployments_path: &str,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployCre8ors(args) => {
                deploy_blocking(config, project_root, deployments_path, move |deployer, path| {
                    run_deploy_cre8ors(&args, deployer, path)
                })
                .await
            }
            Command::DeployAllowlistMinter(args) => {
                deploy_blocking(config, project_root, deployments_path, move |deployer, path| {
                    run_deploy_allowlist_minter(&args, deployer, path)
                })
                .await
            }
            Command::DeployTransfers => {
                deploy_blocking(config, project_root, deployments_path, |deployer, path| {
                    run_deploy_transfers(deployer, path)
                })
                .await
            }
            Command::GrantAdminRole(args) => {
                let (cre8ors, account) = args.resolve(deployments_path)?;
                let client = setup_client(&config.private_key, &config.rpc_url)?;
                grant_admin_role(client, cre8ors, account).await
            }
            Command::SetTransferHooks(args) => {
                let (cre8ors, hook) = args.resolve(deployments_path)?;
                let client = setup_client(&config.private_key, &config.rpc_url)?;
                set_transfer_hooks(client, cre8ors, hook).await
            }
            Command::CheckDeployment(args) => {
                let address = parse_addr_from_deployments_file(
                    deployments_path,
                    args.contract.deployments_key(),
                )?;
                info!("checking {} deployment at {address}", args.contract);
                let client = setup_client(&config.private_key, &config.rpc_url)?;
                check_deployment(client, address).await
            }
        }
    }
}

/// Run a deploy script with a [`ForgeDeployer`] on tokio's blocking pool,
/// since forge runs synchronously and retries sleep between attempts
async fn deploy_blocking<F>(
    config: &NetworkConfig,
    project_root: PathBuf,
    deployments_path: &str,
    deploy: F,
) -> Result<(), ScriptError>
where
    F: FnOnce(&ForgeDeployer, &str) -> Result<(), ScriptError> + Send + 'static,
{
    let deployer = ForgeDeployer::new(config, project_root);
    let deployments_path = deployments_path.to_string();

    tokio::task::spawn_blocking(move || deploy(&deployer, &deployments_path))
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
}

/// Deploy the Cre8ors contract and record it in the deployments file
pub fn run_deploy_cre8ors(
    args: &DeployCre8orsArgs,
    deployer: &impl ContractDeployer,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let deployed = deploy_cre8ors(deployer, args.merkle_root)?;
    record_deployment(deployments_path, CRE8ORS_CONTRACT_KEY, &deployed)
}

/// Deploy the allowlist minter and record it in the deployments file.
///
/// The Cre8ors address defaults to the one recorded in the deployments file.
pub fn run_deploy_allowlist_minter(
    args: &DeployAllowlistMinterArgs,
    deployer: &impl ContractDeployer,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let cre8ors = address_or_deployed(args.cre8ors, deployments_path, CRE8ORS_CONTRACT_KEY)?;
    let deployed = deploy_allowlist_minter(
        deployer,
        cre8ors,
        args.minter_utility,
        args.collection_holder_mint,
        args.friends_and_family_minter,
    )?;
    record_deployment(deployments_path, ALLOWLIST_MINTER_CONTRACT_KEY, &deployed)
}

/// Deploy and verify the transfer hook and record it in the deployments file
pub fn run_deploy_transfers(
    deployer: &impl ContractDeployer,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let deployed = deploy_transfers(deployer)?;
    record_deployment(deployments_path, TRANSFER_HOOK_CONTRACT_KEY, &deployed)
}

/// Record a deployed contract's address in the deployments file
fn record_deployment(
    deployments_path: &str,
    contract_key: &str,
    deployed: &DeployedContract,
) -> Result<(), ScriptError> {
    write_deployed_address(deployments_path, contract_key, deployed.deployed_to)?;
    info!(
        "recorded {} (tx {:#x}) in {deployments_path}",
        deployed.location, deployed.transaction_hash
    );

    Ok(())
}

/// Deploy the Cre8ors collection contract
#[derive(Args)]
pub struct DeployCre8orsArgs {
    /// Merkle root of the presale allowlist, in hex
    #[arg(short, long)]
    pub merkle_root: B256,
}

/// Deploy the allowlist minter
#[derive(Args)]
pub struct DeployAllowlistMinterArgs {
    /// Cre8ors contract address in hex, defaults to the recorded deployment
    #[arg(long)]
    pub cre8ors: Option<Address>,

    /// Minter utility contract address in hex
    #[arg(long)]
    pub minter_utility: Address,

    /// Collection holder mint contract address in hex
    #[arg(long)]
    pub collection_holder_mint: Address,

    /// Friends and family minter contract address in hex
    #[arg(long)]
    pub friends_and_family_minter: Address,
}

/// Grant `ADMIN_ROLE` on the Cre8ors contract
#[derive(Args)]
pub struct GrantAdminRoleArgs {
    /// Cre8ors contract address in hex, defaults to the recorded deployment
    #[arg(long)]
    pub cre8ors: Option<Address>,

    /// Account to grant the role to, defaults to the recorded allowlist minter
    #[arg(long)]
    pub account: Option<Address>,
}

impl GrantAdminRoleArgs {
    /// The Cre8ors contract and the account to grant the role to, falling
    /// back to the deployments file for any that were not given
    pub fn resolve(&self, deployments_path: &str) -> Result<(Address, Address), ScriptError> {
        let cre8ors = address_or_deployed(self.cre8ors, deployments_path, CRE8ORS_CONTRACT_KEY)?;
        let account =
            address_or_deployed(self.account, deployments_path, ALLOWLIST_MINTER_CONTRACT_KEY)?;

        Ok((cre8ors, account))
    }
}

/// Register the transfer hook on the Cre8ors contract
#[derive(Args)]
pub struct SetTransferHooksArgs {
    /// Cre8ors contract address in hex, defaults to the recorded deployment
    #[arg(long)]
    pub cre8ors: Option<Address>,

    /// Transfer hook contract address in hex, defaults to the recorded deployment
    #[arg(long)]
    pub hook: Option<Address>,
}

impl SetTransferHooksArgs {
    /// The Cre8ors contract and the hook to register, falling back to the
    /// deployments file for any that were not given
    pub fn resolve(&self, deployments_path: &str) -> Result<(Address, Address), ScriptError> {
        let cre8ors = address_or_deployed(self.cre8ors, deployments_path, CRE8ORS_CONTRACT_KEY)?;
        let hook = address_or_deployed(self.hook, deployments_path, TRANSFER_HOOK_CONTRACT_KEY)?;

        Ok((cre8ors, hook))
    }
}

/// Check that a recorded deployment has code on chain
#[derive(Args)]
pub struct CheckDeploymentArgs {
    /// The contract to check
    #[arg(short, long)]
    pub contract: ContractKind,
}
