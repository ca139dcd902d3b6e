//! Implementations of the various deploy scripts

use std::str::FromStr;

use alloy::providers::{DynProvider, Provider};
use alloy_primitives::{aliases::U104, Address, B256};
use itertools::Itertools;
use tracing::info;

use crate::{
    constants::{
        ADMIN_ROLE, AFTER_TOKEN_TRANSFER_HOOK, BEFORE_TOKEN_TRANSFER_HOOK,
        CRE8ORS_EDITION_SIZE, CRE8ORS_FUNDS_RECIPIENT, CRE8ORS_INITIAL_OWNER,
        CRE8ORS_METADATA_RENDERER, CRE8ORS_NAME, CRE8ORS_ROYALTY_BPS, CRE8ORS_SYMBOL,
        DEPLOY_RETRIES, ERC20_PAYMENT_TOKEN, MAX_SALE_PURCHASE_PER_ADDRESS, PRESALE_START,
        PUBLIC_SALE_PRICE, PUBLIC_SALE_START, SALE_END_FOREVER,
    },
    deployer::{retry_deploy, ContractDeployer},
    errors::ScriptError,
    solidity::{Cre8orsContract, SalesConfiguration},
    types::{ContractKind, ContractLocation, DeployedContract},
};

// ----------------
// | Deploy Steps |
// ----------------

/// Deploy the Cre8ors collection contract, with `presale_merkle_root`
/// gating the presale
pub fn deploy_cre8ors(
    deployer: &impl ContractDeployer,
    presale_merkle_root: B256,
) -> Result<DeployedContract, ScriptError> {
    info!("deploying Cre8ors");
    let location = ContractLocation::from_str(ContractKind::Cre8ors.location())?;
    let args = cre8ors_constructor_args(presale_merkle_root);

    let deployed = retry_deploy(deployer, DEPLOY_RETRIES, &location, &args)?;
    info!("[deployed] {location}");
    info!("deployed cre8ors to {}", deployed.deployed_to);

    Ok(deployed)
}

/// Deploy the allowlist minter for the given Cre8ors contract
pub fn deploy_allowlist_minter(
    deployer: &impl ContractDeployer,
    cre8ors: Address,
    minter_utility: Address,
    collection_holder_mint: Address,
    friends_and_family_minter: Address,
) -> Result<DeployedContract, ScriptError> {
    info!("deploying allowlist minter");
    let location = ContractLocation::from_str(ContractKind::AllowlistMinter.location())?;
    let args = [
        cre8ors,
        minter_utility,
        collection_holder_mint,
        friends_and_family_minter,
    ]
    .iter()
    .map(|addr| format!("{addr:#x}"))
    .collect_vec();

    let deployed = retry_deploy(deployer, DEPLOY_RETRIES, &location, &args)?;
    info!("[deployed] {location}");
    info!("deployed allowlist minter to {}", deployed.deployed_to);
    info!("make sure to call grantRole with ADMIN_ROLE on cre8ors contract");

    Ok(deployed)
}

/// Deploy the transfer hook contract and verify its source
pub fn deploy_transfers(
    deployer: &impl ContractDeployer,
) -> Result<DeployedContract, ScriptError> {
    info!("deploying Transfer Hook");
    let location = ContractLocation::from_str(ContractKind::TransferHook.location())?;

    let deployed = deployer.deploy_and_verify(&location, &[])?;
    info!("deployed transfer hook to {}", deployed.deployed_to);
    info!("make sure to call cre8ors.setHook(0) for beforeTokenTransferHook");
    info!("make sure to call cre8ors.setHook(1) for afterTokenTransferHook");

    Ok(deployed)
}

/// The sale configuration the Cre8ors collection launches with
pub fn cre8ors_sales_config(presale_merkle_root: B256) -> SalesConfiguration {
    SalesConfiguration {
        publicSalePrice: U104::from(PUBLIC_SALE_PRICE),
        erc20PaymentToken: ERC20_PAYMENT_TOKEN,
        maxSalePurchasePerAddress: MAX_SALE_PURCHASE_PER_ADDRESS,
        publicSaleStart: PUBLIC_SALE_START,
        publicSaleEnd: SALE_END_FOREVER,
        presaleStart: PRESALE_START,
        presaleEnd: SALE_END_FOREVER,
        presaleMerkleRoot: presale_merkle_root,
    }
}

/// Render a sale configuration as a Solidity tuple literal
pub fn sales_config_tuple(config: &SalesConfiguration) -> String {
    let fields = [
        config.publicSalePrice.to_string(),
        format!("{:#x}", config.erc20PaymentToken),
        config.maxSalePurchasePerAddress.to_string(),
        config.publicSaleStart.to_string(),
        config.publicSaleEnd.to_string(),
        config.presaleStart.to_string(),
        config.presaleEnd.to_string(),
        format!("{:#x}", config.presaleMerkleRoot),
    ];

    format!("({})", fields.iter().join(","))
}

/// The constructor arguments of the Cre8ors collection contract, in order
pub fn cre8ors_constructor_args(presale_merkle_root: B256) -> Vec<String> {
    let sales_config = cre8ors_sales_config(presale_merkle_root);

    vec![
        CRE8ORS_NAME.to_string(),
        CRE8ORS_SYMBOL.to_string(),
        format!("{CRE8ORS_INITIAL_OWNER:#x}"),
        format!("{CRE8ORS_FUNDS_RECIPIENT:#x}"),
        CRE8ORS_EDITION_SIZE.to_string(),
        CRE8ORS_ROYALTY_BPS.to_string(),
        sales_config_tuple(&sales_config),
        format!("{CRE8ORS_METADATA_RENDERER:#x}"),
    ]
}

// ---------------------
// | Post-deploy Steps |
// ---------------------

/// Grant `ADMIN_ROLE` on the Cre8ors contract to `account`
pub async fn grant_admin_role(
    client: DynProvider,
    cre8ors: Address,
    account: Address,
) -> Result<(), ScriptError> {
    let contract = Cre8orsContract::new(cre8ors, client);

    info!("granting ADMIN_ROLE on {cre8ors:#x} to {account:#x}");
    contract
        .grantRole(ADMIN_ROLE, account)
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    let granted = contract
        .hasRole(ADMIN_ROLE, account)
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
        ._0;

    if !granted {
        return Err(ScriptError::ContractInteraction(format!(
            "{account:#x} does not hold ADMIN_ROLE after grant"
        )));
    }

    Ok(())
}

/// Register `hook` as both the before- and after-token-transfer hook on the
/// Cre8ors contract
pub async fn set_transfer_hooks(
    client: DynProvider,
    cre8ors: Address,
    hook: Address,
) -> Result<(), ScriptError> {
    let contract = Cre8orsContract::new(cre8ors, client);

    for hook_type in [BEFORE_TOKEN_TRANSFER_HOOK, AFTER_TOKEN_TRANSFER_HOOK] {
        info!("calling cre8ors.setHook({hook_type}) with {hook:#x}");
        contract
            .setHook(hook_type, hook)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    }

    Ok(())
}

/// Ensure that the chain has contract code at `address`
pub async fn check_deployment(
    client: DynProvider,
    address: Address,
) -> Result<(), ScriptError> {
    let code = client
        .get_code_at(address)
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if code.is_empty() {
        return Err(ScriptError::ContractInteraction(format!(
            "no contract code at {address:#x}"
        )));
    }

    info!("found {} bytes of contract code at {address:#x}", code.len());
    Ok(())
}
