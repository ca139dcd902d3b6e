//! Constants used in the deploy scripts

use std::time::Duration;

use alloy_primitives::{address, Address, B256};

// -------------
// | Contracts |
// -------------

/// The location of the Cre8ors collection contract in the forge project
pub const CRE8ORS_LOCATION: &str = "src/Cre8ors.sol:Cre8ors";

/// The location of the allowlist minter contract in the forge project
pub const ALLOWLIST_MINTER_LOCATION: &str = "src/minter/AllowlistMinter.sol:AllowlistMinter";

/// The location of the transfer hook contract in the forge project
pub const TRANSFER_HOOK_LOCATION: &str = "src/Transfers.sol:TransferHook";

/// The number of times a failed deployment is retried
pub const DEPLOY_RETRIES: u32 = 2;

/// The default delay between deployment attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(2);

// ----------------------------
// | Cre8ors Constructor Args |
// ----------------------------

/// The name of the collection
pub const CRE8ORS_NAME: &str = "cre8ors";

/// The symbol of the collection
pub const CRE8ORS_SYMBOL: &str = "CRE8";

/// The initial owner of the collection (cre8ors.eth)
pub const CRE8ORS_INITIAL_OWNER: Address = address!("4D977d9aEceC3776DD73F2f9080C9AF3BC31f505");

/// The recipient of sale proceeds (sweetman.eth)
pub const CRE8ORS_FUNDS_RECIPIENT: Address = address!("cfBf34d385EA2d5Eb947063b67eA226dcDA3DC38");

/// The maximum number of tokens in the collection
pub const CRE8ORS_EDITION_SIZE: u64 = 8888;

/// The royalty, in basis points
pub const CRE8ORS_ROYALTY_BPS: u16 = 888;

/// The metadata renderer, deployed by Zora
pub const CRE8ORS_METADATA_RENDERER: Address =
    address!("209511E9fe3c526C61B7691B9308830C1d1612bE");

/// The public sale price, in wei (0.15 ETH)
pub const PUBLIC_SALE_PRICE: u128 = 150_000_000_000_000_000;

/// The ERC20 token accepted as payment, the zero address meaning ETH
pub const ERC20_PAYMENT_TOKEN: Address = Address::ZERO;

/// The maximum number of tokens a single address may purchase
pub const MAX_SALE_PURCHASE_PER_ADDRESS: u32 = 18;

/// Friday, August 4, 2023 12:50:00 PM ET
pub const PUBLIC_SALE_START: u64 = 1691167800;

/// Friday, August 4, 2023 12:40:00 PM ET
pub const PRESALE_START: u64 = 1691167200;

/// Sale end timestamp for a sale that never closes
pub const SALE_END_FOREVER: u64 = u64::MAX;

// ---------------
// | Post-deploy |
// ---------------

/// The admin role on the Cre8ors contract.
///
/// This is the `DEFAULT_ADMIN_ROLE` of OpenZeppelin's `AccessControl`
pub const ADMIN_ROLE: B256 = B256::ZERO;

/// The `setHook` index of the before-token-transfer hook
pub const BEFORE_TOKEN_TRANSFER_HOOK: u8 = 0;

/// The `setHook` index of the after-token-transfer hook
pub const AFTER_TOKEN_TRANSFER_HOOK: u8 = 1;

// -----------
// | Tooling |
// -----------

/// The environment variable naming the target network
pub const CHAIN_ENV_VAR: &str = "CHAIN";

/// The environment variable holding the network RPC URL
pub const RPC_URL_ENV_VAR: &str = "RPC_URL";

/// The environment variable holding the deployer's private key
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_KEY";

/// The environment variable holding the block explorer API key
pub const ETHERSCAN_API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";

/// The environment variable overriding the forge binary
pub const FORGE_BIN_ENV_VAR: &str = "FORGE_BIN";

/// The prefix of the per-network environment files, e.g. `.env.sepolia`
pub const ENV_FILE_PREFIX: &str = ".env.";

/// The name of the forge binary
pub const FORGE_COMMAND: &str = "forge";

/// The forge subcommand used to deploy a single contract
pub const CREATE_COMMAND: &str = "create";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The Cre8ors contract key in the `deployments.json` file
pub const CRE8ORS_CONTRACT_KEY: &str = "cre8ors_contract";

/// The allowlist minter contract key in the `deployments.json` file
pub const ALLOWLIST_MINTER_CONTRACT_KEY: &str = "allowlist_minter_contract";

/// The transfer hook contract key in the `deployments.json` file
pub const TRANSFER_HOOK_CONTRACT_KEY: &str = "transfer_hook_contract";
