//! Utilities for the deploy scripts.

use std::{
    fs::{self, File},
    io::Read,
    path::PathBuf,
    str::FromStr,
};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::Address;
use json::JsonValue;

use crate::{constants::DEPLOYMENTS_KEY, errors::ScriptError};

/// Sets up the client with which to interact with deployed contracts,
/// signing transactions with the given private key
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<DynProvider, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let url =
        Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    Ok(DynProvider::new(provider))
}

/// Read and parse a JSON file
pub fn get_json_from_file(file_path: &str) -> Result<JsonValue, ScriptError> {
    let mut file_contents = String::new();
    File::open(file_path)
        .map_err(|e| ScriptError::ReadFile(e.to_string()))?
        .read_to_string(&mut file_contents)
        .map_err(|e| ScriptError::ReadFile(e.to_string()))?;

    json::parse(&file_contents).map_err(|e| ScriptError::ReadFile(e.to_string()))
}

/// Read the address recorded under `contract_key` in the deployments file
pub fn parse_addr_from_deployments_file(
    file_path: &str,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let parsed_json = get_json_from_file(file_path)?;

    Address::from_str(
        parsed_json[DEPLOYMENTS_KEY][contract_key]
            .as_str()
            .ok_or_else(|| {
                ScriptError::ReadFile(format!(
                    "no `{contract_key}` address in deployments file {file_path}"
                ))
            })?,
    )
    .map_err(|e| ScriptError::ReadFile(e.to_string()))
}

/// Use the given address if present, otherwise fall back to the one recorded
/// under `contract_key` in the deployments file
pub fn address_or_deployed(
    address: Option<Address>,
    file_path: &str,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    match address {
        Some(address) => Ok(address),
        None => parse_addr_from_deployments_file(file_path, contract_key),
    }
}

/// Record `address` under `contract_key` in the deployments file, creating
/// the file if needed
pub fn write_deployed_address(
    file_path: &str,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    // If the file doesn't exist, create it
    if !PathBuf::from(file_path).exists() {
        fs::write(file_path, "{}").map_err(|e| ScriptError::WriteFile(e.to_string()))?;
    }
    let mut parsed_json = get_json_from_file(file_path)?;

    parsed_json[DEPLOYMENTS_KEY][contract_key] = JsonValue::String(format!("{address:#x}"));

    fs::write(file_path, json::stringify_pretty(parsed_json, 4))
        .map_err(|e| ScriptError::WriteFile(e.to_string()))?;

    Ok(())
}
