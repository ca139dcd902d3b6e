//! Type definitions used throughout the scripts

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use alloy_primitives::{Address, TxHash};
use clap::ValueEnum;
use serde::Deserialize;

use crate::{
    constants::{
        ALLOWLIST_MINTER_CONTRACT_KEY, ALLOWLIST_MINTER_LOCATION, CRE8ORS_CONTRACT_KEY,
        CRE8ORS_LOCATION, TRANSFER_HOOK_CONTRACT_KEY, TRANSFER_HOOK_LOCATION,
    },
    errors::ScriptError,
};

/// The contracts managed by the deploy scripts
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContractKind {
    /// The Cre8ors collection contract
    Cre8ors,
    /// The allowlist minter contract
    AllowlistMinter,
    /// The transfer hook contract
    TransferHook,
}

impl ContractKind {
    /// The location of the contract's source in the forge project
    pub fn location(&self) -> &'static str {
        match self {
            ContractKind::Cre8ors => CRE8ORS_LOCATION,
            ContractKind::AllowlistMinter => ALLOWLIST_MINTER_LOCATION,
            ContractKind::TransferHook => TRANSFER_HOOK_LOCATION,
        }
    }

    /// The key under which the contract's address is recorded in the deployments file
    pub fn deployments_key(&self) -> &'static str {
        match self {
            ContractKind::Cre8ors => CRE8ORS_CONTRACT_KEY,
            ContractKind::AllowlistMinter => ALLOWLIST_MINTER_CONTRACT_KEY,
            ContractKind::TransferHook => TRANSFER_HOOK_CONTRACT_KEY,
        }
    }
}

impl Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::Cre8ors => write!(f, "cre8ors"),
            ContractKind::AllowlistMinter => write!(f, "allowlist-minter"),
            ContractKind::TransferHook => write!(f, "transfer-hook"),
        }
    }
}

/// A contract within the forge project, written `<path>:<name>`
/// e.g. `src/Cre8ors.sol:Cre8ors`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractLocation {
    /// The path of the Solidity source file, relative to the project root
    pub path: String,
    /// The name of the contract within the source file
    pub name: String,
}

impl FromStr for ContractLocation {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, name) = s.rsplit_once(':').ok_or_else(|| {
            ScriptError::CalldataConstruction(format!("missing contract name in `{s}`"))
        })?;

        if path.is_empty() || name.is_empty() {
            return Err(ScriptError::CalldataConstruction(format!(
                "invalid contract location `{s}`"
            )));
        }

        if !path.ends_with(".sol") {
            return Err(ScriptError::CalldataConstruction(format!(
                "`{path}` is not a Solidity source file"
            )));
        }

        Ok(ContractLocation {
            path: path.to_string(),
            name: name.to_string(),
        })
    }
}

impl Display for ContractLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.name)
    }
}

/// The JSON object printed by `forge create --json`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ForgeCreateOutput {
    /// The account that sent the deployment transaction
    pub deployer: Address,
    /// The address of the deployed contract
    pub deployed_to: Address,
    /// The hash of the deployment transaction
    pub transaction_hash: TxHash,
}

/// A handle to a successfully deployed contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedContract {
    /// The contract that was deployed
    pub location: ContractLocation,
    /// The account that sent the deployment transaction
    pub deployer: Address,
    /// The address of the deployed contract
    pub deployed_to: Address,
    /// The hash of the deployment transaction
    pub transaction_hash: TxHash,
    /// Whether the contract source was submitted for verification
    pub verified: bool,
}

impl DeployedContract {
    /// Build the handle for a deployment from forge's output
    pub fn from_forge_output(
        location: ContractLocation,
        output: ForgeCreateOutput,
        verified: bool,
    ) -> Self {
        DeployedContract {
            location,
            deployer: output.deployer,
            deployed_to: output.deployed_to,
            transaction_hash: output.transaction_hash,
            verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ContractKind, ContractLocation};

    #[test]
    fn test_parse_location() {
        let location = ContractLocation::from_str("src/minter/AllowlistMinter.sol:AllowlistMinter")
            .unwrap();

        assert_eq!(location.path, "src/minter/AllowlistMinter.sol");
        assert_eq!(location.name, "AllowlistMinter");
        assert_eq!(
            location.to_string(),
            "src/minter/AllowlistMinter.sol:AllowlistMinter"
        );
    }

    #[test]
    fn test_parse_invalid_locations() {
        assert!(ContractLocation::from_str("src/Cre8ors.sol").is_err());
        assert!(ContractLocation::from_str("src/Cre8ors.sol:").is_err());
        assert!(ContractLocation::from_str(":Cre8ors").is_err());
        assert!(ContractLocation::from_str("src/Cre8ors.rs:Cre8ors").is_err());
    }

    #[test]
    fn test_contract_kind_locations_parse() {
        for kind in [
            ContractKind::Cre8ors,
            ContractKind::AllowlistMinter,
            ContractKind::TransferHook,
        ] {
            assert!(ContractLocation::from_str(kind.location()).is_ok());
        }
    }
}
