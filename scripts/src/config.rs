//! Loading of the per-network configuration.
//!
//! Each network has its own environment file, `.env.<CHAIN>`, holding the RPC
//! URL, deployer key and explorer API key for that network. Variables already
//! set in the process environment take precedence over the file.

use std::{
    env,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    constants::{
        ENV_FILE_PREFIX, ETHERSCAN_API_KEY_ENV_VAR, FORGE_BIN_ENV_VAR, FORGE_COMMAND,
        PRIVATE_KEY_ENV_VAR, RPC_URL_ENV_VAR,
    },
    errors::ScriptError,
};

/// The resolved configuration for the target network
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// The name of the network
    pub chain: String,
    /// Network RPC URL
    pub rpc_url: String,
    /// Private key of the deployer
    pub private_key: String,
    /// Block explorer API key, used to verify contracts
    pub etherscan_api_key: Option<String>,
    /// The forge binary to invoke
    pub forge_bin: String,
}

impl NetworkConfig {
    /// Load the environment file for `chain` from `env_dir` and resolve the
    /// network configuration, preferring the given overrides where set
    pub fn load(
        chain: &str,
        env_dir: &Path,
        rpc_url: Option<String>,
        private_key: Option<String>,
    ) -> Result<Self, ScriptError> {
        let env_file = load_env_file(env_dir, chain)?;
        info!("loaded network config from {}", env_file.display());

        Self::from_lookup(chain, rpc_url, private_key, |key| env::var(key).ok())
    }

    /// Resolve the network configuration, reading unset values through `lookup`
    pub fn from_lookup<F>(
        chain: &str,
        rpc_url: Option<String>,
        private_key: Option<String>,
        lookup: F,
    ) -> Result<Self, ScriptError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                ScriptError::Config(format!("`{key}` is not set for network `{chain}`"))
            })
        };

        let rpc_url = match rpc_url {
            Some(url) => url,
            None => required(RPC_URL_ENV_VAR)?,
        };
        let private_key = match private_key {
            Some(key) => key,
            None => required(PRIVATE_KEY_ENV_VAR)?,
        };

        Ok(NetworkConfig {
            chain: chain.to_string(),
            rpc_url,
            private_key,
            etherscan_api_key: lookup(ETHERSCAN_API_KEY_ENV_VAR),
            forge_bin: lookup(FORGE_BIN_ENV_VAR).unwrap_or_else(|| FORGE_COMMAND.to_string()),
        })
    }
}

/// The path of the environment file for `chain`
pub fn env_file_path(env_dir: &Path, chain: &str) -> Result<PathBuf, ScriptError> {
    let valid = !chain.is_empty()
        && chain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ScriptError::Config(format!("invalid network name `{chain}`")));
    }

    Ok(env_dir.join(format!("{ENV_FILE_PREFIX}{chain}")))
}

/// Load the variables in the environment file for `chain` into the process
/// environment, returning the path of the file
pub fn load_env_file(env_dir: &Path, chain: &str) -> Result<PathBuf, ScriptError> {
    let path = env_file_path(env_dir, chain)?;
    dotenvy::from_path(&path)
        .map_err(|e| ScriptError::Config(format!("{}: {e}", path.display())))?;

    Ok(path)
}
