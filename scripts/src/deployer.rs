//! The deploy helper, through which every contract deployment goes.
//!
//! Deployments are performed by Foundry's `forge create`, run as a subprocess
//! against the configured network. Compilation, signing, broadcasting and
//! explorer verification all happen inside forge.

use std::{
    path::PathBuf,
    process::{Command, Stdio},
    thread,
    time::Duration,
};

use tracing::{error, info, warn};

use crate::{
    config::NetworkConfig,
    constants::{CREATE_COMMAND, DEFAULT_RETRY_INTERVAL},
    errors::ScriptError,
    types::{ContractLocation, DeployedContract, ForgeCreateOutput},
};

/// A backend capable of deploying contracts from the forge project
pub trait ContractDeployer {
    /// Deploy the contract at `location` with the given constructor arguments
    fn deploy(
        &self,
        location: &ContractLocation,
        args: &[String],
    ) -> Result<DeployedContract, ScriptError>;

    /// Deploy the contract at `location` and submit its source for
    /// verification on the network's block explorer
    fn deploy_and_verify(
        &self,
        location: &ContractLocation,
        args: &[String],
    ) -> Result<DeployedContract, ScriptError>;

    /// The delay between attempts in [`retry_deploy`]
    fn retry_interval(&self) -> Duration {
        DEFAULT_RETRY_INTERVAL
    }
}

/// Deploy a contract, retrying up to `retries` times after the first failed attempt.
///
/// Only attempts that deploy nothing are retried; a deployer reports a live
/// contract as a success. The error of the final attempt is returned if none
/// succeed.
pub fn retry_deploy<D: ContractDeployer + ?Sized>(
    deployer: &D,
    retries: u32,
    location: &ContractLocation,
    args: &[String],
) -> Result<DeployedContract, ScriptError> {
    let mut attempt = 0;
    loop {
        match deployer.deploy(location, args) {
            Ok(deployed) => return Ok(deployed),
            Err(e) if attempt < retries => {
                attempt += 1;
                warn!("deploying {location} failed: {e}. Retry #{attempt} of {retries}");
                thread::sleep(deployer.retry_interval());
            }
            Err(e) => {
                error!("deploying {location} failed after {retries} retries: {e}");
                return Err(e);
            }
        }
    }
}

/// Deploys contracts by invoking `forge create`
#[derive(Clone, Debug)]
pub struct ForgeDeployer {
    /// The forge binary to invoke
    pub forge_bin: String,
    /// The root of the forge project containing the contract sources
    pub project_root: PathBuf,
    /// Network RPC URL
    pub rpc_url: String,
    /// Private key of the deployer
    pub private_key: String,
    /// Block explorer API key, required for verification
    pub etherscan_api_key: Option<String>,
}

impl ForgeDeployer {
    /// Construct a deployer targeting the given network
    pub fn new(config: &NetworkConfig, project_root: PathBuf) -> Self {
        ForgeDeployer {
            forge_bin: config.forge_bin.clone(),
            project_root,
            rpc_url: config.rpc_url.clone(),
            private_key: config.private_key.clone(),
            etherscan_api_key: config.etherscan_api_key.clone(),
        }
    }

    /// Assemble the `forge create` invocation for a deployment
    pub fn create_command(
        &self,
        location: &ContractLocation,
        args: &[String],
        verify: bool,
    ) -> Result<Command, ScriptError> {
        let mut cmd = Command::new(&self.forge_bin);
        cmd.current_dir(&self.project_root);
        cmd.stdout(Stdio::piped()).stderr(Stdio::inherit());

        cmd.arg(CREATE_COMMAND)
            .arg(location.to_string())
            .arg("--rpc-url")
            .arg(&self.rpc_url)
            .arg("--private-key")
            .arg(&self.private_key)
            .arg("--broadcast")
            .arg("--json");

        if verify {
            let api_key = self.etherscan_api_key.as_ref().ok_or_else(|| {
                ScriptError::Config("an explorer API key is required to verify".to_string())
            })?;
            cmd.arg("--verify").arg("--etherscan-api-key").arg(api_key);
        }

        // `--constructor-args` consumes every remaining argument, so it goes last
        if !args.is_empty() {
            cmd.arg("--constructor-args").args(args);
        }

        Ok(cmd)
    }

    /// Run a `forge create` invocation, returning the parsed deployment.
    ///
    /// Forge prints the deployment summary once the contract is live, before
    /// verification runs. A failed exit after the summary therefore still
    /// yields the deployed contract, marked unverified, so that it is recorded
    /// and not deployed again.
    fn run_create(
        &self,
        location: &ContractLocation,
        args: &[String],
        verify: bool,
    ) -> Result<DeployedContract, ScriptError> {
        let mut cmd = self.create_command(location, args, verify)?;
        info!("running forge create for {location}");

        let output = cmd
            .output()
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let forge_output = match parse_forge_output(&stdout) {
            Ok(forge_output) => forge_output,
            Err(_) if !output.status.success() => {
                return Err(ScriptError::ContractDeployment(format!(
                    "forge create exited with {}",
                    output.status
                )));
            }
            Err(e) => return Err(e),
        };

        if !output.status.success() {
            warn!(
                "{location} was deployed to {} but forge create exited with {}",
                forge_output.deployed_to, output.status
            );
        }

        Ok(DeployedContract::from_forge_output(
            location.clone(),
            forge_output,
            verify && output.status.success(),
        ))
    }
}

impl ContractDeployer for ForgeDeployer {
    fn deploy(
        &self,
        location: &ContractLocation,
        args: &[String],
    ) -> Result<DeployedContract, ScriptError> {
        self.run_create(location, args, false /* verify */)
    }

    fn deploy_and_verify(
        &self,
        location: &ContractLocation,
        args: &[String],
    ) -> Result<DeployedContract, ScriptError> {
        self.run_create(location, args, true /* verify */)
    }
}

/// Extract the deployment summary from the stdout of `forge create --json`.
///
/// Forge may print compiler and verification progress around the summary, so
/// the last line that parses as a summary is taken.
pub fn parse_forge_output(stdout: &str) -> Result<ForgeCreateOutput, ScriptError> {
    stdout
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<ForgeCreateOutput>(line.trim()).ok())
        .ok_or_else(|| {
            ScriptError::ContractDeployment(
                "could not find deployment summary in forge output".to_string(),
            )
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        cell::RefCell,
        ffi::OsStr,
        fs,
        path::{Path, PathBuf},
        str::FromStr,
        time::Duration,
    };

    use alloy_primitives::{address, Address, TxHash};

    use crate::{
        constants::CREATE_COMMAND,
        errors::ScriptError,
        types::{ContractLocation, DeployedContract},
    };

    use super::{parse_forge_output, retry_deploy, ContractDeployer, ForgeDeployer};

    /// The address every fake deployment lands at
    pub const FAKE_DEPLOYED_TO: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

    /// A recorded call to the fake deployer
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct RecordedDeploy {
        /// The deployed contract's location
        pub location: String,
        /// The constructor arguments passed
        pub args: Vec<String>,
        /// Whether verification was requested
        pub verify: bool,
    }

    /// A deployer that fails a fixed number of times before succeeding,
    /// recording every call it receives
    #[derive(Default)]
    pub struct FakeDeployer {
        /// Attempts left to fail before deployments succeed
        pub failures_remaining: RefCell<u32>,
        /// Every deployment requested, in order
        pub calls: RefCell<Vec<RecordedDeploy>>,
    }

    impl FakeDeployer {
        /// A deployer whose first `failures` attempts fail
        pub fn failing(failures: u32) -> Self {
            FakeDeployer {
                failures_remaining: RefCell::new(failures),
                calls: RefCell::default(),
            }
        }

        /// Record a call, failing it if failures remain
        fn record(
            &self,
            location: &ContractLocation,
            args: &[String],
            verify: bool,
        ) -> Result<DeployedContract, ScriptError> {
            self.calls.borrow_mut().push(RecordedDeploy {
                location: location.to_string(),
                args: args.to_vec(),
                verify,
            });

            let mut failures = self.failures_remaining.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                return Err(ScriptError::ContractDeployment("nonce too low".to_string()));
            }

            Ok(DeployedContract {
                location: location.clone(),
                deployer: Address::ZERO,
                deployed_to: FAKE_DEPLOYED_TO,
                transaction_hash: TxHash::ZERO,
                verified: verify,
            })
        }
    }

    impl ContractDeployer for FakeDeployer {
        fn deploy(
            &self,
            location: &ContractLocation,
            args: &[String],
        ) -> Result<DeployedContract, ScriptError> {
            self.record(location, args, false)
        }

        fn deploy_and_verify(
            &self,
            location: &ContractLocation,
            args: &[String],
        ) -> Result<DeployedContract, ScriptError> {
            self.record(location, args, true)
        }

        fn retry_interval(&self) -> Duration {
            Duration::ZERO
        }
    }

    /// A forge deployer against a local node
    fn test_deployer(etherscan_api_key: Option<&str>) -> ForgeDeployer {
        ForgeDeployer {
            forge_bin: "forge".to_string(),
            project_root: PathBuf::from("."),
            rpc_url: "http://localhost:8545".to_string(),
            private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .to_string(),
            etherscan_api_key: etherscan_api_key.map(str::to_string),
        }
    }

    /// The arguments of the `forge create` invocation for the Cre8ors contract
    fn command_args(deployer: &ForgeDeployer, args: &[String], verify: bool) -> Vec<String> {
        let location = ContractLocation::from_str("src/Cre8ors.sol:Cre8ors").unwrap();
        deployer
            .create_command(&location, args, verify)
            .unwrap()
            .get_args()
            .map(OsStr::to_string_lossy)
            .map(|s| s.into_owned())
            .collect()
    }

    #[test]
    fn test_retry_succeeds_within_budget() {
        let deployer = FakeDeployer::failing(2);
        let location = ContractLocation::from_str("src/Cre8ors.sol:Cre8ors").unwrap();

        let deployed = retry_deploy(&deployer, 2, &location, &[]).unwrap();

        assert_eq!(deployed.deployed_to, FAKE_DEPLOYED_TO);
        assert_eq!(deployer.calls.borrow().len(), 3);
    }

    #[test]
    fn test_retry_exhausted() {
        let deployer = FakeDeployer::failing(3);
        let location = ContractLocation::from_str("src/Cre8ors.sol:Cre8ors").unwrap();

        let res = retry_deploy(&deployer, 2, &location, &[]);

        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
        assert_eq!(deployer.calls.borrow().len(), 3);
    }

    #[test]
    fn test_no_retries() {
        let deployer = FakeDeployer::failing(1);
        let location = ContractLocation::from_str("src/Cre8ors.sol:Cre8ors").unwrap();

        assert!(retry_deploy(&deployer, 0, &location, &[]).is_err());
        assert_eq!(deployer.calls.borrow().len(), 1);
    }

    #[test]
    fn test_create_command_args() {
        let deployer = test_deployer(None);
        let args = command_args(&deployer, &["cre8ors".to_string(), "CRE8".to_string()], false);

        assert_eq!(args[0], "create");
        assert_eq!(args[1], "src/Cre8ors.sol:Cre8ors");
        assert!(args.contains(&"--json".to_string()));
        assert!(!args.contains(&"--verify".to_string()));
        assert_eq!(
            &args[args.len() - 3..],
            &["--constructor-args", "cre8ors", "CRE8"]
        );
    }

    #[test]
    fn test_create_command_without_args() {
        let deployer = test_deployer(None);
        let args = command_args(&deployer, &[], false);

        assert!(!args.contains(&"--constructor-args".to_string()));
    }

    #[test]
    fn test_verify_requires_api_key() {
        let location = ContractLocation::from_str("src/Transfers.sol:TransferHook").unwrap();
        let res = test_deployer(None).create_command(&location, &[], true);
        assert!(matches!(res, Err(ScriptError::Config(_))));

        let args = command_args(&test_deployer(Some("KEY")), &[], true);
        let verify_idx = args.iter().position(|a| a == "--verify").unwrap();
        assert_eq!(args[verify_idx + 1], "--etherscan-api-key");
        assert_eq!(args[verify_idx + 2], "KEY");
    }

    #[test]
    fn test_parse_forge_output() {
        let stdout = r#"Compiling 3 files with Solc 0.8.15
Compiler run successful!
{"deployer":"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266","deployedTo":"0x5FbDB2315678afecb367f032d93F642f64180aa3","transactionHash":"0x2c8d5a8f8b0c1ad5b7ea1ff7e7a1b1b9a6d2b6e1b9b8b2b0c1d9e8f7a6b5c4d3"}
"#;

        let output = parse_forge_output(stdout).unwrap();

        assert_eq!(output.deployed_to, FAKE_DEPLOYED_TO);
        assert_eq!(
            output.deployer,
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_parse_forge_output_missing_summary() {
        assert!(parse_forge_output("Compiler run successful!\n").is_err());
        assert!(parse_forge_output("").is_err());
    }

    /// The summary line printed by `forge create --json`
    const FORGE_SUMMARY: &str = r#"{"deployer":"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266","deployedTo":"0x5FbDB2315678afecb367f032d93F642f64180aa3","transactionHash":"0x2c8d5a8f8b0c1ad5b7ea1ff7e7a1b1b9a6d2b6e1b9b8b2b0c1d9e8f7a6b5c4d3"}"#;

    /// Install a stand-in for forge in `dir` that counts its invocations in
    /// `dir/calls`, prints `stdout` and exits with `exit_code`.
    ///
    /// The deployer runs `sh create ...` from `dir`, so the shell reads the
    /// script named after the `create` subcommand.
    #[cfg(unix)]
    fn fake_forge(dir: &Path, stdout: &str, exit_code: i32) -> ForgeDeployer {
        fs::write(
            dir.join(CREATE_COMMAND),
            format!("echo call >> calls\necho '{stdout}'\nexit {exit_code}\n"),
        )
        .unwrap();

        ForgeDeployer {
            forge_bin: "sh".to_string(),
            project_root: dir.to_path_buf(),
            ..test_deployer(Some("KEY"))
        }
    }

    /// How many times the stand-in forge in `dir` was invoked
    #[cfg(unix)]
    fn forge_calls(dir: &Path) -> usize {
        fs::read_to_string(dir.join("calls")).map(|s| s.lines().count()).unwrap_or(0)
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_verification_keeps_deployment() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = fake_forge(dir.path(), FORGE_SUMMARY, 1);
        let location = ContractLocation::from_str("src/Transfers.sol:TransferHook").unwrap();

        let deployed = deployer.deploy_and_verify(&location, &[]).unwrap();

        assert_eq!(deployed.deployed_to, FAKE_DEPLOYED_TO);
        assert!(!deployed.verified);
        assert_eq!(forge_calls(dir.path()), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_retry_stops_once_deployed() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = fake_forge(dir.path(), FORGE_SUMMARY, 1);
        let location = ContractLocation::from_str("src/Cre8ors.sol:Cre8ors").unwrap();

        let deployed = retry_deploy(&deployer, 2, &location, &[]).unwrap();

        assert_eq!(deployed.deployed_to, FAKE_DEPLOYED_TO);
        assert_eq!(forge_calls(dir.path()), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_forge_without_summary() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = fake_forge(dir.path(), "Error: insufficient funds", 1);
        let location = ContractLocation::from_str("src/Cre8ors.sol:Cre8ors").unwrap();

        let res = deployer.deploy(&location, &[]);

        assert!(matches!(res, Err(ScriptError::ContractDeployment(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_verification() {
        let dir = tempfile::tempdir().unwrap();
        let deployer = fake_forge(dir.path(), FORGE_SUMMARY, 0);
        let location = ContractLocation::from_str("src/Transfers.sol:TransferHook").unwrap();

        let deployed = deployer.deploy_and_verify(&location, &[]).unwrap();

        assert!(deployed.verified);
        assert_eq!(deployed.deployed_to, FAKE_DEPLOYED_TO);
    }
}
