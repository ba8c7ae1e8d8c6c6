//! Devnet world state and the environment contract code runs in.

use crate::error::{ExecError, ExecResult};
use crate::native::Native;
use harness_aci::Value;
use harness_primitives::{AccountAddress, ContractAddress, EncodedBytes};
use std::collections::HashMap;
use tracing::trace;

/// Gas charged for entering a contract.
pub const CALL_GAS: u64 = 500;
/// Gas charged for a contract creation, on top of the constructor call.
pub const CREATE_GAS: u64 = 2_000;

/// Account state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Account {
    pub balance: u128,
    /// Nonce of the last accepted transaction.
    pub nonce: u64,
}

/// A deployed contract.
#[derive(Debug, Clone)]
pub struct DeployedContract {
    pub owner: AccountAddress,
    pub bytecode: EncodedBytes,
    /// Main contract name from the bytecode.
    pub name: String,
    /// Emulation state; `None` for contracts the devnet cannot run.
    pub native: Option<Native>,
}

/// Everything a transaction can change. Cloned per transaction so a failed
/// execution can be dropped wholesale.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub accounts: HashMap<AccountAddress, Account>,
    pub contracts: HashMap<ContractAddress, DeployedContract>,
}

/// Call stack and gas meter of one execution.
pub struct CallEnv<'a> {
    world: &'a mut World,
    origin: AccountAddress,
    stack: Vec<ContractAddress>,
    gas_limit: u64,
    gas_used: u64,
}

impl<'a> CallEnv<'a> {
    pub fn new(world: &'a mut World, origin: AccountAddress, gas_limit: u64) -> Self {
        Self {
            world,
            origin,
            stack: Vec::new(),
            gas_limit,
            gas_used: 0,
        }
    }

    /// Account that signed the transaction.
    #[must_use]
    pub const fn origin(&self) -> &AccountAddress {
        &self.origin
    }

    #[must_use]
    pub const fn gas_used(&self) -> u64 {
        self.gas_used
    }

    /// Whether `address` names a deployed contract.
    #[must_use]
    pub fn is_contract(&self, address: &AccountAddress) -> bool {
        self.world.contracts.contains_key(&address.as_contract())
    }

    /// Mutable access for contract creation.
    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// # Errors
    ///
    /// `ExecError::Error` when the gas limit is exceeded.
    pub fn charge(&mut self, gas: u64) -> ExecResult<()> {
        self.gas_used = self.gas_used.saturating_add(gas);
        if self.gas_used > self.gas_limit {
            return Err(ExecError::error(format!(
                "Out of gas: {} used, limit {}",
                self.gas_used, self.gas_limit
            )));
        }
        Ok(())
    }

    /// Calls `function` on `contract` on behalf of `caller`.
    ///
    /// The callee's emulation is moved out of the world for the duration of
    /// the call, and a contract already on the stack cannot be entered again.
    ///
    /// # Errors
    ///
    /// Whatever the callee raises; `ExecError::Revert` for reentrant calls
    /// and contracts without an emulation.
    pub fn call(
        &mut self,
        caller: AccountAddress,
        contract: ContractAddress,
        function: &str,
        args: &[Value],
    ) -> ExecResult<Value> {
        self.charge(CALL_GAS)?;
        if self.stack.contains(&contract) {
            return Err(ExecError::revert(format!("Reentrant call into {contract}")));
        }
        let deployed = self
            .world
            .contracts
            .get_mut(&contract)
            .ok_or_else(|| ExecError::error(format!("No contract at {contract}")))?;
        let Some(mut native) = deployed.native.take() else {
            return Err(ExecError::revert(format!(
                "{} cannot be executed on the devnet",
                deployed.name
            )));
        };

        trace!(target: "harness_devnet", %contract, function, depth = self.stack.len(), "call");
        self.stack.push(contract);
        let ctx = CallContext {
            caller,
            contract,
            origin: self.origin,
        };
        let result = native.call(self, &ctx, function, args);
        self.stack.pop();

        if let Some(deployed) = self.world.contracts.get_mut(&contract) {
            deployed.native = Some(native);
        }
        result
    }
}

/// Who is calling which contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Immediate caller: the signer, or the calling contract as an account.
    pub caller: AccountAddress,
    pub contract: ContractAddress,
    pub origin: AccountAddress,
}
