//! Native emulations of the contracts the harness deploys.
//!
//! The devnet has no VM. A deployed contract runs only if its name matches
//! one of these emulations; everything else deploys but reverts on call.

mod nft;
mod receiver;

pub use nft::{
    NftContract, ALREADY_MINTED, APPROVE_TO_OWNER, NOT_APPROVED_OR_OWNER, NOT_OWNER_OF_TOKEN,
    ONLY_OWNER_CAN_MINT, ON_NFT_RECEIVED, RECEIVER_REJECTED, TOKEN_BURNED, TOKEN_DOES_NOT_EXIST,
};
pub use receiver::ReceiverContract;

use crate::error::{ExecError, ExecResult};
use crate::state::{CallContext, CallEnv};
use harness_aci::Value;
use harness_primitives::AccountAddress;
use num_bigint::BigInt;

/// Contract behavior implemented in Rust.
pub trait NativeContract: Sized {
    /// Contract name the emulation is selected by.
    const NAME: &'static str;

    /// Runs the constructor.
    fn init(ctx: &CallContext, args: &[Value]) -> ExecResult<Self>;

    /// Runs one entry point.
    fn call(
        &mut self,
        env: &mut CallEnv<'_>,
        ctx: &CallContext,
        function: &str,
        args: &[Value],
    ) -> ExecResult<Value>;
}

/// Emulation state of a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Native {
    Nft(NftContract),
    Receiver(ReceiverContract),
}

impl Native {
    /// Constructs the emulation for `contract`, `None` when there is none.
    ///
    /// # Errors
    ///
    /// Constructor failures.
    pub fn deploy(contract: &str, ctx: &CallContext, args: &[Value]) -> ExecResult<Option<Self>> {
        if contract == NftContract::NAME {
            NftContract::init(ctx, args).map(|c| Some(Self::Nft(c)))
        } else if contract == ReceiverContract::NAME {
            ReceiverContract::init(ctx, args).map(|c| Some(Self::Receiver(c)))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn call(
        &mut self,
        env: &mut CallEnv<'_>,
        ctx: &CallContext,
        function: &str,
        args: &[Value],
    ) -> ExecResult<Value> {
        match self {
            Self::Nft(contract) => contract.call(env, ctx, function, args),
            Self::Receiver(contract) => contract.call(env, ctx, function, args),
        }
    }
}

/// Positional argument access with uniform error messages.
pub(crate) struct Args<'a> {
    function: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// # Errors
    ///
    /// `ExecError::Error` when the count is not `arity`.
    pub(crate) fn new(function: &'a str, values: &'a [Value], arity: usize) -> ExecResult<Self> {
        if values.len() != arity {
            return Err(ExecError::error(format!(
                "{function} expects {arity} argument(s), got {}",
                values.len()
            )));
        }
        Ok(Self { function, values })
    }

    fn bad(&self, index: usize, expected: &str) -> ExecError {
        ExecError::error(format!(
            "argument {index} of {} must be {expected}",
            self.function
        ))
    }

    pub(crate) fn address(&self, index: usize) -> ExecResult<AccountAddress> {
        match self.values.get(index) {
            Some(Value::Address(address)) => Ok(*address),
            Some(Value::Contract(contract)) => Ok(contract.as_account()),
            _ => Err(self.bad(index, "an address")),
        }
    }

    pub(crate) fn int(&self, index: usize) -> ExecResult<BigInt> {
        match self.values.get(index) {
            Some(Value::Int(i)) => Ok(i.clone()),
            _ => Err(self.bad(index, "an int")),
        }
    }

    pub(crate) fn bool(&self, index: usize) -> ExecResult<bool> {
        match self.values.get(index) {
            Some(Value::Bool(b)) => Ok(*b),
            _ => Err(self.bad(index, "a bool")),
        }
    }

    pub(crate) fn string(&self, index: usize) -> ExecResult<String> {
        match self.values.get(index) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(self.bad(index, "a string")),
        }
    }
}

fn unknown_function(contract: &str, function: &str) -> ExecError {
    ExecError::error(format!("{contract} has no entrypoint '{function}'"))
}
