use super::nft::ON_NFT_RECEIVED;
use super::{unknown_function, Args, NativeContract};
use crate::error::ExecResult;
use crate::state::{CallContext, CallEnv};
use harness_aci::Value;
use harness_primitives::AccountAddress;
use num_bigint::BigInt;

/// A contract that accepts every token sent to it with a safe transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverContract {
    /// (token contract, sender, token id), oldest first.
    received: Vec<(AccountAddress, AccountAddress, BigInt)>,
}

impl ReceiverContract {
    const RECEIVED_COUNT: &'static str = "received_count";
}

impl NativeContract for ReceiverContract {
    const NAME: &'static str = "ExampleContract";

    fn init(_ctx: &CallContext, args: &[Value]) -> ExecResult<Self> {
        Args::new("init", args, 0)?;
        Ok(Self::default())
    }

    fn call(
        &mut self,
        _env: &mut CallEnv<'_>,
        ctx: &CallContext,
        function: &str,
        args: &[Value],
    ) -> ExecResult<Value> {
        match function {
            ON_NFT_RECEIVED => {
                let args = Args::new(function, args, 4)?;
                self.received
                    .push((ctx.caller, args.address(1)?, args.int(2)?));
                Ok(Value::Bool(true))
            }
            Self::RECEIVED_COUNT => {
                Args::new(function, args, 0)?;
                Ok(Value::int(self.received.len() as u64))
            }
            other => Err(unknown_function(Self::NAME, other)),
        }
    }
}
