use super::{unknown_function, Args, NativeContract};
use crate::error::{ExecError, ExecResult};
use crate::state::{CallContext, CallEnv};
use harness_aci::Value;
use harness_primitives::AccountAddress;
use num_bigint::BigInt;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const ALREADY_MINTED: &str = "Already minted";
pub const ONLY_OWNER_CAN_MINT: &str = "Only owner can mint";
pub const TOKEN_DOES_NOT_EXIST: &str = "Token does not exist";
pub const TOKEN_BURNED: &str = "Token burned";
pub const NOT_OWNER_OF_TOKEN: &str = "Not owner of token";
pub const NOT_APPROVED_OR_OWNER: &str = "Not approved or owner";
pub const RECEIVER_REJECTED: &str = "Receiver rejected token";
pub const APPROVE_TO_OWNER: &str = "Cannot approve to current owner";

/// Receiver callback invoked by `safe_transfer_from`.
pub const ON_NFT_RECEIVED: &str = "on_nft_received";

/// ERC721-style token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftContract {
    name: String,
    symbol: String,
    /// Deployer; the only account allowed to mint.
    minter: AccountAddress,
    owners: BTreeMap<BigInt, AccountAddress>,
    balances: HashMap<AccountAddress, u64>,
    approvals: BTreeMap<BigInt, AccountAddress>,
    /// owner -> operators
    operators: HashMap<AccountAddress, BTreeSet<AccountAddress>>,
    /// Burned ids can never be minted again.
    burned: BTreeSet<BigInt>,
}

impl NftContract {
    const NAME_FN: &'static str = "name";
    const SYMBOL: &'static str = "symbol";
    const MINT: &'static str = "mint";
    const OWNER_OF: &'static str = "owner_of";
    const BALANCE_OF: &'static str = "balance_of";
    const GET_APPROVED: &'static str = "get_approved";
    const IS_APPROVED_FOR_ALL: &'static str = "is_approved_for_all";
    const APPROVE: &'static str = "approve";
    const SET_APPROVAL_FOR_ALL: &'static str = "set_approval_for_all";
    const TRANSFER_FROM: &'static str = "transfer_from";
    const SAFE_TRANSFER_FROM: &'static str = "safe_transfer_from";
    const BURN: &'static str = "burn";

    fn owner_of(&self, token_id: &BigInt) -> ExecResult<AccountAddress> {
        if self.burned.contains(token_id) {
            return Err(ExecError::revert(TOKEN_BURNED));
        }
        self.owners
            .get(token_id)
            .copied()
            .ok_or_else(|| ExecError::revert(TOKEN_DOES_NOT_EXIST))
    }

    fn balance_of(&self, owner: &AccountAddress) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn is_operator(&self, owner: &AccountAddress, operator: &AccountAddress) -> bool {
        self.operators
            .get(owner)
            .is_some_and(|operators| operators.contains(operator))
    }

    fn may_transfer(
        &self,
        caller: &AccountAddress,
        owner: &AccountAddress,
        token_id: &BigInt,
    ) -> bool {
        caller == owner
            || self.approvals.get(token_id) == Some(caller)
            || self.is_operator(owner, caller)
    }

    fn mint(&mut self, ctx: &CallContext, to: AccountAddress, token_id: BigInt) -> ExecResult<()> {
        if ctx.caller != self.minter {
            return Err(ExecError::revert(ONLY_OWNER_CAN_MINT));
        }
        if self.owners.contains_key(&token_id) || self.burned.contains(&token_id) {
            return Err(ExecError::revert(ALREADY_MINTED));
        }
        self.owners.insert(token_id, to);
        *self.balances.entry(to).or_default() += 1;
        Ok(())
    }

    fn approve(
        &mut self,
        ctx: &CallContext,
        approved: AccountAddress,
        token_id: BigInt,
    ) -> ExecResult<()> {
        let owner = self.owner_of(&token_id)?;
        if ctx.caller != owner && !self.is_operator(&owner, &ctx.caller) {
            return Err(ExecError::revert(NOT_OWNER_OF_TOKEN));
        }
        if approved == owner {
            return Err(ExecError::revert(APPROVE_TO_OWNER));
        }
        self.approvals.insert(token_id, approved);
        Ok(())
    }

    fn set_approval_for_all(
        &mut self,
        ctx: &CallContext,
        operator: AccountAddress,
        approved: bool,
    ) -> ExecResult<()> {
        if operator == ctx.caller {
            return Err(ExecError::revert(APPROVE_TO_OWNER));
        }
        let operators = self.operators.entry(ctx.caller).or_default();
        if approved {
            operators.insert(operator);
        } else {
            operators.remove(&operator);
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        ctx: &CallContext,
        from: AccountAddress,
        to: AccountAddress,
        token_id: &BigInt,
    ) -> ExecResult<()> {
        let owner = self.owner_of(token_id)?;
        if owner != from {
            return Err(ExecError::revert(NOT_OWNER_OF_TOKEN));
        }
        if !self.may_transfer(&ctx.caller, &owner, token_id) {
            return Err(ExecError::revert(NOT_APPROVED_OR_OWNER));
        }

        self.approvals.remove(token_id);
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance = balance.saturating_sub(1);
        }
        *self.balances.entry(to).or_default() += 1;
        self.owners.insert(token_id.clone(), to);
        Ok(())
    }

    fn safe_transfer(
        &mut self,
        env: &mut CallEnv<'_>,
        ctx: &CallContext,
        from: AccountAddress,
        to: AccountAddress,
        token_id: BigInt,
        data: String,
    ) -> ExecResult<()> {
        self.transfer(ctx, from, to, &token_id)?;
        if !env.is_contract(&to) {
            return Ok(());
        }
        let callback_args = [
            Value::Address(ctx.caller),
            Value::Address(from),
            Value::Int(token_id),
            Value::String(data),
        ];
        match env.call(
            ctx.contract.as_account(),
            to.as_contract(),
            ON_NFT_RECEIVED,
            &callback_args,
        ) {
            Ok(Value::Bool(true)) => Ok(()),
            _ => Err(ExecError::revert(RECEIVER_REJECTED)),
        }
    }

    fn burn(&mut self, ctx: &CallContext, token_id: BigInt) -> ExecResult<()> {
        let owner = self.owner_of(&token_id)?;
        if !self.may_transfer(&ctx.caller, &owner, &token_id) {
            return Err(ExecError::revert(NOT_APPROVED_OR_OWNER));
        }
        self.owners.remove(&token_id);
        self.approvals.remove(&token_id);
        if let Some(balance) = self.balances.get_mut(&owner) {
            *balance = balance.saturating_sub(1);
        }
        self.burned.insert(token_id);
        Ok(())
    }
}

impl NativeContract for NftContract {
    const NAME: &'static str = "NFT";

    fn init(ctx: &CallContext, args: &[Value]) -> ExecResult<Self> {
        let args = Args::new("init", args, 2)?;
        Ok(Self {
            name: args.string(0)?,
            symbol: args.string(1)?,
            minter: ctx.caller,
            owners: BTreeMap::new(),
            balances: HashMap::new(),
            approvals: BTreeMap::new(),
            operators: HashMap::new(),
            burned: BTreeSet::new(),
        })
    }

    fn call(
        &mut self,
        env: &mut CallEnv<'_>,
        ctx: &CallContext,
        function: &str,
        args: &[Value],
    ) -> ExecResult<Value> {
        match function {
            Self::NAME_FN => {
                Args::new(function, args, 0)?;
                Ok(Value::String(self.name.clone()))
            }
            Self::SYMBOL => {
                Args::new(function, args, 0)?;
                Ok(Value::String(self.symbol.clone()))
            }
            Self::OWNER_OF => {
                let args = Args::new(function, args, 1)?;
                self.owner_of(&args.int(0)?).map(Value::Address)
            }
            Self::BALANCE_OF => {
                let args = Args::new(function, args, 1)?;
                Ok(Value::int(self.balance_of(&args.address(0)?)))
            }
            Self::GET_APPROVED => {
                let args = Args::new(function, args, 1)?;
                let token_id = args.int(0)?;
                self.owner_of(&token_id)?;
                Ok(match self.approvals.get(&token_id) {
                    Some(approved) => Value::some(Value::Address(*approved)),
                    None => Value::none(),
                })
            }
            Self::IS_APPROVED_FOR_ALL => {
                let args = Args::new(function, args, 2)?;
                Ok(Value::Bool(self.is_operator(&args.address(0)?, &args.address(1)?)))
            }
            Self::MINT => {
                let args = Args::new(function, args, 2)?;
                self.mint(ctx, args.address(0)?, args.int(1)?)?;
                Ok(Value::Unit)
            }
            Self::APPROVE => {
                let args = Args::new(function, args, 2)?;
                self.approve(ctx, args.address(0)?, args.int(1)?)?;
                Ok(Value::Unit)
            }
            Self::SET_APPROVAL_FOR_ALL => {
                let args = Args::new(function, args, 2)?;
                self.set_approval_for_all(ctx, args.address(0)?, args.bool(1)?)?;
                Ok(Value::Unit)
            }
            Self::TRANSFER_FROM => {
                let args = Args::new(function, args, 3)?;
                self.transfer(ctx, args.address(0)?, args.address(1)?, &args.int(2)?)?;
                Ok(Value::Unit)
            }
            Self::SAFE_TRANSFER_FROM => {
                let args = Args::new(function, args, 4)?;
                self.safe_transfer(
                    env,
                    ctx,
                    args.address(0)?,
                    args.address(1)?,
                    args.int(2)?,
                    args.string(3)?,
                )?;
                Ok(Value::Unit)
            }
            Self::BURN => {
                let args = Args::new(function, args, 1)?;
                self.burn(ctx, args.int(0)?)?;
                Ok(Value::Unit)
            }
            other => Err(unknown_function(Self::NAME, other)),
        }
    }
}
