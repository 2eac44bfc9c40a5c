//! Approval-gated token swaps.
//!
//! A swap walks `Unapproved -> Approving -> Approved -> Swapping -> Confirmed`,
//! skipping `Approving` when the router's allowance already covers the amount.
//! Any error moves it to `Failed` and is returned to the caller unchanged.

use std::fmt;
use std::time::Duration;

use alloy_core::primitives::{Address, B256, U256};
use serde::Serialize;
use tracing::{info, warn};

use crate::amount::format_units;
use crate::calls::erc20::{self, TokenInfo};
use crate::calls::solidly::{self, SwapRoute};
use crate::calls::v3::{self, ExactInput};
use crate::calls::ContractCall;
use crate::error::{EvmError, Result};
use crate::executor::TxExecutor;
use crate::fees::GasLimitPolicy;
use crate::rpc::ChainRpc;

pub const DEFAULT_APPROVAL_GAS: GasLimitPolicy = GasLimitPolicy::Fixed(200_000);
pub const DEFAULT_ROUTES_SWAP_GAS: GasLimitPolicy = GasLimitPolicy::Fixed(3_000_000);
pub const DEFAULT_V3_SWAP_GAS: GasLimitPolicy = GasLimitPolicy::EstimateOr(300_000);

const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwapState {
    Unapproved,
    Approving,
    Approved,
    Swapping,
    Confirmed,
    Failed,
}

impl fmt::Display for SwapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Lower bound on the swap output. Callers always pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlippageGuard {
    /// Raw output floor.
    MinOut(U256),
    /// Quote the swap and accept up to `bps` basis points less.
    Tolerance { bps: u16 },
    /// Accept any execution price.
    Unprotected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApprovalAmount {
    /// Approve exactly the swap amount.
    #[default]
    Exact,
    Unlimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapAmount {
    Exact(U256),
    /// Swap the sender's whole input-token balance.
    WholeBalance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapRouter {
    /// Solidly-style router taking a list of `(from, to, stable)` hops.
    Routes { router: Address, path: SwapRoute },
    /// V3-style router, one pool per swap.
    V3 {
        router: Address,
        token_in: Address,
        token_out: Address,
        fee: u32,
        deadline: Duration,
    },
}

impl SwapRouter {
    pub fn address(&self) -> Address {
        match self {
            SwapRouter::Routes { router, .. } | SwapRouter::V3 { router, .. } => *router,
        }
    }

    pub fn token_in(&self) -> Address {
        match self {
            SwapRouter::Routes { path, .. } => path.token_in(),
            SwapRouter::V3 { token_in, .. } => *token_in,
        }
    }

    pub fn token_out(&self) -> Address {
        match self {
            SwapRouter::Routes { path, .. } => path.token_out(),
            SwapRouter::V3 { token_out, .. } => *token_out,
        }
    }

    pub fn default_swap_gas(&self) -> GasLimitPolicy {
        match self {
            SwapRouter::Routes { .. } => DEFAULT_ROUTES_SWAP_GAS,
            SwapRouter::V3 { .. } => DEFAULT_V3_SWAP_GAS,
        }
    }

    pub fn swap_call(&self, recipient: Address, amount_in: U256, amount_out_min: U256) -> ContractCall {
        match self {
            SwapRouter::Routes { router, path } => {
                solidly::swap_exact_tokens_for_tokens(*router, recipient, path, amount_in, amount_out_min)
            }
            SwapRouter::V3 { router, token_in, token_out, fee, deadline } => {
                let swap = exact_input(*token_in, *token_out, *fee, *deadline, recipient, amount_in);
                v3::exact_input_single(*router, &swap, amount_out_min)
            }
        }
    }

    /// Expected output for `amount_in` as the router prices it right now.
    pub async fn quote<R: ChainRpc + ?Sized>(
        &self,
        rpc: &R,
        sender: Address,
        amount_in: U256,
    ) -> Result<U256> {
        match self {
            SwapRouter::Routes { router, path } => solidly::quote(rpc, *router, path, amount_in).await,
            SwapRouter::V3 { router, token_in, token_out, fee, deadline } => {
                let swap = exact_input(*token_in, *token_out, *fee, *deadline, sender, amount_in);
                v3::quote(rpc, *router, sender, &swap).await
            }
        }
    }
}

fn exact_input(
    token_in: Address,
    token_out: Address,
    fee: u32,
    deadline: Duration,
    recipient: Address,
    amount_in: U256,
) -> ExactInput {
    ExactInput {
        token_in,
        token_out,
        fee,
        recipient,
        deadline: v3::deadline_after(deadline),
        amount_in,
    }
}

/// Everything needed to run one swap.
#[derive(Debug, Clone)]
pub struct SwapOrder {
    pub router: SwapRouter,
    pub amount: SwapAmount,
    pub slippage: SlippageGuard,
    pub approval: ApprovalAmount,
    pub approval_gas: GasLimitPolicy,
    pub swap_gas: GasLimitPolicy,
}

impl SwapOrder {
    pub fn new(router: SwapRouter, amount: SwapAmount, slippage: SlippageGuard) -> Self {
        let swap_gas = router.default_swap_gas();
        Self {
            router,
            amount,
            slippage,
            approval: ApprovalAmount::default(),
            approval_gas: DEFAULT_APPROVAL_GAS,
            swap_gas,
        }
    }

    pub fn with_approval(mut self, approval: ApprovalAmount) -> Self {
        self.approval = approval;
        self
    }

    pub fn with_approval_gas(mut self, policy: GasLimitPolicy) -> Self {
        self.approval_gas = policy;
        self
    }

    pub fn with_swap_gas(mut self, policy: GasLimitPolicy) -> Self {
        self.swap_gas = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwapOutcome {
    Confirmed { tx_hash: B256, received: U256 },
    /// The swap succeeded on chain but the output balance did not move.
    ZeroOutput { tx_hash: B256 },
}

impl SwapOutcome {
    pub fn tx_hash(&self) -> B256 {
        match self {
            SwapOutcome::Confirmed { tx_hash, .. } | SwapOutcome::ZeroOutput { tx_hash } => *tx_hash,
        }
    }

    pub fn received(&self) -> U256 {
        match self {
            SwapOutcome::Confirmed { received, .. } => *received,
            SwapOutcome::ZeroOutput { .. } => U256::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapReport {
    pub token_in: TokenInfo,
    pub token_out: TokenInfo,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub approval_tx: Option<B256>,
    pub outcome: SwapOutcome,
}

/// `quote * (1 - bps / 10_000)`, rounded down.
pub fn apply_tolerance(quote: U256, bps: u16) -> Result<U256> {
    let bps = u64::from(bps);
    if bps > BPS_DENOMINATOR {
        return Err(EvmError::InvalidConfig(format!(
            "slippage tolerance {} bps exceeds 100%",
            bps
        )));
    }
    let kept = U256::from(BPS_DENOMINATOR - bps);
    Ok(quote.saturating_mul(kept) / U256::from(BPS_DENOMINATOR))
}

/// One swap run, with the states it went through.
pub struct SwapExecution<'a, R: ChainRpc> {
    executor: &'a TxExecutor<R>,
    order: SwapOrder,
    state: SwapState,
    history: Vec<SwapState>,
}

impl<'a, R: ChainRpc> SwapExecution<'a, R> {
    pub fn new(executor: &'a TxExecutor<R>, order: SwapOrder) -> Self {
        Self {
            executor,
            order,
            state: SwapState::Unapproved,
            history: vec![SwapState::Unapproved],
        }
    }

    pub fn state(&self) -> SwapState {
        self.state
    }

    pub fn history(&self) -> &[SwapState] {
        &self.history
    }

    fn transition(&mut self, next: SwapState) {
        info!("[Swap] {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    pub async fn run(&mut self) -> Result<SwapReport> {
        match self.drive().await {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!("[Swap] failed in state {}: {}", self.state, e);
                self.transition(SwapState::Failed);
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<SwapReport> {
        let executor = self.executor;
        let rpc = executor.rpc();
        let owner = executor.sender();
        let router = self.order.router.address();

        let token_in = erc20::token_info(rpc, self.order.router.token_in()).await;
        let token_out = erc20::token_info(rpc, self.order.router.token_out()).await;
        let decimals_in = token_in.decimals.get();
        let decimals_out = token_out.decimals.get();

        let balance = erc20::balance_of(rpc, token_in.address, owner).await?;
        let amount_in = match self.order.amount {
            SwapAmount::Exact(amount) => amount,
            SwapAmount::WholeBalance => balance,
        };
        if amount_in.is_zero() {
            return Err(EvmError::Amount(match self.order.amount {
                SwapAmount::Exact(_) => "swap amount is 0".to_string(),
                SwapAmount::WholeBalance => format!("nothing to swap: {} balance is 0", token_in.symbol.value()),
            }));
        }
        if balance < amount_in {
            return Err(EvmError::Amount(format!(
                "{} balance {} is below the swap amount {}",
                token_in.symbol.value(),
                format_units(balance, decimals_in),
                format_units(amount_in, decimals_in)
            )));
        }
        info!(
            "[Swap] swapping {} {} for {} via {}",
            format_units(amount_in, decimals_in),
            token_in.symbol.value(),
            token_out.symbol.value(),
            router
        );

        let allowance = erc20::allowance(rpc, token_in.address, owner, router).await?;
        let approval_tx = if allowance < amount_in {
            Some(self.approve(token_in.address, router, amount_in).await?)
        } else {
            info!("[Swap] allowance {} already covers the amount", allowance);
            None
        };
        self.transition(SwapState::Approved);

        if matches!(self.order.router, SwapRouter::V3 { .. }) {
            self.log_unit_price(&token_in, &token_out, "before").await;
        }

        let amount_out_min = match self.order.slippage {
            SlippageGuard::MinOut(min) => min,
            SlippageGuard::Tolerance { bps } => {
                let quote = self.order.router.quote(rpc, owner, amount_in).await?;
                let min = apply_tolerance(quote, bps)?;
                info!(
                    "[Swap] quoted {} {}, minimum out {} ({} bps tolerance)",
                    format_units(quote, decimals_out),
                    token_out.symbol.value(),
                    format_units(min, decimals_out),
                    bps
                );
                min
            }
            SlippageGuard::Unprotected => {
                warn!("[Swap] no slippage protection: any execution price will be accepted");
                U256::ZERO
            }
        };

        let before = erc20::balance_of(rpc, token_out.address, owner).await?;

        self.transition(SwapState::Swapping);
        let call = self.order.router.swap_call(owner, amount_in, amount_out_min);
        let receipt = executor.execute(&call, self.order.swap_gas).await?;

        let after = erc20::balance_of(rpc, token_out.address, owner).await?;
        let received = after.saturating_sub(before);
        let outcome = if received.is_zero() {
            warn!(
                "[Swap] {} succeeded but no {} was received",
                receipt.tx_hash,
                token_out.symbol.value()
            );
            SwapOutcome::ZeroOutput { tx_hash: receipt.tx_hash }
        } else {
            info!(
                "[Swap] received {} {}",
                format_units(received, decimals_out),
                token_out.symbol.value()
            );
            SwapOutcome::Confirmed { tx_hash: receipt.tx_hash, received }
        };
        self.transition(SwapState::Confirmed);

        if matches!(self.order.router, SwapRouter::V3 { .. }) {
            self.log_unit_price(&token_in, &token_out, "after").await;
        }

        Ok(SwapReport {
            token_in,
            token_out,
            amount_in,
            amount_out_min,
            approval_tx,
            outcome,
        })
    }

    async fn approve(&mut self, token: Address, spender: Address, amount_in: U256) -> Result<B256> {
        self.transition(SwapState::Approving);
        let amount = match self.order.approval {
            ApprovalAmount::Exact => amount_in,
            ApprovalAmount::Unlimited => U256::MAX,
        };

        let call = erc20::approve(token, spender, amount);
        let receipt = self.executor.execute(&call, self.order.approval_gas).await?;

        let allowance = erc20::allowance(self.executor.rpc(), token, self.executor.sender(), spender).await?;
        if allowance < amount_in {
            return Err(EvmError::InsufficientAllowance {
                allowance,
                required: amount_in,
            });
        }
        Ok(receipt.tx_hash)
    }

    async fn log_unit_price(&self, token_in: &TokenInfo, token_out: &TokenInfo, when: &str) {
        let one = U256::from(10u64).pow(U256::from(token_in.decimals.get()));
        match self.order.router.quote(self.executor.rpc(), self.executor.sender(), one).await {
            Ok(out) => info!(
                "[Swap] price {} swap: 1 {} = {} {}",
                when,
                token_in.symbol.value(),
                format_units(out, token_out.decimals.get()),
                token_out.symbol.value()
            ),
            Err(e) => warn!("[Swap] cannot quote price {} swap: {}", when, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::address;

    use super::*;

    #[test]
    fn tolerance_keeps_the_remaining_share() {
        assert_eq!(apply_tolerance(U256::from(10_000u64), 100).unwrap(), U256::from(9_900u64));
        assert_eq!(apply_tolerance(U256::from(999u64), 50).unwrap(), U256::from(994u64));
        assert_eq!(apply_tolerance(U256::from(5u64), 0).unwrap(), U256::from(5u64));
        assert_eq!(apply_tolerance(U256::from(5u64), 10_000).unwrap(), U256::ZERO);
        assert!(apply_tolerance(U256::from(5u64), 10_001).is_err());
    }

    #[test]
    fn order_defaults_follow_the_router() {
        let usdc = address!("29219dd400f2Bf60E5a23d13Be72B486D4038894");
        let scusd = address!("d3DCe716f3eF535C5Ff8d041c1A41C3bd89b97aE");
        let routes = SwapRouter::Routes {
            router: Address::repeat_byte(0xa0),
            path: SwapRoute::direct(usdc, scusd, true),
        };
        let order = SwapOrder::new(routes, SwapAmount::WholeBalance, SlippageGuard::Unprotected);
        assert_eq!(order.swap_gas, GasLimitPolicy::Fixed(3_000_000));
        assert_eq!(order.approval_gas, GasLimitPolicy::Fixed(200_000));
        assert_eq!(order.approval, ApprovalAmount::Exact);
        assert_eq!(order.router.token_in(), usdc);
        assert_eq!(order.router.token_out(), scusd);

        let v3 = SwapRouter::V3 {
            router: Address::repeat_byte(0x13),
            token_in: usdc,
            token_out: scusd,
            fee: 3000,
            deadline: v3::DEFAULT_DEADLINE,
        };
        assert_eq!(v3.default_swap_gas(), GasLimitPolicy::EstimateOr(300_000));
    }

    #[test]
    fn outcome_reports_received_amount() {
        let zero = SwapOutcome::ZeroOutput { tx_hash: B256::ZERO };
        assert_eq!(zero.received(), U256::ZERO);
        let ok = SwapOutcome::Confirmed { tx_hash: B256::ZERO, received: U256::from(3u64) };
        assert_eq!(ok.received(), U256::from(3u64));
    }
}
