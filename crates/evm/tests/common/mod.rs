#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use alloy_core::sol_types::SolCall;
use alloy_rpc_types::TransactionRequest;

use onchain_evm::calls::{erc20, reward_pool, solidly, v3};
use onchain_evm::{
    Address, Bytes, ChainConfig, ChainRpc, EvmError, LocalWallet, Receipt, Result, SignedTx, TxExecutor,
    TxRequest, TxStatus, B256, U256,
};

pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn wallet() -> LocalWallet {
    LocalWallet::from_hex(TEST_KEY).unwrap()
}

pub fn executor(chain: ChainConfig) -> TxExecutor<MockChain> {
    let chain_id = chain.chain_id.unwrap_or(146);
    TxExecutor::new(MockChain::new(chain_id), wallet(), chain)
}

/// Chain state the mock answers from. Only what the tests need.
pub struct MockState {
    pub chain_id: u64,
    pub gas_price: u128,
    pub base_fee: Option<u128>,
    /// `None` makes every estimate fail.
    pub gas_estimate: Option<u64>,
    pub nonces: HashMap<Address, u64>,
    pub native: HashMap<Address, U256>,
    pub decimals: HashMap<Address, u8>,
    pub symbols: HashMap<Address, String>,
    pub balances: HashMap<(Address, Address), U256>,
    pub allowances: HashMap<(Address, Address, Address), U256>,
    /// Whether a mined `approve` actually changes the allowance.
    pub approvals_take_effect: bool,
    pub swap_output: U256,
    /// Mined swaps fail regardless of balances.
    pub revert_swaps: bool,
    pub quote: U256,
    /// Pools whose claim cannot be estimated (the pool reverts).
    pub failing_pids: HashSet<u64>,
    pub withhold_receipts: bool,
    /// The next this-many receipt lookups fail like a flaky gateway.
    pub failing_receipt_polls: u32,
    pub receipts: HashMap<B256, Receipt>,
    pub sent: Vec<TxRequest>,
    /// What each mined transaction did, in order.
    pub events: Vec<String>,
    block: u64,
}

pub struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                chain_id,
                gas_price: 1_000_000_000,
                base_fee: Some(20_000_000_000),
                gas_estimate: Some(50_000),
                nonces: HashMap::new(),
                native: HashMap::new(),
                decimals: HashMap::new(),
                symbols: HashMap::new(),
                balances: HashMap::new(),
                allowances: HashMap::new(),
                approvals_take_effect: true,
                swap_output: U256::ZERO,
                revert_swaps: false,
                quote: U256::ZERO,
                failing_pids: HashSet::new(),
                withhold_receipts: false,
                failing_receipt_polls: 0,
                receipts: HashMap::new(),
                sent: Vec::new(),
                events: Vec::new(),
                block: 100,
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn add_token(&self, token: Address, symbol: &str, decimals: u8) {
        let mut state = self.state();
        state.symbols.insert(token, symbol.to_string());
        state.decimals.insert(token, decimals);
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state().balances.insert((token, owner), amount);
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.state().balances.get(&(token, owner)).copied().unwrap_or_default()
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state().allowances.insert((token, owner, spender), amount);
    }

    pub fn events(&self) -> Vec<String> {
        self.state().events.clone()
    }
}

fn target(tx: &TransactionRequest) -> Address {
    tx.to.and_then(|kind| kind.to().copied()).unwrap_or_default()
}

fn input(tx: &TransactionRequest) -> Bytes {
    tx.input.input().cloned().unwrap_or_default()
}

fn selector(data: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    if data.len() >= 4 {
        out.copy_from_slice(&data[..4]);
    }
    out
}

fn revert(reason: &str) -> EvmError {
    EvmError::Rpc(format!("execution reverted: {}", reason))
}

impl MockState {
    fn view(&self, to: Address, data: &[u8]) -> Result<Bytes> {
        let encoded = match selector(data) {
            erc20::balanceOfCall::SELECTOR => {
                let call = erc20::balanceOfCall::abi_decode(data, true).map_err(|e| revert(&e.to_string()))?;
                let balance = self.balances.get(&(to, call.account)).copied().unwrap_or_default();
                erc20::balanceOfCall::abi_encode_returns(&(balance,))
            }
            erc20::allowanceCall::SELECTOR => {
                let call = erc20::allowanceCall::abi_decode(data, true).map_err(|e| revert(&e.to_string()))?;
                let allowance = self
                    .allowances
                    .get(&(to, call.owner, call.spender))
                    .copied()
                    .unwrap_or_default();
                erc20::allowanceCall::abi_encode_returns(&(allowance,))
            }
            erc20::decimalsCall::SELECTOR => {
                let decimals = self.decimals.get(&to).copied().ok_or_else(|| revert("no decimals"))?;
                erc20::decimalsCall::abi_encode_returns(&(decimals,))
            }
            erc20::symbolCall::SELECTOR => {
                let symbol = self.symbols.get(&to).cloned().ok_or_else(|| revert("no symbol"))?;
                erc20::symbolCall::abi_encode_returns(&(symbol,))
            }
            erc20::totalSupplyCall::SELECTOR => {
                let supply: U256 = self
                    .balances
                    .iter()
                    .filter(|((token, _), _)| *token == to)
                    .map(|(_, amount)| *amount)
                    .fold(U256::ZERO, |acc, v| acc + v);
                erc20::totalSupplyCall::abi_encode_returns(&(supply,))
            }
            solidly::getAmountsOutCall::SELECTOR => {
                let call = solidly::getAmountsOutCall::abi_decode(data, true).map_err(|e| revert(&e.to_string()))?;
                solidly::getAmountsOutCall::abi_encode_returns(&(vec![call.amountIn, self.quote],))
            }
            v3::exactInputSingleCall::SELECTOR => v3::exactInputSingleCall::abi_encode_returns(&(self.quote,)),
            _ => return Err(revert("unknown selector")),
        };
        Ok(encoded.into())
    }

    fn move_tokens(&mut self, token: Address, from: Address, to: Address, amount: U256) -> bool {
        let from_balance = self.balances.get(&(token, from)).copied().unwrap_or_default();
        if from_balance < amount {
            return false;
        }
        self.balances.insert((token, from), from_balance - amount);
        *self.balances.entry((token, to)).or_default() += amount;
        true
    }

    fn swap(&mut self, router: Address, owner: Address, token_in: Address, token_out: Address, amount: U256) -> bool {
        let allowance = self.allowances.get(&(token_in, owner, router)).copied().unwrap_or_default();
        if self.revert_swaps || allowance < amount || !self.move_tokens(token_in, owner, router, amount) {
            return false;
        }
        self.allowances.insert((token_in, owner, router), allowance - amount);
        *self.balances.entry((token_out, owner)).or_default() += self.swap_output;
        true
    }

    /// Applies a mined transaction and reports whether it succeeded.
    fn apply(&mut self, tx: &TxRequest) -> bool {
        let data = tx.input.as_ref();
        match selector(data) {
            erc20::approveCall::SELECTOR => {
                let Ok(call) = erc20::approveCall::abi_decode(data, true) else { return false };
                self.events.push("approve".to_string());
                if self.approvals_take_effect {
                    self.allowances.insert((tx.to, tx.sender, call.spender), call.amount);
                }
                true
            }
            erc20::transferCall::SELECTOR => {
                let Ok(call) = erc20::transferCall::abi_decode(data, true) else { return false };
                self.events.push("transfer".to_string());
                self.move_tokens(tx.to, tx.sender, call.recipient, call.amount)
            }
            solidly::swapExactTokensForTokensCall::SELECTOR => {
                let Ok(call) = solidly::swapExactTokensForTokensCall::abi_decode(data, true) else {
                    return false;
                };
                self.events.push("swap".to_string());
                let (Some(first), Some(last)) = (call.routes.first(), call.routes.last()) else {
                    return false;
                };
                let (token_in, token_out) = (first.from, last.to);
                self.swap(tx.to, tx.sender, token_in, token_out, call.amountIn)
            }
            v3::exactInputSingleCall::SELECTOR => {
                let Ok(call) = v3::exactInputSingleCall::abi_decode(data, true) else { return false };
                self.events.push("swap".to_string());
                let p = call.params;
                self.swap(tx.to, tx.sender, p.tokenIn, p.tokenOut, p.amountIn)
            }
            reward_pool::withdrawCall::SELECTOR => {
                let Ok(call) = reward_pool::withdrawCall::abi_decode(data, true) else { return false };
                self.events.push(format!("withdraw:{}", call._pid));
                true
            }
            _ if data.is_empty() => {
                let from = self.native.get(&tx.sender).copied().unwrap_or_default();
                if from < tx.value {
                    return false;
                }
                self.native.insert(tx.sender, from - tx.value);
                *self.native.entry(tx.to).or_default() += tx.value;
                self.events.push("native".to_string());
                true
            }
            _ => false,
        }
    }
}

#[async_trait::async_trait]
impl ChainRpc for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.state().chain_id)
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        Ok(self.state().native.get(&address).copied().unwrap_or_default())
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        Ok(self.state().nonces.get(&address).copied().unwrap_or_default())
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(self.state().gas_price)
    }

    async fn base_fee(&self) -> Result<Option<u128>> {
        Ok(self.state().base_fee)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        let state = self.state();
        let data = input(tx);
        if selector(&data) == reward_pool::withdrawCall::SELECTOR {
            if let Ok(call) = reward_pool::withdrawCall::abi_decode(&data, true) {
                let pid: u64 = call._pid.to();
                if state.failing_pids.contains(&pid) {
                    return Err(EvmError::Estimation(format!("execution reverted: pool {} is closed", pid)));
                }
            }
        }
        state
            .gas_estimate
            .ok_or_else(|| EvmError::Estimation("execution reverted".to_string()))
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        self.state().view(target(tx), &input(tx))
    }

    async fn send_transaction(&self, tx: &SignedTx) -> Result<B256> {
        let mut state = self.state();
        let request = tx.request().clone();
        let expected_nonce = state.nonces.get(&request.sender).copied().unwrap_or_default();
        if request.nonce != expected_nonce {
            return Err(EvmError::Submission(format!(
                "nonce too low: expected {}, got {}",
                expected_nonce, request.nonce
            )));
        }
        state.nonces.insert(request.sender, expected_nonce + 1);

        let succeeded = state.apply(&request);
        state.block += 1;
        let receipt = Receipt {
            status: if succeeded { TxStatus::Success } else { TxStatus::Failure },
            block_number: Some(state.block),
            tx_hash: tx.hash(),
            gas_used: u128::from(request.gas_limit / 2),
        };
        state.receipts.insert(tx.hash(), receipt);
        state.sent.push(request);
        Ok(tx.hash())
    }

    async fn receipt(&self, tx_hash: B256) -> Result<Option<Receipt>> {
        let mut state = self.state();
        if state.failing_receipt_polls > 0 {
            state.failing_receipt_polls -= 1;
            return Err(EvmError::Rpc("502 bad gateway".to_string()));
        }
        if state.withhold_receipts {
            return Ok(None);
        }
        Ok(state.receipts.get(&tx_hash).cloned())
    }
}
