use alloy_core::primitives::{Address, U256};
use alloy_core::sol;

use super::ContractCall;

sol! {
    #[derive(Debug)]
    function withdraw(uint256 _pid, uint256 _amount) external;
}

pub fn withdraw(pool: Address, pid: u64, amount: U256) -> ContractCall {
    ContractCall::new(
        pool,
        &withdrawCall {
            _pid: U256::from(pid),
            _amount: amount,
        },
    )
}

/// Withdrawing nothing harvests the pending rewards and leaves the stake untouched.
pub fn claim_rewards(pool: Address, pid: u64) -> ContractCall {
    withdraw(pool, pid, U256::ZERO)
}

#[cfg(test)]
mod tests {
    use alloy_core::sol_types::SolCall;

    use super::*;

    #[test]
    fn claim_is_a_zero_withdraw() {
        let pool = Address::repeat_byte(0x49);
        let call = claim_rewards(pool, 3);
        assert_eq!(call.to, pool);

        let decoded = withdrawCall::abi_decode(&call.data, true).unwrap();
        assert_eq!(decoded._pid, U256::from(3u64));
        assert_eq!(decoded._amount, U256::ZERO);
    }
}
