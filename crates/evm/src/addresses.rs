use alloy_core::primitives::address;
use alloy_core::primitives::Address;

pub mod arbitrum {
    use super::*;
    pub const USDC: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");
    pub const USDC_E: Address = address!("FF970A61A04b1CA14834A43f5dE4533eBDDB5CC8");
    pub const SUSHI_V3_ROUTER: Address = address!("f2614A233c7C3e7f08b1F887Ba133a13f1eb2c55");
}

pub mod bsc {
    use super::*;
    pub const WBNB: Address = address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");
    pub const USDT: Address = address!("55d398326f99059Ff775485246999027B3197955");
    pub const PANCAKE_V3_ROUTER: Address = address!("13f4EA83D0bd40E75C8222255bc855a974568Dd4");
}

pub mod sonic {
    use super::*;
    pub const SHIELD: Address = address!("6706Adb93117C0a7235dCBe639E12ed13fa5752f");
    pub const SCUSD: Address = address!("d3DCe716f3eF535C5Ff8d041c1A41C3bd89b97aE");
    pub const USDC_E: Address = address!("29219dd400f2Bf60E5a23d13Be72B486D4038894");
    pub const SWAPX_ROUTER: Address = address!("A047e2AbF8263FcA7c368F43e2f960A06FD9949f");
    pub const QUANT_GENESIS_POOL: Address = address!("10a2b4f8ef1deda10cef90a7bdf178547b1efb54");
    pub const SHIELD_GENESIS_POOL: Address = address!("49f5BCDBC8B2f3401d1Fc3B5Df75F91eF389657A");
}
