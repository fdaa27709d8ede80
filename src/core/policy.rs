use ethers::types::U256;

/// How much of a balance an allowance puts at risk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    /// Balance at or below the dust threshold
    Dust,
    /// Allowance smaller than the balance
    Partial,
    /// Allowance covers the whole balance
    Full,
}

pub fn assess(balance: U256, allowance: U256, dust_threshold: U256) -> Exposure {
    if balance <= dust_threshold {
        Exposure::Dust
    } else if allowance < balance {
        Exposure::Partial
    } else {
        Exposure::Full
    }
}
