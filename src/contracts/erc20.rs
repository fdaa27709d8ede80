//! ERC20 token interface
//! View functions only: the monitor never sends transactions.
use ethers::prelude::*;

abigen!(
    IERC20,
    r#"[
        function balanceOf(address account) external view returns (uint256)
        function allowance(address owner, address spender) external view returns (uint256)
        function decimals() external view returns (uint8)
        function symbol() external view returns (string)
        event Approval(address indexed owner, address indexed spender, uint256 value)
    ]"#,
);
