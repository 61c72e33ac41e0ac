//! Solidity bindings for the events and read-only calls the engine relies on.

use alloy::sol;

sol! {
    /// ERC-20 transfer.
    event Transfer(address indexed from, address indexed to, uint256 value);

    /// Uniswap V3 pool swap.
    event Swap(
        address indexed sender,
        address indexed recipient,
        int256 amount0,
        int256 amount1,
        uint160 sqrtPriceX96,
        uint128 liquidity,
        int24 tick
    );
}

sol! {
    /// Immutable pool state used to verify pool provenance.
    interface IUniswapV3PoolImmutables {
        function factory() external view returns (address);
        function token0() external view returns (address);
        function token1() external view returns (address);
    }
}

sol! {
    /// Optional ERC-20 metadata extension.
    interface IERC20Metadata {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}
