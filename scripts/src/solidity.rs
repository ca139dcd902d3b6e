//! Definitions of Solidity types and functions used during deployment

use alloy::sol;

sol! {
    /// The sale configuration passed to the Cre8ors constructor
    #[derive(Debug, PartialEq, Eq)]
    struct SalesConfiguration {
        uint104 publicSalePrice;
        address erc20PaymentToken;
        uint32 maxSalePurchasePerAddress;
        uint64 publicSaleStart;
        uint64 publicSaleEnd;
        uint64 presaleStart;
        uint64 presaleEnd;
        bytes32 presaleMerkleRoot;
    }

    /// The Cre8ors collection functions called after deployment
    #[sol(rpc)]
    contract Cre8orsContract {
        function grantRole(bytes32 role, address account) external;
        function hasRole(bytes32 role, address account) external view returns (bool);
        function setHook(uint8 hookType, address hook) external;
    }
}
