//! Contract ABIs for the tracked contract families.

use alloy::sol;

sol! {
    interface ICarbonCoinLauncher {
        event TokenCreated(address indexed tokenAddress, address indexed creator, string name, string symbol, uint256 creationFee, uint256 timestamp);
        event TokenGraduated(address indexed tokenAddress, uint256 timestamp);
        event FeesWithdrawn(address indexed to, uint256 amount, uint256 timestamp);
        event FeeReceived(address indexed from, uint256 amount, uint256 timestamp);
        event LauncherPaused(uint256 timestamp);
        event LauncherUnpaused(uint256 timestamp);
        event MaxTokensPerCreatorUpdated(uint256 newMax);
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);
        event ControllerUpdated(address indexed oldController, address indexed newController);
    }
}

sol! {
    #[sol(rpc)]
    interface ICarbonCoin {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event TokenDeployed(address indexed token, uint256 maxSupply, uint256 graduationThreshold);
        event TokensPurchased(address indexed buyer, uint256 usdcAmount, uint256 tokensOut, uint256 newPrice, uint256 realUsdcReserves, uint256 realTokenSupply, uint256 timestamp);
        event TokensSold(address indexed seller, uint256 tokensIn, uint256 usdcOut, uint256 newPrice, uint256 realUsdcReserves, uint256 realTokenSupply, uint256 timestamp);
        event Graduated(address indexed token, uint256 liquidityUsdc, uint256 liquidityTokens, uint256 finalPrice, uint256 timestamp);
        event PriceUpdate(uint256 price, uint256 usdcReserves, uint256 tokenSupply, uint256 timestamp);
        event TradingPaused(uint256 timestamp);
        event TradingUnpaused(uint256 timestamp);
        event EmergencyWithdraw(address indexed to, uint256 amount, uint256 timestamp);
        event LiquiditySnapshot(uint256 usdcSupply, uint256 tokenSupply, uint256 liquidity, uint256 timestamp);
        event CreatorReserveMinted(address indexed creator, uint256 amount);
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function getReserves() external view returns (uint256 realUsdc, uint256 realTokens, uint256 virtualUsdc, uint256 virtualTokens);
        function getCurrentPrice() external view returns (uint256);
        function MAX_SUPPLY() external view returns (uint256);
        function GRADUATION_THRESHOLD() external view returns (uint256);
        function CREATOR_RESERVE_SUPPLY() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }
}

sol! {
    interface ICarbonCoinProtection {
        event BotDetected(address indexed token, address indexed user, string reason, uint256 timestamp);
        event AddressBlacklisted(address indexed token, address indexed user, bool blacklisted, uint256 timestamp);
        event AddressWhitelisted(address indexed token, address indexed user, bool whitelisted, uint256 timestamp);
        event CircuitBreakerTriggered(address indexed token, string reason, uint256 duration, uint256 timestamp);
        event CircuitBreakerReset(address indexed token, uint256 timestamp);
        event VolatilityWarning(address indexed token, uint256 moveCount, uint256 timestamp);
        event HighPriceImpact(address indexed token, address indexed trader, uint256 impact, uint256 timestamp);
        event WhaleIntentRegistered(address indexed token, address indexed trader, uint256 amount, bool isBuy, uint256 executeAfter, uint256 timestamp);
        event WhaleTradeExecuted(address indexed token, address indexed trader, uint256 amount, uint256 timestamp);
        event WhaleIntentCancelled(address indexed token, address indexed trader, uint256 timestamp);
    }
}

sol! {
    interface ICarbonCoinDex {
        event LiquidityDeployed(address indexed token, address indexed pair, address indexed creator, uint256 tokenAmount, uint256 usdcAmount, uint256 liquidity, uint256 timestamp);
        event DexPaused(uint256 timestamp);
        event DexUnpaused(uint256 timestamp);
        event ConfigUpdated(address indexed newConfig, uint256 timestamp);
    }
}

sol! {
    interface ICarbonOpus {
        event SongCreated(uint256 indexed tokenId, bytes32 indexed artist, uint256 price, uint256 referralPct);
        event SongPurchased(uint256 indexed tokenId, bytes32 indexed buyer, bytes32 referrer, uint256 price);
        event SongPriceUpdated(uint256 indexed tokenId, uint256 newPrice);
        event SongPriceScaled(uint256 indexed tokenId, uint256 newPrice);
        event SongReferralPctUpdated(uint256 indexed tokenId, uint256 newPct);
        event RewardsDistributed(bytes32 indexed artist, bytes32 indexed referrer, uint256 artistAmount, uint256 referrerAmount, uint256 protocolFee);
        event RewardsClaimed(bytes32 indexed memberId, uint256 amount);
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);
        event ProtocolFeeUpdated(uint256 newFee);
        event ControllerUpdated(address indexed newController);
        event MemberAddressUpdated(bytes32 indexed memberId, address newAddress);
    }
}

sol! {
    interface ICarbonCoinConfig {
        event DefaultConfigUpdated(uint8 configType, uint256 timestamp);
    }
}
