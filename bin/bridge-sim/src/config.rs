use std::collections::BTreeMap;

use omnibridge_primitives::{
    types::{Address, ChainId},
    U256,
};
use serde::{Deserialize, Serialize};

/// The topology of the simulated network.
///
/// Unlike the protocol params, nothing here has to be agreed upon by the chains: it only
/// describes which controllers exist, who owns them and which tokens live on each Gateway's
/// chain at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The Hub.
    pub hub: ControllerConfig,

    /// The Gateways, one per chain.
    #[serde(default)]
    pub gateways: Vec<GatewayConfig>,

    /// Where logs go besides stdout.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ControllerConfig {
    /// The chain the controller lives on.
    pub chain: ChainId,

    /// The controller's address.
    pub address: Address,

    /// The owner allowed to administer the controller.
    pub owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GatewayConfig {
    #[serde(flatten)]
    pub controller: ControllerConfig,

    /// Whether to make the Gateway and the Hub peers at startup.
    #[serde(default = "default_connect")]
    pub connect: bool,

    /// Token contracts deployed on the Gateway's chain.
    #[serde(default)]
    pub tokens: Vec<LocalTokenConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LocalTokenConfig {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,

    /// Initial balances by holder.
    #[serde(default)]
    pub balances: BTreeMap<Address, Balance>,
}

/// A token amount that accepts decimal or `0x`-prefixed numbers and strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Balance(#[serde(with = "ethnum::serde::permissive")] pub U256);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LoggingConfig {
    /// The OpenTelemetry collector to export traces to.
    pub otlp_url: Option<String>,
}

const fn default_connect() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_toml() {
        let config = r#"
            [hub]
            chain = 1
            address = "0x0000000000000000000000000000000000004b0b"
            owner = "0x0000000000000000000000000000000000000e0e"

            [[gateways]]
            chain = 10
            address = "0x0000000000000000000000000000000000006a7e"
            owner = "0x0000000000000000000000000000000000000e0e"

            [[gateways.tokens]]
            address = "0x00000000000000000000000000000000000005dc"
            symbol = "USDC"
            decimals = 6

            [gateways.tokens.balances]
            "0x00000000000000000000000000000000000a11ce" = 1_000_000_000

            [[gateways]]
            chain = 30
            address = "0x0000000000000000000000000000000000006a7f"
            owner = "0x0000000000000000000000000000000000000e0e"
            connect = false

            [logging]
            otlp_url = "http://localhost:4317"
        "#;

        let parsed = toml::from_str::<Config>(config);
        assert!(
            parsed.is_ok(),
            "must be able to deserialize Config from a toml, got: {:?}",
            parsed.err()
        );

        let parsed = parsed.unwrap();
        assert_eq!(parsed.hub.chain, 1);
        assert_eq!(parsed.gateways.len(), 2);
        assert!(parsed.gateways[0].connect);
        assert!(!parsed.gateways[1].connect);

        let usdc = &parsed.gateways[0].tokens[0];
        assert_eq!(usdc.decimals, 6);
        assert_eq!(
            usdc.balances.values().copied().collect::<Vec<_>>(),
            vec![Balance(U256::new(1_000_000_000))]
        );
        assert_eq!(
            parsed.logging.otlp_url.as_deref(),
            Some("http://localhost:4317")
        );

        let serialized = toml::to_string(&parsed).unwrap();
        assert_eq!(toml::from_str::<Config>(&serialized).unwrap(), parsed);
    }
}
