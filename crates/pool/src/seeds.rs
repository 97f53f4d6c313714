/// Hard-coded seed URLs used for cold-start bootstrap, mirroring the way
/// the reference pack keeps small static network tables as `const` arrays
/// rather than loading them from configuration.
pub const MAINNET_SEED_URLS: &[&str] = &[
    "https://storage.seed1.loki.network:4433/json_rpc",
    "https://storage.seed2.loki.network:4433/json_rpc",
    "https://public.loki.foundation:4433/json_rpc",
];

pub const TESTNET_SEED_URLS: &[&str] = &["https://storage.testnetseed1.loki.network:38157/json_rpc"];

pub fn seed_urls(testnet: bool) -> &'static [&'static str] {
    if testnet {
        TESTNET_SEED_URLS
    } else {
        MAINNET_SEED_URLS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_has_at_least_one_seed() {
        assert!(!seed_urls(false).is_empty());
    }

    #[test]
    fn testnet_uses_a_distinct_list() {
        assert_ne!(seed_urls(true), seed_urls(false));
    }
}
