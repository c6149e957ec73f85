//! Constants used throughout the feedvault library.
//!
//! Central definitions for protocol strings and default endpoints. Changing any of
//! the derivation constants changes every user's key and feed address.

/// Feed topic name under which vaults are stored.
pub const FEED_TOPIC: &str = "password-manager";

/// Domain-separation suffix appended to the username to form the KDF salt.
pub const SALT_SUFFIX: &str = "@password-manager";

/// Default feed gateway.
pub const DEFAULT_GATEWAY_URL: &str = "https://swarm-gateways.net";

/// Path of the feed endpoint on the gateway.
pub const FEED_PATH: &str = "/bzz-feed:/";

/// Prefix of the local cache key holding a user's last sealed envelope.
pub const CACHE_KEY_PREFIX: &str = "data-";

/// Default timeout for a single feed request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
