//! Transfer options
//!
//! A [`TransferOptions`] value is the caller-facing configuration snapshot,
//! taken by value at the start of each transfer. Start from
//! [`new_options`] and override what the host needs; the defaults carry a
//! freshly generated shared secret.

use crate::secret::generate_secret;

/// Relay host compiled into the engine
pub const DEFAULT_RELAY: &str = "croc.schollz.com";

/// Relay host for the secondary (IPv6) address family
pub const DEFAULT_RELAY6: &str = "croc6.schollz.com";

/// Relay ports, comma separated
pub const DEFAULT_RELAY_PORTS: &str = "9009,9010,9011,9012,9013";

pub const DEFAULT_RELAY_PASSWORD: &str = "pass123";

pub const DEFAULT_CURVE: &str = "p256";

pub const DEFAULT_HASH_ALGORITHM: &str = "xxhash";

/// Caller-supplied transfer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Act as the sending side
    pub is_sender: bool,
    /// Code both peers use to find and authenticate each other
    pub shared_secret: String,
    /// Verbose engine output
    pub debug: bool,
    /// Leave diagnostic output alone while the engine runs
    pub debug_wrapper: bool,
    pub relay_address: String,
    pub relay_address6: String,
    /// Comma separated, e.g. "9009,9010"
    pub relay_ports: String,
    pub relay_password: String,
    pub stdout: bool,
    pub no_prompt: bool,
    pub no_multiplexing: bool,
    pub disable_local: bool,
    pub only_local: bool,
    pub ignore_stdin: bool,
    pub ask: bool,
    pub sending_text: bool,
    pub no_compress: bool,
    pub overwrite: bool,
    /// Elliptic curve for the key exchange
    pub curve: String,
    /// Hash used to verify received files
    pub hash_algorithm: String,
    /// Upload limit passed through to the engine (e.g. "500k"), empty for none
    pub throttle_upload: String,
    pub zip_folder: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            is_sender: true,
            shared_secret: generate_secret(),
            debug: false,
            debug_wrapper: false,
            relay_address: DEFAULT_RELAY.to_string(),
            relay_address6: DEFAULT_RELAY6.to_string(),
            relay_ports: DEFAULT_RELAY_PORTS.to_string(),
            relay_password: DEFAULT_RELAY_PASSWORD.to_string(),
            stdout: false,
            no_prompt: false,
            no_multiplexing: false,
            disable_local: false,
            only_local: false,
            ignore_stdin: false,
            ask: false,
            sending_text: false,
            no_compress: false,
            overwrite: false,
            curve: DEFAULT_CURVE.to_string(),
            hash_algorithm: DEFAULT_HASH_ALGORITHM.to_string(),
            throttle_upload: String::new(),
            zip_folder: false,
        }
    }
}

/// Fully populated default options with a fresh secret
pub fn new_options() -> TransferOptions {
    TransferOptions::default()
}

impl TransferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relay ports as an ordered list
    ///
    /// Split on commas only. Empty segments are kept, so "9009,,9010"
    /// yields three entries; callers are expected to pass a clean list.
    pub fn relay_port_list(&self) -> Vec<String> {
        self.relay_ports.split(',').map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = new_options();
        assert!(options.is_sender);
        assert!(!options.shared_secret.is_empty());
        assert_eq!(options.relay_address, DEFAULT_RELAY);
        assert_eq!(options.relay_address6, DEFAULT_RELAY6);
        assert_eq!(options.relay_ports, "9009,9010,9011,9012,9013");
        assert_eq!(options.relay_password, "pass123");
        assert_eq!(options.curve, "p256");
        assert_eq!(options.hash_algorithm, "xxhash");
        assert!(options.throttle_upload.is_empty());
        assert!(!options.debug && !options.debug_wrapper && !options.zip_folder);
        assert!(!options.only_local && !options.disable_local && !options.no_multiplexing);
    }

    #[test]
    fn test_each_default_gets_its_own_secret() {
        assert_ne!(new_options().shared_secret, new_options().shared_secret);
    }

    #[test]
    fn test_relay_port_list() {
        let options = TransferOptions::new();
        assert_eq!(
            options.relay_port_list(),
            vec!["9009", "9010", "9011", "9012", "9013"]
        );

        let options = TransferOptions {
            relay_ports: "9009,,9010".into(),
            ..TransferOptions::new()
        };
        assert_eq!(options.relay_port_list(), vec!["9009", "", "9010"]);

        let options = TransferOptions {
            relay_ports: String::new(),
            ..TransferOptions::new()
        };
        assert_eq!(options.relay_port_list(), vec![""]);
    }
}
