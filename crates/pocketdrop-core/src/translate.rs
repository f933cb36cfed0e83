//! Options → engine configuration
//!
//! Validation happens here so a bad call fails before any request handle
//! or background work exists.

use std::path::Path;

use tracing::debug;

use crate::error::ValidationError;
use crate::options::{TransferOptions, DEFAULT_RELAY, DEFAULT_RELAY6};

/// Configuration in the shape the engine expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub is_sender: bool,
    pub shared_secret: String,
    pub debug: bool,
    pub relay_address: String,
    pub relay_address6: String,
    pub relay_ports: Vec<String>,
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
    pub curve: String,
    pub hash_algorithm: String,
    pub throttle_upload: String,
    pub zip_folder: bool,
}

impl EngineConfig {
    /// Translate options, applying the relay precedence rule
    ///
    /// Overriding the primary relay clears the secondary one. Otherwise,
    /// overriding the secondary relay clears the primary. With both at
    /// their defaults, both are kept.
    pub fn from_options(options: &TransferOptions) -> Self {
        let mut config = Self {
            is_sender: options.is_sender,
            shared_secret: options.shared_secret.clone(),
            debug: options.debug,
            relay_address: options.relay_address.clone(),
            relay_address6: options.relay_address6.clone(),
            relay_ports: options.relay_port_list(),
            relay_password: options.relay_password.clone(),
            stdout: options.stdout,
            no_prompt: options.no_prompt,
            no_multiplexing: options.no_multiplexing,
            disable_local: options.disable_local,
            only_local: options.only_local,
            ignore_stdin: options.ignore_stdin,
            ask: options.ask,
            sending_text: options.sending_text,
            no_compress: options.no_compress,
            overwrite: options.overwrite,
            curve: options.curve.clone(),
            hash_algorithm: options.hash_algorithm.clone(),
            throttle_upload: options.throttle_upload.clone(),
            zip_folder: options.zip_folder,
        };

        if config.relay_address != DEFAULT_RELAY {
            debug!("custom relay {}, dropping relay6", config.relay_address);
            config.relay_address6.clear();
        } else if config.relay_address6 != DEFAULT_RELAY6 {
            debug!("custom relay6 {}, dropping relay", config.relay_address6);
            config.relay_address.clear();
        }

        config
    }
}

/// Validate a send call, substituting defaults for missing options
pub fn validate_send(
    path: &Path,
    options: Option<TransferOptions>,
) -> Result<TransferOptions, ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    let options = options.unwrap_or_default();
    validate_secret(&options)?;
    Ok(options)
}

/// Validate a receive call
pub fn validate_receive(options: &TransferOptions) -> Result<(), ValidationError> {
    validate_secret(options)
}

fn validate_secret(options: &TransferOptions) -> Result<(), ValidationError> {
    if options.shared_secret.is_empty() {
        return Err(ValidationError::EmptySecret);
    }
    Ok(())
}
