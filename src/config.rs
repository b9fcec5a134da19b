use std::path::Path;

use anyhow::{Result, bail};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Bytes read per block by the sequential scan and by every worker.
    pub block_size: usize,
    /// Sources smaller than this many bytes are always scanned sequentially.
    pub sequential_threshold: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: 4096,
            sequential_threshold: 4096,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p)?
    } else {
        include_bytes!("../config/default.yml").to_vec()
    };

    let config: Config = serde_yaml::from_slice(&bytes)?;
    if config.block_size == 0 {
        bail!("block_size must be greater than zero");
    }

    Ok(config)
}
