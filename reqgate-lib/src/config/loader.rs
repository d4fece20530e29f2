use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{GateError, Result};

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| GateError::Config(format!("Failed to read config file: {e}")))?;
    load_from_str(&txt)
}

pub fn load_from_str(txt: &str) -> Result<Config> {
    let cfg: Config =
        toml::from_str(txt).map_err(|e| GateError::Config(format!("Failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> Result<()> {
    let base_url = cfg.client.base_url.trim();
    if base_url.is_empty() {
        return Err(GateError::Config("client.base_url cannot be empty".to_string()));
    }

    let uri = base_url.parse::<http::Uri>()?;
    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => {
            return Err(GateError::Config(format!(
                "client.base_url uses unsupported scheme '{other}' (only http is supported)"
            )));
        }
        None => {
            return Err(GateError::Config(format!(
                "client.base_url must be an absolute URL: {base_url}"
            )));
        }
    }
    if uri.authority().is_none() {
        return Err(GateError::Config(format!("client.base_url has no host: {base_url}")));
    }

    if cfg.throttle.window_ms == 0 {
        return Err(GateError::Config("throttle.window_ms must be > 0".to_string()));
    }
    if cfg.timeout.connect_ms == 0 {
        return Err(GateError::Config("timeout.connect_ms must be > 0".to_string()));
    }
    if cfg.timeout.request_ms == 0 {
        return Err(GateError::Config("timeout.request_ms must be > 0".to_string()));
    }

    Ok(())
}
