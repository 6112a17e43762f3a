//! Runtime configuration read from the environment.
//!
//! | Variable                        | Default   |
//! |---------------------------------|-----------|
//! | `SHOPMIGRATE_PORT`              | `3000`    |
//! | `SHOPMIGRATE_IMAGE_BASE_URL`    | unset     |
//! | `SHOPMIGRATE_MAX_UPLOAD_BYTES`  | 50 MiB    |
//!
//! Loading a `.env` file is left to the binary's entry point.

use std::env;

use crate::api::logs::log_warning;

pub const PORT_VAR: &str = "SHOPMIGRATE_PORT";
pub const IMAGE_BASE_URL_VAR: &str = "SHOPMIGRATE_IMAGE_BASE_URL";
pub const MAX_UPLOAD_BYTES_VAR: &str = "SHOPMIGRATE_MAX_UPLOAD_BYTES";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP port for `serve`.
    pub port: u16,
    /// Base URL for relative image paths when a call does not supply one.
    pub image_base_url: Option<String>,
    /// Multipart body limit.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            image_base_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Invalid values are reported and replaced by their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or_default(PORT_VAR, lookup(PORT_VAR), defaults.port);
        let max_upload_bytes = parse_or_default(
            MAX_UPLOAD_BYTES_VAR,
            lookup(MAX_UPLOAD_BYTES_VAR),
            defaults.max_upload_bytes,
        );
        let image_base_url = lookup(IMAGE_BASE_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            port,
            image_base_url,
            max_upload_bytes,
        }
    }

    /// Override the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the image base URL
    pub fn with_image_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.image_base_url = Some(base_url.into());
        self
    }

    /// The request's base URL if given, otherwise the configured one.
    pub fn base_url_or<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or(self.image_base_url.as_deref())
    }
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            log_warning(format!(
                "Invalid {}='{}', using default {}",
                key, raw, default
            ));
            default
        }
    }
}
