// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration management for the partner API client
//!
//! # Environment Variables
//!
//! The following environment variables are supported:
//!
//! - `ORDERDASH_CONFIG` - Path to a YAML config file (default: `~/.orderdash/config.yaml`)
//! - `ORDERDASH_API_BASE_URL` - Override the partner API base URL
//! - `ORDERDASH_PARTNER_CLIENT_ID` - Override the partner client id
//! - `ORDERDASH_PARTNER_CLIENT_SECRET` - Override the partner client secret
//!
//! Unset values fall back to local development defaults.

mod partner;

pub use partner::{
    PartnerConfig, ENV_API_BASE_URL, ENV_CONFIG_PATH, ENV_PARTNER_CLIENT_ID,
    ENV_PARTNER_CLIENT_SECRET, LOGIN_PATH,
};
