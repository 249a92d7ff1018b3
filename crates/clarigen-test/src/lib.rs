//! Clarity contract testing over `clarity-cli`
//!
//! Deploys contracts into a scratch VM database, runs read-only calls,
//! prepares public calls as transactions, and decodes every result into
//! [`clarigen_core::ClarityValue`]s.

pub mod backend;
pub mod client;
pub mod config;
pub mod contract;
pub mod format;
pub mod helpers;
pub mod native;
pub mod provider;

pub use backend::{ClarityBackend, EvalReceipt, ExecuteReceipt, ExecuteRequest, ProviderError};
pub use client::Client;
pub use config::{Allocation, ClarityBinConfig, ConfigError};
pub use contract::{Contract, ContractInstance, Method};
pub use format::{format_arguments, format_value};
pub use helpers::{tx, tx_err, tx_ok};
pub use native::{create_clarity_bin, NativeClarityBin};
pub use provider::{CreateOptions, TestProvider, ROUTER_CONTRACT_NAME};
