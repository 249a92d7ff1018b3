//! Test provider: typed contract calls over a [`ClarityBackend`].

use crate::backend::{ClarityBackend, ExecuteRequest};
use crate::client::Client;
use crate::config::ClarityBinConfig;
use crate::contract::{Contract, ContractInstance};
use crate::format::{format_arguments, format_value};
use crate::native::create_clarity_bin;
use async_trait::async_trait;
use clarigen_core::{
    decode_hex, generate_interface, AbiFunction, AbiMap, AbiVariable, ClarigenError, ClarityValue,
    Receipt, Result, Submitter, Transaction, VariableAccess,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Contract name every descriptor-based deployment is published under
pub const ROUTER_CONTRACT_NAME: &str = "router";

pub struct CreateOptions {
    pub backend: Arc<dyn ClarityBackend>,
    pub contract_identifier: String,
    pub contract_file: PathBuf,
}

#[derive(Clone)]
pub struct TestProvider {
    backend: Arc<dyn ClarityBackend>,
    client: Client,
}

impl TestProvider {
    pub fn new(backend: Arc<dyn ClarityBackend>, client: Client) -> Self {
        Self { backend, client }
    }

    /// Deploy `contract_file` as `contract_identifier` and bind to it
    pub async fn create(options: CreateOptions) -> Result<Self> {
        let client = Client::new(
            options.contract_identifier,
            &options.contract_file,
            options.backend.clone(),
        );
        client.deploy_contract().await?;
        Ok(Self::new(options.backend, client))
    }

    /// Deploy a contract descriptor under `{address}.router` and return its instance
    pub async fn from_contract(contract: &Contract, backend: Arc<dyn ClarityBackend>) -> Result<ContractInstance> {
        let address = contract.require_address()?;
        let interface = generate_interface(&contract.abi, &contract.name)?;
        let provider = Self::create(CreateOptions {
            backend,
            contract_identifier: format!("{}.{}", address, ROUTER_CONTRACT_NAME),
            contract_file: contract.contract_file.clone(),
        })
        .await?;
        Ok(ContractInstance::with_interface(contract, interface, provider))
    }

    /// Provision one native provider and deploy every contract against it, in order
    pub async fn from_contracts(
        contracts: &BTreeMap<String, Contract>,
        config: &ClarityBinConfig,
    ) -> Result<BTreeMap<String, ContractInstance>> {
        for contract in contracts.values() {
            contract.require_address()?;
        }

        let backend: Arc<dyn ClarityBackend> = create_clarity_bin(config).await?;
        Self::deploy_all(contracts, backend).await
    }

    /// Deploy every contract against an existing backend, in key order
    pub async fn deploy_all(
        contracts: &BTreeMap<String, Contract>,
        backend: Arc<dyn ClarityBackend>,
    ) -> Result<BTreeMap<String, ContractInstance>> {
        let mut instances = BTreeMap::new();
        for (key, contract) in contracts {
            let instance = Self::from_contract(contract, backend.clone()).await?;
            instances.insert(key.clone(), instance);
        }
        info!(count = instances.len(), "Contracts deployed");
        Ok(instances)
    }

    pub fn contract_id(&self) -> &str {
        &self.client.name
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn backend(&self) -> Arc<dyn ClarityBackend> {
        self.backend.clone()
    }

    pub async fn call_read_only(&self, func: &AbiFunction, args: &[Value]) -> Result<ClarityValue> {
        let formatted = format_arguments(func, args)?;
        debug!(contract = %self.client.name, function = %func.name, args = ?formatted, "read-only call");

        let receipt = self
            .backend
            .evaluate(&self.client.name, &func.name, &formatted)
            .await
            .map_err(|e| ClarigenError::Evaluation(e.to_string()))?;
        decode_result(&receipt.result_raw)
    }

    /// Prepare a public call; nothing runs until the transaction is submitted
    pub fn call_public(&self, func: &AbiFunction, args: &[Value]) -> Result<Transaction> {
        let formatted = format_arguments(func, args)?;
        Ok(Transaction::new(PublicCall {
            backend: self.backend.clone(),
            contract_id: self.client.name.clone(),
            function: func.name.clone(),
            args: formatted,
        }))
    }

    /// `(map-get? name key)`
    pub async fn call_map(&self, map: &AbiMap, key: &Value) -> Result<ClarityValue> {
        let key_literal = format_value(key, &map.key).map_err(|source| ClarigenError::TypeMismatch {
            function: map.name.clone(),
            position: 0,
            source,
        })?;
        self.eval_code(&format!("(map-get? {} {})", map.name, key_literal)).await
    }

    /// `(var-get name)`, or the bare name for constants
    pub async fn call_variable(&self, var: &AbiVariable) -> Result<ClarityValue> {
        let code = match var.access {
            VariableAccess::Variable => format!("(var-get {})", var.name),
            VariableAccess::Constant => var.name.clone(),
        };
        self.eval_code(&code).await
    }

    async fn eval_code(&self, code: &str) -> Result<ClarityValue> {
        debug!(contract = %self.client.name, code, "eval");
        let receipt = self
            .backend
            .eval_raw(&self.client.name, code)
            .await
            .map_err(|e| ClarigenError::Evaluation(e.to_string()))?;
        decode_result(&receipt.result_raw)
    }
}

impl std::fmt::Debug for TestProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestProvider").field("client", &self.client).finish()
    }
}

fn decode_result(raw: &str) -> Result<ClarityValue> {
    decode_hex(raw).map_err(|e| ClarigenError::Evaluation(format!("malformed result `{}`: {}", raw, e)))
}

/// A formatted public call waiting for a sender
struct PublicCall {
    backend: Arc<dyn ClarityBackend>,
    contract_id: String,
    function: String,
    args: Vec<String>,
}

#[async_trait]
impl Submitter for PublicCall {
    async fn submit(&self, sender: &str) -> Result<Receipt> {
        debug!(
            contract = %self.contract_id,
            function = %self.function,
            sender,
            args = ?self.args,
            "submitting public call"
        );
        let receipt = self
            .backend
            .execute(ExecuteRequest {
                contract_id: &self.contract_id,
                sender,
                function: &self.function,
                args: &self.args,
            })
            .await?;

        if !receipt.success {
            warn!(
                contract = %self.contract_id,
                function = %self.function,
                "public call returned an error response"
            );
        }

        Ok(Receipt::new(receipt.success, receipt.result_raw).with_events(receipt.events))
    }
}
