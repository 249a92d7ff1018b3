// Shared fixtures for provider integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use clarigen_core::{parse_json_abi, ClarityAbi};
use clarigen_test::{ClarityBackend, Contract, EvalReceipt, ExecuteReceipt, ExecuteRequest, ProviderError};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
pub const RECIPIENT: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

pub const FUZZER_ABI: &str = r#"{
    "functions": [
        { "name": "get-name", "access": "public", "args": [],
          "outputs": { "type": { "response": { "ok": { "string-ascii": { "length": 8 } }, "error": "none" } } } },
        { "name": "get-number", "access": "read_only", "args": [], "outputs": { "type": "uint128" } },
        { "name": "transfer", "access": "public",
          "args": [{ "name": "amount", "type": "uint128" }, { "name": "to", "type": "principal" }],
          "outputs": { "type": { "response": { "ok": "bool", "error": "uint128" } } } },
        { "name": "helper", "access": "private", "args": [], "outputs": { "type": "bool" } }
    ],
    "variables": [
        { "name": "ERR_SOMETHING", "type": "uint128", "access": "constant" },
        { "name": "my-var", "type": "uint128", "access": "variable" }
    ],
    "maps": [{ "name": "basic-map", "key": "uint128", "value": "bool" }],
    "fungible_tokens": [],
    "non_fungible_tokens": []
}"#;

/// Serialized `uN`
pub fn uint_hex(value: u128) -> String {
    format!("01{:032x}", value)
}

pub fn fuzzer_abi() -> ClarityAbi {
    parse_json_abi(FUZZER_ABI).unwrap()
}

pub fn fuzzer_contract() -> Contract {
    Contract::new("fuzzer", "contracts/fuzzer.clar", fuzzer_abi()).with_address(DEPLOYER)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCall {
    pub contract_id: String,
    pub sender: String,
    pub function: String,
    pub args: Vec<String>,
}

/// In-memory backend recording every round trip
pub struct MockBackend {
    pub launches: Mutex<Vec<String>>,
    pub evals: Mutex<Vec<(String, String)>>,
    pub executes: Mutex<Vec<ExecutedCall>>,
    eval_result: Mutex<Result<String, String>>,
    execute_result: Mutex<ExecuteReceipt>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            launches: Mutex::new(Vec::new()),
            evals: Mutex::new(Vec::new()),
            executes: Mutex::new(Vec::new()),
            eval_result: Mutex::new(Ok(uint_hex(42))),
            execute_result: Mutex::new(ExecuteReceipt {
                success: true,
                result_raw: "03".to_string(),
                events: Vec::new(),
            }),
        })
    }

    pub fn set_eval_result(&self, raw: &str) {
        *self.eval_result.lock().unwrap() = Ok(raw.to_string());
    }

    pub fn fail_evals(&self, message: &str) {
        *self.eval_result.lock().unwrap() = Err(message.to_string());
    }

    pub fn set_execute_result(&self, success: bool, raw: &str) {
        *self.execute_result.lock().unwrap() = ExecuteReceipt {
            success,
            result_raw: raw.to_string(),
            events: Vec::new(),
        };
    }

    pub fn launches(&self) -> Vec<String> {
        self.launches.lock().unwrap().clone()
    }

    pub fn evals(&self) -> Vec<(String, String)> {
        self.evals.lock().unwrap().clone()
    }

    pub fn executes(&self) -> Vec<ExecutedCall> {
        self.executes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClarityBackend for MockBackend {
    async fn launch(&self, contract_id: &str, _contract_file: &Path) -> Result<(), ProviderError> {
        self.launches.lock().unwrap().push(contract_id.to_string());
        Ok(())
    }

    async fn eval_raw(&self, contract_id: &str, code: &str) -> Result<EvalReceipt, ProviderError> {
        self.evals
            .lock()
            .unwrap()
            .push((contract_id.to_string(), code.to_string()));
        match &*self.eval_result.lock().unwrap() {
            Ok(raw) => Ok(EvalReceipt {
                result_raw: raw.clone(),
            }),
            Err(message) => Err(ProviderError::Reported {
                command: "eval_raw".to_string(),
                message: message.clone(),
            }),
        }
    }

    async fn execute(&self, request: ExecuteRequest<'_>) -> Result<ExecuteReceipt, ProviderError> {
        self.executes.lock().unwrap().push(ExecutedCall {
            contract_id: request.contract_id.to_string(),
            sender: request.sender.to_string(),
            function: request.function.to_string(),
            args: request.args.to_vec(),
        });
        Ok(self.execute_result.lock().unwrap().clone())
    }
}
