//! Clarity contract ABI as emitted by `clarity-cli` and the Stacks node.

use crate::error::ClarigenError;
use crate::types::ClarityType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionAccess {
    Public,
    ReadOnly,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiArg {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: ClarityType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiOutputs {
    #[serde(rename = "type")]
    pub output_type: ClarityType,
}

/// A function descriptor; immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    pub access: FunctionAccess,
    #[serde(default)]
    pub args: Vec<AbiArg>,
    pub outputs: AbiOutputs,
}

impl AbiFunction {
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn return_type(&self) -> &ClarityType {
        &self.outputs.output_type
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableAccess {
    Variable,
    Constant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: ClarityType,
    pub access: VariableAccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiMap {
    pub name: String,
    pub key: ClarityType,
    pub value: ClarityType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiFungibleToken {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiNonFungibleToken {
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: ClarityType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarityAbi {
    #[serde(default)]
    pub functions: Vec<AbiFunction>,
    #[serde(default)]
    pub variables: Vec<AbiVariable>,
    #[serde(default)]
    pub maps: Vec<AbiMap>,
    #[serde(default)]
    pub fungible_tokens: Vec<AbiFungibleToken>,
    #[serde(default)]
    pub non_fungible_tokens: Vec<AbiNonFungibleToken>,
}

impl ClarityAbi {
    pub fn find_function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn find_map(&self, name: &str) -> Option<&AbiMap> {
        self.maps.iter().find(|m| m.name == name)
    }

    pub fn find_variable(&self, name: &str) -> Option<&AbiVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Public and read-only functions; private functions are not callable
    pub fn callable_functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.functions
            .iter()
            .filter(|f| f.access != FunctionAccess::Private)
    }
}

pub fn parse_json_abi(json: &str) -> Result<ClarityAbi, ClarigenError> {
    serde_json::from_str(json).map_err(|e| ClarigenError::Abi(format!("Failed to parse JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUZZER_ABI: &str = r#"{
        "functions": [
            { "name": "get-name", "access": "public", "args": [],
              "outputs": { "type": { "response": { "ok": { "string-ascii": { "length": 8 } }, "error": "none" } } } },
            { "name": "get-number", "access": "read_only", "args": [], "outputs": { "type": "uint128" } },
            { "name": "helper", "access": "private", "args": [{ "name": "x", "type": "int128" }],
              "outputs": { "type": "int128" } }
        ],
        "variables": [
            { "name": "ERR_SOMETHING", "type": "uint128", "access": "constant" },
            { "name": "my-var", "type": "uint128", "access": "variable" }
        ],
        "maps": [{ "name": "basic-map", "key": "uint128", "value": "bool" }],
        "fungible_tokens": [],
        "non_fungible_tokens": []
    }"#;

    #[test]
    fn test_parse_abi() {
        let abi = parse_json_abi(FUZZER_ABI).unwrap();
        assert_eq!(abi.functions.len(), 3);
        assert_eq!(abi.callable_functions().count(), 2);

        let func = abi.find_function("get-number").unwrap();
        assert_eq!(func.access, FunctionAccess::ReadOnly);
        assert_eq!(func.arity(), 0);
        assert_eq!(func.return_type(), &ClarityType::UInt);

        assert_eq!(abi.find_variable("my-var").unwrap().access, VariableAccess::Variable);
        assert_eq!(abi.find_map("basic-map").unwrap().value, ClarityType::Bool);
    }

    #[test]
    fn test_missing_sections_default() {
        let abi = parse_json_abi(r#"{ "functions": [] }"#).unwrap();
        assert!(abi.maps.is_empty());
        assert!(abi.variables.is_empty());
    }

    #[test]
    fn test_bad_type_rejected() {
        let json = r#"{ "functions": [{ "name": "f", "access": "public", "args": [],
            "outputs": { "type": "float" } }] }"#;
        assert!(parse_json_abi(json).is_err());
    }
}
