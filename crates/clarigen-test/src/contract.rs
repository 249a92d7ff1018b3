//! Contract descriptors and their callable instances.
//!
//! A [`ContractInstance`] is a dispatch table built once from the ABI: every
//! callable function, map and variable gets an entry holding a closure over the
//! provider and the entry's descriptor.

use crate::provider::TestProvider;
use clarigen_core::interface::to_camel_case;
use clarigen_core::{
    generate_interface, parse_json_abi, ClarigenError, ClarityAbi, ClarityValue, FunctionAccess,
    Result, Transaction, TypedInterface,
};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A contract to deploy: source file, ABI and the on-chain address it lives at
#[derive(Debug, Clone)]
pub struct Contract {
    pub name: String,
    pub address: Option<String>,
    pub contract_file: PathBuf,
    pub abi: ClarityAbi,
}

impl Contract {
    pub fn new(name: impl Into<String>, contract_file: impl AsRef<Path>, abi: ClarityAbi) -> Self {
        Self {
            name: name.into(),
            address: None,
            contract_file: contract_file.as_ref().to_path_buf(),
            abi,
        }
    }

    /// Load the ABI from a JSON file next to the source
    pub fn from_abi_file(
        name: impl Into<String>,
        contract_file: impl AsRef<Path>,
        abi_file: impl AsRef<Path>,
    ) -> Result<Self> {
        let abi_file = abi_file.as_ref();
        let json = std::fs::read_to_string(abi_file)
            .map_err(|e| ClarigenError::Abi(format!("Failed to read {}: {}", abi_file.display(), e)))?;
        Ok(Self::new(name, contract_file, parse_json_abi(&json)?))
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn require_address(&self) -> Result<&str> {
        match self.address.as_deref() {
            Some(address) if !address.is_empty() => Ok(address),
            _ => Err(ClarigenError::MissingAddress(self.name.clone())),
        }
    }
}

type ReadFn = Box<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<ClarityValue>> + Send + Sync>;
type PublicFn = Box<dyn Fn(Vec<Value>) -> Result<Transaction> + Send + Sync>;
type MapFn = Box<dyn Fn(Value) -> BoxFuture<'static, Result<ClarityValue>> + Send + Sync>;
type VarFn = Box<dyn Fn() -> BoxFuture<'static, Result<ClarityValue>> + Send + Sync>;

pub enum Method {
    ReadOnly(ReadFn),
    Public(PublicFn),
    Map(MapFn),
    Variable(VarFn),
}

impl Method {
    fn kind(&self) -> &'static str {
        match self {
            Method::ReadOnly(_) => "read-only function",
            Method::Public(_) => "public function",
            Method::Map(_) => "map",
            Method::Variable(_) => "variable",
        }
    }
}

pub struct ContractInstance {
    name: String,
    provider: TestProvider,
    interface: TypedInterface,
    methods: BTreeMap<String, Method>,
}

impl ContractInstance {
    /// Fails with [`ClarigenError::Abi`] when two ABI entries share an accessor name
    pub fn new(contract: &Contract, provider: TestProvider) -> Result<Self> {
        let interface = generate_interface(&contract.abi, &contract.name)?;
        Ok(Self::with_interface(contract, interface, provider))
    }

    /// Build the table for an interface already generated from `contract.abi`,
    /// which guarantees the accessor names are unique
    pub(crate) fn with_interface(
        contract: &Contract,
        interface: TypedInterface,
        provider: TestProvider,
    ) -> Self {
        let mut methods = BTreeMap::new();

        for func in contract.abi.callable_functions() {
            let func = func.clone();
            let name = to_camel_case(&func.name);
            let p = provider.clone();
            let method = match func.access {
                FunctionAccess::Public => Method::Public(Box::new(move |args: Vec<Value>| p.call_public(&func, &args))),
                _ => Method::ReadOnly(Box::new(move |args: Vec<Value>| {
                    let p = p.clone();
                    let func = func.clone();
                    async move { p.call_read_only(&func, &args).await }.boxed()
                })),
            };
            methods.insert(name, method);
        }

        for map in &contract.abi.maps {
            let map = map.clone();
            let name = to_camel_case(&map.name);
            let p = provider.clone();
            methods.insert(
                name,
                Method::Map(Box::new(move |key: Value| {
                    let p = p.clone();
                    let map = map.clone();
                    async move { p.call_map(&map, &key).await }.boxed()
                })),
            );
        }

        for var in &contract.abi.variables {
            let var = var.clone();
            let name = to_camel_case(&var.name);
            let p = provider.clone();
            methods.insert(
                name,
                Method::Variable(Box::new(move || {
                    let p = p.clone();
                    let var = var.clone();
                    async move { p.call_variable(&var).await }.boxed()
                })),
            );
        }

        Self {
            name: contract.name.clone(),
            provider,
            interface,
            methods,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &TestProvider {
        &self.provider
    }

    pub fn interface(&self) -> &TypedInterface {
        &self.interface
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Look up by accessor name (`getNumber`) or Clarity name (`get-number`)
    fn method(&self, name: &str) -> Result<&Method> {
        self.methods
            .get(name)
            .or_else(|| self.methods.get(&to_camel_case(name)))
            .ok_or_else(|| ClarigenError::UnknownMethod(name.to_string()))
    }

    fn wrong_kind(name: &str, method: &Method) -> ClarigenError {
        ClarigenError::UnknownMethod(format!("{} (is a {})", name, method.kind()))
    }

    pub async fn read_only(&self, name: &str, args: Vec<Value>) -> Result<ClarityValue> {
        match self.method(name)? {
            Method::ReadOnly(call) => call(args).await,
            other => Err(Self::wrong_kind(name, other)),
        }
    }

    pub fn public(&self, name: &str, args: Vec<Value>) -> Result<Transaction> {
        match self.method(name)? {
            Method::Public(call) => call(args),
            other => Err(Self::wrong_kind(name, other)),
        }
    }

    pub async fn map_get(&self, name: &str, key: Value) -> Result<ClarityValue> {
        match self.method(name)? {
            Method::Map(call) => call(key).await,
            other => Err(Self::wrong_kind(name, other)),
        }
    }

    pub async fn var_get(&self, name: &str) -> Result<ClarityValue> {
        match self.method(name)? {
            Method::Variable(call) => call().await,
            other => Err(Self::wrong_kind(name, other)),
        }
    }
}

impl fmt::Debug for ContractInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractInstance")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
