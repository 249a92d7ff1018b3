//! Typed method tables derived from a contract ABI.
//!
//! [`generate_interface`] maps every callable function, map and variable of a
//! contract onto a host-side signature. The table is plain data: code
//! generators serialize it or render it through its `Display` impl, which
//! produces a TypeScript-style declaration:
//!
//! ```text
//! export interface CounterContract {
//!   getNumber: () => Promise<number>;
//! }
//! ```

use crate::abi::{AbiFunction, ClarityAbi, FunctionAccess};
use crate::error::ClarigenError;
use crate::types::ClarityType;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Host-language shape of a Clarity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostType {
    Number,
    Boolean,
    String,
    Buffer,
    Null,
    Nullable { inner: Box<HostType> },
    Array { element: Box<HostType> },
    Object { fields: Vec<(String, HostType)> },
    Response { ok: Box<HostType>, err: Box<HostType> },
    Unknown,
}

impl HostType {
    pub fn from_clarity(ty: &ClarityType) -> Self {
        match ty {
            ClarityType::Int | ClarityType::UInt => HostType::Number,
            ClarityType::Bool => HostType::Boolean,
            ClarityType::Principal | ClarityType::StringAscii { .. } | ClarityType::StringUtf8 { .. } => {
                HostType::String
            }
            ClarityType::Buffer { .. } => HostType::Buffer,
            ClarityType::None => HostType::Null,
            ClarityType::TraitReference => HostType::Unknown,
            ClarityType::Optional(inner) => HostType::Nullable {
                inner: Box::new(HostType::from_clarity(inner)),
            },
            ClarityType::List { element, .. } => HostType::Array {
                element: Box::new(HostType::from_clarity(element)),
            },
            ClarityType::Tuple(fields) => HostType::Object {
                fields: fields
                    .iter()
                    .map(|f| (f.name.clone(), HostType::from_clarity(&f.field_type)))
                    .collect(),
            },
            ClarityType::Response { ok, error } => HostType::Response {
                ok: Box::new(HostType::from_clarity(ok)),
                err: Box::new(HostType::from_clarity(error)),
            },
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Number => write!(f, "number"),
            HostType::Boolean => write!(f, "boolean"),
            HostType::String => write!(f, "string"),
            HostType::Buffer => write!(f, "Buffer"),
            HostType::Null => write!(f, "null"),
            HostType::Unknown => write!(f, "unknown"),
            HostType::Nullable { inner } => write!(f, "{} | null", inner),
            HostType::Array { element } => match element.as_ref() {
                HostType::Nullable { .. } => write!(f, "({})[]", element),
                _ => write!(f, "{}[]", element),
            },
            HostType::Object { fields } => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("\"{}\": {}", name, ty))
                    .collect();
                write!(f, "{{ {} }}", inner.join("; "))
            }
            HostType::Response { ok, err } => write!(f, "ClarityTypes.Response<{}, {}>", ok, err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Public,
    ReadOnly,
    MapGetter,
    VariableGetter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedArg {
    pub name: String,
    pub host_type: HostType,
    pub clarity_type: ClarityType,
}

/// What a generated accessor resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ReturnShape {
    /// State-changing call: a transaction yielding ok/err on submit
    Transaction { ok: HostType, err: HostType },
    /// Async read resolving to the value
    Promise { value: HostType },
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnShape::Transaction { ok, err } => write!(f, "Transaction<{}, {}>", ok, err),
            ReturnShape::Promise { value } => write!(f, "Promise<{}>", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Name as declared in the contract, e.g. `get-number`
    pub clarity_name: String,
    pub kind: MethodKind,
    pub args: Vec<TypedArg>,
    pub returns: ReturnShape,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| format!("{}: {}", a.name, a.host_type))
            .collect();
        write!(f, "({}) => {}", args.join(", "), self.returns)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedInterface {
    pub contract_name: String,
    /// Keyed by camel-cased accessor name
    pub methods: BTreeMap<String, MethodSignature>,
}

impl TypedInterface {
    /// `counter-v2` → `CounterV2Contract`
    pub fn interface_name(&self) -> String {
        let camel = to_camel_case(&self.contract_name);
        let mut chars = camel.chars();
        match chars.next() {
            Some(first) => format!("{}{}Contract", first.to_ascii_uppercase(), chars.as_str()),
            None => "Contract".to_string(),
        }
    }

    pub fn get(&self, accessor: &str) -> Option<&MethodSignature> {
        self.methods.get(accessor)
    }
}

impl fmt::Display for TypedInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "export interface {} {{", self.interface_name())?;
        for (name, method) in &self.methods {
            writeln!(f, "  {}: {};", name, method)?;
        }
        write!(f, "}}")
    }
}

/// `get-number` → `getNumber`; names without dashes are kept as-is
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn function_signature(func: &AbiFunction) -> MethodSignature {
    let args = func
        .args
        .iter()
        .map(|arg| TypedArg {
            name: to_camel_case(&arg.name),
            host_type: HostType::from_clarity(&arg.arg_type),
            clarity_type: arg.arg_type.clone(),
        })
        .collect();

    let (kind, returns) = match (func.access, func.return_type()) {
        (FunctionAccess::Public, ClarityType::Response { ok, error }) => (
            MethodKind::Public,
            ReturnShape::Transaction {
                ok: HostType::from_clarity(ok),
                err: HostType::from_clarity(error),
            },
        ),
        // public functions always return a response; anything else is treated as ok-only
        (FunctionAccess::Public, other) => (
            MethodKind::Public,
            ReturnShape::Transaction {
                ok: HostType::from_clarity(other),
                err: HostType::Null,
            },
        ),
        (_, other) => (
            MethodKind::ReadOnly,
            ReturnShape::Promise {
                value: HostType::from_clarity(other),
            },
        ),
    };

    MethodSignature {
        clarity_name: func.name.clone(),
        kind,
        args,
        returns,
    }
}

fn insert_unique(
    methods: &mut BTreeMap<String, MethodSignature>,
    signature: MethodSignature,
) -> Result<(), ClarigenError> {
    match methods.entry(to_camel_case(&signature.clarity_name)) {
        Entry::Occupied(existing) => Err(ClarigenError::Abi(format!(
            "`{}` and `{}` both map to accessor `{}`",
            existing.get().clarity_name,
            signature.clarity_name,
            existing.key()
        ))),
        Entry::Vacant(slot) => {
            slot.insert(signature);
            Ok(())
        }
    }
}

/// Build the typed method table for a contract.
///
/// Fails with [`ClarigenError::Abi`] when two entries share an accessor name,
/// e.g. `get-a` and `get-A`.
pub fn generate_interface(abi: &ClarityAbi, contract_name: &str) -> Result<TypedInterface, ClarigenError> {
    let mut methods = BTreeMap::new();

    for func in abi.callable_functions() {
        insert_unique(&mut methods, function_signature(func))?;
    }

    for map in &abi.maps {
        insert_unique(
            &mut methods,
            MethodSignature {
                clarity_name: map.name.clone(),
                kind: MethodKind::MapGetter,
                args: vec![TypedArg {
                    name: "key".to_string(),
                    host_type: HostType::from_clarity(&map.key),
                    clarity_type: map.key.clone(),
                }],
                returns: ReturnShape::Promise {
                    value: HostType::Nullable {
                        inner: Box::new(HostType::from_clarity(&map.value)),
                    },
                },
            },
        )?;
    }

    for var in &abi.variables {
        insert_unique(
            &mut methods,
            MethodSignature {
                clarity_name: var.name.clone(),
                kind: MethodKind::VariableGetter,
                args: Vec::new(),
                returns: ReturnShape::Promise {
                    value: HostType::from_clarity(&var.var_type),
                },
            },
        )?;
    }

    Ok(TypedInterface {
        contract_name: contract_name.to_string(),
        methods,
    })
}
