//! Clarity type descriptors as they appear in a contract ABI.

use crate::error::ClarigenError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Declared type of an argument, output, variable or map entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ClarityType {
    Int,
    UInt,
    Bool,
    Principal,
    None,
    TraitReference,
    Buffer { length: u32 },
    StringAscii { length: u32 },
    StringUtf8 { length: u32 },
    Optional(Box<ClarityType>),
    Response {
        ok: Box<ClarityType>,
        error: Box<ClarityType>,
    },
    List {
        element: Box<ClarityType>,
        length: u32,
    },
    Tuple(Vec<TupleField>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    pub name: String,
    pub field_type: ClarityType,
}

impl ClarityType {
    /// Parse the ABI JSON form, e.g. `"uint128"` or `{"optional": "bool"}`
    pub fn from_json(value: &Value) -> Result<Self, ClarigenError> {
        match value {
            Value::String(name) => match name.as_str() {
                "int128" => Ok(ClarityType::Int),
                "uint128" => Ok(ClarityType::UInt),
                "bool" => Ok(ClarityType::Bool),
                "principal" => Ok(ClarityType::Principal),
                "none" => Ok(ClarityType::None),
                "trait_reference" => Ok(ClarityType::TraitReference),
                other => Err(ClarigenError::Abi(format!("unknown type `{}`", other))),
            },
            Value::Object(map) if map.len() == 1 => {
                let Some((kind, inner)) = map.iter().next() else {
                    return Err(ClarigenError::Abi("empty type object".into()));
                };
                match kind.as_str() {
                    "buffer" => Ok(ClarityType::Buffer {
                        length: Self::length_of(inner, kind)?,
                    }),
                    "string-ascii" => Ok(ClarityType::StringAscii {
                        length: Self::length_of(inner, kind)?,
                    }),
                    "string-utf8" => Ok(ClarityType::StringUtf8 {
                        length: Self::length_of(inner, kind)?,
                    }),
                    "optional" => Ok(ClarityType::Optional(Box::new(Self::from_json(inner)?))),
                    "response" => {
                        let ok = inner
                            .get("ok")
                            .ok_or_else(|| ClarigenError::Abi("response without `ok`".into()))?;
                        let error = inner
                            .get("error")
                            .ok_or_else(|| ClarigenError::Abi("response without `error`".into()))?;
                        Ok(ClarityType::Response {
                            ok: Box::new(Self::from_json(ok)?),
                            error: Box::new(Self::from_json(error)?),
                        })
                    }
                    "list" => {
                        let element = inner
                            .get("type")
                            .ok_or_else(|| ClarigenError::Abi("list without `type`".into()))?;
                        Ok(ClarityType::List {
                            element: Box::new(Self::from_json(element)?),
                            length: Self::length_of(inner, kind)?,
                        })
                    }
                    "tuple" => {
                        let entries = inner
                            .as_array()
                            .ok_or_else(|| ClarigenError::Abi("tuple must be an array".into()))?;
                        let mut fields = Vec::with_capacity(entries.len());
                        for entry in entries {
                            let name = entry
                                .get("name")
                                .and_then(Value::as_str)
                                .ok_or_else(|| ClarigenError::Abi("tuple field without name".into()))?;
                            let field_type = entry
                                .get("type")
                                .ok_or_else(|| ClarigenError::Abi(format!("tuple field `{}` without type", name)))?;
                            fields.push(TupleField {
                                name: name.to_string(),
                                field_type: Self::from_json(field_type)?,
                            });
                        }
                        Ok(ClarityType::Tuple(fields))
                    }
                    other => Err(ClarigenError::Abi(format!("unknown type `{}`", other))),
                }
            }
            other => Err(ClarigenError::Abi(format!("malformed type: {}", other))),
        }
    }

    fn length_of(inner: &Value, kind: &str) -> Result<u32, ClarigenError> {
        inner
            .get("length")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| ClarigenError::Abi(format!("`{}` without a valid length", kind)))
    }

    /// Inverse of [`ClarityType::from_json`]
    pub fn to_json(&self) -> Value {
        match self {
            ClarityType::Int => json!("int128"),
            ClarityType::UInt => json!("uint128"),
            ClarityType::Bool => json!("bool"),
            ClarityType::Principal => json!("principal"),
            ClarityType::None => json!("none"),
            ClarityType::TraitReference => json!("trait_reference"),
            ClarityType::Buffer { length } => json!({ "buffer": { "length": length } }),
            ClarityType::StringAscii { length } => json!({ "string-ascii": { "length": length } }),
            ClarityType::StringUtf8 { length } => json!({ "string-utf8": { "length": length } }),
            ClarityType::Optional(inner) => json!({ "optional": inner.to_json() }),
            ClarityType::Response { ok, error } => {
                json!({ "response": { "ok": ok.to_json(), "error": error.to_json() } })
            }
            ClarityType::List { element, length } => {
                json!({ "list": { "type": element.to_json(), "length": length } })
            }
            ClarityType::Tuple(fields) => {
                let entries: Vec<Value> = fields
                    .iter()
                    .map(|f| json!({ "name": f.name, "type": f.field_type.to_json() }))
                    .collect();
                json!({ "tuple": entries })
            }
        }
    }

    pub fn is_principal(&self) -> bool {
        matches!(self, ClarityType::Principal)
    }

    /// Clarity source syntax for the type, e.g. `(list 10 uint)`
    pub fn display_name(&self) -> String {
        match self {
            ClarityType::Int => "int".to_string(),
            ClarityType::UInt => "uint".to_string(),
            ClarityType::Bool => "bool".to_string(),
            ClarityType::Principal => "principal".to_string(),
            ClarityType::None => "none".to_string(),
            ClarityType::TraitReference => "trait_reference".to_string(),
            ClarityType::Buffer { length } => format!("(buff {})", length),
            ClarityType::StringAscii { length } => format!("(string-ascii {})", length),
            ClarityType::StringUtf8 { length } => format!("(string-utf8 {})", length),
            ClarityType::Optional(inner) => format!("(optional {})", inner.display_name()),
            ClarityType::Response { ok, error } => {
                format!("(response {} {})", ok.display_name(), error.display_name())
            }
            ClarityType::List { element, length } => {
                format!("(list {} {})", length, element.display_name())
            }
            ClarityType::Tuple(fields) => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|f| format!("({} {})", f.name, f.field_type.display_name()))
                    .collect();
                format!("(tuple {})", inner.join(" "))
            }
        }
    }
}

impl TryFrom<Value> for ClarityType {
    type Error = ClarigenError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ClarityType::from_json(&value)
    }
}

impl From<ClarityType> for Value {
    fn from(ty: ClarityType) -> Self {
        ty.to_json()
    }
}

impl std::fmt::Display for ClarityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
