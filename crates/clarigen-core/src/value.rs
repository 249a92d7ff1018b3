//! Clarity values and their canonical literal rendering.

use crate::c32::{c32_address, c32_address_decode};
use crate::error::CodecError;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const MAX_CONTRACT_NAME_LEN: usize = 128;

/// A standard principal: address version plus hash160
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StandardPrincipal {
    pub version: u8,
    pub hash160: [u8; 20],
}

impl StandardPrincipal {
    pub fn to_address(&self) -> String {
        c32_address(self.version, &self.hash160)
    }
}

impl FromStr for StandardPrincipal {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, hash160) = c32_address_decode(s)?;
        Ok(StandardPrincipal { version, hash160 })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrincipalData {
    Standard(StandardPrincipal),
    Contract {
        issuer: StandardPrincipal,
        name: String,
    },
}

impl PrincipalData {
    pub fn contract(issuer: StandardPrincipal, name: &str) -> Result<Self, CodecError> {
        validate_contract_name(name)?;
        Ok(PrincipalData::Contract {
            issuer,
            name: name.to_string(),
        })
    }
}

impl FromStr for PrincipalData {
    type Err = CodecError;

    /// Accepts `ADDR` or `ADDR.contract-name`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((address, name)) => PrincipalData::contract(address.parse()?, name),
            None => Ok(PrincipalData::Standard(s.parse()?)),
        }
    }
}

impl fmt::Display for PrincipalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalData::Standard(p) => write!(f, "{}", p.to_address()),
            PrincipalData::Contract { issuer, name } => write!(f, "{}.{}", issuer.to_address(), name),
        }
    }
}

pub(crate) fn validate_contract_name(name: &str) -> Result<(), CodecError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_CONTRACT_NAME_LEN
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CodecError::InvalidName(name.to_string()))
    }
}

/// A value in the Clarity value model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Bool(bool),
    Buffer(Vec<u8>),
    Principal(PrincipalData),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    Tuple(BTreeMap<String, ClarityValue>),
    StringAscii(String),
    StringUtf8(String),
}

impl ClarityValue {
    /// Wrap a value as `(ok value)`
    pub fn wrap_ok(value: ClarityValue) -> Self {
        ClarityValue::ResponseOk(Box::new(value))
    }

    /// Wrap a value as `(err value)`
    pub fn wrap_err(value: ClarityValue) -> Self {
        ClarityValue::ResponseErr(Box::new(value))
    }

    pub fn some(value: ClarityValue) -> Self {
        ClarityValue::OptionalSome(Box::new(value))
    }

    /// Canonical Clarity literal, e.g. `u42` or `(ok (some true))`
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Name of the value's kind, used in mismatch messages
    pub fn kind(&self) -> &'static str {
        match self {
            ClarityValue::Int(_) => "int",
            ClarityValue::UInt(_) => "uint",
            ClarityValue::Bool(_) => "bool",
            ClarityValue::Buffer(_) => "buffer",
            ClarityValue::Principal(_) => "principal",
            ClarityValue::ResponseOk(_) => "response-ok",
            ClarityValue::ResponseErr(_) => "response-err",
            ClarityValue::OptionalNone => "none",
            ClarityValue::OptionalSome(_) => "some",
            ClarityValue::List(_) => "list",
            ClarityValue::Tuple(_) => "tuple",
            ClarityValue::StringAscii(_) => "string-ascii",
            ClarityValue::StringUtf8(_) => "string-utf8",
        }
    }

    /// Host-side JSON view of the value
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value};
        match self {
            // strings, so 128-bit values stay exact
            ClarityValue::Int(n) => json!(n.to_string()),
            ClarityValue::UInt(n) => json!(n.to_string()),
            ClarityValue::Bool(b) => json!(b),
            ClarityValue::Buffer(bytes) => json!(format!("0x{}", hex::encode(bytes))),
            ClarityValue::Principal(p) => json!(p.to_string()),
            ClarityValue::ResponseOk(v) => json!({ "ok": v.to_json() }),
            ClarityValue::ResponseErr(v) => json!({ "err": v.to_json() }),
            ClarityValue::OptionalNone => Value::Null,
            ClarityValue::OptionalSome(v) => v.to_json(),
            ClarityValue::List(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            ClarityValue::Tuple(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            ClarityValue::StringAscii(s) | ClarityValue::StringUtf8(s) => json!(s),
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            other => write!(f, "{}", other)?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for ClarityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClarityValue::Int(n) => write!(f, "{}", n),
            ClarityValue::UInt(n) => write!(f, "u{}", n),
            ClarityValue::Bool(b) => write!(f, "{}", b),
            ClarityValue::Buffer(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            ClarityValue::Principal(p) => write!(f, "{}", p),
            ClarityValue::ResponseOk(v) => write!(f, "(ok {})", v),
            ClarityValue::ResponseErr(v) => write!(f, "(err {})", v),
            ClarityValue::OptionalNone => write!(f, "none"),
            ClarityValue::OptionalSome(v) => write!(f, "(some {})", v),
            ClarityValue::List(items) => {
                write!(f, "(list")?;
                for item in items {
                    write!(f, " {}", item)?;
                }
                write!(f, ")")
            }
            ClarityValue::Tuple(fields) => {
                write!(f, "(tuple")?;
                for (name, value) in fields {
                    write!(f, " ({} {})", name, value)?;
                }
                write!(f, ")")
            }
            ClarityValue::StringAscii(s) => write_escaped(f, s),
            ClarityValue::StringUtf8(s) => {
                f.write_str("u")?;
                write_escaped(f, s)
            }
        }
    }
}

impl Serialize for ClarityValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    #[test]
    fn test_render_scalars() {
        assert_eq!(ClarityValue::UInt(100).render(), "u100");
        assert_eq!(ClarityValue::Int(-7).render(), "-7");
        assert_eq!(ClarityValue::Buffer(vec![0xde, 0xad]).render(), "0xdead");
        assert_eq!(ClarityValue::StringAscii("a\"b".into()).render(), "\"a\\\"b\"");
        assert_eq!(ClarityValue::StringUtf8("hi".into()).render(), "u\"hi\"");
    }

    #[test]
    fn test_render_compound() {
        let mut fields = BTreeMap::new();
        fields.insert("b".to_string(), ClarityValue::Bool(true));
        fields.insert("a".to_string(), ClarityValue::some(ClarityValue::UInt(1)));
        let value = ClarityValue::wrap_ok(ClarityValue::List(vec![
            ClarityValue::Tuple(fields),
            ClarityValue::OptionalNone,
        ]));
        assert_eq!(
            value.render(),
            "(ok (list (tuple (a (some u1)) (b true)) none))"
        );
    }

    #[test]
    fn test_principal_parse_and_render() {
        let standard: PrincipalData = DEPLOYER.parse().unwrap();
        assert_eq!(standard.to_string(), DEPLOYER);

        let contract: PrincipalData = format!("{}.counter", DEPLOYER).parse().unwrap();
        assert_eq!(contract.to_string(), format!("{}.counter", DEPLOYER));

        assert!(format!("{}.1bad", DEPLOYER).parse::<PrincipalData>().is_err());
    }

    #[test]
    fn test_to_json() {
        let value = ClarityValue::wrap_err(ClarityValue::UInt(u128::MAX));
        assert_eq!(
            value.to_json(),
            serde_json::json!({ "err": u128::MAX.to_string() })
        );
    }
}
