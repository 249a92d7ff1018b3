//! Consensus serialization of Clarity values and host-value encoding
use crate::error::CodecError;
use crate::types::ClarityType;
use crate::value::{validate_contract_name, ClarityValue, PrincipalData, StandardPrincipal};
use serde_json::Value;
use std::collections::BTreeMap;

/// Nesting limit enforced by the Clarity VM
pub const MAX_VALUE_DEPTH: usize = 32;

mod prefix {
    pub const INT: u8 = 0x00;
    pub const UINT: u8 = 0x01;
    pub const BUFFER: u8 = 0x02;
    pub const TRUE: u8 = 0x03;
    pub const FALSE: u8 = 0x04;
    pub const PRINCIPAL_STANDARD: u8 = 0x05;
    pub const PRINCIPAL_CONTRACT: u8 = 0x06;
    pub const RESPONSE_OK: u8 = 0x07;
    pub const RESPONSE_ERR: u8 = 0x08;
    pub const NONE: u8 = 0x09;
    pub const SOME: u8 = 0x0a;
    pub const LIST: u8 = 0x0b;
    pub const TUPLE: u8 = 0x0c;
    pub const STRING_ASCII: u8 = 0x0d;
    pub const STRING_UTF8: u8 = 0x0e;
}

/// Decode a hex string (with or without `0x`) into a value
pub fn decode_hex(raw: &str) -> Result<ClarityValue, CodecError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
    deserialize(&bytes)
}

/// Decode a complete serialized value; trailing bytes are an error
pub fn deserialize(bytes: &[u8]) -> Result<ClarityValue, CodecError> {
    let mut reader = Reader { bytes, offset: 0 };
    let value = reader.read_value(0)?;
    let remaining = bytes.len() - reader.offset;
    if remaining > 0 {
        return Err(CodecError::TrailingBytes(remaining));
    }
    Ok(value)
}

pub fn serialize(value: &ClarityValue) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out);
    out
}

pub fn serialize_hex(value: &ClarityValue) -> String {
    hex::encode(serialize(value))
}

fn write_len(len: usize, out: &mut Vec<u8>) {
    out.extend_from_slice(&(len as u32).to_be_bytes());
}

fn write_standard(p: &StandardPrincipal, out: &mut Vec<u8>) {
    out.push(p.version);
    out.extend_from_slice(&p.hash160);
}

fn write_value(value: &ClarityValue, out: &mut Vec<u8>) {
    match value {
        ClarityValue::Int(n) => {
            out.push(prefix::INT);
            out.extend_from_slice(&n.to_be_bytes());
        }
        ClarityValue::UInt(n) => {
            out.push(prefix::UINT);
            out.extend_from_slice(&n.to_be_bytes());
        }
        ClarityValue::Buffer(bytes) => {
            out.push(prefix::BUFFER);
            write_len(bytes.len(), out);
            out.extend_from_slice(bytes);
        }
        ClarityValue::Bool(true) => out.push(prefix::TRUE),
        ClarityValue::Bool(false) => out.push(prefix::FALSE),
        ClarityValue::Principal(PrincipalData::Standard(p)) => {
            out.push(prefix::PRINCIPAL_STANDARD);
            write_standard(p, out);
        }
        ClarityValue::Principal(PrincipalData::Contract { issuer, name }) => {
            out.push(prefix::PRINCIPAL_CONTRACT);
            write_standard(issuer, out);
            out.push(name.len() as u8);
            out.extend_from_slice(name.as_bytes());
        }
        ClarityValue::ResponseOk(inner) => {
            out.push(prefix::RESPONSE_OK);
            write_value(inner, out);
        }
        ClarityValue::ResponseErr(inner) => {
            out.push(prefix::RESPONSE_ERR);
            write_value(inner, out);
        }
        ClarityValue::OptionalNone => out.push(prefix::NONE),
        ClarityValue::OptionalSome(inner) => {
            out.push(prefix::SOME);
            write_value(inner, out);
        }
        ClarityValue::List(items) => {
            out.push(prefix::LIST);
            write_len(items.len(), out);
            for item in items {
                write_value(item, out);
            }
        }
        ClarityValue::Tuple(fields) => {
            out.push(prefix::TUPLE);
            write_len(fields.len(), out);
            for (name, field) in fields {
                out.push(name.len() as u8);
                out.extend_from_slice(name.as_bytes());
                write_value(field, out);
            }
        }
        ClarityValue::StringAscii(s) => {
            out.push(prefix::STRING_ASCII);
            write_len(s.len(), out);
            out.extend_from_slice(s.as_bytes());
        }
        ClarityValue::StringUtf8(s) => {
            out.push(prefix::STRING_UTF8);
            write_len(s.len(), out);
            out.extend_from_slice(s.as_bytes());
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(CodecError::UnexpectedEof(self.offset))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<usize, CodecError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf) as usize)
    }

    fn read_16(&mut self) -> Result<[u8; 16], CodecError> {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.take(16)?);
        Ok(buf)
    }

    fn read_standard(&mut self) -> Result<StandardPrincipal, CodecError> {
        let version = self.read_u8()?;
        let mut hash160 = [0u8; 20];
        hash160.copy_from_slice(self.take(20)?);
        Ok(StandardPrincipal { version, hash160 })
    }

    fn read_name(&mut self) -> Result<String, CodecError> {
        let len = self.read_u8()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8("name"))
    }

    fn read_value(&mut self, depth: usize) -> Result<ClarityValue, CodecError> {
        if depth > MAX_VALUE_DEPTH {
            return Err(CodecError::DepthExceeded(MAX_VALUE_DEPTH));
        }

        let start = self.offset;
        let value = match self.read_u8()? {
            prefix::INT => ClarityValue::Int(i128::from_be_bytes(self.read_16()?)),
            prefix::UINT => ClarityValue::UInt(u128::from_be_bytes(self.read_16()?)),
            prefix::BUFFER => {
                let len = self.read_u32()?;
                ClarityValue::Buffer(self.take(len)?.to_vec())
            }
            prefix::TRUE => ClarityValue::Bool(true),
            prefix::FALSE => ClarityValue::Bool(false),
            prefix::PRINCIPAL_STANDARD => {
                ClarityValue::Principal(PrincipalData::Standard(self.read_standard()?))
            }
            prefix::PRINCIPAL_CONTRACT => {
                let issuer = self.read_standard()?;
                let name = self.read_name()?;
                validate_contract_name(&name)?;
                ClarityValue::Principal(PrincipalData::Contract { issuer, name })
            }
            prefix::RESPONSE_OK => ClarityValue::wrap_ok(self.read_value(depth + 1)?),
            prefix::RESPONSE_ERR => ClarityValue::wrap_err(self.read_value(depth + 1)?),
            prefix::NONE => ClarityValue::OptionalNone,
            prefix::SOME => ClarityValue::some(self.read_value(depth + 1)?),
            prefix::LIST => {
                let len = self.read_u32()?;
                // every item is at least one byte
                let mut items = Vec::with_capacity(len.min(self.bytes.len() - self.offset));
                for _ in 0..len {
                    items.push(self.read_value(depth + 1)?);
                }
                ClarityValue::List(items)
            }
            prefix::TUPLE => {
                let len = self.read_u32()?;
                let mut fields = BTreeMap::new();
                for _ in 0..len {
                    let name = self.read_name()?;
                    let field = self.read_value(depth + 1)?;
                    fields.insert(name, field);
                }
                ClarityValue::Tuple(fields)
            }
            prefix::STRING_ASCII => {
                let len = self.read_u32()?;
                let raw = self.take(len)?;
                if !raw.is_ascii() {
                    return Err(CodecError::InvalidUtf8("string-ascii"));
                }
                ClarityValue::StringAscii(String::from_utf8_lossy(raw).into_owned())
            }
            prefix::STRING_UTF8 => {
                let len = self.read_u32()?;
                let raw = self.take(len)?;
                let s = String::from_utf8(raw.to_vec())
                    .map_err(|_| CodecError::InvalidUtf8("string-utf8"))?;
                ClarityValue::StringUtf8(s)
            }
            other => {
                return Err(CodecError::UnknownPrefix {
                    prefix: other,
                    offset: start,
                })
            }
        };
        Ok(value)
    }
}

fn mismatch(expected: &ClarityType, found: &Value) -> CodecError {
    let found = match found {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Object(_) => "object".to_string(),
    };
    CodecError::TypeMismatch {
        expected: expected.display_name(),
        found,
    }
}

fn check_length(expected: &ClarityType, len: usize, max: u32) -> Result<(), CodecError> {
    if len > max as usize {
        return Err(CodecError::TypeMismatch {
            expected: expected.display_name(),
            found: format!("length {}", len),
        });
    }
    Ok(())
}

/// Coerce a host value into a Clarity value of the declared type
pub fn encode(raw: &Value, declared: &ClarityType) -> Result<ClarityValue, CodecError> {
    match (declared, raw) {
        (ClarityType::Int, Value::Number(n)) => n
            .as_i64()
            .map(|v| ClarityValue::Int(v as i128))
            .or_else(|| n.as_u64().map(|v| ClarityValue::Int(v as i128)))
            .ok_or_else(|| mismatch(declared, raw)),
        (ClarityType::Int, Value::String(s)) => s
            .trim()
            .parse::<i128>()
            .map(ClarityValue::Int)
            .map_err(|_| mismatch(declared, raw)),
        (ClarityType::UInt, Value::Number(n)) => n
            .as_u64()
            .map(|v| ClarityValue::UInt(v as u128))
            .ok_or_else(|| mismatch(declared, raw)),
        (ClarityType::UInt, Value::String(s)) => s
            .trim()
            .parse::<u128>()
            .map(ClarityValue::UInt)
            .map_err(|_| mismatch(declared, raw)),
        (ClarityType::Bool, Value::Bool(b)) => Ok(ClarityValue::Bool(*b)),
        (ClarityType::Bool, Value::String(s)) => match s.to_lowercase().as_str() {
            "true" => Ok(ClarityValue::Bool(true)),
            "false" => Ok(ClarityValue::Bool(false)),
            _ => Err(mismatch(declared, raw)),
        },
        (ClarityType::Principal, Value::String(s)) => {
            let literal = s.trim().trim_start_matches('\'');
            literal
                .parse::<PrincipalData>()
                .map(ClarityValue::Principal)
        }
        (ClarityType::Buffer { length }, Value::String(s)) => {
            let bytes = match s.strip_prefix("0x") {
                Some(digits) => {
                    hex::decode(digits).map_err(|e| CodecError::InvalidHex(e.to_string()))?
                }
                None => s.as_bytes().to_vec(),
            };
            check_length(declared, bytes.len(), *length)?;
            Ok(ClarityValue::Buffer(bytes))
        }
        (ClarityType::StringAscii { length }, Value::String(s)) => {
            if !s.is_ascii() {
                return Err(mismatch(declared, raw));
            }
            check_length(declared, s.len(), *length)?;
            Ok(ClarityValue::StringAscii(s.clone()))
        }
        (ClarityType::StringUtf8 { length }, Value::String(s)) => {
            check_length(declared, s.chars().count(), *length)?;
            Ok(ClarityValue::StringUtf8(s.clone()))
        }
        (ClarityType::Optional(_), Value::Null) => Ok(ClarityValue::OptionalNone),
        (ClarityType::Optional(inner), other) => Ok(ClarityValue::some(encode(other, inner)?)),
        (ClarityType::List { element, length }, Value::Array(items)) => {
            check_length(declared, items.len(), *length)?;
            let encoded = items
                .iter()
                .map(|item| encode(item, element))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ClarityValue::List(encoded))
        }
        (ClarityType::Tuple(fields), Value::Object(map)) => {
            if map.len() != fields.len() {
                return Err(mismatch(declared, raw));
            }
            let mut encoded = BTreeMap::new();
            for field in fields {
                let value = map
                    .get(&field.name)
                    .ok_or_else(|| mismatch(declared, raw))?;
                encoded.insert(field.name.clone(), encode(value, &field.field_type)?);
            }
            Ok(ClarityValue::Tuple(encoded))
        }
        _ => Err(mismatch(declared, raw)),
    }
}
