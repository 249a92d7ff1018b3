//! c32check address encoding used by Stacks principals
use crate::error::CodecError;
use sha2::{Digest, Sha256};

const C32_CHARACTERS: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

fn c32_digit(c: u8) -> Option<u8> {
    let normalized = match c.to_ascii_uppercase() {
        b'O' => b'0',
        b'L' | b'I' => b'1',
        other => other,
    };
    C32_CHARACTERS
        .iter()
        .position(|x| *x == normalized)
        .map(|i| i as u8)
}

fn checksum(version: u8, data: &[u8]) -> [u8; 4] {
    let mut hasher = Sha256::new();
    hasher.update([version]);
    hasher.update(data);
    let first = hasher.finalize();
    let second = Sha256::digest(first);
    [second[0], second[1], second[2], second[3]]
}

/// Encode bytes as c32, preserving leading zero bytes as `0` digits
pub fn c32_encode(input: &[u8]) -> String {
    let mut result: Vec<u8> = Vec::with_capacity(input.len() * 8 / 5 + 1);
    let mut carry: u8 = 0;
    let mut carry_bits: u8 = 0;

    for current in input.iter().rev() {
        let low_bits_to_take = 5 - carry_bits;
        let low_bits = current & ((1u8 << low_bits_to_take) - 1);
        let c32_value = (low_bits << carry_bits) + carry;
        result.push(C32_CHARACTERS[c32_value as usize]);
        carry_bits = (8 + carry_bits) - 5;
        carry = current >> (8 - carry_bits);

        if carry_bits >= 5 {
            let c32_value = carry & 0x1f;
            result.push(C32_CHARACTERS[c32_value as usize]);
            carry_bits -= 5;
            carry >>= 5;
        }
    }

    if carry_bits > 0 {
        result.push(C32_CHARACTERS[carry as usize]);
    }

    while result.last() == Some(&C32_CHARACTERS[0]) {
        result.pop();
    }

    for current in input.iter() {
        if *current != 0 {
            break;
        }
        result.push(C32_CHARACTERS[0]);
    }

    result.reverse();
    result.into_iter().map(char::from).collect()
}

/// Decode a c32 string back into bytes
pub fn c32_decode(input: &str) -> Result<Vec<u8>, CodecError> {
    let mut digits = Vec::with_capacity(input.len());
    for c in input.bytes().rev() {
        let digit = c32_digit(c)
            .ok_or_else(|| CodecError::InvalidPrincipal(format!("invalid c32 character in {}", input)))?;
        digits.push(digit);
    }

    let mut result = Vec::with_capacity(input.len() * 5 / 8 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u16 = 0;

    for digit in &digits {
        carry += (*digit as u16) << carry_bits;
        carry_bits += 5;
        if carry_bits >= 8 {
            result.push((carry & 0xff) as u8);
            carry_bits -= 8;
            carry >>= 8;
        }
    }

    if carry_bits > 0 {
        result.push(carry as u8);
    }

    while result.last() == Some(&0) {
        result.pop();
    }

    for digit in digits.iter().rev() {
        if *digit != 0 {
            break;
        }
        result.push(0);
    }

    result.reverse();
    Ok(result)
}

/// Render a `(version, hash160)` pair as an `S…` address
pub fn c32_address(version: u8, data: &[u8]) -> String {
    let mut payload = data.to_vec();
    payload.extend_from_slice(&checksum(version, data));
    format!(
        "S{}{}",
        C32_CHARACTERS[(version & 0x1f) as usize] as char,
        c32_encode(&payload)
    )
}

/// Parse an `S…` address into its version byte and hash160, verifying the checksum
pub fn c32_address_decode(address: &str) -> Result<(u8, [u8; 20]), CodecError> {
    let invalid = |reason: &str| CodecError::InvalidPrincipal(format!("{}: {}", address, reason));

    if !address.is_ascii() || address.len() < 3 || !address.starts_with('S') {
        return Err(invalid("must start with `S`"));
    }

    let version = c32_digit(address.as_bytes()[1]).ok_or_else(|| invalid("bad version character"))?;
    let decoded = c32_decode(&address[2..])?;
    if decoded.len() != 24 {
        return Err(invalid("wrong length"));
    }

    let (data, sum) = decoded.split_at(20);
    if checksum(version, data) != sum {
        return Err(invalid("checksum mismatch"));
    }

    let mut hash160 = [0u8; 20];
    hash160.copy_from_slice(data);
    Ok((version, hash160))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    #[test]
    fn test_decode_known_address() {
        let (version, hash160) = c32_address_decode(DEPLOYER).unwrap();
        assert_eq!(version, 26);
        assert_eq!(c32_address(version, &hash160), DEPLOYER);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut tampered = DEPLOYER.to_string();
        tampered.pop();
        tampered.push('N');
        assert!(c32_address_decode(&tampered).is_err());
    }

    #[test]
    fn test_leading_zero_bytes_preserved() {
        let encoded = c32_encode(&[0, 0, 1]);
        assert!(encoded.starts_with("00"));
        assert_eq!(c32_decode(&encoded).unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn test_rejects_non_stacks_prefix() {
        assert!(c32_address_decode("GBRPYHIL2CI3WHZDTOOQFC6EB4RRJC3D5NZ4FJHSVOBXUXVLCJGXI2V").is_err());
    }
}
