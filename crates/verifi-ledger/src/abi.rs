//! # Minimal Solidity ABI Codec
//!
//! Encodes calldata for, and decodes return data from, the handful of
//! contract functions the ledger client uses. Only the static types
//! `address`, `uint256` (restricted to `u64` range), `bool` and the dynamic
//! type `string` are supported.
//!
//! Function selectors are the first four bytes of
//! `keccak256(signature)`, precomputed here:
//!
//! | Signature | Selector |
//! |-----------|----------|
//! | `records(address,uint256)` | `0x82a6c0ac` |
//! | `ownerOf(uint256)` | `0x6352211e` |
//! | `tokenURI(uint256)` | `0xc87b56dd` |
//! | `mint(address,string)` | `0xd0def521` |
//! | `totalSupply()` | `0x18160ddd` |

use thiserror::Error;
use verifi_core::{Account, AttendanceRecord, RecordIndex, Timestamp, TokenId};

/// Selector for `records(address,uint256)`, the attendance mapping getter.
pub const RECORDS_SELECTOR: &str = "82a6c0ac";
/// Selector for ERC-721 `ownerOf(uint256)`.
pub const OWNER_OF_SELECTOR: &str = "6352211e";
/// Selector for ERC-721 metadata `tokenURI(uint256)`.
pub const TOKEN_URI_SELECTOR: &str = "c87b56dd";
/// Selector for `mint(address,string)`.
pub const MINT_SELECTOR: &str = "d0def521";
/// Selector for `totalSupply()`.
pub const TOTAL_SUPPLY_SELECTOR: &str = "18160ddd";
/// `keccak256("Transfer(address,address,uint256)")`, topic 0 of ERC-721 transfers.
pub const TRANSFER_EVENT_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

const WORD: usize = 32;

/// Errors decoding ABI data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("invalid hex data: {0}")]
    InvalidHex(String),
    #[error("return data truncated: needed {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },
    #[error("uint256 value does not fit in 64 bits")]
    Overflow,
    #[error("word is not a canonical bool")]
    InvalidBool,
    #[error("word is not a canonical address")]
    InvalidAddress,
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid ledger address: {0}")]
    BadInputAddress(String),
}

/// Whether `addr` is `0x` followed by 40 hex characters.
pub fn is_valid_address(addr: &str) -> bool {
    addr.len() == 42
        && addr.starts_with("0x")
        && addr[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Left-pad an address to a 32-byte word.
pub fn encode_address(addr: &str) -> Result<String, AbiError> {
    if !is_valid_address(addr) {
        return Err(AbiError::BadInputAddress(addr.to_string()));
    }
    Ok(format!("{:0>64}", addr[2..].to_ascii_lowercase()))
}

/// Encode an unsigned integer as a 32-byte word.
pub fn encode_uint(value: u64) -> String {
    format!("{value:064x}")
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Length word followed by the right-padded UTF-8 bytes.
fn encode_string_tail(s: &str) -> String {
    let bytes = s.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = encode_uint(bytes.len() as u64);
    out.push_str(&to_hex(bytes));
    out.push_str(&"00".repeat(padded_len - bytes.len()));
    out
}

/// Calldata for `records(account, index)`.
pub fn records_call(account: &Account, index: RecordIndex) -> Result<String, AbiError> {
    Ok(format!(
        "0x{RECORDS_SELECTOR}{}{}",
        encode_address(account.as_str())?,
        encode_uint(index.0)
    ))
}

/// Calldata for `ownerOf(token_id)`.
pub fn owner_of_call(token_id: TokenId) -> String {
    format!("0x{OWNER_OF_SELECTOR}{}", encode_uint(token_id.0))
}

/// Calldata for `tokenURI(token_id)`.
pub fn token_uri_call(token_id: TokenId) -> String {
    format!("0x{TOKEN_URI_SELECTOR}{}", encode_uint(token_id.0))
}

/// Calldata for `totalSupply()`.
pub fn total_supply_call() -> String {
    format!("0x{TOTAL_SUPPLY_SELECTOR}")
}

/// Calldata for `mint(account, token_uri)`.
///
/// Head: the address word, then the offset (64) of the string tail.
pub fn mint_call(account: &Account, token_uri: &str) -> Result<String, AbiError> {
    Ok(format!(
        "0x{MINT_SELECTOR}{}{}{}",
        encode_address(account.as_str())?,
        encode_uint(2 * WORD as u64),
        encode_string_tail(token_uri)
    ))
}

/// Decode `0x`-prefixed (or bare) hex into bytes.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, AbiError> {
    let body = s.strip_prefix("0x").unwrap_or(s);
    if !body.is_ascii() || body.len() % 2 != 0 {
        return Err(AbiError::InvalidHex(s.to_string()));
    }
    (0..body.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&body[i..i + 2], 16).map_err(|_| AbiError::InvalidHex(s.to_string()))
        })
        .collect()
}

fn slice(data: &[u8], start: usize, len: usize) -> Result<&[u8], AbiError> {
    let end = start.checked_add(len).ok_or(AbiError::Overflow)?;
    data.get(start..end).ok_or(AbiError::Truncated {
        needed: end,
        available: data.len(),
    })
}

fn word(data: &[u8], index: usize) -> Result<&[u8], AbiError> {
    slice(data, index * WORD, WORD)
}

/// Decode a `uint256` word, rejecting values above `u64::MAX`.
pub fn decode_u64(word: &[u8]) -> Result<u64, AbiError> {
    if word.len() != WORD || word[..24].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow);
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(buf))
}

/// Decode a `bool` word.
pub fn decode_bool(word: &[u8]) -> Result<bool, AbiError> {
    if word.len() != WORD || word[..31].iter().any(|b| *b != 0) {
        return Err(AbiError::InvalidBool);
    }
    match word[31] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(AbiError::InvalidBool),
    }
}

/// Decode an `address` word to a lowercase `0x` string.
pub fn decode_address(word: &[u8]) -> Result<String, AbiError> {
    if word.len() != WORD || word[..12].iter().any(|b| *b != 0) {
        return Err(AbiError::InvalidAddress);
    }
    Ok(format!("0x{}", to_hex(&word[12..])))
}

/// Decode return data consisting of a single `address`.
pub fn decode_address_return(data: &[u8]) -> Result<String, AbiError> {
    decode_address(word(data, 0)?)
}

/// Decode return data consisting of a single `uint256`.
pub fn decode_u64_return(data: &[u8]) -> Result<u64, AbiError> {
    decode_u64(word(data, 0)?)
}

/// Decode return data consisting of a single dynamic `string`.
pub fn decode_string_return(data: &[u8]) -> Result<String, AbiError> {
    let offset = usize::try_from(decode_u64(word(data, 0)?)?).map_err(|_| AbiError::Overflow)?;
    let len = usize::try_from(decode_u64(slice(data, offset, WORD)?)?)
        .map_err(|_| AbiError::Overflow)?;
    let start = offset.checked_add(WORD).ok_or(AbiError::Overflow)?;
    let bytes = slice(data, start, len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
}

/// Decode the `(uint256 timestamp, bool present)` tuple returned by
/// `records(address,uint256)`.
pub fn decode_record_return(data: &[u8]) -> Result<AttendanceRecord, AbiError> {
    let secs = decode_u64(word(data, 0)?)?;
    let secs = i64::try_from(secs).map_err(|_| AbiError::Overflow)?;
    let timestamp = Timestamp::from_epoch_secs(secs).map_err(|_| AbiError::Overflow)?;
    let present = decode_bool(word(data, 1)?)?;
    Ok(AttendanceRecord { timestamp, present })
}
