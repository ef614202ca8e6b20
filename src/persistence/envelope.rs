//! Save container: a 4-byte ASCII magic followed by UTF-8 JSON with every byte
//! XOR-ed against a fixed key. The XOR is a format marker, not protection.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{AppError, AppResult};

pub const MAGIC: [u8; 4] = *b"DGSV";
pub const XOR_KEY: u8 = 0x5A;

pub fn encode<T: Serialize>(value: &T) -> AppResult<Vec<u8>> {
    let json = serde_json::to_vec(value).map_err(|e| AppError::MalformedPayload {
        message: e.to_string(),
    })?;

    let mut bytes = Vec::with_capacity(MAGIC.len() + json.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend(json.into_iter().map(|byte| byte ^ XOR_KEY));
    Ok(bytes)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> AppResult<T> {
    let header = bytes.get(..MAGIC.len()).unwrap_or(bytes);
    if header != MAGIC {
        return Err(AppError::HeaderMismatch {
            expected: String::from_utf8_lossy(&MAGIC).into_owned(),
            found: String::from_utf8_lossy(header).into_owned(),
        });
    }

    let payload: Vec<u8> = bytes[MAGIC.len()..]
        .iter()
        .map(|byte| byte ^ XOR_KEY)
        .collect();
    let text = String::from_utf8(payload).map_err(|e| AppError::MalformedPayload {
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| AppError::MalformedPayload {
        message: e.to_string(),
    })
}
