// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::decoder::json_u64;
use crate::{RawBid, RawVote};
use serde_json::Value;

fn hex_blob(s: &str) -> Option<Vec<u8>> {
    s.strip_prefix("0x").and_then(|h| hex::decode(h).ok())
}

impl RawVote {
    /// Classifies one element of a JSON vote array.
    ///
    /// `"0x…"` strings and `{"ciphertext": "0x…"}` objects are opaque ballots.
    /// Everything else is kept as JSON text so the decoder reports it.
    pub fn from_json(value: Value) -> RawVote {
        match value {
            Value::String(s) => match hex_blob(&s) {
                Some(bytes) => RawVote::OpaqueBlob {
                    bytes,
                    timestamp: None,
                },
                None => RawVote::TextEncoded(s),
            },
            Value::Object(ref record) => match record.get("ciphertext") {
                Some(ciphertext) => match ciphertext.as_str().and_then(hex_blob) {
                    Some(bytes) => RawVote::OpaqueBlob {
                        bytes,
                        timestamp: record.get("timestamp").and_then(json_u64),
                    },
                    None => RawVote::TextEncoded(value.to_string()),
                },
                // Plain records share the text decoding so both encodings agree.
                None => RawVote::TextEncoded(value.to_string()),
            },
            other => RawVote::TextEncoded(other.to_string()),
        }
    }
}

impl RawBid {
    /// `"0x…"` strings and `{"sealed": "0x…"}` objects are sealed bids, the rest is text.
    pub fn from_json(value: Value) -> RawBid {
        match value {
            Value::String(s) => match hex_blob(&s) {
                Some(bytes) => RawBid::Sealed(bytes),
                None => RawBid::TextEncoded(s),
            },
            Value::Object(ref record) => match record
                .get("sealed")
                .and_then(Value::as_str)
                .and_then(hex_blob)
            {
                Some(bytes) => RawBid::Sealed(bytes),
                None => RawBid::TextEncoded(value.to_string()),
            },
            other => RawBid::TextEncoded(other.to_string()),
        }
    }
}
