//! Structured (JSON) wire format.
//!
//! One slot holds the whole cart:
//!
//! ```json
//! {"100":[{"id":"100","quantity":3,"hash":"…","attributes":{"color":"gold"}}]}
//! ```
//!
//! The stored `hash` is informational. Decoding recomputes it from the
//! attributes, so a document written by another hasher still loads.

use serde_json::{Map, Value};

use super::{CartCodec, Decoded, Payload, SkipReason, WireFormat};
use crate::attributes::AttributeSet;
use crate::error::CodecResult;
use crate::store::{ItemStore, ItemVariant};
use crate::validation::parse_count;

/// JSON document codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredCodec;

impl CartCodec for StructuredCodec {
    fn format(&self) -> WireFormat {
        WireFormat::Structured
    }

    fn encode(&self, store: &ItemStore) -> CodecResult<Payload> {
        Ok(Payload {
            items: serde_json::to_string(store)?,
            attributes: None,
        })
    }

    fn decode(&self, items: Option<&str>, _attributes: Option<&str>) -> Decoded {
        let mut decoded = Decoded::default();

        let Some(raw) = items.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return decoded;
        };

        let document = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(document)) => document,
            Ok(Value::Array(list)) if list.is_empty() => return decoded,
            _ => {
                decoded.skip(raw, SkipReason::MalformedDocument);
                return decoded;
            }
        };

        decode_document(document, &mut decoded);
        decoded
    }
}

fn decode_document(document: Map<String, Value>, decoded: &mut Decoded) {
    for (item_id, records) in document {
        let Value::Array(records) = records else {
            decoded.skip(format!("{}: {}", item_id, records), SkipReason::MalformedRecord);
            continue;
        };

        for record in records {
            let segment = record.to_string();
            if item_id.is_empty() {
                decoded.skip(segment, SkipReason::EmptyItemId);
                continue;
            }

            match decode_record(&item_id, record) {
                Ok(variant) => {
                    if decoded.store.restore(variant) {
                        decoded.skip(segment, SkipReason::DuplicateVariant);
                    }
                }
                Err(reason) => decoded.skip(segment, reason),
            }
        }
    }
}

fn decode_record(item_id: &str, record: Value) -> Result<ItemVariant, SkipReason> {
    let Value::Object(mut record) = record else {
        return Err(SkipReason::MalformedRecord);
    };

    let quantity = match record.get("quantity") {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|q| u32::try_from(q).unwrap_or(u32::MAX))
            .ok_or(SkipReason::InvalidQuantity)?,
        Some(Value::String(s)) => parse_count(s.trim()).ok_or(SkipReason::InvalidQuantity)?,
        Some(_) => return Err(SkipReason::InvalidQuantity),
        None => return Err(SkipReason::MalformedRecord),
    };
    if quantity == 0 {
        return Err(SkipReason::InvalidQuantity);
    }

    let attributes = match record.remove("attributes") {
        Some(value) => {
            serde_json::from_value::<AttributeSet>(value).map_err(|_| SkipReason::MalformedRecord)?
        }
        None => AttributeSet::new(),
    };

    Ok(ItemVariant::new(item_id, quantity, attributes))
}
