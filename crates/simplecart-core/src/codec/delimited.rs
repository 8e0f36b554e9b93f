//! Delimited-string wire format.
//!
//! ```text
//! items slot:      100,3;100,1;205,2
//! attributes slot: 100,color,gold;100,price,349.00;100,color,silver,1
//!                  ───┬─ ──┬── ─┬── ┬
//!                    id   key value ordinal (omitted for the first variant)
//! ```
//!
//! Repeating an id in the items slot adds another variant of that item; the
//! n-th occurrence (zero-based) owns the attribute records with ordinal n.
//! Three-field attribute records written by older releases belong to the
//! first variant.

use std::collections::{BTreeMap, HashMap};

use super::{CartCodec, Decoded, Payload, SkipReason, WireFormat};
use crate::attributes::AttributeSet;
use crate::error::CodecResult;
use crate::store::{ItemStore, ItemVariant};
use crate::validation::{parse_count, validate_delimited_field, ValidationResult};

const RECORD_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ',';

/// `id,qty;...` codec with an attribute side-slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedCodec;

/// Splits a slot into records. A blank slot yields nothing and a single
/// trailing separator is tolerated.
fn records(raw: Option<&str>) -> impl Iterator<Item = &str> {
    let raw = raw.unwrap_or("");
    let body = raw.strip_suffix(RECORD_SEPARATOR).unwrap_or(raw);
    let blank = raw.trim().is_empty();
    body.split(RECORD_SEPARATOR).filter(move |_| !blank)
}

impl CartCodec for DelimitedCodec {
    fn format(&self) -> WireFormat {
        WireFormat::Delimited
    }

    fn check_encodable(&self, item_id: &str, attributes: &AttributeSet) -> ValidationResult<()> {
        validate_delimited_field("item id", item_id)?;
        for (key, value) in attributes.iter() {
            validate_delimited_field("attribute key", key)?;
            validate_delimited_field("attribute value", value)?;
        }
        Ok(())
    }

    fn encode(&self, store: &ItemStore) -> CodecResult<Payload> {
        let mut items = Vec::new();
        let mut attributes = Vec::new();

        for (id, variants) in store.items() {
            for (ordinal, variant) in variants.iter().enumerate() {
                items.push(format!("{},{}", id, variant.quantity));
                for (key, value) in variant.attributes.iter() {
                    if ordinal == 0 {
                        attributes.push(format!("{},{},{}", id, key, value));
                    } else {
                        attributes.push(format!("{},{},{},{}", id, key, value, ordinal));
                    }
                }
            }
        }

        Ok(Payload {
            items: items.join(";"),
            attributes: Some(attributes.join(";")),
        })
    }

    fn decode(&self, items: Option<&str>, attributes: Option<&str>) -> Decoded {
        let mut decoded = Decoded::default();

        // (id, ordinal) → (attributes, raw records for orphan reporting)
        let mut pending: BTreeMap<(String, usize), (AttributeSet, Vec<String>)> = BTreeMap::new();

        for record in records(attributes) {
            if record.is_empty() {
                decoded.skip(record, SkipReason::EmptySegment);
                continue;
            }
            if !record.contains(FIELD_SEPARATOR) {
                decoded.skip(record, SkipReason::MissingDelimiter);
                continue;
            }

            let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
            let (id, key, value, ordinal) = match fields.as_slice() {
                [id, key, value] => (*id, *key, *value, 0),
                [id, key, value, ordinal] => match ordinal.parse::<usize>() {
                    Ok(ordinal) => (*id, *key, *value, ordinal),
                    Err(_) => {
                        decoded.skip(record, SkipReason::MalformedRecord);
                        continue;
                    }
                },
                _ => {
                    decoded.skip(record, SkipReason::FieldCount);
                    continue;
                }
            };

            if id.is_empty() {
                decoded.skip(record, SkipReason::EmptyItemId);
                continue;
            }

            let entry = pending.entry((id.to_string(), ordinal)).or_default();
            entry.0.insert(key, value);
            entry.1.push(record.to_string());
        }

        let mut ordinals: HashMap<&str, usize> = HashMap::new();

        for record in records(items) {
            if record.is_empty() {
                decoded.skip(record, SkipReason::EmptySegment);
                continue;
            }
            let Some((id, quantity)) = record.split_once(FIELD_SEPARATOR) else {
                decoded.skip(record, SkipReason::MissingDelimiter);
                continue;
            };
            if id.is_empty() {
                decoded.skip(record, SkipReason::EmptyItemId);
                continue;
            }

            // Every record of an id takes an ordinal, even one dropped below
            let next = ordinals.entry(id).or_insert(0);
            let ordinal = *next;
            *next += 1;

            if quantity.contains(FIELD_SEPARATOR) {
                decoded.skip(record, SkipReason::FieldCount);
                continue;
            }
            let Some(quantity) = parse_count(quantity).filter(|q| *q > 0) else {
                decoded.skip(record, SkipReason::InvalidQuantity);
                continue;
            };

            let attributes = pending
                .remove(&(id.to_string(), ordinal))
                .map(|(set, _)| set)
                .unwrap_or_default();

            if decoded.store.restore(ItemVariant::new(id, quantity, attributes)) {
                decoded.skip(record, SkipReason::DuplicateVariant);
            }
        }

        for (_, (_, raw_records)) in pending {
            for record in raw_records {
                decoded.skip(record, SkipReason::OrphanAttribute);
            }
        }

        decoded
    }
}
