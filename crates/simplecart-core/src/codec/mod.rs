//! # Persistence Codecs
//!
//! Turns an [`ItemStore`] into the strings a host keeps in its session or
//! cookie slots, and back.
//!
//! ## Two Interchangeable Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartCodec (trait)                                │
//! │                                                                         │
//! │  ┌─────────────────────────────┐   ┌─────────────────────────────────┐ │
//! │  │ DelimitedCodec              │   │ StructuredCodec                 │ │
//! │  │                             │   │                                 │ │
//! │  │ slot "<id>":                │   │ slot "<id>":                    │ │
//! │  │   100,3;100,1;205,2         │   │   {"100":[{"id":"100",          │ │
//! │  │ slot "<id>_attributes":     │   │     "quantity":3,"hash":"…",    │ │
//! │  │   100,color,gold;           │   │     "attributes":{…}}], …}      │ │
//! │  │   100,color,silver,1        │   │                                 │ │
//! │  └─────────────────────────────┘   └─────────────────────────────────┘ │
//! │                                                                         │
//! │  Selected by WireFormat from configuration.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decode Never Fails
//! A persisted slot may have been written by an older release, truncated by
//! a browser, or edited by hand. A bad record is dropped and reported as a
//! [`DecodeSkip`]; the rest of the cart survives. A missing or blank slot is
//! an empty cart.
//!
//! ## Round Trip
//! For any store built through the public API, `decode(encode(s)).store == s`.

mod delimited;
mod structured;

pub use delimited::DelimitedCodec;
pub use structured::StructuredCodec;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::attributes::AttributeSet;
use crate::error::{CodecResult, ValidationError};
use crate::store::ItemStore;
use crate::validation::ValidationResult;

// =============================================================================
// Payload / Decoded
// =============================================================================

/// Encoded cart, ready for the persistence slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Content of the main slot.
    pub items: String,

    /// Content of the attribute side-slot, for formats that use one.
    pub attributes: Option<String>,
}

/// Result of decoding: the surviving store plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub store: ItemStore,
    pub skipped: Vec<DecodeSkip>,
}

impl Decoded {
    fn skip(&mut self, segment: impl Into<String>, reason: SkipReason) {
        self.skipped.push(DecodeSkip {
            segment: segment.into(),
            reason,
        });
    }
}

/// A persisted record dropped during decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeSkip {
    /// The offending raw text (segment, or JSON fragment).
    pub segment: String,
    pub reason: SkipReason,
}

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `;;` or a stray trailing separator.
    EmptySegment,
    /// A segment with no `,` in it.
    MissingDelimiter,
    /// A segment with the wrong number of fields.
    FieldCount,
    /// The item id field is empty.
    EmptyItemId,
    /// Quantity is not a positive integer.
    InvalidQuantity,
    /// An attribute record that belongs to no decoded variant.
    OrphanAttribute,
    /// A variant repeated under the same item; the later one was kept.
    DuplicateVariant,
    /// A structured record of the wrong shape.
    MalformedRecord,
    /// The whole structured document is unreadable.
    MalformedDocument,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::EmptySegment => "empty segment",
            SkipReason::MissingDelimiter => "missing delimiter",
            SkipReason::FieldCount => "wrong field count",
            SkipReason::EmptyItemId => "empty item id",
            SkipReason::InvalidQuantity => "invalid quantity",
            SkipReason::OrphanAttribute => "attribute without variant",
            SkipReason::DuplicateVariant => "duplicate variant",
            SkipReason::MalformedRecord => "malformed record",
            SkipReason::MalformedDocument => "malformed document",
        };
        f.write_str(text)
    }
}

// =============================================================================
// Codec Trait
// =============================================================================

/// One wire format.
pub trait CartCodec: fmt::Debug + Send + Sync {
    /// The format this codec speaks.
    fn format(&self) -> WireFormat;

    /// Checks, before any mutation, that a variant can be represented.
    fn check_encodable(&self, _item_id: &str, _attributes: &AttributeSet) -> ValidationResult<()> {
        Ok(())
    }

    /// Encodes the whole store.
    fn encode(&self, store: &ItemStore) -> CodecResult<Payload>;

    /// Decodes the raw slot contents. `None` means the slot is absent.
    fn decode(&self, items: Option<&str>, attributes: Option<&str>) -> Decoded;
}

// =============================================================================
// Wire Format
// =============================================================================

/// Configuration-level choice of codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// JSON document, one slot.
    #[default]
    Structured,

    /// `id,qty;...` plus an attribute side-slot.
    Delimited,
}

impl WireFormat {
    /// Returns the codec implementing this format.
    pub fn codec(self) -> Box<dyn CartCodec> {
        match self {
            WireFormat::Structured => Box::new(StructuredCodec),
            WireFormat::Delimited => Box::new(DelimitedCodec),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Structured => write!(f, "structured"),
            WireFormat::Delimited => write!(f, "delimited"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "json" => Ok(WireFormat::Structured),
            "delimited" | "legacy" => Ok(WireFormat::Delimited),
            other => Err(ValidationError::InvalidFormat {
                field: "wire format".to_string(),
                reason: format!(
                    "unknown format '{}'. Valid options: structured, delimited",
                    other
                ),
            }),
        }
    }
}
