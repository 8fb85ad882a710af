//! Upstream record types.
//!
//! The upstream API is treated as a black box: the fields this crate actually
//! reads are typed, and everything else is preserved in a flattened `extra` map
//! so the fallback chains in [`super::fields`] can see every historical
//! spelling. All three records tolerate missing fields; a hole degrades the
//! affected derived value, never the whole record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::fields;

/// One photo attachment on a listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One property record from upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    /// Opaque upstream key; number or string depending on API vintage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_subtype_id: Option<Value>,
    /// Independent availability flags; the "type" display is derived from both
    #[serde(default)]
    pub lease: bool,
    #[serde(default)]
    pub sale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_size_sf: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_listing_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_listing_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub you_tube_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matterport_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_listing_web_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_listing_web_title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_broker_id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Listing {
    /// Canonical join key for this listing.
    ///
    /// Tries the typed `id` first, then the same fallback chain used for lease
    /// spaces' parent ids, so both sides of the join resolve identically.
    pub fn join_key(&self) -> Option<String> {
        self.id
            .as_ref()
            .and_then(fields::join_key)
            .or_else(|| fields::resolve_parent_key(&self.extra))
    }

    /// Whether this listing's resolved activity status is "active".
    pub fn is_active(&self) -> bool {
        fields::status_is_active(&self.extra)
    }

    /// Building size as a number, coerced from loosely formatted values.
    pub fn building_size(&self) -> Option<f64> {
        self.building_size_sf.as_ref().and_then(fields::parse_size)
    }

    /// Whether this listing's size is denominated in acres (land types).
    pub fn is_land(&self) -> bool {
        self.property_type_key().as_deref() == Some(fields::LAND_PROPERTY_TYPE_ID)
    }

    /// Property type id normalized to its canonical string form.
    pub fn property_type_key(&self) -> Option<String> {
        self.property_type_id.as_ref().and_then(fields::join_key)
    }

    /// Property subtype id normalized to its canonical string form.
    pub fn property_subtype_key(&self) -> Option<String> {
        self.property_subtype_id.as_ref().and_then(fields::join_key)
    }
}

/// One agent record from upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Broker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Broker {
    /// Canonical join key for this broker.
    pub fn join_key(&self) -> Option<String> {
        self.id.as_ref().and_then(fields::join_key)
    }

    /// Display name: first + last, whichever parts exist.
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();
        if let Some(first) = self.first_name.as_deref() {
            if !first.trim().is_empty() {
                parts.push(first.trim());
            }
        }
        if let Some(last) = self.last_name.as_deref() {
            if !last.trim().is_empty() {
                parts.push(last.trim());
            }
        }
        parts.join(" ")
    }
}

/// A sub-unit of a property with its own size and activity status.
///
/// Everything but the id lives in `extra`: parent property id, size, and
/// status have all shipped under multiple names and are resolved through the
/// chains in [`super::fields`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaseSpace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LeaseSpace {
    /// Join key of the parent property, if any spelling resolves.
    pub fn parent_key(&self) -> Option<String> {
        fields::resolve_parent_key(&self.extra)
    }

    /// Size in square feet, if any candidate field parses to a positive number.
    pub fn size_sf(&self) -> Option<f64> {
        fields::resolve_size(&self.extra)
    }

    /// Whether this space's resolved activity status is "active".
    pub fn is_active(&self) -> bool {
        fields::status_is_active(&self.extra)
    }
}
