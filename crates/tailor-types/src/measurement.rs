//! Garment measurement types.

use serde::{Deserialize, Serialize};

/// Body measurements for one client, keyed by username.
///
/// Exactly one record exists per client; submitting again replaces the
/// supplied fields (upsert). Values are kept as free-form strings because
/// the shop records them with units and fractions ("38 1/2 in").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Measurement {
	pub username: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub neck: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub chest: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub waist: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hip: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub shoulder: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sleeve: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub armhole: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bicep: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub wrist: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inseam: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub outseam: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thigh: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rise: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bodylength: Option<String>,
}

impl Measurement {
	/// Merges the supplied fields of `patch` into this record.
	pub fn merge(&mut self, patch: Measurement) {
		macro_rules! take {
			($field:ident) => {
				if patch.$field.is_some() {
					self.$field = patch.$field;
				}
			};
		}
		take!(neck);
		take!(chest);
		take!(waist);
		take!(hip);
		take!(shoulder);
		take!(sleeve);
		take!(armhole);
		take!(bicep);
		take!(wrist);
		take!(inseam);
		take!(outseam);
		take!(thigh);
		take!(rise);
		take!(bodylength);
	}
}
