use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::util::text::is_blank;

use super::validate::FieldError;

pub const DEFAULT_REGION: &str = "US";
pub const GATE_NO: &str = "No";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gate {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for AddressRecord {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            street: String::new(),
            street2: None,
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            region: default_region(),
        }
    }
}

impl AddressRecord {
    pub fn is_blank(&self) -> bool {
        is_blank(&self.first_name)
            && is_blank(&self.last_name)
            && is_blank(&self.street)
            && self.street2.as_deref().map(is_blank).unwrap_or(true)
            && is_blank(&self.city)
            && is_blank(&self.state)
            && is_blank(&self.zip)
    }

    fn problems(&self, key: &str, label: &str) -> Vec<FieldError> {
        let zip_re = Regex::new(r"^\d{5}$").expect("regex");
        let required = [
            ("firstName", "first name", &self.first_name),
            ("lastName", "last name", &self.last_name),
            ("street", "street address", &self.street),
            ("city", "city", &self.city),
            ("state", "state", &self.state),
            ("zip", "ZIP code", &self.zip),
        ];

        let mut errors = Vec::new();
        for (field, name, value) in required {
            if is_blank(value) {
                errors.push(FieldError::new(
                    format!("{key}.{field}"),
                    format!("{label} {name} is required"),
                ));
            }
        }
        if !is_blank(&self.zip) && !zip_re.is_match(self.zip.trim()) {
            errors.push(FieldError::new(
                format!("{key}.zip"),
                "ZIP code must be 5 digits",
            ));
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub billing_address: AddressRecord,
    pub shipping_address: AddressRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    #[serde(default)]
    pub gate: Option<Gate>,
    #[serde(default)]
    pub billing: AddressRecord,
    #[serde(default)]
    pub shipping: AddressRecord,
    #[serde(default)]
    pub same_as_billing: bool,
}

impl AddressForm {
    pub fn is_blank(&self) -> bool {
        self.billing.is_blank() && self.shipping.is_blank()
    }

    pub fn from_stored(stored: &str) -> Self {
        if stored.trim() == GATE_NO {
            return Self {
                gate: Some(Gate::No),
                ..Self::default()
            };
        }
        match serde_json::from_str::<AddressPayload>(stored) {
            Ok(payload) => Self::from_payload(payload),
            Err(err) => {
                warn!("Ignoring unreadable stored address: {err}");
                Self::default()
            }
        }
    }

    fn from_payload(payload: AddressPayload) -> Self {
        let same_as_billing = payload.billing_address == payload.shipping_address;
        Self {
            gate: Some(Gate::Yes),
            billing: payload.billing_address,
            shipping: payload.shipping_address,
            same_as_billing,
        }
    }

    pub fn switch_gate(&mut self, gate: Gate, cached: Option<&str>) {
        self.gate = Some(gate);
        if gate != Gate::Yes || !self.is_blank() {
            return;
        }
        if let Some(payload) = cached.and_then(|raw| serde_json::from_str::<AddressPayload>(raw).ok()) {
            *self = Self::from_payload(payload);
        }
    }

    pub fn problems(&self) -> Vec<FieldError> {
        let mut errors = self.billing.problems("billing", "Billing");
        if !self.same_as_billing {
            errors.extend(self.shipping.problems("shipping", "Shipping"));
        }
        errors
    }

    pub fn serialize(&self) -> Result<String, Vec<FieldError>> {
        let errors = self.problems();
        if !errors.is_empty() {
            return Err(errors);
        }
        let shipping = if self.same_as_billing {
            self.billing.clone()
        } else {
            self.shipping.clone()
        };
        let payload = AddressPayload {
            billing_address: self.billing.clone(),
            shipping_address: shipping,
        };
        serde_json::to_string(&payload)
            .map_err(|e| vec![FieldError::new("address", format!("Unable to save address: {e}"))])
    }
}
