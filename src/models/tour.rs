use serde::{Deserialize, Serialize};

/// A named pricing tier (e.g. adult/child) used instead of the flat rate.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlotType {
    pub name: String,
    pub price: f64,
}

/// Extra per-slot data collected at booking time (e.g. dietary restriction).
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlotField {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

// The "type" field picks the variant, same shape the backend stores.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(default)]
        min_len: Option<usize>,
        #[serde(default)]
        max_len: Option<usize>,
    },
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Select { options: Vec<String> },
    Checkbox,
}

#[derive(Debug)]
pub enum ConfigParseError {
    SlotTypes(String),
    SlotFields(String),
}

impl std::fmt::Display for ConfigParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigParseError::SlotTypes(err) => write!(f, "Invalid custom slot types: {}", err),
            ConfigParseError::SlotFields(err) => write!(f, "Invalid custom slot fields: {}", err),
        }
    }
}

impl std::error::Error for ConfigParseError {}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Tour {
    pub id: String,
    pub name: String,
    /// Flat per-person rate, used when no custom slot types are defined.
    pub rate: f64,
    pub max_group: u32,
    /// Active days of week (0=Sunday, 1=Monday, ..., 6=Saturday)
    pub active_weekdays: Vec<u8>,
    /// Bookable times of day on active weekdays ("HH:mm")
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub slot_types: Vec<SlotType>,
    #[serde(default)]
    pub slot_fields: Vec<SlotField>,
}

impl Tour {
    pub fn has_custom_slot_types(&self) -> bool {
        !self.slot_types.is_empty()
    }

    pub fn slot_type(&self, name: &str) -> Option<&SlotType> {
        self.slot_types.iter().find(|t| t.name == name)
    }
}

/// Raw tour row as the hosted backend returns it. The custom slot
/// configuration arrives as serialized JSON text and is parsed exactly
/// once, here, into the typed structures above.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TourRecord {
    pub id: String,
    pub name: String,
    pub rate: f64,
    pub max_group: u32,
    #[serde(default)]
    pub active_weekdays: Vec<u8>,
    #[serde(default)]
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub custom_slot_types: Option<String>,
    #[serde(default)]
    pub custom_slot_fields: Option<String>,
}

impl TourRecord {
    pub fn into_tour(self) -> Result<Tour, ConfigParseError> {
        let slot_types = match self.custom_slot_types.as_deref() {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<Vec<SlotType>>(raw)
                .map_err(|e| ConfigParseError::SlotTypes(e.to_string()))?,
            _ => Vec::new(),
        };

        let slot_fields = match self.custom_slot_fields.as_deref() {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<Vec<SlotField>>(raw)
                .map_err(|e| ConfigParseError::SlotFields(e.to_string()))?,
            _ => Vec::new(),
        };

        Ok(Tour {
            id: self.id,
            name: self.name,
            rate: self.rate,
            max_group: self.max_group,
            active_weekdays: self.active_weekdays,
            time_slots: self.time_slots,
            slot_types,
            slot_fields,
        })
    }
}
