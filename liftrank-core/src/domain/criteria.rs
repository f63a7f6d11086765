use crate::data::schema::{DIVISION, EQUIPMENT, FEDERATION, MEET_COUNTRY, SEX, WEIGHT_CLASS_KG};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A selectable attribute of a competition record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Sex,
    WeightClass,
    Equipment,
    Division,
    Federation,
    Country,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Sex,
        Attribute::WeightClass,
        Attribute::Equipment,
        Attribute::Division,
        Attribute::Federation,
        Attribute::Country,
    ];

    /// Canonical-table column the attribute is matched against.
    pub fn column(self) -> &'static str {
        match self {
            Attribute::Sex => SEX,
            Attribute::WeightClass => WEIGHT_CLASS_KG,
            Attribute::Equipment => EQUIPMENT,
            Attribute::Division => DIVISION,
            Attribute::Federation => FEDERATION,
            Attribute::Country => MEET_COUNTRY,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Attribute::Sex => "sex",
            Attribute::WeightClass => "weight_class",
            Attribute::Equipment => "equipment",
            Attribute::Division => "division",
            Attribute::Federation => "federation",
            Attribute::Country => "country",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute '{0}' (expected one of: sex, weight_class, equipment, division, federation, country)")]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "sex" => Ok(Attribute::Sex),
            "weight_class" | "weightclass" => Ok(Attribute::WeightClass),
            "equipment" | "modality" => Ok(Attribute::Equipment),
            "division" => Ok(Attribute::Division),
            "federation" => Ok(Attribute::Federation),
            "country" | "meet_country" => Ok(Attribute::Country),
            _ => Err(UnknownAttribute(s.to_string())),
        }
    }
}

/// Optional per-attribute constraints. An attribute without an entry is
/// unrestricted.
///
/// Backed by a `BTreeMap` so the serialized form (and therefore the cache
/// key derived from it) is independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria {
    constraints: BTreeMap<Attribute, String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterCriteria::set`].
    pub fn with(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.constraints.insert(attribute, value.into());
        self
    }

    /// Constrain `attribute` to `value`, or lift the constraint with `None`.
    pub fn set(&mut self, attribute: Attribute, value: Option<String>) {
        match value {
            Some(value) => {
                self.constraints.insert(attribute, value);
            }
            None => {
                self.constraints.remove(&attribute);
            }
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        self.constraints.get(&attribute).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &str)> + '_ {
        self.constraints
            .iter()
            .map(|(attribute, value)| (*attribute, value.as_str()))
    }

    /// Canonical JSON of the criteria, used for cache keys. Keys come out
    /// sorted and values are escaped, so distinct criteria never share bytes.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
