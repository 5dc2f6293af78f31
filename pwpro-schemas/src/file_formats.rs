use crate::{chemical::Chemical, geo::GeoCoordinate, rule::AdvisoryRule};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct ChemicalFile {
    pub schema_version: String,
    pub chemicals: Vec<Chemical>,
}

#[derive(Debug, Deserialize)]
pub struct AdvisoryRuleFile {
    pub schema_version: String,
    pub rules: Vec<AdvisoryRule>,
}

#[derive(Debug, Deserialize)]
pub struct PresetFile {
    pub schema_version: String,
    pub ratio_presets: Vec<f64>,
}

/// Offline address book used in place of a network geocoder.
#[derive(Debug, Deserialize)]
pub struct AddressBookFile {
    pub schema_version: String,
    pub addresses: HashMap<String, GeoCoordinate>,
}
