use crate::error::PwProError;
use log::debug;
use pwpro_schemas::{file_formats::AddressBookFile, geo::GeoCoordinate};
use std::{collections::HashMap, fs, path::Path};

/// Resolves a street address to a coordinate.
///
/// `Ok(None)` means the lookup worked but found nothing.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Option<GeoCoordinate>, PwProError>;
}

/// Looks addresses up in a fixed table, matching case- and whitespace-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    addresses: HashMap<String, GeoCoordinate>,
}

impl StaticGeocoder {
    pub fn new(addresses: HashMap<String, GeoCoordinate>) -> Self {
        Self {
            addresses: addresses
                .into_iter()
                .map(|(address, coordinate)| (normalize(&address), coordinate))
                .collect(),
        }
    }

    /// Loads an `AddressBookFile` from YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PwProError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| PwProError::FileIO(display.clone(), e))?;
        let file: AddressBookFile =
            serde_yaml::from_str(&content).map_err(|e| PwProError::YamlParsing(display.clone(), e))?;
        debug!("address book v{}: {} entries", file.schema_version, file.addresses.len());
        if let Some((address, coordinate)) = file
            .addresses
            .iter()
            .find(|(_, c)| !(c.lat.abs() <= 90.0 && c.lon.abs() <= 180.0))
        {
            return Err(PwProError::ConfigError(format!(
                "{}: '{}' has out-of-range coordinate {}",
                display, address, coordinate
            )));
        }
        Ok(Self::new(file.addresses))
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<GeoCoordinate>, PwProError> {
        Ok(self.addresses.get(&normalize(address)).copied())
    }
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
