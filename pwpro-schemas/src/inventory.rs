use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock of one chemical on hand, mirrored from the `chemical_inventory` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub chemical_name: String,
    pub chemical_type: String,
    pub current_stock: f64,
    pub unit: String,
    pub min_stock_level: Option<f64>,
    pub cost_per_unit: Option<f64>,
    pub last_ordered: Option<DateTime<Utc>>,
}

impl InventoryItem {
    pub fn new(
        chemical_name: impl Into<String>,
        chemical_type: impl Into<String>,
        current_stock: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            chemical_name: chemical_name.into(),
            chemical_type: chemical_type.into(),
            current_stock,
            unit: unit.into(),
            min_stock_level: None,
            cost_per_unit: None,
            last_ordered: None,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.min_stock_level
            .map_or(false, |min| self.current_stock <= min)
    }

    pub fn stock_value(&self) -> Option<f64> {
        self.cost_per_unit.map(|cost| cost * self.current_stock)
    }
}
