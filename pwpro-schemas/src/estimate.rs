use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    Vinyl,
    Aluminum,
    Brick,
    Concrete,
    Wood,
    Stone,
    #[default]
    Unknown,
}

impl SurfaceType {
    pub const ALL: [SurfaceType; 7] = [
        SurfaceType::Vinyl,
        SurfaceType::Aluminum,
        SurfaceType::Brick,
        SurfaceType::Concrete,
        SurfaceType::Wood,
        SurfaceType::Stone,
        SurfaceType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceType::Vinyl => "vinyl",
            SurfaceType::Aluminum => "aluminum",
            SurfaceType::Brick => "brick",
            SurfaceType::Concrete => "concrete",
            SurfaceType::Wood => "wood",
            SurfaceType::Stone => "stone",
            SurfaceType::Unknown => "unknown",
        }
    }

    pub fn is_masonry(&self) -> bool {
        matches!(self, SurfaceType::Brick | SurfaceType::Stone)
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurfaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        SurfaceType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| format!("unknown surface type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contamination {
    Organic,
    Oil,
    Dirt,
    Paint,
    Mildew,
    #[default]
    Unknown,
}

impl Contamination {
    pub const ALL: [Contamination; 6] = [
        Contamination::Organic,
        Contamination::Oil,
        Contamination::Dirt,
        Contamination::Paint,
        Contamination::Mildew,
        Contamination::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Contamination::Organic => "organic",
            Contamination::Oil => "oil",
            Contamination::Dirt => "dirt",
            Contamination::Paint => "paint",
            Contamination::Mildew => "mildew",
            Contamination::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Contamination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Contamination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Contamination::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| format!("unknown contamination '{}'", s))
    }
}

/// A job estimate as synced to the `estimates` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub id: Uuid,
    pub property_owner_name: Option<String>,
    pub property_address: Option<String>,
    pub scope_of_work: String,
    pub approved: bool,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub surface: SurfaceType,
    pub contamination: Contamination,
    pub sqft: f64,
    pub notes: String,
    pub warnings: Vec<String>,
    pub recommendation: String,
}

impl Default for Estimate {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            property_owner_name: None,
            property_address: None,
            scope_of_work: String::new(),
            approved: false,
            scheduled_date: None,
            surface: SurfaceType::Unknown,
            contamination: Contamination::Unknown,
            sqft: 0.0,
            notes: String::new(),
            warnings: Vec::new(),
            recommendation: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendation: String,
    pub warnings: Vec<String>,
}
