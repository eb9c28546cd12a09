//! Typed housing record schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Location tag describing a block's distance to the coast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OceanProximity {
    #[serde(rename = "NEAR BAY")]
    NearBay,
    #[serde(rename = "<1H OCEAN")]
    LessThanHourOcean,
    #[serde(rename = "INLAND")]
    Inland,
    #[serde(rename = "NEAR OCEAN")]
    NearOcean,
    #[serde(rename = "ISLAND")]
    Island,
}

impl OceanProximity {
    /// All tags in display order.
    pub const ALL: [OceanProximity; 5] = [
        OceanProximity::NearBay,
        OceanProximity::LessThanHourOcean,
        OceanProximity::Inland,
        OceanProximity::NearOcean,
        OceanProximity::Island,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OceanProximity::NearBay => "NEAR BAY",
            OceanProximity::LessThanHourOcean => "<1H OCEAN",
            OceanProximity::Inland => "INLAND",
            OceanProximity::NearOcean => "NEAR OCEAN",
            OceanProximity::Island => "ISLAND",
        }
    }
}

impl fmt::Display for OceanProximity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OceanProximity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown ocean proximity: {s}"))
    }
}

/// One block group of California housing features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub housing_median_age: f64,
    pub total_rooms: f64,
    pub total_bedrooms: f64,
    pub population: f64,
    pub households: f64,
    /// Median income in tens of thousands of dollars.
    pub median_income: f64,
    pub ocean_proximity: OceanProximity,
}

impl HousingRecord {
    /// The first row of the California housing dataset.
    pub fn reference() -> Self {
        Self {
            longitude: -122.23,
            latitude: 37.88,
            housing_median_age: 41.0,
            total_rooms: 880.0,
            total_bedrooms: 129.0,
            population: 322.0,
            households: 126.0,
            median_income: 8.3252,
            ocean_proximity: OceanProximity::NearBay,
        }
    }

    /// Numeric fields in schema order.
    pub fn numeric_values(&self) -> [f64; 8] {
        [
            self.longitude,
            self.latitude,
            self.housing_median_age,
            self.total_rooms,
            self.total_bedrooms,
            self.population,
            self.households,
            self.median_income,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocean_proximity_labels() {
        assert_eq!("<1H OCEAN".parse::<OceanProximity>(), Ok(OceanProximity::LessThanHourOcean));
        assert!("near bay".parse::<OceanProximity>().is_err());

        let json = serde_json::to_string(&OceanProximity::NearOcean).unwrap();
        assert_eq!(json, r#""NEAR OCEAN""#);
    }

    #[test]
    fn test_record_deserializes_from_api_shape() {
        let record: HousingRecord = serde_json::from_value(serde_json::json!({
            "longitude": -122.23,
            "latitude": 37.88,
            "housing_median_age": 41.0,
            "total_rooms": 880.0,
            "total_bedrooms": 129.0,
            "population": 322.0,
            "households": 126.0,
            "median_income": 8.3252,
            "ocean_proximity": "NEAR BAY"
        }))
        .unwrap();
        assert_eq!(record, HousingRecord::reference());
    }
}
