//! Asset catalog: the investment options a player can allocate cash to.
//!
//! Catalog order is significant. The engine resolves returns in this
//! order (so RNG consumption is stable) and the outcome analyzer breaks
//! ROI ties by it.

use crate::{error::ConfigError, types::AssetKey};
use serde::{Deserialize, Serialize};

/// Allowed drift when checking that tier weights sum to 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Ordinal risk label. Ordering is from least to most risky.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Moderate,
    Risky,
    Dangerous,
}


/// Three-tier weighted return rule over a [min, max] rate interval.
///
/// Weights are ordered low, mid, high. Each tier owns a fixed slice of
/// the interval (see `Tier::bounds`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReturnProfile {
    pub min:     f64,
    pub max:     f64,
    pub weights: [f64; 3],
}

impl ReturnProfile {
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    fn validate(&self, key: &str) -> Result<(), ConfigError> {
        if self.min > self.max || !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::InvertedRange {
                key: key.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        if let Some(&weight) = self.weights.iter().find(|w| **w < 0.0 || !w.is_finite()) {
            return Err(ConfigError::NegativeWeight { key: key.to_string(), weight });
        }
        let sum: f64 = self.weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSumToOne { key: key.to_string(), sum });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub key:         AssetKey,
    pub name:        String,
    pub icon:        String,
    pub description: String,
    /// Plain-language explanation of what the asset stands for.
    #[serde(default)]
    pub why_value:   String,
    pub risk:        RiskLevel,
    pub returns:     ReturnProfile,
}

impl Asset {
    pub fn display_name(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.icon)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetCatalog {
    pub assets: Vec<Asset>,
}

impl AssetCatalog {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    pub fn get(&self, key: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// First asset (in catalog order) carrying the given risk level.
    pub fn first_with_risk(&self, risk: RiskLevel) -> Option<&Asset> {
        self.assets.iter().find(|a| a.risk == risk)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.is_empty() {
            return Err(ConfigError::EmptyAssetCatalog);
        }
        for (i, asset) in self.assets.iter().enumerate() {
            if self.assets[..i].iter().any(|a| a.key == asset.key) {
                return Err(ConfigError::DuplicateAsset { key: asset.key.clone() });
            }
            asset.returns.validate(&asset.key)?;
        }
        Ok(())
    }
}
