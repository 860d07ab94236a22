//! Messiness maps
//!
//! A messiness map assigns each anchor residue its measured Law I failure
//! rate (percent). The predictors weigh candidates with it. Residues absent
//! from the map score `default_score`, which keeps "impossible" residues
//! (odd anchors mod 6) out of contention.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Score used for residues the map does not list.
pub const DEFAULT_MISSING_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessinessMap {
    pub modulus: u64,
    #[serde(
        serialize_with = "serialize_scores",
        deserialize_with = "deserialize_scores"
    )]
    pub scores: BTreeMap<u64, f64>,
    #[serde(default = "default_missing_score")]
    pub default_score: f64,
}

fn default_missing_score() -> f64 {
    DEFAULT_MISSING_SCORE
}

/// `f64::INFINITY` is written as `null` so the file stays standard JSON.
fn serialize_scores<S: Serializer>(
    scores: &BTreeMap<u64, f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let out: BTreeMap<String, Option<f64>> = scores
        .iter()
        .map(|(k, v)| (k.to_string(), v.is_finite().then_some(*v)))
        .collect();
    out.serialize(serializer)
}

fn deserialize_scores<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<u64, f64>, D::Error> {
    let raw: BTreeMap<String, Option<f64>> = BTreeMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(k, v)| {
            let key = k.trim().parse::<u64>().map_err(serde::de::Error::custom)?;
            Ok((key, v.unwrap_or(f64::INFINITY)))
        })
        .collect()
}

impl MessinessMap {
    pub fn new(modulus: u64, scores: BTreeMap<u64, f64>) -> Self {
        Self {
            modulus,
            scores,
            default_score: DEFAULT_MISSING_SCORE,
        }
    }

    fn from_pairs(modulus: u64, pairs: &[(u64, f64)]) -> Self {
        Self::new(modulus, pairs.iter().copied().collect())
    }

    /// Failure rates measured over 50M anchors.
    pub fn mod6_measured() -> Self {
        Self::from_pairs(6, &[(0, 2.7126), (2, 26.2627), (4, 26.2859)])
    }

    /// Rates measured with the k = 1 distance treated as clean.
    pub fn mod6_asymptotic() -> Self {
        Self::from_pairs(6, &[(0, 1.4488), (2, 21.5957), (4, 21.5957)])
    }

    /// Coarse scores used by the standalone pool generator.
    pub fn mod6_generator() -> Self {
        Self {
            default_score: 999.0,
            ..Self::from_pairs(6, &[(0, 1.0), (2, 21.6), (4, 20.6)])
        }
    }

    /// Score of the anchor `a + b`, without overflowing near `u64::MAX`.
    #[inline]
    pub fn score_pair(&self, a: u64, b: u64) -> f64 {
        let r = ((a as u128 + b as u128) % self.modulus as u128) as u64;
        self.scores.get(&r).copied().unwrap_or(self.default_score)
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "measured" => Some(Self::mod6_measured()),
            "asymptotic" => Some(Self::mod6_asymptotic()),
            "generator" => Some(Self::mod6_generator()),
            _ => None,
        }
    }

    #[inline]
    pub fn score(&self, anchor: u64) -> f64 {
        self.scores
            .get(&(anchor % self.modulus))
            .copied()
            .unwrap_or(self.default_score)
    }

    /// Parse either the full form (`{"modulus": 6, "scores": {...}}`) or a
    /// legacy flat residue map. The flat form needs `modulus` from the caller.
    pub fn from_json(json: &str, fallback_modulus: Option<u64>) -> Result<Self> {
        // Scores are failure rates; only the positive infinity is meaningful
        if json.contains("-Infinity") {
            return Err(CoreError::InvalidParameter(
                "messiness scores cannot be -Infinity".to_string(),
            ));
        }
        // Bare Infinity tokens are not JSON
        let cleaned = json
            .replace("\"Infinity\"", "null")
            .replace("Infinity", "null");

        let value: serde_json::Value = serde_json::from_str(&cleaned)?;
        let map = if value.get("scores").is_some() {
            serde_json::from_value::<MessinessMap>(value)?
        } else {
            let modulus = fallback_modulus.ok_or_else(|| {
                CoreError::InvalidParameter(
                    "flat messiness map needs an explicit modulus".to_string(),
                )
            })?;
            let scores = deserialize_scores(value)?;
            Self::new(modulus, scores)
        };

        if map.modulus < 2 {
            return Err(CoreError::InvalidParameter(format!(
                "messiness modulus must be >= 2, got {}",
                map.modulus
            )));
        }
        if let Some(bad) = map.scores.keys().find(|&&r| r >= map.modulus) {
            return Err(CoreError::InvalidParameter(format!(
                "residue {} out of range for modulus {}",
                bad, map.modulus
            )));
        }
        Ok(map)
    }

    pub fn load(path: &Path, fallback_modulus: Option<u64>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content, fallback_modulus)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_and_scoring() {
        let map = MessinessMap::mod6_measured();
        assert_eq!(map.score(18), 2.7126);
        assert_eq!(map.score(20), 26.2627);
        assert_eq!(map.score(22), 26.2859);
        assert_eq!(map.score(5), DEFAULT_MISSING_SCORE);
        assert!(MessinessMap::preset("nope").is_none());
    }

    #[test]
    fn test_full_form_roundtrip_keeps_infinity() -> Result<()> {
        let mut map = MessinessMap::mod6_generator();
        map.scores.insert(1, f64::INFINITY);
        let json = serde_json::to_string(&map)?;
        assert!(json.contains("null"));
        let back = MessinessMap::from_json(&json, None)?;
        assert!(back.score(1).is_infinite());
        assert_eq!(back.score(0), 1.0);
        Ok(())
    }

    #[test]
    fn test_legacy_flat_form() -> Result<()> {
        let json = r#"{"0": 0.0001, "30": 0.14, "2": Infinity}"#;
        let map = MessinessMap::from_json(json, Some(210))?;
        assert_eq!(map.modulus, 210);
        assert_eq!(map.score(420), 0.0001);
        assert!(map.score(212).is_infinite());
        assert!(MessinessMap::from_json(json, None).is_err());
        Ok(())
    }

    #[test]
    fn test_rejects_negative_infinity() {
        let flat = r#"{"0": 1.0, "2": -Infinity}"#;
        assert!(matches!(
            MessinessMap::from_json(flat, Some(6)),
            Err(CoreError::InvalidParameter(_))
        ));
        let full = r#"{"modulus": 6, "scores": {"4": "-Infinity"}}"#;
        assert!(MessinessMap::from_json(full, None).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_residue() {
        let json = r#"{"7": 1.0}"#;
        assert!(MessinessMap::from_json(json, Some(6)).is_err());
    }
}
