//! Threshold tables mapping elapsed presentation time to a value.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band<T> {
    pub at_ms: u64,
    pub value: T,
}

/// Bands sorted by ascending threshold. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BandTable<T> {
    bands: Vec<Band<T>>,
}

impl<T: Copy> BandTable<T> {
    pub fn new(pairs: impl IntoIterator<Item = (u64, T)>) -> Result<Self, ConfigError> {
        let bands = pairs
            .into_iter()
            .map(|(at_ms, value)| Band { at_ms, value })
            .collect();
        Self::from_bands(bands)
    }

    /// A single band starting at zero.
    pub fn constant(value: T) -> Self {
        Self {
            bands: vec![Band { at_ms: 0, value }],
        }
    }

    pub fn from_bands(mut bands: Vec<Band<T>>) -> Result<Self, ConfigError> {
        if bands.is_empty() {
            return Err(ConfigError::invalid("band table must have at least one band"));
        }
        bands.sort_by_key(|band| band.at_ms);
        if let Some(pair) = bands.windows(2).find(|pair| pair[0].at_ms == pair[1].at_ms) {
            return Err(ConfigError::invalid(format!(
                "band table repeats threshold {}ms",
                pair[0].at_ms
            )));
        }
        Ok(Self { bands })
    }

    /// The value of the highest band whose threshold is `<= elapsed_ms`,
    /// falling back to the lowest band.
    pub fn select(&self, elapsed_ms: u64) -> T {
        self.bands
            .iter()
            .rev()
            .find(|band| band.at_ms <= elapsed_ms)
            .unwrap_or(&self.bands[0])
            .value
    }

    pub fn iter_values(&self) -> impl Iterator<Item = T> + '_ {
        self.bands.iter().map(|band| band.value)
    }
}

impl<'de, T> Deserialize<'de> for BandTable<T>
where
    T: Copy + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bands = Vec::<Band<T>>::deserialize(deserializer)?;
        Self::from_bands(bands).map_err(serde::de::Error::custom)
    }
}
