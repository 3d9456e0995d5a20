//! UV-index risk bands and sun-protection advice.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvRisk {
    NoData,
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvRisk {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoData => "No Data",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
            Self::Extreme => "Extreme!",
        }
    }

    pub fn precautions(&self) -> &'static [Precaution] {
        use Precaution::*;
        match self {
            Self::NoData => &[],
            Self::Low => &[Sunscreen, Sunglasses],
            Self::Moderate => &[Sunscreen, Sunglasses, Hat, Shade],
            Self::High | Self::VeryHigh | Self::Extreme => {
                &[Sunscreen, Sunglasses, Hat, Shade, CoverUp]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precaution {
    Sunscreen,
    Sunglasses,
    Hat,
    Shade,
    CoverUp,
}

impl Precaution {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Sunscreen => "Apply sunscreen",
            Self::Sunglasses => "Wear sunglasses",
            Self::Hat => "Wear a hat",
            Self::Shade => "Seek shade",
            Self::CoverUp => "Cover up with clothing",
        }
    }
}

/// A day's UV reading as shown on the gauge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UvReading {
    /// Rounded daily maximum
    pub index: u8,
    pub risk: UvRisk,
    /// Needle position, always 1..=10
    pub gauge: u8,
    pub spf: Option<&'static str>,
    pub minutes_to_burn: Option<u16>,
}

impl UvReading {
    pub fn from_index(uv_index_max: f64) -> Self {
        let index = if uv_index_max.is_finite() {
            uv_index_max.round().clamp(0.0, 20.0) as u8
        } else {
            0
        };

        let (risk, spf, minutes_to_burn) = match index {
            0 => (UvRisk::NoData, None, None),
            1..=2 => (UvRisk::Low, Some("15"), Some(60)),
            3 => (UvRisk::Low, Some("30+"), Some(45)),
            4..=5 => (UvRisk::Moderate, Some("30+"), Some(45)),
            6..=7 => (UvRisk::High, Some("50"), Some(30)),
            8..=9 => (UvRisk::VeryHigh, Some("50"), Some(15)),
            _ => (UvRisk::Extreme, Some("50+"), Some(10)),
        };

        Self {
            index,
            risk,
            gauge: index.clamp(1, 10),
            spf,
            minutes_to_burn,
        }
    }
}

/// Whole hours of sunshine from Open-Meteo's `sunshine_duration` seconds
pub fn sunshine_hours(sunshine_duration_secs: f64) -> u32 {
    if sunshine_duration_secs.is_finite() && sunshine_duration_secs > 0.0 {
        (sunshine_duration_secs / 3600.0).round() as u32
    } else {
        0
    }
}
