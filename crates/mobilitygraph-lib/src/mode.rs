//! Transport modes, mode filters, and routing weight metrics.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Marker token identifying MRT stops inside a stop identifier.
pub const MRT_MARKER: &str = "MRT";
/// Marker token identifying LRT stops inside a stop identifier.
pub const LRT_MARKER: &str = "LRT";

/// Mode carried by a stop, an edge, or a computed leg.
///
/// Stops are always one of the three transit modes. `Transfer` is only used by
/// transfer edges and `Walk` only by walking legs appended after routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Mode {
    #[serde(rename = "MRT")]
    Mrt,
    #[serde(rename = "LRT")]
    Lrt,
    #[serde(rename = "TJ")]
    TransJakarta,
    #[serde(rename = "TRANSFER")]
    Transfer,
    #[serde(rename = "WALK")]
    Walk,
}

impl Mode {
    /// Modes a stop can belong to, in filter order.
    pub const TRANSIT: [Mode; 3] = [Mode::Mrt, Mode::Lrt, Mode::TransJakarta];

    /// Derive the mode of a stop (or route) from its identifier.
    pub fn from_stop_id(id: &str) -> Self {
        if id.contains(MRT_MARKER) {
            Mode::Mrt
        } else if id.contains(LRT_MARKER) {
            Mode::Lrt
        } else {
            Mode::TransJakarta
        }
    }

    /// Short code used in requests and serialized output.
    pub fn code(self) -> &'static str {
        match self {
            Mode::Mrt => "MRT",
            Mode::Lrt => "LRT",
            Mode::TransJakarta => "TJ",
            Mode::Transfer => "TRANSFER",
            Mode::Walk => "WALK",
        }
    }

    /// Human-readable operator name.
    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Mrt => "MRT Jakarta",
            Mode::Lrt => "LRT Jabodebek",
            Mode::TransJakarta => "TransJakarta",
            Mode::Transfer => "Transfer",
            Mode::Walk => "Walk",
        }
    }

    /// Short description of the service type.
    pub fn description(self) -> &'static str {
        match self {
            Mode::Mrt => "Mass Rapid Transit",
            Mode::Lrt => "Light Rail Transit",
            Mode::TransJakarta => "Bus Rapid Transit",
            Mode::Transfer => "Change between modes",
            Mode::Walk => "Walking",
        }
    }

    /// Whether fares on this mode are computed per distance travelled.
    pub fn is_rail(self) -> bool {
        matches!(self, Mode::Mrt | Mode::Lrt)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Restricts routing to a single transit mode, or allows all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModeFilter {
    #[default]
    All,
    Only(Mode),
}

impl ModeFilter {
    /// Every selectable filter, in catalogue order.
    pub const CHOICES: [ModeFilter; 4] = [
        ModeFilter::Only(Mode::Mrt),
        ModeFilter::Only(Mode::Lrt),
        ModeFilter::Only(Mode::TransJakarta),
        ModeFilter::All,
    ];

    /// Whether a stop or edge of `mode` passes this filter.
    pub fn allows(self, mode: Mode) -> bool {
        match self {
            ModeFilter::All => true,
            ModeFilter::Only(only) => only == mode,
        }
    }

    /// The single mode selected, if any.
    pub fn mode(self) -> Option<Mode> {
        match self {
            ModeFilter::All => None,
            ModeFilter::Only(mode) => Some(mode),
        }
    }
}

impl fmt::Display for ModeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeFilter::All => f.write_str("ALL"),
            ModeFilter::Only(mode) => f.write_str(mode.code()),
        }
    }
}

/// One entry of the mode catalogue offered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeInfo {
    pub id: ModeFilter,
    pub name: &'static str,
    pub description: &'static str,
}

/// Selectable mode filters with their display names.
pub fn mode_catalog() -> Vec<ModeInfo> {
    ModeFilter::CHOICES
        .into_iter()
        .map(|filter| match filter {
            ModeFilter::All => ModeInfo {
                id: filter,
                name: "Semua Moda",
                description: "Multi-modal (kombinasi)",
            },
            ModeFilter::Only(mode) => ModeInfo {
                id: filter,
                name: mode.display_name(),
                description: mode.description(),
            },
        })
        .collect()
}

impl FromStr for ModeFilter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(ModeFilter::All),
            "MRT" => Ok(ModeFilter::Only(Mode::Mrt)),
            "LRT" => Ok(ModeFilter::Only(Mode::Lrt)),
            "TJ" => Ok(ModeFilter::Only(Mode::TransJakarta)),
            _ => Err(Error::invalid_request(format!(
                "unknown mode filter '{value}'; expected one of MRT, LRT, TJ, ALL"
            ))),
        }
    }
}

impl Serialize for ModeFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Edge attribute minimised by the shortest-path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMetric {
    #[default]
    Time,
    Distance,
    Cost,
}

impl fmt::Display for WeightMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            WeightMetric::Time => "time",
            WeightMetric::Distance => "distance",
            WeightMetric::Cost => "cost",
        };
        f.write_str(value)
    }
}

impl FromStr for WeightMetric {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "time" | "time_minutes" => Ok(WeightMetric::Time),
            "distance" | "distance_km" => Ok(WeightMetric::Distance),
            "cost" | "cost_idr" => Ok(WeightMetric::Cost),
            _ => Err(Error::invalid_request(format!(
                "unknown weight metric '{value}'; expected one of time, distance, cost"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_is_derived_from_marker_tokens() {
        assert_eq!(Mode::from_stop_id("Stop_MRT_01"), Mode::Mrt);
        assert_eq!(Mode::from_stop_id("Stop_LRT_07"), Mode::Lrt);
        assert_eq!(Mode::from_stop_id("Halte_Monas"), Mode::TransJakarta);
        // MRT wins when both markers are present.
        assert_eq!(Mode::from_stop_id("MRT_LRT_Dukuh"), Mode::Mrt);
    }

    #[test]
    fn mode_filter_parses_case_insensitively() {
        assert_eq!("all".parse::<ModeFilter>().unwrap(), ModeFilter::All);
        assert_eq!(
            "tj".parse::<ModeFilter>().unwrap(),
            ModeFilter::Only(Mode::TransJakarta)
        );
        assert_eq!(ModeFilter::Only(Mode::Lrt).to_string(), "LRT");
    }

    #[test]
    fn unknown_mode_filter_is_invalid_request() {
        let err = "BUS".parse::<ModeFilter>().unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
        assert!(err.to_string().contains("BUS"));
    }

    #[test]
    fn catalogue_lists_every_filter_once() {
        let catalog = mode_catalog();
        let ids: Vec<String> = catalog.iter().map(|info| info.id.to_string()).collect();
        assert_eq!(ids, vec!["MRT", "LRT", "TJ", "ALL"]);
        assert_eq!(catalog[2].name, "TransJakarta");
        assert_eq!(catalog[2].description, "Bus Rapid Transit");
        assert_eq!(catalog[3].name, "Semua Moda");
        for info in &catalog {
            assert_eq!(info.id.to_string().parse::<ModeFilter>().unwrap(), info.id);
        }
    }

    #[test]
    fn weight_metric_accepts_attribute_names() {
        assert_eq!("time_minutes".parse::<WeightMetric>().unwrap(), WeightMetric::Time);
        assert_eq!("Distance".parse::<WeightMetric>().unwrap(), WeightMetric::Distance);
        assert_eq!("cost".parse::<WeightMetric>().unwrap(), WeightMetric::Cost);
        assert!("fastest".parse::<WeightMetric>().is_err());
    }
}
