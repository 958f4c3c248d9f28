//! Fare rules for each transport mode.
//!
//! Every function here is total: unknown stations, odd distances, or
//! non-finite input never panic and always produce a non-negative fare in
//! rupiah.
//!
//! - MRT: published station-to-station matrix.
//! - LRT: base fare for the first kilometre, then a per-kilometre increment
//!   with partial kilometres rounded up.
//! - TransJakarta: flat fare per boarding.
//! - Walking: free.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Fare amount in Indonesian rupiah.
pub type Rupiah = u32;

/// Canonical MRT stations in travel order; indices match [`MRT_FARE_MATRIX`].
pub const MRT_STATIONS: [&str; 13] = [
    "Lebak Bulus",
    "Fatmawati Indomaret",
    "Cipete Raya Tuku",
    "Haji Nawi",
    "Blok A",
    "Blok M BCA",
    "ASEAN",
    "Senayan Mastercard",
    "Istora Mandiri",
    "Bendungan Hilir",
    "Setiabudi Astra",
    "Dukuh Atas BNI",
    "Bundaran HI Bank DKI",
];

/// Official symmetric MRT fare matrix.
#[rustfmt::skip]
pub const MRT_FARE_MATRIX: [[Rupiah; 13]; 13] = [
    //LB     Fat    Cip    HN     BA     BM     ASN    Sen    Ist    BH     Set    DA     BHI
    [0,     4000,  5000,  6000,  7000,  8000,  9000,  10000, 11000, 12000, 13000, 14000, 14000],
    [4000,  0,     4000,  5000,  6000,  7000,  7000,  9000,  9000,  10000, 11000, 12000, 13000],
    [5000,  4000,  0,     3000,  4000,  5000,  6000,  7000,  8000,  9000,  9000,  10000, 11000],
    [6000,  5000,  3000,  0,     3000,  4000,  5000,  6000,  7000,  8000,  8000,  9000,  10000],
    [7000,  6000,  4000,  3000,  0,     3000,  4000,  5000,  6000,  7000,  7000,  8000,  9000],
    [8000,  7000,  5000,  4000,  3000,  0,     3000,  4000,  5000,  6000,  6000,  7000,  8000],
    [9000,  7000,  6000,  5000,  4000,  3000,  0,     3000,  4000,  5000,  6000,  7000,  7000],
    [10000, 9000,  7000,  6000,  5000,  4000,  3000,  0,     3000,  4000,  4000,  5000,  6000],
    [11000, 9000,  8000,  7000,  6000,  5000,  4000,  3000,  0,     4000,  4000,  5000,  6000],
    [12000, 10000, 9000,  8000,  7000,  6000,  5000,  4000,  3000,  0,     3000,  3000,  4000],
    [13000, 11000, 9000,  8000,  7000,  6000,  6000,  4000,  3000,  3000,  0,     3000,  4000],
    [14000, 12000, 10000, 9000,  8000,  7000,  7000,  5000,  4000,  3000,  3000,  0,     3000],
    [14000, 13000, 11000, 10000, 9000,  8000,  7000,  6000,  5000,  4000,  4000,  3000,  0],
];

/// Charged when either MRT endpoint cannot be resolved to a canonical station.
pub const MRT_FALLBACK_FARE: Rupiah = 7000;

/// LRT fare covering the first kilometre.
pub const LRT_BASE_FARE: Rupiah = 5000;

/// LRT increment for every started kilometre beyond the first.
pub const LRT_FARE_PER_KM: Rupiah = 700;

/// TransJakarta flat fare per boarding.
pub const TRANSJAKARTA_FLAT_FARE: Rupiah = 3500;

/// Facility prefixes removed before station matching.
const STATION_PREFIXES: [&str; 4] = ["stasiun mrt ", "stasiun lrt ", "halte ", "station "];

/// Normalized alias -> canonical station index.
static MRT_STATION_ALIASES: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    [
        ("lebak bulus grab", 0),
        ("lebak bulus", 0),
        ("fatmawati indomaret", 1),
        ("fatmawati", 1),
        ("cipete raya tuku", 2),
        ("cipete raya", 2),
        ("cipete", 2),
        ("haji nawi", 3),
        ("blok a", 4),
        ("blok m bca", 5),
        ("blok m", 5),
        ("asean", 6),
        ("senayan mastercard", 7),
        ("senayan", 7),
        ("istora mandiri", 8),
        ("istora", 8),
        ("bendungan hilir", 9),
        ("benhil", 9),
        ("setiabudi astra", 10),
        ("setiabudi", 10),
        ("dukuh atas bni", 11),
        ("dukuh atas", 11),
        ("bundaran hi bank dki", 12),
        ("bundaran hi", 12),
        ("bundaran hotel indonesia", 12),
    ]
    .into_iter()
    .collect()
});

/// Lower-case a station name, strip facility prefixes, and collapse separators.
pub fn normalize_station_name(name: &str) -> String {
    let mut normalized = name.to_lowercase();
    for prefix in STATION_PREFIXES {
        if let Some(rest) = normalized.strip_prefix(prefix) {
            normalized = rest.to_string();
        }
    }
    normalized
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve a station name to its index in [`MRT_STATIONS`].
///
/// Alias lookup is tried first, then substring containment in either
/// direction against the canonical names. The containment step is
/// approximate: a short input such as `"blok"` resolves to the first
/// canonical station containing it.
pub fn mrt_station_index(name: &str) -> Option<usize> {
    let normalized = normalize_station_name(name);
    if normalized.is_empty() {
        return None;
    }

    if let Some(&index) = MRT_STATION_ALIASES.get(normalized.as_str()) {
        return Some(index);
    }

    MRT_STATIONS.iter().position(|station| {
        let station = station.to_lowercase();
        station.contains(&normalized) || normalized.contains(&station)
    })
}

/// MRT fare between two station names, or [`MRT_FALLBACK_FARE`] when either is unknown.
pub fn mrt_fare(from_station: &str, to_station: &str) -> Rupiah {
    match (mrt_station_index(from_station), mrt_station_index(to_station)) {
        (Some(from), Some(to)) => MRT_FARE_MATRIX[from][to],
        _ => MRT_FALLBACK_FARE,
    }
}

/// LRT fare for a continuous ride of `distance_km`.
pub fn lrt_fare(distance_km: f64) -> Rupiah {
    // Also catches NaN, which is charged the base fare.
    if !(distance_km > 1.0) {
        return LRT_BASE_FARE;
    }
    // Float-to-int `as` saturates, so huge distances cap instead of wrapping.
    let additional_km = (distance_km - 1.0).ceil() as Rupiah;
    LRT_BASE_FARE.saturating_add(additional_km.saturating_mul(LRT_FARE_PER_KM))
}

/// TransJakarta fare for one boarding, regardless of distance or stops.
pub fn transjakarta_fare() -> Rupiah {
    TRANSJAKARTA_FLAT_FARE
}

/// Walking never costs anything.
pub fn walk_fare() -> Rupiah {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        for (i, row) in MRT_FARE_MATRIX.iter().enumerate() {
            assert_eq!(row[i], 0);
            for (j, fare) in row.iter().enumerate() {
                assert_eq!(*fare, MRT_FARE_MATRIX[j][i], "asymmetric at {i},{j}");
            }
        }
    }

    #[test]
    fn fare_is_symmetric_for_every_canonical_pair() {
        for a in MRT_STATIONS {
            for b in MRT_STATIONS {
                assert_eq!(mrt_fare(a, b), mrt_fare(b, a), "{a} <-> {b}");
            }
        }
    }

    #[test]
    fn end_to_end_mrt_fare_matches_matrix() {
        assert_eq!(mrt_fare("Lebak Bulus", "Bundaran HI Bank DKI"), 14000);
        assert_eq!(mrt_fare("Blok M", "Senayan"), 4000);
    }

    #[test]
    fn prefixes_and_aliases_resolve() {
        assert_eq!(mrt_station_index("Stasiun MRT Blok M"), Some(5));
        assert_eq!(mrt_station_index("Halte Bundaran HI"), Some(12));
        assert_eq!(mrt_station_index("BENHIL"), Some(9));
        assert_eq!(mrt_station_index("Lebak_Bulus-Grab"), Some(0));
    }

    #[test]
    fn substring_match_is_approximate() {
        assert_eq!(mrt_station_index("Istora Mandiri Senayan"), Some(8));
        assert_eq!(mrt_station_index("Blok"), Some(4));
    }

    #[test]
    fn unknown_station_uses_fallback() {
        assert_eq!(mrt_station_index("Gambir"), None);
        assert_eq!(mrt_station_index("   "), None);
        assert_eq!(mrt_fare("Gambir", "Blok M"), MRT_FALLBACK_FARE);
    }

    #[test]
    fn lrt_fare_bands() {
        assert_eq!(lrt_fare(0.0), 5000);
        assert_eq!(lrt_fare(1.0), 5000);
        assert_eq!(lrt_fare(1.01), 5700);
        assert_eq!(lrt_fare(2.0), 5700);
        assert_eq!(lrt_fare(2.5), 6400);
        assert_eq!(lrt_fare(-3.0), 5000);
        assert_eq!(lrt_fare(f64::NAN), 5000);
        assert!(lrt_fare(f64::INFINITY) > 5000);
    }

    #[test]
    fn lrt_fare_is_monotonic() {
        let mut previous = 0;
        for step in 0..400 {
            let fare = lrt_fare(step as f64 * 0.05);
            assert!(fare >= previous);
            previous = fare;
        }
    }

    #[test]
    fn flat_and_free_fares() {
        assert_eq!(transjakarta_fare(), 3500);
        assert_eq!(walk_fare(), 0);
    }
}
