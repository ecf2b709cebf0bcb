//! Demo catalog
//!
//! The fixed fleet and ground-station set the engine boots with. Elements
//! are representative of the real objects' regimes, not ephemeris-accurate.

use orbit_propagation::generate_trajectory;
use orbit_propagation::OrbitalElements;
use serde_json::json;
use threat_scoring::{Classification, GroundStation, TrackedObject};

/// USA-245's catalog id; the asset the demo scenario threatens.
pub const USA_245_ID: &str = "sat-6";
/// SJ-26's catalog id; the scenario's escalating threat object.
pub const SJ_26_ID: &str = "sat-25";

struct Entry {
    id: &'static str,
    name: &'static str,
    classification: Classification,
    country: Option<&'static str>,
    rcs: Option<&'static str>,
    inclination_deg: f64,
    altitude_km: f64,
    raan_deg: f64,
    mission: &'static str,
    health: (f64, f64, f64),
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: "sat-1",
        name: "ISS (ZARYA)",
        classification: Classification::Asset,
        country: Some("USA"),
        rcs: Some("LARGE"),
        inclination_deg: 51.6,
        altitude_km: 420.0,
        raan_deg: 30.0,
        mission: "Crewed research station",
        health: (98.0, 100.0, 72.0),
    },
    Entry {
        id: "sat-2",
        name: "NOAA-20 (JPSS-1)",
        classification: Classification::Asset,
        country: Some("USA"),
        rcs: Some("MEDIUM"),
        inclination_deg: 98.7,
        altitude_km: 825.0,
        raan_deg: 210.0,
        mission: "Polar weather imaging",
        health: (95.0, 97.0, 61.0),
    },
    Entry {
        id: USA_245_ID,
        name: "USA-245",
        classification: Classification::Asset,
        country: Some("USA"),
        rcs: Some("LARGE"),
        inclination_deg: 63.4,
        altitude_km: 500.0,
        raan_deg: 142.0,
        mission: "Electro-optical reconnaissance",
        health: (92.0, 99.0, 55.0),
    },
    Entry {
        id: "sat-9",
        name: "COSMOS-2558",
        classification: Classification::Foreign,
        country: Some("RUS"),
        rcs: Some("MEDIUM"),
        inclination_deg: 97.25,
        altitude_km: 440.0,
        raan_deg: 251.0,
        mission: "Inspector satellite",
        health: (100.0, 100.0, 100.0),
    },
    Entry {
        id: SJ_26_ID,
        name: "SJ-26 (SHIJIAN-26)",
        classification: Classification::Foreign,
        country: Some("PRC"),
        rcs: Some("SMALL"),
        inclination_deg: 71.4,
        altitude_km: 520.0,
        raan_deg: 167.0,
        mission: "Declared technology demonstration",
        health: (100.0, 100.0, 94.0),
    },
    Entry {
        id: "sat-27",
        name: "KOSMOS-2562",
        classification: Classification::Foreign,
        country: Some("RUS"),
        rcs: Some("SMALL"),
        inclination_deg: 67.1,
        altitude_km: 445.0,
        raan_deg: 310.0,
        mission: "Undeclared",
        health: (100.0, 100.0, 100.0),
    },
    Entry {
        id: "sat-31",
        name: "LUCH (OLYMP-K)",
        classification: Classification::Foreign,
        country: Some("RUS"),
        rcs: Some("LARGE"),
        inclination_deg: 0.1,
        altitude_km: 35786.0,
        // Station slot at -75 deg, inside the protected Americas belt arc
        raan_deg: 285.0,
        mission: "GEO listener",
        health: (100.0, 100.0, 100.0),
    },
    Entry {
        id: "sat-40",
        name: "OBJECT 2024-091C",
        classification: Classification::Unknown,
        country: None,
        rcs: Some("SMALL"),
        inclination_deg: 53.0,
        altitude_km: 560.0,
        raan_deg: 12.0,
        mission: "Uncatalogued",
        health: (100.0, 100.0, 100.0),
    },
];

/// Build the demo fleet. Element validation cannot fail for the static
/// table above, so errors propagate only if the table is edited wrong.
pub fn demo_fleet() -> orbit_propagation::Result<Vec<TrackedObject>> {
    ENTRIES
        .iter()
        .map(|e| {
            let elements =
                OrbitalElements::new(e.inclination_deg, e.altitude_km, e.raan_deg, 0.0)?;
            let (power, comms, propellant) = e.health;
            Ok(TrackedObject {
                id: e.id.to_string(),
                name: e.name.to_string(),
                classification: e.classification,
                country_code: e.country.map(str::to_string),
                rcs_size: e.rcs.map(str::to_string),
                trajectory: generate_trajectory(&elements),
                elements,
                metadata: json!({
                    "mission": e.mission,
                    "health": { "power": power, "comms": comms, "propellant": propellant },
                }),
            })
        })
        .collect()
}

/// Allied downlink stations monitored for interception geometry.
pub fn ground_stations() -> Vec<GroundStation> {
    [
        ("Pine Gap", -23.799, 133.737),
        ("Menwith Hill", 54.008, -1.690),
        ("Buckley SFB", 39.717, -104.775),
        ("Misawa", 40.703, 141.368),
        ("Bad Aibling", 47.879, 11.984),
        ("Waihopai", -41.576, 173.739),
    ]
    .into_iter()
    .map(|(name, lat, lon)| GroundStation {
        name: name.to_string(),
        latitude_deg: lat,
        longitude_deg: lon,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_builds_and_ids_unique() {
        let fleet = demo_fleet().unwrap();
        assert!(fleet.len() >= 8);
        let mut ids: Vec<_> = fleet.iter().map(|o| o.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), fleet.len());
    }

    #[test]
    fn test_scenario_objects_present() {
        let fleet = demo_fleet().unwrap();
        let usa = fleet.iter().find(|o| o.id == USA_245_ID).unwrap();
        assert_eq!(usa.classification, Classification::Asset);
        let sj = fleet.iter().find(|o| o.id == SJ_26_ID).unwrap();
        assert_eq!(sj.classification, Classification::Foreign);
        assert_eq!(sj.country_code.as_deref(), Some("PRC"));
    }

    #[test]
    fn test_station_list_covers_both_hemispheres() {
        let stations = ground_stations();
        assert_eq!(stations.len(), 6);
        assert!(stations.iter().any(|s| s.latitude_deg < 0.0));
        assert!(stations.iter().any(|s| s.latitude_deg > 0.0));
    }
}
