//! Shared fixtures for integration tests.
//!
//! Datasets are written into a fresh `TempDir` for every test, in either the
//! tabular layout or the triple layout, so tests never touch a real dataset.

#![allow(dead_code)]

use std::path::PathBuf;

use mobilitygraph_lib::{
    load_entity_store, Coordinates, EntityStore, GraphBuildOptions, PlaceOfInterest, Router, Stop,
};
use rusqlite::{params, Connection};
use tempfile::TempDir;

pub struct StopRow {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub struct RouteRow {
    pub id: &'static str,
    pub name: &'static str,
    pub stops: &'static [&'static str],
}

pub struct PlaceRow {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub region: Option<&'static str>,
    pub category: Option<&'static str>,
    pub near_stop: Option<&'static str>,
}

/// Small Jakarta network: six MRT stations on one line, three LRT stations,
/// a chain of TransJakarta stops linking Blok M to Dukuh Atas, and one
/// isolated TransJakarta stop.
pub const STOPS: &[StopRow] = &[
    StopRow { id: "Stop_MRT_01", name: "Lebak Bulus", lat: -6.2891, lon: 106.7742 },
    StopRow { id: "Stop_MRT_02", name: "Fatmawati", lat: -6.2925, lon: 106.7925 },
    StopRow { id: "Stop_MRT_03", name: "Cipete Raya", lat: -6.2783, lon: 106.7975 },
    StopRow { id: "Stop_MRT_04", name: "Haji Nawi", lat: -6.2665, lon: 106.7972 },
    StopRow { id: "Stop_MRT_05", name: "Blok A", lat: -6.2557, lon: 106.7970 },
    StopRow { id: "Stop_MRT_06", name: "Blok M", lat: -6.2444, lon: 106.7981 },
    StopRow { id: "Stop_LRT_01", name: "Dukuh Atas LRT", lat: -6.2046, lon: 106.8222 },
    StopRow { id: "Stop_LRT_02", name: "Setiabudi LRT", lat: -6.2090, lon: 106.8300 },
    StopRow { id: "Stop_LRT_03", name: "Rasuna Said", lat: -6.2200, lon: 106.8320 },
    StopRow { id: "Halte_01", name: "Blok M TJ", lat: -6.2430, lon: 106.7990 },
    StopRow { id: "Halte_02", name: "Masjid Agung", lat: -6.2360, lon: 106.7980 },
    StopRow { id: "Halte_03", name: "Bundaran Senayan", lat: -6.2270, lon: 106.8000 },
    StopRow { id: "Halte_04", name: "Gelora Bung Karno", lat: -6.2180, lon: 106.8040 },
    StopRow { id: "Halte_06", name: "Karet", lat: -6.2115, lon: 106.8130 },
    StopRow { id: "Halte_05", name: "Dukuh Atas TJ", lat: -6.2050, lon: 106.8215 },
    StopRow { id: "Halte_99", name: "Pulau Terpencil", lat: -6.1000, lon: 106.9000 },
];

pub const ROUTES: &[RouteRow] = &[
    RouteRow {
        id: "Route_MRT_NS",
        name: "MRT Lin Utara-Selatan",
        stops: &[
            "Stop_MRT_01",
            "Stop_MRT_02",
            "Stop_MRT_03",
            "Stop_MRT_04",
            "Stop_MRT_05",
            "Stop_MRT_06",
        ],
    },
    RouteRow {
        id: "Route_LRT_BKT",
        name: "LRT Jabodebek",
        stops: &["Stop_LRT_01", "Stop_LRT_02", "Stop_LRT_03"],
    },
];

pub const PLACES: &[PlaceRow] = &[
    PlaceRow {
        id: "Place_Blok_M_Square",
        name: "Blok M Square",
        lat: -6.2442,
        lon: 106.8005,
        region: Some("Region_Jaksel"),
        category: Some("Shopping"),
        near_stop: None,
    },
    PlaceRow {
        id: "Place_GBK",
        name: "Gelora Bung Karno Stadium",
        lat: -6.2186,
        lon: 106.8020,
        region: Some("Region_Jakpus"),
        category: Some("Sports"),
        near_stop: Some("Halte_04"),
    },
    PlaceRow {
        id: "Place_Taman_Dukuh_Atas",
        name: "Taman Dukuh Atas",
        lat: -6.2046,
        lon: 106.8222,
        region: Some("Region_Jakpus"),
        category: Some("Park"),
        near_stop: Some("Stop_LRT_01"),
    },
    PlaceRow {
        id: "Place_Kuningan_City",
        name: "Kuningan City",
        lat: -6.2240,
        lon: 106.8330,
        region: Some("Region_Jaksel"),
        category: Some("Shopping"),
        near_stop: Some("Stop_LRT_03"),
    },
    PlaceRow {
        id: "Place_Isolated",
        name: "Isolated Beach",
        lat: -6.1005,
        lon: 106.9005,
        region: None,
        category: None,
        near_stop: Some("Halte_99"),
    },
];

pub const REGIONS: &[(&str, &str)] = &[
    ("Region_Jaksel", "Jakarta Selatan"),
    ("Region_Jakpus", "Jakarta Pusat"),
];

/// Dataset written to a temporary directory that lives as long as this value.
pub struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    fn create(file_name: &str) -> (Self, Connection) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join(file_name);
        let connection = Connection::open(&path).expect("create fixture database");
        (Self { _dir: dir, path }, connection)
    }

    pub fn dir(&self) -> PathBuf {
        self._dir.path().to_path_buf()
    }
}

/// The standard network in the tabular layout.
pub fn tabular_fixture() -> Fixture {
    let (fixture, connection) = Fixture::create("mobility.db");
    write_tabular(&connection, STOPS, ROUTES, PLACES, REGIONS);
    fixture
}

/// Tabular dataset with caller-supplied rows.
pub fn custom_tabular_fixture(stops: &[StopRow], routes: &[RouteRow], places: &[PlaceRow]) -> Fixture {
    let (fixture, connection) = Fixture::create("mobility.db");
    write_tabular(&connection, stops, routes, places, &[]);
    fixture
}

pub fn write_tabular(
    connection: &Connection,
    stops: &[StopRow],
    routes: &[RouteRow],
    places: &[PlaceRow],
    regions: &[(&str, &str)],
) {
    connection
        .execute_batch(
            "CREATE TABLE Stops (stopId TEXT PRIMARY KEY, name TEXT, lat REAL, long REAL);
             CREATE TABLE Routes (routeId TEXT PRIMARY KEY, name TEXT);
             CREATE TABLE RouteStops (routeId TEXT, stopId TEXT, seq INTEGER);
             CREATE TABLE Places (placeId TEXT PRIMARY KEY, name TEXT, lat REAL, long REAL,
                                  region TEXT, category TEXT, description TEXT, nearStop TEXT);
             CREATE TABLE Regions (regionId TEXT PRIMARY KEY, name TEXT);",
        )
        .expect("create tabular schema");

    for stop in stops {
        connection
            .execute(
                "INSERT INTO Stops (stopId, name, lat, long) VALUES (?1, ?2, ?3, ?4)",
                params![
                    format!("http://mobilitygraph.example/jakarta#{}", stop.id),
                    stop.name,
                    stop.lat,
                    stop.lon
                ],
            )
            .expect("insert stop");
    }
    for route in routes {
        connection
            .execute(
                "INSERT INTO Routes (routeId, name) VALUES (?1, ?2)",
                params![route.id, route.name],
            )
            .expect("insert route");
        // Insert in reverse so ordering must come from `seq`.
        for (seq, stop_id) in route.stops.iter().enumerate().rev() {
            connection
                .execute(
                    "INSERT INTO RouteStops (routeId, stopId, seq) VALUES (?1, ?2, ?3)",
                    params![route.id, stop_id, seq as i64],
                )
                .expect("insert route stop");
        }
    }
    for place in places {
        connection
            .execute(
                "INSERT INTO Places (placeId, name, lat, long, region, category, description, nearStop)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    place.id,
                    place.name,
                    place.lat,
                    place.lon,
                    place.region,
                    place.category,
                    format!("Visit {}", place.name),
                    place.near_stop
                ],
            )
            .expect("insert place");
    }
    for (id, name) in regions {
        connection
            .execute(
                "INSERT INTO Regions (regionId, name) VALUES (?1, ?2)",
                params![id, name],
            )
            .expect("insert region");
    }
}

/// The standard network as semantic triples.
pub fn triples_fixture() -> Fixture {
    const NS: &str = "http://mobilitygraph.example/jakarta#";
    const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    let (fixture, connection) = Fixture::create("mobility.db");
    connection
        .execute_batch("CREATE TABLE Triples (subject TEXT, predicate TEXT, object TEXT);")
        .expect("create triples schema");

    let insert = |subject: String, predicate: &str, object: String| {
        connection
            .execute(
                "INSERT INTO Triples (subject, predicate, object) VALUES (?1, ?2, ?3)",
                params![subject, predicate, object],
            )
            .expect("insert triple");
    };
    let prop = |name: &str| format!("{NS}{name}");

    for stop in STOPS {
        let subject = format!("{NS}{}", stop.id);
        insert(subject.clone(), RDF_TYPE, format!("{NS}StopPoint"));
        insert(subject.clone(), &prop("name"), format!("\"{}\"", stop.name));
        insert(subject.clone(), &prop("lat"), format!("\"{}\"^^xsd:decimal", stop.lat));
        insert(subject, &prop("long"), stop.lon.to_string());
    }
    for route in ROUTES {
        let subject = format!("{NS}{}", route.id);
        insert(subject.clone(), RDF_TYPE, format!("{NS}Route"));
        insert(subject.clone(), &prop("name"), route.name.to_string());
        for stop_id in route.stops {
            insert(subject.clone(), &prop("stopAt"), format!("{NS}{stop_id}"));
        }
    }
    for place in PLACES {
        let subject = format!("{NS}{}", place.id);
        insert(subject.clone(), RDF_TYPE, format!("{NS}PlaceOfInterest"));
        insert(subject.clone(), &prop("name"), place.name.to_string());
        insert(subject.clone(), &prop("lat"), place.lat.to_string());
        insert(subject.clone(), &prop("long"), place.lon.to_string());
        insert(
            subject.clone(),
            &prop("description"),
            format!("\"Visit {}\"@en", place.name),
        );
        if let Some(region) = place.region {
            insert(subject.clone(), &prop("region"), format!("{NS}{region}"));
        }
        if let Some(category) = place.category {
            insert(subject.clone(), &prop("category"), category.to_string());
        }
        if let Some(stop) = place.near_stop {
            insert(subject.clone(), &prop("nearStop"), format!("{NS}{stop}"));
        }
    }
    for (id, name) in REGIONS {
        let subject = format!("{NS}{id}");
        insert(subject.clone(), RDF_TYPE, format!("{NS}Region"));
        insert(subject, &prop("name"), name.to_string());
    }
    fixture
}

pub fn standard_store() -> EntityStore {
    let fixture = tabular_fixture();
    load_entity_store(&fixture.path).expect("load fixture store")
}

pub fn standard_router() -> Router {
    Router::from_store(standard_store(), &GraphBuildOptions::default())
}

pub fn place_at(id: &str, position: Coordinates, near_stop: Option<&str>) -> PlaceOfInterest {
    PlaceOfInterest {
        id: id.to_string(),
        name: id.to_string(),
        position,
        region: None,
        category: None,
        description: None,
        nearest_stop_id: near_stop.map(str::to_string),
    }
}

/// Router over in-memory entities, without a dataset file.
pub fn router_from(stops: Vec<Stop>, places: Vec<PlaceOfInterest>) -> Router {
    let store = EntityStore::new(stops, Vec::new(), places, Vec::new());
    Router::from_store(store, &GraphBuildOptions::default())
}
