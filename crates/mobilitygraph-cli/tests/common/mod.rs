//! Dataset fixture and command builder shared by the CLI tests.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use rusqlite::Connection;
use tempfile::TempDir;

/// MRT line from Lebak Bulus to Blok M, a TransJakarta chain up to Dukuh
/// Atas, a short LRT line and one unreachable TransJakarta stop.
const FIXTURE_SQL: &str = "
CREATE TABLE Stops (stopId TEXT PRIMARY KEY, name TEXT, lat REAL, long REAL);
CREATE TABLE Routes (routeId TEXT PRIMARY KEY, name TEXT);
CREATE TABLE RouteStops (routeId TEXT, stopId TEXT, seq INTEGER);
CREATE TABLE Places (placeId TEXT PRIMARY KEY, name TEXT, lat REAL, long REAL,
                     region TEXT, category TEXT, description TEXT, nearStop TEXT);
CREATE TABLE Regions (regionId TEXT PRIMARY KEY, name TEXT);

INSERT INTO Stops VALUES
    ('Stop_MRT_01', 'Lebak Bulus', -6.2891, 106.7742),
    ('Stop_MRT_02', 'Fatmawati', -6.2925, 106.7925),
    ('Stop_MRT_03', 'Cipete Raya', -6.2783, 106.7975),
    ('Stop_MRT_04', 'Haji Nawi', -6.2665, 106.7972),
    ('Stop_MRT_05', 'Blok A', -6.2557, 106.7970),
    ('Stop_MRT_06', 'Blok M', -6.2444, 106.7981),
    ('Stop_LRT_01', 'Dukuh Atas LRT', -6.2046, 106.8222),
    ('Stop_LRT_02', 'Setiabudi LRT', -6.2090, 106.8300),
    ('Stop_LRT_03', 'Rasuna Said', -6.2200, 106.8320),
    ('Halte_01', 'Blok M TJ', -6.2430, 106.7990),
    ('Halte_02', 'Masjid Agung', -6.2360, 106.7980),
    ('Halte_03', 'Bundaran Senayan', -6.2270, 106.8000),
    ('Halte_04', 'Gelora Bung Karno', -6.2180, 106.8040),
    ('Halte_06', 'Karet', -6.2115, 106.8130),
    ('Halte_05', 'Dukuh Atas TJ', -6.2050, 106.8215),
    ('Halte_99', 'Pulau Terpencil', -6.1000, 106.9000);

INSERT INTO Routes VALUES
    ('Route_MRT_NS', 'MRT Lin Utara-Selatan'),
    ('Route_LRT_BKT', 'LRT Jabodebek');

INSERT INTO RouteStops VALUES
    ('Route_MRT_NS', 'Stop_MRT_01', 0),
    ('Route_MRT_NS', 'Stop_MRT_02', 1),
    ('Route_MRT_NS', 'Stop_MRT_03', 2),
    ('Route_MRT_NS', 'Stop_MRT_04', 3),
    ('Route_MRT_NS', 'Stop_MRT_05', 4),
    ('Route_MRT_NS', 'Stop_MRT_06', 5),
    ('Route_LRT_BKT', 'Stop_LRT_01', 0),
    ('Route_LRT_BKT', 'Stop_LRT_02', 1),
    ('Route_LRT_BKT', 'Stop_LRT_03', 2);

INSERT INTO Places VALUES
    ('Place_GBK', 'Gelora Bung Karno Stadium', -6.2186, 106.8020,
     'Region_Jakpus', 'Sports', 'Visit the stadium', 'Halte_04'),
    ('Place_Kuningan_City', 'Kuningan City', -6.2240, 106.8330,
     'Region_Jaksel', 'Shopping', 'Visit the mall', 'Stop_LRT_03'),
    ('Place_Isolated', 'Isolated Beach', -6.1005, 106.9005,
     NULL, NULL, NULL, 'Halte_99');

INSERT INTO Regions VALUES
    ('Region_Jaksel', 'Jakarta Selatan'),
    ('Region_Jakpus', 'Jakarta Pusat');
";

/// Temporary data directory holding `mobility.db`.
pub struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let connection =
            Connection::open(temp_dir.path().join("mobility.db")).expect("create fixture database");
        connection
            .execute_batch(FIXTURE_SQL)
            .expect("populate fixture database");
        Self { temp_dir }
    }

    /// Command pointed at the fixture with logging and colors turned off.
    pub fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("mobilitygraph-cli");
        cmd.env("RUST_LOG", "error")
            .env("NO_COLOR", "1")
            .env_remove("MOBILITYGRAPH_DATA_DIR")
            .arg("--data-dir")
            .arg(self.temp_dir.path());
        cmd
    }

    /// Run with `--format json` and parse stdout.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .arg("--format")
            .arg("json")
            .args(args)
            .output()
            .expect("run command");
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }
}
