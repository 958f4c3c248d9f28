use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use strsim::jaro_winkler;
use tracing::{debug, info, warn};

use crate::distance::Coordinates;
use crate::error::{Error, Result};
use crate::mode::{Mode, ModeFilter};

/// Normalized stop identifier (namespace stripped).
pub type StopId = String;

/// Minimum Jaro-Winkler similarity for a stop to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Physical boarding point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    #[serde(flatten)]
    pub position: Coordinates,
    pub mode: Mode,
}

impl Stop {
    /// Build a stop, normalizing the id and deriving its mode from it.
    pub fn new(id: &str, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        let id = normalize_id(id).to_string();
        let mode = Mode::from_stop_id(&id);
        Self {
            id,
            name: name.into(),
            position: Coordinates::new(lat, lon),
            mode,
        }
    }
}

/// Ordered stop sequence of a fixed route (MRT or LRT line).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDefinition {
    pub id: String,
    pub name: String,
    pub stop_ids: Vec<StopId>,
}

/// Tourist destination that routes can target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceOfInterest {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub position: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit binding to a nearby stop, when the dataset declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_stop_id: Option<StopId>,
}

/// Administrative area; metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: String,
    pub name: String,
}

/// Entity counts reported by [`EntityStore::summary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub total_stops: usize,
    pub mrt_stops: usize,
    pub lrt_stops: usize,
    pub tj_stops: usize,
    pub total_routes: usize,
    pub total_places: usize,
    pub total_regions: usize,
    pub places_by_category: BTreeMap<String, usize>,
}

/// Read-only snapshot of every entity loaded from the dataset.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    stops: Vec<Stop>,
    stop_index: HashMap<StopId, usize>,
    routes: Vec<RouteDefinition>,
    places: Vec<PlaceOfInterest>,
    regions: Vec<Region>,
}

impl EntityStore {
    /// Assemble a store from already-typed records.
    ///
    /// Identifiers are normalized and duplicate stop ids are dropped (the first
    /// occurrence wins), so every stop id in the store is unique.
    pub fn new(
        stops: Vec<Stop>,
        routes: Vec<RouteDefinition>,
        places: Vec<PlaceOfInterest>,
        regions: Vec<Region>,
    ) -> Self {
        let mut unique = Vec::with_capacity(stops.len());
        let mut stop_index = HashMap::with_capacity(stops.len());
        let mut duplicates = 0usize;
        for mut stop in stops {
            stop.id = normalize_id(&stop.id).to_string();
            stop.mode = Mode::from_stop_id(&stop.id);
            if stop_index.contains_key(&stop.id) {
                duplicates += 1;
                continue;
            }
            stop_index.insert(stop.id.clone(), unique.len());
            unique.push(stop);
        }
        if duplicates > 0 {
            warn!(duplicates, "ignored stops with duplicate identifiers");
        }

        let routes = routes
            .into_iter()
            .map(|route| RouteDefinition {
                id: normalize_id(&route.id).to_string(),
                name: route.name,
                stop_ids: route
                    .stop_ids
                    .iter()
                    .map(|id| normalize_id(id).to_string())
                    .collect(),
            })
            .collect();

        let places = places
            .into_iter()
            .map(|place| PlaceOfInterest {
                id: normalize_id(&place.id).to_string(),
                nearest_stop_id: place
                    .nearest_stop_id
                    .as_deref()
                    .map(|id| normalize_id(id).to_string()),
                ..place
            })
            .collect();

        let regions = regions
            .into_iter()
            .map(|region| Region {
                id: normalize_id(&region.id).to_string(),
                name: region.name,
            })
            .collect();

        Self {
            stops: unique,
            stop_index,
            routes,
            places,
            regions,
        }
    }

    /// All stops in dataset order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Stops passing `filter`, in dataset order.
    pub fn list_stops(&self, filter: ModeFilter) -> Vec<&Stop> {
        self.stops
            .iter()
            .filter(|stop| filter.allows(stop.mode))
            .collect()
    }

    /// Lookup a stop by normalized identifier.
    pub fn stop(&self, id: &str) -> Option<&Stop> {
        self.stop_index
            .get(normalize_id(id))
            .map(|&index| &self.stops[index])
    }

    pub fn list_routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn list_places_of_interest(&self) -> &[PlaceOfInterest] {
        &self.places
    }

    pub fn place(&self, id: &str) -> Option<&PlaceOfInterest> {
        let id = normalize_id(id);
        self.places.iter().find(|place| place.id == id)
    }

    pub fn list_regions(&self) -> &[Region] {
        &self.regions
    }

    /// Places in `region` (exact match) whose name contains `query`, ignoring case.
    pub fn search_places(
        &self,
        region: Option<&str>,
        query: Option<&str>,
    ) -> Vec<&PlaceOfInterest> {
        let query = query.map(str::to_lowercase);
        self.places
            .iter()
            .filter(|place| match region {
                Some(region) => place.region.as_deref() == Some(region),
                None => true,
            })
            .filter(|place| match &query {
                Some(query) => place.name.to_lowercase().contains(query.as_str()),
                None => true,
            })
            .collect()
    }

    /// Counts by mode and category.
    pub fn summary(&self) -> EntitySummary {
        let count = |mode: Mode| self.stops.iter().filter(|stop| stop.mode == mode).count();
        let mut places_by_category = BTreeMap::new();
        for place in &self.places {
            let category = place.category.clone().unwrap_or_else(|| "Uncategorized".to_string());
            *places_by_category.entry(category).or_insert(0) += 1;
        }

        EntitySummary {
            total_stops: self.stops.len(),
            mrt_stops: count(Mode::Mrt),
            lrt_stops: count(Mode::Lrt),
            tj_stops: count(Mode::TransJakarta),
            total_routes: self.routes.len(),
            total_places: self.places.len(),
            total_regions: self.regions.len(),
            places_by_category,
        }
    }

    /// Resolve a stop by exact id, then by case-insensitive name.
    pub fn resolve_stop(&self, query: &str) -> Result<&Stop> {
        if let Some(stop) = self.stop(query) {
            return Ok(stop);
        }
        let lowered = query.trim().to_lowercase();
        self.stops
            .iter()
            .find(|stop| stop.name.to_lowercase() == lowered)
            .ok_or_else(|| Error::UnknownStop {
                name: query.to_string(),
                suggestions: self.fuzzy_stop_matches(query, 3),
            })
    }

    /// Stop names most similar to `query`, best first.
    pub fn fuzzy_stop_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let lowered = query.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .stops
            .iter()
            .map(|stop| {
                let by_name = jaro_winkler(&lowered, &stop.name.to_lowercase());
                let by_id = jaro_winkler(&lowered, &stop.id.to_lowercase());
                (by_name.max(by_id), stop.name.as_str())
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        let mut names: Vec<String> = Vec::new();
        for (_, name) in scored {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
            if names.len() == limit {
                break;
            }
        }
        names
    }
}

/// Strip any namespace from an identifier, keeping the final fragment.
///
/// Text after the last `#` wins; otherwise the text after the last `/`;
/// otherwise the text after a `prefix:` separator.
pub fn normalize_id(raw: &str) -> &str {
    let raw = raw.trim();
    if let Some((_, fragment)) = raw.rsplit_once('#') {
        return fragment;
    }
    if let Some((_, segment)) = raw.rsplit_once('/') {
        return segment;
    }
    if let Some((_, local)) = raw.rsplit_once(':') {
        return local;
    }
    raw
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaVariant {
    Tabular,
    Triples,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SchemaVariant::Tabular => "tabular",
            SchemaVariant::Triples => "triples",
        };
        f.write_str(value)
    }
}

/// Typed records pulled out of either schema variant.
#[derive(Debug, Default)]
struct EntityRecords {
    stops: Vec<Stop>,
    routes: Vec<RouteDefinition>,
    places: Vec<PlaceOfInterest>,
    regions: Vec<Region>,
    skipped: usize,
}

/// Load every entity from a dataset into memory.
///
/// The loader detects which layout the file uses: the tabular
/// `Stops`/`Routes`/`RouteStops`/`Places`/`Regions` tables or a single
/// `Triples(subject, predicate, object)` table of semantic statements.
/// Records missing a name or coordinates are skipped and counted; anything
/// that prevents reading the file at all is returned as an error, since a
/// partially loaded network is not usable.
pub fn load_entity_store(db_path: &Path) -> Result<EntityStore> {
    if !db_path.exists() {
        return Err(Error::DatasetNotFound {
            path: db_path.to_path_buf(),
        });
    }

    let connection = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let schema = detect_schema(&connection)?;
    debug!(schema = %schema, path = %db_path.display(), "loading entity store");

    let records = match schema {
        SchemaVariant::Tabular => load_tabular(&connection)?,
        SchemaVariant::Triples => load_triples(&connection)?,
    };

    if records.skipped > 0 {
        warn!(
            skipped = records.skipped,
            "ignored records missing a name or coordinates"
        );
    }

    let store = EntityStore::new(records.stops, records.routes, records.places, records.regions);
    info!(
        stops = store.stops.len(),
        routes = store.routes.len(),
        places = store.places.len(),
        regions = store.regions.len(),
        "entity store loaded"
    );
    Ok(store)
}

fn detect_schema(connection: &Connection) -> Result<SchemaVariant> {
    if table_exists(connection, "Stops")?
        && table_has_columns(connection, "Stops", &["stopId", "name", "lat", "long"])?
    {
        return Ok(SchemaVariant::Tabular);
    }
    if table_exists(connection, "Triples")?
        && table_has_columns(connection, "Triples", &["subject", "predicate", "object"])?
    {
        return Ok(SchemaVariant::Triples);
    }

    Err(Error::UnsupportedSchema)
}

fn load_tabular(connection: &Connection) -> Result<EntityRecords> {
    let mut records = EntityRecords::default();

    let mut stmt =
        connection.prepare("SELECT stopId, name, lat, long FROM Stops ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<f64>>(2)?,
            row.get::<_, Option<f64>>(3)?,
        ))
    })?;
    for row in rows {
        match row? {
            (id, Some(name), Some(lat), Some(lon)) => {
                records.stops.push(Stop::new(&id, name, lat, lon))
            }
            _ => records.skipped += 1,
        }
    }

    records.routes = load_tabular_routes(connection)?;
    records.places = load_tabular_places(connection, &mut records.skipped)?;

    if table_exists(connection, "Regions")?
        && table_has_columns(connection, "Regions", &["regionId", "name"])?
    {
        let mut stmt = connection.prepare("SELECT regionId, name FROM Regions ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok(Region {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        for row in rows {
            records.regions.push(row?);
        }
    }

    Ok(records)
}

fn load_tabular_routes(connection: &Connection) -> Result<Vec<RouteDefinition>> {
    if !table_exists(connection, "Routes")?
        || !table_exists(connection, "RouteStops")?
        || !table_has_columns(connection, "RouteStops", &["routeId", "stopId", "seq"])?
    {
        return Ok(Vec::new());
    }

    let mut routes = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut stmt = connection.prepare("SELECT routeId, name FROM Routes ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
    })?;
    for row in rows {
        let (id, name) = row?;
        by_id.insert(id.clone(), routes.len());
        routes.push(RouteDefinition {
            name: name.unwrap_or_else(|| normalize_id(&id).to_string()),
            id,
            stop_ids: Vec::new(),
        });
    }

    let mut stmt =
        connection.prepare("SELECT routeId, stopId FROM RouteStops ORDER BY routeId, seq, rowid")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    let mut orphaned = 0usize;
    for row in rows {
        let (route_id, stop_id) = row?;
        match by_id.get(&route_id) {
            Some(&index) => routes[index].stop_ids.push(stop_id),
            None => orphaned += 1,
        }
    }
    if orphaned > 0 {
        warn!(orphaned, "ignored route stops referencing unknown routes");
    }

    Ok(routes)
}

fn load_tabular_places(connection: &Connection, skipped: &mut usize) -> Result<Vec<PlaceOfInterest>> {
    if !table_exists(connection, "Places")?
        || !table_has_columns(connection, "Places", &["placeId", "name", "lat", "long"])?
    {
        return Ok(Vec::new());
    }

    let mut selects = vec![
        "placeId".to_string(),
        "name".to_string(),
        "lat".to_string(),
        "long".to_string(),
    ];
    for column in ["region", "category", "description", "nearStop"] {
        if table_has_columns(connection, "Places", &[column])? {
            selects.push(column.to_string());
        } else {
            selects.push(format!("NULL AS {column}"));
        }
    }
    let sql = format!(
        "SELECT {selects} FROM Places ORDER BY rowid",
        selects = selects.join(", ")
    );

    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<f64>>(2)?,
            row.get::<_, Option<f64>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<String>>(7)?,
        ))
    })?;

    let mut places = Vec::new();
    for row in rows {
        let (id, name, lat, lon, region, category, description, near_stop) = row?;
        let (Some(name), Some(lat), Some(lon)) = (name, lat, lon) else {
            *skipped += 1;
            continue;
        };
        places.push(PlaceOfInterest {
            id,
            name,
            position: Coordinates::new(lat, lon),
            region,
            category,
            description,
            nearest_stop_id: near_stop,
        });
    }
    Ok(places)
}

/// Statements grouped by subject, in first-seen order.
#[derive(Debug)]
struct SubjectRecord {
    subject: String,
    classes: Vec<String>,
    properties: Vec<(String, String)>,
}

impl SubjectRecord {
    fn is_a(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn first(&self, property: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    fn all<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.properties
            .iter()
            .filter(move |(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.first("lat").and_then(parse_number)?;
        let lon = self.first("long").and_then(parse_number)?;
        Some(Coordinates::new(lat, lon))
    }
}

fn load_triples(connection: &Connection) -> Result<EntityRecords> {
    let mut stmt =
        connection.prepare("SELECT subject, predicate, object FROM Triples ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut subjects: Vec<SubjectRecord> = Vec::new();
    let mut by_subject: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let (subject, predicate, object) = row?;
        let index = match by_subject.get(&subject) {
            Some(&index) => index,
            None => {
                by_subject.insert(subject.clone(), subjects.len());
                subjects.push(SubjectRecord {
                    subject,
                    classes: Vec::new(),
                    properties: Vec::new(),
                });
                subjects.len() - 1
            }
        };

        let record = &mut subjects[index];
        let property = normalize_id(&predicate);
        if property == "type" {
            record.classes.push(normalize_id(&object).to_string());
        } else {
            record
                .properties
                .push((property.to_string(), literal_text(&object).to_string()));
        }
    }

    let mut records = EntityRecords::default();
    for record in &subjects {
        let name = record.first("name").map(str::to_string);
        if record.is_a("StopPoint") {
            match (name, record.coordinates()) {
                (Some(name), Some(position)) => records.stops.push(Stop::new(
                    &record.subject,
                    name,
                    position.lat,
                    position.lon,
                )),
                _ => records.skipped += 1,
            }
        } else if record.is_a("Route") {
            records.routes.push(RouteDefinition {
                id: record.subject.clone(),
                name: name.unwrap_or_else(|| normalize_id(&record.subject).to_string()),
                stop_ids: record.all("stopAt").map(str::to_string).collect(),
            });
        } else if record.is_a("PlaceOfInterest") {
            match (name, record.coordinates()) {
                (Some(name), Some(position)) => records.places.push(PlaceOfInterest {
                    id: record.subject.clone(),
                    name,
                    position,
                    region: record.first("region").map(|r| normalize_id(r).to_string()),
                    category: record.first("category").map(str::to_string),
                    description: record.first("description").map(str::to_string),
                    nearest_stop_id: record.first("nearStop").map(str::to_string),
                }),
                _ => records.skipped += 1,
            }
        } else if record.is_a("Region") {
            records.regions.push(Region {
                id: record.subject.clone(),
                name: name.unwrap_or_else(|| normalize_id(&record.subject).to_string()),
            });
        }
    }

    Ok(records)
}

/// Strip quoting and a `^^datatype` / `@lang` suffix from a literal.
fn literal_text(raw: &str) -> &str {
    let raw = raw.trim();
    let Some(rest) = raw.strip_prefix('"') else {
        return raw;
    };
    match rest.rfind('"') {
        Some(end) => &rest[..end],
        None => rest,
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_keeps_final_component() {
        assert_eq!(normalize_id("http://example.com/tr#Stop_MRT_01"), "Stop_MRT_01");
        assert_eq!(normalize_id("http://example.org/stops/Halte_Monas"), "Halte_Monas");
        assert_eq!(normalize_id("tr:Stop_LRT_02"), "Stop_LRT_02");
        assert_eq!(normalize_id(" Stop_TJ_9 "), "Stop_TJ_9");
    }

    #[test]
    fn literal_text_strips_datatype_and_quotes() {
        assert_eq!(literal_text("\"-6.2\"^^xsd:decimal"), "-6.2");
        assert_eq!(literal_text("\"Monas\"@id"), "Monas");
        assert_eq!(literal_text("106.8"), "106.8");
    }

    #[test]
    fn duplicate_stop_ids_keep_first() {
        let store = EntityStore::new(
            vec![
                Stop::new("tr#Stop_MRT_01", "Lebak Bulus", -6.28, 106.77),
                Stop::new("Stop_MRT_01", "Duplicate", 0.0, 0.0),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(store.stops().len(), 1);
        assert_eq!(store.stop("Stop_MRT_01").unwrap().name, "Lebak Bulus");
    }

    #[test]
    fn list_stops_filters_by_mode() {
        let store = EntityStore::new(
            vec![
                Stop::new("Stop_MRT_01", "Lebak Bulus", -6.28, 106.77),
                Stop::new("Stop_LRT_01", "Dukuh Atas LRT", -6.20, 106.82),
                Stop::new("Halte_01", "Blok M", -6.24, 106.80),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let lrt = store.list_stops(ModeFilter::Only(Mode::Lrt));
        assert_eq!(lrt.len(), 1);
        assert_eq!(lrt[0].id, "Stop_LRT_01");
        assert_eq!(store.list_stops(ModeFilter::All).len(), 3);

        let summary = store.summary();
        assert_eq!((summary.mrt_stops, summary.lrt_stops, summary.tj_stops), (1, 1, 1));
    }

    #[test]
    fn resolve_stop_suggests_close_names() {
        let store = EntityStore::new(
            vec![Stop::new("Stop_MRT_06", "Blok M BCA", -6.24, 106.80)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(store.resolve_stop("blok m bca").unwrap().id, "Stop_MRT_06");
        let err = store.resolve_stop("Blok M BCX").unwrap_err();
        assert!(err.to_string().contains("Did you mean 'Blok M BCA'"));
    }
}
