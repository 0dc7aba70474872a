pub mod feed;

use crate::map::{Country, Ring};
use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, JsonObject, Value};
use glam::DVec2;
use std::fs;
use std::path::Path;

/// Property names tried, in order, for a country's display name
const NAME_PROPERTIES: [&str; 4] = ["name", "NAME", "ADMIN", "name_long"];

/// Load country polygons from a GeoJSON file
pub fn load_countries(path: &Path) -> Result<Vec<Country>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)
        .with_context(|| format!("parsing GeoJSON {}", path.display()))?;
    let countries = countries_from_geojson(geojson);
    tracing::info!(path = %path.display(), countries = countries.len(), "loaded map geometry");
    Ok(countries)
}

/// Every named Polygon/MultiPolygon feature becomes a country
pub fn countries_from_geojson(geojson: GeoJson) -> Vec<Country> {
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            tracing::warn!("geometry file has no features, nothing to name");
            return Vec::new();
        }
    };

    let mut countries = Vec::with_capacity(features.len());
    for feature in features {
        let Some(name) = feature.properties.as_ref().and_then(feature_name) else {
            tracing::warn!("skipping geometry feature without a name");
            continue;
        };
        let rings = feature.geometry.as_ref().map(polygon_rings).unwrap_or_default();
        match Country::new(name.clone(), rings) {
            Some(country) => countries.push(country),
            None => tracing::warn!(name = %name, "skipping geometry feature without area"),
        }
    }
    countries
}

fn feature_name(props: &JsonObject) -> Option<String> {
    NAME_PROPERTIES
        .iter()
        .find_map(|key| props.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// All rings (exteriors and holes) of polygonal geometry
fn polygon_rings(geometry: &Geometry) -> Vec<Ring> {
    let to_ring = |coords: &Vec<Vec<f64>>| -> Ring {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| DVec2::new(c[0], c[1]))
            .collect()
    };

    match &geometry.value {
        Value::Polygon(rings) => rings.iter().map(to_ring).collect(),
        Value::MultiPolygon(polygons) => polygons.iter().flatten().map(to_ring).collect(),
        Value::GeometryCollection(geometries) => geometries.iter().flat_map(polygon_rings).collect(),
        _ => Vec::new(),
    }
}
