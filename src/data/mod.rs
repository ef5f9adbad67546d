//! Boot-time payload loading.
//!
//! Two payloads are required before anything renders: the configuration and
//! the site feature collection. Either failing is fatal for the session.
//! The basemap outline file is optional background decoration and is
//! allowed to be missing or broken.

pub mod record;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{FeatureCollection, GeoJson, Geometry, Value};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::map::basemap::Outline;
use record::{record_from_feature, SiteRecord};

/// Parse the configuration payload.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let mut bytes = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: AppConfig = simd_json::serde::from_slice(&mut bytes)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!(layers = config.layers.len(), "configuration loaded");
    Ok(config)
}

/// Parse the site feature collection into records. Features without usable
/// point geometry are kept (they still feed the filter options) but carry no
/// position.
pub fn load_sites(path: &Path) -> Result<Vec<SiteRecord>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading sites {}", path.display()))?;
    let collection: FeatureCollection = simd_json::serde::from_slice(&mut bytes)
        .with_context(|| format!("parsing sites {}", path.display()))?;
    let records: Vec<SiteRecord> =
        collection.features.iter().map(record_from_feature).collect();
    info!(
        sites = records.len(),
        positioned = records.iter().filter(|r| r.position.is_some()).count(),
        "site records loaded"
    );
    Ok(records)
}

/// Load basemap outlines from an optional local GeoJSON file. A missing or
/// unreadable file degrades to an empty basemap with a warning.
pub fn load_basemap(path: Option<&Path>) -> Vec<Outline> {
    let Some(path) = path else {
        return Vec::new();
    };
    match try_load_basemap(path) {
        Ok(outlines) => {
            info!(outlines = outlines.len(), "basemap loaded");
            outlines
        }
        Err(err) => {
            warn!("skipping basemap {}: {err:#}", path.display());
            Vec::new()
        }
    }
}

fn try_load_basemap(path: &Path) -> Result<Vec<Outline>> {
    let mut bytes = fs::read(path)?;
    let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)?;
    let mut outlines = Vec::new();
    collect_lines(&geojson, &mut outlines);
    Ok(outlines)
}

/// Walk any GeoJSON root and pull out drawable line sequences.
fn collect_lines(geojson: &GeoJson, out: &mut Vec<Outline>) {
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(geometry) = &feature.geometry {
                    collect_geometry_lines(geometry, out);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                collect_geometry_lines(geometry, out);
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry_lines(geometry, out),
    }
}

fn collect_geometry_lines(geometry: &Geometry, out: &mut Vec<Outline>) {
    fn to_line(coords: &[Vec<f64>]) -> Outline {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    }
    match &geometry.value {
        Value::LineString(coords) => out.push(to_line(coords)),
        Value::MultiLineString(lines) => out.extend(lines.iter().map(|l| to_line(l))),
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                out.push(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    out.push(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry_lines(g, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_lines_from_mixed_geometry() {
        let geojson: GeoJson = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "LineString",
                 "coordinates": [[0.0, 0.0], [1.0, 1.0]]}, "properties": {}},
                {"type": "Feature", "geometry": {"type": "Polygon",
                 "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0]]]},
                 "properties": {}},
                {"type": "Feature", "geometry": null, "properties": {}}
            ]
        })
        .to_string()
        .parse()
        .expect("valid geojson");
        let mut out = Vec::new();
        collect_lines(&geojson, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], vec![(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(out[1].len(), 4);
    }

    #[test]
    fn test_missing_basemap_is_empty() {
        assert!(load_basemap(None).is_empty());
        assert!(load_basemap(Some(Path::new("/nonexistent/base.json"))).is_empty());
    }
}
