//! The marker layer: one marker per filtered record with a usable position.
//! Rebuilt wholesale on every render, never patched incrementally.

use crate::braille::BrailleCanvas;
use crate::data::record::SiteRecord;
use crate::map::geometry::{draw_disc, draw_ring};
use crate::map::projection::{GeoBounds, Viewport};
use crate::map::spatial::SpatialGrid;

/// Click hit radius in kilometers.
const HIT_RADIUS_KM: f64 = 30.0;

/// Zoom level from which site-code labels appear next to markers.
const LABEL_ZOOM: f64 = 9.0;

#[derive(Clone, Copy, Debug)]
pub struct Marker {
    pub lon: f64,
    pub lat: f64,
    /// Index into the full record set.
    pub site: usize,
}

#[derive(Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    grid: Option<SpatialGrid>,
}

impl MarkerLayer {
    /// Replace all markers with one per filtered record that has valid
    /// coordinates.
    pub fn rebuild(&mut self, records: &[SiteRecord], filtered: &[usize]) {
        self.markers.clear();
        for &site in filtered {
            if let Some((lon, lat)) = records[site].position {
                self.markers.push(Marker { lon, lat, site });
            }
        }
        self.grid = if self.markers.is_empty() {
            None
        } else {
            Some(SpatialGrid::build(
                self.markers.iter().map(|m| (m.lon, m.lat)),
                0.5,
            ))
        };
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Geographic bounding box of the current markers.
    pub fn bounds(&self) -> Option<GeoBounds> {
        let mut markers = self.markers.iter();
        let first = markers.next()?;
        let mut bounds = GeoBounds::point(first.lon, first.lat);
        for m in markers {
            bounds.extend(m.lon, m.lat);
        }
        Some(bounds)
    }

    /// Record index of the closest marker within the hit radius of a
    /// geographic position.
    pub fn site_near(&self, lon: f64, lat: f64) -> Option<usize> {
        let grid = self.grid.as_ref()?;
        grid.nearest(lon, lat, HIT_RADIUS_KM).map(|idx| self.markers[idx].site)
    }

    /// Draw markers; the selected site gets a ring drawn into `highlight`.
    /// Returns label positions (character cells) for visible site codes.
    pub fn draw(
        &self,
        canvas: &mut BrailleCanvas,
        highlight: &mut BrailleCanvas,
        viewport: &Viewport,
        records: &[SiteRecord],
        selected: Option<usize>,
    ) -> Vec<(u16, u16, String)> {
        let radius = if viewport.zoom > 10.0 {
            3
        } else if viewport.zoom > 6.0 {
            2
        } else {
            1
        };

        let mut labels = Vec::new();
        for marker in &self.markers {
            let (px, py) = viewport.project(marker.lon, marker.lat);
            if !viewport.is_visible(px, py) {
                continue;
            }
            draw_disc(canvas, px, py, radius);
            if selected == Some(marker.site) {
                draw_ring(highlight, px, py, radius + 2);
            }

            if viewport.zoom >= LABEL_ZOOM && px >= 0 && py >= 0 {
                if let Some(code) = records[marker.site].code {
                    let char_x = (px / 2) as u16;
                    let char_y = (py / 4) as u16;
                    if let Some(label_x) = char_x.checked_add(2) {
                        labels.push((label_x, char_y, code.to_string()));
                    }
                }
            }
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positioned(lon: f64, lat: f64) -> SiteRecord {
        SiteRecord { position: Some((lon, lat)), ..SiteRecord::default() }
    }

    #[test]
    fn test_rebuild_skips_positionless_records() {
        let records = vec![positioned(45.0, 24.0), SiteRecord::default(), positioned(46.0, 25.0)];
        let mut layer = MarkerLayer::default();
        layer.rebuild(&records, &[0, 1, 2]);
        assert_eq!(layer.len(), 2);
        layer.rebuild(&records, &[1]);
        assert!(layer.is_empty());
        assert!(layer.bounds().is_none());
    }

    #[test]
    fn test_bounds_cover_all_markers() {
        let records = vec![positioned(44.0, 23.0), positioned(46.0, 25.0)];
        let mut layer = MarkerLayer::default();
        layer.rebuild(&records, &[0, 1]);
        let bounds = layer.bounds().unwrap();
        assert_eq!(bounds.min_lon, 44.0);
        assert_eq!(bounds.max_lat, 25.0);
    }

    #[test]
    fn test_site_near_maps_back_to_record_index() {
        let records = vec![SiteRecord::default(), positioned(45.0, 24.0)];
        let mut layer = MarkerLayer::default();
        layer.rebuild(&records, &[0, 1]);
        assert_eq!(layer.site_near(45.001, 24.0), Some(1));
        assert_eq!(layer.site_near(10.0, 10.0), None);
    }
}
