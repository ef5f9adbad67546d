use std::collections::HashMap;

/// Spatial hash grid over geographic points for O(1)-ish neighborhood
/// queries. Used for marker hit-testing on mouse clicks.
pub struct SpatialGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    points: Vec<(f64, f64)>,
    /// Cell size in degrees.
    cell_size: f64,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self { cells: HashMap::new(), points: Vec::new(), cell_size }
    }

    /// Build a grid from an ordered point sequence; indices into that
    /// sequence are what queries return.
    pub fn build(points: impl IntoIterator<Item = (f64, f64)>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (lon, lat) in points {
            grid.insert(lon, lat);
        }
        grid
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        (
            (lon / self.cell_size).floor() as i32,
            (lat / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, lon: f64, lat: f64) {
        let idx = self.points.len();
        self.points.push((lon, lat));
        let cell = self.to_cell(lon, lat);
        self.cells.entry(cell).or_default().push(idx);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the closest point within `radius_km` of the given position,
    /// if any. Checks only the grid cells the radius can reach.
    pub fn nearest(&self, lon: f64, lat: f64, radius_km: f64) -> Option<usize> {
        let cell_radius = ((radius_km / 111.0) / self.cell_size).ceil() as i32;
        let center = self.to_cell(lon, lat);

        let mut best: Option<(usize, f64)> = None;
        for dy in -cell_radius..=cell_radius {
            for dx in -cell_radius..=cell_radius {
                let Some(indices) = self.cells.get(&(center.0 + dx, center.1 + dy)) else {
                    continue;
                };
                for &idx in indices {
                    let (plon, plat) = self.points[idx];
                    let dist = fast_distance_km(lon, lat, plon, plat);
                    if dist <= radius_km && best.map_or(true, |(_, d)| dist < d) {
                        best = Some((idx, dist));
                    }
                }
            }
        }
        best.map(|(idx, _)| idx)
    }
}

/// Fast equirectangular distance approximation in kilometers. Good for the
/// short distances hit-testing cares about; avoids the full haversine.
#[inline(always)]
pub fn fast_distance_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    const R: f64 = 6371.0;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let cos_lat = ((lat1 + lat2) * 0.5).to_radians().cos();
    let dx = dlon * cos_lat;
    R * (dx * dx + dlat * dlat).sqrt()
}
