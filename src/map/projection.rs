use std::f64::consts::PI;

/// Pixels spanned by the whole world at zoom 0 (standard Web Mercator tile).
const WORLD_TILE: f64 = 256.0;

/// Latitude limit of the Web Mercator projection.
const LAT_LIMIT: f64 = 85.0;

/// Geographic bounding box (degrees).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    pub fn point(lon: f64, lat: f64) -> Self {
        Self { min_lon: lon, min_lat: lat, max_lon: lon, max_lat: lat }
    }

    pub fn extend(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    /// Grow each side by `ratio` of the current extent.
    pub fn pad(&self, ratio: f64) -> Self {
        let dlon = (self.max_lon - self.min_lon) * ratio;
        let dlat = (self.max_lat - self.min_lat) * ratio;
        Self {
            min_lon: self.min_lon - dlon,
            min_lat: (self.min_lat - dlat).max(-LAT_LIMIT),
            max_lon: self.max_lon + dlon,
            max_lat: (self.max_lat + dlat).min(LAT_LIMIT),
        }
    }
}

/// The visible map area: center, zoom level (Leaflet-style, world fits in
/// 256px at zoom 0), canvas pixel size, and the zoom bounds of the current
/// basemap layer.
#[derive(Clone, Debug)]
pub struct Viewport {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
    pub width: usize,
    pub height: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

/// Mercator-normalized x in [0, 1].
fn norm_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Mercator-normalized y in [0, 1].
fn norm_y(lat: f64) -> f64 {
    let lat = lat.clamp(-LAT_LIMIT, LAT_LIMIT).to_radians();
    (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0
}

fn lon_of(x: f64) -> f64 {
    x * 360.0 - 180.0
}

fn lat_of(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

fn wrap_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
            min_zoom: 0.0,
            max_zoom: 19.0,
        }
    }

    /// Restrict zooming to the given layer bounds, clamping the current
    /// level into them.
    pub fn with_zoom_bounds(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
        self
    }

    /// Pixels spanned by the whole world at the current zoom.
    fn world_px(&self) -> f64 {
        WORLD_TILE * self.zoom.exp2()
    }

    /// Project geographic coordinates to canvas pixels.
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let scale = self.world_px();
        let px = (norm_x(lon) - norm_x(self.center_lon)) * scale + self.width as f64 / 2.0;
        let py = (norm_y(lat) - norm_y(self.center_lat)) * scale + self.height as f64 / 2.0;
        (px.round() as i32, py.round() as i32)
    }

    /// Canvas pixels back to geographic coordinates.
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.world_px();
        let x = (px as f64 - self.width as f64 / 2.0) / scale + norm_x(self.center_lon);
        let y = (py as f64 - self.height as f64 / 2.0) / scale + norm_y(self.center_lat);
        (lon_of(x), lat_of(y))
    }

    /// Pan the viewport by a pixel delta.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.world_px();
        let x = norm_x(self.center_lon) + dx as f64 / scale;
        let y = norm_y(self.center_lat) + dy as f64 / scale;
        self.center_lon = wrap_lon(lon_of(x));
        self.center_lat = lat_of(y).clamp(-LAT_LIMIT, LAT_LIMIT);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + 0.5);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - 0.5);
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom towards a pixel position, keeping the geography under it fixed.
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 0.5);
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -0.5);
    }

    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.set_zoom(self.zoom + delta);
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Fit the viewport to a bounding box with fractional padding and a
    /// fit-zoom cap, then clamp into the layer zoom bounds.
    pub fn fit_bounds(&mut self, bounds: GeoBounds, padding: f64, max_fit_zoom: f64) {
        let padded = bounds.pad(padding);
        let span_x = norm_x(padded.max_lon) - norm_x(padded.min_lon);
        // normalized y grows southward
        let span_y = norm_y(padded.min_lat) - norm_y(padded.max_lat);

        let zoom_for = |span: f64, px: usize| {
            if span > 0.0 {
                (px as f64 / (span * WORLD_TILE)).log2()
            } else {
                max_fit_zoom
            }
        };
        let zoom = zoom_for(span_x, self.width)
            .min(zoom_for(span_y, self.height))
            .min(max_fit_zoom);
        self.set_zoom(zoom);

        let cx = (norm_x(padded.min_lon) + norm_x(padded.max_lon)) / 2.0;
        let cy = (norm_y(padded.min_lat) + norm_y(padded.max_lat)) / 2.0;
        self.center_lon = wrap_lon(lon_of(cx));
        self.center_lat = lat_of(cy).clamp(-LAT_LIMIT, LAT_LIMIT);
    }

    /// Back to the configured default view.
    pub fn reset(&mut self, center_lon: f64, center_lat: f64, zoom: f64) {
        self.center_lon = center_lon;
        self.center_lat = center_lat;
        self.set_zoom(zoom);
    }

    /// Check if a projected point is visible (with a small margin so
    /// markers straddling the edge still draw).
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Rough bounding-box visibility test for a line segment.
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);
        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}
