//! Application state and the render coordinator.
//!
//! All filter mutation flows through the named transitions below; each
//! transition runs one full, synchronous `render()` before the next event
//! is processed. The viewport is refit (or reset) on every render, exactly
//! as the filter controls drive the map.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::config::{AppConfig, LayerConfig};
use crate::data::record::SiteRecord;
use crate::filter::bins::{self, Bucket, BucketId};
use crate::filter::options::{self, CategoricalField, DynamicFilter, FilterOption};
use crate::filter::{matches, FilterState, FilterVisibility};
use crate::locale::{labels, Lang};
use crate::map::basemap::Outline;
use crate::map::{MarkerLayer, Viewport};

/// Fractional padding applied when fitting the viewport to markers.
pub const FIT_PADDING: f64 = 0.2;

/// Zoom cap when fitting the viewport to markers.
pub const MAX_FIT_ZOOM: f64 = 12.0;

const QUERY_DEBOUNCE: Duration = Duration::from_millis(250);

/// A cancellable single-shot timer: re-arming replaces the pending
/// deadline, so only the latest trigger fires.
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once per armed deadline, when it has elapsed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Which pane receives keyboard input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Map,
    Filters,
}

/// One sidebar control.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Control {
    Categorical(CategoricalField),
    Trees,
    Area,
    Dynamic(usize),
    Query,
}

pub struct App {
    pub config: AppConfig,
    pub lang: Lang,
    pub records: Vec<SiteRecord>,
    pub visibility: FilterVisibility,
    pub filters: FilterState,
    pub categorical_options: [Vec<FilterOption>; 5],
    pub tree_buckets: Vec<Bucket>,
    pub area_buckets: Vec<Bucket>,
    pub dynamic: Vec<DynamicFilter>,
    pub layer: LayerConfig,
    pub basemap: Vec<Outline>,
    pub viewport: Viewport,
    pub markers: MarkerLayer,
    /// Indices of records passing the current filters, in record order.
    pub filtered: Vec<usize>,
    /// Selected record index (detail panel).
    pub selected: Option<usize>,
    pub focus: Focus,
    /// Focused control position within `controls()`.
    pub cursor: usize,
    /// Free-text input buffer; committed to the filter state when the
    /// debounce fires.
    pub query_input: String,
    pub query_debounce: Debounce,
    pub should_quit: bool,
    /// Last mouse position while dragging.
    pub last_mouse: Option<(u16, u16)>,
}

fn field_slot(field: CategoricalField) -> usize {
    CategoricalField::ALL
        .iter()
        .position(|f| *f == field)
        .unwrap_or(0)
}

impl App {
    pub fn new(
        config: AppConfig,
        records: Vec<SiteRecord>,
        basemap: Vec<Outline>,
        map_px_width: usize,
        map_px_height: usize,
    ) -> Self {
        let lang = config.language();
        let visibility = config.filter_visibility();
        let layer = config.current_layer();
        let viewport = Viewport::new(
            config.default_center_lon,
            config.default_center_lat,
            config.default_zoom as f64,
            map_px_width,
            map_px_height,
        )
        .with_zoom_bounds(layer.min_zoom as f64, layer.max_zoom as f64);

        let mut app = Self {
            config,
            lang,
            records,
            visibility,
            filters: FilterState::default(),
            categorical_options: std::array::from_fn(|_| Vec::new()),
            tree_buckets: Vec::new(),
            area_buckets: Vec::new(),
            dynamic: Vec::new(),
            layer,
            basemap,
            viewport,
            markers: MarkerLayer::default(),
            filtered: Vec::new(),
            selected: None,
            focus: Focus::Map,
            cursor: 0,
            query_input: String::new(),
            query_debounce: Debounce::new(QUERY_DEBOUNCE),
            should_quit: false,
            last_mouse: None,
        };
        app.rebuild_options();
        app.render();
        app
    }

    /// Derive option lists and bucket boundaries from the record set.
    /// Called once after load and again on language switch; selections are
    /// keyed by canonical values and bucket ids, so they survive.
    pub fn rebuild_options(&mut self) {
        let l = labels(self.lang);
        for field in CategoricalField::ALL {
            self.categorical_options[field_slot(field)] =
                options::categorical_options(&self.records, field, self.lang);
        }
        self.tree_buckets = bins::tree_buckets(&self.records, l);
        self.area_buckets = bins::area_buckets(&self.records, l);
        self.dynamic = options::dynamic_filters(&self.records, self.lang);
    }

    /// Recompute the filtered set, rebuild the marker layer, and fit or
    /// reset the viewport. Synchronous and idempotent.
    pub fn render(&mut self) {
        let filters = &self.filters;
        let visibility = &self.visibility;
        let filtered: Vec<usize> = self
            .records
            .par_iter()
            .enumerate()
            .filter(|(_, record)| matches(record, filters, visibility))
            .map(|(idx, _)| idx)
            .collect();

        self.markers.rebuild(&self.records, &filtered);
        if let Some(bounds) = self.markers.bounds() {
            self.viewport.fit_bounds(bounds, FIT_PADDING, MAX_FIT_ZOOM);
        } else {
            self.viewport.reset(
                self.config.default_center_lon,
                self.config.default_center_lat,
                self.config.default_zoom as f64,
            );
        }

        if let Some(site) = self.selected {
            if !filtered.contains(&site) {
                self.selected = None;
            }
        }
        self.filtered = filtered;
    }

    // ---- named filter transitions ----

    pub fn set_categorical(&mut self, field: CategoricalField, value: Option<String>) {
        self.filters.set_categorical(field, value);
        self.render();
    }

    pub fn set_tree_bucket(&mut self, bucket: Option<BucketId>) {
        self.filters.set_tree_bucket(bucket);
        self.render();
    }

    pub fn set_area_bucket(&mut self, bucket: Option<BucketId>) {
        self.filters.set_area_bucket(bucket);
        self.render();
    }

    pub fn set_dynamic(&mut self, key: &str, value: Option<String>) {
        self.filters.set_dynamic(key, value);
        self.render();
    }

    pub fn set_query(&mut self, query: String) {
        self.filters.set_query(query);
        self.render();
    }

    pub fn clear_all(&mut self) {
        self.filters.clear_all();
        self.query_input.clear();
        self.query_debounce.cancel();
        self.render();
    }

    // ---- free-text input (debounced) ----

    pub fn push_query_char(&mut self, c: char, now: Instant) {
        self.query_input.push(c);
        self.query_debounce.arm(now);
    }

    pub fn pop_query_char(&mut self, now: Instant) {
        self.query_input.pop();
        self.query_debounce.arm(now);
    }

    /// Called every poll tick; commits the input buffer when the debounce
    /// deadline has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.query_debounce.fire_due(now) {
            self.set_query(self.query_input.clone());
        }
    }

    // ---- sidebar controls ----

    /// Enabled controls in sidebar order.
    pub fn controls(&self) -> Vec<Control> {
        let mut list = Vec::new();
        for field in CategoricalField::ALL {
            if self.visibility.categorical(field) {
                list.push(Control::Categorical(field));
            }
        }
        if self.visibility.trees {
            list.push(Control::Trees);
        }
        if self.visibility.area {
            list.push(Control::Area);
        }
        for idx in 0..self.dynamic.len() {
            list.push(Control::Dynamic(idx));
        }
        list.push(Control::Query);
        list
    }

    pub fn focused_control(&self) -> Option<Control> {
        self.controls().get(self.cursor).copied()
    }

    pub fn move_cursor(&mut self, step: i32) {
        let len = self.controls().len() as i32;
        if len > 0 {
            self.cursor = (self.cursor as i32 + step).rem_euclid(len) as usize;
        }
    }

    pub fn categorical_options_for(&self, field: CategoricalField) -> &[FilterOption] {
        &self.categorical_options[field_slot(field)]
    }

    /// Step the focused control through placeholder and options.
    pub fn cycle_control(&mut self, control: Control, step: i32) {
        match control {
            Control::Categorical(field) => {
                let opts = self.categorical_options_for(field);
                let current = self
                    .filters
                    .categorical(field)
                    .and_then(|v| opts.iter().position(|o| o.value == v));
                let next = cycle(opts.len(), current, step);
                let value = next.map(|i| opts[i].value.clone());
                self.set_categorical(field, value);
            }
            Control::Trees => {
                let current = self
                    .filters
                    .tree_bucket()
                    .and_then(|id| self.tree_buckets.iter().position(|b| b.id == id));
                let next = cycle(self.tree_buckets.len(), current, step);
                let bucket = next.map(|i| self.tree_buckets[i].id);
                self.set_tree_bucket(bucket);
            }
            Control::Area => {
                let current = self
                    .filters
                    .area_bucket()
                    .and_then(|id| self.area_buckets.iter().position(|b| b.id == id));
                let next = cycle(self.area_buckets.len(), current, step);
                let bucket = next.map(|i| self.area_buckets[i].id);
                self.set_area_bucket(bucket);
            }
            Control::Dynamic(idx) => {
                let Some(filter) = self.dynamic.get(idx) else {
                    return;
                };
                let key = filter.key.clone();
                let current = self
                    .filters
                    .dynamic(&key)
                    .and_then(|v| filter.options.iter().position(|o| o.value == v));
                let next = cycle(filter.options.len(), current, step);
                let value = next.map(|i| filter.options[i].value.clone());
                self.set_dynamic(&key, value);
            }
            Control::Query => {}
        }
    }

    /// Unset the focused control (Delete key).
    pub fn clear_control(&mut self, control: Control) {
        match control {
            Control::Categorical(field) => self.set_categorical(field, None),
            Control::Trees => self.set_tree_bucket(None),
            Control::Area => self.set_area_bucket(None),
            Control::Dynamic(idx) => {
                if let Some(filter) = self.dynamic.get(idx) {
                    let key = filter.key.clone();
                    self.set_dynamic(&key, None);
                }
            }
            Control::Query => {
                self.query_input.clear();
                self.query_debounce.cancel();
                self.set_query(String::new());
            }
        }
    }

    // ---- language ----

    pub fn toggle_language(&mut self) {
        self.lang = self.lang.toggle();
        self.rebuild_options();
    }

    // ---- map interaction ----

    pub fn sync_map_size(&mut self, px_width: usize, px_height: usize) {
        self.viewport.width = px_width;
        self.viewport.height = px_height;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset(
            self.config.default_center_lon,
            self.config.default_center_lat,
            self.config.default_zoom as f64,
        );
    }

    /// Select the site nearest to a map pixel, if any is within reach.
    pub fn select_at(&mut self, px: i32, py: i32) {
        let (lon, lat) = self.viewport.unproject(px, py);
        self.selected = self.markers.site_near(lon, lat);
    }

    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ---- status helpers ----

    pub fn zoom_level(&self) -> String {
        format!("z{:.1}", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.2}°{}, {:.2}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" },
        )
    }
}

/// Step through `len + 1` positions (placeholder first), wrapping.
fn cycle(len: usize, current: Option<usize>, step: i32) -> Option<usize> {
    let total = len as i32 + 1;
    let position = current.map(|i| i as i32 + 1).unwrap_or(0);
    let next = (position + step).rem_euclid(total);
    if next == 0 {
        None
    } else {
        Some(next as usize - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::LocalizedText;

    fn config() -> AppConfig {
        serde_json::from_value(serde_json::json!({
            "show_filter_region": true,
            "show_filter_governorate": true,
            "show_filter_crop_type": true,
            "show_filter_water_source": true,
            "show_filter_irrigation_type": true,
        }))
        .expect("valid config")
    }

    fn site(region: &str, trees: Option<&str>, position: Option<(f64, f64)>) -> SiteRecord {
        SiteRecord {
            region: LocalizedText::new(region, None),
            number_of_trees: trees.map(str::to_string),
            position,
            ..SiteRecord::default()
        }
    }

    fn app_with(records: Vec<SiteRecord>) -> App {
        App::new(config(), records, Vec::new(), 200, 100)
    }

    #[test]
    fn test_initial_render_shows_all() {
        let app = app_with(vec![
            site("North", Some("10"), Some((45.0, 24.0))),
            site("South", Some("50"), None),
        ]);
        assert_eq!(app.filtered, vec![0, 1]);
        // positionless record contributes options but no marker
        assert_eq!(app.markers.len(), 1);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut app = app_with(vec![
            site("North", Some("10"), Some((45.0, 24.0))),
            site("South", Some("300"), Some((46.0, 25.0))),
        ]);
        app.set_categorical(CategoricalField::Region, Some("North".into()));
        let filtered = app.filtered.clone();
        let (lon, lat, zoom) =
            (app.viewport.center_lon, app.viewport.center_lat, app.viewport.zoom);
        app.render();
        assert_eq!(app.filtered, filtered);
        assert_eq!(app.viewport.center_lon, lon);
        assert_eq!(app.viewport.center_lat, lat);
        assert_eq!(app.viewport.zoom, zoom);
    }

    #[test]
    fn test_empty_result_resets_viewport() {
        let mut app = app_with(vec![site("North", None, Some((45.0, 24.0)))]);
        app.set_categorical(CategoricalField::Region, Some("Nowhere".into()));
        assert!(app.filtered.is_empty());
        assert_eq!(app.viewport.zoom, app.config.default_zoom as f64);
        assert!((app.viewport.center_lat - app.config.default_center_lat).abs() < 1e-9);
    }

    #[test]
    fn test_tree_scenario_sentinel_and_ranges() {
        let mut app = app_with(vec![
            site("", Some("10"), None),
            site("", Some("50"), None),
            site("", Some("300"), None),
            site("", Some("greenhouse"), None),
            site("", None, None),
        ]);
        // bins partition [10, 300] into five ranges plus the sentinel
        assert_eq!(app.tree_buckets.len(), 6);
        assert_eq!(app.tree_buckets[0].id, BucketId::Range { lo: 10, hi: 68 });

        app.set_tree_bucket(Some(BucketId::NonNumeric));
        assert_eq!(app.filtered, vec![3]);

        app.set_tree_bucket(Some(BucketId::Range { lo: 10, hi: 68 }));
        assert_eq!(app.filtered, vec![0, 1]);

        app.set_tree_bucket(None);
        assert_eq!(app.filtered.len(), 5);
    }

    #[test]
    fn test_area_without_numeric_data_has_no_buckets() {
        let app = app_with(vec![site("", None, None)]);
        assert!(app.area_buckets.is_empty());
        // no bucket can be selected, so the area filter stays inactive
        let ctl = app.controls();
        assert!(ctl.contains(&Control::Area));
    }

    #[test]
    fn test_clear_all_restores_everything() {
        let mut app = app_with(vec![
            site("North", Some("10"), Some((45.0, 24.0))),
            site("South", Some("greenhouse"), Some((46.0, 25.0))),
        ]);
        app.set_categorical(CategoricalField::Region, Some("North".into()));
        app.set_tree_bucket(Some(BucketId::NonNumeric));
        assert!(app.filtered.is_empty());
        app.clear_all();
        assert_eq!(app.filtered, vec![0, 1]);
        assert!(app.filters.is_unconstrained());
    }

    #[test]
    fn test_cycle_through_placeholder_and_options() {
        assert_eq!(cycle(2, None, 1), Some(0));
        assert_eq!(cycle(2, Some(0), 1), Some(1));
        assert_eq!(cycle(2, Some(1), 1), None);
        assert_eq!(cycle(2, None, -1), Some(1));
        assert_eq!(cycle(0, None, 1), None);
    }

    #[test]
    fn test_cycle_control_sets_selection() {
        let mut app = app_with(vec![
            site("North", None, None),
            site("South", None, None),
        ]);
        app.cycle_control(Control::Categorical(CategoricalField::Region), 1);
        // options sorted by label: North first
        assert_eq!(app.filters.categorical(CategoricalField::Region), Some("North"));
        assert_eq!(app.filtered, vec![0]);
        app.cycle_control(Control::Categorical(CategoricalField::Region), 1);
        assert_eq!(app.filtered, vec![1]);
        app.cycle_control(Control::Categorical(CategoricalField::Region), 1);
        assert_eq!(app.filtered, vec![0, 1]);
    }

    #[test]
    fn test_debounce_latest_keystroke_wins() {
        let mut d = Debounce::new(Duration::from_millis(250));
        let t0 = Instant::now();
        d.arm(t0);
        d.arm(t0 + Duration::from_millis(200));
        assert!(!d.fire_due(t0 + Duration::from_millis(300)));
        assert!(d.fire_due(t0 + Duration::from_millis(450)));
        // fires only once
        assert!(!d.fire_due(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_query_commits_on_tick() {
        let mut app = app_with(vec![
            SiteRecord {
                farmer_name: LocalizedText::new("Ali", None),
                ..SiteRecord::default()
            },
            SiteRecord {
                farmer_name: LocalizedText::new("Mariam", None),
                ..SiteRecord::default()
            },
        ]);
        let t0 = Instant::now();
        app.push_query_char('a', t0);
        app.push_query_char('l', t0 + Duration::from_millis(100));
        // nothing committed yet
        app.tick(t0 + Duration::from_millis(200));
        assert_eq!(app.filtered.len(), 2);
        app.tick(t0 + Duration::from_millis(400));
        assert_eq!(app.filtered, vec![0]);
    }

    #[test]
    fn test_language_toggle_preserves_selection() {
        let mut app = app_with(vec![site("North", Some("10"), None)]);
        app.set_categorical(CategoricalField::Region, Some("North".into()));
        app.toggle_language();
        assert_eq!(app.lang, Lang::Ar);
        assert_eq!(app.filters.categorical(CategoricalField::Region), Some("North"));
        assert_eq!(app.tree_buckets.len(), 1);
    }

    #[test]
    fn test_selection_dropped_when_filtered_out() {
        let mut app = app_with(vec![
            site("North", None, Some((45.0, 24.0))),
            site("South", None, Some((46.0, 25.0))),
        ]);
        app.selected = Some(1);
        app.set_categorical(CategoricalField::Region, Some("North".into()));
        assert_eq!(app.selected, None);
    }
}
