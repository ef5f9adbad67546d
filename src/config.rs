//! The configuration payload: chrome strings, map defaults, per-filter
//! visibility switches, and the tile layer list.
//!
//! Field names mirror the backend payload. Missing optional fields default;
//! the legacy categorical switches default to hidden when absent while the
//! trees/area switches default to shown.

use serde::Deserialize;

use crate::filter::FilterVisibility;
use crate::locale::Lang;

fn default_title() -> String {
    "Sites Map".to_string()
}

fn default_color() -> String {
    "#02466b".to_string()
}

fn default_center_lat() -> f64 {
    23.8859
}

fn default_center_lon() -> f64 {
    45.0792
}

fn default_zoom() -> u8 {
    6
}

fn default_max_zoom() -> u8 {
    19
}

fn default_language() -> String {
    "en".to_string()
}

fn on() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct LayerConfig {
    pub slug: String,
    pub name_en: String,
    #[serde(default)]
    pub name_ar: Option<String>,
    pub url_template: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub min_zoom: u8,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
    #[serde(default)]
    pub attribution: String,
    #[serde(default)]
    pub subdomains: String,
    #[serde(default = "on")]
    pub active: bool,
}

impl LayerConfig {
    pub fn name(&self, lang: Lang) -> &str {
        match (lang, &self.name_ar) {
            (Lang::Ar, Some(ar)) if !ar.is_empty() => ar,
            _ => &self.name_en,
        }
    }

    /// Built-in basemap used when the configured layers yield no current
    /// layer.
    pub fn osm_fallback() -> Self {
        Self {
            slug: "osm".to_string(),
            name_en: "OpenStreetMap".to_string(),
            name_ar: None,
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            is_default: true,
            min_zoom: 0,
            max_zoom: 19,
            attribution: "© OpenStreetMap contributors".to_string(),
            subdomains: "abc".to_string(),
            active: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_title")]
    pub title_en: String,
    #[serde(default)]
    pub title_ar: Option<String>,
    #[serde(default)]
    pub footer_text_en: String,
    #[serde(default)]
    pub footer_text_ar: Option<String>,
    #[serde(default = "default_color")]
    pub header_bg: String,
    #[serde(default = "default_color")]
    pub footer_bg: String,
    #[serde(default = "default_center_lat")]
    pub default_center_lat: f64,
    #[serde(default = "default_center_lon")]
    pub default_center_lon: f64,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    #[serde(default)]
    pub show_filter_region: bool,
    #[serde(default)]
    pub show_filter_governorate: bool,
    #[serde(default)]
    pub show_filter_crop_type: bool,
    #[serde(default)]
    pub show_filter_water_source: bool,
    #[serde(default)]
    pub show_filter_irrigation_type: bool,
    #[serde(default = "on")]
    pub show_filter_trees: bool,
    #[serde(default = "on")]
    pub show_filter_area: bool,
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

impl AppConfig {
    pub fn title(&self, lang: Lang) -> &str {
        match (lang, &self.title_ar) {
            (Lang::Ar, Some(ar)) if !ar.is_empty() => ar,
            _ => &self.title_en,
        }
    }

    /// Footer text for the given language with `{year}` substituted; falls
    /// back to the bare year when unconfigured.
    pub fn footer_text(&self, lang: Lang, year: i32) -> String {
        let text = match (lang, &self.footer_text_ar) {
            (Lang::Ar, Some(ar)) if !ar.is_empty() => ar.as_str(),
            _ => self.footer_text_en.as_str(),
        };
        if text.is_empty() {
            year.to_string()
        } else {
            text.replace("{year}", &year.to_string())
        }
    }

    pub fn language(&self) -> Lang {
        Lang::from_code(&self.default_language)
    }

    /// Per-filter enabled flags, decided here once and never re-derived
    /// from presentation state.
    pub fn filter_visibility(&self) -> FilterVisibility {
        FilterVisibility {
            region: self.show_filter_region,
            governorate: self.show_filter_governorate,
            crop_type: self.show_filter_crop_type,
            water_source: self.show_filter_water_source,
            irrigation: self.show_filter_irrigation_type,
            trees: self.show_filter_trees,
            area: self.show_filter_area,
        }
    }

    /// The layer shown at startup: the first active default layer, with the
    /// OSM fallback when no configured layer qualifies.
    pub fn current_layer(&self) -> LayerConfig {
        self.layers
            .iter()
            .filter(|l| l.active)
            .find(|l| l.is_default)
            .cloned()
            .unwrap_or_else(LayerConfig::osm_fallback)
    }
}

/// `#rrggbb` → RGB triple. Anything else yields `None` and the caller keeps
/// its default style.
pub fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
