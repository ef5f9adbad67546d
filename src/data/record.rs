//! Site records extracted from the GeoJSON feature payload.

use crate::locale::Lang;
use geojson::{Feature, JsonObject, JsonValue, Value};

/// A text attribute with a canonical (English) form and an optional Arabic
/// variant. Equality, deduplication, and filtering always use the canonical
/// form; the variant is display-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalizedText {
    pub en: String,
    pub ar: Option<String>,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, ar: Option<String>) -> Self {
        Self { en: en.into(), ar }
    }

    /// The stored, non-localized form used for matching and grouping.
    pub fn canonical(&self) -> &str {
        &self.en
    }

    /// The form shown to the user under the given language.
    pub fn display(&self, lang: Lang) -> &str {
        match (lang, &self.ar) {
            (Lang::Ar, Some(ar)) if !ar.is_empty() => ar,
            _ => &self.en,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.en.is_empty()
    }
}

/// One schema-free `(key, value)` attribute attached to a record.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraAttribute {
    pub key: String,
    pub label_en: String,
    pub label_ar: Option<String>,
    pub value_en: String,
    pub value_ar: Option<String>,
    pub is_filterable: bool,
}

/// One site. Immutable once loaded.
#[derive(Clone, Debug, Default)]
pub struct SiteRecord {
    pub code: Option<u64>,
    /// Longitude/latitude; `None` keeps the record out of the marker layer
    /// but not out of filter option derivation.
    pub position: Option<(f64, f64)>,
    pub farmer_name: LocalizedText,
    pub region: LocalizedText,
    pub governorate: LocalizedText,
    pub crop_type: LocalizedText,
    pub water_source: LocalizedText,
    pub irrigation_system_type: LocalizedText,
    pub distribution_uniformity_pct: Option<String>,
    /// Raw value; numeric or free text ("One Greenhouse").
    pub number_of_trees: Option<String>,
    /// Raw value; expected numeric.
    pub area_m2: Option<String>,
    pub description: LocalizedText,
    pub images: Vec<String>,
    pub design_pdf: Option<String>,
    pub extras: Vec<ExtraAttribute>,
}

/// Raw property text: strings pass through, numbers are formatted, null and
/// missing become `None`.
fn raw_text(props: &JsonObject, key: &str) -> Option<String> {
    match props.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Trimmed property text with blanks collapsed to `None`.
fn trimmed_text(props: &JsonObject, key: &str) -> Option<String> {
    raw_text(props, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A canonical/localized pair; the Arabic variant follows `<key>_ar`.
fn localized(props: &JsonObject, key: &str) -> LocalizedText {
    LocalizedText {
        en: trimmed_text(props, key).unwrap_or_default(),
        ar: trimmed_text(props, &format!("{key}_ar")),
    }
}

fn extra_from_value(value: &JsonValue) -> Option<ExtraAttribute> {
    let obj = value.as_object()?;
    let key = obj.get("key")?.as_str()?.to_string();
    let text = |k: &str| {
        obj.get(k)
            .and_then(JsonValue::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    Some(ExtraAttribute {
        label_en: text("label_en").unwrap_or_else(|| key.clone()),
        label_ar: text("label_ar"),
        value_en: text("value_en").unwrap_or_default(),
        value_ar: text("value_ar"),
        is_filterable: obj
            .get("is_filterable")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false),
        key,
    })
}

/// Build a record from one feature. Total: any malformed piece degrades to
/// its empty/absent form rather than failing the load.
pub fn record_from_feature(feature: &Feature) -> SiteRecord {
    let empty = JsonObject::new();
    let props = feature.properties.as_ref().unwrap_or(&empty);

    let position = feature.geometry.as_ref().and_then(|g| match &g.value {
        Value::Point(coords) if coords.len() >= 2 => Some((coords[0], coords[1])),
        _ => None,
    });

    SiteRecord {
        code: props.get("code").and_then(JsonValue::as_u64),
        position,
        farmer_name: localized(props, "farmer_name"),
        region: localized(props, "region"),
        governorate: localized(props, "governorate"),
        crop_type: localized(props, "crop_type"),
        water_source: localized(props, "water_source"),
        irrigation_system_type: localized(props, "irrigation_system_type"),
        distribution_uniformity_pct: trimmed_text(props, "distribution_uniformity_pct"),
        number_of_trees: raw_text(props, "number_of_trees"),
        area_m2: raw_text(props, "area_m2"),
        description: localized(props, "description"),
        images: props
            .get("images")
            .and_then(JsonValue::as_array)
            .map(|imgs| {
                imgs.iter()
                    .filter_map(|i| i.get("image").and_then(JsonValue::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        design_pdf: trimmed_text(props, "design_pdf"),
        extras: props
            .get("extras")
            .and_then(JsonValue::as_array)
            .map(|evs| evs.iter().filter_map(extra_from_value).collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(value: serde_json::Value) -> Feature {
        serde_json::from_value(value).expect("valid feature")
    }

    #[test]
    fn test_extracts_core_fields() {
        let f = feature(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [45.1, 23.9]},
            "properties": {
                "code": 12,
                "farmer_name": " Ali ",
                "farmer_name_ar": "علي",
                "region": "North",
                "number_of_trees": "1,200",
                "area_m2": "350.25",
            }
        }));
        let r = record_from_feature(&f);
        assert_eq!(r.code, Some(12));
        assert_eq!(r.position, Some((45.1, 23.9)));
        assert_eq!(r.farmer_name.canonical(), "Ali");
        assert_eq!(r.farmer_name.display(Lang::Ar), "علي");
        assert_eq!(r.region.canonical(), "North");
        assert_eq!(r.number_of_trees.as_deref(), Some("1,200"));
        assert_eq!(r.area_m2.as_deref(), Some("350.25"));
    }

    #[test]
    fn test_numeric_property_normalizes_to_text() {
        let f = feature(json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
            "properties": {"number_of_trees": 300, "area_m2": 12.5}
        }));
        let r = record_from_feature(&f);
        assert_eq!(r.number_of_trees.as_deref(), Some("300"));
        assert_eq!(r.area_m2.as_deref(), Some("12.5"));
    }

    #[test]
    fn test_null_geometry_keeps_record() {
        let f = feature(json!({
            "type": "Feature",
            "geometry": null,
            "properties": {"region": "South"}
        }));
        let r = record_from_feature(&f);
        assert_eq!(r.position, None);
        assert_eq!(r.region.canonical(), "South");
    }

    #[test]
    fn test_blank_arabic_variant_falls_back() {
        let f = feature(json!({
            "type": "Feature",
            "geometry": null,
            "properties": {"region": "North", "region_ar": "  "}
        }));
        let r = record_from_feature(&f);
        assert_eq!(r.region.display(Lang::Ar), "North");
    }

    #[test]
    fn test_extras_and_media() {
        let f = feature(json!({
            "type": "Feature",
            "geometry": null,
            "properties": {
                "images": [{"image": "a.jpg", "sort_order": 0}, {"image": "b.jpg"}],
                "design_pdf": "plan.pdf",
                "extras": [
                    {"key": "soil_type", "label_en": "Soil", "value_en": "clay",
                     "value_ar": "طيني", "is_filterable": true},
                    {"key": "notes", "value_en": "x"}
                ]
            }
        }));
        let r = record_from_feature(&f);
        assert_eq!(r.images, vec!["a.jpg", "b.jpg"]);
        assert_eq!(r.design_pdf.as_deref(), Some("plan.pdf"));
        assert_eq!(r.extras.len(), 2);
        assert!(r.extras[0].is_filterable);
        assert_eq!(r.extras[1].label_en, "notes");
        assert!(!r.extras[1].is_filterable);
    }
}
