//! Derivation of the selectable option lists from the loaded record set.
//!
//! Options are deduplicated by the canonical value (first occurrence wins)
//! and sorted by the label shown under the active language. Rebuilt only on
//! load and on language switch.

use std::collections::{HashMap, HashSet};

use crate::data::record::{LocalizedText, SiteRecord};
use crate::locale::{Labels, Lang};

/// One selectable value: canonical value plus its display label.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

/// The five fixed categorical filters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CategoricalField {
    Region,
    Governorate,
    CropType,
    WaterSource,
    Irrigation,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::Region,
        CategoricalField::Governorate,
        CategoricalField::CropType,
        CategoricalField::WaterSource,
        CategoricalField::Irrigation,
    ];

    pub fn text<'a>(&self, record: &'a SiteRecord) -> &'a LocalizedText {
        match self {
            CategoricalField::Region => &record.region,
            CategoricalField::Governorate => &record.governorate,
            CategoricalField::CropType => &record.crop_type,
            CategoricalField::WaterSource => &record.water_source,
            CategoricalField::Irrigation => &record.irrigation_system_type,
        }
    }

    pub fn heading(&self, labels: &Labels) -> &'static str {
        match self {
            CategoricalField::Region => labels.region,
            CategoricalField::Governorate => labels.governorate,
            CategoricalField::CropType => labels.crop,
            CategoricalField::WaterSource => labels.water,
            CategoricalField::Irrigation => labels.irrigation,
        }
    }
}

/// Distinct values of one categorical attribute across all records, sorted
/// by display label. Blank canonical values are skipped.
pub fn categorical_options(
    records: &[SiteRecord],
    field: CategoricalField,
    lang: Lang,
) -> Vec<FilterOption> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows: Vec<FilterOption> = Vec::new();
    for record in records {
        let text = field.text(record);
        let canonical = text.canonical();
        if canonical.is_empty() || !seen.insert(canonical) {
            continue;
        }
        rows.push(FilterOption {
            value: canonical.to_string(),
            label: text.display(lang).to_string(),
        });
    }
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    rows
}

/// One data-driven filter discovered from the records' extra attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicFilter {
    pub key: String,
    pub label: String,
    pub options: Vec<FilterOption>,
}

struct DynamicGroup {
    key: String,
    label_en: String,
    label_ar: Option<String>,
    /// canonical -> localized variant, first occurrence wins
    values: Vec<(String, Option<String>)>,
    seen: HashSet<String>,
}

/// Group filterable extra attributes by key (first-seen key order),
/// deduplicate values by canonical form, and sort each option list by its
/// display label.
pub fn dynamic_filters(records: &[SiteRecord], lang: Lang) -> Vec<DynamicFilter> {
    let mut groups: Vec<DynamicGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        for extra in &record.extras {
            if !extra.is_filterable || extra.value_en.is_empty() {
                continue;
            }
            let at = *index.entry(extra.key.clone()).or_insert_with(|| {
                groups.push(DynamicGroup {
                    key: extra.key.clone(),
                    label_en: extra.label_en.clone(),
                    label_ar: extra.label_ar.clone(),
                    values: Vec::new(),
                    seen: HashSet::new(),
                });
                groups.len() - 1
            });
            let group = &mut groups[at];
            if group.seen.insert(extra.value_en.clone()) {
                group.values.push((extra.value_en.clone(), extra.value_ar.clone()));
            }
        }
    }

    groups
        .into_iter()
        .map(|group| {
            let mut options: Vec<FilterOption> = group
                .values
                .into_iter()
                .map(|(en, ar)| {
                    let label = match (lang, &ar) {
                        (Lang::Ar, Some(ar)) if !ar.is_empty() => ar.clone(),
                        _ => en.clone(),
                    };
                    FilterOption { value: en, label }
                })
                .collect();
            options.sort_by(|a, b| a.label.cmp(&b.label));
            let label = match (lang, &group.label_ar) {
                (Lang::Ar, Some(ar)) if !ar.is_empty() => ar.clone(),
                _ => group.label_en.clone(),
            };
            DynamicFilter { key: group.key, label, options }
        })
        .collect()
}
