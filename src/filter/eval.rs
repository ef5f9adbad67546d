//! Per-record evaluation of the active filter set.
//!
//! A record passes when every active, enabled predicate accepts it. A
//! filter that is unset, or disabled by configuration, contributes no
//! constraint. Evaluation is pure and reads no shared mutable state, so it
//! is safe to run over records in parallel.

use crate::data::record::SiteRecord;
use crate::filter::bins::BucketId;
use crate::filter::numeric::{self, Numeric};
use crate::filter::options::CategoricalField;
use crate::filter::state::FilterState;

/// Which filters are enabled, decided once from configuration and
/// independent of any presentation detail.
#[derive(Clone, Copy, Debug)]
pub struct FilterVisibility {
    pub region: bool,
    pub governorate: bool,
    pub crop_type: bool,
    pub water_source: bool,
    pub irrigation: bool,
    pub trees: bool,
    pub area: bool,
}

impl FilterVisibility {
    pub fn categorical(&self, field: CategoricalField) -> bool {
        match field {
            CategoricalField::Region => self.region,
            CategoricalField::Governorate => self.governorate,
            CategoricalField::CropType => self.crop_type,
            CategoricalField::WaterSource => self.water_source,
            CategoricalField::Irrigation => self.irrigation,
        }
    }
}

impl Default for FilterVisibility {
    fn default() -> Self {
        Self {
            region: true,
            governorate: true,
            crop_type: true,
            water_source: true,
            irrigation: true,
            trees: true,
            area: true,
        }
    }
}

/// Keep/reject decision for one record under the current selections.
pub fn matches(record: &SiteRecord, filters: &FilterState, visible: &FilterVisibility) -> bool {
    for field in CategoricalField::ALL {
        if !visible.categorical(field) {
            continue;
        }
        if let Some(selected) = filters.categorical(field) {
            if field.text(record).canonical() != selected {
                return false;
            }
        }
    }

    if visible.trees {
        if let Some(selected) = filters.tree_bucket() {
            let parsed = numeric::integer_of(record.number_of_trees.as_deref());
            let hit = match selected {
                // present but not numeric, exactly
                BucketId::NonNumeric => parsed == Numeric::NonNumeric,
                BucketId::Range { lo, hi } => {
                    matches!(parsed, Numeric::Value(n) if lo <= n && n <= hi)
                }
            };
            if !hit {
                return false;
            }
        }
    }

    if visible.area {
        if let Some(selected) = filters.area_bucket() {
            let hit = match selected {
                // the area filter offers no non-numeric bucket
                BucketId::NonNumeric => false,
                BucketId::Range { lo, hi } => {
                    match numeric::real_of(record.area_m2.as_deref()) {
                        Numeric::Value(n) => lo as f64 <= n && n <= hi as f64,
                        _ => false,
                    }
                }
            };
            if !hit {
                return false;
            }
        }
    }

    for (key, selected) in filters.dynamic_selections() {
        let hit = record
            .extras
            .iter()
            .any(|extra| extra.key == key && extra.value_en == selected);
        if !hit {
            return false;
        }
    }

    let query = filters.query().trim().to_lowercase();
    if !query.is_empty() {
        let code = record.code.map(|c| c.to_string()).unwrap_or_default();
        let haystack = [
            code.as_str(),
            record.farmer_name.canonical(),
            record.farmer_name.ar.as_deref().unwrap_or(""),
        ]
        .map(|part| part.trim().to_lowercase())
        .join(" | ");
        if !haystack.contains(&query) {
            return false;
        }
    }

    true
}
