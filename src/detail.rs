//! Detail panel content for one selected site.

use crate::data::record::SiteRecord;
use crate::locale::{labels, Lang};

/// Panel heading, e.g. "Site: 1042".
pub fn heading(record: &SiteRecord, lang: Lang) -> String {
    let site = labels(lang).site;
    match record.code {
        Some(code) => format!("{site}: {code}"),
        None => site.to_string(),
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Ordered label/value rows for the detail panel.
pub fn rows(record: &SiteRecord, lang: Lang) -> Vec<(String, String)> {
    let l = labels(lang);
    let mut rows: Vec<(String, String)> = vec![
        (l.farmer.to_string(), or_dash(record.farmer_name.display(lang))),
        (l.region.to_string(), or_dash(record.region.display(lang))),
        (l.governorate.to_string(), or_dash(record.governorate.display(lang))),
        (l.crop.to_string(), or_dash(record.crop_type.display(lang))),
        (l.water.to_string(), or_dash(record.water_source.display(lang))),
        (l.irrigation.to_string(), or_dash(record.irrigation_system_type.display(lang))),
        (l.total_area.to_string(), or_dash(record.area_m2.as_deref().unwrap_or(""))),
        (l.total_trees.to_string(), or_dash(record.number_of_trees.as_deref().unwrap_or(""))),
        (
            l.du.to_string(),
            record
                .distribution_uniformity_pct
                .as_deref()
                .map(|du| format!("{du}%"))
                .unwrap_or_else(|| "-".to_string()),
        ),
        (l.description.to_string(), or_dash(record.description.display(lang))),
    ];

    for extra in &record.extras {
        let label = match (lang, &extra.label_ar) {
            (Lang::Ar, Some(ar)) if !ar.is_empty() => ar.clone(),
            _ => extra.label_en.clone(),
        };
        let value = match (lang, &extra.value_ar) {
            (Lang::Ar, Some(ar)) if !ar.is_empty() => ar.clone(),
            _ => extra.value_en.clone(),
        };
        rows.push((label, or_dash(&value)));
    }

    if !record.images.is_empty() {
        rows.push((l.photos.to_string(), record.images.len().to_string()));
    }
    if record.design_pdf.is_some() {
        rows.push((l.design_pdf.to_string(), l.yes.to_string()));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::LocalizedText;

    #[test]
    fn test_missing_values_render_dash() {
        let record = SiteRecord::default();
        let all = rows(&record, Lang::En);
        let farmer = &all[0];
        assert_eq!(farmer.1, "-");
        let du = all.iter().find(|(label, _)| label == "Distribution Uniformity").unwrap();
        assert_eq!(du.1, "-");
    }

    #[test]
    fn test_du_gets_percent_suffix() {
        let record = SiteRecord {
            distribution_uniformity_pct: Some("85.50".into()),
            ..SiteRecord::default()
        };
        let all = rows(&record, Lang::En);
        let du = all.iter().find(|(label, _)| label == "Distribution Uniformity").unwrap();
        assert_eq!(du.1, "85.50%");
    }

    #[test]
    fn test_heading_with_and_without_code() {
        let mut record = SiteRecord::default();
        assert_eq!(heading(&record, Lang::En), "Site");
        record.code = Some(1042);
        assert_eq!(heading(&record, Lang::En), "Site: 1042");
        assert_eq!(heading(&record, Lang::Ar), "الموقع: 1042");
    }

    #[test]
    fn test_media_rows_only_when_present() {
        let record = SiteRecord {
            images: vec!["a.jpg".into(), "b.jpg".into()],
            design_pdf: Some("plan.pdf".into()),
            farmer_name: LocalizedText::new("Ali", None),
            ..SiteRecord::default()
        };
        let all = rows(&record, Lang::En);
        assert!(all.iter().any(|(label, value)| label == "Photos" && value == "2"));
        assert!(all.iter().any(|(label, _)| label == "Design PDF"));

        let bare = rows(&SiteRecord::default(), Lang::En);
        assert!(!bare.iter().any(|(label, _)| label == "Photos"));
        assert!(!bare.iter().any(|(label, _)| label == "Design PDF"));
    }
}
