/// Active interface language. Arabic falls back to English wherever a
/// localized variant is missing or blank.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Lang {
    En,
    Ar,
}

impl Lang {
    /// Parse a language code from the configuration payload ("en"/"ar").
    pub fn from_code(code: &str) -> Self {
        if code.trim().to_ascii_lowercase().starts_with("ar") {
            Lang::Ar
        } else {
            Lang::En
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Lang::En => Lang::Ar,
            Lang::Ar => Lang::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ar => "ar",
        }
    }
}

/// Fixed label pack for one language.
pub struct Labels {
    pub region: &'static str,
    pub governorate: &'static str,
    pub crop: &'static str,
    pub water: &'static str,
    pub irrigation: &'static str,
    pub du: &'static str,
    pub trees: &'static str,
    pub area: &'static str,
    pub area_unit: &'static str,
    pub non_numeric: &'static str,
    pub farmer: &'static str,
    pub description: &'static str,
    pub site: &'static str,
    pub total_area: &'static str,
    pub total_trees: &'static str,
    pub photos: &'static str,
    pub design_pdf: &'static str,
    pub search: &'static str,
    pub sites: &'static str,
    pub all: &'static str,
    pub yes: &'static str,
}

static LABELS_EN: Labels = Labels {
    region: "Region",
    governorate: "Governorate",
    crop: "Crop Type",
    water: "Water Source",
    irrigation: "Irrigation System Type",
    du: "Distribution Uniformity",
    trees: "Trees",
    area: "Area (m²)",
    area_unit: "m²",
    non_numeric: "Greenhouse",
    farmer: "Farmer Name",
    description: "Description",
    site: "Site",
    total_area: "Total Area (m²)",
    total_trees: "Total Trees",
    photos: "Photos",
    design_pdf: "Design PDF",
    search: "Search",
    sites: "Sites",
    all: "All",
    yes: "Yes",
};

static LABELS_AR: Labels = Labels {
    region: "المنطقة",
    governorate: "المحافظة",
    crop: "نوع المحصول",
    water: "مصدر المياه",
    irrigation: "نظام الري",
    du: "تجانس التوزيع",
    trees: "عدد الأشجار",
    area: "المساحة (م²)",
    area_unit: "م²",
    non_numeric: "غير رقمي",
    farmer: "اسم المزارع",
    description: "الوصف",
    site: "الموقع",
    total_area: "إجمالي المساحة (م²)",
    total_trees: "إجمالي الأشجار",
    photos: "الصور",
    design_pdf: "التصميم (PDF)",
    search: "بحث",
    sites: "المواقع",
    all: "الكل",
    yes: "نعم",
};

pub fn labels(lang: Lang) -> &'static Labels {
    match lang {
        Lang::En => &LABELS_EN,
        Lang::Ar => &LABELS_AR,
    }
}
