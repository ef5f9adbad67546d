//! Numeric coercion of raw record values.
//!
//! Site records carry `number_of_trees` and `area_m2` as free-form text
//! ("1,200", "12.50", "One Greenhouse", or nothing at all). Filtering needs
//! a three-way reading of such a value: absent, present but not a number,
//! or an actual number. The distinction between absent and non-numeric
//! drives the sentinel bucket of the trees range filter.

/// Outcome of coercing one raw value.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Numeric<T> {
    /// Missing, null, or blank.
    Absent,
    /// Present but fails the parse ("One Greenhouse").
    NonNumeric,
    Value(T),
}

impl<T: Copy> Numeric<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Numeric::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Drop thousands separators and embedded spaces, then trim.
fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| *c != ',' && *c != ' ').collect::<String>().trim().to_string()
}

/// Strict non-negative integer parse: after separator stripping the text
/// must be all decimal digits. No sign, no decimal point.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let t = strip_separators(raw);
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse::<i64>().ok()
}

/// Lenient real parse: signed and decimal forms allowed, result must be
/// finite.
pub fn parse_real(raw: &str) -> Option<f64> {
    let t = strip_separators(raw);
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Three-way integer reading of an optional raw value.
pub fn integer_of(raw: Option<&str>) -> Numeric<i64> {
    match raw {
        None => Numeric::Absent,
        Some(s) if s.trim().is_empty() => Numeric::Absent,
        Some(s) => match parse_integer(s) {
            Some(n) => Numeric::Value(n),
            None => Numeric::NonNumeric,
        },
    }
}

/// Three-way real reading of an optional raw value.
pub fn real_of(raw: Option<&str>) -> Numeric<f64> {
    match raw {
        None => Numeric::Absent,
        Some(s) if s.trim().is_empty() => Numeric::Absent,
        Some(s) => match parse_real(s) {
            Some(n) => Numeric::Value(n),
            None => Numeric::NonNumeric,
        },
    }
}
