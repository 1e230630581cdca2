//! Canonical field vocabulary and the heuristic lookup tables built on it.
//!
//! Everything here is static data: the source-spelling mapping table shared
//! by the JSON and DOM paths, the key sets the array scorer counts, the
//! fuzzy header cascade and the preferred output column order. Order inside
//! each table is significant and is exercised by the tests below.

use std::fmt;

use serde::Serialize;

/// A field of the canonical result schema.
///
/// Variants are declared in preferred output order, so the derived `Ord`
/// matches [`COLUMN_ORDER`]. `Age` is produced by the mapping table but is
/// not part of the preferred order; it sorts last and is written among the
/// extra columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Bib,
    FullName,
    FirstName,
    LastName,
    Gender,
    AgeGroup,
    Category,
    RaceCategory,
    Club,
    City,
    Country,
    Nationality,
    ChipTime,
    GunTime,
    Pace,
    GunPace,
    OverallRank,
    CategoryRank,
    GenderRank,
    Age,
}

impl CanonicalField {
    /// Column name as written to the CSV header.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Bib => "bib",
            CanonicalField::FullName => "full_name",
            CanonicalField::FirstName => "first_name",
            CanonicalField::LastName => "last_name",
            CanonicalField::Gender => "gender",
            CanonicalField::AgeGroup => "age_group",
            CanonicalField::Category => "category",
            CanonicalField::RaceCategory => "race_category",
            CanonicalField::Club => "club",
            CanonicalField::City => "city",
            CanonicalField::Country => "country",
            CanonicalField::Nationality => "nationality",
            CanonicalField::ChipTime => "chip_time",
            CanonicalField::GunTime => "gun_time",
            CanonicalField::Pace => "pace",
            CanonicalField::GunPace => "gun_pace",
            CanonicalField::OverallRank => "overall_rank",
            CanonicalField::CategoryRank => "category_rank",
            CanonicalField::GenderRank => "gender_rank",
            CanonicalField::Age => "age",
        }
    }

    /// Whether this field belongs to the fixed preferred column order.
    pub fn is_preferred(self) -> bool {
        COLUMN_ORDER.contains(&self)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use CanonicalField as F;

/// Source spelling (lower-case) to canonical field.
///
/// The DOM path takes the first entry whose spelling is a substring of the
/// underscored header, so entries must stay in this order.
pub static FIELD_MAP: &[(&str, CanonicalField)] = &[
    // bib
    ("bibno", F::Bib),
    ("bib_no", F::Bib),
    ("bib_number", F::Bib),
    ("bibnumber", F::Bib),
    ("race_number", F::Bib),
    ("start_number", F::Bib),
    // name
    ("first_name", F::FirstName),
    ("firstname", F::FirstName),
    ("last_name", F::LastName),
    ("lastname", F::LastName),
    ("full_name", F::FullName),
    ("fullname", F::FullName),
    ("name", F::FullName),
    ("runner_name", F::FullName),
    ("participant_name", F::FullName),
    // time
    ("finished_time", F::ChipTime),
    ("finish_time", F::ChipTime),
    ("chip_time", F::ChipTime),
    ("net_time", F::ChipTime),
    ("chiptime", F::ChipTime),
    ("gun_time", F::GunTime),
    ("guntime", F::GunTime),
    ("gross_time", F::GunTime),
    // pace
    ("chip_pace", F::Pace),
    ("pace", F::Pace),
    ("avg_pace", F::Pace),
    ("gun_pace", F::GunPace),
    // rank
    ("overall_rank", F::OverallRank),
    ("overallrank", F::OverallRank),
    ("bracket_rank", F::CategoryRank),
    ("category_rank", F::CategoryRank),
    ("gender_rank", F::GenderRank),
    // demographics
    ("gender", F::Gender),
    ("sex", F::Gender),
    ("age", F::Age),
    ("age_group", F::AgeGroup),
    ("agegroup", F::AgeGroup),
    ("category", F::Category),
    ("race_name", F::RaceCategory),
    // other
    ("club", F::Club),
    ("team", F::Club),
    ("team_name", F::Club),
    ("city", F::City),
    ("country", F::Country),
    ("nationality", F::Nationality),
];

/// Exact lookup of a lower-cased source key.
pub fn lookup_field(key: &str) -> Option<CanonicalField> {
    FIELD_MAP
        .iter()
        .find(|(spelling, _)| *spelling == key)
        .map(|(_, field)| *field)
}

/// First mapping entry (in table order) whose spelling occurs inside `header`.
pub fn lookup_field_substring(header: &str) -> Option<CanonicalField> {
    FIELD_MAP
        .iter()
        .find(|(spelling, _)| header.contains(spelling))
        .map(|(_, field)| *field)
}

/// Keys worth +2 each when scoring a candidate array.
pub static STRONG_KEYS: &[&str] = &[
    "bibno",
    "bib_no",
    "bib",
    "bib_number",
    "finished_time",
    "finish_time",
    "chip_time",
    "gun_time",
    "net_time",
    "pace",
    "rank",
    "overall_rank",
    "bracket_rank",
    "category_rank",
    "gender_rank",
];

/// Keys worth +1 each when scoring a candidate array.
pub static MODERATE_KEYS: &[&str] = &[
    "first_name",
    "last_name",
    "name",
    "full_name",
    "runner_name",
    "participant",
    "age",
    "gender",
    "sex",
    "category",
    "race_name",
    "race_id",
    "club",
    "city",
    "country",
    "nationality",
];

/// Identity fields; a JSON row needs at least one of these.
pub static IDENTITY_FIELDS: &[CanonicalField] = &[F::Bib, F::FullName, F::FirstName];

/// At least one must appear in a table's joined header text.
pub static RESULTS_KEYWORDS: &[&str] = &["bib", "name", "time", "finish", "rank", "pace", "position"];

/// Outcome of a fuzzy header rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuzzyTarget {
    Field(CanonicalField),
    /// Rank columns are split further by [`resolve_rank`].
    Rank,
}

/// Ordered header cascade used when no mapping spelling matches.
pub static FUZZY_HEADER_RULES: &[(&[&str], FuzzyTarget)] = &[
    (&["bib"], FuzzyTarget::Field(F::Bib)),
    (&["name"], FuzzyTarget::Field(F::FullName)),
    (&["finish", "chip", "net"], FuzzyTarget::Field(F::ChipTime)),
    (&["gun", "gross"], FuzzyTarget::Field(F::GunTime)),
    (&["rank", "pos"], FuzzyTarget::Rank),
    (&["pace"], FuzzyTarget::Field(F::Pace)),
    (&["age"], FuzzyTarget::Field(F::AgeGroup)),
    (&["gender", "sex"], FuzzyTarget::Field(F::Gender)),
    (&["category", "race"], FuzzyTarget::Field(F::Category)),
    (&["club", "team"], FuzzyTarget::Field(F::Club)),
];

fn resolve_rank(header: &str) -> CanonicalField {
    if header.contains("overall") {
        F::OverallRank
    } else if header.contains("gender") || header.contains("category") {
        F::CategoryRank
    } else {
        F::OverallRank
    }
}

/// Walk [`FUZZY_HEADER_RULES`]; first rule with a matching needle wins.
pub fn fuzzy_header_field(header: &str) -> Option<CanonicalField> {
    FUZZY_HEADER_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| header.contains(n)))
        .map(|(_, target)| match target {
            FuzzyTarget::Field(field) => *field,
            FuzzyTarget::Rank => resolve_rank(header),
        })
}

/// Preferred output column order.
pub static COLUMN_ORDER: &[CanonicalField] = &[
    F::Bib,
    F::FullName,
    F::FirstName,
    F::LastName,
    F::Gender,
    F::AgeGroup,
    F::Category,
    F::RaceCategory,
    F::Club,
    F::City,
    F::Country,
    F::Nationality,
    F::ChipTime,
    F::GunTime,
    F::Pace,
    F::GunPace,
    F::OverallRank,
    F::CategoryRank,
    F::GenderRank,
];
