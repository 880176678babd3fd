//! The fixed feature schema the trained pipeline expects.
//!
//! Every record must carry exactly these fields. Categorical fields are
//! checked against closed enumerations taken from the training data.

/// Value type (and constraint) of a schema field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole number, optionally bounded from below.
    Integer { min: Option<i64> },
    /// Finite floating-point number. Whole numbers are accepted too.
    Float,
    /// String drawn from a closed set of categories.
    Category(&'static [&'static str]),
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer { .. } | FieldKind::Float)
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, FieldKind::Category(_))
    }
}

/// A named schema field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { min: None },
        }
    }

    const fn at_least(name: &'static str, min: i64) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { min: Some(min) },
        }
    }

    const fn float(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Float,
        }
    }

    const fn category(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: FieldKind::Category(allowed),
        }
    }
}

pub const OCCUPATIONS: &[&str] = &[
    "admin.",
    "blue-collar",
    "entrepreneur",
    "housemaid",
    "management",
    "retired",
    "self-employed",
    "services",
    "student",
    "technician",
    "unemployed",
    "unknown",
];

pub const MARITAL_STATUSES: &[&str] = &["divorced", "married", "single", "unknown"];

pub const EDUCATION_LEVELS: &[&str] = &[
    "basic.4y",
    "basic.6y",
    "basic.9y",
    "high.school",
    "illiterate",
    "professional.course",
    "university.degree",
    "unknown",
];

pub const YES_NO_UNKNOWN: &[&str] = &["yes", "no", "unknown"];

pub const CONTACT_MODES: &[&str] = &["cellular", "telephone"];

pub const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

pub const WEEK_DAYS: &[&str] = &["mon", "tue", "wed", "thu", "fri"];

pub const PREVIOUS_OUTCOMES: &[&str] = &["failure", "nonexistent", "success"];

/// `N_last_days` value meaning the customer was never contacted before.
pub const NEVER_CONTACTED: i64 = 999;

/// All fields, in the column order used for training.
pub const FEATURE_SCHEMA: &[FieldSpec] = &[
    FieldSpec::integer("age"),
    FieldSpec::category("occupation", OCCUPATIONS),
    FieldSpec::category("marital_status", MARITAL_STATUSES),
    FieldSpec::category("education", EDUCATION_LEVELS),
    FieldSpec::category("has_credit", YES_NO_UNKNOWN),
    FieldSpec::category("housing_loan", YES_NO_UNKNOWN),
    FieldSpec::category("personal_loan", YES_NO_UNKNOWN),
    FieldSpec::category("contact_mode", CONTACT_MODES),
    FieldSpec::category("month", MONTHS),
    FieldSpec::category("week_day", WEEK_DAYS),
    FieldSpec::at_least("last_contact_duration", 0),
    FieldSpec::at_least("contacts_per_campaign", 1),
    FieldSpec::at_least("N_last_days", 0),
    FieldSpec::at_least("nb_previous_contact", 0),
    FieldSpec::category("previous_outcome", PREVIOUS_OUTCOMES),
    FieldSpec::float("emp_var_rate"),
    FieldSpec::float("cons_price_index"),
    FieldSpec::float("cons_conf_index"),
    FieldSpec::float("euri_3_month"),
    FieldSpec::float("nb_employees"),
];

/// Look up a schema field by name.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FEATURE_SCHEMA.iter().find(|f| f.name == name)
}

/// Schema field names in column order.
pub fn field_names() -> impl Iterator<Item = &'static str> {
    FEATURE_SCHEMA.iter().map(|f| f.name)
}
