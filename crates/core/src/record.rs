//! Feature records and tables.
//!
//! Records are kept loosely typed on purpose: they are built straight from
//! request bodies, and [`FeatureRecord::validate`] is what decides whether a
//! record may reach the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, IssueKind, ValidationError, ValidationResult};
use crate::schema::{self, FieldKind, FieldSpec};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Category(String),
    /// Anything else a client sent (bool, null, array, object). Never valid.
    Other(serde_json::Value),
}

impl FeatureValue {
    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(s) => Some(s),
            _ => None,
        }
    }

    fn check(&self, spec: &FieldSpec) -> Option<IssueKind> {
        match (spec.kind, self) {
            (FieldKind::Integer { min }, FeatureValue::Int(v)) => below(*v, min),
            (FieldKind::Integer { min }, FeatureValue::Float(v)) => {
                // 35.0 is an integer that went through a float-typed client.
                if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                    below(*v as i64, min)
                } else {
                    Some(IssueKind::ExpectedInteger)
                }
            }
            (FieldKind::Integer { .. }, _) => Some(IssueKind::ExpectedInteger),
            (FieldKind::Float, FeatureValue::Int(_)) => None,
            (FieldKind::Float, FeatureValue::Float(v)) if v.is_finite() => None,
            (FieldKind::Float, FeatureValue::Float(_)) => Some(IssueKind::NotFinite),
            (FieldKind::Float, _) => Some(IssueKind::ExpectedNumber),
            (FieldKind::Category(allowed), FeatureValue::Category(s)) => {
                if allowed.contains(&s.as_str()) {
                    None
                } else {
                    Some(IssueKind::UnknownCategory {
                        value: s.clone(),
                        allowed,
                    })
                }
            }
            (FieldKind::Category(_), _) => Some(IssueKind::ExpectedCategory),
        }
    }
}

fn below(value: i64, min: Option<i64>) -> Option<IssueKind> {
    match min {
        Some(min) if value < min => Some(IssueKind::BelowMinimum { value, min }),
        _ => None,
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FeatureValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        Self::Category(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        Self::Category(value)
    }
}

/// One customer record: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FeatureValue>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<FeatureValue> {
        self.values.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FeatureValue> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check the record against the fixed schema.
    ///
    /// Reports every offending field: schema fields first (in column order),
    /// then fields the schema does not know about.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();

        for spec in schema::FEATURE_SCHEMA {
            match self.values.get(spec.name) {
                None => issues.push(FieldIssue::new(spec.name, IssueKind::Missing)),
                Some(value) => {
                    if let Some(kind) = value.check(spec) {
                        issues.push(FieldIssue::new(spec.name, kind));
                    }
                }
            }
        }

        for name in self.values.keys() {
            if schema::field(name).is_none() {
                issues.push(FieldIssue::new(name.clone(), IssueKind::Unexpected));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Record(issues))
        }
    }

    /// The example customer shown in the API documentation.
    pub fn example() -> Self {
        Self::new()
            .with("age", 35)
            .with("occupation", "admin.")
            .with("marital_status", "married")
            .with("education", "university.degree")
            .with("has_credit", "no")
            .with("housing_loan", "yes")
            .with("personal_loan", "no")
            .with("contact_mode", "cellular")
            .with("month", "may")
            .with("week_day", "thu")
            .with("last_contact_duration", 261)
            .with("contacts_per_campaign", 1)
            .with("N_last_days", schema::NEVER_CONTACTED)
            .with("nb_previous_contact", 0)
            .with("previous_outcome", "nonexistent")
            .with("emp_var_rate", 1.1)
            .with("cons_price_index", 93.994)
            .with("cons_conf_index", -36.4)
            .with("euri_3_month", 4.857)
            .with("nb_employees", 5191.0)
    }
}

impl FromIterator<(String, FeatureValue)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Ordered rows sharing the feature schema. Row order is significant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureTable {
    rows: Vec<FeatureRecord>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureRecord>) -> Self {
        Self { rows }
    }

    /// One-row table wrapping a single record.
    pub fn single(record: FeatureRecord) -> Self {
        Self { rows: vec![record] }
    }

    pub fn rows(&self) -> &[FeatureRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FeatureRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureRecord> {
        self.rows.iter()
    }

    /// Reject empty tables and report the first invalid row.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.rows.is_empty() {
            return Err(ValidationError::EmptyTable);
        }
        for (idx, row) in self.rows.iter().enumerate() {
            row.validate().map_err(|e| e.at_row(idx))?;
        }
        Ok(())
    }
}

impl From<Vec<FeatureRecord>> for FeatureTable {
    fn from(rows: Vec<FeatureRecord>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<FeatureRecord> for FeatureTable {
    fn from_iter<I: IntoIterator<Item = FeatureRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FeatureTable {
    type Item = &'a FeatureRecord;
    type IntoIter = std::slice::Iter<'a, FeatureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue_for<'a>(err: &'a ValidationError, field: &str) -> &'a IssueKind {
        &err.issues()
            .iter()
            .find(|i| i.field == field)
            .unwrap_or_else(|| panic!("no issue for {field}: {err}"))
            .kind
    }

    #[test]
    fn example_record_is_valid() {
        assert_eq!(FeatureRecord::example().validate(), Ok(()));
        assert_eq!(FeatureRecord::example().len(), schema::FEATURE_SCHEMA.len());
    }

    #[test]
    fn deserializes_from_api_payload() {
        let payload = json!({
            "age": 42,
            "occupation": "management",
            "marital_status": "single",
            "education": "high.school",
            "has_credit": "no",
            "housing_loan": "no",
            "personal_loan": "yes",
            "contact_mode": "telephone",
            "month": "nov",
            "week_day": "fri",
            "last_contact_duration": 151,
            "contacts_per_campaign": 2,
            "N_last_days": 999,
            "nb_previous_contact": 0,
            "previous_outcome": "nonexistent",
            "emp_var_rate": -0.1,
            "cons_price_index": 93.2,
            "cons_conf_index": -42.0,
            "euri_3_month": 4.191,
            "nb_employees": 5099
        });

        let record: FeatureRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.get("age"), Some(&FeatureValue::Int(42)));
        assert_eq!(record.get("emp_var_rate"), Some(&FeatureValue::Float(-0.1)));
        assert_eq!(record.get("month").and_then(FeatureValue::as_category), Some("nov"));
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn missing_field_is_named() {
        let mut record = FeatureRecord::example();
        record.remove("euri_3_month");

        let err = record.validate().unwrap_err();
        assert_eq!(err.offending_fields(), vec!["euri_3_month"]);
        assert_eq!(issue_for(&err, "euri_3_month"), &IssueKind::Missing);
    }

    #[test]
    fn unexpected_field_is_rejected() {
        let record = FeatureRecord::example().with("duration_minutes", 4);

        let err = record.validate().unwrap_err();
        assert_eq!(err.offending_fields(), vec!["duration_minutes"]);
        assert_eq!(issue_for(&err, "duration_minutes"), &IssueKind::Unexpected);
    }

    #[test]
    fn wrong_types_are_reported_per_field() {
        let record = FeatureRecord::example()
            .with("age", "thirty-five")
            .with("month", 5)
            .with("nb_employees", FeatureValue::Other(json!(null)))
            .with("has_credit", FeatureValue::Other(json!(false)));

        let err = record.validate().unwrap_err();
        assert_eq!(
            err.offending_fields(),
            vec!["age", "has_credit", "month", "nb_employees"]
        );
        assert_eq!(issue_for(&err, "age"), &IssueKind::ExpectedInteger);
        assert_eq!(issue_for(&err, "has_credit"), &IssueKind::ExpectedCategory);
        assert_eq!(issue_for(&err, "month"), &IssueKind::ExpectedCategory);
        assert_eq!(issue_for(&err, "nb_employees"), &IssueKind::ExpectedNumber);
    }

    #[test]
    fn integer_fields_accept_whole_floats_only() {
        assert_eq!(FeatureRecord::example().with("age", 35.0).validate(), Ok(()));

        let err = FeatureRecord::example().with("age", 35.5).validate().unwrap_err();
        assert_eq!(issue_for(&err, "age"), &IssueKind::ExpectedInteger);
    }

    #[test]
    fn float_fields_accept_integers_but_not_nan() {
        assert_eq!(FeatureRecord::example().with("euri_3_month", 5).validate(), Ok(()));

        let err = FeatureRecord::example()
            .with("euri_3_month", f64::NAN)
            .validate()
            .unwrap_err();
        assert_eq!(issue_for(&err, "euri_3_month"), &IssueKind::NotFinite);
    }

    #[test]
    fn lower_bounds_are_enforced() {
        let err = FeatureRecord::example()
            .with("contacts_per_campaign", 0)
            .with("last_contact_duration", -3)
            .validate()
            .unwrap_err();

        assert_eq!(
            issue_for(&err, "contacts_per_campaign"),
            &IssueKind::BelowMinimum { value: 0, min: 1 }
        );
        assert_eq!(
            issue_for(&err, "last_contact_duration"),
            &IssueKind::BelowMinimum { value: -3, min: 0 }
        );
    }

    #[test]
    fn categories_are_a_closed_set() {
        let err = FeatureRecord::example()
            .with("week_day", "sat")
            .validate()
            .unwrap_err();

        match issue_for(&err, "week_day") {
            IssueKind::UnknownCategory { value, allowed } => {
                assert_eq!(value, "sat");
                assert_eq!(*allowed, schema::WEEK_DAYS);
            }
            other => panic!("Expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        assert_eq!(FeatureTable::default().validate(), Err(ValidationError::EmptyTable));
    }

    #[test]
    fn invalid_row_fails_whole_table() {
        let table = FeatureTable::new(vec![
            FeatureRecord::example(),
            FeatureRecord::example(),
            FeatureRecord::example().with("contact_mode", "carrier pigeon"),
        ]);

        match table.validate().unwrap_err() {
            ValidationError::Row { row, issues } => {
                assert_eq!(row, 2);
                assert_eq!(issues[0].field, "contact_mode");
            }
            other => panic!("Expected Row error, got {other:?}"),
        }
    }

    #[test]
    fn table_serializes_as_array_in_order() {
        let table: FeatureTable = vec![
            FeatureRecord::new().with("age", 20),
            FeatureRecord::new().with("age", 30),
        ]
        .into();

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json, json!([{"age": 20}, {"age": 30}]));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn pick(options: &'static [&'static str]) -> impl Strategy<Value = String> {
            prop::sample::select(options).prop_map(str::to_string)
        }

        prop_compose! {
            fn valid_record()(
                age in 17i64..100,
                occupation in pick(schema::OCCUPATIONS),
                marital in pick(schema::MARITAL_STATUSES),
                education in pick(schema::EDUCATION_LEVELS),
                credit in pick(schema::YES_NO_UNKNOWN),
                housing in pick(schema::YES_NO_UNKNOWN),
                loan in pick(schema::YES_NO_UNKNOWN),
                contact in pick(schema::CONTACT_MODES),
                month in pick(schema::MONTHS),
                day in pick(schema::WEEK_DAYS),
                duration in 0i64..5000,
                campaign in 1i64..60,
                pdays in prop_oneof![Just(schema::NEVER_CONTACTED), 0i64..30],
                previous in 0i64..8,
                outcome in pick(schema::PREVIOUS_OUTCOMES),
                econ in prop::array::uniform5(-100.0f64..6000.0),
            ) -> FeatureRecord {
                FeatureRecord::new()
                    .with("age", age)
                    .with("occupation", occupation)
                    .with("marital_status", marital)
                    .with("education", education)
                    .with("has_credit", credit)
                    .with("housing_loan", housing)
                    .with("personal_loan", loan)
                    .with("contact_mode", contact)
                    .with("month", month)
                    .with("week_day", day)
                    .with("last_contact_duration", duration)
                    .with("contacts_per_campaign", campaign)
                    .with("N_last_days", pdays)
                    .with("nb_previous_contact", previous)
                    .with("previous_outcome", outcome)
                    .with("emp_var_rate", econ[0])
                    .with("cons_price_index", econ[1])
                    .with("cons_conf_index", econ[2])
                    .with("euri_3_month", econ[3])
                    .with("nb_employees", econ[4])
            }
        }

        proptest! {
            /// Property: every record built from the schema's own domains validates.
            #[test]
            fn schema_conforming_records_validate(record in valid_record()) {
                prop_assert_eq!(record.validate(), Ok(()));
            }

            /// Property: dropping any one field is reported as exactly that field missing.
            #[test]
            fn dropping_a_field_names_it(record in valid_record(), idx in 0usize..20) {
                let name = schema::FEATURE_SCHEMA[idx].name;
                let mut record = record;
                record.remove(name);

                let err = record.validate().unwrap_err();
                prop_assert_eq!(err.offending_fields(), vec![name]);
                prop_assert_eq!(&err.issues()[0].kind, &IssueKind::Missing);
            }
        }
    }
}
