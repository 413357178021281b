//! Applicant profile and the two model-contract record shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IntakeError;

/// Applicant gender. The model contract allows exactly these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Lease arrangement the applicant is looking for.
///
/// Serialized with the Korean wire strings the model contract uses:
/// 전세 (lump-sum deposit lease), 월세 (monthly rent), 전체 (either).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentType {
    #[serde(rename = "전세")]
    Jeonse,
    #[serde(rename = "월세")]
    Monthly,
    #[serde(rename = "전체")]
    Either,
}

impl std::fmt::Display for RentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jeonse => write!(f, "전세"),
            Self::Monthly => write!(f, "월세"),
            Self::Either => write!(f, "전체"),
        }
    }
}

/// Wire names of the thirteen profile fields, in collection order.
pub const PROFILE_FIELDS: [&str; 13] = [
    "age",
    "gender",
    "district",
    "married",
    "marriage_date",
    "income",
    "asset",
    "has_car",
    "car_value",
    "budget",
    "house_size",
    "price_limit",
    "rent_type",
];

/// The applicant record built up over a conversation.
///
/// Every field starts as `None` ("not yet known") and is filled in as the
/// model hears it. `marriage_date` is meaningful only when `married` is
/// true, `car_value` only when `has_car` is true; that contract lives in
/// the prompts — nothing here enforces it, and clearing a guard flag does
/// not clear the dependent field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    /// Korean legal age (만 나이), 19-99.
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    /// Registered city/district, e.g. "서울특별시 강남구".
    pub district: Option<String>,
    pub married: Option<bool>,
    /// Marriage registration date, e.g. "2022-01-01".
    pub marriage_date: Option<String>,
    /// Annual income in KRW.
    pub income: Option<u64>,
    /// Total assets in KRW.
    pub asset: Option<u64>,
    pub has_car: Option<bool>,
    /// Assessed vehicle value in KRW.
    pub car_value: Option<u64>,
    /// Housing budget in KRW.
    pub budget: Option<u64>,
    /// Desired size in square meters, 0-999.
    pub house_size: Option<u32>,
    /// Upper price bound in KRW.
    pub price_limit: Option<u64>,
    pub rent_type: Option<RentType>,
}

impl ApplicantProfile {
    /// Wire names of the fields that have not been heard yet.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.age.is_none() {
            missing.push("age");
        }
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.district.is_none() {
            missing.push("district");
        }
        if self.married.is_none() {
            missing.push("married");
        }
        if self.marriage_date.is_none() {
            missing.push("marriage_date");
        }
        if self.income.is_none() {
            missing.push("income");
        }
        if self.asset.is_none() {
            missing.push("asset");
        }
        if self.has_car.is_none() {
            missing.push("has_car");
        }
        if self.car_value.is_none() {
            missing.push("car_value");
        }
        if self.budget.is_none() {
            missing.push("budget");
        }
        if self.house_size.is_none() {
            missing.push("house_size");
        }
        if self.price_limit.is_none() {
            missing.push("price_limit");
        }
        if self.rent_type.is_none() {
            missing.push("rent_type");
        }
        missing
    }

    /// Fold one turn's extracted record into the profile.
    ///
    /// Additive: only fields the model actually returned overwrite; fields
    /// absent from this turn keep their previously collected values.
    pub fn merge_record(&mut self, record: &CollectedRecord) {
        if let Some(age) = record.age {
            self.age = Some(age);
        }
        if let Some(gender) = record.gender {
            self.gender = Some(gender);
        }
        if let Some(ref district) = record.district {
            self.district = Some(district.clone());
        }
        if let Some(married) = record.married {
            self.married = Some(married);
        }
        if let Some(ref marriage_date) = record.marriage_date {
            self.marriage_date = Some(marriage_date.clone());
        }
        if let Some(income) = record.income {
            self.income = Some(income);
        }
        if let Some(asset) = record.asset {
            self.asset = Some(asset);
        }
        if let Some(has_car) = record.has_car {
            self.has_car = Some(has_car);
        }
        if let Some(car_value) = record.car_value {
            self.car_value = Some(car_value);
        }
        if let Some(budget) = record.budget {
            self.budget = Some(budget);
        }
        if let Some(house_size) = record.house_size {
            self.house_size = Some(house_size);
        }
        if let Some(price_limit) = record.price_limit {
            self.price_limit = Some(price_limit);
        }
        if let Some(rent_type) = record.rent_type {
            self.rent_type = Some(rent_type);
        }
    }

    /// Set a single field by wire name from a JSON value.
    ///
    /// A `null` value clears the field. Unknown names and values that do
    /// not deserialize into the field's type are errors; nothing here
    /// second-guesses what the model produced beyond type shape.
    pub fn apply_change(&mut self, field: &str, value: &Value) -> Result<(), IntakeError> {
        match field {
            "age" => self.age = parse_field(field, value)?,
            "gender" => self.gender = parse_field(field, value)?,
            "district" => self.district = parse_field(field, value)?,
            "married" => self.married = parse_field(field, value)?,
            "marriage_date" => self.marriage_date = parse_field(field, value)?,
            "income" => self.income = parse_field(field, value)?,
            "asset" => self.asset = parse_field(field, value)?,
            "has_car" => self.has_car = parse_field(field, value)?,
            "car_value" => self.car_value = parse_field(field, value)?,
            "budget" => self.budget = parse_field(field, value)?,
            "house_size" => self.house_size = parse_field(field, value)?,
            "price_limit" => self.price_limit = parse_field(field, value)?,
            "rent_type" => self.rent_type = parse_field(field, value)?,
            other => {
                return Err(IntakeError::UnknownField {
                    field: other.to_string(),
                });
            }
        }
        Ok(())
    }

    /// One line per known field, for showing the applicant their record.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if let Some(age) = self.age {
            lines.push(format!("- age: {age}"));
        }
        if let Some(gender) = self.gender {
            lines.push(format!("- gender: {gender}"));
        }
        if let Some(ref district) = self.district {
            lines.push(format!("- district: {district}"));
        }
        if let Some(married) = self.married {
            lines.push(format!("- married: {married}"));
        }
        if let Some(ref marriage_date) = self.marriage_date {
            lines.push(format!("- marriage_date: {marriage_date}"));
        }
        if let Some(income) = self.income {
            lines.push(format!("- income: {income} KRW"));
        }
        if let Some(asset) = self.asset {
            lines.push(format!("- asset: {asset} KRW"));
        }
        if let Some(has_car) = self.has_car {
            lines.push(format!("- has_car: {has_car}"));
        }
        if let Some(car_value) = self.car_value {
            lines.push(format!("- car_value: {car_value} KRW"));
        }
        if let Some(budget) = self.budget {
            lines.push(format!("- budget: {budget} KRW"));
        }
        if let Some(house_size) = self.house_size {
            lines.push(format!("- house_size: {house_size} m²"));
        }
        if let Some(price_limit) = self.price_limit {
            lines.push(format!("- price_limit: {price_limit} KRW"));
        }
        if let Some(rent_type) = self.rent_type {
            lines.push(format!("- rent_type: {rent_type}"));
        }
        if lines.is_empty() {
            "(nothing collected yet)".to_string()
        } else {
            lines.join("\n")
        }
    }
}

fn parse_field<T: serde::de::DeserializeOwned>(
    field: &str,
    value: &Value,
) -> Result<Option<T>, IntakeError> {
    serde_json::from_value(value.clone()).map_err(|e| IntakeError::InvalidFieldValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// One turn's worth of extracted fields, as returned by the collection
/// model call.
///
/// Mirrors `ApplicantProfile` plus the completeness flag. The model is
/// told to leave anything it has not heard as null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectedRecord {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub married: Option<bool>,
    #[serde(default)]
    pub marriage_date: Option<String>,
    #[serde(default)]
    pub income: Option<u64>,
    #[serde(default)]
    pub asset: Option<u64>,
    #[serde(default)]
    pub has_car: Option<bool>,
    #[serde(default)]
    pub car_value: Option<u64>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub house_size: Option<u32>,
    #[serde(default)]
    pub price_limit: Option<u64>,
    #[serde(default)]
    pub rent_type: Option<RentType>,
    #[serde(default)]
    pub is_data_collected: bool,
}

/// The review model call's contract: an ordered list of field changes plus
/// the finished flag.
///
/// Each entry maps field names to new values; entries are applied in
/// sequence order, so a later entry wins over an earlier one for the same
/// field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub change_column_list: Vec<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub is_done: bool,
}
