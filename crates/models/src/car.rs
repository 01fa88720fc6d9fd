use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// A vehicle listed in the store.
/// - `id`: opaque, assigned by the repository on create and never changed afterwards
/// - `mileage`: miles travelled
/// - `price`: integer cents
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Car {
    #[serde(default)]
    pub id: String,
    pub make: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub color: String,
    pub category: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

const MAKE_REQUIRED: ValidationError = ValidationError::new("make", "make is required");
const MODEL_REQUIRED: ValidationError = ValidationError::new("model", "model is required");
const COLOR_REQUIRED: ValidationError = ValidationError::new("color", "color is required");
const CATEGORY_REQUIRED: ValidationError = ValidationError::new("category", "category is required");
const YEAR_INVALID: ValidationError = ValidationError::new("year", "year is not valid");
const MILEAGE_NEGATIVE: ValidationError = ValidationError::new("mileage", "mileage cannot be negative");
const PRICE_NEGATIVE: ValidationError = ValidationError::new("price", "price cannot be negative");
const ID_SET_ON_CREATE: ValidationError = ValidationError::new("id", "id must not be set on create");
const ID_REQUIRED: ValidationError = ValidationError::new("id", "id is required");

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn eq_fold(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Calendar year used as the upper bound for `Car::year`.
pub fn current_year() -> i32 {
    Utc::now().year()
}

impl Car {
    /// Field rules, checked in a fixed order against the current UTC year.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with_year(current_year())
    }

    /// Field rules against an explicit upper bound for `year`.
    pub fn validate_with_year(&self, max_year: i32) -> Result<(), ValidationError> {
        if is_blank(&self.make) {
            return Err(MAKE_REQUIRED);
        }
        if is_blank(&self.model) {
            return Err(MODEL_REQUIRED);
        }
        if is_blank(&self.color) {
            return Err(COLOR_REQUIRED);
        }
        if is_blank(&self.category) {
            return Err(CATEGORY_REQUIRED);
        }
        if self.year <= 0 || self.year > max_year {
            return Err(YEAR_INVALID);
        }
        if self.mileage.is_some_and(|m| m < 0) {
            return Err(MILEAGE_NEGATIVE);
        }
        if self.price.is_some_and(|p| p < 0) {
            return Err(PRICE_NEGATIVE);
        }
        Ok(())
    }

    /// A new car must not carry an identifier yet.
    pub fn validate_for_create(&self) -> Result<(), ValidationError> {
        if !self.id.is_empty() {
            return Err(ID_SET_ON_CREATE);
        }
        self.validate()
    }

    /// A replacement must name the car it replaces.
    pub fn validate_for_update(&self) -> Result<(), ValidationError> {
        if is_blank(&self.id) {
            return Err(ID_REQUIRED);
        }
        self.validate()
    }
}

/// Optional constraints for listing cars. `None` means unconstrained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CarFilters {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
}

impl CarFilters {
    /// Conjunction of every supplied constraint; make and model compare
    /// case-insensitively, year exactly.
    pub fn matches(&self, car: &Car) -> bool {
        if let Some(make) = &self.make {
            if !eq_fold(&car.make, make) {
                return false;
            }
        }
        if let Some(model) = &self.model {
            if !eq_fold(&car.model, model) {
                return false;
            }
        }
        if let Some(year) = self.year {
            if car.year != year {
                return false;
            }
        }
        true
    }

    /// True when no constraint is set and every car matches.
    pub fn is_empty(&self) -> bool {
        self.make.is_none() && self.model.is_none() && self.year.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_YEAR: i32 = 2025;

    fn onix() -> Car {
        Car {
            id: String::new(),
            make: "Chevrolet".into(),
            model: "Onix".into(),
            package: None,
            color: "Black".into(),
            category: "Sedan".into(),
            year: 2025,
            mileage: None,
            price: None,
        }
    }

    #[test]
    fn valid_car_passes() {
        assert_eq!(onix().validate_with_year(MAX_YEAR), Ok(()));
    }

    #[test]
    fn each_blank_required_field_reports_only_itself() {
        let cases: [(fn(&mut Car), &str, &str); 4] = [
            (|c| c.make = "  ".into(), "make", "make is required"),
            (|c| c.model = String::new(), "model", "model is required"),
            (|c| c.color = "\t".into(), "color", "color is required"),
            (|c| c.category = String::new(), "category", "category is required"),
        ];
        for (blank, field, reason) in cases {
            let mut car = onix();
            blank(&mut car);
            let err = car.validate_with_year(MAX_YEAR).unwrap_err();
            assert_eq!(err.field, field);
            assert_eq!(err.reason, reason);
        }
    }

    #[test]
    fn first_failure_wins() {
        let car = Car { make: String::new(), category: String::new(), year: -1, ..onix() };
        assert_eq!(car.validate_with_year(MAX_YEAR).unwrap_err().field, "make");

        let car = Car { color: " ".into(), mileage: Some(-5), ..onix() };
        assert_eq!(car.validate_with_year(MAX_YEAR).unwrap_err().field, "color");
    }

    #[test]
    fn year_outside_range_is_rejected() {
        for year in [0, -2000, MAX_YEAR + 1, 9999] {
            let car = Car { year, ..onix() };
            assert_eq!(car.validate_with_year(MAX_YEAR).unwrap_err().reason, "year is not valid");
        }
        for year in [1, 1999, MAX_YEAR] {
            let car = Car { year, ..onix() };
            assert!(car.validate_with_year(MAX_YEAR).is_ok());
        }
    }

    #[test]
    fn negative_mileage_and_price_are_rejected() {
        let car = Car { mileage: Some(-1), ..onix() };
        assert_eq!(car.validate_with_year(MAX_YEAR).unwrap_err().reason, "mileage cannot be negative");

        let car = Car { price: Some(-100), ..onix() };
        assert_eq!(car.validate_with_year(MAX_YEAR).unwrap_err().reason, "price cannot be negative");

        let car = Car { mileage: Some(0), price: Some(0), ..onix() };
        assert!(car.validate_with_year(MAX_YEAR).is_ok());
    }

    #[test]
    fn validate_uses_current_year() {
        let car = Car { year: current_year(), ..onix() };
        assert!(car.validate().is_ok());
        let car = Car { year: current_year() + 1, ..onix() };
        assert_eq!(car.validate().unwrap_err().field, "year");
    }

    #[test]
    fn create_rejects_identifier() {
        let car = Car { id: "ABC123".into(), year: 2020, ..onix() };
        assert_eq!(car.validate_for_create().unwrap_err().field, "id");
        let car = Car { year: 2020, ..onix() };
        assert!(car.validate_for_create().is_ok());
    }

    #[test]
    fn update_requires_identifier() {
        let car = Car { id: "  ".into(), year: 2020, ..onix() };
        assert_eq!(car.validate_for_update().unwrap_err().reason, "id is required");
        let car = Car { id: "ABC123".into(), year: 2020, ..onix() };
        assert!(car.validate_for_update().is_ok());
    }

    #[test]
    fn absent_optionals_are_omitted_from_json() {
        let car = Car { id: "X1".into(), ..onix() };
        let v = serde_json::to_value(&car).unwrap();
        assert!(v.get("package").is_none());
        assert!(v.get("mileage").is_none());
        assert!(v.get("price").is_none());
        assert_eq!(v["id"], "X1");

        let car = Car { mileage: Some(0), ..onix() };
        let v = serde_json::to_value(&car).unwrap();
        assert_eq!(v["mileage"], 0);
    }

    #[test]
    fn filters_match_case_insensitively_and_by_conjunction() {
        let ford = Car { make: "Ford".into(), model: "F10".into(), year: 2010, ..onix() };
        let camry = Car { make: "Toyota".into(), model: "Camry".into(), year: 2019, ..onix() };

        let by_make = CarFilters { make: Some("toyota".into()), ..Default::default() };
        assert!(by_make.matches(&camry));
        assert!(!by_make.matches(&ford));

        let by_model = CarFilters { model: Some("f10".into()), ..Default::default() };
        assert!(by_model.matches(&ford));

        let ford_2019 = CarFilters { make: Some("Ford".into()), year: Some(2019), ..Default::default() };
        assert!(!ford_2019.matches(&ford));
        assert!(!ford_2019.matches(&camry));

        let none = CarFilters::default();
        assert!(none.is_empty());
        assert!(none.matches(&ford) && none.matches(&camry));
    }
}
