// src/models/category.rs

//! Semantic form-field categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A semantic slot a form control can be filled from.
///
/// Variant order is the fill priority: when one control matches several
/// categories, the earliest category that writes it wins. Payment and
/// specific name fields come before the generic `FullName` so a
/// "name on card" or "first name" box is not claimed by the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldCategory {
    CardholderName,
    CardNumber,
    ExpDate,
    Cvv,
    Email,
    FirstName,
    LastName,
    FullName,
    Phone,
    ZipCode,
    Address,
    City,
    State,
    Country,
    Gender,
    CoverLetter,
    School,
    Degree,
    LinkedinUrl,
    GithubUrl,
}

impl FieldCategory {
    /// Every category, in fill priority order.
    pub const ALL: [FieldCategory; 20] = [
        FieldCategory::CardholderName,
        FieldCategory::CardNumber,
        FieldCategory::ExpDate,
        FieldCategory::Cvv,
        FieldCategory::Email,
        FieldCategory::FirstName,
        FieldCategory::LastName,
        FieldCategory::FullName,
        FieldCategory::Phone,
        FieldCategory::ZipCode,
        FieldCategory::Address,
        FieldCategory::City,
        FieldCategory::State,
        FieldCategory::Country,
        FieldCategory::Gender,
        FieldCategory::CoverLetter,
        FieldCategory::School,
        FieldCategory::Degree,
        FieldCategory::LinkedinUrl,
        FieldCategory::GithubUrl,
    ];

    /// Key used in pattern tables, reports and stored profiles.
    pub fn key(self) -> &'static str {
        match self {
            FieldCategory::CardholderName => "cardholderName",
            FieldCategory::CardNumber => "cardNumber",
            FieldCategory::ExpDate => "expDate",
            FieldCategory::Cvv => "cvv",
            FieldCategory::Email => "email",
            FieldCategory::FirstName => "firstName",
            FieldCategory::LastName => "lastName",
            FieldCategory::FullName => "fullName",
            FieldCategory::Phone => "phone",
            FieldCategory::ZipCode => "zipCode",
            FieldCategory::Address => "address",
            FieldCategory::City => "city",
            FieldCategory::State => "state",
            FieldCategory::Country => "country",
            FieldCategory::Gender => "gender",
            FieldCategory::CoverLetter => "coverLetter",
            FieldCategory::School => "school",
            FieldCategory::Degree => "degree",
            FieldCategory::LinkedinUrl => "linkedinUrl",
            FieldCategory::GithubUrl => "githubUrl",
        }
    }

    /// Payment categories only resolve when the profile enables payment.
    pub fn is_payment(self) -> bool {
        matches!(
            self,
            FieldCategory::CardNumber
                | FieldCategory::ExpDate
                | FieldCategory::Cvv
                | FieldCategory::CardholderName
        )
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        // Stored profiles call the address slot `streetAddress`.
        if key == "streetAddress" {
            return Ok(FieldCategory::Address);
        }
        FieldCategory::ALL
            .into_iter()
            .find(|category| category.key() == key)
            .ok_or_else(|| AppError::config(format!("Unknown field category: {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_sorted_by_priority() {
        let mut sorted = FieldCategory::ALL;
        sorted.sort();
        assert_eq!(sorted, FieldCategory::ALL);
    }

    #[test]
    fn test_key_round_trip() {
        for category in FieldCategory::ALL {
            assert_eq!(category.key().parse::<FieldCategory>().unwrap(), category);
        }
        assert_eq!(
            "streetAddress".parse::<FieldCategory>().unwrap(),
            FieldCategory::Address
        );
        assert!("shoeSize".parse::<FieldCategory>().is_err());
    }

    #[test]
    fn test_payment_categories() {
        let payment: Vec<_> = FieldCategory::ALL
            .into_iter()
            .filter(|c| c.is_payment())
            .collect();
        assert_eq!(payment.len(), 4);
        assert!(!FieldCategory::FullName.is_payment());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&FieldCategory::ZipCode).unwrap();
        assert_eq!(json, "\"zipCode\"");
    }
}
