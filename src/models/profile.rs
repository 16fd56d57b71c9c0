//! Personal profile data used as the fill source.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::FieldCategory;

/// The user's stored personal attributes.
///
/// Every attribute is optional; blank strings are treated the same as
/// missing ones when filling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    // Identity
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,

    // Address
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,

    // Documents
    /// Base64 encoded PDF, never written into a form control
    pub resume_file: Option<String>,
    pub cover_letter: Option<String>,

    // Payment
    pub enable_payment: bool,
    pub card_number: Option<String>,
    pub exp_date: Option<String>,
    pub cvv: Option<String>,
    pub cardholder_name: Option<String>,

    // Education
    pub school: Option<String>,
    pub degree: Option<String>,
    pub education_start_month: Option<String>,
    pub education_start_year: Option<String>,
    pub education_end_month: Option<String>,
    pub education_end_year: Option<String>,

    // Social profiles
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
}

impl UserProfile {
    /// Load a profile from a JSON or TOML file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Ok(toml::from_str(&content)?),
        }
    }

    /// The raw attribute backing a category.
    fn attribute(&self, category: FieldCategory) -> Option<&String> {
        match category {
            FieldCategory::FirstName => self.first_name.as_ref(),
            FieldCategory::LastName => self.last_name.as_ref(),
            FieldCategory::FullName => self.full_name.as_ref(),
            FieldCategory::Email => self.email.as_ref(),
            FieldCategory::Phone => self.phone.as_ref(),
            FieldCategory::Address => self.street_address.as_ref(),
            FieldCategory::City => self.city.as_ref(),
            FieldCategory::State => self.state.as_ref(),
            FieldCategory::ZipCode => self.zip_code.as_ref(),
            FieldCategory::Country => self.country.as_ref(),
            FieldCategory::CardNumber => self.card_number.as_ref(),
            FieldCategory::ExpDate => self.exp_date.as_ref(),
            FieldCategory::Cvv => self.cvv.as_ref(),
            FieldCategory::CardholderName => self.cardholder_name.as_ref(),
            FieldCategory::Gender => self.gender.as_ref(),
            FieldCategory::CoverLetter => self.cover_letter.as_ref(),
            FieldCategory::School => self.school.as_ref(),
            FieldCategory::Degree => self.degree.as_ref(),
            FieldCategory::LinkedinUrl => self.linkedin_url.as_ref(),
            FieldCategory::GithubUrl => self.github_url.as_ref(),
        }
    }

    /// Value to write for a category, if the profile has a non-blank one.
    pub fn value_for(&self, category: FieldCategory) -> Option<&str> {
        self.attribute(category)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Categories this profile can supply a value for.
    pub fn populated_categories(&self) -> Vec<FieldCategory> {
        FieldCategory::ALL
            .into_iter()
            .filter(|category| self.value_for(*category).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_absent() {
        let profile = UserProfile {
            first_name: Some("Ana".into()),
            last_name: Some("   ".into()),
            ..UserProfile::default()
        };
        assert_eq!(profile.value_for(FieldCategory::FirstName), Some("Ana"));
        assert_eq!(profile.value_for(FieldCategory::LastName), None);
        assert_eq!(profile.value_for(FieldCategory::Email), None);
    }

    #[test]
    fn test_address_reads_street_address() {
        let profile = UserProfile {
            street_address: Some("1 Main St".into()),
            ..UserProfile::default()
        };
        assert_eq!(profile.value_for(FieldCategory::Address), Some("1 Main St"));
        assert_eq!(profile.populated_categories(), vec![FieldCategory::Address]);
    }

    #[test]
    fn test_deserialize_camel_case_json() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"firstName":"Ana","email":"a@x.com","cvv":"123","enablePayment":false}"#,
        )
        .unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Ana"));
        assert_eq!(profile.cvv.as_deref(), Some("123"));
        assert!(!profile.enable_payment);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "firstName = \"Ana\"\nenablePayment = true\n").unwrap();

        let profile = UserProfile::load(&path).unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Ana"));
        assert!(profile.enable_payment);
    }
}
