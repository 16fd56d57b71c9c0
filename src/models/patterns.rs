// src/models/patterns.rs

//! Pattern tables that map free text to field categories.

use std::collections::BTreeMap;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::FieldCategory;

/// Built-in table name used when nothing else is selected.
pub const STANDARD_PROFILE: &str = "standard";

/// Built-in table that also recognizes education and social fields.
pub const ADVANCED_PROFILE: &str = "advanced";

/// Ordered regex patterns per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternTable {
    patterns: BTreeMap<FieldCategory, Vec<String>>,
}

impl PatternTable {
    /// The default identifier table.
    pub fn standard() -> Self {
        let mut table = Self::default();
        for (category, patterns) in defaults::STANDARD {
            table.insert(*category, patterns.iter().map(|p| p.to_string()).collect());
        }
        table
    }

    /// The standard table plus gender, cover letter, education and social profiles.
    pub fn advanced() -> Self {
        let mut table = Self::standard();
        for (category, patterns) in defaults::ADVANCED_EXTRAS {
            table.insert(*category, patterns.iter().map(|p| p.to_string()).collect());
        }
        table
    }

    /// Parse user-edited text: category key -> comma-separated patterns.
    ///
    /// Empty entries are dropped; a category left with no patterns is omitted.
    pub fn from_text(entries: &BTreeMap<String, String>) -> Result<Self> {
        let mut table = Self::default();
        for (key, text) in entries {
            let category: FieldCategory = key.parse()?;
            let patterns: Vec<String> = text
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            if !patterns.is_empty() {
                table.insert(category, patterns);
            }
        }
        Ok(table)
    }

    /// Render the table back into the comma-separated editing format.
    pub fn to_text(&self) -> BTreeMap<String, String> {
        self.patterns
            .iter()
            .map(|(category, patterns)| (category.key().to_string(), patterns.join(", ")))
            .collect()
    }

    /// Replace the patterns for a category.
    pub fn insert(&mut self, category: FieldCategory, patterns: Vec<String>) {
        self.patterns.insert(category, patterns);
    }

    /// Patterns for a category, in match order.
    pub fn get(&self, category: FieldCategory) -> Option<&[String]> {
        self.patterns.get(&category).map(Vec::as_slice)
    }

    /// Categories and their patterns, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldCategory, &[String])> {
        self.patterns
            .iter()
            .map(|(category, patterns)| (*category, patterns.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check that every pattern compiles.
    pub fn validate(&self) -> Result<()> {
        for (_, patterns) in self.iter() {
            for pattern in patterns {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| AppError::pattern(pattern, e))?;
            }
        }
        Ok(())
    }
}

/// Named pattern tables a user can pick from.
#[derive(Debug, Clone)]
pub struct MappingProfiles {
    tables: BTreeMap<String, PatternTable>,
}

impl Default for MappingProfiles {
    fn default() -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(STANDARD_PROFILE.to_string(), PatternTable::standard());
        tables.insert(ADVANCED_PROFILE.to_string(), PatternTable::advanced());
        Self { tables }
    }
}

impl MappingProfiles {
    /// Add or replace a user-defined table.
    pub fn insert_custom(&mut self, name: impl Into<String>, table: PatternTable) {
        self.tables.insert(name.into(), table);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Table for a profile name, falling back to the standard table.
    pub fn resolve(&self, name: &str) -> PatternTable {
        match self.tables.get(name) {
            Some(table) => table.clone(),
            None => {
                log::warn!(
                    "Mapping profile '{}' not found, using '{}'",
                    name,
                    STANDARD_PROFILE
                );
                PatternTable::standard()
            }
        }
    }

    /// Check every table's patterns.
    pub fn validate(&self) -> Result<()> {
        for (name, table) in &self.tables {
            table
                .validate()
                .map_err(|e| AppError::config(format!("Mapping profile '{name}': {e}")))?;
        }
        Ok(())
    }
}

mod defaults {
    use crate::models::FieldCategory;

    type Entry = (FieldCategory, &'static [&'static str]);

    pub const STANDARD: &[Entry] = &[
        (
            FieldCategory::FirstName,
            &["first.*name", "firstname", "first-name", "fname", "given.*name", "givenname"],
        ),
        (
            FieldCategory::LastName,
            &[
                "last.*name",
                "lastname",
                "last-name",
                "lname",
                "surname",
                "family.*name",
                "familyname",
            ],
        ),
        (
            FieldCategory::FullName,
            &["full.*name", "fullname", "name", "your.*name"],
        ),
        (FieldCategory::Email, &["email", "e-mail", "mail"]),
        (
            FieldCategory::Phone,
            &["phone", "telephone", "tel", "mobile", "cell"],
        ),
        (
            FieldCategory::Address,
            &["address", "street", "addr", "line1", "address1", "addressline1"],
        ),
        (FieldCategory::City, &["city", "town", "township"]),
        (
            FieldCategory::State,
            &["state", "province", "region", "county", "district"],
        ),
        (
            FieldCategory::ZipCode,
            &["zip", "postal", "postcode", "postalcode", "zip.*code"],
        ),
        (FieldCategory::Country, &["country", "nation"]),
        (
            FieldCategory::CardNumber,
            &[
                "card.*number",
                "cardnumber",
                "cc.*number",
                "ccnumber",
                "credit.*card",
                "creditcard",
            ],
        ),
        (
            FieldCategory::ExpDate,
            &["exp.*date", "expiry", "expiration", "cc-exp", "cc.*exp"],
        ),
        (
            FieldCategory::Cvv,
            &["cvv", "cvc", "csc", "cvv2", "security.*code", "securitycode"],
        ),
        (
            FieldCategory::CardholderName,
            &["cardholder", "cardholder.*name", "nameoncard", "name.*on.*card"],
        ),
    ];

    pub const ADVANCED_EXTRAS: &[Entry] = &[
        (FieldCategory::Gender, &["gender", "sex"]),
        (
            FieldCategory::CoverLetter,
            &["cover.*letter", "coverletter", "motivation"],
        ),
        (
            FieldCategory::School,
            &["school", "university", "college", "institution"],
        ),
        (FieldCategory::Degree, &["degree", "qualification", "diploma"]),
        (FieldCategory::LinkedinUrl, &["linkedin"]),
        (FieldCategory::GithubUrl, &["github"]),
    ];
}
