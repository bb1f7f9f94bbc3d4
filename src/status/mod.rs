//! Cattle lifecycle status model.
//!
//! An animal's status is a `(category, status)` pair. The category is a coarse
//! grouping (bull, young stock, mature stock) and the status is the label
//! within it. Only the pairs listed by [`StatusCategory::statuses`] are valid.

pub mod classifier;
pub mod memory;
pub mod repository;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::StatusError;

pub use classifier::{
    age_in_months, classify, parse_record_date, pregnancy_check_date, steaming_date, DATE_FORMAT,
};
pub use memory::InMemoryHerd;
pub use repository::{AnimalSnapshot, BreedingSnapshot, CalvingSnapshot, HerdRepository};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Bull,
    YoungStock,
    MatureStock,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 3] = [
        StatusCategory::Bull,
        StatusCategory::YoungStock,
        StatusCategory::MatureStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Bull => "bull",
            StatusCategory::YoungStock => "young_stock",
            StatusCategory::MatureStock => "mature_stock",
        }
    }

    /// Labels valid within this category.
    pub fn statuses(&self) -> &'static [CattleStatus] {
        match self {
            StatusCategory::Bull => &[
                CattleStatus::NewbornCalf,
                CattleStatus::WeanedCalf,
                CattleStatus::Yearling,
                CattleStatus::MatureBull,
            ],
            StatusCategory::YoungStock => &[
                CattleStatus::NewbornCalf,
                CattleStatus::Weaned,
                CattleStatus::BullyingHeifer,
                CattleStatus::InCalfHeifer,
            ],
            StatusCategory::MatureStock => &[
                CattleStatus::Lactating,
                CattleStatus::LactatingInCalf,
                CattleStatus::Dry,
            ],
        }
    }

    pub fn allows(&self, status: CattleStatus) -> bool {
        self.statuses().contains(&status)
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusCategory {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| StatusError::UnknownCategory(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CattleStatus {
    #[serde(rename = "newborn calf")]
    NewbornCalf,
    #[serde(rename = "weaned calf")]
    WeanedCalf,
    #[serde(rename = "weaned")]
    Weaned,
    #[serde(rename = "yearling")]
    Yearling,
    #[serde(rename = "mature bull")]
    MatureBull,
    #[serde(rename = "bullying heifer")]
    BullyingHeifer,
    #[serde(rename = "in_calf heifer")]
    InCalfHeifer,
    #[serde(rename = "lactating")]
    Lactating,
    #[serde(rename = "lactating in_calf")]
    LactatingInCalf,
    #[serde(rename = "dry")]
    Dry,
}

impl CattleStatus {
    pub const ALL: [CattleStatus; 10] = [
        CattleStatus::NewbornCalf,
        CattleStatus::WeanedCalf,
        CattleStatus::Weaned,
        CattleStatus::Yearling,
        CattleStatus::MatureBull,
        CattleStatus::BullyingHeifer,
        CattleStatus::InCalfHeifer,
        CattleStatus::Lactating,
        CattleStatus::LactatingInCalf,
        CattleStatus::Dry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CattleStatus::NewbornCalf => "newborn calf",
            CattleStatus::WeanedCalf => "weaned calf",
            CattleStatus::Weaned => "weaned",
            CattleStatus::Yearling => "yearling",
            CattleStatus::MatureBull => "mature bull",
            CattleStatus::BullyingHeifer => "bullying heifer",
            CattleStatus::InCalfHeifer => "in_calf heifer",
            CattleStatus::Lactating => "lactating",
            CattleStatus::LactatingInCalf => "lactating in_calf",
            CattleStatus::Dry => "dry",
        }
    }

    /// Cows that can be milked.
    pub fn is_milking(&self) -> bool {
        matches!(self, CattleStatus::Lactating | CattleStatus::LactatingInCalf)
    }
}

impl fmt::Display for CattleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CattleStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CattleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| StatusError::UnknownStatus(s.to_string()))
    }
}

/// A validated `(category, status)` pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: StatusCategory,
    pub status: CattleStatus,
}

impl Classification {
    pub fn new(category: StatusCategory, status: CattleStatus) -> Result<Self, StatusError> {
        if !category.allows(status) {
            return Err(StatusError::InvalidPair {
                category: category.as_str().to_string(),
                status: status.as_str().to_string(),
            });
        }
        Ok(Self { category, status })
    }

    /// Parse and validate a stored or submitted pair of labels.
    pub fn parse(category: &str, status: &str) -> Result<Self, StatusError> {
        let category: StatusCategory = category.parse()?;
        let parsed: CattleStatus = status.parse().map_err(|_| StatusError::InvalidPair {
            category: category.as_str().to_string(),
            status: status.to_string(),
        })?;
        Self::new(category, parsed)
    }

    // Only called with pairs from the status table.
    pub(crate) const fn of(category: StatusCategory, status: CattleStatus) -> Self {
        Self { category, status }
    }

    /// Whether a stored pair of labels already equals this classification.
    pub fn matches(&self, category: Option<&str>, status: Option<&str>) -> bool {
        category == Some(self.category.as_str()) && status == Some(self.status.as_str())
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.status)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M", alias = "male", alias = "Male")]
    Male,
    #[serde(rename = "F", alias = "female", alias = "Female")]
    Female,
}

impl Sex {
    /// Single-letter code stored on the cattle row.
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

impl FromStr for Sex {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            _ => Err(StatusError::UnknownSex(s.to_string())),
        }
    }
}
