//! # Record Module
//!
//! Defines CertificationRecord - a producer's cattle-brand registration
//! request - together with the status, breed, purpose, and department enums.
//! The legal status transitions live here so every consumer (engine,
//! aggregator, reports) reads the same table.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of a brand registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrandStatus {
    /// Newly registered, waiting for review
    Pending,
    /// Under active review
    InReview,
    /// Certification granted (terminal)
    Approved,
    /// Certification denied (terminal)
    Rejected,
}

impl BrandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrandStatus::Pending => "PENDING",
            BrandStatus::InReview => "IN_REVIEW",
            BrandStatus::Approved => "APPROVED",
            BrandStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(BrandStatus::Pending),
            "IN_REVIEW" => Some(BrandStatus::InReview),
            "APPROVED" => Some(BrandStatus::Approved),
            "REJECTED" => Some(BrandStatus::Rejected),
            _ => None,
        }
    }

    /// Statuses reachable from `self`.
    ///
    /// ```text
    /// PENDING   -> IN_REVIEW | APPROVED | REJECTED
    /// IN_REVIEW -> APPROVED | REJECTED
    /// APPROVED  -> (terminal)
    /// REJECTED  -> (terminal)
    /// ```
    pub fn successors(&self) -> &'static [BrandStatus] {
        match self {
            BrandStatus::Pending => &[
                BrandStatus::InReview,
                BrandStatus::Approved,
                BrandStatus::Rejected,
            ],
            BrandStatus::InReview => &[BrandStatus::Approved, BrandStatus::Rejected],
            BrandStatus::Approved | BrandStatus::Rejected => &[],
        }
    }

    /// True if the edge `self -> target` is in the transition table.
    pub fn can_transition_to(&self, target: BrandStatus) -> bool {
        self.successors().contains(&target)
    }

    /// Approved and Rejected admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BrandStatus::Approved | BrandStatus::Rejected)
    }

    pub fn all() -> [BrandStatus; 4] {
        [
            BrandStatus::Pending,
            BrandStatus::InReview,
            BrandStatus::Approved,
            BrandStatus::Rejected,
        ]
    }
}

impl fmt::Display for BrandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cattle breed declared on the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CattleBreed {
    Criollo,
    Nelore,
    Brahman,
    SantaGertrudis,
    Charolais,
    Holstein,
    Simmental,
    Angus,
    Hereford,
    Guzerat,
    Mixed,
    Other,
}

impl CattleBreed {
    pub fn as_str(&self) -> &'static str {
        match self {
            CattleBreed::Criollo => "CRIOLLO",
            CattleBreed::Nelore => "NELORE",
            CattleBreed::Brahman => "BRAHMAN",
            CattleBreed::SantaGertrudis => "SANTA_GERTRUDIS",
            CattleBreed::Charolais => "CHAROLAIS",
            CattleBreed::Holstein => "HOLSTEIN",
            CattleBreed::Simmental => "SIMMENTAL",
            CattleBreed::Angus => "ANGUS",
            CattleBreed::Hereford => "HEREFORD",
            CattleBreed::Guzerat => "GUZERAT",
            CattleBreed::Mixed => "MIXED",
            CattleBreed::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CRIOLLO" => Some(CattleBreed::Criollo),
            "NELORE" => Some(CattleBreed::Nelore),
            "BRAHMAN" => Some(CattleBreed::Brahman),
            "SANTA_GERTRUDIS" => Some(CattleBreed::SantaGertrudis),
            "CHAROLAIS" => Some(CattleBreed::Charolais),
            "HOLSTEIN" => Some(CattleBreed::Holstein),
            "SIMMENTAL" => Some(CattleBreed::Simmental),
            "ANGUS" => Some(CattleBreed::Angus),
            "HEREFORD" => Some(CattleBreed::Hereford),
            "GUZERAT" => Some(CattleBreed::Guzerat),
            "MIXED" => Some(CattleBreed::Mixed),
            "OTHER" => Some(CattleBreed::Other),
            _ => None,
        }
    }
}

impl fmt::Display for CattleBreed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declared purpose of the herd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CattlePurpose {
    Meat,
    Dairy,
    DualPurpose,
    Breeding,
}

impl CattlePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            CattlePurpose::Meat => "MEAT",
            CattlePurpose::Dairy => "DAIRY",
            CattlePurpose::DualPurpose => "DUAL_PURPOSE",
            CattlePurpose::Breeding => "BREEDING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MEAT" => Some(CattlePurpose::Meat),
            "DAIRY" => Some(CattlePurpose::Dairy),
            "DUAL_PURPOSE" | "DUAL" => Some(CattlePurpose::DualPurpose),
            "BREEDING" => Some(CattlePurpose::Breeding),
            _ => None,
        }
    }

    pub fn all() -> [CattlePurpose; 4] {
        [
            CattlePurpose::Meat,
            CattlePurpose::Dairy,
            CattlePurpose::DualPurpose,
            CattlePurpose::Breeding,
        ]
    }
}

impl fmt::Display for CattlePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Department (Bolivia) where the herd is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    LaPaz,
    SantaCruz,
    Cochabamba,
    Potosi,
    Oruro,
    Chuquisaca,
    Tarija,
    Beni,
    Pando,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::LaPaz => "LA_PAZ",
            Department::SantaCruz => "SANTA_CRUZ",
            Department::Cochabamba => "COCHABAMBA",
            Department::Potosi => "POTOSI",
            Department::Oruro => "ORURO",
            Department::Chuquisaca => "CHUQUISACA",
            Department::Tarija => "TARIJA",
            Department::Beni => "BENI",
            Department::Pando => "PANDO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "LA_PAZ" => Some(Department::LaPaz),
            "SANTA_CRUZ" => Some(Department::SantaCruz),
            "COCHABAMBA" => Some(Department::Cochabamba),
            "POTOSI" => Some(Department::Potosi),
            "ORURO" => Some(Department::Oruro),
            "CHUQUISACA" => Some(Department::Chuquisaca),
            "TARIJA" => Some(Department::Tarija),
            "BENI" => Some(Department::Beni),
            "PANDO" => Some(Department::Pando),
            _ => None,
        }
    }

    pub fn all() -> [Department; 9] {
        [
            Department::LaPaz,
            Department::SantaCruz,
            Department::Cochabamba,
            Department::Potosi,
            Department::Oruro,
            Department::Chuquisaca,
            Department::Tarija,
            Department::Beni,
            Department::Pando,
        ]
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A producer's brand-registration request.
///
/// Created Pending by the intake path; after that the status field is only
/// mutated through the transition engine, which also owns processed_at and
/// processing_hours. `version` is the optimistic-concurrency counter: 0 for
/// records never saved, bumped by the store on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationRecord {
    /// Record ID (MRC_0001, MRC_0002, ...)
    pub id: String,
    /// Brand number printed on the certificate, unique system-wide
    pub brand_number: String,
    /// Producer's full name
    pub owner_name: String,
    /// Producer's national identity number (CI)
    pub national_id: String,
    /// Producer's phone, if provided
    pub phone: Option<String>,
    pub breed: CattleBreed,
    pub purpose: CattlePurpose,
    /// Head of cattle covered by the brand, at least 1
    pub head_count: u32,
    pub department: Department,
    pub municipality: String,
    /// Rural community, if declared
    pub community: Option<String>,
    /// Certification fee in Bs
    pub certification_amount: Decimal,
    pub status: BrandStatus,
    /// Set at creation, immutable afterwards
    pub registered_at: DateTime<Utc>,
    /// Set exactly once, on the terminal transition
    pub processed_at: Option<DateTime<Utc>>,
    /// Ceiling of elapsed hours between registration and processing
    pub processing_hours: Option<i64>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Optimistic version; 0 until first saved
    pub version: i64,
}

impl CertificationRecord {
    /// Build a new Pending record, validating domain invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        brand_number: impl Into<String>,
        owner_name: impl Into<String>,
        national_id: impl Into<String>,
        breed: CattleBreed,
        purpose: CattlePurpose,
        head_count: u32,
        department: Department,
        municipality: impl Into<String>,
        certification_amount: Decimal,
        registered_at: DateTime<Utc>,
    ) -> CoreResult<Self> {
        let record = Self {
            id: id.into(),
            brand_number: brand_number.into(),
            owner_name: owner_name.into(),
            national_id: national_id.into(),
            phone: None,
            breed,
            purpose,
            head_count,
            department,
            municipality: municipality.into(),
            community: None,
            certification_amount,
            status: BrandStatus::Pending,
            registered_at,
            processed_at: None,
            processing_hours: None,
            notes: None,
            created_by: None,
            updated_at: None,
            version: 0,
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the domain invariants.
    pub fn validate(&self) -> CoreResult<()> {
        if self.brand_number.trim().is_empty() {
            return Err(CoreError::Validation(
                "brand number must not be empty".to_string(),
            ));
        }
        if self.head_count < 1 {
            return Err(CoreError::InvalidHeadCount(self.head_count as i64));
        }
        if self.certification_amount < Decimal::ZERO {
            return Err(CoreError::NegativeAmount(self.certification_amount));
        }
        if let Some(processed_at) = self.processed_at {
            if processed_at < self.registered_at {
                return Err(CoreError::ProcessedBeforeRegistered {
                    registered_at: self.registered_at,
                    processed_at,
                });
            }
        }
        Ok(())
    }

    /// True once a terminal decision has been recorded.
    pub fn is_processed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Generate an ID for a new record.
    pub fn generate_id(counter: u64) -> String {
        format!("MRC_{:04}", counter)
    }
}

impl fmt::Display for CertificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record {} (brand {}, {} head, {}, status: {})",
            self.id, self.brand_number, self.head_count, self.department, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_record() -> CertificationRecord {
        CertificationRecord::new(
            "MRC_0001",
            "BR-1001",
            "Ana Quispe",
            "4455667",
            CattleBreed::Nelore,
            CattlePurpose::Meat,
            50,
            Department::SantaCruz,
            "Warnes",
            dec!(350),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_record_creation() {
        let record = base_record();
        assert_eq!(record.status, BrandStatus::Pending);
        assert_eq!(record.version, 0);
        assert!(record.processed_at.is_none());
        assert!(record.processing_hours.is_none());
        assert!(!record.is_processed());
    }

    #[test]
    fn test_head_count_must_be_positive() {
        let err = CertificationRecord::new(
            "MRC_0002",
            "BR-1002",
            "Luis Mamani",
            "7788990",
            CattleBreed::Criollo,
            CattlePurpose::Dairy,
            0,
            Department::Beni,
            "Trinidad",
            dec!(100),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidHeadCount(0)));
    }

    #[test]
    fn test_amount_must_be_non_negative() {
        let err = CertificationRecord::new(
            "MRC_0003",
            "BR-1003",
            "Luis Mamani",
            "7788990",
            CattleBreed::Criollo,
            CattlePurpose::Dairy,
            5,
            Department::Beni,
            "Trinidad",
            dec!(-1),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::NegativeAmount(_)));
    }

    #[test]
    fn test_empty_brand_number_rejected() {
        let err = CertificationRecord::new(
            "MRC_0004",
            "  ",
            "Luis Mamani",
            "7788990",
            CattleBreed::Criollo,
            CattlePurpose::Dairy,
            5,
            Department::Beni,
            "Trinidad",
            dec!(10),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_processed_before_registered_rejected() {
        let mut record = base_record();
        record.processed_at = Some(record.registered_at - chrono::Duration::hours(1));
        assert!(matches!(
            record.validate(),
            Err(CoreError::ProcessedBeforeRegistered { .. })
        ));
    }

    #[test]
    fn test_transition_table() {
        use BrandStatus::*;
        assert!(Pending.can_transition_to(InReview));
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(InReview.can_transition_to(Approved));
        assert!(InReview.can_transition_to(Rejected));

        assert!(!Pending.can_transition_to(Pending));
        assert!(!InReview.can_transition_to(Pending));
        assert!(!InReview.can_transition_to(InReview));
        for status in BrandStatus::all() {
            assert!(!Approved.can_transition_to(status));
            assert!(!Rejected.can_transition_to(status));
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!BrandStatus::Pending.is_terminal());
        assert!(!BrandStatus::InReview.is_terminal());
        assert!(BrandStatus::Approved.is_terminal());
        assert!(BrandStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_round_trip() {
        for status in BrandStatus::all() {
            assert_eq!(BrandStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BrandStatus::parse("bogus"), None);
    }

    #[test]
    fn test_id_generation() {
        assert_eq!(CertificationRecord::generate_id(1), "MRC_0001");
        assert_eq!(CertificationRecord::generate_id(42), "MRC_0042");
        assert_eq!(CertificationRecord::generate_id(12345), "MRC_12345");
    }
}
