use super::class_label::ClassLabel;
use super::money::Money;
use crate::error::{FeeError, RecordKind, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One named charge component of a fee structure, e.g. tuition.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeeItem {
    pub id: String,
    pub name: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The fees expected from every student of a class for one academic year.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeeStructure {
    pub id: String,
    pub class: ClassLabel,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default)]
    pub fees: Vec<FeeItem>,
    /// Total as stored upstream. It can drift from the items; use
    /// [`FeeStructure::total_amount`] instead.
    #[serde(default, rename = "totalAmount", skip_serializing_if = "Option::is_none")]
    pub stored_total: Option<Money>,
}

impl FeeStructure {
    pub fn new(id: impl Into<String>, class: impl Into<ClassLabel>, academic_year: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            academic_year: academic_year.into(),
            fees: Vec::new(),
            stored_total: None,
        }
    }

    pub fn with_fee(mut self, fee: FeeItem) -> Self {
        self.fees.push(fee);
        self
    }

    /// Sum of all fee item amounts, recomputed on every call.
    pub fn total_amount(&self) -> Result<Money> {
        Money::try_sum(self.fees.iter().map(|fee| fee.amount))
    }

    pub fn fee_item(&self, fee_item_id: &str) -> Option<&FeeItem> {
        self.fees.iter().find(|fee| fee.id == fee_item_id)
    }

    pub fn mandatory_count(&self) -> usize {
        self.fees.iter().filter(|fee| fee.mandatory).count()
    }

    pub fn optional_count(&self) -> usize {
        self.fees.len() - self.mandatory_count()
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(FeeError::invalid(RecordKind::FeeStructure, &self.id, "missing id"));
        }
        if self.class.is_blank() {
            return Err(FeeError::invalid(RecordKind::FeeStructure, &self.id, "missing class"));
        }
        for fee in &self.fees {
            if fee.id.trim().is_empty() {
                return Err(FeeError::invalid(
                    RecordKind::FeeItem,
                    &fee.id,
                    format!("missing id in fee structure '{}'", self.id),
                ));
            }
            if fee.amount.is_negative() {
                return Err(FeeError::invalid(
                    RecordKind::FeeItem,
                    &fee.id,
                    format!("negative amount {}", fee.amount),
                ));
            }
        }
        Ok(())
    }
}
