use super::class_label::ClassLabel;
use super::fee_structure::FeeStructure;
use super::money::Money;
use super::student::Student;
use crate::error::{FeeError, RecordKind, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Cheque,
    Online,
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Cheque,
        PaymentMethod::Online,
        PaymentMethod::BankTransfer,
    ];

    /// Human readable name, e.g. `"bank transfer"`.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Online => "online",
            PaymentMethod::BankTransfer => "bank transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    /// Accepts the serialized names, plus `"bank transfer"`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "cheque" => Ok(PaymentMethod::Cheque),
            "online" => Ok(PaymentMethod::Online),
            "bank_transfer" | "bank transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Pending,
}

impl PaymentStatus {
    /// `Paid` once `paid` covers `due`, otherwise `Partial`.
    pub fn derive(paid: Money, due: Money) -> Self {
        if paid >= due {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Partial
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Pending => "pending",
        };
        f.write_str(name)
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "partial" => Ok(PaymentStatus::Partial),
            "pending" => Ok(PaymentStatus::Pending),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

/// Money applied to a single fee item within a payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentItem {
    pub fee_item_id: String,
    #[serde(default)]
    pub name: String,
    /// Amount of the fee item at the time of payment.
    pub amount: Money,
    pub paid_amount: Money,
    pub status: PaymentStatus,
}

/// A recorded fee payment. Payments form an append-only ledger.
///
/// Student name, roll number and class are snapshots taken when the payment was
/// recorded, so receipts stay stable when the student record changes later.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_class: Option<ClassLabel>,
    #[serde(default)]
    pub fee_items: Vec<PaymentItem>,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub receipt_number: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// The amount a payer applies to one fee item.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeeSelection {
    pub fee_item_id: String,
    pub amount: Money,
}

/// A payment as entered, before it is checked against the fee structure and
/// given a receipt number.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub student_id: String,
    pub selections: Vec<FeeSelection>,
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl Payment {
    /// Builds a payment from a draft against the student's fee structure.
    pub fn record(
        draft: PaymentDraft,
        student: &Student,
        structure: &FeeStructure,
        receipt_number: String,
    ) -> Result<Self> {
        if draft.selections.is_empty() {
            return Err(FeeError::invalid(
                RecordKind::Payment,
                &receipt_number,
                "no fee items selected",
            ));
        }

        let mut fee_items = Vec::with_capacity(draft.selections.len());
        for selection in draft.selections {
            if selection.amount.is_negative() {
                return Err(FeeError::invalid(
                    RecordKind::PaymentItem,
                    &selection.fee_item_id,
                    format!("negative amount {}", selection.amount),
                ));
            }
            let fee = structure.fee_item(&selection.fee_item_id).ok_or_else(|| {
                FeeError::invalid(
                    RecordKind::PaymentItem,
                    &selection.fee_item_id,
                    format!("not part of fee structure '{}'", structure.id),
                )
            })?;
            fee_items.push(PaymentItem {
                fee_item_id: fee.id.clone(),
                name: fee.name.clone(),
                amount: fee.amount,
                paid_amount: selection.amount,
                status: PaymentStatus::derive(selection.amount, fee.amount),
            });
        }

        let total_amount = structure.total_amount()?;
        let paid_amount = Money::try_sum(fee_items.iter().map(|item| item.paid_amount))?;

        Ok(Self {
            id: receipt_number.clone(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            roll_number: student.roll_number.clone(),
            student_class: Some(student.class.clone()),
            fee_items,
            total_amount,
            paid_amount,
            payment_date: draft.payment_date,
            payment_method: draft.method,
            status: PaymentStatus::derive(paid_amount, total_amount),
            receipt_number,
            academic_year: structure.academic_year.clone(),
            remarks: draft.remarks,
        })
    }

    /// The class snapshot, ignoring blank labels.
    pub fn class_snapshot(&self) -> Option<&ClassLabel> {
        self.student_class.as_ref().filter(|class| !class.is_blank())
    }

    pub fn validate(&self) -> Result<()> {
        let id = &self.receipt_number;
        if id.trim().is_empty() {
            return Err(FeeError::invalid(RecordKind::Payment, &self.id, "missing receipt number"));
        }
        if self.student_id.trim().is_empty() {
            return Err(FeeError::invalid(RecordKind::Payment, id, "missing student id"));
        }
        if self.paid_amount.is_negative() {
            return Err(FeeError::invalid(
                RecordKind::Payment,
                id,
                format!("negative paid amount {}", self.paid_amount),
            ));
        }
        if self.total_amount.is_negative() {
            return Err(FeeError::invalid(
                RecordKind::Payment,
                id,
                format!("negative total amount {}", self.total_amount),
            ));
        }
        for item in &self.fee_items {
            if item.amount.is_negative() || item.paid_amount.is_negative() {
                return Err(FeeError::invalid(
                    RecordKind::PaymentItem,
                    &item.fee_item_id,
                    format!("negative amount in payment '{}'", id),
                ));
            }
        }
        Ok(())
    }
}
