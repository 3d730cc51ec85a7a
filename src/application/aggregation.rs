//! Fee collection aggregation.
//!
//! Every function here is a pure transform over borrowed snapshots of students,
//! fee structures and payments. Inputs are validated up front; records with
//! dangling references are left out of the affected bucket and reported through
//! [`Diagnostics`] instead of failing the call.

use crate::domain::class_label::ClassLabel;
use crate::domain::fee_structure::FeeStructure;
use crate::domain::money::Money;
use crate::domain::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::domain::student::Student;
use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Counts of records left out of an aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Students whose class has no fee structure.
    pub unmatched_students: usize,
    /// Payments that could not be tied to a bucket.
    pub unresolved_payments: usize,
    /// Fee structures ignored because an earlier one has the same class.
    pub duplicate_structures: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    pub total_students: usize,
    pub total_fees: Money,
    pub collected: Money,
    /// `total_fees - collected`; negative on overpayment.
    pub pending: Money,
    pub collection_rate: Decimal,
}

impl ClassSummary {
    fn empty() -> Self {
        Self {
            total_students: 0,
            total_fees: Money::ZERO,
            collected: Money::ZERO,
            pending: Money::ZERO,
            collection_rate: Decimal::ZERO,
        }
    }
}

/// Class buckets in [`ClassLabel`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummaries {
    pub classes: BTreeMap<ClassLabel, ClassSummary>,
    pub diagnostics: Diagnostics,
}

impl ClassSummaries {
    pub fn get(&self, class: &str) -> Option<&ClassSummary> {
        self.classes.get(&ClassLabel::from(class))
    }

    pub fn labels(&self) -> impl Iterator<Item = &ClassLabel> {
        self.classes.keys()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAmount {
    /// Calendar month, 1 = January.
    pub month: u32,
    pub label: &'static str,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCollection {
    pub year: i32,
    pub months: Vec<MonthlyAmount>,
    pub year_to_date_total: Money,
    /// Month with the highest amount; the earliest wins ties.
    pub best_month: u32,
    pub average_monthly: Money,
}

impl MonthlyCollection {
    pub fn amount_for(&self, month: u32) -> Option<Money> {
        self.months.iter().find(|m| m.month == month).map(|m| m.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalStats {
    pub total_students: usize,
    pub total_expected: Money,
    pub total_collected: Money,
    /// `total_expected - total_collected`; negative on overpayment.
    pub pending_amount: Money,
    pub collection_rate: Decimal,
    pub partial_payment_count: usize,
    pub this_month_collection: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodShare {
    pub method: PaymentMethod,
    pub count: usize,
    /// Share of the payment count. Shares may miss 100 by rounding.
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodDistribution {
    pub total_payments: usize,
    pub shares: Vec<MethodShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeItemBalance {
    pub fee_item_id: String,
    pub name: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub mandatory: bool,
    pub paid: Money,
    pub outstanding: Money,
    pub overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentBalance {
    pub student_id: String,
    pub name: String,
    pub roll_number: String,
    pub class: ClassLabel,
    pub expected: Money,
    pub paid: Money,
    pub pending: Money,
    pub status: PaymentStatus,
    pub items: Vec<FeeItemBalance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentBalances {
    pub balances: Vec<StudentBalance>,
    pub diagnostics: Diagnostics,
}

/// Fee structure lookup by class; the first structure for a class wins.
/// Totals are computed once per structure.
struct FeeIndex<'a> {
    by_class: HashMap<&'a ClassLabel, (&'a FeeStructure, Money)>,
    duplicates: usize,
}

impl<'a> FeeIndex<'a> {
    fn build(fee_structures: &'a [FeeStructure]) -> Result<Self> {
        let mut by_class = HashMap::with_capacity(fee_structures.len());
        let mut duplicates = 0;
        for structure in fee_structures {
            if by_class.contains_key(&structure.class) {
                warn!(
                    class = %structure.class,
                    structure = %structure.id,
                    "Ignoring duplicate fee structure for class"
                );
                duplicates += 1;
            } else {
                by_class.insert(&structure.class, (structure, structure.total_amount()?));
            }
        }
        Ok(Self { by_class, duplicates })
    }

    fn structure_for(&self, class: &ClassLabel) -> Option<&'a FeeStructure> {
        self.by_class.get(class).map(|(structure, _)| *structure)
    }

    fn expected_for(&self, class: &ClassLabel) -> Option<Money> {
        self.by_class.get(class).map(|(_, total)| *total)
    }
}

fn validate_students(students: &[Student]) -> Result<()> {
    students.iter().try_for_each(Student::validate)
}

fn validate_structures(fee_structures: &[FeeStructure]) -> Result<()> {
    fee_structures.iter().try_for_each(FeeStructure::validate)
}

fn validate_payments(payments: &[Payment]) -> Result<()> {
    payments.iter().try_for_each(Payment::validate)
}

fn student_index(students: &[Student]) -> HashMap<&str, &Student> {
    students.iter().map(|s| (s.id.as_str(), s)).collect()
}

fn log_exclusions(operation: &str, diagnostics: &Diagnostics) {
    if *diagnostics != Diagnostics::default() {
        debug!(
            operation,
            unmatched_students = diagnostics.unmatched_students,
            unresolved_payments = diagnostics.unresolved_payments,
            duplicate_structures = diagnostics.duplicate_structures,
            "Records excluded from aggregation"
        );
    }
}

/// Collection status per class.
///
/// Buckets exist for every class that has a fee structure. A payment is
/// attributed through its class snapshot when present, otherwise through
/// its student.
pub fn compute_class_summaries(
    students: &[Student],
    fee_structures: &[FeeStructure],
    payments: &[Payment],
) -> Result<ClassSummaries> {
    validate_students(students)?;
    validate_structures(fee_structures)?;
    validate_payments(payments)?;

    let index = FeeIndex::build(fee_structures)?;
    let mut diagnostics = Diagnostics {
        duplicate_structures: index.duplicates,
        ..Diagnostics::default()
    };

    let mut classes: BTreeMap<ClassLabel, ClassSummary> = index
        .by_class
        .keys()
        .map(|class| ((*class).clone(), ClassSummary::empty()))
        .collect();

    for student in students {
        match (index.expected_for(&student.class), classes.get_mut(&student.class)) {
            (Some(expected), Some(bucket)) => {
                bucket.total_students += 1;
                bucket.total_fees.try_add_assign(expected)?;
            }
            _ => diagnostics.unmatched_students += 1,
        }
    }

    let by_id = student_index(students);
    for payment in payments {
        let class = payment
            .class_snapshot()
            .or_else(|| by_id.get(payment.student_id.as_str()).map(|s| &s.class));
        match class.and_then(|class| classes.get_mut(class)) {
            Some(bucket) => bucket.collected.try_add_assign(payment.paid_amount)?,
            None => diagnostics.unresolved_payments += 1,
        }
    }

    for bucket in classes.values_mut() {
        bucket.pending = bucket.total_fees.checked_sub(bucket.collected)?;
        bucket.collection_rate = bucket.collected.percent_of(bucket.total_fees)?;
    }

    log_exclusions("class_summaries", &diagnostics);
    Ok(ClassSummaries {
        classes,
        diagnostics,
    })
}

/// Payments of `year` bucketed by the calendar month of their payment date.
pub fn compute_monthly_collection(payments: &[Payment], year: i32) -> Result<MonthlyCollection> {
    validate_payments(payments)?;

    let mut amounts = [Money::ZERO; 12];
    for payment in payments.iter().filter(|p| p.payment_date.year() == year) {
        amounts[payment.payment_date.month0() as usize].try_add_assign(payment.paid_amount)?;
    }

    let year_to_date_total = Money::try_sum(amounts)?;
    let mut best = 0;
    for (i, amount) in amounts.iter().enumerate() {
        if *amount > amounts[best] {
            best = i;
        }
    }

    let months = amounts
        .iter()
        .zip(MONTH_LABELS)
        .enumerate()
        .map(|(i, (amount, label))| MonthlyAmount {
            month: i as u32 + 1,
            label,
            amount: *amount,
        })
        .collect();

    Ok(MonthlyCollection {
        year,
        months,
        year_to_date_total,
        best_month: best as u32 + 1,
        average_monthly: year_to_date_total.split(12)?,
    })
}

/// School-wide totals.
///
/// Payments are summed directly, so a payment for an unknown student still
/// counts towards `total_collected`.
pub fn compute_global_stats(
    students: &[Student],
    fee_structures: &[FeeStructure],
    payments: &[Payment],
    reference_date: NaiveDate,
) -> Result<GlobalStats> {
    validate_students(students)?;
    validate_structures(fee_structures)?;
    validate_payments(payments)?;

    let index = FeeIndex::build(fee_structures)?;
    let total_expected = Money::try_sum(
        students
            .iter()
            .filter_map(|student| index.expected_for(&student.class)),
    )?;
    let total_collected = Money::try_sum(payments.iter().map(|p| p.paid_amount))?;
    let this_month_collection = Money::try_sum(
        payments
            .iter()
            .filter(|p| {
                p.payment_date.year() == reference_date.year()
                    && p.payment_date.month() == reference_date.month()
            })
            .map(|p| p.paid_amount),
    )?;

    Ok(GlobalStats {
        total_students: students.len(),
        total_expected,
        total_collected,
        pending_amount: total_expected.checked_sub(total_collected)?,
        collection_rate: total_collected.percent_of(total_expected)?,
        partial_payment_count: payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Partial)
            .count(),
        this_month_collection,
    })
}

/// Share of payments made with each method, in [`PaymentMethod::ALL`] order.
pub fn compute_payment_method_distribution(payments: &[Payment]) -> Result<PaymentMethodDistribution> {
    validate_payments(payments)?;

    let mut counts: HashMap<PaymentMethod, usize> = HashMap::new();
    for payment in payments {
        *counts.entry(payment.payment_method).or_default() += 1;
    }

    let total = payments.len();
    let shares = PaymentMethod::ALL
        .iter()
        .filter_map(|method| {
            counts.get(method).map(|&count| MethodShare {
                method: *method,
                count,
                percentage: Decimal::from(count) / Decimal::from(total) * Decimal::ONE_HUNDRED,
            })
        })
        .collect();

    Ok(PaymentMethodDistribution {
        total_payments: total,
        shares,
    })
}

/// Per-student reconciliation of expected fees against payments.
///
/// Item balances follow the student's fee structure; payment items for fee
/// items outside that structure only count towards the student's total.
pub fn compute_student_balances(
    students: &[Student],
    fee_structures: &[FeeStructure],
    payments: &[Payment],
    reference_date: NaiveDate,
) -> Result<StudentBalances> {
    validate_students(students)?;
    validate_structures(fee_structures)?;
    validate_payments(payments)?;

    let index = FeeIndex::build(fee_structures)?;
    let by_id = student_index(students);
    let mut diagnostics = Diagnostics {
        duplicate_structures: index.duplicates,
        ..Diagnostics::default()
    };

    let mut paid_by_student: HashMap<&str, Money> = HashMap::new();
    let mut paid_by_item: HashMap<(&str, &str), Money> = HashMap::new();
    for payment in payments {
        let Some(student) = by_id.get(payment.student_id.as_str()) else {
            diagnostics.unresolved_payments += 1;
            continue;
        };
        paid_by_student
            .entry(student.id.as_str())
            .or_default()
            .try_add_assign(payment.paid_amount)?;
        for item in &payment.fee_items {
            paid_by_item
                .entry((student.id.as_str(), item.fee_item_id.as_str()))
                .or_default()
                .try_add_assign(item.paid_amount)?;
        }
    }

    let mut balances = Vec::with_capacity(students.len());
    for student in students {
        let structure = index.structure_for(&student.class);
        if structure.is_none() {
            diagnostics.unmatched_students += 1;
        }
        let expected = index.expected_for(&student.class).unwrap_or_default();
        let paid = paid_by_student
            .get(student.id.as_str())
            .copied()
            .unwrap_or_default();
        let status = if paid >= expected {
            PaymentStatus::Paid
        } else if paid.is_positive() {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        };

        let mut items = Vec::new();
        for fee in structure.map(|s| s.fees.as_slice()).unwrap_or_default() {
            let paid = paid_by_item
                .get(&(student.id.as_str(), fee.id.as_str()))
                .copied()
                .unwrap_or_default();
            let outstanding = fee.amount.checked_sub(paid)?;
            items.push(FeeItemBalance {
                fee_item_id: fee.id.clone(),
                name: fee.name.clone(),
                amount: fee.amount,
                due_date: fee.due_date,
                mandatory: fee.mandatory,
                paid,
                outstanding,
                overdue: outstanding.is_positive() && fee.due_date < reference_date,
            });
        }

        balances.push(StudentBalance {
            student_id: student.id.clone(),
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
            class: student.class.clone(),
            expected,
            paid,
            pending: expected.checked_sub(paid)?,
            status,
            items,
        });
    }

    balances.sort_by(|a, b| {
        a.class
            .cmp(&b.class)
            .then_with(|| a.roll_number.cmp(&b.roll_number))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    log_exclusions("student_balances", &diagnostics);
    Ok(StudentBalances {
        balances,
        diagnostics,
    })
}

/// The `limit` latest payments, newest first.
pub fn recent_payments(payments: &[Payment], limit: usize) -> Vec<&Payment> {
    let mut recent: Vec<&Payment> = payments.iter().collect();
    recent.sort_by(|a, b| {
        b.payment_date
            .cmp(&a.payment_date)
            .then_with(|| b.receipt_number.cmp(&a.receipt_number))
    });
    recent.truncate(limit);
    recent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fee_structure::FeeItem;
    use crate::error::FeeError;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fee(id: &str, amount: Decimal, due: NaiveDate) -> FeeItem {
        FeeItem {
            id: id.to_string(),
            name: id.to_string(),
            amount: Money::new(amount),
            due_date: due,
            mandatory: true,
            description: None,
        }
    }

    fn structure(class: &str, amounts: &[Decimal]) -> FeeStructure {
        amounts.iter().enumerate().fold(
            FeeStructure::new(format!("fs-{class}"), class, "2024-25"),
            |s, (i, amount)| s.with_fee(fee(&format!("{class}-f{i}"), *amount, date(2024, 4, 30))),
        )
    }

    fn payment(receipt: &str, student: &str, paid: Decimal, on: NaiveDate) -> Payment {
        Payment {
            id: receipt.to_string(),
            student_id: student.to_string(),
            student_name: String::new(),
            roll_number: String::new(),
            student_class: None,
            fee_items: Vec::new(),
            total_amount: Money::new(dec!(1000)),
            paid_amount: Money::new(paid),
            payment_date: on,
            payment_method: PaymentMethod::Cash,
            status: PaymentStatus::derive(Money::new(paid), Money::new(dec!(1000))),
            receipt_number: receipt.to_string(),
            academic_year: "2024-25".to_string(),
            remarks: None,
        }
    }

    #[test]
    fn test_single_class_scenario() {
        let students = vec![Student::new("s1", "5th")];
        let structures = vec![structure("5th", &[dec!(1000)])];
        let payments = vec![payment("r1", "s1", dec!(400), date(2024, 5, 1))];

        let summaries = compute_class_summaries(&students, &structures, &payments).unwrap();
        let bucket = summaries.get("5th").unwrap();
        assert_eq!(bucket.total_students, 1);
        assert_eq!(bucket.total_fees, Money::new(dec!(1000)));
        assert_eq!(bucket.collected, Money::new(dec!(400)));
        assert_eq!(bucket.pending, Money::new(dec!(600)));
        assert_eq!(bucket.collection_rate, dec!(40.0));
        assert_eq!(summaries.diagnostics, Diagnostics::default());
    }

    #[test]
    fn test_no_payments_leaves_everything_pending() {
        let students = vec![Student::new("s1", "5th"), Student::new("s2", "6th")];
        let structures = vec![structure("5th", &[dec!(1000)]), structure("6th", &[dec!(700), dec!(300)])];

        let summaries = compute_class_summaries(&students, &structures, &[]).unwrap();
        for bucket in summaries.classes.values() {
            assert_eq!(bucket.collected, Money::ZERO);
            assert_eq!(bucket.collection_rate, Decimal::ZERO);
            assert_eq!(bucket.pending, bucket.total_fees);
        }
    }

    #[test]
    fn test_overpayment_keeps_negative_pending() {
        let students = vec![Student::new("s1", "5th")];
        let structures = vec![structure("5th", &[dec!(1000)])];
        let payments = vec![
            payment("r1", "s1", dec!(800), date(2024, 5, 1)),
            payment("r2", "s1", dec!(500), date(2024, 6, 1)),
        ];

        let summaries = compute_class_summaries(&students, &structures, &payments).unwrap();
        let bucket = summaries.get("5th").unwrap();
        assert_eq!(bucket.pending, Money::new(dec!(-300)));
        assert_eq!(bucket.collection_rate, dec!(130));
    }

    #[test]
    fn test_zero_fee_class_has_zero_rate() {
        let students = vec![Student::new("s1", "KG")];
        let structures = vec![structure("KG", &[])];
        let payments = vec![payment("r1", "s1", dec!(50), date(2024, 5, 1))];

        let summaries = compute_class_summaries(&students, &structures, &payments).unwrap();
        let bucket = summaries.get("KG").unwrap();
        assert_eq!(bucket.collected, Money::new(dec!(50)));
        assert_eq!(bucket.collection_rate, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_student_excluded_from_classes_but_counted_globally() {
        let students = vec![Student::new("s1", "5th")];
        let structures = vec![structure("5th", &[dec!(1000)])];
        let payments = vec![
            payment("r1", "s1", dec!(400), date(2024, 5, 1)),
            payment("r2", "ghost", dec!(250), date(2024, 5, 2)),
        ];

        let summaries = compute_class_summaries(&students, &structures, &payments).unwrap();
        assert_eq!(summaries.get("5th").unwrap().collected, Money::new(dec!(400)));
        assert_eq!(summaries.diagnostics.unresolved_payments, 1);

        let stats = compute_global_stats(&students, &structures, &payments, date(2024, 5, 15)).unwrap();
        assert_eq!(stats.total_collected, Money::new(dec!(650)));
    }

    #[test]
    fn test_class_snapshot_takes_precedence_over_student_lookup() {
        let students = vec![Student::new("s1", "6th")];
        let structures = vec![structure("5th", &[dec!(1000)]), structure("6th", &[dec!(1200)])];
        let mut paid_in_5th = payment("r1", "s1", dec!(300), date(2024, 5, 1));
        paid_in_5th.student_class = Some(ClassLabel::from("5th"));
        let mut deleted_student = payment("r2", "gone", dec!(100), date(2024, 5, 1));
        deleted_student.student_class = Some(ClassLabel::from("6th"));

        let summaries =
            compute_class_summaries(&students, &structures, &[paid_in_5th, deleted_student]).unwrap();
        assert_eq!(summaries.get("5th").unwrap().collected, Money::new(dec!(300)));
        assert_eq!(summaries.get("6th").unwrap().collected, Money::new(dec!(100)));
        assert_eq!(summaries.diagnostics.unresolved_payments, 0);
    }

    #[test]
    fn test_unmatched_students_are_counted_not_bucketed() {
        let students = vec![Student::new("s1", "5th"), Student::new("s2", "9th")];
        let structures = vec![structure("5th", &[dec!(1000)])];

        let summaries = compute_class_summaries(&students, &structures, &[]).unwrap();
        assert_eq!(summaries.classes.len(), 1);
        assert_eq!(summaries.diagnostics.unmatched_students, 1);

        let stats = compute_global_stats(&students, &structures, &[], date(2024, 5, 1)).unwrap();
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_expected, Money::new(dec!(1000)));
    }

    #[test]
    fn test_duplicate_structure_first_wins() {
        let students = vec![Student::new("s1", "5th")];
        let structures = vec![structure("5th", &[dec!(1000)]), structure("5th", &[dec!(5000)])];

        let summaries = compute_class_summaries(&students, &structures, &[]).unwrap();
        assert_eq!(summaries.get("5th").unwrap().total_fees, Money::new(dec!(1000)));
        assert_eq!(summaries.diagnostics.duplicate_structures, 1);
    }

    #[test]
    fn test_class_order_is_numeric_then_lexicographic() {
        let structures = vec![
            structure("Nursery", &[]),
            structure("10th", &[]),
            structure("2nd", &[]),
            structure("LKG", &[]),
        ];
        let summaries = compute_class_summaries(&[], &structures, &[]).unwrap();
        let labels: Vec<&str> = summaries.labels().map(ClassLabel::as_str).collect();
        assert_eq!(labels, vec!["2nd", "10th", "LKG", "Nursery"]);
    }

    #[test]
    fn test_invalid_records_are_surfaced() {
        let structures = vec![structure("5th", &[dec!(-10)])];
        assert!(matches!(
            compute_class_summaries(&[], &structures, &[]),
            Err(FeeError::InvalidRecord { .. })
        ));

        let payments = vec![payment("r1", "s1", dec!(-1), date(2024, 1, 1))];
        assert!(compute_monthly_collection(&payments, 2024).is_err());
        assert!(compute_payment_method_distribution(&payments).is_err());
    }

    #[test]
    fn test_monthly_collection() {
        let payments = vec![
            payment("r1", "s1", dec!(100), date(2024, 1, 5)),
            payment("r2", "s1", dec!(300), date(2024, 3, 9)),
            payment("r3", "s2", dec!(300), date(2024, 7, 1)),
            payment("r4", "s2", dec!(999), date(2023, 3, 9)),
        ];

        let monthly = compute_monthly_collection(&payments, 2024).unwrap();
        assert_eq!(monthly.months.len(), 12);
        assert_eq!(monthly.months[0].label, "Jan");
        assert_eq!(monthly.amount_for(3), Some(Money::new(dec!(300))));
        assert_eq!(monthly.amount_for(2), Some(Money::ZERO));
        assert_eq!(monthly.year_to_date_total, Money::new(dec!(700)));
        // March and July tie; the earlier month wins.
        assert_eq!(monthly.best_month, 3);

        let bucket_total = Money::try_sum(monthly.months.iter().map(|m| m.amount)).unwrap();
        assert_eq!(bucket_total, monthly.year_to_date_total);
    }

    #[test]
    fn test_monthly_collection_empty_year() {
        let monthly = compute_monthly_collection(&[], 2024).unwrap();
        assert_eq!(monthly.year_to_date_total, Money::ZERO);
        assert_eq!(monthly.best_month, 1);
        assert_eq!(monthly.average_monthly, Money::ZERO);
    }

    #[test]
    fn test_global_stats() {
        let students = vec![Student::new("s1", "5th"), Student::new("s2", "5th")];
        let structures = vec![structure("5th", &[dec!(600), dec!(400)])];
        let payments = vec![
            payment("r1", "s1", dec!(1000), date(2024, 5, 1)),
            payment("r2", "s2", dec!(250), date(2024, 6, 3)),
            payment("r3", "s2", dec!(250), date(2023, 6, 3)),
        ];

        let stats = compute_global_stats(&students, &structures, &payments, date(2024, 6, 20)).unwrap();
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_expected, Money::new(dec!(2000)));
        assert_eq!(stats.total_collected, Money::new(dec!(1500)));
        assert_eq!(stats.pending_amount, Money::new(dec!(500)));
        assert_eq!(stats.collection_rate, dec!(75));
        assert_eq!(stats.partial_payment_count, 2);
        assert_eq!(stats.this_month_collection, Money::new(dec!(250)));
    }

    #[test]
    fn test_global_stats_without_fee_structures() {
        let students = vec![Student::new("s1", "5th")];
        let payments = vec![payment("r1", "s1", dec!(10), date(2024, 5, 1))];
        let stats = compute_global_stats(&students, &[], &payments, date(2024, 5, 1)).unwrap();
        assert_eq!(stats.total_expected, Money::ZERO);
        assert_eq!(stats.pending_amount, Money::new(dec!(-10)));
        assert_eq!(stats.collection_rate, Decimal::ZERO);
    }

    #[test]
    fn test_payment_method_distribution() {
        let mut payments = vec![
            payment("r1", "s1", dec!(1), date(2024, 1, 1)),
            payment("r2", "s1", dec!(1), date(2024, 1, 1)),
            payment("r3", "s1", dec!(1), date(2024, 1, 1)),
        ];
        payments[1].payment_method = PaymentMethod::BankTransfer;

        let distribution = compute_payment_method_distribution(&payments).unwrap();
        assert_eq!(distribution.total_payments, 3);
        assert_eq!(distribution.shares.len(), 2);
        assert_eq!(distribution.shares[0].method, PaymentMethod::Cash);
        assert_eq!(distribution.shares[0].count, 2);
        assert_eq!(distribution.shares[1].method, PaymentMethod::BankTransfer);

        let sum: Decimal = distribution.shares.iter().map(|s| s.percentage).sum();
        assert!((sum - dec!(100)).abs() <= dec!(0.1));
    }

    #[test]
    fn test_payment_method_distribution_empty() {
        let distribution = compute_payment_method_distribution(&[]).unwrap();
        assert_eq!(distribution.total_payments, 0);
        assert!(distribution.shares.is_empty());
    }

    #[test]
    fn test_student_balances() {
        let mut asha = Student::new("s1", "5th");
        asha.roll_number = "02".to_string();
        let mut ravi = Student::new("s2", "5th");
        ravi.roll_number = "01".to_string();
        let students = vec![asha, ravi, Student::new("s3", "3rd"), Student::new("s4", "9th")];
        let structures = vec![
            FeeStructure::new("fs5", "5th", "2024-25")
                .with_fee(fee("tuition", dec!(800), date(2024, 4, 30)))
                .with_fee(fee("library", dec!(200), date(2024, 8, 31))),
            structure("3rd", &[dec!(500)]),
        ];
        let mut p1 = payment("r1", "s1", dec!(500), date(2024, 5, 1));
        p1.fee_items = vec![crate::domain::payment::PaymentItem {
            fee_item_id: "tuition".to_string(),
            name: "Tuition".to_string(),
            amount: Money::new(dec!(800)),
            paid_amount: Money::new(dec!(500)),
            status: PaymentStatus::Partial,
        }];
        let p2 = payment("r2", "s3", dec!(500), date(2024, 5, 1));
        let p3 = payment("r3", "nobody", dec!(1), date(2024, 5, 1));

        let result =
            compute_student_balances(&students, &structures, &[p1, p2, p3], date(2024, 6, 1)).unwrap();
        let ids: Vec<&str> = result.balances.iter().map(|b| b.student_id.as_str()).collect();
        assert_eq!(ids, vec!["s3", "s2", "s1", "s4"]);
        assert_eq!(result.diagnostics.unresolved_payments, 1);
        assert_eq!(result.diagnostics.unmatched_students, 1);

        let asha = &result.balances[2];
        assert_eq!(asha.expected, Money::new(dec!(1000)));
        assert_eq!(asha.pending, Money::new(dec!(500)));
        assert_eq!(asha.status, PaymentStatus::Partial);
        assert_eq!(asha.items[0].outstanding, Money::new(dec!(300)));
        assert!(asha.items[0].overdue);
        assert!(!asha.items[1].overdue);

        assert_eq!(result.balances[0].status, PaymentStatus::Paid);
        assert_eq!(result.balances[1].status, PaymentStatus::Pending);
        // No structure means nothing is expected.
        assert_eq!(result.balances[3].status, PaymentStatus::Paid);
        assert!(result.balances[3].items.is_empty());
    }

    #[test]
    fn test_recent_payments() {
        let payments = vec![
            payment("r1", "s1", dec!(1), date(2024, 1, 1)),
            payment("r2", "s1", dec!(1), date(2024, 3, 1)),
            payment("r3", "s1", dec!(1), date(2024, 2, 1)),
            payment("r4", "s1", dec!(1), date(2024, 3, 1)),
        ];
        let recent: Vec<&str> = recent_payments(&payments, 3)
            .into_iter()
            .map(|p| p.receipt_number.as_str())
            .collect();
        assert_eq!(recent, vec!["r4", "r2", "r3"]);
        assert!(recent_payments(&[], 5).is_empty());
    }

    #[test]
    fn test_aggregations_are_idempotent() {
        let students = vec![Student::new("s1", "5th")];
        let structures = vec![structure("5th", &[dec!(1000)])];
        let payments = vec![payment("r1", "s1", dec!(400), date(2024, 5, 1))];
        let on = date(2024, 5, 1);

        assert_eq!(
            compute_class_summaries(&students, &structures, &payments).unwrap(),
            compute_class_summaries(&students, &structures, &payments).unwrap()
        );
        assert_eq!(
            compute_global_stats(&students, &structures, &payments, on).unwrap(),
            compute_global_stats(&students, &structures, &payments, on).unwrap()
        );
        assert_eq!(
            compute_student_balances(&students, &structures, &payments, on).unwrap(),
            compute_student_balances(&students, &structures, &payments, on).unwrap()
        );
    }
}
