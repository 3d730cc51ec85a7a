use super::aggregation::{
    ClassSummaries, GlobalStats, MonthlyCollection, PaymentMethodDistribution,
    compute_class_summaries, compute_global_stats, compute_monthly_collection,
    compute_payment_method_distribution, recent_payments,
};
use crate::domain::payment::Payment;
use crate::domain::snapshot::Snapshot;
use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const RECENT_PAYMENT_LIMIT: usize = 5;

/// Everything the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub reference_date: NaiveDate,
    pub stats: GlobalStats,
    pub classes: ClassSummaries,
    pub monthly: MonthlyCollection,
    pub payment_methods: PaymentMethodDistribution,
    pub recent_payments: Vec<Payment>,
}

impl DashboardReport {
    pub fn build(snapshot: &Snapshot, reference_date: NaiveDate) -> Result<Self> {
        let Snapshot {
            students,
            fee_structures,
            payments,
        } = snapshot;

        Ok(Self {
            reference_date,
            stats: compute_global_stats(students, fee_structures, payments, reference_date)?,
            classes: compute_class_summaries(students, fee_structures, payments)?,
            monthly: compute_monthly_collection(payments, reference_date.year())?,
            payment_methods: compute_payment_method_distribution(payments)?,
            recent_payments: recent_payments(payments, RECENT_PAYMENT_LIMIT)
                .into_iter()
                .cloned()
                .collect(),
        })
    }
}
