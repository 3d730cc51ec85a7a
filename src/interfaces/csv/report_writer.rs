use crate::application::aggregation::{ClassSummaries, StudentBalances};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

const CLASS_HEADERS: [&str; 6] = [
    "class",
    "total_students",
    "total_fees",
    "collected",
    "pending",
    "collection_rate",
];

const BALANCE_HEADERS: [&str; 7] = [
    "student_id",
    "name",
    "class",
    "expected",
    "paid",
    "pending",
    "status",
];

#[derive(Serialize)]
struct ClassRow<'a> {
    class: &'a str,
    total_students: usize,
    total_fees: String,
    collected: String,
    pending: String,
    collection_rate: String,
}

#[derive(Serialize)]
struct BalanceRow<'a> {
    student_id: &'a str,
    name: &'a str,
    class: &'a str,
    expected: String,
    paid: String,
    pending: String,
    status: String,
}

/// Writes aggregation results as CSV.
///
/// Headers are always written, even for empty reports. Amounts are written
/// without trailing zeros; collection rates are rounded to two decimal places.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(sink),
        }
    }

    /// One row per class, in class order.
    pub fn write_class_summaries(&mut self, summaries: &ClassSummaries) -> Result<()> {
        self.writer.write_record(CLASS_HEADERS)?;
        for (class, summary) in &summaries.classes {
            self.writer.serialize(ClassRow {
                class: class.as_str(),
                total_students: summary.total_students,
                total_fees: summary.total_fees.to_string(),
                collected: summary.collected.to_string(),
                pending: summary.pending.to_string(),
                collection_rate: summary.collection_rate.round_dp(2).normalize().to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_student_balances(&mut self, balances: &StudentBalances) -> Result<()> {
        self.writer.write_record(BALANCE_HEADERS)?;
        for balance in &balances.balances {
            self.writer.serialize(BalanceRow {
                student_id: &balance.student_id,
                name: &balance.name,
                class: balance.class.as_str(),
                expected: balance.expected.to_string(),
                paid: balance.paid.to_string(),
                pending: balance.pending.to_string(),
                status: balance.status.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
