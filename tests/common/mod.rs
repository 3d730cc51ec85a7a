#![allow(dead_code)]

use chrono::NaiveDate;
use feeledger::domain::fee_structure::{FeeItem, FeeStructure};
use feeledger::domain::money::Money;
use feeledger::domain::payment::{Payment, PaymentMethod, PaymentStatus};
use feeledger::domain::snapshot::Snapshot;
use feeledger::domain::student::Student;
use rand::Rng;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const CLASSES: [&str; 5] = ["1st", "2nd", "5th", "10th", "UKG"];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A random but well-formed snapshot.
///
/// Every class in `CLASSES` except the last has a fee structure. A few
/// payments reference students that do not exist.
pub fn generate_snapshot(students: usize, payments: usize) -> Snapshot {
    let mut rng = rand::thread_rng();

    let fee_structures: Vec<FeeStructure> = CLASSES[..CLASSES.len() - 1]
        .iter()
        .map(|class| {
            (0..rng.gen_range(1..=3)).fold(
                FeeStructure::new(format!("fs-{class}"), *class, "2024-25"),
                |structure, i| {
                    structure.with_fee(FeeItem {
                        id: format!("{class}-{i}"),
                        name: format!("Fee {i}"),
                        amount: Money::new(Decimal::new(rng.gen_range(0..200_000), 2)),
                        due_date: date(2024, rng.gen_range(1..=12), 15),
                        mandatory: i == 0,
                        description: None,
                    })
                },
            )
        })
        .collect();

    let students: Vec<Student> = (0..students)
        .map(|i| {
            let mut student = Student::new(format!("s{i}"), CLASSES[rng.gen_range(0..CLASSES.len())]);
            student.name = format!("Student {i}");
            student.roll_number = format!("R-{i:04}");
            student
        })
        .collect();

    let payments: Vec<Payment> = (0..payments)
        .map(|i| {
            let student_id = if rng.gen_bool(0.05) {
                format!("missing-{i}")
            } else {
                format!("s{}", rng.gen_range(0..students.len().max(1)))
            };
            let total = Money::new(Decimal::new(100_000, 2));
            let paid = Money::new(Decimal::new(rng.gen_range(0..150_000), 2));
            Payment {
                id: format!("p{i}"),
                student_id,
                student_name: String::new(),
                roll_number: String::new(),
                student_class: None,
                fee_items: Vec::new(),
                total_amount: total,
                paid_amount: paid,
                payment_date: date(rng.gen_range(2023..=2024), rng.gen_range(1..=12), rng.gen_range(1..=28)),
                payment_method: PaymentMethod::ALL[rng.gen_range(0..PaymentMethod::ALL.len())],
                status: PaymentStatus::derive(paid, total),
                receipt_number: format!("RCP{i:06}"),
                academic_year: "2024-25".to_string(),
                remarks: None,
            }
        })
        .collect();

    Snapshot::new(students, fee_structures, payments)
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), Error> {
    let file = File::create(path)?;
    serde_json::to_writer(file, snapshot)?;
    Ok(())
}
