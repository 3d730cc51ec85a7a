use super::aggregation::{StudentBalances, compute_student_balances};
use super::report::DashboardReport;
use crate::domain::fee_structure::FeeStructure;
use crate::domain::payment::{Payment, PaymentDraft};
use crate::domain::ports::{FeeStructureRepositoryBox, PaymentLedgerBox, StudentRepositoryBox};
use crate::domain::snapshot::Snapshot;
use crate::domain::student::Student;
use crate::error::{FeeError, RecordKind, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

const RECEIPT_ATTEMPTS: usize = 5;

/// Entry point for managing fee records and producing reports.
///
/// `FeeService` owns the storage backends. Each operation awaits its storage
/// calls before returning, so callers observe their own writes.
pub struct FeeService {
    students: StudentRepositoryBox,
    fee_structures: FeeStructureRepositoryBox,
    ledger: PaymentLedgerBox,
}

impl FeeService {
    /// Creates a new `FeeService` instance.
    ///
    /// # Arguments
    ///
    /// * `students` - The store for student records.
    /// * `fee_structures` - The store for fee structures.
    /// * `ledger` - The append-only payment ledger.
    pub fn new(
        students: StudentRepositoryBox,
        fee_structures: FeeStructureRepositoryBox,
        ledger: PaymentLedgerBox,
    ) -> Self {
        Self {
            students,
            fee_structures,
            ledger,
        }
    }

    pub async fn create_student(&self, student: Student) -> Result<()> {
        student.validate()?;
        if self.students.get(&student.id).await?.is_some() {
            return Err(FeeError::AlreadyExists {
                kind: RecordKind::Student,
                id: student.id,
            });
        }
        self.students.store(student).await
    }

    pub async fn update_student(&self, student: Student) -> Result<()> {
        student.validate()?;
        if self.students.get(&student.id).await?.is_none() {
            return Err(FeeError::not_found(RecordKind::Student, student.id));
        }
        self.students.store(student).await
    }

    /// Removes a student. Recorded payments keep their snapshot of the student.
    pub async fn delete_student(&self, id: &str) -> Result<()> {
        if self.students.delete(id).await? {
            Ok(())
        } else {
            Err(FeeError::not_found(RecordKind::Student, id))
        }
    }

    pub async fn list_students(&self) -> Result<Vec<Student>> {
        self.students.list().await
    }

    pub async fn create_fee_structure(&self, structure: FeeStructure) -> Result<()> {
        structure.validate()?;
        if self.fee_structures.get(&structure.id).await?.is_some() {
            return Err(FeeError::AlreadyExists {
                kind: RecordKind::FeeStructure,
                id: structure.id,
            });
        }
        self.fee_structures.store(structure).await
    }

    pub async fn update_fee_structure(&self, structure: FeeStructure) -> Result<()> {
        structure.validate()?;
        if self.fee_structures.get(&structure.id).await?.is_none() {
            return Err(FeeError::not_found(RecordKind::FeeStructure, structure.id));
        }
        self.fee_structures.store(structure).await
    }

    pub async fn delete_fee_structure(&self, id: &str) -> Result<()> {
        if self.fee_structures.delete(id).await? {
            Ok(())
        } else {
            Err(FeeError::not_found(RecordKind::FeeStructure, id))
        }
    }

    pub async fn list_fee_structures(&self) -> Result<Vec<FeeStructure>> {
        self.fee_structures.list().await
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        self.ledger.list().await
    }

    /// Records a payment against the fee structure of the student's class and
    /// appends it to the ledger under a fresh receipt number.
    ///
    /// The structure is the first one for the class in repository listing
    /// order. When a concurrent caller takes the chosen receipt number first,
    /// the next free number is tried, up to `RECEIPT_ATTEMPTS` times.
    pub async fn record_payment(&self, draft: PaymentDraft) -> Result<Payment> {
        let student = self
            .students
            .get(&draft.student_id)
            .await?
            .ok_or_else(|| FeeError::not_found(RecordKind::Student, &draft.student_id))?;

        let structures = self.fee_structures.list().await?;
        let structure = structures
            .iter()
            .find(|s| s.class == student.class)
            .ok_or_else(|| FeeError::not_found(RecordKind::FeeStructure, student.class.as_str()))?;

        let payment_date = draft.payment_date;
        let receipt_number = self.next_receipt_number(payment_date).await?;
        let mut payment = Payment::record(draft, &student, structure, receipt_number)?;

        let mut attempts = 1;
        loop {
            match self.ledger.append(payment.clone()).await {
                Ok(()) => break,
                Err(FeeError::DuplicateReceipt(taken)) if attempts < RECEIPT_ATTEMPTS => {
                    attempts += 1;
                    let receipt_number = self.next_receipt_number(payment_date).await?;
                    debug!(taken = %taken, retry = %receipt_number, "Receipt number taken, retrying");
                    payment.id = receipt_number.clone();
                    payment.receipt_number = receipt_number;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            receipt = %payment.receipt_number,
            student = %payment.student_id,
            paid = %payment.paid_amount,
            status = %payment.status,
            "Recorded payment"
        );
        Ok(payment)
    }

    /// `RCP-{yyyymmdd}-{seq}`, where `seq` starts after the ledger length and
    /// skips numbers already taken.
    async fn next_receipt_number(&self, date: NaiveDate) -> Result<String> {
        let mut seq = self.ledger.len().await? + 1;
        loop {
            let candidate = format!("RCP-{}-{:05}", date.format("%Y%m%d"), seq);
            if self.ledger.get(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            seq += 1;
        }
    }

    /// Stores every record of `snapshot`. Students and fee structures replace
    /// existing records with the same id; payments are appended.
    pub async fn import(&self, snapshot: Snapshot) -> Result<()> {
        let counts = (
            snapshot.students.len(),
            snapshot.fee_structures.len(),
            snapshot.payments.len(),
        );
        for student in snapshot.students {
            student.validate()?;
            self.students.store(student).await?;
        }
        for structure in snapshot.fee_structures {
            structure.validate()?;
            self.fee_structures.store(structure).await?;
        }
        for payment in snapshot.payments {
            payment.validate()?;
            self.ledger.append(payment).await?;
        }
        info!(
            students = counts.0,
            fee_structures = counts.1,
            payments = counts.2,
            "Imported snapshot"
        );
        Ok(())
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(
            self.students.list().await?,
            self.fee_structures.list().await?,
            self.ledger.list().await?,
        ))
    }

    pub async fn dashboard(&self, reference_date: NaiveDate) -> Result<DashboardReport> {
        DashboardReport::build(&self.snapshot().await?, reference_date)
    }

    pub async fn student_balances(&self, reference_date: NaiveDate) -> Result<StudentBalances> {
        let snapshot = self.snapshot().await?;
        compute_student_balances(
            &snapshot.students,
            &snapshot.fee_structures,
            &snapshot.payments,
            reference_date,
        )
    }
}
