use super::fee_structure::FeeStructure;
use super::payment::Payment;
use super::student::Student;
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for student records, keyed by student id.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Inserts or replaces the student with the same id.
    async fn store(&self, student: Student) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Student>>;
    async fn list(&self) -> Result<Vec<Student>>;
    /// Returns `false` when no student had this id.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Persistence for fee structures, keyed by structure id.
#[async_trait]
pub trait FeeStructureRepository: Send + Sync {
    async fn store(&self, structure: FeeStructure) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<FeeStructure>>;
    async fn list(&self) -> Result<Vec<FeeStructure>>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Append-only ledger of recorded payments, keyed by receipt number.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Fails with `FeeError::DuplicateReceipt` if the receipt number is taken.
    async fn append(&self, payment: Payment) -> Result<()>;
    async fn get(&self, receipt_number: &str) -> Result<Option<Payment>>;
    async fn list(&self) -> Result<Vec<Payment>>;
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

pub type StudentRepositoryBox = Box<dyn StudentRepository>;
pub type FeeStructureRepositoryBox = Box<dyn FeeStructureRepository>;
pub type PaymentLedgerBox = Box<dyn PaymentLedger>;

pub type PaymentLedgerFactory = Box<dyn Fn() -> PaymentLedgerBox + Send + Sync>;
