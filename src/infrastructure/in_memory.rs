use crate::domain::fee_structure::FeeStructure;
use crate::domain::payment::Payment;
use crate::domain::ports::{FeeStructureRepository, PaymentLedger, StudentRepository};
use crate::domain::student::Student;
use crate::error::{FeeError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for students.
///
/// Uses `Arc<RwLock<BTreeMap<String, Student>>>` so clones share state and
/// listings come back in id order.
#[derive(Default, Clone)]
pub struct InMemoryStudentRepository {
    students: Arc<RwLock<BTreeMap<String, Student>>>,
}

impl InMemoryStudentRepository {
    /// Creates a new, empty in-memory student store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    async fn store(&self, student: Student) -> Result<()> {
        let mut students = self.students.write().await;
        students.insert(student.id.clone(), student);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Student>> {
        let students = self.students.read().await;
        Ok(students.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Student>> {
        let students = self.students.read().await;
        Ok(students.values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut students = self.students.write().await;
        Ok(students.remove(id).is_some())
    }
}

/// A thread-safe in-memory store for fee structures.
#[derive(Default, Clone)]
pub struct InMemoryFeeStructureRepository {
    structures: Arc<RwLock<BTreeMap<String, FeeStructure>>>,
}

impl InMemoryFeeStructureRepository {
    /// Creates a new, empty in-memory fee structure store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeeStructureRepository for InMemoryFeeStructureRepository {
    async fn store(&self, structure: FeeStructure) -> Result<()> {
        let mut structures = self.structures.write().await;
        structures.insert(structure.id.clone(), structure);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<FeeStructure>> {
        let structures = self.structures.read().await;
        Ok(structures.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<FeeStructure>> {
        let structures = self.structures.read().await;
        Ok(structures.values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut structures = self.structures.write().await;
        Ok(structures.remove(id).is_some())
    }
}

#[derive(Default)]
struct LedgerState {
    payments: Vec<Payment>,
    by_receipt: HashMap<String, usize>,
}

/// A thread-safe in-memory payment ledger.
///
/// Payments are kept in append order; the receipt index rejects duplicates.
#[derive(Default, Clone)]
pub struct InMemoryPaymentLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryPaymentLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn append(&self, payment: Payment) -> Result<()> {
        let mut state = self.state.write().await;
        if state.by_receipt.contains_key(&payment.receipt_number) {
            return Err(FeeError::DuplicateReceipt(payment.receipt_number));
        }
        let position = state.payments.len();
        state.by_receipt.insert(payment.receipt_number.clone(), position);
        state.payments.push(payment);
        Ok(())
    }

    async fn get(&self, receipt_number: &str) -> Result<Option<Payment>> {
        let state = self.state.read().await;
        Ok(state
            .by_receipt
            .get(receipt_number)
            .map(|&i| state.payments[i].clone()))
    }

    async fn list(&self) -> Result<Vec<Payment>> {
        let state = self.state.read().await;
        Ok(state.payments.clone())
    }

    async fn len(&self) -> Result<usize> {
        let state = self.state.read().await;
        Ok(state.payments.len())
    }
}
