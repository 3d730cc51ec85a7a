use crate::domain::fee_structure::FeeStructure;
use crate::domain::payment::Payment;
use crate::domain::ports::{FeeStructureRepository, PaymentLedger, StudentRepository};
use crate::domain::student::Student;
use crate::error::{FeeError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for student records, keyed by student id.
pub const CF_STUDENTS: &str = "students";
/// Column Family for fee structures, keyed by structure id.
pub const CF_FEE_STRUCTURES: &str = "fee_structures";
/// Column Family for payments, keyed by big-endian append sequence.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family mapping receipt numbers to payment sequence keys.
pub const CF_RECEIPTS: &str = "receipts";

/// A persistent store implementation using RocksDB.
///
/// Handles students, fee structures and the payment ledger using separate
/// Column Families. Payments are keyed by append sequence so listings keep
/// ledger order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    append_lock: Arc<Mutex<()>>,
}

fn internal(message: String) -> FeeError {
    FeeError::InternalError(Box::new(std::io::Error::other(message)))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| internal(format!("Serialization error: {}", e)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| internal(format!("Deserialization error: {}", e)))
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_STUDENTS, CF_FEE_STRUCTURES, CF_PAYMENTS, CF_RECEIPTS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            append_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| internal(format!("Column family '{}' not found", name)))
    }

    fn put_value<T: Serialize>(&self, family: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(family)?;
        self.db.put_cf(cf, key, encode(value)?)?;
        Ok(())
    }

    fn get_value<T: DeserializeOwned>(&self, family: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(family)?;
        match self.db.get_pinned_cf(cf, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list_values<T: DeserializeOwned>(&self, family: &str) -> Result<Vec<T>> {
        let cf = self.cf(family)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(decode(&value)?);
        }
        Ok(values)
    }

    fn delete_key(&self, family: &str, key: &[u8]) -> Result<bool> {
        let cf = self.cf(family)?;
        if self.db.get_pinned_cf(cf, key)?.is_none() {
            return Ok(false);
        }
        self.db.delete_cf(cf, key)?;
        Ok(true)
    }

    /// Sequence number that the next appended payment gets.
    fn next_sequence(&self) -> Result<u64> {
        let cf = self.cf(CF_PAYMENTS)?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _value) = item?;
                let bytes: [u8; 8] = key
                    .as_ref()
                    .try_into()
                    .map_err(|_| internal("Malformed payment sequence key".to_string()))?;
                Ok(u64::from_be_bytes(bytes) + 1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl StudentRepository for RocksDBStore {
    async fn store(&self, student: Student) -> Result<()> {
        self.put_value(CF_STUDENTS, student.id.as_bytes(), &student)
    }

    async fn get(&self, id: &str) -> Result<Option<Student>> {
        self.get_value(CF_STUDENTS, id.as_bytes())
    }

    async fn list(&self) -> Result<Vec<Student>> {
        self.list_values(CF_STUDENTS)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.delete_key(CF_STUDENTS, id.as_bytes())
    }
}

#[async_trait]
impl FeeStructureRepository for RocksDBStore {
    async fn store(&self, structure: FeeStructure) -> Result<()> {
        self.put_value(CF_FEE_STRUCTURES, structure.id.as_bytes(), &structure)
    }

    async fn get(&self, id: &str) -> Result<Option<FeeStructure>> {
        self.get_value(CF_FEE_STRUCTURES, id.as_bytes())
    }

    async fn list(&self) -> Result<Vec<FeeStructure>> {
        self.list_values(CF_FEE_STRUCTURES)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.delete_key(CF_FEE_STRUCTURES, id.as_bytes())
    }
}

#[async_trait]
impl PaymentLedger for RocksDBStore {
    async fn append(&self, payment: Payment) -> Result<()> {
        let _guard = self.append_lock.lock().await;

        let receipts = self.cf(CF_RECEIPTS)?;
        if self
            .db
            .get_pinned_cf(receipts, payment.receipt_number.as_bytes())?
            .is_some()
        {
            return Err(FeeError::DuplicateReceipt(payment.receipt_number));
        }

        let key = self.next_sequence()?.to_be_bytes();
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_PAYMENTS)?, key, encode(&payment)?);
        batch.put_cf(receipts, payment.receipt_number.as_bytes(), key);
        self.db.write(batch)?;

        Ok(())
    }

    async fn get(&self, receipt_number: &str) -> Result<Option<Payment>> {
        let receipts = self.cf(CF_RECEIPTS)?;
        match self.db.get_pinned_cf(receipts, receipt_number.as_bytes())? {
            Some(key) => self.get_value(CF_PAYMENTS, &key),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Payment>> {
        self.list_values(CF_PAYMENTS)
    }

    async fn len(&self) -> Result<usize> {
        let cf = self.cf(CF_PAYMENTS)?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }
}
