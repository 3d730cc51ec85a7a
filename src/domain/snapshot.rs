use super::fee_structure::FeeStructure;
use super::payment::Payment;
use super::student::Student;
use serde::{Deserialize, Serialize};

/// The three record collections as seen at one point in time.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub fee_structures: Vec<FeeStructure>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Snapshot {
    pub fn new(students: Vec<Student>, fee_structures: Vec<FeeStructure>, payments: Vec<Payment>) -> Self {
        Self {
            students,
            fee_structures,
            payments,
        }
    }
}
