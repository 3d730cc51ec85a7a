use super::class_label::ClassLabel;
use crate::error::{FeeError, RecordKind, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An enrolled student.
///
/// Only `id` and `class` take part in fee aggregation; the remaining fields are
/// identity and contact details carried through for reports.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub name: String,
    pub class: ClassLabel,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub admission_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl Student {
    pub fn new(id: impl Into<String>, class: impl Into<ClassLabel>) -> Self {
        Self {
            id: id.into(),
            roll_number: String::new(),
            name: String::new(),
            class: class.into(),
            section: String::new(),
            father_name: String::new(),
            mother_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            date_of_birth: None,
            admission_date: None,
            profile_image: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(FeeError::invalid(RecordKind::Student, &self.id, "missing id"));
        }
        if self.class.is_blank() {
            return Err(FeeError::invalid(RecordKind::Student, &self.id, "missing class"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_deserialization_defaults_optional_fields() {
        let json = r#"{"id": "s1", "class": "5th", "name": "Asha", "rollNumber": "R-01"}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.id, "s1");
        assert_eq!(student.class, ClassLabel::from("5th"));
        assert_eq!(student.roll_number, "R-01");
        assert!(student.father_name.is_empty());
        assert_eq!(student.admission_date, None);
    }

    #[test]
    fn test_student_validation() {
        assert!(Student::new("s1", "5th").validate().is_ok());
        assert!(matches!(
            Student::new(" ", "5th").validate(),
            Err(FeeError::InvalidRecord { kind: RecordKind::Student, .. })
        ));
        assert!(matches!(
            Student::new("s2", "").validate(),
            Err(FeeError::InvalidRecord { .. })
        ));
    }
}
