use crate::domain::class_label::ClassLabel;
use crate::domain::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::domain::student::Student;
use std::collections::BTreeSet;

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Filter over the payment list. Unset fields match everything.
#[derive(Debug, Default, Clone)]
pub struct PaymentQuery {
    /// Matched against student name and roll number, ignoring case.
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    /// Matched against the class snapshot on the payment.
    pub class: Option<ClassLabel>,
}

impl PaymentQuery {
    pub fn matches(&self, payment: &Payment) -> bool {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let matches_search = search.is_none_or(|term| {
            contains_ignore_case(&payment.student_name, &term)
                || contains_ignore_case(&payment.roll_number, &term)
        });

        matches_search
            && self.status.is_none_or(|status| payment.status == status)
            && self.method.is_none_or(|method| payment.payment_method == method)
            && self
                .class
                .as_ref()
                .is_none_or(|class| payment.student_class.as_ref() == Some(class))
    }

    pub fn apply<'a>(&self, payments: &'a [Payment]) -> Vec<&'a Payment> {
        payments.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Filter over the student list. Unset fields match everything.
#[derive(Debug, Default, Clone)]
pub struct StudentQuery {
    /// Matched against name, roll number and father's name, ignoring case.
    pub search: Option<String>,
    pub class: Option<ClassLabel>,
}

impl StudentQuery {
    pub fn matches(&self, student: &Student) -> bool {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let matches_search = search.is_none_or(|term| {
            contains_ignore_case(&student.name, &term)
                || contains_ignore_case(&student.roll_number, &term)
                || contains_ignore_case(&student.father_name, &term)
        });

        matches_search && self.class.as_ref().is_none_or(|class| &student.class == class)
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        students.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Distinct class labels of `students`, in class order.
pub fn available_classes(students: &[Student]) -> Vec<ClassLabel> {
    students
        .iter()
        .map(|s| s.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
