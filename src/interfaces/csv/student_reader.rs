use crate::domain::student::Student;
use crate::error::{FeeError, Result};
use std::io::Read;

/// Reads student records from a CSV source.
///
/// Headers use the same camelCase names as the JSON snapshot (`id`,
/// `rollNumber`, `name`, `class`, ...). Whitespace is trimmed and columns other
/// than `id` and `class` may be left out.
pub struct StudentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> StudentReader<R> {
    /// Creates a new `StudentReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes students.
    pub fn students(self) -> impl Iterator<Item = Result<Student>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(FeeError::from))
    }
}
