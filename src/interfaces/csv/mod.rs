pub mod report_writer;
pub mod student_reader;
