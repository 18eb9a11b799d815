pub mod catalog;
pub mod core;
pub mod data;
pub mod grades;
pub mod students;
pub mod transcript;
