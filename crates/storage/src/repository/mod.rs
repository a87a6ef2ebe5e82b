pub mod class;
pub mod points;
pub mod student;
