pub mod class;
pub mod ledger_entry;
pub mod points_total;
pub mod student;

pub use class::Class;
pub use ledger_entry::LedgerEntry;
pub use points_total::ClassPointsTotal;
pub use student::Student;
