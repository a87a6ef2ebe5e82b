pub mod class;
pub mod common;
pub mod leaderboard;
pub mod points;
pub mod progress;
