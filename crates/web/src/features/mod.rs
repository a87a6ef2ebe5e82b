pub mod classes;
pub mod leaderboard;
pub mod points;
