pub mod checkins;
pub mod health;
