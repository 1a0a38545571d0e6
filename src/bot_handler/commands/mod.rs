pub mod calendar;
pub mod help;
pub mod start;
pub mod status;
