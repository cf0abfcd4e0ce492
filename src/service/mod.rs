pub mod automation;
pub mod calendar;
pub mod finance;
