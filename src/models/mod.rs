pub mod earnings;

pub use earnings::{Amount, RawEarningsRecord};
