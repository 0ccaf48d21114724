//! Attendance core: status rules, the per-day check-in/check-out state
//! machine, and the rollups built on top of stored records.

pub mod aggregate;
pub mod clock;
pub mod error;
pub mod reports;
pub mod rules;
pub mod store;
pub mod transition;

#[cfg(test)]
pub mod testing;
