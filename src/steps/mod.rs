pub mod convert;
pub mod list;

use crate::error::Result;

/// A unit of work in a plan. The runner calls `prepare` on every step before
/// calling `execute`, and stops at the first error.
pub trait Step {
    /// Validate inputs and build whatever `execute` needs. No cluster side
    /// effects.
    fn prepare(&mut self) -> Result<()>;

    fn execute(&mut self) -> Result<()>;
}
