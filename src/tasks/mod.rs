//! Background maintenance tasks.

mod policy_cleanup;

pub use policy_cleanup::PolicyCleanupTask;
