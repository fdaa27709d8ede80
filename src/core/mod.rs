pub mod traits;
pub mod policy;
pub mod auditor;
pub mod scheduler;

pub use traits::{AlertSink, ChainReader};
pub use policy::{assess, Exposure};
pub use auditor::{AuditConfig, ExposureAuditor};
pub use scheduler::{AuditScheduler, SchedulerStats};

#[cfg(test)]
pub(crate) mod testing;
