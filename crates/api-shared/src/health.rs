use crate::dto::{HealthRes, MessageRes};

/// Service banner shown at the API root.
pub const SERVICE_NAME: &str = "Patient Management System";

/// Simple health service shared by every transport.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Reports the service as alive.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "PMS is alive".into(),
        }
    }

    /// Greeting returned from the API root.
    pub fn banner() -> MessageRes {
        MessageRes {
            message: SERVICE_NAME.into(),
        }
    }
}
