pub mod domain;
pub mod error;
pub mod manifest;
pub mod quota;
pub mod result;

pub use domain::{DOMAIN_SUFFIX_TOKEN, derive_host, is_dns_label};
pub use error::{CoreError, ErrorCategory, Result};
pub use manifest::{
    API_VERSION, BuildSpec, EnvSpec, HealthCheckSpec, KIND_APPLICATION, Manifest, Metadata,
    PortSpec, ResourcesSpec, RoutingSpec, SecretRef, Source,
};
pub use quota::{ResourceSize, SizeQuota};
pub use result::{BatchOutcome, ReconcileOutcome, ReconciliationResult, RemovalOutcome, RemovalResult};
