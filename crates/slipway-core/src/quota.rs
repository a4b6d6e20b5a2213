use serde::{Deserialize, Serialize};

/// Declarable workload sizes. Manifests pick a size; raw cpu/memory limits
/// are never accepted from a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceSize {
    S,
    M,
    L,
}

/// Concrete resource limits applied to the remote application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeQuota {
    pub cpu_millicores: u32,
    pub memory_mb: u32,
}

impl ResourceSize {
    /// The fixed size -> (cpu, memory) quota table.
    pub fn quota(&self) -> SizeQuota {
        match self {
            Self::S => SizeQuota {
                cpu_millicores: 1000,
                memory_mb: 1024,
            },
            Self::M => SizeQuota {
                cpu_millicores: 2000,
                memory_mb: 2048,
            },
            Self::L => SizeQuota {
                cpu_millicores: 4000,
                memory_mb: 4096,
            },
        }
    }

    /// Whether this size should surface a large-footprint warning.
    pub fn is_large(&self) -> bool {
        matches!(self, Self::L)
    }
}

impl std::fmt::Display for ResourceSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::S => write!(f, "S"),
            Self::M => write!(f, "M"),
            Self::L => write!(f, "L"),
        }
    }
}
