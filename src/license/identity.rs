//! Process-scoped machine identity for floating-license binding.
//!
//! Containers have no stable hardware fingerprint, so each process generates
//! a fresh random code at startup and holds it for its lifetime. The
//! authority tracks the code as the holder of a floating slot; restarting
//! the process releases one identity and claims another on the next
//! activation.

use uuid::Uuid;

/// Unique identifier binding a license activation to this running instance.
///
/// Immutable for the process's lifetime; regenerated only by restarting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineIdentity(String);

impl MachineIdentity {
    /// Generate a fresh identity (UUIDv4, simple hex form).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Build an identity from a known code. Used when the code is supplied
    /// externally (tests, or an operator pinning the machine code).
    pub fn from_code(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MachineIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
