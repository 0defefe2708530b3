//! Ephemeral warehouse principals

/// An ephemeral warehouse user created for the duration of a test run
///
/// The credential is generated once, used for both provisioning and the
/// workload connection, and lives only in process memory. It is excluded
/// from `Debug` output.
#[derive(Clone)]
pub struct Principal {
    name: String,
    credential: String,
    role: String,
}

impl Principal {
    /// Build the principal for ordinal `index`, named `<prefix>_<index + 1>`
    pub fn with_ordinal(
        prefix: &str,
        index: usize,
        credential: String,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: format!("{}_{}", prefix, index + 1),
            credential,
            role: role.into(),
        }
    }

    /// Warehouse-side user name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The login secret
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Role granted at provisioning and assumed by the workload session
    pub fn role(&self) -> &str {
        &self.role
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("name", &self.name)
            .field("credential", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
