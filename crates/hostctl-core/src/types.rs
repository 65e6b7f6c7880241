use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of host resource a provisioning operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Domain,
    SystemUser,
    Mailbox,
    MailAlias,
    Certificate,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Domain => "domain",
            Self::SystemUser => "system-user",
            Self::Mailbox => "mailbox",
            Self::MailAlias => "mail-alias",
            Self::Certificate => "certificate",
        };
        write!(f, "{s}")
    }
}

/// Reference to one concrete resource, e.g. the domain `example.org`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceRef {
    #[must_use]
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Identity performing a provisioning operation, as seen by the audit trail.
///
/// This is the panel-level identity (an admin account or API token name),
/// not the OS identity commands may run under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor(String);

impl Actor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_kind_displays_kebab_case() {
        assert_eq!(ResourceKind::SystemUser.to_string(), "system-user");
        assert_eq!(ResourceKind::Domain.to_string(), "domain");
    }

    #[test]
    fn resource_ref_displays_kind_and_id() {
        let r = ResourceRef::new(ResourceKind::Domain, "example.org");

        assert_eq!(r.to_string(), "domain:example.org");
    }

    #[test]
    fn actor_exposes_name() {
        let actor = Actor::new("admin@panel");

        assert_eq!(actor.name(), "admin@panel");
        assert_eq!(actor.to_string(), "admin@panel");
    }
}
