use std::env;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

pub const CONFLICT_POLICY_VAR: &str = "INJECT_CONFLICT_POLICY";
pub const CONSTRUCTOR_ACCESS_VAR: &str = "INJECT_CONSTRUCTOR_ACCESS";

/// Which registrations a new registration is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ConflictPolicy {
    /// A key has at most one registration source, type or instance.
    #[default]
    Unified,
    /// Type registrations only check prior type registrations and instance
    /// registrations only check prior instances.
    PerTable,
}

/// Which constructors count when selecting the one to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ConstructorAccess {
    #[default]
    Public,
    Any,
}

/// Container configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerConfig {
    pub conflict_policy: ConflictPolicy,
    pub constructor_access: ConstructorAccess,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `INJECT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                CONFLICT_POLICY_VAR => {
                    config.conflict_policy = parse_or_default(key.as_ref(), value.as_ref())
                }
                CONSTRUCTOR_ACCESS_VAR => {
                    config.constructor_access = parse_or_default(key.as_ref(), value.as_ref())
                }
                _ => {}
            }
        }
        config
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_constructor_access(mut self, access: ConstructorAccess) -> Self {
        self.constructor_access = access;
        self
    }
}

fn parse_or_default<T>(key: &str, value: &str) -> T
where
    T: FromStr + Default + std::fmt::Display,
{
    T::from_str(value.trim()).unwrap_or_else(|_| {
        let fallback = T::default();
        tracing::warn!(%key, %value, %fallback, "Ignoring invalid configuration value");
        fallback
    })
}

impl ConstructorAccess {
    pub fn permits(self, visibility: crate::di::Visibility) -> bool {
        match self {
            ConstructorAccess::Public => visibility == crate::di::Visibility::Public,
            ConstructorAccess::Any => true,
        }
    }
}
