//! Account policy: who may request how many resources of which class.

use serde::{Deserialize, Serialize};

use crate::core::resource::ResourceKind;
use crate::core::{WorkloadError, WorkloadResult};

/// Authorization tier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// Regular user.
    User,
    /// Operator with administrative actions.
    Operator,
    /// Full administrator.
    Administrator,
}

/// Resource policy class of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// CPU only, at most two resources per job.
    Default,
    /// At most four resources, two of each class.
    Research,
    /// Unlimited.
    Root,
}

/// Submitter identity as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique username; job ownership is keyed on it.
    pub username: String,
    /// Authorization tier.
    pub permission_level: PermissionLevel,
    /// Stored account type.
    pub account_type: AccountType,
}

impl User {
    /// Create a user record.
    pub fn new(
        username: impl Into<String>,
        permission_level: PermissionLevel,
        account_type: AccountType,
    ) -> Self {
        Self {
            username: username.into(),
            permission_level,
            account_type,
        }
    }

    /// Operators and administrators are always treated as root accounts.
    #[must_use]
    pub const fn effective_account_type(&self) -> AccountType {
        match self.permission_level {
            PermissionLevel::Operator | PermissionLevel::Administrator => AccountType::Root,
            PermissionLevel::User => self.account_type,
        }
    }
}

/// Per-job request bounds for one account type. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountLimits {
    /// Maximum number of requested resources.
    #[serde(default)]
    pub max_resources: Option<usize>,
    /// Maximum number of GPU resources.
    #[serde(default)]
    pub max_gpu: Option<usize>,
    /// Maximum number of CPU resources.
    #[serde(default)]
    pub max_cpu: Option<usize>,
}

impl AccountLimits {
    /// No bounds at all.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_resources: None,
            max_gpu: None,
            max_cpu: None,
        }
    }

    /// Reject requests with too many resources.
    pub fn check_count(&self, requested: usize) -> WorkloadResult<()> {
        match self.max_resources {
            Some(max) if requested > max => Err(WorkloadError::PolicyViolation(format!(
                "{requested} resources requested, at most {max} allowed"
            ))),
            _ => Ok(()),
        }
    }

    /// Reject requests whose class mix exceeds the per-class bounds.
    pub fn check_kinds(&self, kinds: &[ResourceKind]) -> WorkloadResult<()> {
        let gpus = kinds.iter().filter(|k| **k == ResourceKind::Gpu).count();
        let cpus = kinds.len() - gpus;
        if let Some(max) = self.max_gpu {
            if gpus > max {
                return Err(WorkloadError::PolicyViolation(format!(
                    "{gpus} GPU resources requested, at most {max} allowed"
                )));
            }
        }
        if let Some(max) = self.max_cpu {
            if cpus > max {
                return Err(WorkloadError::PolicyViolation(format!(
                    "{cpus} CPU resources requested, at most {max} allowed"
                )));
            }
        }
        Ok(())
    }

    /// Whether `max_gpu` and `max_cpu` fit inside `max_resources`.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        match self.max_resources {
            None => true,
            Some(max) => {
                let gpu_ok = match self.max_gpu {
                    Some(gpu) => gpu <= max,
                    None => true,
                };
                let cpu_ok = match self.max_cpu {
                    Some(cpu) => cpu <= max,
                    None => true,
                };
                gpu_ok && cpu_ok
            }
        }
    }
}

/// Limits for the bounded account types. Root accounts are never bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyLimits {
    /// Limits for [`AccountType::Default`].
    pub default: AccountLimits,
    /// Limits for [`AccountType::Research`].
    pub research: AccountLimits,
}

impl Default for PolicyLimits {
    fn default() -> Self {
        Self {
            default: AccountLimits {
                max_resources: Some(2),
                max_gpu: Some(0),
                max_cpu: None,
            },
            research: AccountLimits {
                max_resources: Some(4),
                max_gpu: Some(2),
                max_cpu: Some(2),
            },
        }
    }
}

impl PolicyLimits {
    /// Limits that apply to `account`.
    #[must_use]
    pub const fn limits_for(&self, account: AccountType) -> AccountLimits {
        match account {
            AccountType::Default => self.default,
            AccountType::Research => self.research,
            AccountType::Root => AccountLimits::unlimited(),
        }
    }
}
