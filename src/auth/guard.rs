//! Authorization guard: declarative access requirements over session claims.
//!
//! Every protected operation states what it needs as a [`Requirement`] and
//! asks for a [`Decision`] instead of re-deriving role/department logic per
//! handler. Checks are pure functions of the claims and the requirement; no
//! I/O happens here, which keeps them exhaustively unit-testable.

use crate::auth::token::SessionClaims;
use crate::types::DepartmentSlug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an account, ordered from least to most privileged.
///
/// The derived `Ord` gives the total order `Employee < Manager < Admin`
/// that [`Requirement::RoleAtLeast`] relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Why a requirement denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No verified claims were presented.
    Unauthenticated,
    /// The claims' role is strictly below the required role.
    InsufficientRole,
    /// The claims' department does not match, or is unset.
    WrongDepartment,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::InsufficientRole => write!(f, "insufficient role"),
            Self::WrongDepartment => write!(f, "wrong department"),
        }
    }
}

/// Outcome of evaluating a [`Requirement`] against claims.
///
/// Transient and per-request; never persisted. The HTTP layer may collapse
/// the denial reasons into a uniform response, but they stay distinguishable
/// here for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenialReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The denial reason, if denied.
    pub fn reason(&self) -> Option<DenialReason> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(*reason),
        }
    }
}

/// Declarative access requirement for a protected operation.
///
/// Requirements compose: `Requirement::RoleAtLeast(Role::Manager)
/// .or(Requirement::same_department("fiscal"))` expresses
/// "managers anywhere, or anyone in fiscal".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Any verified claims satisfy this.
    AnyAuthenticated,
    /// Claims' role must be at least the given role.
    RoleAtLeast(Role),
    /// Claims' department must equal the given slug. An unset department on
    /// either side never satisfies this; it denies, never permits.
    SameDepartment(DepartmentSlug),
    /// Satisfied when either branch is satisfied. When both deny, the
    /// decision carries the first branch's reason.
    Either(Box<Requirement>, Box<Requirement>),
}

impl Requirement {
    /// Shorthand for a department requirement from anything slug-like.
    pub fn same_department(slug: impl Into<DepartmentSlug>) -> Self {
        Self::SameDepartment(slug.into())
    }

    /// Combine with another requirement, allowing if either one allows.
    pub fn or(self, other: Requirement) -> Self {
        Self::Either(Box::new(self), Box::new(other))
    }

    /// Evaluate this requirement against optionally-present claims.
    ///
    /// `None` means no token (or an untrusted one) was presented; every
    /// requirement denies with [`DenialReason::Unauthenticated`] in that
    /// case. Malformed or tampered tokens must be resolved to `None` by the
    /// caller; they are never partially trusted.
    pub fn check(&self, claims: Option<&SessionClaims>) -> Decision {
        let Some(claims) = claims else {
            return Decision::Denied(DenialReason::Unauthenticated);
        };

        match self {
            Self::AnyAuthenticated => Decision::Allowed,
            Self::RoleAtLeast(required) => {
                if claims.role >= *required {
                    Decision::Allowed
                } else {
                    Decision::Denied(DenialReason::InsufficientRole)
                }
            }
            Self::SameDepartment(required) => match &claims.dept {
                Some(dept) if !required.as_str().is_empty() && dept == required => {
                    Decision::Allowed
                }
                _ => Decision::Denied(DenialReason::WrongDepartment),
            },
            Self::Either(a, b) => {
                let first = a.check(Some(claims));
                if first.is_allowed() {
                    return first;
                }
                if b.check(Some(claims)).is_allowed() {
                    return Decision::Allowed;
                }
                first
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, dept: Option<&str>) -> SessionClaims {
        SessionClaims::issue(
            "user:alice",
            role,
            dept.map(DepartmentSlug::new),
            std::time::Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_role_total_order() {
        assert!(Role::Employee < Role::Manager);
        assert!(Role::Manager < Role::Admin);
        assert!(Role::Employee < Role::Admin);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Employee, Role::Manager, Role::Admin] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"manager\"");
        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn test_any_authenticated() {
        let c = claims(Role::Employee, None);
        assert!(Requirement::AnyAuthenticated.check(Some(&c)).is_allowed());
    }

    #[test]
    fn test_missing_claims_always_deny() {
        let requirements = [
            Requirement::AnyAuthenticated,
            Requirement::RoleAtLeast(Role::Employee),
            Requirement::same_department("fiscal"),
            Requirement::RoleAtLeast(Role::Admin).or(Requirement::AnyAuthenticated),
        ];
        for req in requirements {
            assert_eq!(
                req.check(None),
                Decision::Denied(DenialReason::Unauthenticated)
            );
        }
    }

    #[test]
    fn test_role_at_least_denies_lower() {
        let c = claims(Role::Employee, None);
        let decision = Requirement::RoleAtLeast(Role::Admin).check(Some(&c));
        assert_eq!(decision, Decision::Denied(DenialReason::InsufficientRole));
    }

    #[test]
    fn test_role_at_least_allows_equal_and_higher() {
        let manager = claims(Role::Manager, None);
        let admin = claims(Role::Admin, None);

        assert!(
            Requirement::RoleAtLeast(Role::Manager)
                .check(Some(&manager))
                .is_allowed()
        );
        assert!(
            Requirement::RoleAtLeast(Role::Employee)
                .check(Some(&admin))
                .is_allowed()
        );
    }

    #[test]
    fn test_same_department_match() {
        let c = claims(Role::Employee, Some("fiscal"));
        assert!(
            Requirement::same_department("fiscal")
                .check(Some(&c))
                .is_allowed()
        );
    }

    #[test]
    fn test_same_department_mismatch() {
        let c = claims(Role::Employee, Some("fiscal"));
        let decision = Requirement::same_department("contabil").check(Some(&c));
        assert_eq!(decision, Decision::Denied(DenialReason::WrongDepartment));
    }

    #[test]
    fn test_unset_department_never_satisfies() {
        let c = claims(Role::Admin, None);

        for slug in ["fiscal", "contabil", ""] {
            let decision = Requirement::same_department(slug).check(Some(&c));
            assert_eq!(decision, Decision::Denied(DenialReason::WrongDepartment));
        }
    }

    #[test]
    fn test_empty_requirement_department_denies_even_when_both_empty() {
        // An account with an empty-string department must not sneak past an
        // empty-string requirement.
        let c = claims(Role::Employee, Some(""));
        let decision = Requirement::same_department("").check(Some(&c));
        assert_eq!(decision, Decision::Denied(DenialReason::WrongDepartment));
    }

    #[test]
    fn test_either_allows_when_one_branch_allows() {
        let employee_in_fiscal = claims(Role::Employee, Some("fiscal"));
        let req = Requirement::RoleAtLeast(Role::Manager)
            .or(Requirement::same_department("fiscal"));

        assert!(req.check(Some(&employee_in_fiscal)).is_allowed());

        let manager_elsewhere = claims(Role::Manager, Some("rh"));
        assert!(req.check(Some(&manager_elsewhere)).is_allowed());
    }

    #[test]
    fn test_either_reports_first_branch_reason() {
        let employee_elsewhere = claims(Role::Employee, Some("rh"));
        let req = Requirement::RoleAtLeast(Role::Manager)
            .or(Requirement::same_department("fiscal"));

        assert_eq!(
            req.check(Some(&employee_elsewhere)),
            Decision::Denied(DenialReason::InsufficientRole)
        );
    }

    #[test]
    fn test_decision_reason_accessor() {
        assert_eq!(Decision::Allowed.reason(), None);
        assert_eq!(
            Decision::Denied(DenialReason::WrongDepartment).reason(),
            Some(DenialReason::WrongDepartment)
        );
    }
}
