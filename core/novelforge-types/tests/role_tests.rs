use novelforge_types::{AccessDenied, Principal, Role, UserId};
use proptest::prelude::*;
use std::str::FromStr;

fn any_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Reseller), Just(Role::Admin)]
}

#[test]
fn hierarchy_is_user_reseller_admin() {
    assert!(Role::User < Role::Reseller);
    assert!(Role::Reseller < Role::Admin);
}

#[test]
fn at_least_is_reflexive() {
    for role in [Role::User, Role::Reseller, Role::Admin] {
        assert!(role.at_least(role));
    }
}

#[test]
fn reseller_is_not_admin() {
    assert!(!Role::Reseller.at_least(Role::Admin));
    assert!(Role::Admin.at_least(Role::Reseller));
}

#[test]
fn require_reports_required_and_actual() {
    let principal = Principal::new(UserId::new(), Role::User);
    let err = principal.require(Role::Reseller).unwrap_err();
    assert_eq!(
        err,
        AccessDenied {
            required: Role::Reseller,
            actual: Role::User
        }
    );
    assert!(err.to_string().contains("reseller"));
}

#[test]
fn role_wire_names() {
    assert_eq!(serde_json::to_string(&Role::Reseller).unwrap(), "\"reseller\"");
    let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
    assert_eq!(parsed, Role::Admin);
    assert_eq!(Role::from_str("user").unwrap(), Role::User);
    assert!(Role::from_str("superuser").is_err());
}

#[test]
fn default_device_limits() {
    assert_eq!(Role::User.default_device_limit(), 1);
    assert_eq!(Role::Reseller.default_device_limit(), 10);
    assert_eq!(Role::Admin.default_device_limit(), 999);
}

proptest! {
    /// `require` succeeds exactly when the role ordering says so.
    #[test]
    fn require_agrees_with_ordering(actual in any_role(), min in any_role()) {
        let principal = Principal::new(UserId::new(), actual);
        prop_assert_eq!(principal.require(min).is_ok(), actual >= min);
    }
}
