mod common;

use chrono::{Duration, Utc};
use common::{bootstrap, new_account, store};
use novelforge_accounts::{AccountError, AccountService};
use novelforge_storage::{NotificationOutbox, ProfileDirectory, SecurityEventLog};
use novelforge_types::security::{LOGIN_FAILURE, UNKNOWN_IP};
use novelforge_types::{NotificationKind, Principal, Role, UserId};
use pretty_assertions::assert_eq;

// ── Bootstrap ────────────────────────────────────────────────────

#[test]
fn bootstrap_creates_admin_with_welcome() {
    let store = store();
    let service = AccountService::new(store.clone());

    let issued = service
        .bootstrap_admin("  Root@Example.com ", "Root Admin")
        .unwrap();
    assert_eq!(issued.profile.role, Role::Admin);
    assert_eq!(issued.profile.email, "root@example.com");
    assert_eq!(issued.profile.device_limit, 999);

    let notes = store.notifications_for(issued.profile.id).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Success);
    assert_eq!(notes[0].data["setupComplete"], true);

    let principal = service.authenticate(&issued.token, None).unwrap();
    assert_eq!(principal, Principal::new(issued.profile.id, Role::Admin));
}

#[test]
fn bootstrap_works_exactly_once() {
    let store = store();
    let service = AccountService::new(store);
    bootstrap(&service);

    let err = service
        .bootstrap_admin("second@example.com", "Second")
        .unwrap_err();
    assert!(matches!(err, AccountError::AdminExists));
    assert_eq!(err.code(), "ADMIN_EXISTS");
}

#[test]
fn bootstrap_validates_input() {
    let store = store();
    let service = AccountService::new(store);
    assert!(matches!(
        service.bootstrap_admin("not-an-email", "Name"),
        Err(AccountError::InvalidRequest(_))
    ));
    assert!(matches!(
        service.bootstrap_admin("a@example.com", "   "),
        Err(AccountError::InvalidRequest(_))
    ));
}

// ── Creating accounts ────────────────────────────────────────────

#[test]
fn admin_creates_reseller_and_user() {
    let store = store();
    let service = AccountService::new(store);
    let (admin, _) = bootstrap(&service);

    let reseller = service
        .create_user(&admin, new_account("shop@example.com", Role::Reseller))
        .unwrap();
    assert_eq!(reseller.profile.role, Role::Reseller);
    assert_eq!(reseller.profile.device_limit, 10);
    assert_eq!(reseller.profile.reseller_id, None);

    let user = service
        .create_user(&admin, new_account("u@example.com", Role::User))
        .unwrap();
    assert_eq!(user.profile.device_limit, 1);
}

#[test]
fn reseller_creates_users_it_owns() {
    let store = store();
    let service = AccountService::new(store);
    let (admin, _) = bootstrap(&service);
    let shop = service
        .create_user(&admin, new_account("shop@example.com", Role::Reseller))
        .unwrap();
    let shop_principal = service.authenticate(&shop.token, None).unwrap();

    let customer = service
        .create_user(&shop_principal, new_account("c@example.com", Role::User))
        .unwrap();
    assert_eq!(customer.profile.reseller_id, Some(shop.profile.id));
}

#[test]
fn reseller_cannot_create_reseller_or_admin() {
    let store = store();
    let service = AccountService::new(store);
    let reseller = Principal::new(UserId::new(), Role::Reseller);

    for role in [Role::Reseller, Role::Admin] {
        let err = service
            .create_user(&reseller, new_account("x@example.com", role))
            .unwrap_err();
        assert!(matches!(err, AccountError::RoleNotPermitted { .. }));
        assert_eq!(err.code(), "ROLE_NOT_PERMITTED");
    }
}

#[test]
fn admin_cannot_create_admin() {
    let store = store();
    let service = AccountService::new(store);
    let (admin, _) = bootstrap(&service);
    let err = service
        .create_user(&admin, new_account("a2@example.com", Role::Admin))
        .unwrap_err();
    assert!(matches!(err, AccountError::RoleNotPermitted { .. }));
}

#[test]
fn users_cannot_create_accounts() {
    let store = store();
    let service = AccountService::new(store);
    let user = Principal::new(UserId::new(), Role::User);
    let err = service
        .create_user(&user, new_account("x@example.com", Role::User))
        .unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");
}

#[test]
fn duplicate_email_is_taken() {
    let store = store();
    let service = AccountService::new(store);
    let (admin, _) = bootstrap(&service);
    service
        .create_user(&admin, new_account("dup@example.com", Role::User))
        .unwrap();
    let err = service
        .create_user(&admin, new_account("DUP@example.com", Role::User))
        .unwrap_err();
    assert!(matches!(err, AccountError::EmailTaken));
}

// ── Roles ────────────────────────────────────────────────────────

#[test]
fn admin_changes_role() {
    let store = store();
    let service = AccountService::new(store.clone());
    let (admin, _) = bootstrap(&service);
    let user = service
        .create_user(&admin, new_account("promote@example.com", Role::User))
        .unwrap();

    let updated = service
        .update_user_role(&admin, user.profile.id, Role::Reseller)
        .unwrap();
    assert_eq!(updated.role, Role::Reseller);
    assert_eq!(
        store.profile_by_id(user.profile.id).unwrap().unwrap().role,
        Role::Reseller
    );

    let principal = service.authenticate(&user.token, None).unwrap();
    assert_eq!(principal.role, Role::Reseller);
}

#[test]
fn only_admin_changes_roles() {
    let store = store();
    let service = AccountService::new(store);
    let reseller = Principal::new(UserId::new(), Role::Reseller);
    let err = service
        .update_user_role(&reseller, UserId::new(), Role::User)
        .unwrap_err();
    assert!(matches!(err, AccountError::Forbidden(_)));
}

#[test]
fn unknown_target_is_not_found() {
    let store = store();
    let service = AccountService::new(store);
    let (admin, _) = bootstrap(&service);
    let err = service
        .update_user_role(&admin, UserId::new(), Role::Reseller)
        .unwrap_err();
    assert_eq!(err.code(), "USER_NOT_FOUND");
}

// ── Authentication ───────────────────────────────────────────────

#[test]
fn issued_tokens_are_independent() {
    let store = store();
    let service = AccountService::new(store);
    let (admin, first) = bootstrap(&service);
    let second = service.issue_token(admin.user_id).unwrap();

    assert_ne!(first, second);
    assert_eq!(service.authenticate(&first, None).unwrap(), admin);
    assert_eq!(service.authenticate(&second, None).unwrap(), admin);
}

#[test]
fn invalid_token_records_login_failure() {
    let store = store();
    let service = AccountService::new(store.clone());
    let since = Utc::now() - Duration::seconds(5);

    let err = service
        .authenticate("deadbeef", Some("203.0.113.77"))
        .unwrap_err();
    assert!(matches!(err, AccountError::Unauthenticated));
    service.authenticate("feedface", None).unwrap_err();

    let ips = store.source_ips_since(LOGIN_FAILURE, since).unwrap();
    assert_eq!(ips.len(), 2);
    assert!(ips.contains(&Some("203.0.113.77".to_string())));
    assert!(ips.contains(&Some(UNKNOWN_IP.to_string())));
}

#[test]
fn blank_token_is_refused_without_event() {
    let store = store();
    let service = AccountService::new(store.clone());
    let since = Utc::now() - Duration::seconds(5);

    assert!(matches!(
        service.authenticate("   ", Some("203.0.113.1")),
        Err(AccountError::Unauthenticated)
    ));
    assert!(store.source_ips_since(LOGIN_FAILURE, since).unwrap().is_empty());
}
