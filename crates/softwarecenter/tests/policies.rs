use softwarecenter::domain::constants::{POLICY_AUTHENTICATED, POLICY_SOFTWARE_CENTER_MANAGER};
use softwarecenter::kernel::security::{Decision, Principal};
use softwarecenter::{authorization_policies, endpoint_policies, features, schemas};

#[test]
fn manager_policy_needs_both_roles() {
    let registry = authorization_policies();
    let policy = registry.get(POLICY_SOFTWARE_CENTER_MANAGER).expect("policy registered");

    let both = Principal::new("tech-1").with_roles(["SoftwareCenter", "Manager"]);
    let one = Principal::new("tech-2").with_roles(["SoftwareCenter"]);

    assert_eq!(policy.evaluate(Some(&both)), Decision::Allow);
    assert!(matches!(policy.evaluate(Some(&one)), Decision::Forbid { .. }));
    assert_eq!(policy.evaluate(None), Decision::Challenge);
}

#[test]
fn default_policy_stays_registered() {
    let registry = authorization_policies();

    assert!(registry.contains(POLICY_AUTHENTICATED));
    assert_eq!(registry.default_policy().map(|p| p.name()), Some(POLICY_AUTHENTICATED));
}

#[test]
fn bindings_only_name_registered_policies() {
    let registry = authorization_policies();

    let bindings = endpoint_policies();
    assert!(!bindings.is_empty());
    assert!(bindings.iter().all(|binding| registry.contains(binding.policy)));
}

#[test]
fn features_contribute_schema() {
    assert!(schemas().iter().any(|schema| schema.name == features::vendors::SCHEMA.name));
}
