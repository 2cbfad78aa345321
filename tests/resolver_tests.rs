use backoffice_core::core::resolver::{DerivedValues, LookupTable, RefreshOutcome};
use backoffice_core::core::FieldDependencyResolver;
use backoffice_core::domain::Draft;

fn partner_table() -> LookupTable {
    let mut acme = DerivedValues::new();
    acme.insert("partner_id".into(), "7".into());
    acme.insert("partner_cif".into(), "RO123".into());
    acme.insert("partner_status".into(), "ACTIVE".into());

    let mut globex = DerivedValues::new();
    globex.insert("partner_id".into(), "8".into());
    globex.insert("partner_cif".into(), "RO456".into());
    globex.insert("partner_status".into(), "SUSPENDED".into());

    let mut table = LookupTable::new();
    table.insert("ACME".into(), acme);
    table.insert("Globex".into(), globex);
    table
}

fn status_table() -> LookupTable {
    let mut active = DerivedValues::new();
    active.insert("status_detail".into(), "in good standing".into());

    let mut suspended = DerivedValues::new();
    suspended.insert("status_detail".into(), "payments on hold".into());

    let mut table = LookupTable::new();
    table.insert("ACTIVE".into(), active);
    table.insert("SUSPENDED".into(), suspended);
    table
}

fn wired() -> (Draft, FieldDependencyResolver) {
    let mut draft = Draft::new();
    draft.alias_group(&["partner_name", "partner_id"]);
    draft.add_dependency("partner_name", "partner_cif");
    draft.add_dependency("partner_name", "partner_status");
    draft.add_dependency("partner_status", "status_detail");

    let resolver = FieldDependencyResolver::new()
        .with_table("partner_name", partner_table())
        .with_table("partner_status", status_table());
    (draft, resolver)
}

#[test]
fn selection_populates_direct_and_transitive_dependents() {
    let (mut draft, resolver) = wired();

    resolver.apply_change(&mut draft, "partner_name", "ACME");

    assert_eq!(draft.get("partner_id"), "7");
    assert_eq!(draft.get("partner_cif"), "RO123");
    assert_eq!(draft.get("partner_status"), "ACTIVE");
    assert_eq!(draft.get("status_detail"), "in good standing");
}

#[test]
fn unknown_selection_clears_dependents_in_the_same_update() {
    let (mut draft, resolver) = wired();
    resolver.apply_change(&mut draft, "partner_name", "ACME");

    resolver.apply_change(&mut draft, "partner_name", "Nonexistent SRL");

    assert_eq!(draft.get("partner_name"), "Nonexistent SRL");
    assert_eq!(draft.get("partner_id"), "");
    assert_eq!(draft.get("partner_cif"), "");
    assert_eq!(draft.get("partner_status"), "");
    assert_eq!(draft.get("status_detail"), "");
}

#[test]
fn reselecting_a_valid_value_repopulates_dependents() {
    let (mut draft, resolver) = wired();
    resolver.apply_change(&mut draft, "partner_name", "ACME");
    resolver.apply_change(&mut draft, "partner_name", "Nonexistent SRL");

    resolver.apply_change(&mut draft, "partner_name", "Globex");

    assert_eq!(draft.get("partner_id"), "8");
    assert_eq!(draft.get("partner_cif"), "RO456");
    assert_eq!(draft.get("partner_status"), "SUSPENDED");
    assert_eq!(draft.get("status_detail"), "payments on hold");
}

#[test]
fn refresh_keeps_a_selection_that_is_still_offered() {
    let (mut draft, resolver) = wired();
    resolver.apply_change(&mut draft, "partner_name", "ACME");

    let outcome = resolver.refresh_options(
        &mut draft,
        "partner_name",
        &["ACME".to_string(), "Globex".to_string()],
    );

    assert_eq!(outcome, RefreshOutcome::Unchanged);
    assert_eq!(draft.get("partner_cif"), "RO123");
}

#[test]
fn refresh_heals_a_dangling_selection_silently() {
    let (mut draft, resolver) = wired();
    resolver.apply_change(&mut draft, "partner_name", "ACME");

    let outcome =
        resolver.refresh_options(&mut draft, "partner_name", &["Globex".to_string()]);

    assert_eq!(outcome, RefreshOutcome::Healed);
    assert_eq!(draft.get("partner_name"), "");
    assert_eq!(draft.get("partner_id"), "");
    assert_eq!(draft.get("partner_cif"), "");
    assert_eq!(draft.get("status_detail"), "");
}

#[test]
fn refresh_reports_user_entered_dependent_input() {
    let (mut draft, resolver) = wired();
    resolver.apply_change(&mut draft, "partner_name", "ACME");
    draft.set("status_detail", "custom note for this partner");

    let outcome =
        resolver.refresh_options(&mut draft, "partner_name", &["Globex".to_string()]);

    match outcome {
        RefreshOutcome::HealedWithDataLoss { fields } => {
            assert_eq!(fields, vec!["status_detail"]);
        }
        other => panic!("expected data-loss warning, got {other:?}"),
    }
    assert_eq!(draft.get("status_detail"), "");
}

#[test]
fn empty_selection_clears_the_cascade() {
    let (mut draft, resolver) = wired();
    resolver.apply_change(&mut draft, "partner_name", "ACME");

    resolver.apply_change(&mut draft, "partner_name", "");

    assert_eq!(draft.get("partner_id"), "");
    assert_eq!(draft.get("partner_cif"), "");
    assert_eq!(draft.get("partner_status"), "");
    assert_eq!(draft.get("status_detail"), "");
}
