//! Persistence and recovery tests for the nomenclator catalog engine.
//!
//! These tests verify that committed entries, their on-disk layout, and
//! rename and removal effects survive closing and reopening a JSON store.

use nomenclator::catalog::CatalogService;
use nomenclator::entry::CatalogEntry;
use nomenclator::grammar::Grammar;
use nomenclator::store::JsonStore;
use nomenclator::unit::Unit;

fn open_service(dir: &std::path::Path) -> CatalogService<JsonStore> {
    CatalogService::open(Grammar::default(), JsonStore::open(dir).unwrap()).unwrap()
}

fn scalar(name: &str, unit: &str) -> CatalogEntry {
    CatalogEntry::scalar(
        name,
        format!("The {} quantity.", name.replace('_', " ")),
        Unit::parse(unit).unwrap(),
    )
}

#[test]
fn entries_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();

    // First session: commit a few entries.
    {
        let mut svc = open_service(dir.path());
        let mut work = svc.begin();
        work.add(scalar("electron_temperature", "eV")).unwrap();
        work.add(scalar("loop_voltage", "V")).unwrap();
        work.add(scalar("plasma_current", "A").with_tags(["magnetics", "measured"]))
            .unwrap();
        work.commit().unwrap();
    }

    // Second session: reopen and verify.
    {
        let svc = open_service(dir.path());
        assert_eq!(svc.len(), 3);
        assert_eq!(
            svc.list_names(),
            vec!["electron_temperature", "loop_voltage", "plasma_current"]
        );
        let tagged = svc.get("plasma_current").unwrap();
        assert_eq!(tagged.header().tags, vec!["magnetics", "measured"]);
        assert_eq!(tagged.header().unit.as_str(), "A");
        assert!(svc.validate().is_empty());
    }
}

#[test]
fn renames_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let mut svc = open_service(dir.path());
        let mut work = svc.begin();
        work.add(scalar("loop_voltage", "V")).unwrap();
        work.commit().unwrap();
    }

    {
        let mut svc = open_service(dir.path());
        let mut work = svc.begin();
        work.rename("loop_voltage", "flux_loop_voltage").unwrap();
        work.commit().unwrap();
    }

    {
        let svc = open_service(dir.path());
        assert_eq!(svc.len(), 1);
        assert!(svc.get("loop_voltage").is_none());
        let renamed = svc.get("flux_loop_voltage").unwrap();
        assert_eq!(renamed.header().deprecates.as_deref(), Some("loop_voltage"));
    }
}

#[test]
fn removals_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let mut svc = open_service(dir.path());
        let mut work = svc.begin();
        work.add(scalar("electron_temperature", "eV")).unwrap();
        work.add(scalar("plasma_current", "A")).unwrap();
        work.commit().unwrap();

        let mut work = svc.begin();
        work.remove("plasma_current").unwrap();
        work.commit().unwrap();
    }

    {
        let svc = open_service(dir.path());
        assert_eq!(svc.list_names(), vec!["electron_temperature"]);
    }
}

#[test]
fn retagging_moves_the_document() {
    let dir = tempfile::TempDir::new().unwrap();

    {
        let mut svc = open_service(dir.path());
        let mut work = svc.begin();
        work.add(scalar("plasma_current", "A").with_tags(["magnetics", "measured"]))
            .unwrap();
        work.commit().unwrap();
    }
    assert!(dir
        .path()
        .join("magnetics")
        .join("plasma_current.json")
        .exists());

    {
        let mut svc = open_service(dir.path());
        let mut work = svc.begin();
        work.update(
            "plasma_current",
            scalar("plasma_current", "A").with_tags(["diagnostics", "measured"]),
        )
        .unwrap();
        work.commit().unwrap();
    }
    assert!(!dir
        .path()
        .join("magnetics")
        .join("plasma_current.json")
        .exists());
    assert!(dir
        .path()
        .join("diagnostics")
        .join("plasma_current.json")
        .exists());

    {
        let svc = open_service(dir.path());
        assert_eq!(svc.len(), 1);
        let entry = svc.get("plasma_current").unwrap();
        assert_eq!(entry.header().tags, vec!["diagnostics", "measured"]);
    }
}
