use golden_mass::journal::{Journal, JournalEntry, LAST_SAVE_FILE, SAVES_FILE};
use tempfile::TempDir;

#[test]
fn test_saves_survive_reopening() {
    let temp_dir = TempDir::new().unwrap();

    Journal::new(temp_dir.path()).save("fitted quarter lattice").unwrap();
    Journal::new(temp_dir.path()).save("checked W boson").unwrap();

    let entries = Journal::new(temp_dir.path()).load().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].what, "checked W boson");

    let raw: Vec<JournalEntry> =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join(SAVES_FILE)).unwrap())
            .unwrap();
    assert_eq!(raw, entries);

    let last = std::fs::read_to_string(temp_dir.path().join(LAST_SAVE_FILE)).unwrap();
    assert_eq!(last, format!("{}\n{}", entries[1].time, entries[1].what));
}

#[test]
fn test_journal_in_missing_directory_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let journal = Journal::new(temp_dir.path().join("notes/session"));

    assert!(journal.load().unwrap().is_empty());
    journal.save("start").unwrap();
    assert!(journal.dir().join(SAVES_FILE).exists());
}
