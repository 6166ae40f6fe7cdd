//! Persistence round trips for the collection layer.

use std::fs;

use tempfile::TempDir;

use kifu_rust::collection::{Collection, CollectionError, CollectionList, GameInfo};

fn named_info(black: &str, white: &str) -> GameInfo {
    GameInfo {
        black_name: Some(black.to_string()),
        white_name: Some(white.to_string()),
        result: Some("B+R".to_string()),
        ..GameInfo::default()
    }
}

#[test]
fn collection_list_save_load_roundtrip() {
    let base = TempDir::new().expect("failed to create temp dir");
    let mut list = CollectionList::new(base.path());
    list.create_collection("study").unwrap();

    let collection = list.get_mut("study").unwrap();
    collection.add_game(named_info("Honinbo", "Challenger"), true);
    collection.add_game(named_info("Shusaku", "Gennan"), false);
    list.save().unwrap();

    let mut reloaded = CollectionList::load(base.path()).unwrap();
    assert_eq!(reloaded.collections().len(), 1);

    let collection = reloaded.get_mut("study").unwrap();
    // count is known before any per-game metadata is read
    assert_eq!(collection.game_count(), 2);
    collection.ensure_loaded();
    assert_eq!(collection.game_count(), 2);

    let games = collection.games();
    assert_eq!(games[0].info, named_info("Honinbo", "Challenger"));
    assert!(games[0].can_rename);
    assert_eq!(games[1].info, named_info("Shusaku", "Gennan"));
    assert!(!games[1].can_rename);
}

#[test]
fn collection_roundtrip_preserves_name_and_dir() {
    let base = TempDir::new().expect("failed to create temp dir");
    let games_dir = base.path().join("games");
    fs::create_dir_all(&games_dir).unwrap();

    let mut collection = Collection::new("tournament", &games_dir);
    collection.add_game(GameInfo::default(), true);
    let index = base.path().join("tournament.json");
    collection.save(&index).unwrap();

    let loaded = Collection::load(&index).unwrap();
    assert_eq!(loaded.name(), "tournament");
    assert_eq!(loaded.dir(), games_dir);
    assert_eq!(loaded.game_count(), 1);
}

#[test]
fn unsupported_version_is_rejected() {
    let base = TempDir::new().expect("failed to create temp dir");
    let index_dir = base.path().join("collections");
    fs::create_dir_all(&index_dir).unwrap();
    fs::write(
        index_dir.join("collections_list.json"),
        r#"[1, [["old", "./games/old", []]]]"#,
    )
    .unwrap();

    match CollectionList::load(base.path()) {
        Err(CollectionError::UnsupportedVersion { version, .. }) => assert_eq!(version, 1),
        other => panic!("expected version error, got {other:?}"),
    }
}

#[test]
fn missing_collection_index_is_skipped() {
    let base = TempDir::new().expect("failed to create temp dir");
    let mut list = CollectionList::new(base.path());
    list.create_collection("kept").unwrap();

    // append a dangling index path to the list file by hand
    let list_path = base.path().join("collections").join("collections_list.json");
    let kept_index = base.path().join("collections").join("kept.json");
    let dangling = base.path().join("collections").join("gone.json");
    let payload = serde_payload(&[&kept_index, &dangling]);
    fs::write(&list_path, payload).unwrap();

    let list = CollectionList::load(base.path()).unwrap();
    assert_eq!(list.collections().len(), 1);
    assert_eq!(list.collections()[0].name(), "kept");
}

fn serde_payload(paths: &[&std::path::Path]) -> String {
    let quoted: Vec<String> = paths
        .iter()
        .map(|p| format!("{:?}", p.to_str().unwrap()))
        .collect();
    format!("[2, [{}]]", quoted.join(", "))
}

#[test]
fn metadata_change_renames_the_record_file() {
    let base = TempDir::new().expect("failed to create temp dir");
    let mut list = CollectionList::new(base.path());
    list.create_collection("club").unwrap();

    let collection = list.get_mut("club").unwrap();
    let index = collection.add_game(GameInfo::default(), true);
    let old_path = collection.games()[index].path.clone();
    fs::write(&old_path, "(;GM[1])").unwrap();

    let entry = collection
        .set_game_info(index, named_info("Alice", "Bob"))
        .unwrap();
    let new_path = entry.path.clone();
    assert_ne!(new_path, old_path);
    assert!(
        new_path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("_Alice_Bob")
    );
    assert!(new_path.exists());
    assert!(!old_path.exists());
}

#[test]
fn rename_tolerates_missing_record_file() {
    let base = TempDir::new().expect("failed to create temp dir");
    let mut list = CollectionList::new(base.path());
    list.create_collection("club").unwrap();

    let collection = list.get_mut("club").unwrap();
    let index = collection.add_game(GameInfo::default(), true);
    // no file on disk; the entry still moves to the derived name
    let entry = collection
        .set_game_info(index, named_info("Alice", "Bob"))
        .unwrap();
    assert!(
        entry
            .path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("_Alice_Bob")
    );
}

#[test]
fn delete_collection_only_touches_the_list() {
    let base = TempDir::new().expect("failed to create temp dir");
    let mut list = CollectionList::new(base.path());
    list.create_collection("a").unwrap();
    list.create_collection("b").unwrap();
    assert_eq!(list.collections().len(), 2);

    list.delete_collection("a");
    assert_eq!(list.collections().len(), 1);
    assert_eq!(list.collections()[0].name(), "b");
    // the dropped collection's files are still on disk
    assert!(base.path().join("collections").join("a.json").exists());
}

#[test]
fn random_game_returns_an_existing_entry() {
    let base = TempDir::new().expect("failed to create temp dir");
    let mut list = CollectionList::new(base.path());
    list.create_collection("pool").unwrap();
    let collection = list.get_mut("pool").unwrap();
    collection.add_game(named_info("A", "B"), false);
    collection.add_game(named_info("C", "D"), false);
    collection.add_game(named_info("E", "F"), false);

    let picked = collection.random_game().cloned().unwrap();
    assert!(collection.games().contains(&picked));
}
