use savegroup::{DataGroup, DecodeMode, StoreError, storage};
use std::collections::BTreeMap;
use std::fs;

fn sample() -> Result<DataGroup, StoreError> {
    let mut save = DataGroup::new();
    let player = save.child_mut("player", true)?;
    player.set("hp", 100)?;
    player.set("xp", 12.5)?;
    player.set("weapon", "wooden \"training\" sword")?;
    player.set("skills", vec!["dash".to_string(), "fireball".to_string()])?;
    let mut inventory = BTreeMap::new();
    inventory.insert(1, 3);
    inventory.insert(7, 1);
    player.set("inventory", inventory)?;
    let scene = save.child_mut("scene", true)?;
    scene.set("name", "Forest")?;
    scene.set("checkpoint", 2)?;
    save.child_mut("npc", true)?
        .child_mut("narrator", true)?
        .set("intro-done", true)?;
    Ok(save)
}

#[test]
fn persistence_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("slot1.json");

    let save = sample()?;
    save.save_to_disk(&path)?;

    let mut loaded = DataGroup::new();
    loaded.load_from_disk(&path)?;
    assert_eq!(loaded, save);

    // Saving again produces byte-identical output.
    let first = fs::read_to_string(&path)?;
    loaded.save_to_disk(&path)?;
    assert_eq!(fs::read_to_string(&path)?, first);
    Ok(())
}

#[test]
fn saved_file_is_pretty_and_leaves_no_temp_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("slot2.json");

    let mut save = DataGroup::new();
    save.set("hp", 100)?;
    save.save_to_disk(&path)?;

    let text = fs::read_to_string(&path)?;
    assert_eq!(text, "{\n    \"hp\": [\n        \"int\",\n        100\n    ]\n}\n");
    assert!(!dir.path().join("slot2.json.tmp").exists());
    Ok(())
}

#[test]
fn load_ignores_formatting() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hand-written.json");
    fs::write(
        &path,
        "{\r\n\t\"player\" :{ \"hp\":[ \"int\" , 42 ],\n\t\"tags\": [[\"string\"]] }\n}",
    )?;

    let mut loaded = DataGroup::new();
    loaded.load_from_disk(&path)?;
    let player = loaded.child("player").ok_or("player missing")?;
    assert_eq!(player.get::<i32>("hp"), Some(42));
    assert_eq!(player.get::<Vec<String>>("tags"), Some(Vec::new()));
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut group = DataGroup::new();
    let res = group.load_from_disk(dir.path().join("absent.json"));
    assert!(matches!(res, Err(StoreError::Io(_))));
}

#[test]
fn corrupt_file_fails_closed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("corrupt.json");
    fs::write(&path, r#"{"player": {"hp": ["int", 100]}"#)?;

    let mut group = sample()?;
    let before = group.clone();
    assert!(matches!(group.load_from_disk(&path), Err(StoreError::Syntax(_))));
    assert_eq!(group, before);

    fs::write(&path, r#"{"player": {"hp": ["int", "lots"]}, "flag": ["bool", true]}"#)?;
    assert!(matches!(group.load_from_disk(&path), Err(StoreError::Decode(_))));

    group.load_from_disk_with(&path, DecodeMode::Lenient)?;
    assert_eq!(group.get::<bool>("flag"), Some(true));
    assert!(group.child("player").ok_or("player missing")?.is_empty());
    Ok(())
}

#[test]
fn basic_save_resets_from_template() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let template = dir.path().join("InitSave.json");
    fs::write(
        &template,
        r#"{
    "player": {
        "hp": ["int", 100],
        "weapon": ["string", "stick"],
        "inventory": [{"int": "int"}]
    },
    "scene": {"name": ["string", "Village"], "checkpoint": ["int", 0]}
}"#,
    )?;

    let mut save = sample()?;
    save.set("leftover", 1)?;
    save.create_basic_save(&template)?;

    assert!(!save.contains_leaf("leftover"));
    assert!(save.child("npc").is_none());
    let scene = save.child("scene").ok_or("scene missing")?;
    assert_eq!(scene.get::<String>("name").as_deref(), Some("Village"));
    assert_eq!(scene.get::<i32>("checkpoint"), Some(0));
    Ok(())
}

#[test]
fn read_and_write_node_helpers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("node.json");
    let node = sample()?.to_node();

    assert!(!storage::exists(&path));
    storage::write_node(&path, &node)?;
    assert!(storage::exists(&path));
    assert_eq!(storage::read_node(&path)?, node);
    Ok(())
}

fn nested(levels: usize) -> Result<DataGroup, StoreError> {
    let names: Vec<String> = (0..levels).map(|i| format!("g{}", i)).collect();
    let segments: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut root = DataGroup::new();
    root.path_mut(&segments, true)?.set("hp", 1)?;
    Ok(root)
}

#[test]
fn too_deep_group_is_refused_before_writing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("deep.json");

    let deep = nested(130)?;
    let before = deep.clone();
    assert!(matches!(
        deep.save_to_disk(&path),
        Err(StoreError::TooDeep { limit: 128, .. })
    ));
    assert!(!path.exists());
    assert!(!dir.path().join("deep.json.tmp").exists());
    assert_eq!(deep, before);
    Ok(())
}

#[test]
fn deepest_writable_group_loads_back() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("deep.json");

    // Root object, 126 groups and the leaf array make 128 levels.
    let deep = nested(126)?;
    deep.save_to_disk(&path)?;
    let mut loaded = DataGroup::new();
    loaded.load_from_disk(&path)?;
    assert_eq!(loaded, deep);

    assert!(matches!(
        nested(127)?.save_to_disk(&path),
        Err(StoreError::TooDeep { depth: 129, .. })
    ));
    Ok(())
}
