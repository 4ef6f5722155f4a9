//! End-to-end runs of the extraction pipeline

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn texpack(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_texpack"));
    cmd.current_dir(workdir)
        .env("TEXPACK_CONFIG", workdir.join("no_config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

fn zip_entries(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        entries.push((file.name().to_string(), content));
    }
    entries.sort();
    entries
}

fn entry(entries: &[(String, Vec<u8>)], name: &str) -> Vec<u8> {
    entries
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, c)| c.clone())
        .unwrap_or_else(|| panic!("{} missing from package", name))
}

/// Default layout: pack/ source and premade/sword_ template in the working dir.
fn default_layout(workdir: &Path) {
    let premade = workdir.join("premade").join("sword_");
    fs::create_dir_all(premade.join("assets/minecraft")).unwrap();
    fs::write(premade.join("pack.mcmeta"), b"{\"pack\":{\"pack_format\":1}}").unwrap();
    fs::write(premade.join("assets/minecraft/sounds.json"), b"{}").unwrap();

    let source = workdir.join("pack");
    fs::create_dir_all(source.join("loose")).unwrap();
    fs::write(source.join("loose/diamond_sword.png"), b"H1 pixels").unwrap();
    write_zip(
        &source.join("packA.zip"),
        &[("textures/diamond_sword.png", b"H1 pixels")],
    );
    write_zip(
        &source.join("packB.zip"),
        &[
            ("pack.mcmeta", b"{}"),
            ("assets/minecraft/textures/items/diamond_sword.png", b"H2 pixels"),
        ],
    );
}

fn run(cmd: &mut Command) -> Output {
    let output = cmd.output().expect("Failed to run texpack");
    assert!(
        output.status.success(),
        "texpack should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn test_default_run_dedups_across_loose_and_archives() {
    let temp_dir = TempDir::new().unwrap();
    let workdir = temp_dir.path();
    default_layout(workdir);

    run(&mut texpack(workdir));

    let target = workdir.join("diamond_sword_trouve");
    let mut numbered: Vec<String> = fs::read_dir(&target)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    numbered.sort();
    assert_eq!(numbered, vec!["1", "2"], "packA duplicates the loose file");

    let first = zip_entries(&target.join("1/sword_1.zip"));
    assert_eq!(entry(&first, "pack.png"), b"H1 pixels");
    assert_eq!(
        entry(&first, "assets/minecraft/textures/items/diamond_sword.png"),
        b"H1 pixels"
    );
    assert_eq!(
        entry(&first, "pack.mcmeta"),
        b"{\"pack\":{\"pack_format\":1}}"
    );
    assert_eq!(entry(&first, "assets/minecraft/sounds.json"), b"{}");

    let second = zip_entries(&target.join("2/sword_2.zip"));
    assert_eq!(entry(&second, "pack.png"), b"H2 pixels");
    assert_eq!(second.len(), 4);

    // Only the zip is left in each numbered folder
    for n in ["1", "2"] {
        let left: Vec<_> = fs::read_dir(target.join(n)).unwrap().collect();
        assert_eq!(left.len(), 1);
    }

    let collection = workdir.join("pack_folder_sword");
    assert!(collection.join("sword_1.zip").is_file());
    assert!(collection.join("sword_2.zip").is_file());
    assert_eq!(
        fs::read(collection.join("sword_2.zip")).unwrap(),
        fs::read(target.join("2/sword_2.zip")).unwrap()
    );

    let log = fs::read_to_string(workdir.join("texpack.log")).unwrap();
    assert!(log.contains("Processing finished"), "Log file should be written");
}

#[test]
fn test_missing_source_exits_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let workdir = temp_dir.path();

    run(&mut texpack(workdir));

    assert!(!workdir.join("diamond_sword_trouve").exists());
    assert!(!workdir.join("pack_folder_sword").exists());
    let log = fs::read_to_string(workdir.join("texpack.log")).unwrap();
    assert!(log.contains("Source directory does not exist"));
}

#[test]
fn test_two_fresh_runs_produce_identical_packages() {
    let temp_dir = TempDir::new().unwrap();
    let workdir = temp_dir.path();
    default_layout(workdir);

    run(texpack(workdir).args(["extract", "--no-collection"]));
    let target = workdir.join("diamond_sword_trouve");
    let first = (
        zip_entries(&target.join("1/sword_1.zip")),
        zip_entries(&target.join("2/sword_2.zip")),
    );

    fs::remove_dir_all(&target).unwrap();
    run(texpack(workdir).args(["extract", "--no-collection"]));
    let second = (
        zip_entries(&target.join("1/sword_1.zip")),
        zip_entries(&target.join("2/sword_2.zip")),
    );

    assert_eq!(first, second);
    assert!(!workdir.join("pack_folder_sword").exists());
}

#[test]
fn test_custom_paths_names_and_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let workdir = temp_dir.path();

    let template = workdir.join("tpl");
    fs::create_dir_all(&template).unwrap();
    fs::write(template.join("pack.mcmeta"), b"{}").unwrap();

    let source = workdir.join("dumps");
    fs::create_dir_all(&source).unwrap();
    write_zip(
        &source.join("old.zip"),
        &[
            ("a/bow.png", b"bow"),
            ("a/diamond_sword.png", b"sword"),
        ],
    );

    run(texpack(workdir).args([
        "extract",
        "--source",
        "dumps",
        "--target",
        "out",
        "--premade",
        "tpl",
        "--no-collection",
        "--name",
        "bow.png",
        "--prefix",
        "bow_",
        "--log-file",
        "logs/run.log",
    ]));

    let package = zip_entries(&workdir.join("out/1/bow_1.zip"));
    assert_eq!(entry(&package, "pack.png"), b"bow");
    assert_eq!(entry(&package, "assets/minecraft/textures/items/bow.png"), b"bow");
    assert!(
        package
            .iter()
            .all(|(name, _)| !name.ends_with("diamond_sword.png")),
        "Only requested names are extracted"
    );
    assert!(workdir.join("logs/run.log").is_file());
}

#[test]
fn test_config_file_drives_run() {
    let temp_dir = TempDir::new().unwrap();
    let workdir = temp_dir.path();
    default_layout(workdir);

    let config_path = workdir.join("texpack.toml");
    fs::write(
        &config_path,
        "[paths]\ntarget = \"configured/\"\ncollection = \"\"\n",
    )
    .unwrap();

    run(texpack(workdir).env("TEXPACK_CONFIG", &config_path));

    assert!(workdir.join("configured/1/sword_1.zip").is_file());
    assert!(workdir.join("configured/2/sword_2.zip").is_file());
    assert!(!workdir.join("pack_folder_sword").exists());
}
