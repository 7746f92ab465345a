//! Newsrc file parsing, staleness detection, locking and atomic rewrite

use nntp_newsrc::newsrc::{format_newsrc, parse_newsrc, write_atomic};
use nntp_newsrc::{GroupRegistry, NewsrcFile, Outcome, RangeSet};
use std::fs;
use tempfile::TempDir;

const SAMPLE: &str = "\
comp.lang.rust: 1-1041,1043,1050-1052
alt.test! 1-20
this line has no marker
news.answers:
misc.test: bogus
";

#[test]
fn test_parse_sample() {
    crate::init_logging();
    let mut registry = GroupRegistry::new();
    assert_eq!(parse_newsrc(&mut registry, SAMPLE), 4);

    let names: Vec<&str> = registry.iter().map(|g| g.name()).collect();
    assert_eq!(names, ["comp.lang.rust", "alt.test", "news.answers", "misc.test"]);

    let rust = registry.get("comp.lang.rust").unwrap();
    assert!(rust.subscribed);
    assert_eq!(rust.last_article, 1052);
    assert!(rust.is_read(1043));
    assert!(!rust.is_read(1042));

    assert!(!registry.get("alt.test").unwrap().subscribed);
    assert_eq!(
        registry.get("news.answers").unwrap().read_ranges(),
        Some(&RangeSet::empty())
    );
    assert_eq!(
        registry.get("misc.test").unwrap().read_ranges(),
        Some(&RangeSet::empty())
    );
}

#[test]
fn test_format_round_trip() {
    let mut registry = GroupRegistry::new();
    parse_newsrc(&mut registry, SAMPLE);
    registry.find_or_create("no.ranges.yet").subscribed = true;

    assert_eq!(
        format_newsrc(&registry),
        "comp.lang.rust: 1-1041,1043,1050-1052\n\
         alt.test! 1-20\n\
         news.answers: \n\
         misc.test: \n"
    );
}

#[test]
fn test_file_update_then_parse() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("newsrc");

    let mut registry = GroupRegistry::new();
    registry.subscribe("comp.lang.rust").unwrap();
    registry
        .get_mut("comp.lang.rust")
        .unwrap()
        .set_read_ranges(RangeSet::parse("1-10,15"));
    registry.subscribe("alt.test");
    registry.unsubscribe("alt.test", true);

    let mut writer = NewsrcFile::new(&path);
    assert_eq!(writer.update(&registry).unwrap(), Outcome::Updated);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "comp.lang.rust: 1-10,15\nalt.test! \n"
    );

    let mut reader = NewsrcFile::new(&path);
    let mut loaded = GroupRegistry::new();
    assert_eq!(reader.parse(&mut loaded).unwrap(), Outcome::Updated);
    reader.close();

    let rust = loaded.get("comp.lang.rust").unwrap();
    assert!(rust.subscribed);
    assert_eq!(rust.read_ranges().unwrap().to_string(), "1-10,15");
    assert!(!loaded.get("alt.test").unwrap().subscribed);
}

#[test]
fn test_unchanged_file_keeps_local_edits() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("newsrc");
    fs::write(&path, "alt.test: 1-5\n").unwrap();

    let mut file = NewsrcFile::new(&path);
    let mut registry = GroupRegistry::new();
    assert_eq!(file.parse(&mut registry).unwrap(), Outcome::Updated);

    registry
        .get_mut("alt.test")
        .unwrap()
        .set_read_ranges(RangeSet::parse("1-99"));
    assert_eq!(file.parse(&mut registry).unwrap(), Outcome::Unchanged);
    assert_eq!(
        registry.get("alt.test").unwrap().read_ranges().unwrap().to_string(),
        "1-99"
    );
}

#[test]
fn test_external_edit_resets_missing_groups() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("newsrc");
    fs::write(&path, "alt.test: 1-5\ncomp.lang.rust: 1-3\n").unwrap();

    let mut file = NewsrcFile::new(&path);
    let mut registry = GroupRegistry::new();
    file.parse(&mut registry).unwrap();
    file.close();

    // different size, so the change is seen regardless of mtime resolution
    fs::write(&path, "alt.test: 1-500\n").unwrap();
    assert_eq!(file.parse(&mut registry).unwrap(), Outcome::Updated);
    file.close();

    let rust = registry.get("comp.lang.rust").unwrap();
    assert!(!rust.subscribed);
    assert!(!rust.has_ranges());
    assert_eq!(
        registry.get("alt.test").unwrap().read_ranges().unwrap().to_string(),
        "1-500"
    );
}

#[test]
fn test_parse_creates_missing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fresh-newsrc");

    let mut file = NewsrcFile::new(&path);
    let mut registry = GroupRegistry::new();
    assert_eq!(file.parse(&mut registry).unwrap(), Outcome::Updated);
    assert!(file.is_locked());
    assert!(path.exists());
    assert!(registry.is_empty());
}

#[test]
fn test_parse_fails_in_missing_directory() {
    let tmp = TempDir::new().unwrap();
    let mut file = NewsrcFile::new(tmp.path().join("nope/newsrc"));
    assert!(file.parse(&mut GroupRegistry::new()).is_err());
    assert!(!file.is_locked());
}

#[test]
fn test_write_atomic_failure_leaves_target_alone() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("target");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep"), "original").unwrap();

    // a file can't be renamed over a non-empty directory
    assert!(write_atomic(&target, b"replacement").is_err());
    assert_eq!(fs::read_to_string(target.join("keep")).unwrap(), "original");
    assert!(!tmp.path().join("target.tmp").exists());
}

#[test]
fn test_write_atomic_replaces_contents() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("newsrc");
    fs::write(&target, "old contents that are longer\n").unwrap();

    write_atomic(&target, b"new\n").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "new\n");
    assert!(!tmp.path().join("newsrc.tmp").exists());
}
