use bookcard::cache::{ContentCache, KEY_AUTHOR, KEY_BOOK, KEY_QUOTE, KEY_SEAL};
use bookcard::CardContent;
use tempfile::TempDir;

#[test]
fn save_then_load_returns_exactly_what_was_saved() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::new(dir.path().join("content.json"));

    let content = CardContent {
        quote: "x".into(),
        book: String::new(),
        author: "y".into(),
        seal: String::new(),
    };
    assert!(cache.save_content(&content));
    assert_eq!(cache.load_content(), content);
}

#[test]
fn empty_string_is_distinct_from_key_absent() {
    let dir = TempDir::new().unwrap();
    let cache = ContentCache::new(dir.path().join("content.json"));

    // store, then overwrite with empty: the key disappears
    cache.save(KEY_BOOK, "temp");
    cache.save(KEY_BOOK, "");
    assert_eq!(cache.load(KEY_BOOK, "<absent>"), "<absent>");

    // a never-written key also reads as absent
    assert_eq!(cache.load(KEY_SEAL, "<absent>"), "<absent>");
    // while a real value round-trips
    cache.save(KEY_QUOTE, "quoted");
    assert_eq!(cache.load(KEY_QUOTE, "<absent>"), "quoted");
}

#[test]
fn cache_survives_reopening() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.json");
    {
        let cache = ContentCache::new(&path);
        cache.save(KEY_AUTHOR, "苏轼");
    }
    let reopened = ContentCache::new(&path);
    assert!(reopened.has_cached_content());
    assert_eq!(reopened.load(KEY_AUTHOR, ""), "苏轼");
}

#[test]
fn disabled_cache_never_persists_and_never_errors() {
    let cache = ContentCache::disabled();
    assert!(!cache.save_content(&CardContent {
        quote: "ignored".into(),
        ..Default::default()
    }));
    assert_eq!(cache.load_content(), CardContent::default());
    assert!(!cache.has_cached_content());
    assert!(!cache.clear());
}
