//! Integration tests for the index
//!
//! Pages are built the way the crawler builds them, then indexed, searched
//! and persisted through the public API.

use fossen::index::{IndexError, IndexFile, PersistReport};
use fossen::{extract_words_and_frequencies, Indexer, PageRecord};
use std::fs;
use tempfile::TempDir;
use url::Url;

fn index_text(indexer: &mut Indexer, url: &str, text: &str) -> bool {
    let words = extract_words_and_frequencies(text);
    for word in words.keys() {
        indexer.add_word(word);
    }
    let url = Url::parse(url).unwrap();
    let html = format!("<html><body>{}</body></html>", text);
    indexer.add_page(PageRecord::from_page(&url, "", &html, &words))
}

fn sample_index(directory: &std::path::Path) -> Indexer {
    let mut indexer = Indexer::with_database_directory(directory);
    assert!(index_text(
        &mut indexer,
        "https://a.com/",
        "ferries cross the harbour every morning"
    ));
    assert!(index_text(
        &mut indexer,
        "https://a.com/timetable",
        "ferries timetable ferries fares"
    ));
    assert!(index_text(
        &mut indexer,
        "https://b.com/",
        "mountain railways and ferries"
    ));
    indexer
}

fn assert_complete(report: &PersistReport) {
    assert!(
        report.is_complete(),
        "failures: {:?}",
        report
            .failures
            .iter()
            .map(|(file, e)| format!("{}: {}", file, e))
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_save_clear_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut indexer = sample_index(dir.path());
    let before = indexer.search_ranked(&["ferries"])
        .into_iter()
        .map(|(page, _)| page.url.clone())
        .collect::<Vec<_>>();

    assert_complete(&indexer.save());
    let saved = indexer.clone();

    indexer.clear();
    assert_eq!(indexer.page_count(), 0);
    assert_eq!(indexer.database_directory(), Some(dir.path()));

    assert_complete(&indexer.load());
    assert_eq!(indexer.word_count(), saved.word_count());
    assert_eq!(indexer.page_count(), saved.page_count());
    for page in saved.pages() {
        assert_eq!(indexer.page_by_url_hash(page.url_hash), Some(page));
    }

    let after = indexer
        .search_ranked(&["ferries"])
        .into_iter()
        .map(|(page, _)| page.url.clone())
        .collect::<Vec<_>>();
    assert_eq!(before, after);
}

#[test]
fn test_save_writes_three_files() {
    let dir = TempDir::new().unwrap();
    let indexer = sample_index(dir.path());
    assert_complete(&indexer.save());

    for file in IndexFile::ALL {
        assert!(dir.path().join(file.file_name()).is_file(), "{} missing", file);
    }
}

#[test]
fn test_load_into_fresh_indexer() {
    let dir = TempDir::new().unwrap();
    assert_complete(&sample_index(dir.path()).save());

    let mut fresh = Indexer::with_database_directory(dir.path());
    assert_complete(&fresh.load());

    let results = fresh.search_ranked(&["timetable"]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.url, "https://a.com/timetable");
}

#[test]
fn test_version_mismatch_leaves_table_unchanged() {
    let dir = TempDir::new().unwrap();
    assert_complete(&sample_index(dir.path()).save());

    // bump the low byte of the leading u64 version of the dictionary file
    let dictionary = dir.path().join(IndexFile::Dictionary.file_name());
    let mut bytes = fs::read(&dictionary).unwrap();
    bytes[0] = bytes[0].wrapping_add(1);
    fs::write(&dictionary, bytes).unwrap();

    let mut indexer = Indexer::with_database_directory(dir.path());
    let report = indexer.load();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, IndexFile::Dictionary);
    assert!(matches!(
        report.failures[0].1,
        IndexError::VersionMismatch { .. }
    ));
    assert_eq!(indexer.word_count(), 0);
    assert_eq!(indexer.page_count(), 3);
}

#[test]
fn test_truncated_metadata_keeps_scores_consistent() {
    let dir = TempDir::new().unwrap();
    assert_complete(&sample_index(dir.path()).save());

    let metadata = dir.path().join(IndexFile::PageMetadata.file_name());
    let bytes = fs::read(&metadata).unwrap();
    fs::write(&metadata, &bytes[..bytes.len() - 4]).unwrap();

    let mut indexer = Indexer::with_database_directory(dir.path());
    let report = indexer.load();
    assert!(matches!(
        report.failures.as_slice(),
        [(IndexFile::PageMetadata, IndexError::Truncated { .. })]
    ));
    assert_eq!(indexer.page_count(), 2);

    // "ferries" was on all three saved pages
    let results = indexer.search_ranked(&["ferries"]);
    assert_eq!(results.len(), indexer.page_count());
    assert!(results.iter().all(|(_, score)| *score >= 0.0));
    for page in indexer.pages() {
        assert!(indexer.tf_idf_score(page, "ferries") >= 0.0);
    }
}

#[test]
fn test_page_outside_index_scores_zero() {
    let dir = TempDir::new().unwrap();
    let indexer = sample_index(dir.path());

    let words = extract_words_and_frequencies("ferries timetable");
    let stranger = PageRecord::from_page(
        &Url::parse("https://elsewhere.com/").unwrap(),
        "",
        "<p>ferries timetable</p>",
        &words,
    );

    assert_eq!(indexer.tf_idf_score(&stranger, "timetable"), 0.0);
    assert_eq!(indexer.tf_idf_score_words(&stranger, &["ferries", "timetable"]), 0.0);
}

#[test]
fn test_missing_directory_reports_failures() {
    let dir = TempDir::new().unwrap();
    let mut indexer = Indexer::with_database_directory(dir.path().join("absent"));
    let report = indexer.load();

    assert_eq!(report.failures.len(), IndexFile::ALL.len());
    assert!(report.completed.is_empty());
}

#[test]
fn test_no_directory_configured() {
    let indexer = Indexer::new();
    let report = indexer.save();
    assert!(!report.is_complete());
    assert!(report
        .failures
        .iter()
        .all(|(_, e)| matches!(e, IndexError::NoDatabaseDirectory)));
}

#[test]
fn test_merge_skips_known_pages() {
    let dir = TempDir::new().unwrap();
    let mut base = sample_index(dir.path());

    let mut other = Indexer::new();
    assert!(index_text(
        &mut other,
        "https://a.com/",
        "ferries cross the harbour every morning"
    ));
    assert!(index_text(
        &mut other,
        "https://c.com/",
        "lighthouse keepers and ferries"
    ));

    assert_eq!(base.merge(&other), 1);
    assert_eq!(base.page_count(), 4);
    assert!(base.contains_word("lighthouse"));
    assert_eq!(base.search_ranked(&["ferries"]).len(), 4);
}

#[test]
fn test_duplicate_content_under_new_url_is_rejected() {
    let mut indexer = Indexer::new();
    assert!(index_text(&mut indexer, "https://a.com/", "shared article text"));
    assert!(!index_text(&mut indexer, "https://mirror.com/", "shared article text"));
    assert_eq!(indexer.page_count(), 1);
}

#[test]
fn test_ranking_prefers_denser_pages() {
    let dir = TempDir::new().unwrap();
    let indexer = sample_index(dir.path());

    // "ferries" is everywhere, so rank on a word only some pages share
    let results = indexer.search_ranked(&["ferries", "timetable"]);
    assert_eq!(results.len(), 1);

    let mut indexer = indexer;
    assert!(index_text(
        &mut indexer,
        "https://d.com/",
        "harbour harbour harbour"
    ));
    let results = indexer.search_ranked(&["harbour"]);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.url, "https://d.com/");
    assert!(results[0].1 > results[1].1);
}
