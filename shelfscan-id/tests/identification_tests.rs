//! End-to-end identification against an in-memory catalogue

mod helpers;

use helpers::{
    capture_logs, engine_for, engine_with_settings, fragment_indices, shelf_from_lines,
    FakeCatalogue,
};
use shelfscan_id::engine::EngineSettings;
use std::sync::Arc;
use tracing::Level;

fn catalogue() -> FakeCatalogue {
    FakeCatalogue::new()
        .with_book("Walter Scott", "The Talisman")
        .with_book("George Orwell", "Animal Farm")
        .with_book("Franz Kafka", "The Trial")
}

#[tokio::test]
async fn test_single_line_author_title() {
    let catalogue = Arc::new(catalogue());
    let (_client, engine) = engine_for(Arc::clone(&catalogue));

    let shelf = engine
        .identify_books(shelf_from_lines(&["Walter Scott THE TALISMAN"]))
        .await;

    assert_eq!(shelf.len(), 1);
    assert_eq!(shelf.spines[0].author.as_deref(), Some("Walter Scott"));
    assert_eq!(shelf.spines[0].title.as_deref(), Some("The Talisman"));
    assert!(shelf.fragments.iter().all(|f| f.consumed));
    assert!(catalogue.calls_for("walter scott", "talisman") >= 1);
}

#[tokio::test]
async fn test_title_first_line() {
    let (_client, engine) = engine_for(Arc::new(catalogue()));

    let shelf = engine
        .identify_books(shelf_from_lines(&["THE TRIAL FRANZ KAFKA"]))
        .await;

    assert_eq!(shelf.spines[0].author.as_deref(), Some("Franz Kafka"));
    assert_eq!(shelf.spines[0].title.as_deref(), Some("The Trial"));
}

#[tokio::test]
async fn test_adjacent_spines_heal_into_one_book() {
    let (_client, engine) = engine_for(Arc::new(catalogue()));

    let shelf = engine
        .identify_books(shelf_from_lines(&[
            "Walter Scott THE TALISMAN",
            "GEORGE ORWELL",
            "ANIMAL FARM",
            "Franz Kafka The Trial",
        ]))
        .await;

    assert_eq!(shelf.len(), 3);
    assert_eq!(shelf.spines[1].spine, "GEORGE ORWELL ANIMAL FARM");
    assert_eq!(shelf.spines[1].author.as_deref(), Some("George Orwell"));
    assert_eq!(shelf.spines[1].title.as_deref(), Some("Animal Farm"));
    assert_eq!(shelf.spines[2].author.as_deref(), Some("Franz Kafka"));

    // Fragment count preserved; everything after the merge shifted down by one
    assert_eq!(shelf.fragments.len(), 12);
    assert_eq!(fragment_indices(&shelf), vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
    assert_eq!(shelf.leftover_fragments().count(), 0);
}

#[tokio::test]
async fn test_permuted_spines_heal() {
    let (_client, engine) = engine_for(Arc::new(catalogue()));

    let shelf = engine
        .identify_books(shelf_from_lines(&["FARM GEORGE ORWELL", "ANIMAL"]))
        .await;

    assert_eq!(shelf.len(), 1);
    assert_eq!(shelf.spines[0].spine, "ANIMAL FARM GEORGE ORWELL");
    assert_eq!(shelf.spines[0].author.as_deref(), Some("George Orwell"));
    assert_eq!(fragment_indices(&shelf), vec![0, 0, 0, 0]);
    assert!(shelf.fragments.iter().all(|f| f.consumed));
}

#[tokio::test]
async fn test_mangled_words_heal() {
    let (_client, engine) = engine_for(Arc::new(catalogue()));

    let shelf = engine
        .identify_books(shelf_from_lines(&["ORWELL ANIMAL", "GEORGE FARM"]))
        .await;

    assert_eq!(shelf.len(), 1);
    assert_eq!(shelf.spines[0].spine, "GEORGE ORWELL ANIMAL FARM");
    assert_eq!(shelf.spines[0].title.as_deref(), Some("Animal Farm"));

    // Fragments keep their original order
    let texts: Vec<&str> = shelf.fragments.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, vec!["ORWELL", "ANIMAL", "GEORGE", "FARM"]);
}

#[tokio::test]
async fn test_mangled_window_over_word_limit_is_skipped() {
    let settings = EngineSettings {
        mangle_word_limit: 3,
        ..EngineSettings::default()
    };
    let (_client, engine) = engine_with_settings(Arc::new(catalogue()), settings);

    let shelf = engine
        .identify_books(shelf_from_lines(&["ORWELL ANIMAL", "GEORGE FARM"]))
        .await;

    assert_eq!(shelf.len(), 2);
    assert_eq!(shelf.resolved_count(), 0);
    assert_eq!(shelf.leftover_fragments().count(), 4);
}

#[tokio::test]
async fn test_backend_failure_is_local_to_its_query() {
    let catalogue = Arc::new(catalogue().failing_on("walter scott"));
    let (client, engine) = engine_for(Arc::clone(&catalogue));
    let (logs, _guard) = capture_logs();

    let shelf = engine
        .identify_books(shelf_from_lines(&["Walter Scott THE TALISMAN", "Franz Kafka The Trial"]))
        .await;

    assert!(shelf.spines[0].author.is_none());
    assert_eq!(shelf.spines[1].author.as_deref(), Some("Franz Kafka"));

    // Failures are never cached, so later phases ask again
    assert!(catalogue.calls_for("walter scott", "talisman") > 1);
    assert!(client.backend_calls() >= catalogue.calls());
    assert!(logs.count_at(Level::WARN) > 0);
    logs.assert_contains("Search failed");
}

#[tokio::test]
async fn test_repeat_run_is_served_from_cache() {
    let catalogue = Arc::new(catalogue());
    let (client, engine) = engine_for(Arc::clone(&catalogue));
    let lines = ["Walter Scott THE TALISMAN", "SOMETHING UNKNOWN ENTIRELY"];

    let first = engine.identify_books(shelf_from_lines(&lines)).await;
    let calls = catalogue.calls();
    assert!(calls > 0);
    assert_eq!(client.backend_calls(), calls);

    let second = engine.identify_books(shelf_from_lines(&lines)).await;

    assert_eq!(catalogue.calls(), calls);
    assert_eq!(first, second);
    assert_eq!(catalogue.calls_for("walter scott", "talisman"), 1);
}

#[tokio::test]
async fn test_unresolved_spines_are_reported() {
    let (_client, engine) = engine_for(Arc::new(catalogue()));
    let (logs, _guard) = capture_logs();

    let (shelf, summaries) = engine
        .identify_books_with_summary(shelf_from_lines(&[
            "Walter Scott THE TALISMAN",
            "NOTHING HERE",
        ]))
        .await;

    assert_eq!(summaries.len(), engine.phases().len());
    assert_eq!(summaries[0].resolved, 1);
    assert_eq!(summaries.iter().map(|s| s.resolved).sum::<usize>(), 1);

    assert!(shelf.spines[1].author.is_none());
    assert!(shelf.spines[1].title.is_none());

    logs.assert_contains("RESULT: Walter Scott - The Talisman");
    logs.assert_contains("LEFTOVER: spine 1 NOTHING");
    logs.assert_contains("LEFTOVER: spine 1 HERE");
}
