mod common;

use brahe_core::{Discrepancy, Mode, RunOptions};
use common::{assert_full_progress, run_mode, write_file};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_matched_and_wrong_hash() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    write_file(&source, "a.txt", "X");
    write_file(&source, "b.txt", "Y");
    write_file(&target, "a.txt", "X");
    write_file(&target, "b.txt", "Z");

    let (summary, reporter) = run_mode(&[&source, &target], Mode::Compare, RunOptions::default()).unwrap();

    assert_eq!(summary.counts.matched, 1);
    assert_eq!(summary.counts.mismatched, 1);
    assert_eq!(summary.counts.missing, 0);
    assert_full_progress(&summary);

    let discrepancies = reporter.discrepancies();
    assert_eq!(discrepancies.len(), 1);
    match &discrepancies[0] {
        Discrepancy::WrongHash { path, expected, actual } => {
            assert_eq!(path, &target.join("b.txt"));
            assert_ne!(expected, actual);
        }
        other => panic!("unexpected discrepancy {:?}", other),
    }
    assert_eq!(reporter.verified.lock().unwrap().len(), 2);
}

#[test]
fn test_haystack_extras_are_not_reported() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    write_file(&source, "keep/a.txt", "same");
    write_file(&target, "keep/a.txt", "same");
    write_file(&target, "keep/extra.txt", "extra");
    write_file(&target, "bonus/deep/file.bin", "bonus");
    write_file(&target, "top.txt", "top");

    let (summary, reporter) = run_mode(&[&source, &target], Mode::Compare, RunOptions::default()).unwrap();

    assert_eq!(summary.counts.missing, 0);
    assert_eq!(summary.counts.mismatched, 0);
    // keep/ and keep/a.txt
    assert_eq!(summary.counts.matched, 2);
    assert!(reporter.discrepancies().is_empty());
    assert_full_progress(&summary);
}

#[test]
fn test_missing_directory_reported_per_target_without_recursion() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");
    write_file(&source, "photos/one.jpg", "1");
    write_file(&source, "photos/two.jpg", "2");
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();

    let (summary, reporter) =
        run_mode(&[&source, &first, &second], Mode::Compare, RunOptions::default()).unwrap();

    assert_eq!(summary.counts.missing, 2);
    assert_eq!(summary.counts.matched, 0);
    let discrepancies = reporter.discrepancies();
    assert_eq!(
        discrepancies,
        vec![
            Discrepancy::Missing { path: first.join("photos") },
            Discrepancy::Missing { path: second.join("photos") },
        ]
    );
    assert_full_progress(&summary);
}

#[test]
fn test_partial_presence_recurses_into_targets_that_have_it() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");
    write_file(&source, "docs/readme.md", "hello");
    write_file(&first, "docs/readme.md", "hello");
    fs::create_dir_all(&second).unwrap();

    let (summary, reporter) =
        run_mode(&[&source, &first, &second], Mode::Compare, RunOptions::default()).unwrap();

    // docs/ in first, docs/readme.md in first
    assert_eq!(summary.counts.matched, 2);
    assert_eq!(summary.counts.missing, 1);
    assert_eq!(
        reporter.discrepancies(),
        vec![Discrepancy::Missing { path: second.join("docs") }]
    );
}

#[test]
fn test_type_mismatch_is_not_missing_and_not_descended() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    write_file(&source, "thing/inner.txt", "inner");
    write_file(&source, "plain", "file");
    write_file(&target, "thing", "i am a file");
    write_file(&target, "plain/child.txt", "i am a dir");

    let (summary, reporter) = run_mode(&[&source, &target], Mode::Compare, RunOptions::default()).unwrap();

    assert_eq!(summary.counts.mismatched, 2);
    assert_eq!(summary.counts.missing, 0);
    assert_eq!(summary.counts.matched, 0);

    let discrepancies = reporter.discrepancies();
    assert_eq!(discrepancies.len(), 2);
    assert!(discrepancies.iter().all(|d| matches!(d, Discrepancy::KindMismatch { .. })));
    assert!(discrepancies.contains(&Discrepancy::KindMismatch {
        source: source.join("thing"),
        target: target.join("thing"),
        source_is_dir: true,
    }));
    assert_full_progress(&summary);
}

#[test]
fn test_depth_limit_stops_descent() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    write_file(&source, "top.txt", "t");
    write_file(&source, "sub/deep.txt", "only in source");
    write_file(&source, "sub/deeper/file.txt", "x");
    write_file(&target, "top.txt", "t");
    fs::create_dir_all(target.join("sub")).unwrap();

    let options = RunOptions {
        depth: 0,
        ..RunOptions::default()
    };
    let (summary, reporter) = run_mode(&[&source, &target], Mode::Compare, options).unwrap();
    assert_eq!(summary.counts.matched, 2);
    assert_eq!(summary.counts.missing, 0);
    assert!(reporter.discrepancies().is_empty());
    assert_full_progress(&summary);

    let options = RunOptions {
        depth: 1,
        ..RunOptions::default()
    };
    let (summary, _) = run_mode(&[&source, &target], Mode::Compare, options).unwrap();
    // sub/deep.txt and sub/deeper are now visible, but not deeper/file.txt
    assert_eq!(summary.counts.missing, 2);
    assert_full_progress(&summary);
}

#[test]
fn test_system_names_ignored_by_default() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    write_file(&source, "Thumbs.db", "thumbs");
    write_file(&source, "album/Thumbs.db", "thumbs");
    write_file(&source, "$RECYCLE.BIN/junk", "junk");
    write_file(&source, "album/pic.jpg", "pic");
    write_file(&target, "album/pic.jpg", "pic");

    let (summary, reporter) = run_mode(&[&source, &target], Mode::Compare, RunOptions::default()).unwrap();
    assert_eq!(summary.counts.ignored, 3);
    assert_eq!(summary.counts.missing, 0);
    assert!(reporter.discrepancies().is_empty());
    assert_full_progress(&summary);

    let options = RunOptions {
        include_system_names: true,
        ..RunOptions::default()
    };
    let (summary, _) = run_mode(&[&source, &target], Mode::Compare, options).unwrap();
    assert_eq!(summary.counts.ignored, 0);
    assert_eq!(summary.counts.missing, 3);
}

#[test]
fn test_no_data_skips_content() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    write_file(&source, "a.txt", "one");
    write_file(&target, "a.txt", "two");

    let options = RunOptions {
        compare_contents: false,
        ..RunOptions::default()
    };
    let (summary, reporter) = run_mode(&[&source, &target], Mode::Compare, options).unwrap();
    assert_eq!(summary.counts.matched, 1);
    assert_eq!(summary.counts.mismatched, 0);
    assert!(reporter.verified.lock().unwrap().is_empty());
}

#[test]
fn test_every_source_entry_visited_once() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    for root in [&source, &target] {
        write_file(root, "a.txt", "a");
        write_file(root, "d/b.txt", "b");
        write_file(root, "d/e/c.txt", "c");
        write_file(root, "d/e/f/g/h.txt", "h");
        write_file(root, "x/y.txt", "y");
    }

    let (summary, reporter) = run_mode(&[&source, &target], Mode::Compare, RunOptions::default()).unwrap();
    // files: a, b, c, h, y; dirs: d, e, f, g, x
    assert_eq!(summary.counts.matched, 10);
    assert_eq!(reporter.verified.lock().unwrap().len(), 5);
    assert_full_progress(&summary);
}

#[test]
fn test_progress_converges_on_uneven_tree() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    for i in 0..7 {
        write_file(&source, &format!("seven/{}.txt", i), "s");
    }
    for i in 0..3 {
        write_file(&source, &format!("three/nested/{}.txt", i), "t");
    }
    fs::create_dir_all(source.join("empty")).unwrap();
    write_file(&source, "lonely.txt", "l");
    fs::create_dir_all(&target).unwrap();
    write_file(&target, "seven/0.txt", "s");
    fs::create_dir_all(target.join("empty")).unwrap();

    let (summary, _) = run_mode(&[&source, &target], Mode::Compare, RunOptions::default()).unwrap();
    assert_full_progress(&summary);
}

#[test]
fn test_empty_source_consumes_whole_budget() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("source");
    let target = tmp.path().join("target");
    fs::create_dir_all(&source).unwrap();
    write_file(&target, "whatever.txt", "w");

    let (summary, _) = run_mode(&[&source, &target], Mode::Compare, RunOptions::default()).unwrap();
    assert_eq!(summary.counts, Default::default());
    assert_full_progress(&summary);
}

#[test]
fn test_unlistable_source_is_fatal() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("does-not-exist");
    let target = tmp.path().join("target");
    fs::create_dir_all(&target).unwrap();

    let err = run_mode(&[&source, &target], Mode::Compare, RunOptions::default()).unwrap_err();
    assert!(matches!(err, brahe_core::Error::Io { .. }));
}
