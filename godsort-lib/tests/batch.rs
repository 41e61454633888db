mod common;

use std::cell::RefCell;
use std::collections::HashSet;

use common::*;
use godsort_lib::{
    BatchProgress, BatchRunner, BatchSummary, ClassifierThresholds, DiscCategory, Library,
    TitleId,
};

fn run(ws: &Workspace, tools: &FakeTools, pairs: &[(&str, &str)]) -> BatchSummary {
    let index = index(pairs);
    let thresholds = ClassifierThresholds::default();
    let runner = BatchRunner::new(tools, &index, Library::new(&ws.output), &thresholds);
    runner.run(ws.records(), &|_| {}).unwrap()
}

fn id(s: &str) -> TitleId {
    s.parse().unwrap()
}

#[test]
fn dlc_enumerated_before_its_base_is_still_merged() {
    // "a_dlc.iso" sorts before "b_game.iso"
    let ws = Workspace::new(&["a_dlc.iso", "b_game.iso"]);
    let tools = FakeTools::new()
        .disc("a_dlc.iso", FakeDisc::dlc("MEDIA001"))
        .disc("b_game.iso", FakeDisc::install("ABCD1234"));

    let summary = run(&ws, &tools, &[("ABCD1234", "MEDIA001")]);

    assert_eq!(summary.installed, vec![("b_game.iso".to_string(), id("ABCD1234"))]);
    assert_eq!(
        summary.merged,
        vec![("a_dlc.iso".to_string(), vec![id("ABCD1234")])]
    );
    assert!(summary.orphaned.is_empty());
    assert!(ws.output.join("ABCD1234/00000002/map_pack.bin").is_file());
    assert!(!ws.output.join("DLC").exists());
}

#[test]
fn dlc_with_unknown_media_id_is_quarantined() {
    let ws = Workspace::new(&["dlc.iso", "game.iso"]);
    let tools = FakeTools::new()
        .disc("dlc.iso", FakeDisc::dlc("UNKNOWN1"))
        .disc("game.iso", FakeDisc::install("ABCD1234"));

    let summary = run(&ws, &tools, &[("ABCD1234", "MEDIA001")]);

    assert_eq!(summary.orphaned, vec!["dlc.iso".to_string()]);
    assert!(ws.output.join("DLC/dlc.iso/00000002/map_pack.bin").is_file());
    assert!(!ws.output.join("ABCD1234/00000002").exists());
}

#[test]
fn dlc_merges_into_every_materialized_region() {
    let ws = Workspace::new(&["dlc.iso", "eu.iso", "us.iso"]);
    let tools = FakeTools::new()
        .disc("dlc.iso", FakeDisc::dlc("MEDIA001"))
        .disc("eu.iso", FakeDisc::install("AAAA0001"))
        .disc("us.iso", FakeDisc::install("AAAA0002"));

    let summary = run(
        &ws,
        &tools,
        &[
            ("AAAA0001", "MEDIA001"),
            ("AAAA0002", "MEDIA001"),
            ("AAAA0003", "MEDIA001"),
        ],
    );

    let (_, titles) = &summary.merged[0];
    let titles: HashSet<_> = titles.iter().cloned().collect();
    assert_eq!(titles, HashSet::from([id("AAAA0001"), id("AAAA0002")]));
    assert!(ws.output.join("AAAA0001/00000002/map_pack.bin").is_file());
    assert!(ws.output.join("AAAA0002/00000002/map_pack.bin").is_file());
    // Never created for a title the batch did not produce
    assert!(!ws.output.join("AAAA0003").exists());
}

#[test]
fn install_disc_counts_only_the_titles_it_wrote() {
    let ws = Workspace::new(&["a_dlc.iso", "b_dlc.iso", "game.iso"]);
    let mut install = FakeDisc::install("ABCD1234");
    install.content = vec![("OTHER123/00007000/data.bin".to_string(), b"data".to_vec())];
    let tools = FakeTools::new()
        .disc("a_dlc.iso", FakeDisc::dlc("MEDIA001"))
        .disc("b_dlc.iso", FakeDisc::dlc("MEDIA002"))
        .disc("game.iso", install);

    let summary = run(
        &ws,
        &tools,
        &[("ABCD1234", "MEDIA001"), ("OTHER123", "MEDIA002")],
    );

    assert_eq!(summary.installed, vec![("game.iso".to_string(), id("ABCD1234"))]);
    assert_eq!(summary.orphaned, vec!["a_dlc.iso".to_string()]);
    assert_eq!(
        summary.merged,
        vec![("b_dlc.iso".to_string(), vec![id("OTHER123")])]
    );
    assert!(!ws.output.join("ABCD1234").exists());
    assert!(ws.output.join("DLC/a_dlc.iso/00000002/map_pack.bin").is_file());
    assert!(ws.output.join("OTHER123/00000002/map_pack.bin").is_file());
}

#[test]
fn existing_output_titles_count_as_materialized() {
    let ws = Workspace::new(&["dlc.iso"]);
    std::fs::create_dir_all(ws.output.join("ABCD1234/00007000")).unwrap();
    let tools = FakeTools::new().disc("dlc.iso", FakeDisc::dlc("MEDIA001"));

    let summary = run(&ws, &tools, &[("ABCD1234", "MEDIA001")]);

    assert_eq!(summary.merged.len(), 1);
    assert!(ws.output.join("ABCD1234/00000002/map_pack.bin").is_file());
}

#[test]
fn play_disc_is_rebuilt_then_converted() {
    let ws = Workspace::new(&["halo.iso"]);
    let tools = FakeTools::new().disc("halo.iso", FakeDisc::play("4D5307E6"));

    let summary = run(&ws, &tools, &[]);

    assert_eq!(summary.converted, vec![("halo.iso".to_string(), id("4D5307E6"))]);
    assert_eq!(summary.rebuilt, 1);
    assert_eq!(
        tools.calls_for("convert"),
        vec!["convert halo.iso from halo.iso.rebuilt.iso".to_string()]
    );
    assert!(ws.output.join("4D5307E6/00007000/halo.iso").is_file());
    // The rebuilt image is removed after conversion
    assert!(!ws.source.join("halo.iso.rebuilt.iso").exists());
    assert!(ws.temp_dirs().is_empty());
}

#[test]
fn failed_rebuild_converts_the_original() {
    let ws = Workspace::new(&["halo.iso"]);
    let tools = FakeTools::new().disc("halo.iso", FakeDisc::play("4D5307E6").failing_rebuild());

    let summary = run(&ws, &tools, &[]);

    assert_eq!(summary.rebuilt, 0);
    assert_eq!(summary.converted.len(), 1);
    assert_eq!(
        tools.calls_for("convert"),
        vec!["convert halo.iso from halo.iso".to_string()]
    );
}

#[test]
fn play_disc_side_content_is_installed() {
    let ws = Workspace::new(&["game.iso"]);
    let tools = FakeTools::new().disc(
        "game.iso",
        FakeDisc::play("4D5307E6").file("4D5307E6/00000002/bonus.bin", b"bonus"),
    );

    run(&ws, &tools, &[]);

    assert!(ws.output.join("4D5307E6/00000002/bonus.bin").is_file());
    assert!(ws.temp_dirs().is_empty());
}

#[test]
fn failed_conversion_does_not_materialize_the_title() {
    let ws = Workspace::new(&["dlc.iso", "game.iso"]);
    let tools = FakeTools::new()
        .disc("dlc.iso", FakeDisc::dlc("MEDIA001"))
        .disc("game.iso", FakeDisc::play("ABCD1234").failing_convert());

    let summary = run(&ws, &tools, &[("ABCD1234", "MEDIA001")]);

    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "game.iso");
    assert_eq!(summary.orphaned, vec!["dlc.iso".to_string()]);
    assert!(!ws.output.join("ABCD1234").exists());
}

#[test]
fn invalid_images_have_no_side_effects() {
    let ws = Workspace::new(&["broken.iso", "untitled.iso"]);
    let tools = FakeTools::new()
        .disc("broken.iso", FakeDisc::unlisted())
        .disc("untitled.iso", FakeDisc::install("ABCD1234").no_title());

    let summary = run(&ws, &tools, &[]);

    assert_eq!(summary.invalid.len(), 2);
    assert_eq!(summary.total(), 2);
    assert!(tools.calls_for("extract").is_empty());
    assert!(tools.calls_for("convert").is_empty());
    assert_eq!(std::fs::read_dir(&ws.output).unwrap().count(), 0);
    // A broken listing skips the title probe
    assert!(!tools.calls().contains(&"probe broken.iso".to_string()));
}

#[test]
fn install_without_content_is_reported() {
    let ws = Workspace::new(&["odd.iso"]);
    let mut disc = FakeDisc::install("ABCD1234");
    disc.content.clear();
    let tools = FakeTools::new().disc("odd.iso", disc);

    let summary = run(&ws, &tools, &[]);

    assert_eq!(summary.failed.len(), 1);
    assert!(summary.installed.is_empty());
    assert!(ws.temp_dirs().is_empty());
}

#[test]
fn every_unresolved_dlc_is_listed_once() {
    let ws = Workspace::new(&["d1.iso", "d2.iso", "d3.iso", "game.iso"]);
    let mut no_payload = FakeDisc::dlc("MEDIA001");
    no_payload.content.clear();
    let tools = FakeTools::new()
        .disc("d1.iso", FakeDisc::dlc("UNKNOWN1"))
        .disc("d2.iso", FakeDisc::dlc("MEDIA001").failing_extract())
        .disc("d3.iso", no_payload)
        .disc("game.iso", FakeDisc::play("ABCD1234"));

    let summary = run(&ws, &tools, &[("ABCD1234", "MEDIA001")]);

    assert_eq!(
        summary.orphaned,
        vec!["d1.iso".to_string(), "d2.iso".to_string(), "d3.iso".to_string()]
    );
    assert!(summary.merged.is_empty());
    assert!(summary.has_orphans());
    assert_eq!(summary.total(), 4);
    assert!(ws.temp_dirs().is_empty());
}

#[test]
fn dlc_is_resolved_after_every_dispatch() {
    let ws = Workspace::new(&["a_dlc.iso", "b_game.iso"]);
    let tools = FakeTools::new()
        .disc("a_dlc.iso", FakeDisc::dlc("MEDIA001"))
        .disc("b_game.iso", FakeDisc::play("ABCD1234"));

    run(&ws, &tools, &[("ABCD1234", "MEDIA001")]);

    let calls = tools.calls();
    let dlc_extract = calls
        .iter()
        .position(|c| c == "extract a_dlc.iso FFED2000")
        .unwrap();
    let convert = calls.iter().position(|c| c.starts_with("convert b_game.iso")).unwrap();
    assert!(convert < dlc_extract);
}

#[test]
fn progress_reports_classification_in_order() {
    let ws = Workspace::new(&["a.iso", "b.iso"]);
    let tools = FakeTools::new()
        .disc("a.iso", FakeDisc::dlc("MEDIA001"))
        .disc("b.iso", FakeDisc::play("ABCD1234"));
    let index = index(&[]);
    let thresholds = ClassifierThresholds::default();
    let runner = BatchRunner::new(&tools, &index, Library::new(&ws.output), &thresholds);

    let events = RefCell::new(Vec::new());
    runner
        .run(ws.records(), &|event| events.borrow_mut().push(event))
        .unwrap();
    let events = events.into_inner();

    assert_eq!(events.first(), Some(&BatchProgress::Started { total: 2 }));
    assert_eq!(events.last(), Some(&BatchProgress::Done));
    let classified: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            BatchProgress::Classified {
                index, category, ..
            } => Some((*index, *category)),
            _ => None,
        })
        .collect();
    assert_eq!(
        classified,
        vec![(1, DiscCategory::Dlc), (2, DiscCategory::Play)]
    );
    assert!(events.iter().any(|e| matches!(
        e,
        BatchProgress::Resolving { index: 1, total: 2, .. }
    )));
    assert!(events.contains(&BatchProgress::Converting {
        file_name: "b.iso".to_string(),
        percent: 100,
    }));
}

#[test]
fn plan_classifies_without_writing() {
    let ws = Workspace::new(&["a.iso", "b.iso"]);
    let tools = FakeTools::new()
        .disc("a.iso", FakeDisc::install("ABCD1234"))
        .disc("b.iso", FakeDisc::unlisted());
    let index = index(&[]);
    let thresholds = ClassifierThresholds::default();
    let runner = BatchRunner::new(&tools, &index, Library::new(&ws.output), &thresholds);

    let records = runner.plan(ws.records(), &|_| {});

    assert_eq!(records[0].category, DiscCategory::Install);
    assert_eq!(records[0].id_label(), "ABCD1234");
    assert_eq!(records[1].category, DiscCategory::Invalid);
    assert!(tools.calls_for("extract").is_empty());
    assert_eq!(std::fs::read_dir(&ws.output).unwrap().count(), 0);
}

#[test]
fn missing_output_root_aborts() {
    let ws = Workspace::new(&[]);
    let tools = FakeTools::new();
    let index = index(&[]);
    let thresholds = ClassifierThresholds::default();
    let runner = BatchRunner::new(
        &tools,
        &index,
        Library::new(ws.dir.path().join("missing")),
        &thresholds,
    );

    assert!(runner.run(Vec::new(), &|_| {}).is_err());
}
