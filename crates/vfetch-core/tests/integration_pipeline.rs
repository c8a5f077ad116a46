//! Integration tests: full pipeline runs against a local HTTP server.

mod common;

use common::image_server::ImageServer;
use common::encoded_image;
use image::ImageFormat;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use vfetch_core::config::VfetchConfig;
use vfetch_core::error::PipelineError;
use vfetch_core::http::HttpClient;
use vfetch_core::normalize::ShapeMode;
use vfetch_core::pipeline::{Pipeline, PipelineOptions};
use vfetch_core::source::{SourceKind, SourceProvider};

fn config_for(server: &ImageServer) -> VfetchConfig {
    let mut cfg = VfetchConfig::default();
    cfg.forum.base_url = server.base_url().to_string();
    cfg.placeholder.base_url = server.base_url().to_string();
    cfg.stock.base_url = server.base_url().to_string();
    cfg.download_timeout_secs = 5;
    cfg.forum.timeout_secs = 5;
    cfg
}

fn pipeline(cfg: &VfetchConfig, kind: SourceKind, dir: &Path) -> Pipeline {
    let mut opts = PipelineOptions::from_config(cfg, dir.to_path_buf());
    opts.seed = Some(0xC0FFEE);
    Pipeline::new(
        SourceProvider::from_config(kind, cfg),
        HttpClient::new(cfg.user_agent.clone()),
        opts,
    )
}

fn pngs(dir: &Path) -> Vec<PathBuf> {
    let mut v: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "png"))
        .collect();
    v.sort();
    v
}

fn dims(path: &Path) -> (u32, u32) {
    image::open(path).unwrap().to_rgba8().dimensions()
}

#[test]
fn placeholder_count_three_cap_two() {
    let server = ImageServer::start();
    server.fallback(200, encoded_image(48, 32, ImageFormat::Jpeg));
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = config_for(&server);
    cfg.count = 3;
    cfg.max_files = 2;
    let summary = pipeline(&cfg, SourceKind::Placeholder, dir.path())
        .run()
        .expect("run");

    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.saved.len(), 3);
    assert_eq!(summary.pruned.len(), 1);
    let left = pngs(dir.path());
    assert_eq!(left.len(), 2);
    for p in &left {
        assert!(summary.saved.contains(p));
        assert_eq!(dims(p), (32, 32));
    }
    // Every request targets the seeded placeholder path at the configured resolution.
    for req in server.requests() {
        assert!(req.starts_with("GET /seed/"), "{}", req);
        assert!(req.contains("/512/512 HTTP/1.1"));
        assert!(req.contains("User-Agent: glitch-variant-fetch/1.0"));
    }
}

#[test]
fn pruning_keeps_most_recent_across_runs() {
    let server = ImageServer::start();
    server.fallback(200, encoded_image(20, 20, ImageFormat::Png));
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();
    for (name, age) in [("old-a.png", 3000u64), ("old-b.png", 2000), ("old-c.png", 1000)] {
        let f = File::create(dir.path().join(name)).unwrap();
        f.set_modified(now - Duration::from_secs(age)).unwrap();
    }

    let mut cfg = config_for(&server);
    cfg.count = 2;
    cfg.max_files = 3;
    let summary = pipeline(&cfg, SourceKind::Placeholder, dir.path())
        .run()
        .unwrap();

    assert_eq!(summary.saved.len(), 2);
    let mut expected = summary.saved.clone();
    expected.push(dir.path().join("old-c.png"));
    expected.sort();
    assert_eq!(pngs(dir.path()), expected);
    assert_eq!(summary.pruned.len(), 2);
}

#[test]
fn decode_failure_skips_candidate_and_leaves_raw_file() {
    let server = ImageServer::start();
    server.route("img/bad.jpg", 200, b"<html>gone</html>".to_vec());
    server.route("img/good.png", 200, encoded_image(30, 50, ImageFormat::Png));
    server.route("img/also.jpg", 200, encoded_image(40, 40, ImageFormat::Jpeg));
    let listing = format!(
        r#"{{"data": {{"children": [
            {{"data": {{"title": "Broken Bridge", "url": "{}"}}}},
            {{"data": {{"title": "Green Valley", "url": "{}"}}}},
            {{"data": {{"title": "Quiet Harbor", "url": "{}"}}}}
        ]}}}}"#,
        server.url("img/bad.jpg"),
        server.url("img/good.png"),
        server.url("img/also.jpg"),
    );
    server.route("r/pics/top.json", 200, listing.into_bytes());
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = config_for(&server);
    cfg.forum.categories = vec!["pics".into()];
    cfg.count = 3;
    cfg.max_files = 0;
    let summary = pipeline(&cfg, SourceKind::Forum, dir.path()).run().unwrap();

    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.saved.len(), 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        pngs(dir.path()),
        vec![
            dir.path().join("green-valley.png"),
            dir.path().join("quiet-harbor.png"),
        ]
    );
    assert!(!dir.path().join("quiet-harbor.jpg").exists());
    // Orphaned raw download stays behind.
    assert!(dir.path().join("broken-bridge.jpg").exists());
}

#[test]
fn failed_download_is_skipped() {
    let server = ImageServer::start();
    server.route("img/missing.png", 500, b"boom".to_vec());
    server.route("img/fine.png", 200, encoded_image(10, 12, ImageFormat::Png));
    let listing = format!(
        r#"{{"data": {{"children": [
            {{"data": {{"title": "Missing", "url": "{}"}}}},
            {{"data": {{"title": "Fine", "url": "{}"}}}}
        ]}}}}"#,
        server.url("img/missing.png"),
        server.url("img/fine.png"),
    );
    server.route("r/art/top.json", 200, listing.into_bytes());
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = config_for(&server);
    cfg.forum.categories = vec!["art".into()];
    cfg.count = 2;
    let summary = pipeline(&cfg, SourceKind::Forum, dir.path()).run().unwrap();

    assert_eq!(summary.saved, vec![dir.path().join("fine.png")]);
    assert_eq!(summary.failed, 1);
    assert!(!dir.path().join("missing.png").exists());
    assert_eq!(dims(&summary.saved[0]), (10, 10));
}

#[test]
fn circle_mask_end_to_end() {
    let server = ImageServer::start();
    server.fallback(200, encoded_image(64, 40, ImageFormat::Png));
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = config_for(&server);
    cfg.count = 1;
    cfg.shape = ShapeMode::Circle;
    let summary = pipeline(&cfg, SourceKind::Placeholder, dir.path())
        .run()
        .unwrap();

    let img = image::open(&summary.saved[0]).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (40, 40));
    assert_eq!(img.get_pixel(20, 20)[3], 255);
    assert_eq!(img.get_pixel(0, 0)[3], 0);
    assert_eq!(img.get_pixel(39, 0)[3], 0);
}

#[test]
fn no_mask_keeps_original_dimensions() {
    let server = ImageServer::start();
    server.fallback(200, encoded_image(64, 40, ImageFormat::Png));
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = config_for(&server);
    cfg.count = 1;
    cfg.shape = ShapeMode::None;
    let summary = pipeline(&cfg, SourceKind::Placeholder, dir.path())
        .run()
        .unwrap();
    assert_eq!(dims(&summary.saved[0]), (64, 40));
}

#[test]
fn every_candidate_failing_still_succeeds() {
    let server = ImageServer::start();
    server.fallback(200, b"definitely not an image".to_vec());
    let dir = tempfile::tempdir().unwrap();

    let mut cfg = config_for(&server);
    cfg.count = 2;
    let summary = pipeline(&cfg, SourceKind::Placeholder, dir.path())
        .run()
        .unwrap();
    assert!(summary.saved.is_empty());
    assert_eq!(summary.failed, 2);
    // Undecodable bytes saved under a .png name are not left to pose as variants.
    assert!(pngs(dir.path()).is_empty());
}

#[test]
fn stock_without_key_fails_run_without_touching_dir() {
    let server = ImageServer::start();
    let dir = tempfile::tempdir().unwrap();
    let variants = dir.path().join("variants");

    let mut cfg = config_for(&server);
    cfg.stock.access_key_env = "VFETCH_TEST_KEY_THAT_IS_NEVER_SET".into();
    let err = pipeline(&cfg, SourceKind::Stock, &variants).run().unwrap_err();

    assert!(matches!(err, PipelineError::NoCandidates { .. }));
    assert!(!variants.exists());
    assert!(server.requests().is_empty());
}
