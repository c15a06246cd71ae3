use hireflow_browser::ChromiumDriver;
use hireflow_core::{ApplicantProfile, BrowserConfig};
use hireflow_scenario::{ScenarioConfig, ScenarioRunner};
use hireflow_storage::FsArtifactStore;
use std::io::Write;
use std::sync::Arc;

#[tokio::test]
#[ignore = "drives the live careers site in a real browser"]
async fn live_rnd_applications_are_filled() {
    let dir = tempfile::tempdir().unwrap();
    let cv_path = dir.path().join("example_cv.pdf");
    std::fs::File::create(&cv_path)
        .unwrap()
        .write_all(b"%PDF-1.4\n%%EOF\n")
        .unwrap();

    let mut config = ScenarioConfig::new(ApplicantProfile {
        first_name: "Test".into(),
        last_name: "Automation".into(),
        email: "test.automation@example.com".into(),
        phone: "+1234567890".into(),
        linkedin_url: None,
        cv_path,
    });
    config.browser = BrowserConfig {
        headless: true,
        ..BrowserConfig::default()
    };
    config.screenshot_dir = dir.path().join("screenshots");
    config.report_dir = dir.path().join("reports");
    config.validate().unwrap();
    let config = Arc::new(config);

    let driver = Arc::new(
        ChromiumDriver::launch(&config.browser, config.timeouts())
            .await
            .unwrap(),
    );
    let store = Arc::new(FsArtifactStore::new(
        config.screenshot_dir.clone(),
        config.report_dir.clone(),
    ));

    let report = ScenarioRunner::new(config.clone(), driver.clone(), store)
        .run()
        .await;
    driver.close().await.unwrap();

    assert!(!report.verdict.is_failure(), "{:?}", report.verdict);
    assert_eq!(report.outcomes.len(), report.summary.total);
    assert!(std::fs::read_dir(&config.report_dir).unwrap().count() >= 1);
}
