//! Runs the bundled demo fixture and repository configuration end to end.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use trial_match_core::adapters::{MatchFixture, TemplateSummarizer};
use trial_match_core::config::ConfigManager;
use trial_match_core::events::ChannelProgressSink;
use trial_match_core::models::MatchCategory;
use trial_match_core::orchestration::{InMemoryCriteriaCache, PipelineCoordinator, RunOptions};
use trial_match_core::state_machine::{PipelineStage, StageStatus};

fn repo_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn test_repository_config_layers_for_test_environment() {
    let manager =
        ConfigManager::load_with_overrides(Some(repo_path("config")), "test", Some(Default::default()))
            .unwrap();

    assert_eq!(manager.environment(), "test");
    assert_eq!(manager.config().retry.base_delay_ms, 10);
    assert!(!manager.config().logging.file_output);
    assert_eq!(manager.loaded_files().len(), 2);
}

#[tokio::test]
async fn test_demo_fixture_run() {
    let fixture = MatchFixture::from_path(&repo_path("demos/lung_cancer_fixture.json")).unwrap();
    let manager =
        ConfigManager::load_with_overrides(Some(repo_path("config")), "test", Some(Default::default()))
            .unwrap();
    let config = manager.config();

    let coordinator = PipelineCoordinator::builder(
        Arc::new(fixture.discovery()),
        Arc::new(fixture.extraction()),
        Arc::new(TemplateSummarizer::new()),
    )
    .cache(Arc::new(InMemoryCriteriaCache::new()))
    .with_config(config)
    .build();

    let (sink, mut receiver) = ChannelProgressSink::channel();
    let run = coordinator
        .run(&fixture.profile, &sink, RunOptions::from_config(config))
        .await
        .unwrap();
    drop(sink);

    assert_eq!(run.total_found, 4);
    let ids: Vec<&str> = run.candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["NCT90000001", "NCT90000002"]);

    assert_eq!(run.outcomes[0].candidate_id, "NCT90000001");
    assert_eq!(run.outcomes[0].score, 71);
    assert_eq!(run.outcomes[0].category, MatchCategory::Possible);

    let blocked = run.outcome_for("NCT90000002").unwrap();
    assert_eq!(blocked.category, MatchCategory::NotEligible);
    assert!(blocked.is_blocked());

    assert!(run.voice_script().is_some());
    for state in &run.stages {
        assert_eq!(state.status, StageStatus::Complete, "{}", state.stage);
    }

    let mut last = None;
    while let Some(event) = receiver.recv().await {
        last = Some(event);
    }
    let last = last.unwrap();
    assert_eq!(last.stage_state.stage, PipelineStage::Summarization);
    assert_eq!(last.overall_percent, 100);
}
