mod support;

use thesis::config::Config;
use thesis::progress::ProgressWeights;
use thesis::store::{NewProject, NewTask, NewWordLog};

use chrono::NaiveDate;
use support::TestRoot;

#[test]
fn config_defaults_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::load_from_root(dir.path());

    assert_eq!(config.progress.weights(), ProgressWeights::new(100, 0));
    assert!(!config.progress.simple_mode);
    assert_eq!(config.digest.due_days, 3);
    assert_eq!(config.digest.inactivity_days, 5);
    assert_eq!(config.storage.lock_timeout_ms, 5000);
}

#[test]
fn init_writes_default_config() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::init();
    let written = std::fs::read_to_string(root.path().join(".thesis.toml"))?;
    assert!(written.contains("[progress]"));
    assert!(written.contains("status_weight = 100"));

    let config = Config::load(&root.path().join(".thesis.toml"))?;
    assert_eq!(config.digest.due_days, 3);
    Ok(())
}

#[test]
fn configured_weights_drive_store_progress() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::init();
    root.write_config("[progress]\nstatus_weight = 70\neffort_weight = 30\n")?;
    let store = root.store();

    let project = store.create_project(NewProject::new("Weighted"))?;
    let milestone = store.add_milestone(project.id, "Methods")?;
    let mut request = NewTask::new(milestone.id, "Draft methods");
    request.word_target = 1000;
    let task = store.add_task(request)?;
    store.set_task_status(task.id, thesis::model::TaskStatus::Doing)?;
    store.log_words(NewWordLog {
        project_id: project.id,
        task_id: Some(task.id),
        date: NaiveDate::from_ymd_opt(2024, 2, 1).expect("date"),
        words: 800,
        note: None,
    })?;

    // 0.7 * 50 + 0.3 * 80 = 59
    let progress = store.progress(project.id)?;
    assert_eq!(progress.percent, 59);
    assert_eq!(progress.milestones[0].tasks[0].effort.percent, 80);
    Ok(())
}

#[test]
fn simple_mode_ignores_effort() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::init();
    root.write_config("[progress]\nstatus_weight = 0\neffort_weight = 100\nsimple_mode = true\n")?;
    let store = root.store();

    let project = store.create_project(NewProject::new("Simple"))?;
    let milestone = store.add_milestone(project.id, "Intro")?;
    let mut request = NewTask::new(milestone.id, "Draft intro");
    request.word_target = 100;
    let task = store.add_task(request)?;
    store.log_words(NewWordLog {
        project_id: project.id,
        task_id: Some(task.id),
        date: NaiveDate::from_ymd_opt(2024, 2, 1).expect("date"),
        words: 100,
        note: None,
    })?;

    assert_eq!(store.progress(project.id)?.percent, 0);
    Ok(())
}

#[test]
fn broken_config_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::init();
    root.write_config("[digest]\ninactivity_days = 0\n")?;
    let store = root.store();
    assert_eq!(store.config().digest.inactivity_days, 5);
    Ok(())
}
