mod support;

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, NaiveDate};
use thesis::error::Error;
use thesis::lock::FileLock;
use thesis::sequencer::Direction;
use thesis::store::{NewProject, NewTask, NewWordLog, ThesisStore};

use support::TestRoot;

#[test]
fn concurrent_word_logs_are_all_persisted() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::init();
    let project = root.store().create_project(NewProject::new("Parallel"))?;

    let writers = 8;
    let per_writer = 5;
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("date");
    let barrier = Arc::new(Barrier::new(writers));
    let mut handles = Vec::with_capacity(writers);
    for writer in 0..writers {
        let barrier = Arc::clone(&barrier);
        let path = root.path().to_path_buf();
        handles.push(thread::spawn(move || {
            let store = ThesisStore::open(&path).expect("open store");
            barrier.wait();
            for n in 0..per_writer {
                let offset = (writer * per_writer + n) as i64;
                store
                    .log_words(NewWordLog {
                        project_id: project.id,
                        task_id: None,
                        date: start + Duration::days(offset),
                        words: 100,
                        note: None,
                    })
                    .expect("log words");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("writer thread");
    }

    let snapshot = root.store().load()?;
    assert_eq!(snapshot.word_logs.len(), writers * per_writer);
    let ids: HashSet<u64> = snapshot.word_logs.iter().map(|log| log.id).collect();
    assert_eq!(ids.len(), writers * per_writer);

    let audit = root.store().audit_log(Some(project.id), None)?;
    assert_eq!(
        audit.iter().filter(|entry| entry.action == "words.log").count(),
        writers * per_writer
    );
    Ok(())
}

#[test]
fn concurrent_moves_keep_orders_contiguous() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::init();
    let store = root.store();
    let project = store.create_project(NewProject::new("Shuffle"))?;
    let milestone = store.add_milestone(project.id, "Chapter")?;
    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D", "E", "F"] {
        ids.push(store.add_task(NewTask::new(milestone.id, title))?.id);
    }

    let barrier = Arc::new(Barrier::new(ids.len()));
    let handles: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let id = *id;
            let barrier = Arc::clone(&barrier);
            let path = root.path().to_path_buf();
            thread::spawn(move || {
                let store = ThesisStore::open(&path).expect("open store");
                barrier.wait();
                let direction = if index % 2 == 0 {
                    Direction::Down
                } else {
                    Direction::Up
                };
                for _ in 0..4 {
                    store.move_task(id, direction).expect("move");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("mover thread");
    }

    let view = store.project_view(project.id)?;
    let orders: Vec<u32> = view.tasks.iter().map(|task| task.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);
    Ok(())
}

#[test]
fn held_lock_times_out_writers() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::init();
    root.write_config("[storage]\nlock_timeout_ms = 50\n")?;
    let store = root.store();
    let before = std::fs::read_to_string(store.storage().store_file())?;

    let _held = FileLock::acquire(store.storage().store_lock_file(), 1000)?;
    let err = store
        .create_project(NewProject::new("Blocked"))
        .expect_err("lock held");
    assert!(matches!(err, Error::LockFailed(_)));
    assert_eq!(std::fs::read_to_string(store.storage().store_file())?, before);
    Ok(())
}
