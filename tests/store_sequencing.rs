mod support;

use thesis::error::Error;
use thesis::model::{MilestoneId, TaskId};
use thesis::sequencer::{Direction, DropPosition, ReorderRequest};
use thesis::store::{NewProject, NewTask, ThesisStore};

use support::TestRoot;

fn titles_in(store: &ThesisStore, milestone_id: MilestoneId) -> Vec<(String, u32)> {
    let snapshot = store.load().expect("load");
    let project_id = snapshot.milestone(milestone_id).expect("milestone").project_id;
    snapshot
        .project_view(project_id)
        .expect("view")
        .tasks
        .into_iter()
        .filter(|task| task.milestone_id == milestone_id)
        .map(|task| (task.title, task.order))
        .collect()
}

fn seed(store: &ThesisStore, titles: &[&str]) -> (MilestoneId, Vec<TaskId>) {
    let project = store
        .create_project(NewProject::new("Sequencing"))
        .expect("project");
    let milestone = store.add_milestone(project.id, "Chapter").expect("milestone");
    let ids = titles
        .iter()
        .map(|title| {
            store
                .add_task(NewTask::new(milestone.id, *title))
                .expect("task")
                .id
        })
        .collect();
    (milestone.id, ids)
}

fn expected(pairs: &[(&str, u32)]) -> Vec<(String, u32)> {
    pairs
        .iter()
        .map(|(title, order)| (title.to_string(), *order))
        .collect()
}

#[test]
fn reorder_after_sibling_shifts_the_rest() {
    let root = TestRoot::init();
    let store = root.store();
    let (milestone, ids) = seed(&store, &["A", "B", "C", "D"]);

    let plan = store
        .reorder_task(ReorderRequest::new(ids[3]).after(ids[0]))
        .expect("reorder");
    assert_eq!(plan.len(), 3);

    assert_eq!(
        titles_in(&store, milestone),
        expected(&[("A", 1), ("D", 2), ("B", 3), ("C", 4)])
    );
}

#[test]
fn reorder_to_top_and_unknown_anchor() {
    let root = TestRoot::init();
    let store = root.store();
    let (milestone, ids) = seed(&store, &["A", "B", "C"]);

    store
        .reorder_task(ReorderRequest::new(ids[2]).at(DropPosition::Top))
        .expect("top");
    assert_eq!(
        titles_in(&store, milestone),
        expected(&[("C", 1), ("A", 2), ("B", 3)])
    );

    // An anchor that is not a sibling drops the task at the end.
    store
        .reorder_task(ReorderRequest::new(ids[2]).after(9_999))
        .expect("end");
    assert_eq!(
        titles_in(&store, milestone),
        expected(&[("A", 1), ("B", 2), ("C", 3)])
    );
}

#[test]
fn move_up_then_down_restores_order() {
    let root = TestRoot::init();
    let store = root.store();
    let (milestone, ids) = seed(&store, &["A", "B", "C"]);
    let before = titles_in(&store, milestone);

    store.move_task(ids[1], Direction::Up).expect("up");
    assert_eq!(
        titles_in(&store, milestone),
        expected(&[("B", 1), ("A", 2), ("C", 3)])
    );
    store.move_task(ids[1], Direction::Down).expect("down");
    assert_eq!(titles_in(&store, milestone), before);

    // Already first: nothing to do.
    let plan = store.move_task(ids[0], Direction::Up).expect("noop");
    assert!(plan.is_empty());
    assert_eq!(titles_in(&store, milestone), before);
}

#[test]
fn cross_milestone_move_keeps_both_sides_gap_free() {
    let root = TestRoot::init();
    let store = root.store();
    let project = store
        .create_project(NewProject::new("Two chapters"))
        .expect("project");
    let intro = store.add_milestone(project.id, "Intro").expect("intro");
    let methods = store.add_milestone(project.id, "Methods").expect("methods");
    let a = store.add_task(NewTask::new(intro.id, "A")).expect("a");
    store.add_task(NewTask::new(intro.id, "B")).expect("b");
    store.add_task(NewTask::new(intro.id, "C")).expect("c");
    let x = store.add_task(NewTask::new(methods.id, "X")).expect("x");
    store.add_task(NewTask::new(methods.id, "Y")).expect("y");

    store
        .reorder_task(ReorderRequest::new(a.id).into_milestone(methods.id).after(x.id))
        .expect("reorder");

    assert_eq!(
        titles_in(&store, intro.id),
        expected(&[("B", 1), ("C", 2)])
    );
    assert_eq!(
        titles_in(&store, methods.id),
        expected(&[("X", 1), ("A", 2), ("Y", 3)])
    );
}

#[test]
fn foreign_milestone_is_rejected_without_writing() {
    let root = TestRoot::init();
    let store = root.store();
    let (milestone, ids) = seed(&store, &["A", "B"]);
    let other = store
        .create_project(NewProject::new("Other"))
        .expect("other project");
    let foreign = store.add_milestone(other.id, "Elsewhere").expect("foreign");

    let err = store
        .reorder_task(ReorderRequest::new(ids[0]).into_milestone(foreign.id))
        .expect_err("cross-project move");
    assert!(matches!(err, Error::InvalidReference(_)));
    assert_eq!(
        titles_in(&store, milestone),
        expected(&[("A", 1), ("B", 2)])
    );
}

#[test]
fn unknown_ids_are_not_found() {
    let root = TestRoot::init();
    let store = root.store();
    let (_, ids) = seed(&store, &["A"]);

    assert!(matches!(
        store.move_task(404, Direction::Up),
        Err(Error::NotFound { kind: "task", id: 404 })
    ));
    assert!(matches!(
        store.reorder_task(ReorderRequest::new(ids[0]).into_milestone(505)),
        Err(Error::NotFound {
            kind: "milestone",
            id: 505
        })
    ));
}

#[test]
fn delete_closes_the_gap() {
    let root = TestRoot::init();
    let store = root.store();
    let (milestone, ids) = seed(&store, &["A", "B", "C", "D"]);

    store.delete_task(ids[1]).expect("delete");
    assert_eq!(
        titles_in(&store, milestone),
        expected(&[("A", 1), ("C", 2), ("D", 3)])
    );
    assert!(matches!(
        store.delete_task(ids[1]),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn every_reorder_leaves_orders_contiguous() {
    let root = TestRoot::init();
    let store = root.store();
    let (milestone, ids) = seed(&store, &["A", "B", "C", "D", "E"]);

    for (task, anchor) in [(0, 4), (3, 1), (4, 0), (2, 2), (1, 3)] {
        store
            .reorder_task(ReorderRequest::new(ids[task]).after(ids[anchor]))
            .expect("reorder");
        let orders: Vec<u32> = titles_in(&store, milestone)
            .into_iter()
            .map(|(_, order)| order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
    }
}
