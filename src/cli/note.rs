//! thesis note command implementations.

use crate::cli::Globals;
use crate::error::Result;
use crate::model::{NoteId, ProjectId, ProjectNote};
use crate::output::{emit_success, HumanOutput};
use crate::store::NoteUpdate;

pub fn run_add(globals: &Globals, project: Option<ProjectId>, title: &str, body: &str) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let note = store.add_note(project.id, title, body)?;

    let mut human = HumanOutput::new(format!("thesis note add: {}", note.title));
    push_note_summary(&mut human, &note);

    emit_success(globals.output(), "note add", &note, Some(&human))
}

pub fn run_list(globals: &Globals, project: Option<ProjectId>) -> Result<()> {
    let store = globals.open_store()?;
    let project = store.resolve_project(project)?;
    let notes = store.notes(project.id)?;

    let mut human = HumanOutput::new(format!(
        "thesis note list: {} ({} note(s))",
        project.title,
        notes.len()
    ));
    for note in &notes {
        human.push_detail(format!(
            "#{} {} ({})",
            note.id,
            note.title,
            note.created_at.format("%Y-%m-%d")
        ));
    }
    if notes.is_empty() {
        human.push_next_step("thesis note add \"<title>\" --body \"<text>\"");
    }

    emit_success(globals.output(), "note list", &notes, Some(&human))
}

pub fn run_edit(
    globals: &Globals,
    id: NoteId,
    title: Option<String>,
    body: Option<String>,
) -> Result<()> {
    let store = globals.open_store()?;
    let note = store.update_note(id, NoteUpdate { title, body })?;

    let mut human = HumanOutput::new(format!("thesis note edit: {}", note.title));
    push_note_summary(&mut human, &note);

    emit_success(globals.output(), "note edit", &note, Some(&human))
}

pub fn run_rm(globals: &Globals, id: NoteId) -> Result<()> {
    let store = globals.open_store()?;
    let note = store.delete_note(id)?;

    let mut human = HumanOutput::new(format!("thesis note rm: {}", note.title));
    push_note_summary(&mut human, &note);

    emit_success(globals.output(), "note rm", &note, Some(&human))
}

fn push_note_summary(human: &mut HumanOutput, note: &ProjectNote) {
    human.push_summary("id", note.id.to_string());
    human.push_summary("project", note.project_id.to_string());
    if !note.body.is_empty() {
        human.push_detail(note.body.clone());
    }
}
