//! Plain-text rendering of the read model.

use std::fmt::Write;
use onboard_core::{GateState, ProgressTree};
use onboard_progress::{BlockerReport, ProgressSnapshot};

fn marker(state: GateState) -> &'static str {
    match state {
        GateState::Locked => "[#]",
        GateState::Unlocked => "[ ]",
        GateState::Complete => "[x]",
    }
}

/// Render every section, its tasks and the steps of unlocked tasks.
pub fn status(tree: &ProgressTree, snapshot: &ProgressSnapshot) -> String {
    let mut out = String::new();

    for section in &snapshot.sections {
        let here = if section.section_id == snapshot.current_section { "  <- current" } else { "" };
        let _ = writeln!(
            out,
            "{} {} {} ({}){}",
            marker(section.state),
            section.section_id,
            section.title,
            section,
            here
        );

        for task in &section.tasks {
            let _ = write!(
                out,
                "    {} {} {} ({}/{})",
                marker(task.state),
                task.task_id,
                task.title,
                task.completed_steps,
                task.total_steps
            );
            if let Some(required) = task.required_task_id {
                let _ = write!(out, " requires task {}", required);
            }
            out.push('\n');

            // Steps stay hidden behind any closed gate.
            if section.locked || task.locked {
                continue;
            }
            if let Some(full) = tree.task(section.section_id, task.task_id) {
                for step in &full.steps {
                    let tick = if step.completed { "[x]" } else { "[ ]" };
                    let _ = writeln!(out, "        {} {} {}", tick, step.id, step.text);
                }
            }
        }
    }

    if snapshot.can_advance {
        if let Some(next) = snapshot.next_section.and_then(|id| snapshot.section(id)) {
            let _ = writeln!(out, "\nContinue to {} (run `advance`)", next.title);
        }
    }

    out
}

/// Render blockers and suggestions.
pub fn blockers(report: &BlockerReport) -> String {
    let mut out = String::new();

    if report.blockers.is_empty() {
        out.push_str("Nothing is locked.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{} blocker(s): {} section(s), {} task(s)",
        report.stats.total_blockers, report.stats.locked_sections, report.stats.locked_tasks
    );
    for blocker in &report.blockers {
        let _ = writeln!(out, "  {} waits on {}: {}", blocker.item, blocker.required, blocker.reason);
    }

    if !report.suggestions.is_empty() {
        out.push_str("\nNext:\n");
        for suggestion in &report.suggestions {
            let _ = writeln!(out, "  {}", suggestion.description);
        }
    }

    out
}
