//! Copy-on-write operations over a task forest.
//!
//! Every operation reads a borrowed forest and returns a new one. Only the
//! path from the root to the edited node is rebuilt; other subtrees are
//! cloned unchanged, so a caller's previous snapshot is never altered.
//!
//! Lookups are depth-first, pre-order. Permissive operations treat an
//! unknown identifier as a no-op and return a forest equal to the input;
//! the `try_*` forms report it as [`Error::TaskNotFound`].

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::task::{Task, TaskCounts, TaskUpdate};

/// Result of locating and editing one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEdit {
    /// No node carries the identifier
    NotFound,
    /// The node exists but the edit left it as it was
    Unchanged,
    /// The rebuilt forest
    Changed(Vec<Task>),
}

impl TreeEdit {
    /// Permissive resolution: the new forest, or a copy of `original`
    pub fn into_tasks(self, original: &[Task]) -> Vec<Task> {
        match self {
            TreeEdit::Changed(tasks) => tasks,
            TreeEdit::NotFound | TreeEdit::Unchanged => original.to_vec(),
        }
    }

    /// Strict resolution: `TaskNotFound` when `id` was missing
    pub fn into_result(self, original: &[Task], id: &str) -> Result<Vec<Task>> {
        match self {
            TreeEdit::NotFound => Err(Error::TaskNotFound(id.to_string())),
            other => Ok(other.into_tasks(original)),
        }
    }
}

/// Locate `id` and rebuild the path to it with the node `edit` returns.
///
/// `edit` yields `None` when it leaves the node as it was.
pub fn edit_task<F>(tasks: &[Task], id: &str, edit: &mut F) -> TreeEdit
where
    F: FnMut(&Task) -> Option<Task>,
{
    for (index, task) in tasks.iter().enumerate() {
        if task.id == id {
            return match edit(task) {
                Some(replacement) => TreeEdit::Changed(splice(tasks, index, replacement)),
                None => TreeEdit::Unchanged,
            };
        }

        match edit_task(&task.subtasks, id, edit) {
            TreeEdit::NotFound => continue,
            TreeEdit::Unchanged => return TreeEdit::Unchanged,
            TreeEdit::Changed(subtasks) => {
                return TreeEdit::Changed(splice(tasks, index, task.with_children(subtasks)));
            }
        }
    }
    TreeEdit::NotFound
}

fn splice(tasks: &[Task], index: usize, replacement: Task) -> Vec<Task> {
    let mut rebuilt = Vec::with_capacity(tasks.len());
    rebuilt.extend_from_slice(&tasks[..index]);
    rebuilt.push(replacement);
    rebuilt.extend_from_slice(&tasks[index + 1..]);
    rebuilt
}

/// Append `new_task` under `parent_id`, or at the root when `parent_id` is `None`
pub fn edit_insert(
    tasks: &[Task],
    parent_id: Option<&str>,
    new_task: Task,
    now: DateTime<Utc>,
) -> TreeEdit {
    let Some(parent_id) = parent_id else {
        let mut rebuilt = tasks.to_vec();
        rebuilt.push(new_task);
        return TreeEdit::Changed(rebuilt);
    };

    let mut pending = Some(new_task);
    edit_task(tasks, parent_id, &mut |parent| {
        let child = pending.take()?;
        let mut subtasks = parent.subtasks.clone();
        subtasks.push(child);
        let mut rebuilt = parent.with_children(subtasks);
        rebuilt.updated_at = now;
        Some(rebuilt)
    })
}

pub fn edit_update(tasks: &[Task], id: &str, update: &TaskUpdate, now: DateTime<Utc>) -> TreeEdit {
    edit_task(tasks, id, &mut |task| update.merge(task, now))
}

pub fn edit_replace(tasks: &[Task], replacement: &Task) -> TreeEdit {
    edit_task(tasks, &replacement.id, &mut |task| {
        if task == replacement {
            None
        } else {
            Some(replacement.clone())
        }
    })
}

pub fn edit_toggle(tasks: &[Task], id: &str, now: DateTime<Utc>) -> TreeEdit {
    edit_task(tasks, id, &mut |task| {
        let mut toggled = task.clone();
        toggled.completed = !task.completed;
        toggled.updated_at = now;
        Some(toggled)
    })
}

/// Insert `new_task` as the last child of `parent_id` (or last root)
pub fn insert_task(tasks: &[Task], parent_id: Option<&str>, new_task: Task) -> Vec<Task> {
    edit_insert(tasks, parent_id, new_task, Utc::now()).into_tasks(tasks)
}

pub fn try_insert_task(tasks: &[Task], parent_id: Option<&str>, new_task: Task) -> Result<Vec<Task>> {
    let id = parent_id.unwrap_or_default();
    edit_insert(tasks, parent_id, new_task, Utc::now()).into_result(tasks, id)
}

/// Merge `update` into the task `id`
pub fn update_task(tasks: &[Task], id: &str, update: &TaskUpdate) -> Vec<Task> {
    edit_update(tasks, id, update, Utc::now()).into_tasks(tasks)
}

pub fn try_update_task(tasks: &[Task], id: &str, update: &TaskUpdate) -> Result<Vec<Task>> {
    edit_update(tasks, id, update, Utc::now()).into_result(tasks, id)
}

/// Replace the node with `replacement.id` wholesale, children included
pub fn replace_task(tasks: &[Task], replacement: &Task) -> Vec<Task> {
    edit_replace(tasks, replacement).into_tasks(tasks)
}

/// Flip the completion flag of `id`
pub fn toggle_task(tasks: &[Task], id: &str) -> Vec<Task> {
    edit_toggle(tasks, id, Utc::now()).into_tasks(tasks)
}

pub fn try_toggle_task(tasks: &[Task], id: &str) -> Result<Vec<Task>> {
    edit_toggle(tasks, id, Utc::now()).into_result(tasks, id)
}

/// Depth-first lookup by identifier
pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    for task in tasks {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find_task(&task.subtasks, id) {
            return Some(found);
        }
    }
    None
}

/// Count every task at every depth; recomputed on each call
pub fn count_tasks(tasks: &[Task]) -> TaskCounts {
    let mut counts = TaskCounts::default();
    for task in tasks {
        counts.total += 1;
        if task.completed {
            counts.completed += 1;
        }
        let nested = count_tasks(&task.subtasks);
        counts.total += nested.total;
        counts.completed += nested.completed;
    }
    counts
}

/// Visit every task pre-order with its depth (roots are depth 0)
pub fn walk<'a, F>(tasks: &'a [Task], visit: &mut F)
where
    F: FnMut(&'a Task, usize),
{
    fn go<'a, F>(tasks: &'a [Task], depth: usize, visit: &mut F)
    where
        F: FnMut(&'a Task, usize),
    {
        for task in tasks {
            visit(task, depth);
            go(&task.subtasks, depth + 1, visit);
        }
    }
    go(tasks, 0, visit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskNote;

    fn leaf(id: &str) -> Task {
        let mut task = Task::new(id.to_uppercase());
        task.id = id.to_string();
        task
    }

    fn node(id: &str, children: Vec<Task>) -> Task {
        leaf(id).with_subtasks(children)
    }

    /// a
    /// ├─ b
    /// │  └─ c
    /// └─ d
    /// e
    fn sample() -> Vec<Task> {
        vec![
            node("a", vec![node("b", vec![leaf("c")]), leaf("d")]),
            leaf("e"),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<(String, usize)> {
        let mut out = Vec::new();
        walk(tasks, &mut |task, depth| out.push((task.id.clone(), depth)));
        out
    }

    #[test]
    fn insert_without_parent_appends_root() {
        let tree = sample();
        let updated = insert_task(&tree, None, leaf("f"));
        assert_eq!(updated.len(), 3);
        assert_eq!(updated[2].id, "f");
        assert_eq!(&updated[..2], &tree[..]);
    }

    #[test]
    fn insert_under_deep_parent_is_local() {
        let tree = sample();
        let updated = insert_task(&tree, Some("c"), leaf("x"));

        let c = find_task(&updated, "c").unwrap();
        assert_eq!(c.subtasks.len(), 1);
        assert_eq!(c.subtasks[0].id, "x");

        assert_eq!(updated[1], tree[1]);
        assert_eq!(updated[0].subtasks[1], tree[0].subtasks[1]);
        assert_eq!(updated[0].name, tree[0].name);
        assert_eq!(updated[0].updated_at, tree[0].updated_at);
        assert!(find_task(&tree, "x").is_none());
    }

    #[test]
    fn insert_appends_after_existing_children() {
        let tree = sample();
        let updated = insert_task(&tree, Some("a"), leaf("z"));
        let child_ids: Vec<&str> = updated[0].subtasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(child_ids, vec!["b", "d", "z"]);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let tree = sample();
        assert_eq!(insert_task(&tree, Some("missing"), leaf("x")), tree);
        assert_eq!(update_task(&tree, "missing", &TaskUpdate::new().completed(true)), tree);
        assert_eq!(toggle_task(&tree, "missing"), tree);
        assert_eq!(replace_task(&tree, &leaf("missing")), tree);
    }

    #[test]
    fn strict_forms_report_missing_ids() {
        let tree = sample();
        let err = try_insert_task(&tree, Some("nope"), leaf("x")).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(id) if id == "nope"));
        assert!(matches!(
            try_update_task(&tree, "ghost", &TaskUpdate::new().name("x")),
            Err(Error::TaskNotFound(_))
        ));
        assert!(try_toggle_task(&tree, "d").is_ok());
        assert_eq!(
            try_update_task(&tree, "d", &TaskUpdate::new()).unwrap(),
            tree
        );
    }

    #[test]
    fn update_merges_fields_and_is_idempotent() {
        let tree = sample();
        let update = TaskUpdate::new().completed(true);
        let once = update_task(&tree, "c", &update);
        let twice = update_task(&once, "c", &update);
        assert_eq!(once, twice);
        assert!(find_task(&once, "c").unwrap().completed);
        assert_eq!(find_task(&once, "c").unwrap().name, "C");
        assert!(!find_task(&tree, "c").unwrap().completed);
    }

    #[test]
    fn update_can_attach_and_clear_notes() {
        let tree = sample();
        let with_note = update_task(
            &tree,
            "d",
            &TaskUpdate::new().note(Some(TaskNote::new("bring tripod"))),
        );
        assert!(find_task(&with_note, "d").unwrap().has_note());

        let cleared = update_task(&with_note, "d", &TaskUpdate::new().note(None));
        assert_eq!(find_task(&cleared, "d").unwrap().note, None);
    }

    #[test]
    fn replace_swaps_whole_node() {
        let tree = sample();
        let mut replacement = leaf("b");
        replacement.name = "Renamed".to_string();
        let updated = replace_task(&tree, &replacement);
        let b = find_task(&updated, "b").unwrap();
        assert_eq!(b.name, "Renamed");
        assert!(b.subtasks.is_empty());
        assert!(find_task(&updated, "c").is_none());
    }

    #[test]
    fn toggle_flips_completion() {
        let tree = sample();
        let on = toggle_task(&tree, "e");
        assert!(find_task(&on, "e").unwrap().completed);
        let off = toggle_task(&on, "e");
        assert!(!find_task(&off, "e").unwrap().completed);
    }

    #[test]
    fn counts_cover_every_depth() {
        let tree = update_task(&sample(), "c", &TaskUpdate::new().completed(true));
        let tree = update_task(&tree, "a", &TaskUpdate::new().completed(true));

        let mut manual_total = 0;
        let mut manual_completed = 0;
        walk(&tree, &mut |task, _| {
            manual_total += 1;
            if task.completed {
                manual_completed += 1;
            }
        });

        let counts = count_tasks(&tree);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.total, manual_total);
        assert_eq!(counts.completed, manual_completed);
        assert_eq!(count_tasks(&[]), TaskCounts::default());
    }

    #[test]
    fn walk_is_preorder_with_depth() {
        assert_eq!(
            ids(&sample()),
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("c".to_string(), 2),
                ("d".to_string(), 1),
                ("e".to_string(), 0),
            ]
        );
    }
}
