mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestData;

fn new_long_form(data: &TestData) -> String {
    let created = data.json(&[
        "project",
        "new",
        "Desert Build",
        "--template",
        "tc-long-form",
        "--date",
        "2024-05-20",
        "--date",
        "2024-05-14",
    ]);
    created["id"].as_str().expect("project id").to_string()
}

fn show(data: &TestData, id: &str) -> Value {
    data.json(&["project", "show", id])
}

#[test]
fn project_new_expands_shoot_days_in_date_order() {
    let data = TestData::new();
    let id = new_long_form(&data);

    let project = show(&data, &id);
    assert_eq!(project["template"], "tc-long-form");
    assert_eq!(project["shootDays"].as_u64(), Some(2));
    assert_eq!(project["shootDates"][0], "2024-05-20");

    let roots = project["tasks"].as_array().expect("tasks");
    assert_eq!(roots.len(), 5);
    assert_eq!(roots[3]["name"], "Ad read: (1 minute)");
    let days = roots[2]["subtasks"].as_array().expect("shoot days");
    assert_eq!(days[0]["name"], "DAY 14 - TUE. MAY 14");
    assert_eq!(days[1]["name"], "DAY 20 - MON. MAY 20");
}

#[test]
fn project_new_defaults_to_blank_template() {
    let data = TestData::new();
    let created = data.json(&["project", "new", "My Film"]);
    assert_eq!(created["template"], "blank-project");
    assert_eq!(created["tasks"]["total"].as_u64(), Some(0));
}

#[test]
fn project_new_honors_configured_default_template() {
    let data = TestData::new();
    data.write_config("[projects]\ndefault_template = \"tc-long-form\"\n");
    data.ct()
        .args(["project", "new", "Trip"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("requires shootDays"));
}

#[test]
fn project_new_rejects_unknown_template() {
    let data = TestData::new();
    data.ct()
        .args(["project", "new", "Trip", "--template", "short-form"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Template not found"));
}

#[test]
fn task_commands_edit_the_tree() {
    let data = TestData::new();
    let project_id = data.json(&["project", "new", "Vlog"])["id"]
        .as_str()
        .expect("id")
        .to_string();

    let added = data.json(&["task", "add", &project_id, "Scout location"]);
    let parent_id = added["task_id"].as_str().expect("task id").to_string();
    assert_eq!(added["changed"], true);

    let child = data.json(&[
        "task",
        "add",
        &project_id,
        "Book permit",
        "--parent",
        &parent_id[..8],
    ]);
    let child_id = child["task_id"].as_str().expect("child id").to_string();

    let toggled = data.json(&["task", "toggle", &project_id, &child_id]);
    assert_eq!(toggled["task"]["completed"], true);

    let noted = data.json(&[
        "task",
        "note",
        &project_id,
        &child_id,
        "--text",
        "  bring ID  ",
    ]);
    assert_eq!(noted["task"]["note"]["text"], "bring ID");

    let cleared = data.json(&["task", "note", &project_id, &child_id, "--clear"]);
    assert!(cleared["task"].get("note").is_none());

    let renamed = data.json(&["task", "rename", &project_id, &parent_id, "Scout desert"]);
    assert_eq!(renamed["task"]["name"], "Scout desert");

    let project = show(&data, &project_id);
    assert_eq!(project["tasks"][0]["subtasks"][0]["completed"], true);
}

#[test]
fn unknown_task_is_noop_unless_strict() {
    let data = TestData::new();
    let project_id = data.json(&["project", "new", "Vlog"])["id"]
        .as_str()
        .expect("id")
        .to_string();
    let before = show(&data, &project_id);

    let result = data.json(&["task", "toggle", &project_id, "ghost"]);
    assert_eq!(result["changed"], false);
    assert_eq!(show(&data, &project_id), before);

    data.ct()
        .args(["--strict", "task", "toggle", &project_id, "ghost"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Task not found"));
}

#[test]
fn mutations_queue_changes_for_sync() {
    let data = TestData::new();
    let project_id = new_long_form(&data);
    data.json(&["task", "add", &project_id, "Color grade"]);
    data.json(&["project", "rm", &project_id]);

    let pending = data.json(&["sync", "pending"]);
    let entries = pending["entries"].as_array().expect("entries");
    let ops: Vec<&str> = entries
        .iter()
        .map(|entry| entry["operation"].as_str().expect("operation"))
        .collect();
    assert_eq!(ops, vec!["create", "update", "delete"]);
    assert!(entries[2]["payload"].is_null());

    let first = entries[0]["id"].as_str().expect("entry id").to_string();
    let acked = data.json(&["sync", "ack", &first, "bogus"]);
    assert_eq!(acked["acknowledged"][0], first.as_str());
    assert_eq!(acked["unknown"][0], "bogus");

    let pending = data.json(&["sync", "pending"]);
    assert_eq!(pending["total"].as_u64(), Some(2));
    let all = data.json(&["sync", "pending", "--all"]);
    assert_eq!(all["total"].as_u64(), Some(3));
}

#[test]
fn captures_survive_project_deletion() {
    let data = TestData::new();
    let project_id = data.json(&["project", "new", "Vlog"])["id"]
        .as_str()
        .expect("id")
        .to_string();

    data.json(&["capture", "note", "Gaffer tape", "--project", &project_id]);
    data.json(&[
        "capture",
        "receipt",
        "receipts/fuel.jpg",
        "--amount",
        "42.5",
        "--vendor",
        "Shell",
        "--project",
        &project_id,
    ]);
    data.json(&["capture", "timestamp"]);
    data.json(&["project", "rm", &project_id]);

    let tagged = data.json(&["capture", "list", "--project", &project_id]);
    assert_eq!(tagged["total"].as_u64(), Some(2));

    let all = data.json(&["capture", "list"]);
    assert_eq!(all["total"].as_u64(), Some(3));

    let receipts = data.json(&["capture", "list", "--type", "receipt"]);
    assert_eq!(receipts["records"][0]["type"], "receipt");
    assert_eq!(receipts["records"][0]["vendor"], "Shell");
    assert!(data.file("receipts").exists());
}

#[test]
fn reset_clears_everything() {
    let data = TestData::new();
    data.json(&["project", "new", "Vlog"]);
    data.json(&["capture", "note", "x"]);
    data.json(&["reset", "--yes"]);

    assert_eq!(data.json(&["project", "list"])["total"].as_u64(), Some(0));
    assert_eq!(data.json(&["sync", "pending"])["total"].as_u64(), Some(0));
    assert!(!data.file("projects").exists());
}

#[test]
fn note_and_rename_reject_empty_edits() {
    let data = TestData::new();
    let project_id = data.json(&["project", "new", "Vlog"])["id"]
        .as_str()
        .expect("id")
        .to_string();
    let task_id = data.json(&["task", "add", &project_id, "Hook"])["task_id"]
        .as_str()
        .expect("task id")
        .to_string();
    data.json(&["task", "note", &project_id, &task_id, "--text", "open cold"]);

    data.ct()
        .args(["task", "note", &project_id, &task_id])
        .assert()
        .failure()
        .code(2);
    data.ct()
        .args(["task", "rename", &project_id, &task_id, "   "])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("task name cannot be empty"));

    let project = show(&data, &project_id);
    assert_eq!(project["tasks"][0]["name"], "Hook");
    assert_eq!(project["tasks"][0]["note"]["text"], "open cold");
}
