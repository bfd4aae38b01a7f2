//! Project templates and their instantiation.
//!
//! A template is a read-only skeleton of task names. [`instantiate`] turns a
//! skeleton into a fresh task forest (new ids and timestamps at every depth)
//! and expands [`ExpansionSlot`] markers from the caller's parameters.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::project::Project;
use crate::task::Task;

pub const TC_LONG_FORM_ID: &str = "tc-long-form";
pub const BLANK_PROJECT_ID: &str = "blank-project";

/// Checklist items generated under every shoot day
pub const SHOOT_DAY_CHECKLIST: [&str; 4] = [
    "Daily Docket",
    "Film All Actions Included in Daily Docket",
    "Film Additional Obstacles That Arise in Regards to the Goal",
    "Daily Recap VO",
];

/// What an expansion slot is filled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKind {
    /// One subtree per shoot date, ascending
    ShootDays,
}

/// Marker on a skeleton node whose children are generated at instantiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionSlot {
    pub kind: SlotKind,
    /// Siblings inserted right after the expanded node
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub followed_by: Vec<TaskSkeleton>,
}

/// Task shape without identity; ids and timestamps are assigned on instantiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSkeleton {
    pub name: String,
    pub completed: bool,
    pub subtasks: Vec<TaskSkeleton>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<ExpansionSlot>,
}

impl TaskSkeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: false,
            subtasks: Vec::new(),
            slot: None,
        }
    }

    /// Node with leaf children named `names`
    pub fn with_leaves(name: impl Into<String>, names: &[&str]) -> Self {
        let mut skeleton = Self::new(name);
        skeleton.subtasks = names.iter().copied().map(TaskSkeleton::new).collect();
        skeleton
    }

    pub fn with_slot(mut self, slot: ExpansionSlot) -> Self {
        self.slot = Some(slot);
        self
    }

    fn materialize(&self, now: DateTime<Utc>) -> Task {
        let mut task = Task::at(self.name.clone(), now);
        task.completed = self.completed;
        task.subtasks = self
            .subtasks
            .iter()
            .map(|child| child.materialize(now))
            .collect();
        task
    }
}

/// Named task skeleton from the built-in catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tasks: Vec<TaskSkeleton>,
    pub requires_shoot_days: bool,
    pub requires_shoot_dates: bool,
}

/// Caller-supplied inputs for [`instantiate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstantiateParams {
    pub name: String,
    pub shoot_days: Option<u32>,
    pub shoot_dates: Option<Vec<NaiveDate>>,
}

impl InstantiateParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn shoot_days(mut self, days: u32) -> Self {
        self.shoot_days = Some(days);
        self
    }

    pub fn shoot_dates(mut self, dates: Vec<NaiveDate>) -> Self {
        self.shoot_dates = Some(dates);
        self
    }
}

pub fn tc_long_form() -> ProjectTemplate {
    let ad_read = TaskSkeleton::with_leaves("Ad read: (1 minute)", &["[Sponsor]"]);

    ProjectTemplate {
        id: TC_LONG_FORM_ID.to_string(),
        name: "TC Long Form".to_string(),
        description: "Template for long-form content creation with multiple shoot days"
            .to_string(),
        tasks: vec![
            TaskSkeleton::with_leaves(
                "Hook (30 seconds)",
                &[
                    "Tease the Video",
                    "Open a Curiosity Gap",
                    "\"Time Machine\" Segment",
                ],
            ),
            TaskSkeleton::with_leaves(
                "Chapter 1: World Building (3-5 minutes)",
                &[
                    "The Project Docket: The Goal",
                    "Intro to Starting Characters",
                    "Preparation for The Goal",
                    "Research of the \"Map\"",
                ],
            ),
            TaskSkeleton::new("Chapter 2: Journey and Obstacles (10 minutes)").with_slot(
                ExpansionSlot {
                    kind: SlotKind::ShootDays,
                    followed_by: vec![ad_read],
                },
            ),
            TaskSkeleton::with_leaves(
                "Chapter 3: Victory or Lesson Learned (5 minutes)",
                &[
                    "Film Result of Goal",
                    "Emotional Recap and Moral",
                    "Remember Important Moments and Characters",
                    "Remember What God Did",
                    "Remember What You Learned",
                    "Follow up recordings",
                    "\"Time machine\" Segment",
                    "Editing Notes",
                ],
            ),
        ],
        requires_shoot_days: true,
        requires_shoot_dates: true,
    }
}

pub fn blank_project() -> ProjectTemplate {
    ProjectTemplate {
        id: BLANK_PROJECT_ID.to_string(),
        name: "Blank Project".to_string(),
        description: "Start with a clean slate and create your own tasks".to_string(),
        tasks: Vec::new(),
        requires_shoot_days: false,
        requires_shoot_dates: false,
    }
}

/// The built-in catalog, in display order
pub fn builtin_templates() -> Vec<ProjectTemplate> {
    vec![tc_long_form(), blank_project()]
}

pub fn template_by_id(id: &str) -> Option<ProjectTemplate> {
    builtin_templates()
        .into_iter()
        .find(|template| template.id == id)
}

/// Display label of a shoot day, e.g. `DAY 14 - TUE. MAY 14`
pub fn shoot_day_label(date: NaiveDate) -> String {
    let weekday = date.format("%a").to_string().to_uppercase();
    let month = date.format("%b").to_string().to_uppercase();
    format!("DAY {day} - {weekday}. {month} {day}", day = date.day())
}

/// One shoot-day subtree with its fixed checklist
pub fn shoot_day_task(date: NaiveDate, now: DateTime<Utc>) -> Task {
    let checklist = SHOOT_DAY_CHECKLIST
        .iter()
        .map(|name| Task::at(*name, now))
        .collect();
    Task::at(shoot_day_label(date), now).with_subtasks(checklist)
}

/// Build a new project from `template`.
///
/// Slots expand only when the caller supplied at least one shoot date; the
/// dates are used in ascending order and never padded up to `shoot_days`.
pub fn instantiate(template: &ProjectTemplate, params: InstantiateParams) -> Result<Project> {
    let name = params.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument(
            "project name must not be empty".to_string(),
        ));
    }
    if template.requires_shoot_days && params.shoot_days.is_none() {
        return Err(Error::MissingTemplateParameter {
            template: template.id.clone(),
            parameter: "shootDays".to_string(),
        });
    }
    if template.requires_shoot_dates && params.shoot_dates.as_ref().map_or(true, Vec::is_empty) {
        return Err(Error::MissingTemplateParameter {
            template: template.id.clone(),
            parameter: "shootDates".to_string(),
        });
    }

    let now = Utc::now();
    let mut sorted_dates = params.shoot_dates.clone().unwrap_or_default();
    sorted_dates.sort();

    let tasks = materialize_forest(&template.tasks, &sorted_dates, now);

    Ok(Project {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: Some(format!("Created from {} template", template.name)),
        tasks,
        instant_data: Vec::new(),
        created_at: now,
        updated_at: now,
        template: Some(template.id.clone()),
        shoot_days: params.shoot_days,
        shoot_dates: params.shoot_dates,
    })
}

fn materialize_forest(skeletons: &[TaskSkeleton], dates: &[NaiveDate], now: DateTime<Utc>) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(skeletons.len());
    for skeleton in skeletons {
        let mut task = Task::at(skeleton.name.clone(), now);
        task.completed = skeleton.completed;
        task.subtasks = materialize_forest(&skeleton.subtasks, dates, now);

        match &skeleton.slot {
            Some(slot) if !dates.is_empty() => {
                task.subtasks = match slot.kind {
                    SlotKind::ShootDays => dates
                        .iter()
                        .map(|date| shoot_day_task(*date, now))
                        .collect(),
                };
                tasks.push(task);
                tasks.extend(slot.followed_by.iter().map(|sibling| sibling.materialize(now)));
            }
            _ => tasks.push(task),
        }
    }
    tasks
}
