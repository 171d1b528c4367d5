use std::cmp::Ordering;

use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{normalize_tag, Project, Task, TaskPriority, TaskStatus, Timestamp};

/// Due-date buckets, evaluated against the local calendar at query time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DueFilter {
    #[default]
    All,
    Overdue,
    Today,
    ThisWeek,
    ThisMonth,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Created,
    Updated,
    Title,
    Priority,
    DueDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// One UI surface's filter and sort parameters. Every field has a no-op
/// default, so an empty query is always valid and keeps every record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", default)]
pub struct TaskQuery {
    /// Case-insensitive substring match; blank means no text filter.
    pub search_term: String,
    /// None means "all".
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub tag: Option<String>,
    pub due: DueFilter,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

/// Applies `query` to a snapshot of tasks and returns the filtered, ordered
/// view. Pure: the input is never mutated, and the same inputs produce the
/// same output. `now` is the evaluation instant (epoch seconds) used for the
/// due-date buckets.
pub fn filter_tasks(tasks: &[Task], query: &TaskQuery, now: Timestamp) -> Vec<Task> {
    let term = query.search_term.trim().to_lowercase();
    let tag = query.tag.as_deref().and_then(normalize_tag);
    let today = local_date(now);

    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|task| {
            if !term.is_empty() && !task_text_matches(task, &term) {
                return false;
            }
            if let Some(status) = query.status {
                if task.status != status {
                    return false;
                }
            }
            if let Some(priority) = query.priority {
                if task.priority != priority {
                    return false;
                }
            }
            if let Some(tag) = &tag {
                if !task.tags.contains(tag) {
                    return false;
                }
            }
            in_due_bucket(task.due_date, query.due, today)
        })
        .cloned()
        .collect();

    // Vec::sort_by is stable, which the UI relies on: records that compare
    // equal keep their input order.
    out.sort_by(|a, b| compare_tasks(a, b, query.sort_by, query.sort_order));
    out
}

/// Project variant of [`filter_tasks`]. Only the text filter applies
/// (projects carry no status, priority, tags, or due date); the priority and
/// due-date sort keys treat all projects as equal, preserving input order.
pub fn filter_projects(projects: &[Project], query: &TaskQuery) -> Vec<Project> {
    let term = query.search_term.trim().to_lowercase();

    let mut out: Vec<Project> = projects
        .iter()
        .filter(|project| term.is_empty() || project_text_matches(project, &term))
        .cloned()
        .collect();

    out.sort_by(|a, b| compare_projects(a, b, query.sort_by, query.sort_order));
    out
}

fn task_text_matches(task: &Task, term: &str) -> bool {
    task.title.to_lowercase().contains(term)
        || task.description.to_lowercase().contains(term)
        || task.tags.iter().any(|tag| tag.contains(term))
}

fn project_text_matches(project: &Project, term: &str) -> bool {
    project.name.to_lowercase().contains(term)
        || project
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(term))
}

fn local_date(ts: Timestamp) -> Option<NaiveDate> {
    Local.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive())
}

fn in_due_bucket(due: Option<Timestamp>, filter: DueFilter, today: Option<NaiveDate>) -> bool {
    if filter == DueFilter::All {
        return true;
    }
    let (Some(due_date), Some(today)) = (due.and_then(local_date), today) else {
        // Tasks without a due date belong to no bucket.
        return false;
    };
    match filter {
        DueFilter::All => true,
        DueFilter::Overdue => due_date < today,
        DueFilter::Today => due_date == today,
        DueFilter::ThisWeek => {
            // Sunday-based weeks, spanning 7 days.
            let week_start =
                today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
            due_date >= week_start && due_date < week_start + Duration::days(7)
        }
        DueFilter::ThisMonth => {
            due_date.year() == today.year() && due_date.month() == today.month()
        }
    }
}

fn compare_tasks(a: &Task, b: &Task, key: SortKey, order: SortOrder) -> Ordering {
    match key {
        SortKey::Created => directed(a.created_at.cmp(&b.created_at), order),
        SortKey::Updated => directed(a.updated_at.cmp(&b.updated_at), order),
        SortKey::Title => directed(a.title.cmp(&b.title), order),
        SortKey::Priority => directed(a.priority.rank().cmp(&b.priority.rank()), order),
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (Some(a_due), Some(b_due)) => directed(a_due.cmp(&b_due), order),
            // Dated tasks come before undated ones in both directions, so the
            // direction is applied before this tie-break, never to it.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

fn compare_projects(a: &Project, b: &Project, key: SortKey, order: SortOrder) -> Ordering {
    match key {
        SortKey::Created => directed(a.created_at.cmp(&b.created_at), order),
        SortKey::Updated => directed(a.updated_at.cmp(&b.updated_at), order),
        SortKey::Title => directed(a.name.cmp(&b.name), order),
        SortKey::Priority | SortKey::DueDate => Ordering::Equal,
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(id: u32, title: &str, created_at: i64) -> Task {
        Task::new(id, 1, title.to_string(), String::new(), created_at)
    }

    fn make_project(id: u32, name: &str, created_at: i64) -> Project {
        Project::new(id, name.to_string(), created_at)
    }

    fn local_ts(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .unwrap()
            .timestamp()
    }

    fn board() -> Vec<Task> {
        let mut report = make_task(1, "Write report", 1);
        report.status = TaskStatus::Todo;
        report.priority = TaskPriority::High;

        let mut milk = make_task(2, "Buy milk", 2);
        milk.status = TaskStatus::Done;
        milk.priority = TaskPriority::Low;

        let mut review = make_task(3, "Review PR", 3);
        review.status = TaskStatus::InProgress;
        review.priority = TaskPriority::Medium;

        vec![report, milk, review]
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn default_query_returns_everything_created_descending() {
        let tasks = board();
        let out = filter_tasks(&tasks, &TaskQuery::default(), 1000);
        assert_eq!(titles(&out), vec!["Review PR", "Buy milk", "Write report"]);
        // The input snapshot is untouched.
        assert_eq!(tasks[0].title, "Write report");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let query = TaskQuery {
            status: Some(TaskStatus::Done),
            due: DueFilter::Overdue,
            ..TaskQuery::default()
        };
        assert!(filter_tasks(&[], &query, 1000).is_empty());
    }

    #[test]
    fn status_filter_keeps_only_matching_tasks() {
        let query = TaskQuery {
            status: Some(TaskStatus::Todo),
            ..TaskQuery::default()
        };
        let out = filter_tasks(&board(), &query, 1000);
        assert_eq!(titles(&out), vec!["Write report"]);
    }

    #[test]
    fn priority_sort_ascending_is_low_medium_high() {
        let query = TaskQuery {
            sort_by: SortKey::Priority,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let out = filter_tasks(&board(), &query, 1000);
        assert_eq!(titles(&out), vec!["Buy milk", "Review PR", "Write report"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_description_and_tags() {
        let mut tasks = board();
        tasks[0].description = "quarterly numbers".to_string();
        tasks[2].add_tag("Urgent", 10);

        let query = TaskQuery {
            search_term: "MILK".to_string(),
            ..TaskQuery::default()
        };
        assert_eq!(titles(&filter_tasks(&tasks, &query, 1000)), vec!["Buy milk"]);

        let query = TaskQuery {
            search_term: "Quarterly".to_string(),
            ..TaskQuery::default()
        };
        assert_eq!(
            titles(&filter_tasks(&tasks, &query, 1000)),
            vec!["Write report"]
        );

        // Tags are stored lowercase, so the folded term finds them too.
        let query = TaskQuery {
            search_term: "URGENT".to_string(),
            ..TaskQuery::default()
        };
        assert_eq!(
            titles(&filter_tasks(&tasks, &query, 1000)),
            vec!["Review PR"]
        );
    }

    #[test]
    fn blank_search_term_is_no_filter() {
        let query = TaskQuery {
            search_term: "   ".to_string(),
            ..TaskQuery::default()
        };
        assert_eq!(filter_tasks(&board(), &query, 1000).len(), 3);
    }

    #[test]
    fn tag_filter_normalizes_the_filter_value() {
        let mut tasks = board();
        tasks[1].add_tag("groceries", 10);

        let query = TaskQuery {
            tag: Some(" Groceries ".to_string()),
            ..TaskQuery::default()
        };
        assert_eq!(titles(&filter_tasks(&tasks, &query, 1000)), vec!["Buy milk"]);
    }

    #[test]
    fn filters_are_and_combined() {
        let mut tasks = board();
        tasks[0].add_tag("work", 10);
        tasks[2].add_tag("work", 10);

        let query = TaskQuery {
            tag: Some("work".to_string()),
            status: Some(TaskStatus::Todo),
            ..TaskQuery::default()
        };
        let out = filter_tasks(&tasks, &query, 1000);
        assert_eq!(titles(&out), vec!["Write report"]);
        for task in &out {
            assert!(task.tags.contains(&"work".to_string()));
            assert_eq!(task.status, TaskStatus::Todo);
        }
    }

    #[test]
    fn overdue_bucket_excludes_today_and_undated() {
        let now = local_ts(2024, 3, 13, 12);
        let mut a = make_task(1, "A", 1);
        a.due_date = Some(local_ts(2024, 3, 12, 9));
        let mut b = make_task(2, "B", 2);
        b.due_date = Some(local_ts(2024, 3, 13, 9));
        let c = make_task(3, "C", 3);

        let query = TaskQuery {
            due: DueFilter::Overdue,
            ..TaskQuery::default()
        };
        assert_eq!(titles(&filter_tasks(&[a, b, c], &query, now)), vec!["A"]);
    }

    #[test]
    fn today_bucket_matches_calendar_day_not_instant() {
        let now = local_ts(2024, 3, 13, 12);
        let mut early = make_task(1, "early", 1);
        early.due_date = Some(local_ts(2024, 3, 13, 0));
        let mut late = make_task(2, "late", 2);
        late.due_date = Some(local_ts(2024, 3, 13, 23));
        let mut tomorrow = make_task(3, "tomorrow", 3);
        tomorrow.due_date = Some(local_ts(2024, 3, 14, 0));

        let query = TaskQuery {
            due: DueFilter::Today,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let out = filter_tasks(&[early, late, tomorrow], &query, now);
        assert_eq!(titles(&out), vec!["early", "late"]);
    }

    #[test]
    fn this_week_bucket_is_sunday_based() {
        // Wednesday 2024-01-10; the containing week runs Sun Jan 7 .. Sat Jan 13.
        let now = local_ts(2024, 1, 10, 12);
        let mut sunday = make_task(1, "sunday", 1);
        sunday.due_date = Some(local_ts(2024, 1, 7, 8));
        let mut saturday = make_task(2, "saturday", 2);
        saturday.due_date = Some(local_ts(2024, 1, 13, 20));
        let mut before = make_task(3, "before", 3);
        before.due_date = Some(local_ts(2024, 1, 6, 12));
        let mut after = make_task(4, "after", 4);
        after.due_date = Some(local_ts(2024, 1, 14, 0));

        let query = TaskQuery {
            due: DueFilter::ThisWeek,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let out = filter_tasks(&[sunday, saturday, before, after], &query, now);
        assert_eq!(titles(&out), vec!["sunday", "saturday"]);
    }

    #[test]
    fn this_month_bucket_spans_first_through_last_day() {
        let now = local_ts(2024, 2, 15, 12);
        let mut first = make_task(1, "first", 1);
        first.due_date = Some(local_ts(2024, 2, 1, 0));
        let mut last = make_task(2, "last", 2);
        last.due_date = Some(local_ts(2024, 2, 29, 23));
        let mut next = make_task(3, "next", 3);
        next.due_date = Some(local_ts(2024, 3, 1, 0));

        let query = TaskQuery {
            due: DueFilter::ThisMonth,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let out = filter_tasks(&[first, last, next], &query, now);
        assert_eq!(titles(&out), vec!["first", "last"]);
    }

    #[test]
    fn undated_tasks_sort_after_dated_regardless_of_direction() {
        let mut a = make_task(1, "A", 1);
        a.due_date = Some(local_ts(2024, 3, 16, 12));
        let b = make_task(2, "B", 2);

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let query = TaskQuery {
                sort_by: SortKey::DueDate,
                sort_order: order,
                ..TaskQuery::default()
            };
            let out = filter_tasks(&[b.clone(), a.clone()], &query, 1000);
            assert_eq!(titles(&out), vec!["A", "B"], "order {order:?}");
        }
    }

    #[test]
    fn due_date_sort_compares_timestamps_between_dated_tasks() {
        let mut a = make_task(1, "A", 1);
        a.due_date = Some(local_ts(2024, 3, 10, 12));
        let mut b = make_task(2, "B", 2);
        b.due_date = Some(local_ts(2024, 3, 20, 12));

        let query = TaskQuery {
            sort_by: SortKey::DueDate,
            sort_order: SortOrder::Desc,
            ..TaskQuery::default()
        };
        let out = filter_tasks(&[a, b], &query, 1000);
        assert_eq!(titles(&out), vec!["B", "A"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        // Four tasks sharing a priority keep their input order under a
        // priority sort, in both directions.
        let tasks: Vec<Task> = (1..=4)
            .map(|id| make_task(id, &format!("t{id}"), 100 - i64::from(id)))
            .collect();

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let query = TaskQuery {
                sort_by: SortKey::Priority,
                sort_order: order,
                ..TaskQuery::default()
            };
            let out = filter_tasks(&tasks, &query, 1000);
            assert_eq!(titles(&out), vec!["t1", "t2", "t3", "t4"], "order {order:?}");
        }
    }

    #[test]
    fn applying_a_noop_query_to_prior_output_is_idempotent() {
        let query = TaskQuery {
            status: Some(TaskStatus::Todo),
            sort_by: SortKey::Title,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let first = filter_tasks(&board(), &query, 1000);

        let noop = TaskQuery {
            sort_by: SortKey::Title,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let second = filter_tasks(&first, &noop, 1000);
        assert_eq!(first, second);
    }

    #[test]
    fn title_sort_is_lexical() {
        let query = TaskQuery {
            sort_by: SortKey::Title,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let out = filter_tasks(&board(), &query, 1000);
        assert_eq!(titles(&out), vec!["Buy milk", "Review PR", "Write report"]);
    }

    #[test]
    fn updated_sort_uses_update_timestamps() {
        let mut tasks = board();
        tasks[0].update_priority(TaskPriority::Low, 500);

        let query = TaskQuery {
            sort_by: SortKey::Updated,
            ..TaskQuery::default()
        };
        let out = filter_tasks(&tasks, &query, 1000);
        assert_eq!(titles(&out), vec!["Write report", "Review PR", "Buy milk"]);
    }

    #[test]
    fn projects_filter_on_name_and_description_only() {
        let mut alpha = make_project(1, "Alpha", 1);
        alpha.description = Some("Internal tooling".to_string());
        let beta = make_project(2, "Beta", 2);

        let query = TaskQuery {
            search_term: "TOOLING".to_string(),
            ..TaskQuery::default()
        };
        let out = filter_projects(&[alpha, beta], &query);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Alpha");
    }

    #[test]
    fn projects_ignore_task_only_predicates() {
        let projects = vec![make_project(1, "Alpha", 1), make_project(2, "Beta", 2)];
        let query = TaskQuery {
            status: Some(TaskStatus::Done),
            priority: Some(TaskPriority::High),
            tag: Some("x".to_string()),
            due: DueFilter::Overdue,
            ..TaskQuery::default()
        };
        assert_eq!(filter_projects(&projects, &query).len(), 2);
    }

    #[test]
    fn projects_keep_input_order_under_priority_and_due_sorts() {
        let projects = vec![make_project(1, "Beta", 1), make_project(2, "Alpha", 2)];
        for key in [SortKey::Priority, SortKey::DueDate] {
            let query = TaskQuery {
                sort_by: key,
                sort_order: SortOrder::Asc,
                ..TaskQuery::default()
            };
            let out = filter_projects(&projects, &query);
            assert_eq!(out[0].name, "Beta");
            assert_eq!(out[1].name, "Alpha");
        }
    }

    #[test]
    fn projects_sort_by_name_under_title_key() {
        let projects = vec![make_project(1, "Beta", 1), make_project(2, "Alpha", 2)];
        let query = TaskQuery {
            sort_by: SortKey::Title,
            sort_order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let out = filter_projects(&projects, &query);
        assert_eq!(out[0].name, "Alpha");
    }

    #[test]
    fn query_deserializes_from_partial_wire_payloads() {
        let query: TaskQuery = serde_json::from_str(
            r#"{ "search_term": "x", "due": "this-week", "sort_by": "due-date" }"#,
        )
        .unwrap();
        assert_eq!(query.due, DueFilter::ThisWeek);
        assert_eq!(query.sort_by, SortKey::DueDate);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert_eq!(query.status, None);
    }
}
