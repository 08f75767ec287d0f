//! Jira issue filter

use serde::Serialize;

use crate::filters::{
    age_criterion, idle_criterion, list_field, named_enum, range_criterion, BaseFilter,
    Calculation, Criterion, Dimension, DomainFilter, Grouping, Hygiene, ListField, Metric, Named,
    POOR_DESCRIPTION_MIN_LEN,
};
use crate::models::{ListRequest, TimeRange};

named_enum! {
    pub enum JiraIssueAcross {
        Project => "project",
        Status => "status",
        Priority => "priority",
        IssueType => "issue_type",
        Assignee => "assignee",
        Reporter => "reporter",
        Component => "component",
        Label => "label",
        Epic => "epic",
        Trend => "trend",
    }
}

impl Dimension for JiraIssueAcross {
    fn grouping(&self) -> Grouping {
        let (record_field, filter_key) = match self {
            JiraIssueAcross::Project => ("project", "projects"),
            JiraIssueAcross::Status => ("status", "statuses"),
            JiraIssueAcross::Priority => ("priority", "priorities"),
            JiraIssueAcross::IssueType => ("issue_type", "issue_types"),
            JiraIssueAcross::Assignee => ("assignee", "assignees"),
            JiraIssueAcross::Reporter => ("reporter", "reporters"),
            JiraIssueAcross::Component => ("components", "components"),
            JiraIssueAcross::Label => ("labels", "labels"),
            JiraIssueAcross::Epic => ("epic", "epics"),
            JiraIssueAcross::Trend => {
                return Grouping::Trend {
                    time_field: "issue_created_at",
                }
            }
        };
        Grouping::Field {
            record_field,
            filter_key: Some(filter_key),
        }
    }
}

named_enum! {
    pub enum JiraIssueCalculation {
        TicketCount => "ticket_count",
        Hops => "hops",
        Bounces => "bounces",
        ResolutionTime => "resolution_time",
        Age => "age",
        StoryPoints => "story_points",
    }
}

impl Calculation for JiraIssueCalculation {
    fn metric(&self) -> Metric {
        match self {
            JiraIssueCalculation::TicketCount => Metric::Count,
            JiraIssueCalculation::Hops => Metric::Field("hops"),
            JiraIssueCalculation::Bounces => Metric::Field("bounces"),
            JiraIssueCalculation::ResolutionTime => Metric::Field("resolution_time"),
            JiraIssueCalculation::Age => Metric::AgeDays("issue_created_at"),
            JiraIssueCalculation::StoryPoints => Metric::Field("story_points"),
        }
    }
}

named_enum! {
    pub enum JiraHygiene {
        Idle => "idle",
        NoAssignee => "no_assignee",
        NoDueDate => "no_due_date",
        PoorDescription => "poor_description",
        NoComponents => "no_components",
    }
}

impl Hygiene for JiraHygiene {
    fn criteria(&self, now: i64) -> Vec<Criterion> {
        let criterion = match self {
            JiraHygiene::Idle => idle_criterion("issue_updated_at", now),
            JiraHygiene::NoAssignee => Criterion::Missing {
                field: "assignee".to_string(),
            },
            JiraHygiene::NoDueDate => Criterion::Missing {
                field: "issue_due_at".to_string(),
            },
            JiraHygiene::PoorDescription => Criterion::ShorterThan {
                field: "description".to_string(),
                min_len: POOR_DESCRIPTION_MIN_LEN,
            },
            JiraHygiene::NoComponents => Criterion::Missing {
                field: "components".to_string(),
            },
        };
        vec![criterion]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JiraIssuesFilter {
    pub projects: Vec<String>,
    pub statuses: Vec<String>,
    pub priorities: Vec<String>,
    pub issue_types: Vec<String>,
    pub assignees: Vec<String>,
    pub reporters: Vec<String>,
    pub components: Vec<String>,
    pub labels: Vec<String>,
    pub epics: Vec<String>,
    pub keys: Vec<String>,
    pub issue_created_range: Option<TimeRange>,
    pub issue_updated_range: Option<TimeRange>,
    pub issue_resolution_range: Option<TimeRange>,
    /// Issue age in days
    pub age: Option<TimeRange>,
    pub hygiene_types: Vec<JiraHygiene>,
    pub across: Option<JiraIssueAcross>,
    pub calculation: Option<JiraIssueCalculation>,
    #[serde(flatten)]
    pub base: BaseFilter,
}

impl JiraIssuesFilter {
    /// Copy without created/updated ranges, used for value lookups
    pub fn without_time_ranges(&self) -> Self {
        Self {
            issue_created_range: None,
            issue_updated_range: None,
            ..self.clone()
        }
    }
}

static FIELDS: &[ListField<JiraIssuesFilter>] = &[
    list_field!("projects", Some("jira_projects"), "project", projects),
    list_field!("statuses", Some("jira_statuses"), "status", statuses),
    list_field!("priorities", Some("jira_priorities"), "priority", priorities),
    list_field!("issue_types", Some("jira_issue_types"), "issue_type", issue_types),
    list_field!("assignees", Some("jira_assignees"), "assignee", assignees),
    list_field!("reporters", Some("jira_reporters"), "reporter", reporters),
    list_field!("components", Some("jira_components"), "components", components),
    list_field!("labels", Some("jira_labels"), "labels", labels),
    list_field!("epics", Some("jira_epics"), "epic", epics),
    list_field!("keys", None, "key", keys),
];

impl DomainFilter for JiraIssuesFilter {
    type Across = JiraIssueAcross;
    type Calc = JiraIssueCalculation;

    const DOMAIN: &'static str = "jira_issues";
    const APPLICATION: &'static str = "jira";
    const DEFAULT_ACROSS: JiraIssueAcross = JiraIssueAcross::Assignee;
    const DEFAULT_CALCULATION: JiraIssueCalculation = JiraIssueCalculation::TicketCount;

    fn list_fields() -> &'static [ListField<Self>] {
        FIELDS
    }

    fn base(&self) -> &BaseFilter {
        &self.base
    }

    /// Value lookups ignore the created and updated windows
    fn values_base(&self) -> Self {
        self.without_time_ranges()
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn across(&self) -> Option<JiraIssueAcross> {
        self.across
    }

    fn set_across(&mut self, across: Option<JiraIssueAcross>) {
        self.across = across;
    }

    fn calculation(&self) -> JiraIssueCalculation {
        self.calculation.unwrap_or(Self::DEFAULT_CALCULATION)
    }

    fn set_calculation(&mut self, calculation: Option<JiraIssueCalculation>) {
        self.calculation = calculation;
    }

    fn parse_extra(&mut self, request: &ListRequest, prefix: &str) {
        self.issue_created_range = request.time_range(&format!("{prefix}issue_created_at"));
        self.issue_updated_range = request.time_range(&format!("{prefix}issue_updated_at"));
        self.issue_resolution_range = request.time_range(&format!("{prefix}issue_resolved_at"));
        self.age = request.time_range(&format!("{prefix}age"));
        self.hygiene_types =
            JiraHygiene::parse_all(&request.list_or_default(&format!("{prefix}hygiene_types")));
    }

    fn extra_criteria(&self, now: i64) -> Vec<Criterion> {
        let mut criteria: Vec<Criterion> = [
            range_criterion("issue_created_at", self.issue_created_range),
            range_criterion("issue_updated_at", self.issue_updated_range),
            range_criterion("issue_resolved_at", self.issue_resolution_range),
            age_criterion("issue_created_at", self.age, now),
        ]
        .into_iter()
        .flatten()
        .collect();
        for hygiene in &self.hygiene_types {
            criteria.extend(hygiene.criteria(now));
        }
        criteria
    }
}
