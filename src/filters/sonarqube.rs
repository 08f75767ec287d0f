//! SonarQube issue filter

use serde::Serialize;

use crate::filters::{
    list_field, named_enum, range_criterion, BaseFilter, Calculation, Criterion, Dimension,
    DomainFilter, Grouping, ListField, Metric,
};
use crate::models::{ListRequest, TimeRange};

named_enum! {
    pub enum SonarQubeIssueAcross {
        Project => "project",
        Type => "type",
        Severity => "severity",
        Status => "status",
        Organization => "organization",
        Author => "author",
        Tag => "tag",
        Component => "component",
        Trend => "trend",
    }
}

impl Dimension for SonarQubeIssueAcross {
    fn grouping(&self) -> Grouping {
        let (record_field, filter_key) = match self {
            SonarQubeIssueAcross::Project => ("project", "projects"),
            SonarQubeIssueAcross::Type => ("type", "types"),
            SonarQubeIssueAcross::Severity => ("severity", "severities"),
            SonarQubeIssueAcross::Status => ("status", "statuses"),
            SonarQubeIssueAcross::Organization => ("organization", "organizations"),
            SonarQubeIssueAcross::Author => ("author", "authors"),
            SonarQubeIssueAcross::Tag => ("tags", "tags"),
            SonarQubeIssueAcross::Component => ("component", "components"),
            SonarQubeIssueAcross::Trend => return Grouping::Trend { time_field: "creation_date" },
        };
        Grouping::Field {
            record_field,
            filter_key: Some(filter_key),
        }
    }
}

named_enum! {
    pub enum SonarQubeIssueCalculation {
        IssueCount => "issue_count",
        Effort => "effort",
    }
}

impl Calculation for SonarQubeIssueCalculation {
    fn metric(&self) -> Metric {
        match self {
            SonarQubeIssueCalculation::IssueCount => Metric::Count,
            SonarQubeIssueCalculation::Effort => Metric::Field("effort"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SonarQubeIssueFilter {
    pub projects: Vec<String>,
    pub types: Vec<String>,
    pub severities: Vec<String>,
    pub statuses: Vec<String>,
    pub organizations: Vec<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub components: Vec<String>,
    pub creation_date: Option<TimeRange>,
    pub across: Option<SonarQubeIssueAcross>,
    pub calculation: Option<SonarQubeIssueCalculation>,
    #[serde(flatten)]
    pub base: BaseFilter,
}

static FIELDS: &[ListField<SonarQubeIssueFilter>] = &[
    list_field!("projects", Some("sq_projects"), "project", projects),
    list_field!("types", Some("sq_types"), "type", types),
    list_field!("severities", Some("sq_severities"), "severity", severities),
    list_field!("statuses", Some("sq_statuses"), "status", statuses),
    list_field!("organizations", Some("sq_organizations"), "organization", organizations),
    list_field!("authors", Some("sq_authors"), "author", authors),
    list_field!("tags", Some("sq_tags"), "tags", tags),
    list_field!("components", Some("sq_components"), "component", components),
];

impl DomainFilter for SonarQubeIssueFilter {
    type Across = SonarQubeIssueAcross;
    type Calc = SonarQubeIssueCalculation;

    const DOMAIN: &'static str = "sonarqube_issues";
    const APPLICATION: &'static str = "sonarqube";
    const DEFAULT_ACROSS: SonarQubeIssueAcross = SonarQubeIssueAcross::Project;
    const DEFAULT_CALCULATION: SonarQubeIssueCalculation = SonarQubeIssueCalculation::IssueCount;

    fn list_fields() -> &'static [ListField<Self>] {
        FIELDS
    }

    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn across(&self) -> Option<SonarQubeIssueAcross> {
        self.across
    }

    fn set_across(&mut self, across: Option<SonarQubeIssueAcross>) {
        self.across = across;
    }

    fn calculation(&self) -> SonarQubeIssueCalculation {
        self.calculation.unwrap_or(Self::DEFAULT_CALCULATION)
    }

    fn set_calculation(&mut self, calculation: Option<SonarQubeIssueCalculation>) {
        self.calculation = calculation;
    }

    fn parse_extra(&mut self, request: &ListRequest, prefix: &str) {
        self.creation_date = request.time_range(&format!("{prefix}created_at"));
    }

    fn extra_criteria(&self, _now: i64) -> Vec<Criterion> {
        range_criterion("creation_date", self.creation_date)
            .into_iter()
            .collect()
    }
}
