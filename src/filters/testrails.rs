//! TestRail test filter

use serde::Serialize;

use crate::filters::{
    list_field, named_enum, range_criterion, BaseFilter, Calculation, Criterion, Dimension,
    DomainFilter, Grouping, ListField, Metric,
};
use crate::models::{ListRequest, TimeRange};

named_enum! {
    pub enum TestRailsTestAcross {
        Project => "project",
        Milestone => "milestone",
        TestPlan => "test_plan",
        TestRun => "test_run",
        Assignee => "assignee",
        Status => "status",
        Priority => "priority",
        Type => "type",
        Trend => "trend",
    }
}

impl Dimension for TestRailsTestAcross {
    fn grouping(&self) -> Grouping {
        let (record_field, filter_key) = match self {
            TestRailsTestAcross::Project => ("project", "projects"),
            TestRailsTestAcross::Milestone => ("milestone", "milestones"),
            TestRailsTestAcross::TestPlan => ("test_plan", "test_plans"),
            TestRailsTestAcross::TestRun => ("test_run", "test_runs"),
            TestRailsTestAcross::Assignee => ("assignee", "assignees"),
            TestRailsTestAcross::Status => ("status", "statuses"),
            TestRailsTestAcross::Priority => ("priority", "priorities"),
            TestRailsTestAcross::Type => ("type", "types"),
            TestRailsTestAcross::Trend => return Grouping::Trend { time_field: "created_on" },
        };
        Grouping::Field {
            record_field,
            filter_key: Some(filter_key),
        }
    }
}

named_enum! {
    pub enum TestRailsTestCalculation {
        TestCount => "test_count",
        Estimate => "estimate",
        EstimateForecast => "estimate_forecast",
    }
}

impl Calculation for TestRailsTestCalculation {
    fn metric(&self) -> Metric {
        match self {
            TestRailsTestCalculation::TestCount => Metric::Count,
            TestRailsTestCalculation::Estimate => Metric::Field("estimate"),
            TestRailsTestCalculation::EstimateForecast => Metric::Field("estimate_forecast"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestRailsTestFilter {
    pub projects: Vec<String>,
    pub milestones: Vec<String>,
    pub test_plans: Vec<String>,
    pub test_runs: Vec<String>,
    pub assignees: Vec<String>,
    pub statuses: Vec<String>,
    pub priorities: Vec<String>,
    pub types: Vec<String>,
    pub created_on: Option<TimeRange>,
    pub across: Option<TestRailsTestAcross>,
    pub calculation: Option<TestRailsTestCalculation>,
    #[serde(flatten)]
    pub base: BaseFilter,
}

static FIELDS: &[ListField<TestRailsTestFilter>] = &[
    list_field!("projects", Some("tr_projects"), "project", projects),
    list_field!("milestones", Some("tr_milestones"), "milestone", milestones),
    list_field!("test_plans", Some("tr_test_plans"), "test_plan", test_plans),
    list_field!("test_runs", Some("tr_test_runs"), "test_run", test_runs),
    list_field!("assignees", Some("tr_assignees"), "assignee", assignees),
    list_field!("statuses", Some("tr_statuses"), "status", statuses),
    list_field!("priorities", Some("tr_priorities"), "priority", priorities),
    list_field!("types", Some("tr_types"), "type", types),
];

impl DomainFilter for TestRailsTestFilter {
    type Across = TestRailsTestAcross;
    type Calc = TestRailsTestCalculation;

    const DOMAIN: &'static str = "testrails_tests";
    const APPLICATION: &'static str = "testrails";
    const DEFAULT_ACROSS: TestRailsTestAcross = TestRailsTestAcross::Assignee;
    const DEFAULT_CALCULATION: TestRailsTestCalculation = TestRailsTestCalculation::TestCount;

    fn list_fields() -> &'static [ListField<Self>] {
        FIELDS
    }

    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn across(&self) -> Option<TestRailsTestAcross> {
        self.across
    }

    fn set_across(&mut self, across: Option<TestRailsTestAcross>) {
        self.across = across;
    }

    fn calculation(&self) -> TestRailsTestCalculation {
        self.calculation.unwrap_or(Self::DEFAULT_CALCULATION)
    }

    fn set_calculation(&mut self, calculation: Option<TestRailsTestCalculation>) {
        self.calculation = calculation;
    }

    fn parse_extra(&mut self, request: &ListRequest, prefix: &str) {
        // older dashboards send created_at
        self.created_on = request
            .time_range(&format!("{prefix}created_on"))
            .or_else(|| request.time_range(&format!("{prefix}created_at")));
    }

    fn extra_criteria(&self, _now: i64) -> Vec<Criterion> {
        range_criterion("created_on", self.created_on)
            .into_iter()
            .collect()
    }
}
