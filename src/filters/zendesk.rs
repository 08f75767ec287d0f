//! Zendesk ticket filter

use serde::Serialize;

use crate::filters::{
    age_criterion, idle_criterion, list_field, named_enum, range_criterion, BaseFilter,
    Calculation, Criterion, Dimension, DomainFilter, Grouping, Hygiene, ListField, Metric, Named,
    POOR_DESCRIPTION_MIN_LEN,
};
use crate::models::{ListRequest, TimeRange};

named_enum! {
    pub enum ZendeskTicketAcross {
        Brand => "brand",
        Type => "type",
        Priority => "priority",
        Status => "status",
        Organization => "organization",
        Requester => "requester",
        Submitter => "submitter",
        Assignee => "assignee",
        Trend => "trend",
    }
}

impl Dimension for ZendeskTicketAcross {
    fn grouping(&self) -> Grouping {
        let (record_field, filter_key) = match self {
            ZendeskTicketAcross::Brand => ("brand", "brands"),
            ZendeskTicketAcross::Type => ("type", "types"),
            ZendeskTicketAcross::Priority => ("priority", "priorities"),
            ZendeskTicketAcross::Status => ("status", "statuses"),
            ZendeskTicketAcross::Organization => ("organization", "organizations"),
            ZendeskTicketAcross::Requester => ("requester", "requesters"),
            ZendeskTicketAcross::Submitter => ("submitter", "submitters"),
            ZendeskTicketAcross::Assignee => ("assignee", "assignees"),
            ZendeskTicketAcross::Trend => {
                return Grouping::Trend {
                    time_field: "ticket_created_at",
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
    pub enum ZendeskTicketCalculation {
        Bounces => "bounces",
        Hops => "hops",
        ResponseTime => "response_time",
        ResolutionTime => "resolution_time",
        AgentWaitTime => "agent_wait_time",
        RequesterWaitTime => "requester_wait_time",
        Reopens => "reopens",
        Replies => "replies",
        TicketCount => "ticket_count",
    }
}

impl Calculation for ZendeskTicketCalculation {
    fn metric(&self) -> Metric {
        match self {
            ZendeskTicketCalculation::Bounces => Metric::Field("bounces"),
            ZendeskTicketCalculation::Hops => Metric::Field("hops"),
            ZendeskTicketCalculation::ResponseTime => Metric::Field("first_reply_time"),
            ZendeskTicketCalculation::ResolutionTime => Metric::Field("full_resolution_time"),
            ZendeskTicketCalculation::AgentWaitTime => Metric::Field("agent_wait_time"),
            ZendeskTicketCalculation::RequesterWaitTime => Metric::Field("requester_wait_time"),
            ZendeskTicketCalculation::Reopens => Metric::Field("reopens"),
            ZendeskTicketCalculation::Replies => Metric::Field("replies"),
            ZendeskTicketCalculation::TicketCount => Metric::Count,
        }
    }
}

named_enum! {
    pub enum ZendeskHygiene {
        Idle => "idle",
        PoorDescription => "poor_description",
        NoContact => "no_contact",
        MissedResolutionTime => "missed_resolution_time",
    }
}

impl Hygiene for ZendeskHygiene {
    fn criteria(&self, now: i64) -> Vec<Criterion> {
        match self {
            ZendeskHygiene::Idle => vec![idle_criterion("ticket_updated_at", now)],
            ZendeskHygiene::PoorDescription => vec![Criterion::ShorterThan {
                field: "description".to_string(),
                min_len: POOR_DESCRIPTION_MIN_LEN,
            }],
            ZendeskHygiene::NoContact => vec![Criterion::Missing {
                field: "assignee".to_string(),
            }],
            ZendeskHygiene::MissedResolutionTime => vec![
                Criterion::Missing {
                    field: "solved_at".to_string(),
                },
                idle_criterion("ticket_created_at", now),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZendeskTicketFilter {
    pub brands: Vec<String>,
    pub types: Vec<String>,
    pub priorities: Vec<String>,
    pub statuses: Vec<String>,
    pub organizations: Vec<String>,
    pub requesters: Vec<String>,
    pub submitters: Vec<String>,
    pub assignees: Vec<String>,
    pub ticket_created_at: Option<TimeRange>,
    /// Ticket age in days
    pub age: Option<TimeRange>,
    pub hygiene_types: Vec<ZendeskHygiene>,
    pub across: Option<ZendeskTicketAcross>,
    pub calculation: Option<ZendeskTicketCalculation>,
    #[serde(flatten)]
    pub base: BaseFilter,
}

static FIELDS: &[ListField<ZendeskTicketFilter>] = &[
    list_field!("brands", Some("zd_brands"), "brand", brands),
    list_field!("types", Some("zd_types"), "type", types),
    list_field!("priorities", Some("zd_priorities"), "priority", priorities),
    list_field!("statuses", Some("zd_statuses"), "status", statuses),
    list_field!("organizations", Some("zd_organizations"), "organization", organizations),
    list_field!("requesters", Some("zd_requesters"), "requester", requesters),
    list_field!("submitters", Some("zd_submitters"), "submitter", submitters),
    list_field!("assignees", Some("zd_assignees"), "assignee", assignees),
];

impl DomainFilter for ZendeskTicketFilter {
    type Across = ZendeskTicketAcross;
    type Calc = ZendeskTicketCalculation;

    const DOMAIN: &'static str = "zendesk_tickets";
    const APPLICATION: &'static str = "zendesk";
    const DEFAULT_ACROSS: ZendeskTicketAcross = ZendeskTicketAcross::Organization;
    const DEFAULT_CALCULATION: ZendeskTicketCalculation = ZendeskTicketCalculation::TicketCount;

    fn list_fields() -> &'static [ListField<Self>] {
        FIELDS
    }

    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn across(&self) -> Option<ZendeskTicketAcross> {
        self.across
    }

    fn set_across(&mut self, across: Option<ZendeskTicketAcross>) {
        self.across = across;
    }

    fn calculation(&self) -> ZendeskTicketCalculation {
        self.calculation.unwrap_or(Self::DEFAULT_CALCULATION)
    }

    fn set_calculation(&mut self, calculation: Option<ZendeskTicketCalculation>) {
        self.calculation = calculation;
    }

    fn parse_extra(&mut self, request: &ListRequest, prefix: &str) {
        self.ticket_created_at = request.time_range(&format!("{prefix}created_at"));
        self.age = request.time_range(&format!("{prefix}age"));
        self.hygiene_types = ZendeskHygiene::parse_all(&request.list_or_default("hygiene_types"));
    }

    fn extra_criteria(&self, now: i64) -> Vec<Criterion> {
        let mut criteria: Vec<Criterion> = [
            range_criterion("ticket_created_at", self.ticket_created_at),
            age_criterion("ticket_created_at", self.age, now),
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
