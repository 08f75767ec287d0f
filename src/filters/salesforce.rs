//! Salesforce case filter

use serde::Serialize;

use crate::filters::{
    age_criterion, idle_criterion, list_field, named_enum, range_criterion, BaseFilter,
    Calculation, Criterion, Dimension, DomainFilter, Grouping, Hygiene, ListField, Metric, Named,
    POOR_DESCRIPTION_MIN_LEN,
};
use crate::models::{ListRequest, TimeRange};

named_enum! {
    pub enum SalesforceCaseAcross {
        Priority => "priority",
        Status => "status",
        Contact => "contact",
        Type => "type",
        Account => "account",
        Trend => "trend",
    }
}

impl Dimension for SalesforceCaseAcross {
    fn grouping(&self) -> Grouping {
        let (record_field, filter_key) = match self {
            SalesforceCaseAcross::Priority => ("priority", "priorities"),
            SalesforceCaseAcross::Status => ("status", "statuses"),
            SalesforceCaseAcross::Contact => ("contact", "contacts"),
            SalesforceCaseAcross::Type => ("type", "types"),
            SalesforceCaseAcross::Account => ("account_name", "accounts"),
            SalesforceCaseAcross::Trend => return Grouping::Trend { time_field: "created_at" },
        };
        Grouping::Field {
            record_field,
            filter_key: Some(filter_key),
        }
    }
}

named_enum! {
    pub enum SalesforceCaseCalculation {
        Hops => "hops",
        Bounces => "bounces",
        CaseCount => "case_count",
        ResolutionTime => "resolution_time",
    }
}

impl Calculation for SalesforceCaseCalculation {
    fn metric(&self) -> Metric {
        match self {
            SalesforceCaseCalculation::Hops => Metric::Field("hops"),
            SalesforceCaseCalculation::Bounces => Metric::Field("bounces"),
            SalesforceCaseCalculation::CaseCount => Metric::Count,
            SalesforceCaseCalculation::ResolutionTime => Metric::Field("resolution_time"),
        }
    }
}

named_enum! {
    pub enum SalesforceHygiene {
        Idle => "idle",
        PoorDescription => "poor_description",
        NoContact => "no_contact",
        MissedResolutionTime => "missed_resolution_time",
    }
}

/// Contact value stored for cases without a contact
const UNASSIGNED_CONTACT: &str = "_UNASSIGNED_";

impl Hygiene for SalesforceHygiene {
    fn criteria(&self, now: i64) -> Vec<Criterion> {
        match self {
            SalesforceHygiene::Idle => vec![idle_criterion("updated_at", now)],
            SalesforceHygiene::PoorDescription => vec![Criterion::ShorterThan {
                field: "subject".to_string(),
                min_len: POOR_DESCRIPTION_MIN_LEN,
            }],
            SalesforceHygiene::NoContact => vec![Criterion::AnyOf {
                field: "contact".to_string(),
                values: vec![UNASSIGNED_CONTACT.to_string()],
            }],
            SalesforceHygiene::MissedResolutionTime => vec![
                Criterion::Missing { field: "resolved_at".to_string() },
                idle_criterion("created_at", now),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesforceCaseFilter {
    pub case_ids: Vec<String>,
    pub case_numbers: Vec<String>,
    pub priorities: Vec<String>,
    pub statuses: Vec<String>,
    pub contacts: Vec<String>,
    pub types: Vec<String>,
    pub accounts: Vec<String>,
    pub created_at: Option<TimeRange>,
    pub updated_at: Option<TimeRange>,
    /// Case age in days
    pub age: Option<TimeRange>,
    pub hygiene_types: Vec<SalesforceHygiene>,
    pub across: Option<SalesforceCaseAcross>,
    pub calculation: Option<SalesforceCaseCalculation>,
    #[serde(flatten)]
    pub base: BaseFilter,
}

static FIELDS: &[ListField<SalesforceCaseFilter>] = &[
    list_field!("case_ids", None, "case_id", case_ids),
    list_field!("case_numbers", None, "case_number", case_numbers),
    list_field!("priorities", Some("sf_priorities"), "priority", priorities),
    list_field!("statuses", Some("sf_statuses"), "status", statuses),
    list_field!("contacts", Some("sf_contacts"), "contact", contacts),
    list_field!("types", Some("sf_types"), "type", types),
    list_field!("accounts", Some("sf_accounts"), "account_name", accounts),
];

impl DomainFilter for SalesforceCaseFilter {
    type Across = SalesforceCaseAcross;
    type Calc = SalesforceCaseCalculation;

    const DOMAIN: &'static str = "salesforce_cases";
    const APPLICATION: &'static str = "salesforce";
    const DEFAULT_ACROSS: SalesforceCaseAcross = SalesforceCaseAcross::Contact;
    const DEFAULT_CALCULATION: SalesforceCaseCalculation = SalesforceCaseCalculation::CaseCount;

    fn list_fields() -> &'static [ListField<Self>] {
        FIELDS
    }

    fn base(&self) -> &BaseFilter {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseFilter {
        &mut self.base
    }

    fn across(&self) -> Option<SalesforceCaseAcross> {
        self.across
    }

    fn set_across(&mut self, across: Option<SalesforceCaseAcross>) {
        self.across = across;
    }

    fn calculation(&self) -> SalesforceCaseCalculation {
        self.calculation.unwrap_or(Self::DEFAULT_CALCULATION)
    }

    fn set_calculation(&mut self, calculation: Option<SalesforceCaseCalculation>) {
        self.calculation = calculation;
    }

    fn parse_extra(&mut self, request: &ListRequest, prefix: &str) {
        self.created_at = request.time_range(&format!("{prefix}created_at"));
        self.updated_at = request.time_range(&format!("{prefix}updated_at"));
        self.age = request.time_range(&format!("{prefix}age"));
        self.hygiene_types = SalesforceHygiene::parse_all(&request.list_or_default("hygiene_types"));
    }

    fn extra_criteria(&self, now: i64) -> Vec<Criterion> {
        let mut criteria: Vec<Criterion> = [
            range_criterion("created_at", self.created_at),
            range_criterion("updated_at", self.updated_at),
            age_criterion("created_at", self.age, now),
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
