//! Mock aggregation collaborators
//!
//! Record every call made by the report handlers and answer with canned
//! results, so tests can assert on the filters the handlers resolved.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use sei_api::{
    filters::{
        DomainFilter, JiraIssuesFilter, Named, SalesforceCaseFilter, SonarQubeIssueFilter,
        TestRailsTestFilter, ZendeskTicketFilter,
    },
    models::{AggregationResult, DbListResponse, SortEntry},
    services::AggregationService,
    Aggregations,
};

/// Which collaborator operation was called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    List,
    GroupBy,
    Stacked,
}

/// One recorded collaborator call
#[derive(Debug, Clone)]
pub struct AggregationCall<F> {
    pub kind: CallKind,
    pub filter: F,
    pub context: Option<String>,
    pub stacks: Vec<String>,
}

/// Mock aggregation service for one domain
pub struct MockAggregation<F> {
    calls: Arc<Mutex<Vec<AggregationCall<F>>>>,
    results: Arc<Mutex<Vec<AggregationResult>>>,
    rows: Arc<Mutex<Vec<Value>>>,
    /// Simulate collaborator failures when set
    pub fail: Arc<Mutex<bool>>,
}

impl<F> Clone for MockAggregation<F> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
            results: self.results.clone(),
            rows: self.rows.clone(),
            fail: self.fail.clone(),
        }
    }
}

impl<F> Default for MockAggregation<F> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            results: Arc::new(Mutex::new(Vec::new())),
            rows: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(false)),
        }
    }
}

impl<F: DomainFilter> MockAggregation<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results returned by group-by calls without a context
    pub fn set_results(&self, results: Vec<AggregationResult>) {
        *self.results.lock().unwrap() = results;
    }

    /// Records returned by list calls
    pub fn set_rows(&self, rows: Vec<Value>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn calls(&self) -> Vec<AggregationCall<F>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(
        &self,
        kind: CallKind,
        filter: &F,
        context: Option<&str>,
        stacks: Vec<String>,
    ) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(AggregationCall {
            kind,
            filter: filter.clone(),
            context: context.map(str::to_string),
            stacks,
        });
        if *self.fail.lock().unwrap() {
            anyhow::bail!("aggregation backend unavailable");
        }
        Ok(())
    }

    /// Canned results; a context collapses them into one bucket
    fn grouped(&self, context: Option<&str>) -> DbListResponse<AggregationResult> {
        let results = self.results.lock().unwrap().clone();
        match context {
            Some(context) => {
                let count = results.iter().map(|r| r.count).sum();
                DbListResponse::from_records(vec![AggregationResult::count(context, count)])
            }
            None => DbListResponse::from_records(results),
        }
    }
}

#[async_trait]
impl<F: DomainFilter> AggregationService<F> for MockAggregation<F> {
    async fn list(
        &self,
        _tenant: &str,
        filter: &F,
        _sort: &[SortEntry],
        _page: u32,
        _page_size: u32,
    ) -> anyhow::Result<DbListResponse<Value>> {
        self.record(CallKind::List, filter, None, Vec::new())?;
        Ok(DbListResponse::from_records(self.rows.lock().unwrap().clone()))
    }

    async fn group_by_and_calculate(
        &self,
        _tenant: &str,
        filter: &F,
        context: Option<&str>,
    ) -> anyhow::Result<DbListResponse<AggregationResult>> {
        self.record(CallKind::GroupBy, filter, context, Vec::new())?;
        Ok(self.grouped(context))
    }

    async fn stacked_group_by(
        &self,
        _tenant: &str,
        filter: &F,
        stacks: &[F::Across],
        context: Option<&str>,
    ) -> anyhow::Result<DbListResponse<AggregationResult>> {
        let names = stacks.iter().map(|s| s.as_str().to_string()).collect();
        self.record(CallKind::Stacked, filter, context, names)?;
        Ok(self.grouped(context))
    }
}

/// Mock collaborators for every domain
#[derive(Clone, Default)]
pub struct MockAggregations {
    pub salesforce_cases: MockAggregation<SalesforceCaseFilter>,
    pub zendesk_tickets: MockAggregation<ZendeskTicketFilter>,
    pub testrails_tests: MockAggregation<TestRailsTestFilter>,
    pub sonarqube_issues: MockAggregation<SonarQubeIssueFilter>,
    pub jira_issues: MockAggregation<JiraIssuesFilter>,
}

impl MockAggregations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collaborators to install in the application state
    pub fn aggregations(&self) -> Aggregations {
        Aggregations {
            salesforce_cases: Arc::new(self.salesforce_cases.clone()),
            zendesk_tickets: Arc::new(self.zendesk_tickets.clone()),
            testrails_tests: Arc::new(self.testrails_tests.clone()),
            sonarqube_issues: Arc::new(self.sonarqube_issues.clone()),
            jira_issues: Arc::new(self.jira_issues.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_collapses_results() {
        let mock = MockAggregation::<SalesforceCaseFilter>::new();
        mock.set_results(vec![
            AggregationResult::count("high", 2),
            AggregationResult::count("low", 3),
        ]);

        let filter = SalesforceCaseFilter::default();
        let response = mock
            .group_by_and_calculate("acme", &filter, Some("team-a"))
            .await
            .unwrap();

        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].key, "team-a");
        assert_eq!(response.records[0].count, 5);
        assert_eq!(mock.calls()[0].context.as_deref(), Some("team-a"));
    }

    #[tokio::test]
    async fn test_failure_mode() {
        let mock = MockAggregation::<JiraIssuesFilter>::new();
        mock.set_failing(true);
        let result = mock
            .group_by_and_calculate("acme", &JiraIssuesFilter::default(), None)
            .await;
        assert!(result.is_err());
        assert_eq!(mock.call_count(), 1);
    }
}
