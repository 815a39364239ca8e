/// How a single query ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Succeeded { count: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query: usize,
    pub status: QueryStatus,
}

impl QueryOutcome {
    pub fn succeeded(query: usize, count: usize) -> Self {
        Self {
            query,
            status: QueryStatus::Succeeded { count },
        }
    }

    pub fn failed(query: usize, error: String) -> Self {
        Self {
            query,
            status: QueryStatus::Failed { error },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, QueryStatus::Succeeded { .. })
    }
}

/// Outcomes of one fan-out, ordered by query identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    outcomes: Vec<QueryOutcome>,
}

impl RunReport {
    pub fn new(mut outcomes: Vec<QueryOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.query);
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[QueryOutcome] {
        &self.outcomes
    }

    /// Number of queries that reported back, successful or not
    pub fn completed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.completed() - self.succeeded()
    }

    /// Records retrieved across all successful queries
    pub fn total_records(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                QueryStatus::Succeeded { count } => count,
                QueryStatus::Failed { .. } => 0,
            })
            .sum()
    }
}
