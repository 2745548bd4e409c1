//! The selected bill and the analysis fetched for it.
//!
//! Selecting a different bill hands out an [`AnalysisTicket`]; the caller runs the fetch and
//! brings the ticket back with the result. A ticket that no longer matches the selection is
//! stale and its result is dropped.

use crate::gateway::AnalysisError;
use crate::model::{Bill, BillAnalysis};

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Loading,
    Ready(BillAnalysis),
    Failed(String),
}

/// Permission to apply one analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub bill_id: String,
    pub title: String,
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct SelectionCache {
    selected: Option<String>,
    state: AnalysisState,
    seq: u64,
}

impl Default for SelectionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionCache {
    pub fn new() -> Self {
        Self {
            selected: None,
            state: AnalysisState::Idle,
            seq: 0,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn analysis(&self) -> Option<&BillAnalysis> {
        match &self.state {
            AnalysisState::Ready(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == AnalysisState::Loading
    }

    /// Select `bill`. Re-selecting the current bill does nothing and returns None; otherwise the
    /// previous analysis is discarded, the state becomes Loading, and a ticket is returned.
    pub fn select(&mut self, bill: &Bill) -> Option<AnalysisTicket> {
        if self.selected.as_deref() == Some(bill.id.as_str()) {
            return None;
        }
        self.seq += 1;
        self.selected = Some(bill.id.clone());
        self.state = AnalysisState::Loading;
        log::debug!("selection: {} (request {})", bill.id, self.seq);
        Some(AnalysisTicket {
            bill_id: bill.id.clone(),
            title: bill.title.clone(),
            seq: self.seq,
        })
    }

    /// Fetch the analysis of the current selection again. Outstanding tickets become stale.
    /// None when nothing is selected.
    pub fn refetch(&mut self, bill: &Bill) -> Option<AnalysisTicket> {
        if self.selected.as_deref() != Some(bill.id.as_str()) {
            return None;
        }
        self.seq += 1;
        self.state = AnalysisState::Loading;
        log::debug!("selection: refetch {} (request {})", bill.id, self.seq);
        Some(AnalysisTicket {
            bill_id: bill.id.clone(),
            title: bill.title.clone(),
            seq: self.seq,
        })
    }

    /// Back to Idle. Outstanding tickets become stale.
    pub fn clear(&mut self) {
        self.seq += 1;
        self.selected = None;
        self.state = AnalysisState::Idle;
    }

    /// Apply a finished fetch. Returns false, leaving state untouched, when the ticket is stale.
    pub fn apply(&mut self, ticket: &AnalysisTicket, result: Result<BillAnalysis, AnalysisError>) -> bool {
        let current = ticket.seq == self.seq && self.selected.as_deref() == Some(ticket.bill_id.as_str());
        if !current {
            log::debug!("selection: dropping stale analysis for {}", ticket.bill_id);
            return false;
        }
        self.state = match result {
            Ok(analysis) => AnalysisState::Ready(analysis),
            Err(e) => {
                log::error!("selection: analysis for {} failed: {}", ticket.bill_id, e);
                AnalysisState::Failed(
                    "Failed to fetch bill analysis. The model may be unavailable. Please try again later."
                        .to_string(),
                )
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use crate::model::{BillStatus, MindMap, Viewpoints, VoteCount};

    fn bill(id: &str) -> Bill {
        Bill {
            id: id.to_string(),
            title: format!("Bill {id}"),
            summary: String::new(),
            category: "Health".to_string(),
            status: BillStatus::Passed,
            date: "Passed on Jan 1, 2020".to_string(),
            vote_count: VoteCount::default(),
        }
    }

    fn analysis(explanation: &str) -> BillAnalysis {
        BillAnalysis {
            explanation: explanation.to_string(),
            viewpoints: Viewpoints {
                pro: "p".to_string(),
                con: "c".to_string(),
                neutral: "n".to_string(),
            },
            impact: vec![],
            debate: vec![],
            media: vec![],
            flashcards: vec![],
            mind_map: MindMap {
                central_topic: "t".to_string(),
                branches: vec![],
            },
        }
    }

    #[test]
    fn select_then_apply_reaches_ready() {
        let mut cache = SelectionCache::new();
        let ticket = cache.select(&bill("a")).unwrap();
        assert!(cache.is_loading());
        assert!(cache.apply(&ticket, Ok(analysis("A"))));
        assert_eq!(cache.analysis().unwrap().explanation, "A");
    }

    #[test]
    fn reselecting_same_bill_does_not_refetch() {
        let mut cache = SelectionCache::new();
        let ticket = cache.select(&bill("a")).unwrap();
        cache.apply(&ticket, Ok(analysis("A")));
        assert!(cache.select(&bill("a")).is_none());
        assert!(cache.analysis().is_some());
    }

    #[test]
    fn late_response_for_previous_bill_is_dropped() {
        let mut cache = SelectionCache::new();
        let a = cache.select(&bill("a")).unwrap();
        let b = cache.select(&bill("b")).unwrap();
        assert!(!cache.apply(&a, Ok(analysis("A"))));
        assert_eq!(cache.state(), &AnalysisState::Loading);
        assert!(cache.apply(&b, Ok(analysis("B"))));
        assert_eq!(cache.analysis().unwrap().explanation, "B");
        assert!(!cache.apply(&a, Ok(analysis("A"))));
        assert_eq!(cache.analysis().unwrap().explanation, "B");
    }

    #[test]
    fn failure_is_kept_on_the_selected_bill() {
        let mut cache = SelectionCache::new();
        let ticket = cache.select(&bill("a")).unwrap();
        let err = AnalysisError::Generation(GenerationError::EmptyResponse);
        assert!(cache.apply(&ticket, Err(err)));
        assert!(matches!(cache.state(), AnalysisState::Failed(_)));
        assert_eq!(cache.selected_id(), Some("a"));
    }

    #[test]
    fn clear_makes_outstanding_tickets_stale() {
        let mut cache = SelectionCache::new();
        let ticket = cache.select(&bill("a")).unwrap();
        cache.clear();
        assert!(!cache.apply(&ticket, Ok(analysis("A"))));
        assert_eq!(cache.state(), &AnalysisState::Idle);
        assert!(cache.select(&bill("a")).is_some());
    }
}
