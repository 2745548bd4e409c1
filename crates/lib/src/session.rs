//! Browser session: the whole screen state of one user session.
//!
//! Composes the catalog, the selection cache, the filter/sort controls, the search status and
//! the detail view of the selected bill. Every method is synchronous. Methods that need a
//! network round trip return a ticket; the caller performs the request and hands the ticket
//! back with the result. Completions whose ticket no longer matches are dropped.

use crate::catalog::BillCatalog;
use crate::chat::ChatThread;
use crate::gateway::{AnalysisError, ChatContinuation, SearchError};
use crate::model::{Bill, BillAnalysis, ChatMessage, UserVote, DEFAULT_LANGUAGE};
use crate::selection::{AnalysisTicket, SelectionCache};
use crate::view::{self, SortKey, YearFilter};

pub const SEARCH_FAILED_MESSAGE: &str =
    "Failed to fetch bills from the web. Please try a different search term or try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SearchStatus {
    NotSearched,
    Searching,
    Failed(String),
    Done,
}

/// What the bill list shows. Each empty case has its own trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<'a> {
    NotSearched,
    Searching,
    SearchFailed(&'a str),
    /// The last search returned zero bills.
    NoResults,
    /// Bills exist but none pass the year filter.
    FilteredOut,
    Bills(Vec<&'a Bill>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub query: String,
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct ChatTicket {
    pub bill_title: String,
    /// Thread including the just-submitted user message.
    pub thread: Vec<ChatMessage>,
    view: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailTab {
    #[default]
    Overview,
    Viewpoints,
    Impact,
    Debates,
    Media,
    Discussion,
}

impl DetailTab {
    pub const ALL: [DetailTab; 6] = [
        DetailTab::Overview,
        DetailTab::Viewpoints,
        DetailTab::Impact,
        DetailTab::Debates,
        DetailTab::Media,
        DetailTab::Discussion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::Viewpoints => "Viewpoints",
            DetailTab::Impact => "Impact",
            DetailTab::Debates => "Debates",
            DetailTab::Media => "Media",
            DetailTab::Discussion => "Discussion",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverviewTab {
    #[default]
    Explanation,
    MindMap,
    Flashcards,
}

impl OverviewTab {
    pub const ALL: [OverviewTab; 3] = [OverviewTab::Explanation, OverviewTab::MindMap, OverviewTab::Flashcards];

    pub fn label(self) -> &'static str {
        match self {
            OverviewTab::Explanation => "Explanation",
            OverviewTab::MindMap => "Mind Map",
            OverviewTab::Flashcards => "Flashcards",
        }
    }
}

/// Per-bill view state, recreated whenever a different bill is selected.
#[derive(Debug, Clone)]
pub struct DetailView {
    pub bill_id: String,
    pub tab: DetailTab,
    pub overview_tab: OverviewTab,
    vote: UserVote,
    chat: ChatThread,
    generation: u64,
}

impl DetailView {
    fn new(bill_id: String, generation: u64) -> Self {
        Self {
            bill_id,
            tab: DetailTab::default(),
            overview_tab: OverviewTab::default(),
            vote: UserVote::None,
            chat: ChatThread::new(),
            generation,
        }
    }

    pub fn vote(&self) -> UserVote {
        self.vote
    }

    pub fn chat(&self) -> &ChatThread {
        &self.chat
    }
}

#[derive(Debug, Clone)]
pub struct BrowserSession {
    catalog: BillCatalog,
    selection: SelectionCache,
    year: YearFilter,
    sort: SortKey,
    search: SearchStatus,
    search_seq: u64,
    detail: Option<DetailView>,
    detail_seq: u64,
    language: String,
}

impl Default for BrowserSession {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl BrowserSession {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            catalog: BillCatalog::default(),
            selection: SelectionCache::new(),
            year: YearFilter::All,
            sort: SortKey::Recent,
            search: SearchStatus::NotSearched,
            search_seq: 0,
            detail: None,
            detail_seq: 0,
            language: language.into(),
        }
    }

    pub fn catalog(&self) -> &BillCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionCache {
        &self.selection
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn year(&self) -> YearFilter {
        self.year
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn is_searching(&self) -> bool {
        self.search == SearchStatus::Searching
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Change the analysis language. A different language re-fetches the selected bill's
    /// analysis, which also retries a failed one.
    pub fn set_language(&mut self, language: impl Into<String>) -> Option<AnalysisTicket> {
        let language = language.into();
        if language == self.language {
            return None;
        }
        self.language = language;
        let bill = self.selection.selected_id().and_then(|id| self.catalog.get(id))?;
        self.selection.refetch(bill)
    }

    pub fn selected_bill(&self) -> Option<&Bill> {
        self.selection.selected_id().and_then(|id| self.catalog.get(id))
    }

    pub fn analysis(&self) -> Option<&BillAnalysis> {
        self.selection.analysis()
    }

    pub fn display_list(&self) -> Vec<&Bill> {
        view::display_list(self.catalog.bills(), self.year, self.sort)
    }

    pub fn list_state(&self) -> ListState<'_> {
        match &self.search {
            SearchStatus::NotSearched => ListState::NotSearched,
            SearchStatus::Searching => ListState::Searching,
            SearchStatus::Failed(message) => ListState::SearchFailed(message),
            SearchStatus::Done if self.catalog.is_empty() => ListState::NoResults,
            SearchStatus::Done => {
                let list = self.display_list();
                if list.is_empty() {
                    ListState::FilteredOut
                } else {
                    ListState::Bills(list)
                }
            }
        }
    }

    /// Start a search. None when the query is blank or a search is already running.
    pub fn begin_search(&mut self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        if query.is_empty() || self.is_searching() {
            return None;
        }
        self.search_seq += 1;
        self.search = SearchStatus::Searching;
        log::debug!("session: search {:?} (request {})", query, self.search_seq);
        Some(SearchTicket {
            query: query.to_string(),
            seq: self.search_seq,
        })
    }

    /// Apply a finished search. The catalog is replaced (or cleared on failure), selection
    /// and the detail view reset, and the first listed bill is auto-selected; the returned
    /// ticket is that bill's analysis fetch.
    pub fn complete_search(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<Bill>, SearchError>,
    ) -> Option<AnalysisTicket> {
        if ticket.seq != self.search_seq {
            log::debug!("session: dropping stale search {:?}", ticket.query);
            return None;
        }
        self.selection.clear();
        self.detail = None;
        match result {
            Ok(bills) => {
                self.catalog.replace(bills);
                self.search = SearchStatus::Done;
            }
            Err(e) => {
                log::error!("session: search {:?} failed: {}", ticket.query, e);
                self.catalog.replace(Vec::new());
                self.search = SearchStatus::Failed(SEARCH_FAILED_MESSAGE.to_string());
            }
        }
        self.reconcile()
    }

    pub fn set_year_filter(&mut self, year: YearFilter) -> Option<AnalysisTicket> {
        self.year = year;
        self.reconcile()
    }

    pub fn set_sort(&mut self, sort: SortKey) -> Option<AnalysisTicket> {
        self.sort = sort;
        self.reconcile()
    }

    /// Select a bill by id. Re-selecting the current bill keeps its analysis and view state.
    pub fn select_bill(&mut self, bill_id: &str) -> Option<AnalysisTicket> {
        let bill = self.catalog.get(bill_id)?;
        let ticket = self.selection.select(bill)?;
        self.detail_seq += 1;
        self.detail = Some(DetailView::new(ticket.bill_id.clone(), self.detail_seq));
        Some(ticket)
    }

    /// Returns false when the ticket is stale and the result was dropped.
    pub fn complete_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        result: Result<BillAnalysis, AnalysisError>,
    ) -> bool {
        self.selection.apply(ticket, result)
    }

    pub fn set_tab(&mut self, tab: DetailTab) {
        if let Some(detail) = self.detail.as_mut() {
            detail.tab = tab;
        }
    }

    pub fn set_overview_tab(&mut self, tab: OverviewTab) {
        if let Some(detail) = self.detail.as_mut() {
            detail.overview_tab = tab;
        }
    }

    /// Click on a vote button. Clicking the current choice retracts it.
    pub fn cast_vote(&mut self, clicked: UserVote) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        let previous = detail.vote;
        let next = previous.toggled(clicked);
        detail.vote = next;
        self.catalog.adjust_vote(&detail.bill_id, previous, next);
    }

    /// Submit a discussion message for the selected bill.
    pub fn begin_chat(&mut self, text: &str) -> Option<ChatTicket> {
        let detail = self.detail.as_mut()?;
        let bill_title = self.catalog.get(&detail.bill_id)?.title.clone();
        let thread = detail.chat.begin_submit(text)?;
        Some(ChatTicket {
            bill_title,
            thread,
            view: detail.generation,
        })
    }

    /// Append a finished turn. Returns false when the detail view was recreated meanwhile.
    pub fn complete_chat(&mut self, ticket: &ChatTicket, continuation: ChatContinuation) -> bool {
        match self.detail.as_mut() {
            Some(detail) if detail.generation == ticket.view => {
                detail.chat.complete(continuation.into_messages());
                true
            }
            _ => {
                log::debug!("session: dropping discussion reply for a closed view");
                false
            }
        }
    }

    /// Bring the selection in line with the current display list.
    fn reconcile(&mut self) -> Option<AnalysisTicket> {
        let target = {
            let list = self.display_list();
            view::reconcile_selection(&list, self.selection.selected_id()).map(|b| b.id.clone())
        };
        match target {
            Some(id) => self.select_bill(&id),
            None => {
                if self.selection.selected_id().is_some() {
                    self.selection.clear();
                    self.detail = None;
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ChatGenerationError;
    use crate::llm::GenerationError;
    use crate::model::{Author, BillStatus, MindMap, Viewpoints, VoteCount, ADMIN_DISPLAY_NAME};
    use crate::selection::AnalysisState;

    fn bill(id: &str, date: &str) -> Bill {
        Bill {
            id: id.to_string(),
            title: format!("Bill {}", id.to_uppercase()),
            summary: String::new(),
            category: "Economy".to_string(),
            status: BillStatus::Passed,
            date: date.to_string(),
            vote_count: VoteCount { for_votes: 10, against: 4 },
        }
    }

    fn abc() -> Vec<Bill> {
        vec![
            bill("a", "Passed on Mar 1, 2020"),
            bill("b", "Passed on Jun 1, 2021"),
            bill("c", "Passed on Jan 1, 2020"),
        ]
    }

    fn analysis(explanation: &str) -> BillAnalysis {
        BillAnalysis {
            explanation: explanation.to_string(),
            viewpoints: Viewpoints {
                pro: String::new(),
                con: String::new(),
                neutral: String::new(),
            },
            impact: vec![],
            debate: vec![],
            media: vec![],
            flashcards: vec![],
            mind_map: MindMap {
                central_topic: String::new(),
                branches: vec![],
            },
        }
    }

    fn searched(bills: Vec<Bill>) -> (BrowserSession, Option<AnalysisTicket>) {
        let mut session = BrowserSession::default();
        let ticket = session.begin_search("economy").unwrap();
        let analysis = session.complete_search(&ticket, Ok(bills));
        (session, analysis)
    }

    #[test]
    fn search_selects_first_listed_bill() {
        let (session, ticket) = searched(abc());
        let ticket = ticket.unwrap();
        assert_eq!(ticket.bill_id, "b");
        assert_eq!(ticket.title, "Bill B");
        assert_eq!(session.selected_bill().map(|b| b.id.as_str()), Some("b"));
        assert!(session.selection().is_loading());
    }

    #[test]
    fn filter_change_moves_selection_to_first_remaining() {
        let (mut session, _) = searched(abc());
        let ticket = session.set_year_filter(YearFilter::Year(2020)).unwrap();
        assert_eq!(ticket.bill_id, "a");
        assert_eq!(session.selection().selected_id(), Some("a"));
        match session.list_state() {
            ListState::Bills(list) => {
                assert_eq!(list.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(), ["a", "c"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sort_change_keeps_a_listed_selection() {
        let (mut session, _) = searched(abc());
        assert!(session.set_sort(SortKey::Oldest).is_none());
        assert_eq!(session.selection().selected_id(), Some("b"));
    }

    #[test]
    fn filtering_everything_out_clears_selection() {
        let (mut session, _) = searched(abc());
        assert!(session.set_year_filter(YearFilter::Year(1999)).is_none());
        assert!(session.selection().selected_id().is_none());
        assert!(session.detail().is_none());
        assert_eq!(session.list_state(), ListState::FilteredOut);
    }

    #[test]
    fn empty_states_are_distinct() {
        let session = BrowserSession::default();
        assert_eq!(session.list_state(), ListState::NotSearched);

        let (session, ticket) = searched(vec![]);
        assert!(ticket.is_none());
        assert_eq!(session.list_state(), ListState::NoResults);
        assert!(session.selection().selected_id().is_none());

        let mut session = BrowserSession::default();
        let ticket = session.begin_search("environment").unwrap();
        assert_eq!(session.list_state(), ListState::Searching);
        session.complete_search(&ticket, Err(SearchError::EmptyQuery));
        assert_eq!(session.list_state(), ListState::SearchFailed(SEARCH_FAILED_MESSAGE));
        assert!(session.catalog().is_empty());
    }

    #[test]
    fn failed_search_clears_previous_catalog() {
        let (mut session, _) = searched(abc());
        let ticket = session.begin_search("again").unwrap();
        session.complete_search(&ticket, Err(SearchError::Generation(GenerationError::EmptyResponse)));
        assert!(session.catalog().is_empty());
        assert!(session.selected_bill().is_none());
    }

    #[test]
    fn one_search_at_a_time() {
        let mut session = BrowserSession::default();
        assert!(session.begin_search("  ").is_none());
        let first = session.begin_search("one").unwrap();
        assert!(session.begin_search("two").is_none());
        session.complete_search(&first, Ok(vec![]));
        assert!(session.begin_search("two").is_some());
    }

    #[test]
    fn stale_analysis_is_not_shown_for_new_selection() {
        let (mut session, a_ticket) = searched(abc());
        let b_ticket = a_ticket.unwrap();
        let a_ticket = session.select_bill("a").unwrap();
        assert!(!session.complete_analysis(&b_ticket, Ok(analysis("about B"))));
        assert!(session.analysis().is_none());
        assert!(session.complete_analysis(&a_ticket, Ok(analysis("about A"))));
        assert_eq!(session.analysis().unwrap().explanation, "about A");
    }

    #[test]
    fn analysis_failure_keeps_selection() {
        let (mut session, ticket) = searched(abc());
        session.complete_analysis(&ticket.unwrap(), Err(AnalysisError::EmptyTitle));
        assert!(matches!(session.selection().state(), AnalysisState::Failed(_)));
        assert_eq!(session.selection().selected_id(), Some("b"));
    }

    #[test]
    fn reselecting_keeps_tabs_and_votes() {
        let (mut session, _) = searched(abc());
        session.set_tab(DetailTab::Impact);
        session.cast_vote(UserVote::For);
        assert!(session.select_bill("b").is_none());
        let detail = session.detail().unwrap();
        assert_eq!(detail.tab, DetailTab::Impact);
        assert_eq!(detail.vote(), UserVote::For);

        session.select_bill("a").unwrap();
        let detail = session.detail().unwrap();
        assert_eq!(detail.tab, DetailTab::Overview);
        assert_eq!(detail.vote(), UserVote::None);
    }

    #[test]
    fn votes_toggle_and_adjust_the_tally() {
        let (mut session, _) = searched(abc());
        let tally = |s: &BrowserSession| s.selected_bill().unwrap().vote_count;

        session.cast_vote(UserVote::For);
        assert_eq!(tally(&session), VoteCount { for_votes: 11, against: 4 });
        session.cast_vote(UserVote::Against);
        assert_eq!(tally(&session), VoteCount { for_votes: 10, against: 5 });
        session.cast_vote(UserVote::Against);
        assert_eq!(tally(&session), VoteCount { for_votes: 10, against: 4 });
        assert_eq!(session.detail().unwrap().vote(), UserVote::None);
        session.cast_vote(UserVote::Abstain);
        assert_eq!(tally(&session), VoteCount { for_votes: 10, against: 4 });
    }

    #[test]
    fn chat_turn_appends_replies() {
        let (mut session, _) = searched(abc());
        assert!(session.begin_chat("   ").is_none());
        let ticket = session.begin_chat("Is this good for MSMEs?").unwrap();
        assert_eq!(ticket.bill_title, "Bill B");
        assert_eq!(ticket.thread.len(), 3);
        assert!(session.begin_chat("second").is_none());

        let reply = ChatMessage::ai(0, "Neha G.", "Mixed bag.");
        assert!(session.complete_chat(&ticket, ChatContinuation::Replies(vec![reply])));
        let chat = session.detail().unwrap().chat();
        assert_eq!(chat.len(), 4);
        assert_eq!(chat.messages()[3].author, Author::Ai);
        assert!(!chat.in_flight());
    }

    #[test]
    fn degraded_turn_appends_admin_message() {
        let (mut session, _) = searched(abc());
        let ticket = session.begin_chat("hello").unwrap();
        let degraded = ChatContinuation::Degraded {
            message: ChatMessage::ai(99, ADMIN_DISPLAY_NAME, "Sorry"),
            error: ChatGenerationError::NoUsableReplies,
        };
        assert!(session.complete_chat(&ticket, degraded));
        let last = session.detail().unwrap().chat().messages().last().cloned().unwrap();
        assert_eq!(last.name, ADMIN_DISPLAY_NAME);
    }

    #[test]
    fn language_change_refetches_selected_analysis() {
        let (mut session, ticket) = searched(abc());
        let first = ticket.unwrap();
        session.complete_analysis(&first, Err(AnalysisError::EmptyTitle));
        assert!(matches!(session.selection().state(), AnalysisState::Failed(_)));

        assert!(session.set_language("English").is_none());
        let retry = session.set_language("Hindi").unwrap();
        assert_eq!(retry.bill_id, "b");
        assert_eq!(session.language(), "Hindi");
        assert!(session.selection().is_loading());
        assert!(!session.complete_analysis(&first, Ok(analysis("stale"))));
        assert!(session.complete_analysis(&retry, Ok(analysis("in Hindi"))));
        assert_eq!(session.analysis().unwrap().explanation, "in Hindi");
    }

    #[test]
    fn language_change_without_selection_fetches_nothing() {
        let mut session = BrowserSession::default();
        assert!(session.set_language("Tamil").is_none());
        assert_eq!(session.language(), "Tamil");
    }

    #[test]
    fn chat_reply_after_bill_change_is_dropped() {
        let (mut session, _) = searched(abc());
        let ticket = session.begin_chat("hello").unwrap();
        session.select_bill("a");
        let reply = ChatMessage::ai(0, "Neha G.", "late");
        assert!(!session.complete_chat(&ticket, ChatContinuation::Replies(vec![reply])));
        assert_eq!(session.detail().unwrap().chat().len(), 2);
    }
}
