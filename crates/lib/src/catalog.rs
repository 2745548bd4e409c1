//! Bills from the latest search, with client-local vote tallies.
//!
//! Tallies here are a display projection only; nothing is sent upstream.

use crate::model::{Bill, UserVote};

#[derive(Debug, Clone, Default)]
pub struct BillCatalog {
    bills: Vec<Bill>,
}

impl BillCatalog {
    pub fn new(bills: Vec<Bill>) -> Self {
        Self { bills }
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn get(&self, id: &str) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id == id)
    }

    /// Wholesale replacement after a search. Selection and analysis are reset by the owning
    /// session (see `BrowserSession`), which is the only caller outside tests.
    pub fn replace(&mut self, bills: Vec<Bill>) {
        self.bills = bills;
    }

    /// Move one bill's tally from `previous` to `new`. Only For/Against count; counters floor
    /// at zero; identical choices and unknown ids are no-ops. Returns true if a tally changed.
    pub fn adjust_vote(&mut self, bill_id: &str, previous: UserVote, new: UserVote) -> bool {
        if previous == new {
            return false;
        }
        let Some(bill) = self.bills.iter_mut().find(|b| b.id == bill_id) else {
            log::debug!("catalog: vote for unknown bill {}", bill_id);
            return false;
        };
        let before = bill.vote_count;
        let tally = &mut bill.vote_count;
        match previous {
            UserVote::For => tally.for_votes = tally.for_votes.saturating_sub(1),
            UserVote::Against => tally.against = tally.against.saturating_sub(1),
            UserVote::Abstain | UserVote::None => {}
        }
        match new {
            UserVote::For => tally.for_votes = tally.for_votes.saturating_add(1),
            UserVote::Against => tally.against = tally.against.saturating_add(1),
            UserVote::Abstain | UserVote::None => {}
        }
        *tally != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BillStatus, VoteCount};

    fn bill(id: &str, for_votes: u64, against: u64) -> Bill {
        Bill {
            id: id.to_string(),
            title: format!("Bill {id}"),
            summary: String::new(),
            category: "Economy".to_string(),
            status: BillStatus::Announced,
            date: "Announced on Mar 3, 2021".to_string(),
            vote_count: VoteCount { for_votes, against },
        }
    }

    const CHOICES: [UserVote; 4] = [UserVote::None, UserVote::For, UserVote::Against, UserVote::Abstain];

    #[test]
    fn switching_vote_moves_one_count() {
        let mut catalog = BillCatalog::new(vec![bill("a", 10, 5)]);
        catalog.adjust_vote("a", UserVote::None, UserVote::For);
        assert_eq!(catalog.get("a").unwrap().vote_count, VoteCount { for_votes: 11, against: 5 });
        catalog.adjust_vote("a", UserVote::For, UserVote::Against);
        assert_eq!(catalog.get("a").unwrap().vote_count, VoteCount { for_votes: 10, against: 6 });
        catalog.adjust_vote("a", UserVote::Against, UserVote::Abstain);
        assert_eq!(catalog.get("a").unwrap().vote_count, VoteCount { for_votes: 10, against: 5 });
    }

    #[test]
    fn counters_never_go_negative() {
        let mut catalog = BillCatalog::new(vec![bill("a", 0, 0)]);
        catalog.adjust_vote("a", UserVote::For, UserVote::None);
        catalog.adjust_vote("a", UserVote::Against, UserVote::Abstain);
        assert_eq!(catalog.get("a").unwrap().vote_count, VoteCount::default());
    }

    #[test]
    fn identical_choice_is_idempotent() {
        for v in CHOICES {
            let mut catalog = BillCatalog::new(vec![bill("a", 0, 3)]);
            for _ in 0..3 {
                assert!(!catalog.adjust_vote("a", v, v));
            }
            assert_eq!(catalog.get("a").unwrap().vote_count, VoteCount { for_votes: 0, against: 3 });
        }
    }

    #[test]
    fn each_call_changes_counters_by_at_most_one() {
        let mut catalog = BillCatalog::new(vec![bill("a", 1, 1)]);
        for prev in CHOICES {
            for new in CHOICES {
                let before = catalog.get("a").unwrap().vote_count;
                catalog.adjust_vote("a", prev, new);
                let after = catalog.get("a").unwrap().vote_count;
                assert!(before.for_votes.abs_diff(after.for_votes) <= 1);
                assert!(before.against.abs_diff(after.against) <= 1);
                if !matches!(prev, UserVote::For) && !matches!(new, UserVote::For) {
                    assert_eq!(before.for_votes, after.for_votes);
                }
                if !matches!(prev, UserVote::Against) && !matches!(new, UserVote::Against) {
                    assert_eq!(before.against, after.against);
                }
            }
        }
    }

    #[test]
    fn unknown_bill_is_a_no_op() {
        let mut catalog = BillCatalog::new(vec![bill("a", 2, 2)]);
        assert!(!catalog.adjust_vote("zzz", UserVote::None, UserVote::For));
        assert_eq!(catalog.get("a").unwrap().vote_count, VoteCount { for_votes: 2, against: 2 });
    }
}
