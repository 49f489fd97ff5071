use std::collections::HashSet;

use hashlink::LinkedHashMap;
use vote_interface::{errors::VoteError, events::PlayerId};

use crate::nominate::Nomination;

/// Confirmation data for a successfully counted ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    pub display_name: String,
    pub faction_label: String,
    /// tally of the chosen entry after this ballot
    pub votes: u32,
}

/// The one live vote: slate, per-voter choices and per-entry tallies.
///
/// Invariant: the tally sum equals the number of voters holding an
/// active ballot; changing a vote moves exactly one tally unit.
#[derive(Debug, Default)]
pub struct VoteSession {
    nominations: Vec<Nomination>,
    tallies: Vec<u32>,
    votes: LinkedHashMap<PlayerId, usize>,
    enabled: bool,
    first_broadcast_done: bool,
}

impl VoteSession {
    /// A fresh, enabled session over the given slate.
    pub fn start(slate: Vec<Nomination>) -> Self {
        Self {
            tallies: vec![0; slate.len()],
            nominations: slate,
            votes: LinkedHashMap::new(),
            enabled: true,
            first_broadcast_done: false,
        }
    }

    /// Stops accepting ballots but keeps slate and tallies visible,
    /// so result queries still answer after a cancel.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn nominations(&self) -> &[Nomination] {
        &self.nominations
    }

    pub fn tallies(&self) -> &[u32] {
        &self.tallies
    }

    /// Number of voters currently holding a ballot.
    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn first_broadcast_done(&self) -> bool {
        self.first_broadcast_done
    }

    pub fn mark_broadcast_done(&mut self) {
        self.first_broadcast_done = true;
    }

    /// Counts a ballot for the 1-based display choice.
    ///
    /// A repeated ballot from the same voter moves their vote: the old
    /// entry is decremented together with the new increment.
    pub fn cast_vote(
        &mut self,
        voter: &PlayerId,
        display_choice: i64,
    ) -> Result<VoteReceipt, VoteError> {
        if !self.enabled {
            return Err(VoteError::NoActiveSession);
        }
        if display_choice < 1 || display_choice as usize > self.nominations.len() {
            return Err(VoteError::InvalidChoice {
                choice: display_choice,
                max: self.nominations.len(),
            });
        }
        let position = (display_choice - 1) as usize;

        let previous = self.votes.insert(voter.clone(), position);
        self.tallies[position] += 1;
        if let Some(previous) = previous {
            self.tallies[previous] -= 1;
        }

        let nomination = &self.nominations[position];
        Ok(VoteReceipt {
            display_name: nomination.display_name.clone(),
            faction_label: nomination.faction_label.clone(),
            votes: self.tallies[position],
        })
    }

    /// Drops the ballots of every voter missing from the live roster.
    /// Returns how many ballots were removed.
    pub fn clear_disconnected(&mut self, roster: &HashSet<PlayerId>) -> usize {
        let gone: Vec<PlayerId> = self
            .votes
            .keys()
            .filter(|voter| !roster.contains(*voter))
            .cloned()
            .collect();
        for voter in &gone {
            if let Some(position) = self.votes.remove(voter) {
                self.tallies[position] -= 1;
            }
        }
        gone.len()
    }

    /// Every slate entry at the maximum tally, ties included.
    pub fn winners(&self) -> Vec<&Nomination> {
        let Some(max) = self.tallies.iter().max().copied() else {
            return Vec::new();
        };
        self.tallies
            .iter()
            .enumerate()
            .filter(|(_, tally)| **tally == max)
            .map(|(position, _)| &self.nominations[position])
            .collect()
    }

    /// Standings lines in display order, `3➤ Gorodok RAAS USA-RUS (2)`
    /// style. Counts are omitted for the fresh-ballot framing of the
    /// first broadcast.
    pub fn choice_lines(&self, with_counts: bool) -> Vec<String> {
        self.nominations
            .iter()
            .zip(self.tallies.iter())
            .enumerate()
            .map(|(position, (nomination, tally))| {
                let mut line = format!(
                    "{}\u{27a4} {} {} ",
                    position + 1,
                    nomination.display_name,
                    nomination.faction_label
                );
                if with_counts {
                    line.push_str(&format!("({tally})"));
                }
                line
            })
            .collect()
    }
}
