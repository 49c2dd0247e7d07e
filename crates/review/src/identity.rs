use std::collections::HashMap;

use tracing::warn;

use crate::model::{Participant, UserId};

/// Label substituted for ids that are not on the roster.
pub const NOT_FOUND_LABEL: &str = "User Not Found";

/// Roster keyed by participant id. The first entry for a repeated id wins.
#[derive(Debug)]
pub struct Roster<'a> {
    participants: Vec<&'a Participant>,
    by_id: HashMap<UserId, usize>,
}

impl<'a> Roster<'a> {
    pub fn new(entries: &'a [Participant]) -> Self {
        let mut participants = Vec::with_capacity(entries.len());
        let mut by_id = HashMap::with_capacity(entries.len());
        for participant in entries {
            if by_id.contains_key(&participant.id) {
                warn!(id = participant.id, "duplicate roster id; keeping first entry");
                continue;
            }
            by_id.insert(participant.id, participants.len());
            participants.push(participant);
        }
        Self { participants, by_id }
    }

    /// Participants in roster order, duplicates removed.
    pub fn participants(&self) -> &[&'a Participant] {
        &self.participants
    }

    pub fn get(&self, id: UserId) -> Option<&'a Participant> {
        self.by_id.get(&id).map(|&i| self.participants[i])
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Maps ids to display names, degrading to a sentinel label instead of failing.
pub struct IdentityResolver<'r> {
    roster: &'r Roster<'r>,
    not_found_label: &'r str,
}

impl<'r> IdentityResolver<'r> {
    pub fn new(roster: &'r Roster<'r>, not_found_label: &'r str) -> Self {
        Self {
            roster,
            not_found_label,
        }
    }

    pub fn resolve(&self, id: UserId) -> &'r str {
        match self.roster.get(id) {
            Some(p) => p.display_name.as_str(),
            None => self.not_found_label,
        }
    }

    pub fn is_known(&self, id: UserId) -> bool {
        self.roster.get(id).is_some()
    }
}
