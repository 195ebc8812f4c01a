//! Per-phase action collection.
//!
//! Night and day work the same way: each eligible player submits one
//! target, later submissions overwrite earlier ones, and once every
//! eligible player has submitted the phase resolves to (at most) one
//! victim. [`ActionAggregator`] implements that once; an
//! [`AggregationPolicy`] says who may submit and how the outcome is picked.

use std::collections::HashMap;
use std::marker::PhantomData;

use mafia_protocol::{Phase, Role};

use crate::room::{ParticipantId, Player};

/// One player's pick for the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub from: ParticipantId,
    pub target: ParticipantId,
}

/// What varies between the night and day instantiations.
pub trait AggregationPolicy {
    /// The phase this aggregator collects for.
    const PHASE: Phase;

    /// Whether `player` (holding `role`) may submit in this phase.
    fn is_eligible(player: &Player, role: Option<Role>) -> bool;

    /// Picks the outcome from the submissions, in recording order.
    /// Default: [`plurality`].
    fn resolve(submissions: &[Submission]) -> Option<ParticipantId> {
        plurality(submissions)
    }
}

/// Night kills: living Mafia pick a victim; the most-picked target dies,
/// ties going to whichever target was picked first.
#[derive(Debug, Clone, Copy, Default)]
pub struct NightKill;

impl AggregationPolicy for NightKill {
    const PHASE: Phase = Phase::Night;

    fn is_eligible(player: &Player, role: Option<Role>) -> bool {
        player.alive && role == Some(Role::Mafia)
    }
}

/// Day votes: every living player votes; the most-voted target is
/// eliminated, ties going to whichever target was voted for first.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayVote;

impl AggregationPolicy for DayVote {
    const PHASE: Phase = Phase::Day;

    fn is_eligible(player: &Player, _role: Option<Role>) -> bool {
        player.alive
    }
}

/// Tallies targets and returns the one with the strictly highest count.
///
/// Targets are ranked in the order they first appear. A later target
/// with an equal count never displaces the current leader, so
/// `[A, B]` resolves to `A` and `[B, A]` to `B`. Returns `None` when
/// there are no submissions.
pub fn plurality(submissions: &[Submission]) -> Option<ParticipantId> {
    let mut tally: Vec<(ParticipantId, usize)> = Vec::new();
    for submission in submissions {
        match tally.iter_mut().find(|(target, _)| *target == submission.target) {
            Some((_, count)) => *count += 1,
            None => tally.push((submission.target, 1)),
        }
    }

    let mut leader = None;
    let mut best = 0;
    for (target, count) in tally {
        if count > best {
            best = count;
            leader = Some(target);
        }
    }
    leader
}

// ---------------------------------------------------------------------------
// ActionAggregator
// ---------------------------------------------------------------------------

/// Collects at most one submission per participant for one phase.
///
/// Submissions keep the position of a participant's *first* submission
/// even when overwritten, which is what makes the [`plurality`]
/// tie-break depend on who spoke first rather than who spoke last.
#[derive(Debug, Clone)]
pub struct ActionAggregator<P> {
    submissions: Vec<Submission>,
    policy: PhantomData<P>,
}

impl<P> Default for ActionAggregator<P> {
    fn default() -> Self {
        Self {
            submissions: Vec::new(),
            policy: PhantomData,
        }
    }
}

impl<P: AggregationPolicy> ActionAggregator<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `from`'s pick, replacing any earlier pick from them.
    pub fn submit(&mut self, from: ParticipantId, target: ParticipantId) {
        match self.submissions.iter_mut().find(|s| s.from == from) {
            Some(existing) => existing.target = target,
            None => self.submissions.push(Submission { from, target }),
        }
    }

    /// Forgets a participant who left the room: their own pick, and every
    /// pick that named them. Those voters are still eligible and must pick
    /// again before the phase can complete.
    pub fn withdraw(&mut self, participant: ParticipantId) {
        self.submissions
            .retain(|s| s.from != participant && s.target != participant);
    }

    /// How many players may submit right now.
    pub fn eligible_count(players: &[Player], roles: &HashMap<ParticipantId, Role>) -> usize {
        players
            .iter()
            .filter(|p| P::is_eligible(p, roles.get(&p.id).copied()))
            .count()
    }

    /// `true` once every currently eligible player has a submission on
    /// record.
    ///
    /// Only submissions from players who are *still* eligible count, so
    /// the submitted side can never exceed the eligible side. With no
    /// eligible players this is `true` even when nothing was submitted.
    pub fn is_complete(&self, players: &[Player], roles: &HashMap<ParticipantId, Role>) -> bool {
        let submitted = self
            .submissions
            .iter()
            .filter(|s| {
                players
                    .iter()
                    .find(|p| p.id == s.from)
                    .is_some_and(|p| P::is_eligible(p, roles.get(&p.id).copied()))
            })
            .count();
        submitted >= Self::eligible_count(players, roles)
    }

    /// The current outcome under this aggregator's policy.
    pub fn resolve(&self) -> Option<ParticipantId> {
        P::resolve(&self.submissions)
    }

    /// Empties the aggregator, returning what it held in recording order.
    pub fn drain(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.submissions)
    }

    pub fn clear(&mut self) {
        self.submissions.clear();
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}
