//! The role deck.

use mafia_protocol::Role;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::room::ParticipantId;

/// The six cards every game is dealt from.
pub const DECK: [Role; 6] = [
    Role::Mafia,
    Role::Mafia,
    Role::Sheriff,
    Role::Doctor,
    Role::Villager,
    Role::Villager,
];

/// Shuffles [`DECK`] and deals it to players in join order.
///
/// The deck is shuffled once per game. Player `i` gets card `i mod 6`:
/// with fewer than six players the trailing cards go unused, and with
/// more than six the same shuffled order repeats (it is *not* reshuffled
/// for the second lap, so a seventh player always mirrors the first).
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleDeck;

impl RoleDeck {
    pub fn new() -> Self {
        Self
    }

    /// Returns a uniformly shuffled copy of the deck.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Role> {
        let mut cards = DECK.to_vec();
        cards.shuffle(rng);
        cards
    }

    /// Shuffles and deals, one role per player, in the players' order.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        players: &[ParticipantId],
        rng: &mut R,
    ) -> Vec<(ParticipantId, Role)> {
        let cards = self.shuffled(rng);
        deal(&cards, players)
    }
}

/// Deals `cards` cyclically: `players[i]` gets `cards[i % cards.len()]`.
fn deal(cards: &[Role], players: &[ParticipantId]) -> Vec<(ParticipantId, Role)> {
    if cards.is_empty() {
        return Vec::new();
    }
    players
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, cards[i % cards.len()]))
        .collect()
}
