//! Coordinator configuration.

/// Settings for a [`SessionCoordinator`](crate::SessionCoordinator).
///
/// The defaults match what clients expect: six-character room codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Length of generated room codes.
    pub code_length: usize,

    /// How many fresh codes to try before giving up on `create`.
    /// Collisions are astronomically rare at six characters; this only
    /// bounds the loop.
    pub max_code_attempts: u32,

    /// Seed for role shuffles and room codes. `None` seeds from the OS.
    /// Set it to replay a game deterministically.
    pub seed: Option<u64>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_code_attempts: 32,
            seed: None,
        }
    }
}
