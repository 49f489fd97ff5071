use serde::{Deserialize, Serialize};

/// All tunables of the map vote service.
///
/// Every field has a default matching the behavior the service shipped
/// with, so a config file only needs to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigMapVote {
    /// Chat prefix that addresses the vote service, e.g. `!vote`.
    /// A bare number in chat always counts as a ballot.
    pub command_prefix: String,
    /// Number of players needed on the server for a vote to start
    /// without being forced.
    pub min_players_for_vote: usize,
    /// Minutes from the start of a round to the automatic start of the
    /// next map vote.
    pub wait_time_from_round_start_mins: u64,
    /// Interval in minutes between standings broadcasts while a vote
    /// is running.
    pub broadcast_interval_mins: u64,
    /// Seconds after a round transition before the old session is
    /// cleared and the seeding check runs.
    pub settle_delay_secs: u64,

    /// Game modes eligible for a default vote slate.
    pub allowed_modes: Vec<String>,
    /// The rotation mode the slate is biased towards.
    pub primary_mode: String,
    /// Minimum number of primary-mode entries a default slate must
    /// carry before it is accepted.
    pub min_primary_nominations: usize,
    /// Number of choices offered per vote. Also the cap on explicitly
    /// requested slates.
    pub slate_size: usize,
    /// How often a default slate draw may be redone to satisfy the
    /// primary-mode minimum before the last draw is kept.
    pub sampler_retry_cap: usize,
    /// How many recently played map names are excluded from a default
    /// slate, on top of the current map.
    pub recent_map_lookback: usize,
    /// Layer-id prefixes never offered or seeded, case-insensitive.
    pub layer_blacklist_prefixes: Vec<String>,

    /// Whether the low-population seeding heuristic runs at all.
    pub automatic_seeding_mode: bool,
    /// Game mode tag of seeding layers.
    pub seed_mode: String,
    /// Population below which the server counts as seeding.
    pub seeding_pop_upper_bound: usize,
    /// Population at or below which the running round is swapped to a
    /// seeding layer immediately.
    pub seeding_instant_threshold: usize,
    /// Population below which a round transition points the next layer
    /// at a seeding layer.
    pub seeding_next_map_threshold: usize,
}

impl Default for ConfigMapVote {
    fn default() -> Self {
        Self {
            command_prefix: "!vote".to_string(),
            min_players_for_vote: 40,
            wait_time_from_round_start_mins: 15,
            broadcast_interval_mins: 7,
            settle_delay_secs: 30,

            allowed_modes: vec![
                "RAAS".to_string(),
                "AAS".to_string(),
                "INVASION".to_string(),
            ],
            primary_mode: "RAAS".to_string(),
            min_primary_nominations: 3,
            slate_size: 6,
            sampler_retry_cap: 16,
            recent_map_lookback: 4,
            layer_blacklist_prefixes: vec!["BlackCoast".to_string()],

            automatic_seeding_mode: true,
            seed_mode: "SEED".to_string(),
            seeding_pop_upper_bound: 40,
            seeding_instant_threshold: 5,
            seeding_next_map_threshold: 20,
        }
    }
}

impl ConfigMapVote {
    pub fn broadcast_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.broadcast_interval_mins * 60)
    }

    pub fn wait_time_from_round_start(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.wait_time_from_round_start_mins * 60)
    }

    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.settle_delay_secs)
    }
}
