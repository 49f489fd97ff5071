use layers::{catalog::LayerCatalog, layer::LayerInfo};
use rand::{seq::SliceRandom, Rng};
use vote_interface::config::ConfigMapVote;

/// A map-change request produced by a seeding check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedingAction {
    /// swap the running round over to the given seeding layer
    SetCurrentLayer(String),
    /// queue the given seeding layer as next
    SetNextLayer(String),
}

/// Low-population seeding heuristic.
///
/// Pure decision function over live facts; it only emits map-change
/// requests and never touches vote state. `round_transition` marks
/// the invocation that follows a new round, which is the only one
/// allowed to repoint the next layer.
pub fn seeding_actions<R: Rng>(
    config: &ConfigMapVote,
    catalog: &LayerCatalog,
    current_layer: &LayerInfo,
    next_layer: Option<&LayerInfo>,
    population: usize,
    round_transition: bool,
    rng: &mut R,
) -> Vec<SeedingAction> {
    if !config.automatic_seeding_mode || current_layer.is_mode(&config.seed_mode) {
        return Vec::new();
    }

    let pool: Vec<&LayerInfo> = catalog
        .all()
        .iter()
        .filter(|layer| {
            layer.is_mode(&config.seed_mode)
                && layer.id != current_layer.id
                && !layer.has_blacklisted_prefix(&config.layer_blacklist_prefixes)
        })
        .collect();
    if pool.is_empty() {
        log::warn!("seeding wanted but no eligible {} layers", config.seed_mode);
        return Vec::new();
    }

    let mut actions = Vec::new();

    if population >= 1
        && population < config.seeding_pop_upper_bound
        && population <= config.seeding_instant_threshold
    {
        if let Some(layer) = pool.choose(rng) {
            actions.push(SeedingAction::SetCurrentLayer(layer.id.clone()));
        }
    }

    if round_transition && population < config.seeding_next_map_threshold {
        let next_is_seed = next_layer
            .map(|layer| layer.is_mode(&config.seed_mode))
            .unwrap_or(false);
        if !next_is_seed {
            // drawn independently of the instant swap, the two may
            // coincide
            if let Some(layer) = pool.choose(rng) {
                actions.push(SeedingAction::SetNextLayer(layer.id.clone()));
            }
        }
    }

    actions
}
