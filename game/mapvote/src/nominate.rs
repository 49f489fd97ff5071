use std::collections::HashSet;

use layers::{catalog::LayerCatalog, layer::LayerInfo};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use vote_interface::errors::VoteError;

/// One slate entry of a running vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    pub layer_id: String,
    /// player-facing name, underscores and version suffix removed
    pub display_name: String,
    /// short `USA-RUS` style faction pairing label
    pub faction_label: String,
}

impl Nomination {
    pub fn from_layer(layer: &LayerInfo) -> Self {
        Self {
            layer_id: layer.id.clone(),
            display_name: layer.display_name(),
            faction_label: layer.faction_label(),
        }
    }
}

/// Filter rules for building a default slate.
#[derive(Debug, Clone)]
pub struct SlateConstraints {
    /// map names that must not appear (current map + recent rounds),
    /// lower-cased
    pub excluded_map_names: HashSet<String>,
    pub allowed_modes: Vec<String>,
    pub blacklist_prefixes: Vec<String>,
    pub primary_mode: String,
    /// minimum number of primary-mode entries per accepted slate
    pub min_primary: usize,
    pub slate_size: usize,
    /// how often the whole draw may be redone to satisfy `min_primary`
    pub retry_cap: usize,
}

impl SlateConstraints {
    fn mode_allowed(&self, layer: &LayerInfo) -> bool {
        self.allowed_modes.iter().any(|mode| layer.is_mode(mode))
    }
}

/// Draws a slate of distinct layers for a regular vote.
///
/// The draw is uniform without replacement over the filtered pool and
/// redone (up to `retry_cap` times) while it carries fewer than
/// `min_primary` primary-mode layers. Pools smaller than the slate
/// size degrade to one nomination per eligible layer in random order.
pub fn build_default_slate<R: Rng>(
    catalog: &LayerCatalog,
    constraints: &SlateConstraints,
    rng: &mut R,
) -> Result<Vec<Nomination>, VoteError> {
    let pool: Vec<&LayerInfo> = catalog
        .all()
        .iter()
        .filter(|layer| {
            constraints.mode_allowed(layer)
                && !constraints
                    .excluded_map_names
                    .contains(&layer.map_name.to_ascii_lowercase())
                && !layer.has_blacklisted_prefix(&constraints.blacklist_prefixes)
        })
        .collect();

    if pool.is_empty() {
        return Err(VoteError::InsufficientCandidates);
    }

    let want = constraints.slate_size.min(pool.len());
    if want < constraints.slate_size {
        log::warn!(
            "only {} of {} wanted layers eligible, degrading the slate",
            pool.len(),
            constraints.slate_size
        );
    }

    let mut picks = draw_distinct(&pool, want, rng);

    let primary_in_pool = pool
        .iter()
        .filter(|layer| layer.is_mode(&constraints.primary_mode))
        .count();
    if want == constraints.slate_size && primary_in_pool >= constraints.min_primary {
        let mut tries = 0;
        while count_primary(&picks, &constraints.primary_mode) < constraints.min_primary {
            if tries >= constraints.retry_cap {
                log::warn!(
                    "keeping a slate with only {} {} layers after {} draws",
                    count_primary(&picks, &constraints.primary_mode),
                    constraints.primary_mode,
                    tries
                );
                break;
            }
            picks = draw_distinct(&pool, want, rng);
            tries += 1;
        }
    }

    Ok(picks.iter().map(|layer| Nomination::from_layer(layer)).collect())
}

/// Builds a slate from explicitly requested tokens of the shape
/// `map[_mode[_version]]`.
///
/// A single `*` map token expands to a whole slate of wildcards. A
/// token whose filter matches nothing (or only already drawn layers)
/// is skipped; only a fully empty result is an error.
pub fn build_requested_slate<R: Rng>(
    catalog: &LayerCatalog,
    tokens: &[String],
    constraints: &SlateConstraints,
    rng: &mut R,
) -> Result<Vec<Nomination>, VoteError> {
    let mut tokens: Vec<String> = tokens.iter().map(|t| t.to_ascii_lowercase()).collect();
    if tokens.len() == 1 && tokens[0].split('_').next() == Some("*") {
        while tokens.len() < constraints.slate_size {
            let again = tokens[0].clone();
            tokens.push(again);
        }
    }
    if tokens.len() > constraints.slate_size {
        return Err(VoteError::TooManyRequests {
            given: tokens.len(),
            max: constraints.slate_size,
        });
    }

    let mut picked: Vec<&LayerInfo> = Vec::new();
    for token in &tokens {
        let request = RequestToken::parse(token);
        let matches: Vec<&LayerInfo> = catalog
            .all()
            .iter()
            .filter(|layer| {
                request.matches(layer, constraints)
                    && !picked.iter().any(|p| p.id == layer.id)
            })
            .collect();
        match matches.choose(rng).copied() {
            Some(layer) => picked.push(layer),
            None => log::warn!("no eligible layer for requested token `{token}`, skipped"),
        }
    }

    if picked.is_empty() {
        return Err(VoteError::InsufficientCandidates);
    }
    Ok(picked
        .iter()
        .map(|layer| Nomination::from_layer(layer))
        .collect())
}

struct RequestToken<'a> {
    map: &'a str,
    mode: Option<&'a str>,
    version: Option<&'a str>,
}

impl<'a> RequestToken<'a> {
    fn parse(token: &'a str) -> Self {
        let mut parts = token.split('_');
        Self {
            map: parts.next().unwrap_or(""),
            mode: parts.next().filter(|p| !p.is_empty()),
            version: parts.next().filter(|p| !p.is_empty()),
        }
    }

    fn matches(&self, layer: &LayerInfo, constraints: &SlateConstraints) -> bool {
        let map_ok = self.map == "*"
            || layer
                .map_name
                .to_ascii_lowercase()
                .starts_with(self.map);
        let mode_ok = match self.mode {
            Some(mode) => layer.game_mode.to_ascii_lowercase().starts_with(mode),
            None => constraints.mode_allowed(layer),
        };
        let version_ok = match self.version {
            Some("*") | None => true,
            Some(version) => {
                // `3`, `v3` and `V3` all request version `v3`
                let want = format!("v{}", version.replace(['v', 'V'], ""));
                layer.version.to_ascii_lowercase().starts_with(&want)
            }
        };
        map_ok && mode_ok && version_ok
    }
}

fn draw_distinct<'a, R: Rng>(
    pool: &[&'a LayerInfo],
    n: usize,
    rng: &mut R,
) -> Vec<&'a LayerInfo> {
    pool.choose_multiple(rng, n).copied().collect()
}

fn count_primary(picks: &[&LayerInfo], primary_mode: &str) -> usize {
    picks.iter().filter(|layer| layer.is_mode(primary_mode)).count()
}
