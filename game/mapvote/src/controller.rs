use std::{collections::HashSet, sync::Arc, time::Duration};

use layers::{catalog::LayerCatalog, layer::LayerInfo};
use rand::{seq::SliceRandom, Rng};
use vote_interface::{
    channel::CommandChannelInterface,
    config::ConfigMapVote,
    errors::VoteError,
    events::{ChatEvent, PlayerId, ServerEvent},
    facts::ServerFactsInterface,
};

use crate::{
    chat::{parse_chat, VoteCmd},
    nominate::{build_default_slate, build_requested_slate, SlateConstraints},
    schedule::{Schedule, TaskKind},
    seeding::{seeding_actions, SeedingAction},
    session::VoteSession,
};

/// Lifecycle of the vote service between rounds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Idle,
    /// a start was requested below the population minimum; waiting
    /// for connects
    Deferred,
    Active,
}

/// Single owner of the vote lifecycle.
///
/// Consumes server events one at a time, owns the session, the RNG and
/// all delayed work. The host drives it with `handle_event` plus
/// `fire_due`/`next_deadline` for timers; nothing here blocks.
pub struct VoteController<R: Rng> {
    config: ConfigMapVote,
    catalog: Arc<LayerCatalog>,
    facts: Arc<dyn ServerFactsInterface>,
    channel: Arc<dyn CommandChannelInterface>,
    session: VoteSession,
    schedule: Schedule,
    state: ControllerState,
    rng: R,
}

impl<R: Rng> VoteController<R> {
    pub fn new(
        config: ConfigMapVote,
        catalog: Arc<LayerCatalog>,
        facts: Arc<dyn ServerFactsInterface>,
        channel: Arc<dyn CommandChannelInterface>,
        rng: R,
    ) -> Self {
        Self {
            config,
            catalog,
            facts,
            channel,
            session: VoteSession::default(),
            schedule: Schedule::default(),
            state: ControllerState::Idle,
            rng,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn session(&self) -> &VoteSession {
        &self.session
    }

    pub fn handle_event(&mut self, event: &ServerEvent, now: Duration) {
        match event {
            ServerEvent::RoundStarted { .. } => self.on_round_started(now),
            ServerEvent::PlayerConnected { .. } => self.on_player_connected(now),
            ServerEvent::PlayerDisconnected { .. } => self.on_player_disconnected(),
            ServerEvent::Chat(chat) => self.on_chat_message(chat, now),
        }
    }

    /// Earliest pending timer, for the host's sleep.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.schedule.next_deadline()
    }

    /// Runs every timer due at `now`.
    pub fn fire_due(&mut self, now: Duration) {
        for kind in self.schedule.fire_due(now) {
            match kind {
                TaskKind::DelayedStart => self.start_vote(false, &[], None, now),
                TaskKind::SettleCleanup => {
                    self.stop_vote();
                    self.session = VoteSession::default();
                    log::debug!("previous round's vote data cleared");
                }
                TaskKind::SeedingCheck => self.run_seeding(true),
                TaskKind::PeriodicBroadcast => {
                    self.broadcast_standings();
                    self.schedule.arm(
                        TaskKind::PeriodicBroadcast,
                        now + self.config.broadcast_interval(),
                    );
                }
            }
        }
    }

    /// Opens a new vote unless one is already running.
    ///
    /// Without `force`, a server below the population minimum defers
    /// the start until enough players connect. `requester` is notified
    /// of anything that keeps the vote from opening.
    pub fn start_vote(
        &mut self,
        force: bool,
        requests: &[String],
        requester: Option<&PlayerId>,
        now: Duration,
    ) {
        if self.state == ControllerState::Active {
            if let Some(requester) = requester {
                self.channel.notify(requester, "Voting is already enabled");
            }
            return;
        }

        let population = self.facts.population();
        if population < self.config.min_players_for_vote && !force {
            log::info!(
                "vote start deferred: {population}/{} players",
                self.config.min_players_for_vote
            );
            self.state = ControllerState::Deferred;
            return;
        }

        let constraints = self.default_constraints();
        let slate = if requests.is_empty() {
            build_default_slate(&self.catalog, &constraints, &mut self.rng)
        } else {
            build_requested_slate(&self.catalog, requests, &constraints, &mut self.rng)
        };

        match slate {
            Ok(slate) => {
                log::info!("vote opened with {} choices", slate.len());
                self.session = VoteSession::start(slate);
                self.state = ControllerState::Active;
                self.broadcast_standings();
                self.schedule.arm(
                    TaskKind::PeriodicBroadcast,
                    now + self.config.broadcast_interval(),
                );
            }
            Err(err) => {
                log::warn!("vote not opened: {err}");
                if let Some(requester) = requester {
                    self.channel.notify(requester, &err.to_string());
                }
            }
        }
    }

    /// Closes the running vote. The slate stays visible for result
    /// queries; only round cleanup and restarts rebuild it. Safe to
    /// call when nothing runs.
    pub fn stop_vote(&mut self) {
        self.session.disable();
        self.schedule.cancel(TaskKind::PeriodicBroadcast);
        if self.state != ControllerState::Idle {
            log::info!("vote closed");
        }
        self.state = ControllerState::Idle;
    }

    fn on_round_started(&mut self, now: Duration) {
        log::info!("new round, rescheduling vote lifecycle");
        self.schedule.clear();
        self.schedule
            .arm(TaskKind::SettleCleanup, now + self.config.settle_delay());
        self.schedule
            .arm(TaskKind::SeedingCheck, now + self.config.settle_delay());
        self.schedule.arm(
            TaskKind::DelayedStart,
            now + self.config.wait_time_from_round_start(),
        );
    }

    fn on_player_connected(&mut self, now: Duration) {
        if self.state == ControllerState::Deferred
            && self.facts.population() >= self.config.min_players_for_vote
        {
            log::info!("deferred vote can start now");
            self.start_vote(false, &[], None, now);
        }
        self.run_seeding(false);
    }

    fn on_player_disconnected(&mut self) {
        if self.session.is_enabled() {
            let roster: HashSet<PlayerId> = self.facts.player_roster().into_iter().collect();
            let removed = self.session.clear_disconnected(&roster);
            if removed > 0 {
                log::debug!("dropped {removed} ballots of disconnected players");
            }
            self.update_next_map();
        }
        self.run_seeding(false);
    }

    fn on_chat_message(&mut self, chat: &ChatEvent, now: Duration) {
        let Some(cmd) = parse_chat(&self.config.command_prefix, &chat.message) else {
            return;
        };
        log::debug!("{} ({}): {cmd:?}", chat.player_name, chat.player_id);

        match cmd {
            VoteCmd::Vote(choice) => match self.session.cast_vote(&chat.player_id, choice) {
                Ok(receipt) => {
                    self.channel.notify(
                        &chat.player_id,
                        &format!(
                            "Registered vote: {} {} ({} votes)",
                            receipt.display_name, receipt.faction_label, receipt.votes
                        ),
                    );
                    self.update_next_map();
                }
                Err(err) => self.channel.notify(&chat.player_id, &err.to_string()),
            },
            VoteCmd::Choices | VoteCmd::Results => {
                // a canceled vote keeps its slate visible until the
                // next round or restart rebuilds it
                if self.session.nominations().is_empty() {
                    self.channel
                        .notify(&chat.player_id, "There is no vote running right now");
                    return;
                }
                self.direct_standings(&chat.player_id);
            }
            VoteCmd::Start(requests) => {
                if !chat.auth.is_privileged() {
                    return;
                }
                self.start_vote(true, &requests, Some(&chat.player_id), now);
            }
            VoteCmd::Restart(requests) => {
                if !chat.auth.is_privileged() {
                    return;
                }
                self.stop_vote();
                self.start_vote(true, &requests, Some(&chat.player_id), now);
            }
            VoteCmd::Cancel => {
                if !chat.auth.is_privileged() {
                    return;
                }
                if !self.session.is_enabled() {
                    self.channel
                        .notify(&chat.player_id, "There is no vote running right now");
                    return;
                }
                self.stop_vote();
                self.channel.notify(&chat.player_id, "Ending current vote");
            }
            VoteCmd::Broadcast => {
                if !chat.auth.is_privileged() {
                    return;
                }
                if !self.session.is_enabled() {
                    self.channel
                        .notify(&chat.player_id, "There is no vote running right now");
                    return;
                }
                self.broadcast_standings();
            }
            VoteCmd::Help => {
                let prefix = &self.config.command_prefix;
                self.channel
                    .notify(&chat.player_id, "Map voting commands:");
                self.channel
                    .notify(&chat.player_id, &format!("{prefix} <choices|number|results>"));
                if chat.auth.is_privileged() {
                    self.channel.notify(
                        &chat.player_id,
                        &format!("{prefix} <start|restart|cancel|broadcast> (admin only)"),
                    );
                }
            }
            VoteCmd::Unknown(sub) => {
                self.channel
                    .notify(&chat.player_id, &format!("Unknown vote subcommand: {sub}"));
            }
        }
    }

    /// Points the next layer at the current winner; ties pick random.
    fn update_next_map(&mut self) {
        let winners = self.session.winners();
        if let Some(winner) = winners.choose(&mut self.rng) {
            self.channel.set_next_layer(&winner.layer_id);
        }
    }

    fn broadcast_standings(&mut self) {
        if self.session.nominations().is_empty() {
            return;
        }
        let with_counts = self.session.first_broadcast_done();
        self.channel.broadcast(
            "\u{272f} MAPVOTE \u{272f} Vote for the next map by writing in chat the corresponding number!",
        );
        self.channel
            .broadcast(&self.session.choice_lines(with_counts).join("\n"));
        self.session.mark_broadcast_done();
    }

    fn direct_standings(&self, player_id: &PlayerId) {
        for line in self.session.choice_lines(true) {
            self.channel.notify(player_id, &line);
        }
        let winners = self.session.winners();
        let names: Vec<&str> = winners
            .iter()
            .map(|winner| winner.display_name.as_str())
            .collect();
        let plural = if names.len() > 1 { "s" } else { "" };
        self.channel.notify(
            player_id,
            &format!("Current winner{plural}: {}", names.join(", ")),
        );
    }

    fn run_seeding(&mut self, round_transition: bool) {
        if !self.config.automatic_seeding_mode {
            return;
        }
        let current = match self.current_layer_info() {
            Ok(current) => current,
            Err(err) => {
                log::warn!("seeding check skipped: {err}");
                return;
            }
        };
        let next = self
            .facts
            .next_layer()
            .and_then(|id| self.catalog.find(&id).cloned());

        let actions = seeding_actions(
            &self.config,
            &self.catalog,
            &current,
            next.as_ref(),
            self.facts.population(),
            round_transition,
            &mut self.rng,
        );
        for action in actions {
            match action {
                SeedingAction::SetCurrentLayer(layer_id) => {
                    log::info!("going into seeding mode on {layer_id}");
                    self.channel.set_current_layer(&layer_id);
                }
                SeedingAction::SetNextLayer(layer_id) => {
                    log::info!("seeding layer {layer_id} queued as next");
                    self.channel.set_next_layer(&layer_id);
                }
            }
        }
    }

    fn current_layer_info(&self) -> Result<LayerInfo, VoteError> {
        let id = self
            .facts
            .current_layer()
            .ok_or_else(|| VoteError::BadExternalState("current layer unknown".to_string()))?;
        self.catalog.find(&id).cloned().ok_or_else(|| {
            VoteError::BadExternalState(format!("current layer {id} not in the catalog"))
        })
    }

    fn default_constraints(&self) -> SlateConstraints {
        let mut excluded: HashSet<String> = self
            .facts
            .recent_map_names()
            .into_iter()
            .take(self.config.recent_map_lookback)
            .map(|name| name.to_ascii_lowercase())
            .collect();
        match self.current_layer_info() {
            Ok(current) => {
                excluded.insert(current.map_name.to_ascii_lowercase());
            }
            // best effort, a slate without the exclusion is better
            // than no slate
            Err(err) => log::warn!("{err}, current map not excluded from the slate"),
        }
        SlateConstraints {
            excluded_map_names: excluded,
            allowed_modes: self.config.allowed_modes.clone(),
            blacklist_prefixes: self.config.layer_blacklist_prefixes.clone(),
            primary_mode: self.config.primary_mode.clone(),
            min_primary: self.config.min_primary_nominations,
            slate_size: self.config.slate_size,
            retry_cap: self.config.sampler_retry_cap,
        }
    }
}

#[cfg(test)]
mod test {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use layers::catalog::LayerCatalog;
    use layers::layer::{LayerInfo, TeamInfo};
    use rand::{rngs::SmallRng, SeedableRng};
    use vote_interface::{
        auth::AuthLevel,
        channel::CommandChannelInterface,
        config::ConfigMapVote,
        events::{ChatEvent, PlayerId, ServerEvent},
        facts::ServerFactsInterface,
    };

    use super::{ControllerState, VoteController};

    #[derive(Default)]
    struct FactsState {
        current: Option<String>,
        next: Option<String>,
        roster: Vec<PlayerId>,
        recent: Vec<String>,
    }

    #[derive(Default)]
    struct TestFacts(Mutex<FactsState>);

    impl ServerFactsInterface for TestFacts {
        fn current_layer(&self) -> Option<String> {
            self.0.lock().unwrap().current.clone()
        }
        fn next_layer(&self) -> Option<String> {
            self.0.lock().unwrap().next.clone()
        }
        fn player_roster(&self) -> Vec<PlayerId> {
            self.0.lock().unwrap().roster.clone()
        }
        fn population(&self) -> usize {
            self.0.lock().unwrap().roster.len()
        }
        fn recent_map_names(&self) -> Vec<String> {
            self.0.lock().unwrap().recent.clone()
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        Broadcast(String),
        Notify(PlayerId, String),
        SetNext(String),
        SetCurrent(String),
    }

    #[derive(Default)]
    struct TestChannel(Mutex<Vec<Sent>>);

    impl CommandChannelInterface for TestChannel {
        fn broadcast(&self, msg: &str) {
            self.0.lock().unwrap().push(Sent::Broadcast(msg.to_string()));
        }
        fn notify(&self, player_id: &PlayerId, msg: &str) {
            self.0
                .lock()
                .unwrap()
                .push(Sent::Notify(player_id.clone(), msg.to_string()));
        }
        fn set_next_layer(&self, layer_id: &str) {
            self.0.lock().unwrap().push(Sent::SetNext(layer_id.to_string()));
        }
        fn set_current_layer(&self, layer_id: &str) {
            self.0
                .lock()
                .unwrap()
                .push(Sent::SetCurrent(layer_id.to_string()));
        }
    }

    impl TestChannel {
        fn take(&self) -> Vec<Sent> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    struct Harness {
        facts: Arc<TestFacts>,
        channel: Arc<TestChannel>,
        controller: VoteController<SmallRng>,
    }

    fn layer(map: &str, mode: &str, version: &str) -> LayerInfo {
        LayerInfo {
            id: format!("{map}_{mode}_{version}"),
            map_name: map.to_string(),
            game_mode: mode.to_string(),
            version: version.to_string(),
            teams: [
                TeamInfo {
                    faction: "United States Army".to_string(),
                },
                TeamInfo {
                    faction: "British Army".to_string(),
                },
            ],
        }
    }

    fn catalog() -> LayerCatalog {
        LayerCatalog::new(vec![
            layer("Gorodok", "RAAS", "v1"),
            layer("Yehorivka", "RAAS", "v1"),
            layer("Mutaha", "RAAS", "v1"),
            layer("Narva", "RAAS", "v1"),
            layer("Fallujah", "AAS", "v1"),
            layer("Chora", "AAS", "v1"),
            layer("Kohat", "INVASION", "v1"),
            layer("Logar", "SEED", "v1"),
            layer("Sumari", "SEED", "v1"),
        ])
    }

    fn harness(config: ConfigMapVote) -> Harness {
        let facts = Arc::new(TestFacts::default());
        let channel = Arc::new(TestChannel::default());
        let controller = VoteController::new(
            config,
            Arc::new(catalog()),
            facts.clone(),
            channel.clone(),
            SmallRng::seed_from_u64(1),
        );
        Harness {
            facts,
            channel,
            controller,
        }
    }

    impl Harness {
        fn set_roster(&self, count: usize) {
            self.facts.0.lock().unwrap().roster =
                (0..count).map(|i| format!("player{i}")).collect();
        }

        fn chat(&mut self, player: &str, auth: AuthLevel, message: &str, now: Duration) {
            let event = ServerEvent::Chat(ChatEvent {
                player_id: player.to_string(),
                player_name: player.to_string(),
                message: message.to_string(),
                auth,
            });
            self.controller.handle_event(&event, now);
        }

        fn broadcasts(sent: &[Sent]) -> Vec<&String> {
            sent.iter()
                .filter_map(|s| match s {
                    Sent::Broadcast(msg) => Some(msg),
                    _ => None,
                })
                .collect()
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn start_below_minimum_defers_until_connects() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(10);

        h.controller.start_vote(false, &[], None, secs(0));
        assert_eq!(h.controller.state(), ControllerState::Deferred);
        assert!(h.channel.take().is_empty(), "no broadcast while deferred");

        // still not enough
        h.set_roster(39);
        h.controller
            .handle_event(&ServerEvent::PlayerConnected { player_id: "p".to_string() }, secs(1));
        assert_eq!(h.controller.state(), ControllerState::Deferred);

        h.set_roster(41);
        h.controller
            .handle_event(&ServerEvent::PlayerConnected { player_id: "q".to_string() }, secs(2));
        assert_eq!(h.controller.state(), ControllerState::Active);

        let sent = h.channel.take();
        let broadcasts = Harness::broadcasts(&sent);
        assert_eq!(broadcasts.len(), 2, "header and one standings block");
        assert!(
            !broadcasts[1].contains('('),
            "first broadcast must not show counts: {}",
            broadcasts[1]
        );
    }

    #[test]
    fn forced_start_votes_and_moves_next_layer() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(10);

        h.chat("admin", AuthLevel::Admin, "!vote start", secs(0));
        assert_eq!(h.controller.state(), ControllerState::Active);
        assert_eq!(h.controller.session().nominations().len(), 6);
        h.channel.take();

        h.chat("player1", AuthLevel::None, "3", secs(1));
        let sent = h.channel.take();
        assert!(
            matches!(&sent[0], Sent::Notify(p, msg) if p == "player1" && msg.starts_with("Registered vote:")),
            "vote confirmation missing: {sent:?}"
        );
        let expected = h.controller.session().nominations()[2].layer_id.clone();
        assert_eq!(sent[1], Sent::SetNext(expected));

        // change of mind
        h.chat("player1", AuthLevel::None, "5", secs(2));
        assert_eq!(h.controller.session().tallies()[2], 0);
        assert_eq!(h.controller.session().tallies()[4], 1);
    }

    #[test]
    fn invalid_choices_are_reported_not_counted() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(50);
        h.chat("admin", AuthLevel::Admin, "!vote start", secs(0));
        h.channel.take();

        h.chat("player1", AuthLevel::None, "7", secs(1));
        let sent = h.channel.take();
        assert!(
            matches!(&sent[0], Sent::Notify(_, msg) if msg.contains("invalid map number")),
            "{sent:?}"
        );
        assert_eq!(h.controller.session().vote_count(), 0);
    }

    #[test]
    fn votes_without_session_get_a_notice() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(50);
        h.chat("player1", AuthLevel::None, "3", secs(0));
        let sent = h.channel.take();
        assert_eq!(
            sent,
            vec![Sent::Notify(
                "player1".to_string(),
                "There is no vote running right now".to_string()
            )]
        );
    }

    #[test]
    fn disconnect_reconciles_tallies_and_next_layer() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(50);
        h.facts.0.lock().unwrap().current = Some("Gorodok_RAAS_v1".to_string());
        h.chat("admin", AuthLevel::Admin, "!vote start", secs(0));
        h.channel.take();

        h.chat("player1", AuthLevel::None, "2", secs(1));
        h.chat("player2", AuthLevel::None, "3", secs(2));
        h.chat("player2", AuthLevel::None, "3", secs(3));
        h.channel.take();
        assert_eq!(h.controller.session().vote_count(), 2);

        // player2 leaves; their ballot must go with them
        let mut roster: Vec<String> = (0..50).map(|i| format!("player{i}")).collect();
        roster.retain(|p| p != "player2");
        h.facts.0.lock().unwrap().roster = roster;
        h.controller.handle_event(
            &ServerEvent::PlayerDisconnected { player_id: "player2".to_string() },
            secs(4),
        );

        assert_eq!(h.controller.session().vote_count(), 1);
        assert_eq!(h.controller.session().tallies()[2], 0);
        let sent = h.channel.take();
        let expected = h.controller.session().nominations()[1].layer_id.clone();
        assert!(sent.contains(&Sent::SetNext(expected)), "{sent:?}");
    }

    #[test]
    fn round_transition_clears_and_restarts_later() {
        let config = ConfigMapVote {
            automatic_seeding_mode: false,
            ..Default::default()
        };
        let mut h = harness(config);
        h.set_roster(50);
        h.chat("admin", AuthLevel::Admin, "!vote start", secs(0));
        h.chat("player1", AuthLevel::None, "2", secs(1));
        h.channel.take();

        h.controller.handle_event(
            &ServerEvent::RoundStarted {
                layer_id: "Gorodok_RAAS_v1".to_string(),
                next_layer_id: None,
            },
            secs(10),
        );
        // the old session survives the settle window
        assert_eq!(h.controller.state(), ControllerState::Active);
        assert_eq!(h.controller.next_deadline(), Some(secs(40)));

        h.controller.fire_due(secs(40));
        assert_eq!(h.controller.state(), ControllerState::Idle);
        assert!(h.controller.session().nominations().is_empty());
        // results queries now get the no-vote notice
        h.chat("player1", AuthLevel::None, "!vote results", secs(41));
        let sent = h.channel.take();
        assert!(
            matches!(&sent[0], Sent::Notify(_, msg) if msg == "There is no vote running right now")
        );

        // automatic start 15 minutes after round start
        assert_eq!(h.controller.next_deadline(), Some(secs(10 + 15 * 60)));
        h.controller.fire_due(secs(10 + 15 * 60));
        assert_eq!(h.controller.state(), ControllerState::Active);
    }

    #[test]
    fn periodic_broadcast_rearms_and_shows_counts() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(50);
        h.chat("admin", AuthLevel::Admin, "!vote start", secs(0));
        h.chat("player1", AuthLevel::None, "1", secs(1));
        h.channel.take();

        let interval = secs(7 * 60);
        assert_eq!(h.controller.next_deadline(), Some(interval));
        h.controller.fire_due(interval);

        let sent = h.channel.take();
        let broadcasts = Harness::broadcasts(&sent);
        assert_eq!(broadcasts.len(), 2);
        assert!(broadcasts[1].contains("(1)"), "{}", broadcasts[1]);
        // armed again for the next interval
        assert_eq!(h.controller.next_deadline(), Some(interval + interval));
    }

    #[test]
    fn cancel_is_admin_only_and_keeps_results_visible() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(50);
        h.chat("admin", AuthLevel::Admin, "!vote start", secs(0));
        h.channel.take();

        h.chat("player1", AuthLevel::None, "!vote cancel", secs(1));
        assert!(h.channel.take().is_empty(), "unprivileged cancel ignored");
        assert_eq!(h.controller.state(), ControllerState::Active);

        h.chat("admin", AuthLevel::Admin, "!vote cancel", secs(2));
        let sent = h.channel.take();
        assert!(sent.contains(&Sent::Notify(
            "admin".to_string(),
            "Ending current vote".to_string()
        )));
        assert_eq!(h.controller.state(), ControllerState::Idle);

        // the old slate stays queryable after a cancel
        h.chat("player1", AuthLevel::None, "!vote results", secs(3));
        let sent = h.channel.take();
        assert_eq!(sent.len(), 7, "6 standings lines plus the winner line: {sent:?}");
        assert!(
            matches!(&sent[0], Sent::Notify(p, msg) if p == "player1" && msg.starts_with("1\u{27a4}")),
            "{sent:?}"
        );
        assert!(
            matches!(&sent[6], Sent::Notify(_, msg) if msg.starts_with("Current winners:")),
            "all entries tie at zero: {sent:?}"
        );
    }

    #[test]
    fn oversized_request_leaves_state_untouched() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(50);

        h.chat(
            "admin",
            AuthLevel::Admin,
            "!vote start gorodok yeho mutaha narva fallujah chora kohat",
            secs(0),
        );
        assert_eq!(h.controller.state(), ControllerState::Idle);
        assert!(h.controller.session().nominations().is_empty());
        let sent = h.channel.take();
        assert!(
            matches!(&sent[0], Sent::Notify(p, msg) if p == "admin" && msg.contains("more than 6 options")),
            "{sent:?}"
        );
    }

    #[test]
    fn unknown_subcommand_yields_a_notice() {
        let mut h = harness(ConfigMapVote::default());
        h.chat("player1", AuthLevel::None, "!vote wat", secs(0));
        let sent = h.channel.take();
        assert_eq!(
            sent,
            vec![Sent::Notify(
                "player1".to_string(),
                "Unknown vote subcommand: wat".to_string()
            )]
        );
    }

    #[test]
    fn help_hides_admin_commands_from_players() {
        let mut h = harness(ConfigMapVote::default());
        h.chat("player1", AuthLevel::None, "!vote help", secs(0));
        assert_eq!(h.channel.take().len(), 2);

        h.chat("mod", AuthLevel::Moderator, "!vote help", secs(1));
        let sent = h.channel.take();
        assert_eq!(sent.len(), 3);
        assert!(
            matches!(&sent[2], Sent::Notify(_, msg) if msg.contains("admin only")),
            "{sent:?}"
        );
    }

    #[test]
    fn seeding_swaps_current_layer_on_empty_ish_server() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(3);
        h.facts.0.lock().unwrap().current = Some("Gorodok_RAAS_v1".to_string());

        h.controller.handle_event(
            &ServerEvent::PlayerDisconnected { player_id: "p".to_string() },
            secs(0),
        );
        let sent = h.channel.take();
        assert!(
            matches!(&sent[0], Sent::SetCurrent(id) if id.contains("_SEED_")),
            "{sent:?}"
        );
    }

    #[test]
    fn seeding_check_after_round_start_repoints_next_layer() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(12);
        {
            let mut facts = h.facts.0.lock().unwrap();
            facts.current = Some("Gorodok_RAAS_v1".to_string());
            facts.next = Some("Mutaha_RAAS_v1".to_string());
        }

        h.controller.handle_event(
            &ServerEvent::RoundStarted {
                layer_id: "Gorodok_RAAS_v1".to_string(),
                next_layer_id: Some("Mutaha_RAAS_v1".to_string()),
            },
            secs(0),
        );
        h.controller.fire_due(secs(30));

        let sent = h.channel.take();
        assert!(
            sent.iter()
                .any(|s| matches!(s, Sent::SetNext(id) if id.contains("_SEED_"))),
            "{sent:?}"
        );
    }

    #[test]
    fn recently_played_maps_stay_off_the_slate() {
        let mut h = harness(ConfigMapVote::default());
        h.set_roster(50);
        {
            let mut facts = h.facts.0.lock().unwrap();
            facts.current = Some("Gorodok_RAAS_v1".to_string());
            facts.recent = vec!["Yehorivka".to_string()];
        }

        h.chat("admin", AuthLevel::Admin, "!vote start", secs(0));
        // five eligible layers remain, the slate degrades to all of
        // them
        let ids: Vec<&str> = h
            .controller
            .session()
            .nominations()
            .iter()
            .map(|n| n.layer_id.as_str())
            .collect();
        assert_eq!(ids.len(), 5, "{ids:?}");
        assert!(!ids.iter().any(|id| id.starts_with("Gorodok")));
        assert!(!ids.iter().any(|id| id.starts_with("Yehorivka")));
    }
}
