//! Session state and its controller.
//!
//! [`SessionController`] owns the running [`Session`] together with every
//! timer id the session has asked for. All transitions go through it, so
//! reset and completion always cancel what was scheduled.

use crate::config::{COUNTDOWN_TICK_MS, REDRAW_INTERVAL_MS};
use crate::error::SessionError;
use crate::heat::{Heat, HeatSummary, LANE_COUNT};
use crate::timer::{ManualTimers, TimerDriver, TimerEvent, TimerId};
use crate::utils::{parse_delay_secs, validate_heat_count};
use log::{debug, info, warn};
use serde::Serialize;

/// How the next heat start is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePolicy {
    /// One-shot timeout re-armed after every heat.
    #[default]
    Chained,
    /// One repeating timer with period equal to the delay.
    FixedInterval,
}

/// Validated session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    pub heats: u32,
    pub delay_secs: u32,
    pub policy: SchedulePolicy,
}

impl SessionConfig {
    pub fn new(heats: u32, delay_secs: u32, policy: SchedulePolicy) -> Result<Self, SessionError> {
        if heats == 0 {
            return Err(SessionError::InvalidHeatCount(
                "Heat count must be at least 1".into(),
            ));
        }
        if delay_secs == 0 {
            return Err(SessionError::InvalidDelay(
                "delay must be at least 1 second".into(),
            ));
        }
        Ok(Self {
            heats,
            delay_secs,
            policy,
        })
    }

    /// Build from raw form values.
    pub fn parse(heats: &str, delay: &str, policy: SchedulePolicy) -> Result<Self, SessionError> {
        let heats = validate_heat_count(heats)?;
        let delay_secs = parse_delay_secs(delay)?;
        Self::new(heats, delay_secs, policy)
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_secs.saturating_mul(1_000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,
    Complete,
}

/// Which top-level screen the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Config,
    Running,
    Complete,
}

/// Results logged when a session completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub config: SessionConfig,
    pub heats: Vec<HeatSummary>,
}

/// Transient state of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    config: SessionConfig,
    heats: Vec<Heat>,
    countdown: Option<u32>,
    phase: SessionPhase,
    countdown_timer: Option<TimerId>,
    schedule_timer: Option<TimerId>,
}

impl Session {
    fn new(config: SessionConfig) -> Self {
        Self {
            config,
            heats: Vec::new(),
            countdown: None,
            phase: SessionPhase::Running,
            countdown_timer: None,
            schedule_timer: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Heats in the order they started.
    pub fn heats(&self) -> &[Heat] {
        &self.heats
    }

    pub fn heat(&self, number: u32) -> Option<&Heat> {
        self.heats.iter().find(|h| h.number() == number)
    }

    /// Number of heats started so far.
    pub fn heat_count(&self) -> u32 {
        self.heats.len() as u32
    }

    /// Seconds until the next heat; `None` while the countdown is hidden.
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            config: self.config,
            heats: self.heats.iter().map(Heat::summary).collect(),
        }
    }

    fn all_heats_started(&self) -> bool {
        self.heat_count() >= self.config.heats
    }

    /// Every timer id this session still holds.
    fn timer_ids(&self) -> impl Iterator<Item = TimerId> + '_ {
        self.countdown_timer
            .into_iter()
            .chain(self.schedule_timer)
            .chain(self.heats.iter().filter_map(|h| h.redraw_timer))
    }

    fn owns(&self, id: TimerId) -> bool {
        self.timer_ids().any(|owned| owned == id)
    }
}

/// Owner of the session lifecycle and of every timer it schedules.
pub struct SessionController<T: TimerDriver> {
    timers: T,
    session: Option<Session>,
}

impl<T: TimerDriver> SessionController<T> {
    pub fn new(timers: T) -> Self {
        Self {
            timers,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn screen(&self) -> Screen {
        match &self.session {
            None => Screen::Config,
            Some(s) if s.is_complete() => Screen::Complete,
            Some(_) => Screen::Running,
        }
    }

    /// Parse the form values and start a session.
    pub fn start_from_input(
        &mut self,
        heats: &str,
        delay: &str,
        policy: SchedulePolicy,
        now_ms: f64,
    ) -> Result<(), SessionError> {
        let config = SessionConfig::parse(heats, delay, policy).inspect_err(|e| {
            warn!("Rejected session input heats={:?} delay={:?}: {}", heats, delay, e);
        })?;
        self.start(config, now_ms)
    }

    /// Start a session: heat 1 immediately, the rest on the configured delay.
    pub fn start(&mut self, config: SessionConfig, now_ms: f64) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyRunning);
        }
        info!(
            "Starting session: {} heat(s), {}s delay, {:?} scheduling",
            config.heats, config.delay_secs, config.policy
        );

        let mut session = Session::new(config);
        self.start_heat(&mut session, now_ms);

        let delay_ms = config.delay_ms();
        if config.heats > 1 {
            session.countdown = Some(config.delay_secs);
            session.countdown_timer = Some(
                self.timers
                    .set_interval(COUNTDOWN_TICK_MS, TimerEvent::CountdownTick),
            );
            session.schedule_timer = Some(match config.policy {
                SchedulePolicy::Chained => self.timers.set_timeout(delay_ms, TimerEvent::NextHeat),
                SchedulePolicy::FixedInterval => {
                    self.timers.set_interval(delay_ms, TimerEvent::NextHeat)
                }
            });
        } else {
            session.schedule_timer = Some(self.timers.set_timeout(delay_ms, TimerEvent::SessionEnd));
        }

        self.session = Some(session);
        Ok(())
    }

    /// Deliver a fired timer. Ids the current session does not own are
    /// ignored, so callbacks that outlive a reset are inert.
    pub fn on_timer(&mut self, id: TimerId, event: TimerEvent, now_ms: f64) {
        let Some(mut session) = self.session.take() else {
            debug!("Timer {:?} ({:?}) fired with no session", id, event);
            return;
        };
        if !session.owns(id) {
            debug!("Ignoring stale timer {:?} ({:?})", id, event);
            self.session = Some(session);
            return;
        }

        match event {
            TimerEvent::CountdownTick => {
                if let Some(value) = session.countdown.as_mut() {
                    *value = value.saturating_sub(1);
                }
            }
            TimerEvent::Redraw(number) => {
                if let Some(heat) = session.heats.iter_mut().find(|h| h.number() == number) {
                    heat.redraw(now_ms);
                }
            }
            TimerEvent::NextHeat => self.next_heat_or_complete(&mut session, id, now_ms),
            TimerEvent::SessionEnd => {
                session.schedule_timer = None;
                self.complete(&mut session);
            }
        }

        self.session = Some(session);
    }

    /// Stop one lane of a heat and return its final elapsed seconds.
    pub fn stop_lane(&mut self, heat: u32, lane: usize, now_ms: f64) -> Result<f64, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotRunning)?;
        if lane >= LANE_COUNT {
            return Err(SessionError::NoSuchLane(lane));
        }
        let record = session
            .heats
            .iter_mut()
            .find(|h| h.number() == heat)
            .ok_or(SessionError::NoSuchHeat(heat))?;

        let secs = record
            .stop_lane(lane, now_ms)
            .ok_or(SessionError::LaneAlreadyStopped { heat, lane })?;
        debug!("Heat {} lane {} stopped at {:.2}s", heat, lane + 1, secs);

        if !record.is_running() {
            if let Some(id) = record.redraw_timer.take() {
                self.timers.clear(id);
            }
        }
        Ok(secs)
    }

    /// Cancel everything and return to the configuration screen.
    pub fn reset(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let ids: Vec<TimerId> = session.timer_ids().collect();
        for id in &ids {
            self.timers.clear(*id);
        }
        info!(
            "Session reset after {} heat(s); cancelled {} timer(s)",
            session.heat_count(),
            ids.len()
        );
    }

    fn start_heat(&mut self, session: &mut Session, now_ms: f64) {
        let number = session.heat_count() + 1;
        let mut heat = Heat::new(number, now_ms);
        heat.redraw_timer = Some(
            self.timers
                .set_interval(REDRAW_INTERVAL_MS, TimerEvent::Redraw(number)),
        );
        session.heats.push(heat);
        info!("Heat {}/{} started", number, session.config.heats);
    }

    fn next_heat_or_complete(&mut self, session: &mut Session, fired: TimerId, now_ms: f64) {
        if session.all_heats_started() {
            if let Some(id) = session.schedule_timer.take() {
                self.timers.clear(id);
            }
            self.complete(session);
            return;
        }

        self.start_heat(session, now_ms);
        if session.all_heats_started() {
            if let Some(id) = session.countdown_timer.take() {
                self.timers.clear(id);
            }
            session.countdown = None;
        } else {
            session.countdown = Some(session.config.delay_secs);
        }

        if session.config.policy == SchedulePolicy::Chained {
            // The fired one-shot is spent; arm the next link
            debug_assert_eq!(session.schedule_timer, Some(fired));
            session.schedule_timer = Some(
                self.timers
                    .set_timeout(session.config.delay_ms(), TimerEvent::NextHeat),
            );
        }
    }

    fn complete(&mut self, session: &mut Session) {
        for id in session.countdown_timer.take().into_iter().chain(session.schedule_timer.take()) {
            self.timers.clear(id);
        }
        session.countdown = None;
        session.phase = SessionPhase::Complete;

        let report = session.report();
        match serde_json::to_string(&report) {
            Ok(json) => info!("Session complete: {}", json),
            Err(e) => warn!("Session complete; report could not be serialized: {}", e),
        }
    }
}

impl SessionController<ManualTimers> {
    /// Deliver every timer due up to `until_ms`, in order.
    pub fn advance_to(&mut self, until_ms: f64) {
        while let Some(fired) = self.timers.pop_due(until_ms) {
            self.on_timer(fired.id, fired.event, fired.at_ms);
        }
        self.timers.set_now(until_ms);
    }

    pub fn advance_by(&mut self, ms: f64) {
        let target = self.timers.now() + ms;
        self.advance_to(target);
    }

    pub fn now(&self) -> f64 {
        self.timers.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SessionController<ManualTimers> {
        SessionController::new(ManualTimers::new())
    }

    fn start(c: &mut SessionController<ManualTimers>, heats: u32, delay: u32, policy: SchedulePolicy) {
        let config = SessionConfig::new(heats, delay, policy).unwrap();
        let now = c.now();
        c.start(config, now).unwrap();
    }

    fn heat_count(c: &SessionController<ManualTimers>) -> u32 {
        c.session().map(Session::heat_count).unwrap_or(0)
    }

    #[test]
    fn invalid_heat_count_creates_nothing() {
        let mut c = controller();
        for input in ["0", "-3", "abc", ""] {
            let err = c
                .start_from_input(input, "5", SchedulePolicy::Chained, 0.0)
                .unwrap_err();
            assert!(err.is_input_error());
            assert_eq!(c.screen(), Screen::Config);
            assert!(c.session().is_none());
            assert_eq!(c.timers().pending_count(), 0);
        }
    }

    #[test]
    fn first_heat_starts_immediately_with_countdown() {
        let mut c = controller();
        c.start_from_input("3", "5", SchedulePolicy::Chained, 0.0).unwrap();

        let session = c.session().unwrap();
        assert_eq!(c.screen(), Screen::Running);
        assert_eq!(session.heat_count(), 1);
        assert_eq!(session.countdown(), Some(5));
        assert_eq!(session.heats()[0].lanes().len(), 2);
    }

    #[test]
    fn single_heat_has_no_countdown_and_completes_after_delay() {
        let mut c = controller();
        start(&mut c, 1, 5, SchedulePolicy::Chained);
        assert_eq!(c.session().unwrap().countdown(), None);

        c.advance_to(4_999.0);
        assert_eq!(c.screen(), Screen::Running);
        c.advance_to(5_000.0);
        assert_eq!(c.screen(), Screen::Complete);
        assert_eq!(heat_count(&c), 1);
    }

    fn assert_three_heat_timeline(policy: SchedulePolicy) {
        let mut c = controller();
        start(&mut c, 3, 5, policy);

        c.advance_to(4_999.0);
        assert_eq!(heat_count(&c), 1);
        c.advance_to(5_000.0);
        assert_eq!(heat_count(&c), 2);
        assert_eq!(c.session().unwrap().heat(2).unwrap().started_at_ms(), 5_000.0);

        c.advance_to(9_999.0);
        assert_eq!(heat_count(&c), 2);
        c.advance_to(10_000.0);
        assert_eq!(heat_count(&c), 3);
        assert_eq!(c.session().unwrap().countdown(), None);
        assert_eq!(c.screen(), Screen::Running);

        c.advance_to(14_999.0);
        assert_eq!(c.screen(), Screen::Running);
        c.advance_to(15_000.0);
        assert_eq!(c.screen(), Screen::Complete);

        c.advance_to(60_000.0);
        assert_eq!(heat_count(&c), 3);
        assert_eq!(c.session().unwrap().heats().len(), 3);
    }

    #[test]
    fn chained_policy_follows_the_example_timeline() {
        assert_three_heat_timeline(SchedulePolicy::Chained);
    }

    #[test]
    fn fixed_interval_policy_follows_the_example_timeline() {
        assert_three_heat_timeline(SchedulePolicy::FixedInterval);
    }

    #[test]
    fn fixed_interval_scheduler_stops_itself() {
        let mut c = controller();
        start(&mut c, 2, 3, SchedulePolicy::FixedInterval);
        c.advance_to(6_000.0);
        assert_eq!(c.screen(), Screen::Complete);

        // Only the redraw intervals of the two running heats remain
        assert_eq!(c.timers().pending_count(), 2);
    }

    #[test]
    fn countdown_ticks_down_and_resets_per_heat() {
        let mut c = controller();
        start(&mut c, 3, 5, SchedulePolicy::Chained);

        c.advance_to(1_000.0);
        assert_eq!(c.session().unwrap().countdown(), Some(4));
        c.advance_to(4_000.0);
        assert_eq!(c.session().unwrap().countdown(), Some(1));
        c.advance_to(5_000.0);
        assert_eq!(c.session().unwrap().countdown(), Some(5));
        c.advance_to(6_000.0);
        assert_eq!(c.session().unwrap().countdown(), Some(4));
    }

    #[test]
    fn countdown_never_goes_negative() {
        let mut c = controller();
        start(&mut c, 2, 2, SchedulePolicy::Chained);
        let mut session = c.session.take().unwrap();
        session.countdown = Some(0);
        let tick = session.countdown_timer.unwrap();
        c.session = Some(session);

        c.on_timer(tick, TimerEvent::CountdownTick, 1_000.0);
        assert_eq!(c.session().unwrap().countdown(), Some(0));
    }

    #[test]
    fn n_heats_produce_n_cards_with_two_lanes() {
        let mut c = controller();
        start(&mut c, 4, 1, SchedulePolicy::Chained);
        c.advance_to(10_000.0);

        let session = c.session().unwrap();
        assert_eq!(session.heats().len(), 4);
        assert!(session.heats().iter().all(|h| h.lanes().len() == 2));
        let numbers: Vec<u32> = session.heats().iter().map(Heat::number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn lanes_track_elapsed_time_until_stopped() {
        let mut c = controller();
        start(&mut c, 1, 30, SchedulePolicy::Chained);

        c.advance_to(1_500.0);
        let secs = c.stop_lane(1, 0, 1_500.0).unwrap();
        assert_eq!(secs, 1.5);

        c.advance_to(3_000.0);
        let heat = c.session().unwrap().heat(1).unwrap();
        assert_eq!(heat.lane(0).unwrap().display(), "1.50");
        assert_eq!(heat.lane(1).unwrap().display(), "3.00");
        assert!(heat.lane(1).unwrap().stopped_secs().is_none());
    }

    #[test]
    fn stopped_lane_rejects_second_stop_and_sibling_unaffected() {
        let mut c = controller();
        start(&mut c, 1, 30, SchedulePolicy::Chained);
        c.stop_lane(1, 1, 700.0).unwrap();

        assert_eq!(
            c.stop_lane(1, 1, 900.0),
            Err(SessionError::LaneAlreadyStopped { heat: 1, lane: 1 })
        );
        assert!(c.stop_lane(1, 0, 900.0).is_ok());
    }

    #[test]
    fn stopping_both_lanes_cancels_the_redraw_timer() {
        let mut c = controller();
        start(&mut c, 1, 30, SchedulePolicy::Chained);
        let redraw = c.session().unwrap().heat(1).unwrap().redraw_timer.unwrap();

        c.stop_lane(1, 0, 100.0).unwrap();
        assert!(c.timers().is_pending(redraw));
        c.stop_lane(1, 1, 200.0).unwrap();
        assert!(!c.timers().is_pending(redraw));
    }

    #[test]
    fn stop_lane_errors() {
        let mut c = controller();
        assert_eq!(c.stop_lane(1, 0, 0.0), Err(SessionError::NotRunning));

        start(&mut c, 2, 5, SchedulePolicy::Chained);
        assert_eq!(c.stop_lane(2, 0, 0.0), Err(SessionError::NoSuchHeat(2)));
        assert_eq!(c.stop_lane(1, 2, 0.0), Err(SessionError::NoSuchLane(2)));
    }

    #[test]
    fn lanes_keep_running_after_completion() {
        let mut c = controller();
        start(&mut c, 1, 2, SchedulePolicy::Chained);
        c.advance_to(3_000.0);
        assert_eq!(c.screen(), Screen::Complete);
        assert!(c.stop_lane(1, 0, 3_000.0).is_ok());
    }

    #[test]
    fn reset_cancels_everything_at_any_point() {
        for at in [0.0, 2_500.0, 5_000.0, 12_000.0, 20_000.0] {
            let mut c = controller();
            start(&mut c, 3, 5, SchedulePolicy::Chained);
            c.advance_to(at);

            c.reset();
            assert_eq!(c.screen(), Screen::Config);
            assert!(c.session().is_none());
            assert_eq!(c.timers().pending_count(), 0, "reset at {at}");

            c.advance_to(at + 60_000.0);
            assert!(c.session().is_none());
        }
    }

    #[test]
    fn reset_before_single_heat_ends_cancels_session_end() {
        let mut c = controller();
        start(&mut c, 1, 5, SchedulePolicy::Chained);
        c.advance_to(2_000.0);
        assert_eq!(c.timers().pending_count(), 2);

        c.reset();
        assert_eq!(c.timers().pending_count(), 0);
        c.advance_to(10_000.0);
        assert_eq!(c.screen(), Screen::Config);
    }

    #[test]
    fn reset_mid_fixed_interval_session_cancels_repeating_scheduler() {
        for at in [0.0, 3_000.0, 5_000.0, 7_500.0] {
            let mut c = controller();
            start(&mut c, 4, 5, SchedulePolicy::FixedInterval);
            c.advance_to(at);
            assert_eq!(c.screen(), Screen::Running);

            c.reset();
            assert_eq!(c.timers().pending_count(), 0, "reset at {at}");
            c.advance_to(at + 60_000.0);
            assert!(c.session().is_none());
        }
    }

    #[test]
    fn large_heat_counts_are_accepted() {
        let mut c = controller();
        c.start_from_input("150", "5", SchedulePolicy::Chained, 0.0).unwrap();
        assert_eq!(c.session().unwrap().config().heats, 150);
        assert_eq!(c.session().unwrap().heat_count(), 1);
    }

    #[test]
    fn stale_timer_after_reset_is_ignored() {
        let mut c = controller();
        start(&mut c, 3, 5, SchedulePolicy::Chained);
        let stale = c.session().unwrap().schedule_timer.unwrap();
        c.reset();
        start(&mut c, 2, 5, SchedulePolicy::Chained);

        c.on_timer(stale, TimerEvent::NextHeat, 100.0);
        assert_eq!(heat_count(&c), 1);
    }

    #[test]
    fn second_start_is_rejected_while_running() {
        let mut c = controller();
        start(&mut c, 2, 5, SchedulePolicy::Chained);
        let config = SessionConfig::new(5, 5, SchedulePolicy::Chained).unwrap();
        assert_eq!(c.start(config, 0.0), Err(SessionError::AlreadyRunning));
        assert_eq!(c.session().unwrap().config().heats, 2);
    }

    #[test]
    fn report_lists_lane_results() {
        let mut c = controller();
        start(&mut c, 2, 1, SchedulePolicy::Chained);
        c.stop_lane(1, 0, 420.0).unwrap();
        c.advance_to(2_000.0);

        let report = c.session().unwrap().report();
        assert_eq!(report.heats.len(), 2);
        assert_eq!(report.heats[0].lanes, vec![Some(0.42), None]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["config"]["policy"], "chained");
        assert_eq!(json["heats"][1]["lanes"][0], serde_json::Value::Null);
    }

    #[test]
    fn config_rejects_zero_values() {
        assert!(SessionConfig::new(0, 5, SchedulePolicy::Chained).is_err());
        assert!(SessionConfig::new(3, 0, SchedulePolicy::Chained).is_err());
        let parsed = SessionConfig::parse("3", "1:00", SchedulePolicy::FixedInterval).unwrap();
        assert_eq!(parsed.delay_ms(), 60_000);
    }
}
