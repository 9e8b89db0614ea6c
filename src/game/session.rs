//! Battle session
//!
//! Owns the simulation state and drives it one host frame at a time: input
//! hand-off, time scaling, the fixed system order, recording and the
//! victory check.

use tracing::{debug, info};

use crate::game::agent::ShipInput;
use crate::game::constants::pacing::{SHOOT_INTERVAL_MS, SPEED_BLEND};
use crate::game::definition::{DefinitionError, GameDefinition};
use crate::game::events::{EventQueue, SimEvent};
use crate::game::match_result::{determine_result, BattleReport, Outcome, VictoryCheck};
use crate::game::recorder::{PlaybackDone, Recorder, RecorderError};
use crate::game::ship::ShipId;
use crate::game::state::SimState;
use crate::game::systems::{projectile, ships, TickContext};
use crate::game::telemetry::ShipTelemetry;
use crate::game::tunables::Tunables;
use crate::game::world::AsteroidTemplate;
use crate::input::{InputBuffer, InputBufferError, InputSender};

#[derive(Debug)]
pub struct Session {
    tunables: Tunables,
    definition: GameDefinition,
    state: SimState,
    recorder: Option<Recorder>,
    inputs: InputBuffer,
    game_speed: f32,
    target_speed: f32,
    /// Time left before the next cannon shot is allowed (ms)
    shoot_timer: f32,
    victory: VictoryCheck,
    /// Indexed like the ship pool; only human slots are filled
    telemetry: Vec<Option<ShipTelemetry>>,
    frame: u64,
}

impl Session {
    pub fn new(definition: GameDefinition, tunables: Tunables) -> Result<Self, DefinitionError> {
        Self::with_template(definition, tunables, &AsteroidTemplate::default())
    }

    /// Session with one human pilot against the fleets sized by `tunables`
    pub fn skirmish(tunables: Tunables) -> Result<Self, DefinitionError> {
        Self::new(GameDefinition::skirmish(&tunables), tunables)
    }

    pub fn with_template(
        definition: GameDefinition,
        tunables: Tunables,
        template: &AsteroidTemplate,
    ) -> Result<Self, DefinitionError> {
        definition.validate()?;
        let mut state = SimState::build(&definition, template);
        state.audio = tunables.enable_audio;

        let recorder = tunables.recorder_active.then(|| {
            let mut recorder = Recorder::new(tunables.record_frame_count as usize);
            recorder.set_record_active(true);
            recorder
        });
        let telemetry = vec![None; state.ships.capacity()];

        info!(
            "Session started: {} vs {} ships, recorder {}",
            definition.human_allies + definition.ai_allies,
            definition.human_enemies + definition.ai_enemies,
            if recorder.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            victory: VictoryCheck::new(definition.delayed_end),
            tunables,
            definition,
            state,
            recorder,
            inputs: InputBuffer::default(),
            game_speed: 1.0,
            target_speed: 1.0,
            shoot_timer: 0.0,
            telemetry,
            frame: 0,
        })
    }

    /// Advance the battle by one host frame of `engine_dt` milliseconds.
    ///
    /// Events of the previous frame are discarded; read them with
    /// [`Session::events`] or [`Session::drain_events`] in between.
    pub fn simulate(&mut self, engine_dt: f32) {
        self.state.events.clear();
        self.state.audio = self.tunables.enable_audio;
        self.apply_pending_inputs();

        let (dt, can_shoot) = self.advance_pacing(engine_dt);
        let ctx = TickContext {
            tunables: &self.tunables,
            definition: &self.definition,
            dt,
            game_speed: self.game_speed,
            target_speed: self.target_speed,
            can_shoot,
        };

        ships::update(&mut self.state, &ctx);
        ships::update_cameras(&mut self.state, &ctx);
        projectile::update_shots(&mut self.state, &ctx);
        projectile::update_missiles(&mut self.state, &ctx);
        let realtime = ctx.is_realtime();
        self.refresh_telemetry();
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.tick(&mut self.state);
        }
        self.state.sparks.tick(dt);
        self.state.explosions.tick(dt);
        if realtime {
            self.state.trails.tick(dt);
        }

        if let Some(outcome) = self.victory.check(&self.state.ships, engine_dt / 1000.0) {
            info!("Game over after {} frames: {:?}", self.frame, outcome);
            self.state.emit(SimEvent::GameOver { outcome });
        }
        self.frame += 1;
    }

    /// Blend the time scale, return the scaled delta and the cannon cadence.
    fn advance_pacing(&mut self, engine_dt: f32) -> (f32, bool) {
        self.game_speed += (self.target_speed - self.game_speed) * SPEED_BLEND;
        let dt = engine_dt * self.game_speed;

        self.shoot_timer -= dt;
        let can_shoot = self.shoot_timer <= 0.0;
        if can_shoot {
            self.shoot_timer = SHOOT_INTERVAL_MS;
        }
        (dt, can_shoot)
    }

    fn apply_pending_inputs(&mut self) {
        let ships = &mut self.state.ships;
        self.inputs.drain_into(|message| {
            if let Some(ship) = ships.get_mut(message.ship).filter(|s| s.is_human) {
                ship.agent.input = message.input;
            }
        });
    }

    fn refresh_telemetry(&mut self) {
        for (id, slot) in self.telemetry.iter_mut().enumerate() {
            let human = self.state.ships.get(id).is_some_and(|s| s.is_human);
            *slot = if human {
                ShipTelemetry::from_ship(&self.state, id, &self.tunables)
            } else {
                None
            };
        }
    }

    /// Freeze the battle and stop recording.
    pub fn pause(&mut self) {
        debug!("Session paused at frame {}", self.frame);
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.set_record_active(false);
        }
        self.target_speed = 0.0;
    }

    pub fn resume(&mut self) {
        debug!("Session resumed at frame {}", self.frame);
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.stop();
            recorder.set_record_active(true);
        }
        self.target_speed = 1.0;
    }

    /// Time scale the game speed blends toward; 0 freezes, 1 is real time.
    pub fn set_target_speed(&mut self, speed: f32) {
        self.target_speed = speed.max(0.0);
    }

    #[inline]
    pub fn game_speed(&self) -> f32 {
        self.game_speed
    }

    #[inline]
    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    /// Replace the controls of a human ship for the coming frames.
    pub fn set_input(&mut self, ship: ShipId, input: ShipInput) -> bool {
        match self.state.ships.get_mut(ship).filter(|s| s.is_human) {
            Some(ship) => {
                ship.agent.input = input;
                true
            }
            None => false,
        }
    }

    /// Queue input from any thread; applied at the start of the next frame.
    pub fn submit_input(&self, ship: ShipId, input: ShipInput) -> Result<(), InputBufferError> {
        self.inputs.try_submit(ship, input)
    }

    pub fn input_sender(&self) -> InputSender {
        self.inputs.sender()
    }

    /// Freeze the battle and replay the recorded frames at `speed` frames
    /// per tick.
    pub fn replay(&mut self, speed: f32, when_done: Option<PlaybackDone>) -> Result<(), RecorderError> {
        let recorder = self.recorder.as_mut().ok_or(RecorderError::Empty)?;
        if recorder.available_frames() == 0 {
            return Err(RecorderError::Empty);
        }
        recorder.set_record_active(false);
        recorder.playback(speed, when_done);
        self.target_speed = 0.0;
        Ok(())
    }

    /// Show the `index`-th oldest recorded frame; recording must be paused.
    pub fn seek(&mut self, index: usize) -> Result<(), RecorderError> {
        let recorder = self.recorder.as_mut().ok_or(RecorderError::Empty)?;
        recorder.apply_frame(index, &mut self.state)
    }

    #[inline]
    pub fn recorder(&self) -> Option<&Recorder> {
        self.recorder.as_ref()
    }

    #[inline]
    pub fn recorder_mut(&mut self) -> Option<&mut Recorder> {
        self.recorder.as_mut()
    }

    #[inline]
    pub fn events(&self) -> &[SimEvent] {
        &self.state.events
    }

    pub fn drain_events(&mut self) -> EventQueue {
        std::mem::take(&mut self.state.events)
    }

    pub fn telemetry(&self, ship: ShipId) -> Option<&ShipTelemetry> {
        self.telemetry.get(ship).and_then(Option::as_ref)
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.victory.is_over()
    }

    #[inline]
    pub fn outcome(&self) -> Option<Outcome> {
        self.victory.outcome()
    }

    pub fn report(&self) -> BattleReport {
        determine_result(&self.state, self.victory.outcome())
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn state(&self) -> &SimState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    #[inline]
    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Tunables can be edited between frames; changes apply next frame.
    #[inline]
    pub fn tunables_mut(&mut self) -> &mut Tunables {
        &mut self.tunables
    }

    #[inline]
    pub fn definition(&self) -> &GameDefinition {
        &self.definition
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.state.set_aspect(aspect);
    }
}
