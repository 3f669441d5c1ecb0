use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::TickClock;
use crate::config::{INITIAL_SEGMENT_COUNT, Stage};
use crate::food::Food;
use crate::input::Direction;
use crate::snake::{Snake, StepOutcome};

/// High-level session lifecycle state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionStatus {
    Idle,
    Running,
    Dead,
}

/// Why a session ended. Expected terminal conditions, not faults.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
}

/// Per-tick render state handed to the render sink.
#[derive(Debug)]
pub struct FrameSnapshot<'a> {
    pub snake: &'a Snake,
    pub food: &'a Food,
    pub cell: i32,
    pub score: u32,
}

/// Terminal-collision report handed to the render sink.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DeathReport {
    pub reason: DeathReason,
    pub score: u32,
    pub length: usize,
}

/// Receives render state once per tick and the dead screen on termination.
pub trait RenderSink {
    fn render_frame(&mut self, frame: &FrameSnapshot<'_>);
    fn render_dead_screen(&mut self, report: &DeathReport);
}

/// Receives the score whenever it changes, including the reset at start.
pub trait ScoreSink {
    fn score_changed(&mut self, score: u32);
}

/// One game session: snake, food, score, and the tick lifecycle around them.
///
/// The run loop is the only caller of `tick`; asynchronous input merely
/// overwrites the single buffered-direction slot, so no simulation state is
/// ever mutated outside a tick.
#[derive(Debug)]
pub struct GameSession {
    pub snake: Snake,
    pub food: Food,
    pub score: u32,
    pub status: SessionStatus,
    pub tick_count: u64,
    stage: Stage,
    death_reason: Option<DeathReason>,
    buffered_direction: Direction,
    clock: TickClock,
    rng: StdRng,
}

impl GameSession {
    /// Creates an idle session with entropy-seeded food placement.
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self::with_rng(stage, StdRng::from_entropy())
    }

    /// Creates a deterministic session for tests and reproducible runs.
    #[must_use]
    pub fn with_seed(stage: Stage, seed: u64) -> Self {
        Self::with_rng(stage, StdRng::seed_from_u64(seed))
    }

    fn with_rng(stage: Stage, mut rng: StdRng) -> Self {
        let snake = Self::fresh_snake(&stage);
        let food = Food::spawn(&mut rng, &stage, &snake)
            .expect("a fresh stage always has free cells for food");

        Self {
            snake,
            food,
            score: 0,
            status: SessionStatus::Idle,
            tick_count: 0,
            stage,
            death_reason: None,
            buffered_direction: Direction::Left,
            clock: TickClock::new(stage.tick_interval()),
            rng,
        }
    }

    fn fresh_snake(stage: &Stage) -> Snake {
        let (x, y) = stage.center();
        Snake::new(x, y, INITIAL_SEGMENT_COUNT, stage.cell())
    }

    /// Starts (or restarts) the session.
    ///
    /// A running session is stopped first, so calling start twice behaves
    /// like a fresh restart. Emits the initial frame and the score reset.
    pub fn start(
        &mut self,
        now: Instant,
        render: &mut dyn RenderSink,
        scores: &mut dyn ScoreSink,
    ) {
        if self.status == SessionStatus::Running {
            self.stop();
        }

        self.snake = Self::fresh_snake(&self.stage);
        self.food = Food::spawn(&mut self.rng, &self.stage, &self.snake)
            .expect("a fresh stage always has free cells for food");
        self.score = 0;
        self.tick_count = 0;
        self.death_reason = None;
        self.buffered_direction = self.snake.direction();
        self.status = SessionStatus::Running;
        self.clock.start(now);

        scores.score_changed(self.score);
        render.render_frame(&self.frame_snapshot());
    }

    /// Cancels the tick source. Safe to call when not running.
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Buffers the latest direction command for the next tick.
    ///
    /// Single slot, last write wins; reversal arbitration happens inside the
    /// snake when the tick applies the buffer, not here.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.status == SessionStatus::Running {
            self.buffered_direction = direction;
        }
    }

    /// Runs `tick` when the session is running and the clock is due.
    pub fn poll_tick(
        &mut self,
        now: Instant,
        render: &mut dyn RenderSink,
        scores: &mut dyn ScoreSink,
    ) {
        if self.status == SessionStatus::Running && self.clock.due(now) {
            self.tick(render, scores);
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// Fixed order: move, wall check, food check, self-collision check,
    /// frame emission. Both collision outcomes stop the clock before the
    /// dead screen is surfaced.
    pub fn tick(&mut self, render: &mut dyn RenderSink, scores: &mut dyn ScoreSink) {
        if self.status != SessionStatus::Running {
            return;
        }

        self.tick_count += 1;

        match self.snake.advance(self.buffered_direction, &self.stage) {
            StepOutcome::HitWall(_) => {
                self.die(DeathReason::WallCollision, render);
                return;
            }
            StepOutcome::Moved(_) => {}
        }

        if self.snake.ate(&self.food) {
            self.score += 1;
            scores.score_changed(self.score);

            // A board with no free cell left keeps the consumed food; the
            // session ends through a collision either way.
            if let Some(food) = Food::spawn(&mut self.rng, &self.stage, &self.snake) {
                self.food = food;
            }
        }

        if self.snake.self_collided() {
            self.die(DeathReason::SelfCollision, render);
            return;
        }

        render.render_frame(&self.frame_snapshot());
    }

    fn die(&mut self, reason: DeathReason, render: &mut dyn RenderSink) {
        self.status = SessionStatus::Dead;
        self.death_reason = Some(reason);
        self.stop();

        render.render_dead_screen(&DeathReport {
            reason,
            score: self.score,
            length: self.snake.len(),
        });
    }

    #[must_use]
    pub fn death_reason(&self) -> Option<DeathReason> {
        self.death_reason
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[must_use]
    pub fn frame_snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            snake: &self.snake,
            food: &self.food,
            cell: self.stage.cell(),
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::config::Stage;
    use crate::food::Food;
    use crate::geometry::Vec2;
    use crate::input::Direction;
    use crate::snake::Snake;

    use super::{
        DeathReason, DeathReport, FrameSnapshot, GameSession, RenderSink, ScoreSink,
        SessionStatus,
    };

    #[derive(Debug, Default)]
    struct RecordingSinks {
        frames: usize,
        deaths: Vec<DeathReport>,
        scores: Vec<u32>,
    }

    impl RenderSink for RecordingSinks {
        fn render_frame(&mut self, _frame: &FrameSnapshot<'_>) {
            self.frames += 1;
        }

        fn render_dead_screen(&mut self, report: &DeathReport) {
            self.deaths.push(*report);
        }
    }

    impl ScoreSink for RecordingSinks {
        fn score_changed(&mut self, score: u32) {
            self.scores.push(score);
        }
    }

    fn stage() -> Stage {
        Stage::new(480, 320, 20, Duration::from_millis(600))
    }

    fn started_session(seed: u64) -> (GameSession, RecordingSinks, RecordingSinks) {
        let mut session = GameSession::with_seed(stage(), seed);
        let mut render = RecordingSinks::default();
        let mut scores = RecordingSinks::default();
        session.start(Instant::now(), &mut render, &mut scores);
        (session, render, scores)
    }

    #[test]
    fn start_emits_initial_frame_and_score_reset() {
        let (session, render, scores) = started_session(1);

        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(render.frames, 1);
        assert_eq!(scores.scores, vec![0]);
    }

    #[test]
    fn first_tick_moves_the_snake_one_cell_left() {
        let (mut session, mut render, mut scores) = started_session(2);
        session.food = Food::at(Vec2 { x: 0, y: 0 });

        session.tick(&mut render, &mut scores);

        // 480x320 stage, cell 20, anchored at the center: one step left.
        assert_eq!(session.snake.head(), Vec2 { x: 220, y: 160 });
        assert_eq!(session.snake.len(), 3);
        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(render.frames, 2);
    }

    #[test]
    fn buffered_direction_is_last_write_wins() {
        let (mut session, mut render, mut scores) = started_session(3);
        session.food = Food::at(Vec2 { x: 0, y: 0 });

        session.set_direction(Direction::Up);
        session.set_direction(Direction::Down);
        session.tick(&mut render, &mut scores);

        assert_eq!(session.snake.head(), Vec2 { x: 240, y: 180 });
        assert_eq!(session.snake.direction(), Direction::Down);
    }

    #[test]
    fn reversal_input_keeps_the_committed_direction() {
        let (mut session, mut render, mut scores) = started_session(4);
        session.food = Food::at(Vec2 { x: 0, y: 0 });

        session.set_direction(Direction::Right);
        session.tick(&mut render, &mut scores);

        assert_eq!(session.snake.head(), Vec2 { x: 220, y: 160 });
        assert_eq!(session.snake.direction(), Direction::Left);
    }

    #[test]
    fn eating_food_grows_scores_and_respawns() {
        let (mut session, mut render, mut scores) = started_session(5);
        let eaten = Vec2 { x: 220, y: 160 };
        session.food = Food::at(eaten);

        session.tick(&mut render, &mut scores);

        assert_eq!(session.score, 1);
        assert_eq!(session.snake.len(), 4);
        assert_eq!(scores.scores, vec![0, 1]);
        // Fresh food on a free cell, so never the position just consumed.
        assert_ne!(session.food.position, eaten);
        assert!(!session.snake.occupies(session.food.position));
    }

    #[test]
    fn ticks_without_food_keep_length_constant() {
        let (mut session, mut render, mut scores) = started_session(6);
        session.food = Food::at(Vec2 { x: 0, y: 0 });

        for _ in 0..5 {
            let before = session.snake.len();
            session.tick(&mut render, &mut scores);
            assert_eq!(session.snake.len(), before);
        }
    }

    #[test]
    fn wall_collision_ends_the_session() {
        let (mut session, mut render, mut scores) = started_session(7);
        session.snake = Snake::from_segments(
            vec![Vec2 { x: 0, y: 160 }, Vec2 { x: 20, y: 160 }],
            Direction::Left,
            20,
        );

        session.tick(&mut render, &mut scores);

        assert_eq!(session.status, SessionStatus::Dead);
        assert_eq!(session.death_reason(), Some(DeathReason::WallCollision));
        assert_eq!(render.deaths.len(), 1);
        assert_eq!(render.deaths[0].reason, DeathReason::WallCollision);
        // Body untouched by the terminal move.
        assert_eq!(session.snake.len(), 2);
        assert_eq!(session.snake.head(), Vec2 { x: 0, y: 160 });
    }

    #[test]
    fn self_collision_ends_the_session() {
        let (mut session, mut render, mut scores) = started_session(8);
        // Loop shaped so the next left move runs into the body.
        session.snake = Snake::from_segments(
            vec![
                Vec2 { x: 100, y: 100 },
                Vec2 { x: 100, y: 120 },
                Vec2 { x: 80, y: 120 },
                Vec2 { x: 80, y: 100 },
                Vec2 { x: 60, y: 100 },
            ],
            Direction::Left,
            20,
        );

        session.tick(&mut render, &mut scores);

        assert_eq!(session.status, SessionStatus::Dead);
        assert_eq!(session.death_reason(), Some(DeathReason::SelfCollision));
    }

    #[test]
    fn dead_session_ignores_ticks_and_input() {
        let (mut session, mut render, mut scores) = started_session(9);
        session.snake = Snake::from_segments(
            vec![Vec2 { x: 0, y: 160 }, Vec2 { x: 20, y: 160 }],
            Direction::Left,
            20,
        );
        session.tick(&mut render, &mut scores);
        let frames_at_death = render.frames;

        session.set_direction(Direction::Down);
        session.tick(&mut render, &mut scores);
        session.poll_tick(
            Instant::now() + Duration::from_secs(5),
            &mut render,
            &mut scores,
        );

        assert_eq!(session.status, SessionStatus::Dead);
        assert_eq!(render.frames, frames_at_death);
    }

    #[test]
    fn restart_while_running_resets_the_session() {
        let (mut session, mut render, mut scores) = started_session(10);
        session.food = Food::at(Vec2 { x: 220, y: 160 });
        session.tick(&mut render, &mut scores);
        assert_eq!(session.score, 1);

        session.start(Instant::now(), &mut render, &mut scores);

        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.score, 0);
        assert_eq!(session.snake.len(), 3);
        assert_eq!(session.snake.head(), Vec2 { x: 240, y: 160 });
        assert_eq!(session.tick_count, 0);
    }

    #[test]
    fn stop_is_safe_when_not_running() {
        let mut session = GameSession::with_seed(stage(), 11);

        session.stop();
        session.stop();

        assert_eq!(session.status, SessionStatus::Idle);
    }

    #[test]
    fn poll_tick_respects_the_clock_interval() {
        let mut session = GameSession::with_seed(stage(), 12);
        let mut render = RecordingSinks::default();
        let mut scores = RecordingSinks::default();
        let start = Instant::now();
        session.start(start, &mut render, &mut scores);
        let initial_frames = render.frames;

        session.poll_tick(start + Duration::from_millis(100), &mut render, &mut scores);
        assert_eq!(render.frames, initial_frames);

        session.poll_tick(start + Duration::from_millis(600), &mut render, &mut scores);
        assert_eq!(render.frames, initial_frames + 1);
    }
}
