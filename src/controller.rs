// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Flight controller state machine and cooperative scheduler.
//!
//! One loop, one execution context. Each iteration:
//!
//! 1. Reads the clock
//! 2. Polls the command source and applies any action to [`CommandState`]
//! 3. Gates throttle on `engine_enabled`
//! 4. Services every generator whose deadline has passed, advancing that
//!    deadline by the delay the generator returned
//! 5. Sleeps until the soonest deadline
//!
//! # Degradation
//!
//! The IR decoder may block for a whole frame (~55 ms). Nothing is serviced
//! meanwhile; afterwards every overdue generator runs immediately, iteration
//! after iteration, until its accumulated deadline is ahead of the clock
//! again. Output jitter is bounded by one decode, and the nominal waveform
//! phase is kept.
//!
//! # Command Shaping
//!
//! - Roll: -100..=100, stepped by `roll_step` per RollLeft/RollRight
//! - Throttle: 0..=100, stepped by `throttle_step` per VolumeUp/VolumeDown
//! - PowerToggle arms at `armed_throttle` or disarms to zero; while disarmed
//!   the throttle command is held at zero

use crate::command::{Action, CommandSource};
use crate::config::{Config, ControlConfig};
use crate::error::ConfigError;
use crate::hal::{Board, PinId, PinMode};
use crate::motor::Motor;
use crate::schedule::Deadlines;
use crate::servo::Servo;

/// Pilot intent, owned by the controller and mutated only by actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandState {
    roll_cmd: i32,
    throttle_cmd: i32,
    engine_enabled: bool,
}

impl CommandState {
    /// Centred, zero throttle, disarmed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one action.
    ///
    /// # Returns
    ///
    /// `true` if the action is meaningful for this control scheme; pitch,
    /// select, digits and raw codes are ignored.
    pub fn apply(&mut self, action: Action, control: &ControlConfig) -> bool {
        let handled = match action {
            Action::PowerToggle => {
                self.engine_enabled = !self.engine_enabled;
                self.throttle_cmd = if self.engine_enabled {
                    control.armed_throttle
                } else {
                    0
                };
                true
            }
            Action::VolumeUp => {
                self.throttle_cmd = (self.throttle_cmd + control.throttle_step).clamp(0, 100);
                true
            }
            Action::VolumeDown => {
                self.throttle_cmd = (self.throttle_cmd - control.throttle_step).clamp(0, 100);
                true
            }
            Action::RollLeft => {
                self.roll_cmd = (self.roll_cmd - control.roll_step).clamp(-100, 100);
                true
            }
            Action::RollRight => {
                self.roll_cmd = (self.roll_cmd + control.roll_step).clamp(-100, 100);
                true
            }
            Action::NoseUp
            | Action::NoseDown
            | Action::Select
            | Action::Numeric(_)
            | Action::Raw(_) => false,
        };
        if !self.engine_enabled {
            self.throttle_cmd = 0;
        }
        handled
    }

    /// Throttle actually sent to the motor.
    pub fn effective_throttle(&self) -> i32 {
        if self.engine_enabled {
            self.throttle_cmd
        } else {
            0
        }
    }

    pub fn roll_cmd(&self) -> i32 {
        self.roll_cmd
    }

    pub fn throttle_cmd(&self) -> i32 {
        self.throttle_cmd
    }

    pub fn engine_enabled(&self) -> bool {
        self.engine_enabled
    }
}

/// Owns the generators and the command state and runs the loop.
pub struct FlightController<S> {
    control: ControlConfig,
    led: PinId,
    led_on: bool,
    source: S,
    state: CommandState,
    motor: Motor,
    servo_left: Servo,
    servo_right: Servo,
    deadlines: Deadlines,
    overruns: u32,
}

impl<S: CommandSource> FlightController<S> {
    /// Validates `config`, sets up every actuator pin and lights the LED.
    ///
    /// All three generators are due immediately.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`Config::validate`]; no pin is
    /// touched in that case.
    pub fn new<B: Board>(board: &mut B, config: Config, source: S) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            log_error!("rejected configuration: {}", e);
            return Err(e);
        }

        let pins = &config.board;
        board.configure(pins.led, PinMode::OUTPUT);
        board.write(pins.led, true);

        let motor = Motor::new(board, pins.motor);
        let servo_left = Servo::new(board, pins.servo_left, config.servo);
        let servo_right = Servo::new(board, pins.servo_right, config.servo);

        Ok(Self {
            control: config.control,
            led: pins.led,
            led_on: true,
            source,
            state: CommandState::new(),
            motor,
            servo_left,
            servo_right,
            deadlines: Deadlines::starting_at(board.now()),
            overruns: 0,
        })
    }

    /// Runs one loop iteration.
    pub fn step<B: Board>(&mut self, board: &mut B) {
        let now = board.now();

        if let Some(action) = self.source.poll(board) {
            let handled = self.state.apply(action, &self.control);
            self.led_on = !self.led_on;
            board.write(self.led, self.led_on);
            if handled {
                log_info!(
                    "{:?}: roll {} throttle {} armed {}",
                    action,
                    self.state.roll_cmd(),
                    self.state.throttle_cmd(),
                    self.state.engine_enabled()
                );
            } else {
                log_debug!("ignored {:?}", action);
            }
        }

        self.motor.set_throttle(self.state.effective_throttle());

        // Lateness is measured against the real clock; the decoder may have
        // blocked since `now` was read.
        let serviced_at = board.now();
        let roll = self.state.roll_cmd();
        let mut worst_late = 0;

        if self.deadlines.servo_left.is_due(now) {
            worst_late = worst_late.max(self.deadlines.servo_left.lateness(serviced_at));
            let delta = self.servo_left.update(board, roll, true);
            self.deadlines.servo_left.advance(delta);
        }
        if self.deadlines.servo_right.is_due(now) {
            worst_late = worst_late.max(self.deadlines.servo_right.lateness(serviced_at));
            let delta = self.servo_right.update(board, roll, false);
            self.deadlines.servo_right.advance(delta);
        }
        if self.deadlines.motor.is_due(now) {
            worst_late = worst_late.max(self.deadlines.motor.lateness(serviced_at));
            let delta = self.motor.service(board, serviced_at);
            self.deadlines.motor.advance(delta);
        }

        if worst_late > self.control.late_warn_us {
            self.overruns = self.overruns.saturating_add(1);
            log_warn!("generators serviced {} us late", worst_late);
        }

        let soonest = self.deadlines.soonest();
        if soonest > now {
            board.sleep_until(soonest);
        }
    }

    /// Runs the loop forever.
    pub fn run<B: Board>(&mut self, board: &mut B) -> ! {
        log_info!("control loop running");
        loop {
            self.step(board);
        }
    }

    pub fn state(&self) -> &CommandState {
        &self.state
    }

    pub fn deadlines(&self) -> &Deadlines {
        &self.deadlines
    }

    pub fn motor(&self) -> &Motor {
        &self.motor
    }

    pub fn servo_left(&self) -> &Servo {
        &self.servo_left
    }

    pub fn servo_right(&self) -> &Servo {
        &self.servo_right
    }

    /// Iterations in which some generator ran more than `late_warn_us` late.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::hal::mock::{self, MockBoard};
    use crate::hal::{Level, TimeSource};
    use crate::ir_receiver::IrReceiver;
    use std::collections::VecDeque;

    /// Hands out queued actions, optionally pretending to block first.
    struct Scripted {
        queue: VecDeque<Action>,
        block_us: u64,
    }

    impl Scripted {
        fn new(actions: &[Action]) -> Self {
            Self {
                queue: actions.iter().copied().collect(),
                block_us: 0,
            }
        }

        fn idle() -> Self {
            Self::new(&[])
        }
    }

    impl CommandSource for Scripted {
        fn poll<B: Board>(&mut self, board: &mut B) -> Option<Action> {
            let action = self.queue.pop_front()?;
            board.sleep_for(self.block_us);
            Some(action)
        }
    }

    fn pins() -> BoardConfig {
        BoardConfig::default()
    }

    fn controller<S: CommandSource>(board: &mut MockBoard, source: S) -> FlightController<S> {
        FlightController::new(board, Config::default(), source)
            .expect("default config is valid")
    }

    fn run_until<S: CommandSource>(c: &mut FlightController<S>, board: &mut MockBoard, t: u64) {
        while board.now() < t {
            c.step(board);
        }
    }

    fn rising_edges(board: &MockBoard, pin: PinId) -> Vec<u64> {
        board
            .writes_to(pin)
            .into_iter()
            .filter(|&(_, high)| high)
            .map(|(at, _)| at)
            .collect()
    }

    #[test]
    fn test_power_toggle_arms_and_disarms() {
        let control = ControlConfig::default();
        let mut state = CommandState::new();
        assert!(!state.engine_enabled());

        assert!(state.apply(Action::PowerToggle, &control));
        assert!(state.engine_enabled());
        assert_eq!(state.throttle_cmd(), 20);
        assert_eq!(state.effective_throttle(), 20);

        assert!(state.apply(Action::PowerToggle, &control));
        assert!(!state.engine_enabled());
        assert_eq!(state.throttle_cmd(), 0);
        assert_eq!(state.effective_throttle(), 0);
    }

    #[test]
    fn test_throttle_steps_and_clamps() {
        let control = ControlConfig::default();
        let mut state = CommandState::new();
        state.apply(Action::PowerToggle, &control);

        state.apply(Action::VolumeUp, &control);
        assert_eq!(state.throttle_cmd(), 25);
        for _ in 0..30 {
            state.apply(Action::VolumeUp, &control);
        }
        assert_eq!(state.throttle_cmd(), 100);
        for _ in 0..30 {
            state.apply(Action::VolumeDown, &control);
        }
        assert_eq!(state.throttle_cmd(), 0);
    }

    #[test]
    fn test_throttle_held_at_zero_while_disarmed() {
        let control = ControlConfig::default();
        let mut state = CommandState::new();
        state.apply(Action::VolumeUp, &control);
        state.apply(Action::VolumeUp, &control);
        assert_eq!(state.throttle_cmd(), 0);
        assert_eq!(state.effective_throttle(), 0);
    }

    #[test]
    fn test_roll_steps_and_clamps() {
        let control = ControlConfig::default();
        let mut state = CommandState::new();
        state.apply(Action::RollRight, &control);
        assert_eq!(state.roll_cmd(), 12);
        for _ in 0..10 {
            state.apply(Action::RollRight, &control);
        }
        assert_eq!(state.roll_cmd(), 100);
        for _ in 0..20 {
            state.apply(Action::RollLeft, &control);
        }
        assert_eq!(state.roll_cmd(), -100);
    }

    #[test]
    fn test_other_actions_are_ignored() {
        let control = ControlConfig::default();
        let mut state = CommandState::new();
        for action in [
            Action::NoseUp,
            Action::NoseDown,
            Action::Select,
            Action::Numeric(7),
            Action::Raw(0x00),
        ] {
            assert!(!state.apply(action, &control));
        }
        assert_eq!(state, CommandState::new());
    }

    #[test]
    fn test_invalid_config_touches_no_pins() {
        let mut board = MockBoard::new();
        let mut config = Config::default();
        config.servo.slew_per_frame = 0;

        let result = FlightController::new(&mut board, config, Scripted::idle());
        assert_eq!(result.err(), Some(ConfigError::InvalidSlew));
        assert!(board.writes().is_empty());
    }

    #[test]
    fn test_new_sets_up_outputs_and_led() {
        let mut board = MockBoard::new();
        let _c = controller(&mut board, Scripted::idle());
        let p = pins();
        assert_eq!(board.output(p.led), Some(true));
        for pin in [p.motor.in1, p.motor.in2, p.servo_left, p.servo_right] {
            assert_eq!(board.mode(pin), Some(PinMode::OUTPUT));
            assert_eq!(board.output(pin), Some(false));
        }
    }

    #[test]
    fn test_idle_loop_produces_nominal_waveforms() {
        let mut board = MockBoard::new();
        let mut c = controller(&mut board, Scripted::idle());
        board.clear_log();
        let p = pins();

        run_until(&mut c, &mut board, 40_001);

        assert_eq!(
            board.writes_to(p.servo_left),
            vec![(0, true), (1_500, false), (20_000, true), (21_500, false), (40_000, true)]
        );
        assert_eq!(rising_edges(&board, p.servo_right), vec![0, 20_000, 40_000]);
        // Disarmed motor coasts once per 2.5 ms period.
        assert!(board.writes_to(p.motor.in1).iter().all(|&(_, high)| !high));
        assert_eq!(board.writes_to(p.motor.in1).len(), 17);
        assert_eq!(c.overruns(), 0);
    }

    #[test]
    fn test_sleeps_until_soonest_deadline() {
        let mut board = MockBoard::new();
        let mut c = controller(&mut board, Scripted::idle());
        c.step(&mut board);
        assert_eq!(board.sleeps().to_vec(), vec![1_500]);
        assert_eq!(board.now(), 1_500);
        c.step(&mut board);
        assert_eq!(board.now(), 2_500);
    }

    #[test]
    fn test_armed_motor_runs_pwm() {
        let mut board = MockBoard::new();
        let mut c = controller(&mut board, Scripted::new(&[Action::PowerToggle]));
        board.clear_log();
        let p = pins();

        run_until(&mut c, &mut board, 5_000);

        assert_eq!(c.motor().duty_us(), 500);
        assert_eq!(rising_edges(&board, p.motor.in1), vec![0, 2_500]);
        let falls: Vec<u64> = board
            .writes_to(p.motor.in1)
            .into_iter()
            .filter(|&(_, high)| !high)
            .map(|(at, _)| at)
            .collect();
        assert_eq!(falls, vec![500, 3_000]);
        assert!(board.writes_to(p.motor.in2).iter().all(|&(_, high)| !high));
    }

    #[test]
    fn test_action_toggles_led() {
        let mut board = MockBoard::new();
        let actions = [Action::Raw(0x99), Action::RollLeft];
        let mut c = controller(&mut board, Scripted::new(&actions));
        let led = pins().led;

        c.step(&mut board);
        assert_eq!(board.output(led), Some(false));
        c.step(&mut board);
        assert_eq!(board.output(led), Some(true));
        assert_eq!(c.state().roll_cmd(), -12);
    }

    #[test]
    fn test_roll_deflects_elevons_oppositely() {
        let actions = [Action::RollRight; 9];
        let mut board = MockBoard::new();
        let mut c = controller(&mut board, Scripted::new(&actions));

        run_until(&mut c, &mut board, 400_000);

        assert_eq!(c.state().roll_cmd(), 100);
        assert_eq!(c.servo_left().position_deg(), 70);
        assert_eq!(c.servo_right().position_deg(), -70);
    }

    #[test]
    fn test_blocking_decode_delays_then_catches_up_in_phase() {
        let mut board = MockBoard::new();
        let ir_pin = pins().ir_receiver;
        let ir = IrReceiver::new(&mut board, ir_pin, Config::default().decoder);
        let mut c = controller(&mut board, ir);
        board.clear_log();

        let train = mock::nec_frame([0x00, 0xFF, 0x45, 0xBA]);
        let decode_us = mock::duration(&train);
        board.script_input(ir_pin, &train, Level::High);

        // First iteration decodes the whole frame before servicing anything.
        c.step(&mut board);
        assert!(c.state().engine_enabled());
        assert_eq!(board.now(), decode_us);
        assert_eq!(c.overruns(), 1);
        let left = pins().servo_left;
        assert_eq!(board.writes_to(left), vec![(decode_us, true)]);

        // Overdue generators run at once, without sleeping.
        c.step(&mut board);
        assert_eq!(board.now(), decode_us);
        assert_eq!(board.writes_to(left), vec![(decode_us, true), (decode_us, false)]);

        // Once caught up, edges fall back on the original 20 ms grid.
        run_until(&mut c, &mut board, 120_001);
        let late_edges: Vec<u64> = rising_edges(&board, left)
            .into_iter()
            .filter(|&t| t > decode_us)
            .collect();
        assert_eq!(late_edges, vec![80_000, 100_000, 120_000]);
    }

    #[test]
    fn test_slow_source_counts_overruns() {
        let mut board = MockBoard::new();
        let mut source = Scripted::new(&[Action::Select]);
        source.block_us = 10_000;
        let mut c = controller(&mut board, source);

        c.step(&mut board);
        assert_eq!(c.overruns(), 1);
        run_until(&mut c, &mut board, 60_000);
        assert!(c.overruns() >= 1);
        assert_eq!(c.deadlines().servo_left.at_us() % 20_000, 0);
    }
}
