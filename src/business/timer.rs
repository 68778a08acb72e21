//! Timer State Machine
//!
//! Owns the countdown and its Idle/Running/Finished phases. Transitions are
//! driven by [`TimerCommand`]s and report their side effects as
//! [`TimerEffect`]s, which the application context carries out in order.

pub const SECONDS_PER_MINUTE: u32 = 60;

/// Lifecycle phase of the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Not running. Covers "just reset" and "configured but never started".
    #[default]
    Idle,
    Running,
    /// Hit zero, waiting for a reset or a new length.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Stop,
    Reset,
    Tick,
    /// Change the configured length in minutes.
    SetLength(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEffect {
    /// Begin the one-second tick source.
    StartTicking,
    /// Cancel the active tick source.
    StopTicking,
    RunStatus(bool),
    /// The countdown reached zero.
    Ended { minutes: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    length_minutes: u32,
    remaining: u32,
    phase: Phase,
}

impl Timer {
    pub fn new(length_minutes: u32) -> Self {
        Self {
            length_minutes,
            remaining: length_minutes.saturating_mul(SECONDS_PER_MINUTE),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Seconds left on the countdown.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn length_minutes(&self) -> u32 {
        self.length_minutes
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format_remaining(self.remaining)
    }

    /// Apply one command and return the effects it produced.
    pub fn apply(&mut self, command: TimerCommand) -> Vec<TimerEffect> {
        match command {
            TimerCommand::Start => {
                if self.phase != Phase::Idle {
                    return Vec::new();
                }
                self.phase = Phase::Running;
                vec![TimerEffect::StartTicking, TimerEffect::RunStatus(true)]
            }
            TimerCommand::Tick => {
                if self.phase != Phase::Running {
                    return Vec::new();
                }
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.finish()
                } else {
                    Vec::new()
                }
            }
            TimerCommand::Stop => {
                if self.phase != Phase::Running {
                    return Vec::new();
                }
                self.phase = Phase::Idle;
                vec![TimerEffect::StopTicking, TimerEffect::RunStatus(false)]
            }
            TimerCommand::Reset => {
                let effects = if self.phase == Phase::Running {
                    vec![TimerEffect::StopTicking, TimerEffect::RunStatus(false)]
                } else {
                    Vec::new()
                };
                self.rewind();
                effects
            }
            TimerCommand::SetLength(minutes) => {
                if self.phase == Phase::Running || minutes == 0 {
                    return Vec::new();
                }
                self.length_minutes = minutes;
                self.rewind();
                Vec::new()
            }
        }
    }

    fn rewind(&mut self) {
        self.remaining = self.length_minutes.saturating_mul(SECONDS_PER_MINUTE);
        self.phase = Phase::Idle;
    }

    fn finish(&mut self) -> Vec<TimerEffect> {
        self.phase = Phase::Finished;
        vec![
            TimerEffect::StopTicking,
            TimerEffect::RunStatus(false),
            TimerEffect::Ended {
                minutes: self.length_minutes,
            },
        ]
    }
}

/// Format seconds as zero-padded `MM:SS`.
pub fn format_remaining(seconds: u32) -> String {
    format!(
        "{:02}:{:02}",
        seconds / SECONDS_PER_MINUTE,
        seconds % SECONDS_PER_MINUTE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(minutes: u32) -> Timer {
        let mut timer = Timer::new(minutes);
        timer.apply(TimerCommand::Start);
        timer
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(65), "01:05");
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(599), "09:59");
        assert_eq!(format_remaining(600), "10:00");
    }

    #[test]
    fn new_timer_is_idle_with_full_length() {
        let timer = Timer::new(10);
        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.remaining(), 600);
        assert_eq!(timer.display(), "10:00");
    }

    #[test]
    fn ticks_reach_finished_exactly_once() {
        for minutes in [1, 2, 5] {
            let mut timer = running(minutes);
            let total = minutes * SECONDS_PER_MINUTE;
            let mut endings = 0;

            for _ in 0..total {
                for effect in timer.apply(TimerCommand::Tick) {
                    if matches!(effect, TimerEffect::Ended { .. }) {
                        endings += 1;
                    }
                }
            }

            assert_eq!(endings, 1);
            assert_eq!(timer.phase(), Phase::Finished);
            assert_eq!(timer.remaining(), 0);

            // Late ticks change nothing.
            assert!(timer.apply(TimerCommand::Tick).is_empty());
            assert_eq!(timer.remaining(), 0);
        }
    }

    #[test]
    fn finishing_cancels_ticks_before_reporting() {
        let mut timer = running(1);
        for _ in 0..59 {
            assert!(timer.apply(TimerCommand::Tick).is_empty());
        }

        assert_eq!(
            timer.apply(TimerCommand::Tick),
            vec![
                TimerEffect::StopTicking,
                TimerEffect::RunStatus(false),
                TimerEffect::Ended { minutes: 1 },
            ]
        );
        assert!(!timer.is_running());
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut timer = Timer::new(1);
        assert_eq!(
            timer.apply(TimerCommand::Start),
            vec![TimerEffect::StartTicking, TimerEffect::RunStatus(true)]
        );
        assert!(timer.apply(TimerCommand::Start).is_empty());
        assert!(timer.is_running());
    }

    #[test]
    fn stop_start_stop_keeps_remaining_time() {
        let mut timer = running(1);
        for _ in 0..5 {
            timer.apply(TimerCommand::Tick);
        }
        timer.apply(TimerCommand::Stop);
        let at_first_stop = timer.remaining();

        timer.apply(TimerCommand::Start);
        timer.apply(TimerCommand::Stop);

        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.remaining(), at_first_stop);
        assert_eq!(at_first_stop, 55);
    }

    #[test]
    fn stop_is_a_no_op_unless_running() {
        let mut timer = Timer::new(1);
        assert!(timer.apply(TimerCommand::Stop).is_empty());
        assert_eq!(timer.phase(), Phase::Idle);
    }

    #[test]
    fn reset_restores_full_length_from_every_phase() {
        let mut idle = Timer::new(3);
        idle.apply(TimerCommand::Reset);

        let mut ticking = running(3);
        ticking.apply(TimerCommand::Tick);
        let effects = ticking.apply(TimerCommand::Reset);
        assert_eq!(
            effects,
            vec![TimerEffect::StopTicking, TimerEffect::RunStatus(false)]
        );

        let mut finished = running(1);
        for _ in 0..60 {
            finished.apply(TimerCommand::Tick);
        }
        assert!(finished.apply(TimerCommand::Reset).is_empty());

        for timer in [idle, ticking, finished] {
            assert_eq!(timer.phase(), Phase::Idle);
            assert_eq!(timer.remaining(), timer.length_minutes() * 60);
        }
    }

    #[test]
    fn length_edits_are_ignored_while_running() {
        let mut timer = running(10);
        timer.apply(TimerCommand::Tick);
        timer.apply(TimerCommand::SetLength(25));

        assert_eq!(timer.length_minutes(), 10);
        assert_eq!(timer.remaining(), 599);
    }

    #[test]
    fn length_edit_recomputes_without_starting() {
        let mut timer = Timer::new(10);
        timer.apply(TimerCommand::SetLength(25));

        assert_eq!(timer.phase(), Phase::Idle);
        assert_eq!(timer.display(), "25:00");
    }

    #[test]
    fn finished_timer_must_be_reset_before_starting() {
        let mut timer = running(1);
        for _ in 0..60 {
            timer.apply(TimerCommand::Tick);
        }

        assert!(timer.apply(TimerCommand::Start).is_empty());
        assert_eq!(timer.phase(), Phase::Finished);
    }
}
