// src/engine/schedule.rs

/// Which kind of scan a loop iteration performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Full,
    Targeted,
}

/// Countdown deciding when the next full scan is due.
///
/// The first call always yields [`ScanMode::Full`]; after that one full scan
/// every `every` iterations, targeted checks in between.
#[derive(Debug, Clone)]
pub struct ScanSchedule {
    every: u32,
    countdown: u32,
}

impl ScanSchedule {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            countdown: 0,
        }
    }

    pub fn next_mode(&mut self) -> ScanMode {
        let mode = if self.countdown == 0 {
            self.countdown = self.every;
            ScanMode::Full
        } else {
            ScanMode::Targeted
        };
        self.countdown -= 1;
        mode
    }
}
