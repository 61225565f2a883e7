//! # Digital I/O module
//!
//! Access to the arm's digital lines (buzzer, pump, valve, gripper and the
//! head limit switch) behind a back end trait, plus the small controllers
//! built on top of them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::debug;

// Internal
use comms_if::eqpt::dio::DioId;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for the arm's digital I/O lines.
pub trait DioIf {
    /// Set an output line high or low.
    fn set_line(&mut self, line: DioId, high: bool);

    /// Read the state of a line.
    fn read_line(&self, line: DioId) -> bool;
}

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Simulated digital I/O back end.
#[derive(Default)]
pub struct SimDio {
    lines: std::collections::HashMap<DioId, bool>,
}

/// Buzzer controller.
///
/// Tones are timed against session-elapsed time so the buzzer switches off
/// from the main loop without blocking it.
#[derive(Default)]
pub struct BuzzerCtrl {
    /// Session-elapsed time at which the current tone ends.
    off_at_s: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DioIf for SimDio {
    fn set_line(&mut self, line: DioId, high: bool) {
        self.lines.insert(line, high);
    }

    fn read_line(&self, line: DioId) -> bool {
        *self.lines.get(&line).unwrap_or(&false)
    }
}

impl BuzzerCtrl {
    /// Start a tone ending `duration_s` from now.
    ///
    /// The simulated back end carries no tone frequency, it is logged for
    /// traceability only.
    pub fn start(&mut self, dio: &mut dyn DioIf, freq_hz: f64, duration_s: f64, elapsed_s: f64) {
        debug!("Buzzer on: {:.0} Hz for {:.2} s", freq_hz, duration_s);

        dio.set_line(DioId::Buzzer, true);
        self.off_at_s = Some(elapsed_s + duration_s);
    }

    /// Cyclic processing, switches the buzzer off once its tone has elapsed.
    pub fn proc(&mut self, dio: &mut dyn DioIf, elapsed_s: f64) {
        if let Some(off_at_s) = self.off_at_s {
            if elapsed_s >= off_at_s {
                dio.set_line(DioId::Buzzer, false);
                self.off_at_s = None;
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open or close the gripper. The gripper line is active low, driving it low
/// catches.
pub fn set_gripper(dio: &mut dyn DioIf, closed: bool) {
    dio.set_line(DioId::Gripper, !closed);
}

/// Switch the suction pump on or off.
///
/// Switching off opens the valve to vent the line, releasing anything held
/// by suction.
pub fn set_pump(dio: &mut dyn DioIf, on: bool) {
    dio.set_line(DioId::PumpEn, on);
    dio.set_line(DioId::ValveEn, !on);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_buzzer_times_out() {
        let mut dio = SimDio::default();
        let mut buzzer = BuzzerCtrl::default();

        buzzer.start(&mut dio, 440.0, 0.5, 10.0);
        assert!(dio.read_line(DioId::Buzzer));

        // Still on before the deadline
        buzzer.proc(&mut dio, 10.4);
        assert!(dio.read_line(DioId::Buzzer));

        // Off after it
        buzzer.proc(&mut dio, 10.6);
        assert!(!dio.read_line(DioId::Buzzer));
    }

    #[test]
    fn test_pump_vents_on_release() {
        let mut dio = SimDio::default();

        set_pump(&mut dio, true);
        assert!(dio.read_line(DioId::PumpEn));
        assert!(!dio.read_line(DioId::ValveEn));

        set_pump(&mut dio, false);
        assert!(!dio.read_line(DioId::PumpEn));
        assert!(dio.read_line(DioId::ValveEn));
    }

    #[test]
    fn test_gripper_active_low() {
        let mut dio = SimDio::default();

        set_gripper(&mut dio, true);
        assert!(!dio.read_line(DioId::Gripper));

        set_gripper(&mut dio, false);
        assert!(dio.read_line(DioId::Gripper));
    }
}
