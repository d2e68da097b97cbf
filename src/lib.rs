//! Heat timer: configure a number of heats and a delay between them, then
//! time two lanes per heat with independently stoppable stopwatches.
//!
//! The library is browser-independent apart from [`web_timers`]. Session
//! logic runs against the [`timer::TimerDriver`] trait, so the same
//! [`session::SessionController`] drives the Yew front-end through
//! [`web_timers::GlooTimers`] and headless runs through
//! [`timer::ManualTimers`].
//!
//! ```
//! use heat_timer::{ManualTimers, SchedulePolicy, Screen, SessionController};
//!
//! let mut controller = SessionController::new(ManualTimers::new());
//! controller
//!     .start_from_input("3", "5s", SchedulePolicy::Chained, 0.0)
//!     .unwrap();
//! controller.advance_to(10_000.0);
//! assert_eq!(controller.session().unwrap().heat_count(), 3);
//! controller.advance_to(15_000.0);
//! assert_eq!(controller.screen(), Screen::Complete);
//! ```

pub mod config;
pub mod error;
pub mod heat;
pub mod session;
pub mod timer;
pub mod utils;
pub mod web_timers;

pub use error::SessionError;
pub use heat::{Heat, Lane, LANE_COUNT};
pub use session::{
    SchedulePolicy, Screen, Session, SessionConfig, SessionController, SessionPhase,
    SessionReport,
};
pub use timer::{ManualTimers, TimerDriver, TimerEvent, TimerId};
