pub mod alert;
pub mod habit;
pub mod ot;
pub mod plan;
pub mod settings;
pub mod task;

pub use alert::{Alert, AlertSchedule};
pub use habit::{Habit, HabitEntry};
pub use ot::OtEntry;
pub use plan::{DayPlan, Feedback, FeedbackRating, Slot, SlotStatus};
pub use settings::Settings;
pub use task::{Task, TaskKind, TaskSchedule, TaskStats};
