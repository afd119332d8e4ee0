pub mod post;
pub mod reset;
pub mod run;
pub mod schedule;

// Re-export command functions for convenience
pub use post::post;
pub use reset::reset_used;
pub use run::run;
pub use schedule::{set_schedule, show_schedule};
