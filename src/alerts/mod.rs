pub mod events;

pub use events::{AlertEvent, AlertLog};
