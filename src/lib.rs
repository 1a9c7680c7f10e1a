pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod formulas;
pub mod grading;
pub mod graph;
pub mod logger;
pub mod models;
pub mod render;
pub mod segment;
pub mod session;
pub mod store;
pub mod table;
pub mod ui;
pub mod utils;

// Re-exports for convenience
pub use error::{DraftError, QuizError, Result};
pub use grading::{Score, Submission, grade};
pub use models::{AppState, Problem, ProblemKind};
pub use render::{MathRenderer, RenderError, UnicodeRenderer};
pub use segment::{Segment, join, segment};
pub use session::{QuizRunner, handle_quiz_input};
pub use store::{MemoryStorage, ProblemStore, SessionStorage};
pub use utils::calculate_wrapped_cursor_position;
