pub mod deck;
pub mod flashcard;
pub mod learning_session;
pub mod rating;
pub mod review_state;
pub mod scheduler;
pub mod sm2;

pub use deck::Deck;
pub use flashcard::Flashcard;
pub use learning_session::{RatingOutcome, StudySession};
pub use rating::{Feedback, Rating};
pub use review_state::{LearningStage, ReviewState, Reviewable};
pub use scheduler::ReviewScheduler;
pub use sm2::DueLabel;
