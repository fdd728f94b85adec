pub mod use_cases;

pub use use_cases::conversation::{ConversationService, PasteOutcome, SubmitOutcome};
pub use use_cases::translate::TranslateUseCase;
