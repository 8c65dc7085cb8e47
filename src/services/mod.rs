pub mod callback_normalizer;

pub use callback_normalizer::CallbackService;
