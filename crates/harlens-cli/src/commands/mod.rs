pub mod analyze;
pub mod completion;
pub mod intercept;
