//! 预导入模块，方便使用

pub use super::review_steps::{
    ActiveModel as ReviewStepActiveModel, Entity as ReviewSteps, Model as ReviewStepModel,
};
pub use super::review_summaries::{
    ActiveModel as ReviewSummaryActiveModel, Entity as ReviewSummaries,
    Model as ReviewSummaryModel,
};
pub use super::reviews::{ActiveModel as ReviewActiveModel, Entity as Reviews, Model as ReviewModel};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
