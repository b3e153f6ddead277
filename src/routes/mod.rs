pub mod students;

pub mod submissions;

pub mod reviews;

pub mod review_steps;

pub mod review_summaries;

pub mod keys;

pub mod system;

pub use keys::configure_keys_routes;
pub use review_steps::configure_review_steps_routes;
pub use review_summaries::configure_review_summaries_routes;
pub use reviews::configure_reviews_routes;
pub use students::configure_students_routes;
pub use submissions::configure_submissions_routes;
pub use system::configure_system_routes;
