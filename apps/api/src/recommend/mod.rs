pub mod experience_fit;
pub mod recommender;
