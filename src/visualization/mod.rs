pub mod chart;

pub use chart::{plot_scores, ScoreChart};
