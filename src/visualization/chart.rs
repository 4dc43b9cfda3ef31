use std::path::{Path, PathBuf};
use tracing::debug;

use crate::metrics::TrainingHistory;

pub type ChartResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Chart sink for the score history. Scores are drawn in blue, the running
/// average in red. Write failures are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct ScoreChart {
    path: PathBuf,
}

impl ScoreChart {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ScoreChart { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn update(&self, history: &TrainingHistory) {
        if let Err(err) = plot_scores(&self.path, history) {
            debug!(path = %self.path.display(), error = %err, "score chart not written");
        }
    }
}

#[cfg(feature = "plot")]
pub fn plot_scores(path: &Path, history: &TrainingHistory) -> ChartResult {
    use plotters::prelude::*;

    if history.scores.is_empty() {
        return Ok(());
    }

    let x_max = history.episodes.last().copied().unwrap_or(0).max(1) as f64;
    let y_max = history.scores.iter().copied().max().unwrap_or(1).max(1) as f64 * 1.05;

    let root = BitMapBackend::new(path, (1800, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    chart.draw_series(LineSeries::new(
        history
            .episodes
            .iter()
            .zip(&history.scores)
            .map(|(&e, &s)| (e as f64, s as f64)),
        &BLUE,
    ))?;
    chart.draw_series(LineSeries::new(
        history
            .episodes
            .iter()
            .zip(&history.averages)
            .map(|(&e, &a)| (e as f64, a)),
        &RED,
    ))?;

    root.present()?;
    Ok(())
}

#[cfg(not(feature = "plot"))]
pub fn plot_scores(_path: &Path, _history: &TrainingHistory) -> ChartResult {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> TrainingHistory {
        TrainingHistory {
            episodes: vec![0, 1, 2],
            scores: vec![10, 20, 30],
            averages: vec![10.0, 15.0, 20.0],
            epsilons: vec![1.0, 1.0, 0.99],
            losses: vec![None, Some(0.5), Some(0.25)],
        }
    }

    #[test]
    fn missing_directory_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let chart = ScoreChart::new(dir.path().join("absent").join("scores.png"));
        chart.update(&history());
        assert!(!chart.path().exists());
    }

    #[cfg(feature = "plot")]
    #[test]
    fn writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.png");
        plot_scores(&path, &history()).unwrap();
        assert!(path.exists());
    }
}
