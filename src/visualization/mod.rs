pub mod text_plots;

pub use text_plots::{plot_performance, plot_series, running_mean, training_progress};
