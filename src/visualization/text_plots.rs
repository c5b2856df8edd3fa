/// Mean of every full window of `window` consecutive values.
///
/// The result has `values.len() - window + 1` entries and is empty when there
/// are fewer values than `window`. A window of 0 is treated as 1.
pub fn running_mean(values: &[f32], window: usize) -> Vec<f32> {
    let window = window.max(1);
    if values.len() < window {
        return Vec::new();
    }

    let mut sum: f32 = values[..window].iter().sum();
    let mut means = Vec::with_capacity(values.len() - window + 1);
    means.push(sum / window as f32);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        means.push(sum / window as f32);
    }
    means
}

/// Running mean of per-episode rewards drawn as ASCII art.
pub fn plot_performance(rewards: &[f32], window: usize, width: usize, height: usize) -> String {
    if rewards.is_empty() {
        return "No reward data available".to_string();
    }
    // Short logs still get one full window
    let window = window.clamp(1, rewards.len());
    let title = format!("Reward (running mean over {} episodes)", window);
    plot_series(&running_mean(rewards, window), &title, width, height)
}

/// Generic series plotter
pub fn plot_series(values: &[f32], title: &str, width: usize, height: usize) -> String {
    if values.is_empty() || width < 10 || height < 5 {
        return format!("{}: Invalid data or dimensions", title);
    }

    let min_val = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if (max_val - min_val).abs() < f32::EPSILON {
        return format!("{}: All values are {:.4}", title, min_val);
    }

    let mut plot = vec![vec![' '; width]; height];

    // Axes
    for row in plot.iter_mut() {
        row[0] = '|';
    }
    for cell in plot[height - 1].iter_mut() {
        *cell = '-';
    }
    plot[height - 1][0] = '+';

    // Single-point series never reach here, min == max above.
    let x_scale = (values.len() - 1) as f32 / (width - 3) as f32;
    let y_scale = (height - 3) as f32 / (max_val - min_val);

    for (i, &value) in values.iter().enumerate() {
        let x = ((i as f32 / x_scale) as usize + 2).min(width - 1);
        let level = ((value - min_val) * y_scale) as usize;
        let y = (height - 3).saturating_sub(level).min(height - 2);
        plot[y][x] = '*';
    }

    let mut output = format!("{}\n", title);
    output.push_str(&format!("Max: {:.4}\n", max_val));

    for row in plot.iter() {
        output.push_str(&row.iter().collect::<String>());
        output.push('\n');
    }

    output.push_str(&format!("Min: {:.4}\n", min_val));
    output.push_str(&format!("Points: {}\n", values.len()));

    output
}

/// One-line progress report for an episode loop.
pub fn training_progress(episode: usize, total_episodes: usize, avg_reward: f32, exploration: f32) -> String {
    let progress = if total_episodes == 0 {
        1.0
    } else {
        (episode as f32 / total_episodes as f32).min(1.0)
    };
    let bar_length = 30;
    let filled = (progress * bar_length as f32) as usize;
    let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(bar_length - filled));

    format!(
        "Episode {}/{} {} {:.1}% | Avg Reward: {:.2} | ε: {:.3}",
        episode, total_episodes, bar, progress * 100.0, avg_reward, exploration
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_mean_covers_full_windows_only() {
        let means = running_mean(&[1.0, 3.0, 5.0, 7.0], 2);
        assert_eq!(means, vec![2.0, 4.0, 6.0]);

        let means = running_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 5);
        assert_eq!(means, vec![3.0]);
    }

    #[test]
    fn test_running_mean_shorter_than_window() {
        assert!(running_mean(&[1.0, 2.0], 3).is_empty());
        assert!(running_mean(&[], 1).is_empty());
    }

    #[test]
    fn test_running_mean_zero_window_is_identity() {
        assert_eq!(running_mean(&[2.0, 4.0], 0), vec![2.0, 4.0]);
    }

    #[test]
    fn test_plot_performance_shrinks_window_for_short_logs() {
        let plot = plot_performance(&[0.0, 1.0, 2.0, 3.0], 30, 20, 8);
        assert_eq!(plot, "Reward (running mean over 4 episodes): All values are 1.5000");

        let plot = plot_performance(&[0.0, 1.0, 2.0, 3.0], 2, 20, 8);
        assert!(plot.starts_with("Reward (running mean over 2 episodes)\n"));
        assert!(plot.contains("Points: 3"));
    }

    #[test]
    fn test_plot_marks_every_point() {
        let plot = plot_series(&[0.0, 1.0, 2.0, 3.0], "Rising", 20, 8);
        assert!(plot.starts_with("Rising\n"));
        assert_eq!(plot.matches('*').count(), 4);
        assert!(plot.contains("Points: 4"));
    }

    #[test]
    fn test_flat_and_empty_series() {
        assert_eq!(plot_series(&[2.0, 2.0], "Flat", 20, 8), "Flat: All values are 2.0000");
        assert_eq!(plot_performance(&[], 30, 20, 8), "No reward data available");
    }

    #[test]
    fn test_training_progress_line() {
        let line = training_progress(5, 10, 1.5, 0.25);
        assert!(line.starts_with("Episode 5/10"));
        assert!(line.contains("50.0%"));
    }
}
