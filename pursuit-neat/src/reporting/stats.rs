use serde::{Deserialize, Serialize};

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
    /// Population standard deviation.
    pub stdev: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence,
    /// or `None` if it is empty.
    ///
    /// # Examples
    /// ```
    /// use pursuit_neat::reporting::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied()).unwrap();
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// assert!(Stats::from(std::iter::empty()).is_none());
    /// ```
    pub fn from(data: impl Iterator<Item = f32>) -> Option<Stats> {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return None;
        }
        data.sort_by(f32::total_cmp);

        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        let mean = mean(&data);
        let variance = data.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / data.len() as f32;

        Some(Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean,
            median,
            stdev: variance.sqrt(),
        })
    }
}

pub(crate) fn mean(data: &[f32]) -> f32 {
    data.iter().sum::<f32>() / data.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_length_median_and_stdev() {
        let stats = Stats::from([4.0, 2.0, 8.0, 6.0].iter().copied()).unwrap();
        assert_eq!(stats.median, 5.0);
        assert_eq!(stats.mean, 5.0);
        assert!((stats.stdev - 5.0f32.sqrt()).abs() < 1e-6);
    }
}
