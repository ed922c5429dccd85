use chrono::NaiveDate;

use crate::model::range::DateRange;
use crate::model::record::Record;
use crate::service::store::{filter_in, sort_by_date_ascending};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub weight: f64,
    pub calories: u32,
}

/// Plot-ready series for one date range, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub range: DateRange,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    pub fn build(records: &[Record], range: &DateRange) -> Self {
        let mut in_range = filter_in(records, range);
        sort_by_date_ascending(&mut in_range);
        let points = in_range
            .into_iter()
            .map(|r| ChartPoint {
                date: r.date,
                weight: r.weight,
                calories: r.calories,
            })
            .collect();
        Self {
            range: *range,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Days since the start of the range, for the x axis.
    pub fn x_of(&self, date: NaiveDate) -> f64 {
        (date - self.range.start).num_days() as f64
    }

    pub fn weight_series(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (self.x_of(p.date), p.weight))
            .collect()
    }

    /// Weight axis bounds with a little headroom so a flat line is visible.
    pub fn weight_bounds(&self) -> Option<(f64, f64)> {
        let min = self.points.iter().map(|p| p.weight).reduce(f64::min)?;
        let max = self.points.iter().map(|p| p.weight).reduce(f64::max)?;
        let pad = ((max - min) * 0.1).max(0.5);
        Some(((min - pad).max(0.0), max + pad))
    }

    pub fn max_calories(&self) -> u32 {
        self.points.iter().map(|p| p.calories).max().unwrap_or(0)
    }

    pub fn x_bounds(&self) -> (f64, f64) {
        (0.0, self.x_of(self.range.end).max(1.0))
    }
}
