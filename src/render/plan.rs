use anyhow::Result;

use crate::config::{Layout, RenderConfig};
use crate::error::AnalysisError;
use crate::process::{partition, top_n, CountryPercentage, GRID_CHUNKS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    HorizontalBar,
    VerticalBar,
    Pie,
    Scatter,
    Line,
}

/// What to draw in one grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPlan {
    pub kind: ChartKind,
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub legend: Option<String>,
    /// `(label, percentage)` in draw order.
    pub points: Vec<(String, f64)>,
}

/// 2×2 grid, cells in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlan {
    pub cells: Vec<CellPlan>,
}

fn points(records: &[CountryPercentage]) -> Vec<(String, f64)> {
    records
        .iter()
        .map(|r| (r.label.clone(), r.percentage))
        .collect()
}

/// Decide chart kind, text and data for every cell.
///
/// Fails with [`AnalysisError::NoData`] when `records` is empty so nothing
/// reaches the drawing backend without data.
pub fn plan_grid(
    records: &[CountryPercentage],
    cfg: &RenderConfig,
    target: &str,
) -> Result<GridPlan> {
    if records.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "no country has a non-zero {target} percentage"
        ))
        .into());
    }

    let chunks = partition(records, GRID_CHUNKS);
    let metric = format!("{target} dev percentage");

    let cells = match cfg.layout {
        Layout::Classic => {
            let title = format!("Percentage of {target} know dev in each country");
            let legend = format!("{target} Dev percentage\nin each country");
            chunks
                .iter()
                .enumerate()
                .map(|(i, chunk)| {
                    let top_row = i < 2;
                    let left_col = i % 2 == 0;
                    CellPlan {
                        kind: ChartKind::HorizontalBar,
                        title: if top_row { title.clone() } else { String::new() },
                        x_desc: if top_row { String::new() } else { metric.clone() },
                        y_desc: if left_col { "Countries".into() } else { String::new() },
                        legend: Some(legend.clone()),
                        points: points(chunk),
                    }
                })
                .collect()
        }
        Layout::Mixed => {
            let head = top_n(chunks[0], cfg.pie_top_n);
            vec![
                CellPlan {
                    kind: ChartKind::Pie,
                    title: format!("Top {} countries by {metric}", head.len()),
                    x_desc: String::new(),
                    y_desc: String::new(),
                    legend: None,
                    points: points(head),
                },
                CellPlan {
                    kind: ChartKind::VerticalBar,
                    title: format!("{metric} by country"),
                    x_desc: "Countries".into(),
                    y_desc: metric.clone(),
                    legend: None,
                    points: points(chunks[1]),
                },
                CellPlan {
                    kind: ChartKind::Scatter,
                    title: String::new(),
                    x_desc: "Countries".into(),
                    y_desc: metric.clone(),
                    legend: None,
                    points: points(chunks[2]),
                },
                CellPlan {
                    kind: ChartKind::Line,
                    title: String::new(),
                    x_desc: "Countries".into(),
                    y_desc: metric.clone(),
                    legend: None,
                    points: points(chunks[3]),
                },
            ]
        }
    };

    Ok(GridPlan { cells })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<CountryPercentage> {
        (0..n)
            .map(|i| CountryPercentage {
                country: format!("Country {i}"),
                label: format!("C{i}"),
                percentage: 100.0 - i as f64,
            })
            .collect()
    }

    #[test]
    fn empty_records_are_rejected() {
        let err = plan_grid(&[], &RenderConfig::default(), "Python").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::NoData(_))
        ));
    }

    #[test]
    fn classic_layout_is_four_bar_charts() -> Result<()> {
        let data = records(10);
        let plan = plan_grid(&data, &RenderConfig::default(), "Python")?;
        assert_eq!(plan.cells.len(), 4);
        assert!(plan.cells.iter().all(|c| c.kind == ChartKind::HorizontalBar));
        assert!(plan.cells[0].title.contains("Python"));
        assert!(plan.cells[2].title.is_empty());
        assert_eq!(plan.cells[3].x_desc, "Python dev percentage");

        let flattened: Vec<(String, f64)> =
            plan.cells.iter().flat_map(|c| c.points.clone()).collect();
        assert_eq!(flattened, points(&data));
        Ok(())
    }

    #[test]
    fn mixed_layout_pie_takes_top_of_first_chunk() -> Result<()> {
        let data = records(40);
        let cfg = RenderConfig {
            layout: Layout::Mixed,
            ..RenderConfig::default()
        };
        let plan = plan_grid(&data, &cfg, "Python")?;
        let kinds: Vec<ChartKind> = plan.cells.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChartKind::Pie,
                ChartKind::VerticalBar,
                ChartKind::Scatter,
                ChartKind::Line
            ]
        );
        assert_eq!(plan.cells[0].points, points(&data[..7]));
        assert_eq!(plan.cells[1].points, points(&data[10..20]));
        assert_eq!(plan.cells[3].points, points(&data[30..40]));
        Ok(())
    }

    #[test]
    fn short_input_leaves_leading_cells_empty() -> Result<()> {
        let plan = plan_grid(&records(2), &RenderConfig::default(), "Python")?;
        assert!(plan.cells[0].points.is_empty());
        assert!(plan.cells[1].points.is_empty());
        assert_eq!(plan.cells[2].points.len(), 1);
        assert_eq!(plan.cells[3].points.len(), 1);
        Ok(())
    }
}
