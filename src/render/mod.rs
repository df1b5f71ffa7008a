// src/render/mod.rs
pub mod plan;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use std::{fs, path::Path};
use tracing::info;

pub use plan::{plan_grid, CellPlan, ChartKind, GridPlan};

const BACKGROUND: RGBColor = BLACK;
const FOREGROUND: RGBColor = WHITE;
const BAR: RGBColor = RGBColor(31, 119, 180);
const POINT: RGBColor = RGBColor(255, 127, 14);
const PIE_COLORS: [RGBColor; 7] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
];

fn text(size: f64) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal).color(&FOREGROUND)
}

fn axis_max(points: &[(String, f64)]) -> f64 {
    let max = points.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    (max * 1.15).clamp(1.0, 100.0)
}

fn segment_label(labels: &[&str], v: &SegmentValue<i32>) -> String {
    match v {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .map(|s| s.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Draw `plan` into `path`. An `.svg` extension selects the SVG backend,
/// anything else the bitmap backend (format from the extension).
#[tracing::instrument(level = "info", skip(plan, path), fields(path = %path.as_ref().display()))]
pub fn render_grid<P: AsRef<Path>>(plan: &GridPlan, path: P, size: (u32, u32)) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    if is_svg {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_grid(&root, plan)?;
        root.present().context("writing svg")?;
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw_grid(&root, plan)?;
        root.present().context("writing image")?;
    }

    info!("chart grid saved");
    Ok(())
}

fn draw_grid<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, plan: &GridPlan) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&BACKGROUND)?;
    let areas = root.split_evenly((2, 2));
    for (area, cell) in areas.iter().zip(&plan.cells) {
        if cell.points.is_empty() {
            draw_empty(area, cell)?;
            continue;
        }
        match cell.kind {
            ChartKind::HorizontalBar => draw_horizontal_bar(area, cell)?,
            ChartKind::Pie => draw_pie(area, cell)?,
            ChartKind::VerticalBar | ChartKind::Scatter | ChartKind::Line => {
                draw_categorical(area, cell)?
            }
        }
    }
    Ok(())
}

fn draw_empty<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, cell: &CellPlan) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let area = if cell.title.is_empty() {
        area.clone()
    } else {
        area.titled(&cell.title, text(18.0))?
    };
    let (w, h) = area.dim_in_pixel();
    area.draw_text("no data", &text(16.0), (w as i32 / 2 - 30, h as i32 / 2))?;
    Ok(())
}

fn draw_horizontal_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    cell: &CellPlan,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let labels: Vec<&str> = cell.points.iter().map(|(l, _)| l.as_str()).collect();
    let n = labels.len() as i32;

    let mut builder = ChartBuilder::on(area);
    builder.margin(10).x_label_area_size(35).y_label_area_size(120);
    if !cell.title.is_empty() {
        builder.caption(&cell.title, text(18.0));
    }
    let mut chart =
        builder.build_cartesian_2d(0f64..axis_max(&cell.points), (0..n).into_segmented())?;

    let y_fmt = |v: &SegmentValue<i32>| segment_label(&labels, v);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(labels.len())
        .y_label_formatter(&y_fmt)
        .x_desc(cell.x_desc.as_str())
        .y_desc(cell.y_desc.as_str())
        .axis_style(FOREGROUND)
        .bold_line_style(FOREGROUND.mix(0.15))
        .light_line_style(TRANSPARENT)
        .label_style(text(12.0))
        .axis_desc_style(text(14.0))
        .draw()?;

    let series = chart.draw_series(cell.points.iter().enumerate().map(|(i, (_, v))| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [(0.0, SegmentValue::Exact(i)), (*v, SegmentValue::Exact(i + 1))],
            BAR.filled(),
        );
        bar.set_margin(2, 2, 0, 0);
        bar
    }))?;

    if let Some(legend) = &cell.legend {
        series
            .label(legend.as_str())
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], BAR.filled()));
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(BACKGROUND.mix(0.8))
            .border_style(FOREGROUND)
            .label_font(text(11.0))
            .draw()?;
    }
    Ok(())
}

/// Vertical bar, scatter and line cells share a category x axis.
fn draw_categorical<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    cell: &CellPlan,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let labels: Vec<&str> = cell.points.iter().map(|(l, _)| l.as_str()).collect();
    let n = labels.len() as i32;

    let mut builder = ChartBuilder::on(area);
    builder.margin(10).x_label_area_size(70).y_label_area_size(50);
    if !cell.title.is_empty() {
        builder.caption(&cell.title, text(18.0));
    }
    let mut chart =
        builder.build_cartesian_2d((0..n).into_segmented(), 0f64..axis_max(&cell.points))?;

    let x_fmt = |v: &SegmentValue<i32>| segment_label(&labels, v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&x_fmt)
        .label_style(text(12.0))
        // after label_style, which sets both axes
        .x_label_style(text(11.0).transform(FontTransform::Rotate90))
        .x_desc(cell.x_desc.as_str())
        .y_desc(cell.y_desc.as_str())
        .axis_style(FOREGROUND)
        .bold_line_style(FOREGROUND.mix(0.15))
        .light_line_style(TRANSPARENT)
        .axis_desc_style(text(14.0))
        .draw()?;

    let centers = cell
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (SegmentValue::CenterOf(i as i32), *v));

    match cell.kind {
        ChartKind::VerticalBar => {
            chart.draw_series(cell.points.iter().enumerate().map(|(i, (_, v))| {
                let i = i as i32;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                    BAR.filled(),
                );
                bar.set_margin(0, 0, 3, 3);
                bar
            }))?;
        }
        ChartKind::Scatter => {
            chart.draw_series(centers.map(|c| Circle::new(c, 4, POINT.filled())))?;
        }
        _ => {
            chart.draw_series(LineSeries::new(centers.clone(), BAR.stroke_width(2)))?;
            chart.draw_series(centers.map(|c| Circle::new(c, 3, BAR.filled())))?;
        }
    }
    Ok(())
}

fn draw_pie<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, cell: &CellPlan) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let area = if cell.title.is_empty() {
        area.clone()
    } else {
        area.titled(&cell.title, text(18.0))?
    };

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;

    let sizes: Vec<f64> = cell.points.iter().map(|(_, v)| *v).collect();
    let labels: Vec<&str> = cell.points.iter().map(|(l, _)| l.as_str()).collect();
    let colors: Vec<RGBColor> = (0..sizes.len())
        .map(|i| PIE_COLORS[i % PIE_COLORS.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(text(13.0));
    pie.percentages(
        FontDesc::new(FontFamily::SansSerif, 11.0, FontStyle::Normal).color(&BACKGROUND),
    );
    area.draw(&pie)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, RenderConfig};
    use crate::process::CountryPercentage;
    use tempfile::tempdir;

    #[test]
    fn axis_max_is_padded_and_bounded() {
        assert_eq!(axis_max(&[]), 1.0);
        assert_eq!(axis_max(&[("a".into(), 100.0)]), 100.0);
        assert!((axis_max(&[("a".into(), 40.0)]) - 46.0).abs() < 1e-9);
    }

    #[test]
    fn segment_labels_only_at_centers() {
        let labels = ["US", "FR"];
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(1)), "FR");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(2)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(-1)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::Exact(0)), "");
    }

    fn records(n: usize) -> Vec<CountryPercentage> {
        (0..n)
            .map(|i| CountryPercentage {
                country: format!("Country {i}"),
                label: format!("C{i}"),
                percentage: 60.0 - 4.0 * i as f64,
            })
            .collect()
    }

    #[test]
    fn renders_both_layouts_to_svg_and_png() -> Result<()> {
        let dir = tempdir()?;
        for layout in [Layout::Classic, Layout::Mixed] {
            let cfg = RenderConfig {
                layout,
                ..RenderConfig::default()
            };
            let plan = plan_grid(&records(13), &cfg, "Python")?;
            for ext in ["svg", "png"] {
                let out = dir.path().join(format!("{layout:?}.{ext}"));
                render_grid(&plan, &out, (800, 600))?;
                assert!(fs::metadata(&out)?.len() > 0);
            }
        }
        Ok(())
    }

    #[test]
    fn sparse_grid_draws_empty_cells() -> Result<()> {
        let dir = tempdir()?;
        let cfg = RenderConfig {
            layout: Layout::Mixed,
            ..RenderConfig::default()
        };
        let plan = plan_grid(&records(2), &cfg, "Python")?;
        assert!(plan.cells.iter().any(|c| c.points.is_empty()));

        let out = dir.path().join("nested/sparse.svg");
        render_grid(&plan, &out, (800, 600))?;
        let svg = fs::read_to_string(&out)?;
        assert!(svg.contains("no data"));
        Ok(())
    }
}
