use base64::Engine as _;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analytics::series::NormalizedSeries;
use crate::error::{AppError, AppResult};
use crate::models::journal::EmotionScores;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 540;
const GROUPED_HEIGHT: u32 = 810;
const RADAR_SIZE: u32 = 600;

/// Emotion groups used by the grouped panels and the balance chart.
pub const POSITIVE_GROUP: [&str; 5] = ["happiness", "joy", "love", "relief", "gratitude"];
pub const NEGATIVE_GROUP: [&str; 4] = ["sadness", "fear", "anger", "disgust"];
pub const OTHER_GROUP: [&str; 2] = ["surprise", "confusion"];

/// One fixed color per emotion dimension, aligned with the declared order.
const DIM_COLORS: [RGBColor; 11] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
    RGBColor(255, 152, 150),
];

const POSITIVE_COLOR: RGBColor = RGBColor(44, 160, 44);
const NEGATIVE_COLOR: RGBColor = RGBColor(214, 39, 40);
const NEUTRAL_COLOR: RGBColor = RGBColor(127, 127, 127);

/// The fixed set of chart artifacts derived from one normalized series,
/// each a base64-encoded PNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizationBundle {
    pub emotion_line_plot: String,
    pub emotion_grouped_plot: String,
    pub emotion_heatmap: String,
    pub dominant_emotions_plot: String,
    pub emotion_balance_plot: String,
    pub sentiment_line_plot: String,
    pub emotion_radar_chart: String,
}

/// Render every chart from the same series. Stateless: identical input
/// yields identical numeric content. The assembler gates on `NoData` before
/// this point, so an empty series here is a defensive failure.
pub fn render_all(series: &NormalizedSeries) -> AppResult<VisualizationBundle> {
    if series.is_empty() {
        return Err(AppError::Render(
            "cannot render charts for an empty series".into(),
        ));
    }

    Ok(VisualizationBundle {
        emotion_line_plot: emotion_line_plot(series)?,
        emotion_grouped_plot: emotion_grouped_plot(series)?,
        emotion_heatmap: emotion_heatmap(series)?,
        dominant_emotions_plot: dominant_emotions_plot(series)?,
        emotion_balance_plot: emotion_balance_plot(series)?,
        sentiment_line_plot: sentiment_line_plot(series)?,
        emotion_radar_chart: emotion_radar_chart(series)?,
    })
}

// ── numeric helpers ─────────────────────────────────────────────────────
// Kept separate from rendering so the chart semantics are testable without
// producing pixels.

/// Emotion dimensions with at least one non-zero value, declared order.
pub fn active_dimensions(series: &NormalizedSeries) -> Vec<(&'static str, Vec<i32>)> {
    series
        .emotions
        .dimensions()
        .into_iter()
        .filter(|(_, values)| values.iter().any(|v| *v != 0))
        .map(|(name, values)| (name, values.to_vec()))
        .collect()
}

/// Top-3 emotions at one entry index, descending by score, ties broken by
/// declared name order, zero and negative scores excluded.
pub fn top_emotions_at(series: &NormalizedSeries, idx: usize) -> Vec<(&'static str, i32)> {
    let scores = series.emotions.at(idx);
    let mut ranked: Vec<(&'static str, i32)> = scores.iter().collect();
    // Stable sort keeps declared order within equal scores.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(3);
    ranked.retain(|(_, v)| *v > 0);
    ranked
}

/// Per-index positive/negative group sums as percentages of their total.
/// When both sums are zero the denominator is substituted with 1, so both
/// percentages come out 0 instead of dividing by zero.
pub fn balance_percentages(series: &NormalizedSeries) -> Vec<(f64, f64)> {
    (0..series.len())
        .map(|i| {
            let e = series.emotions.at(i);
            let pos = (e.happiness + e.joy + e.love + e.relief + e.gratitude) as f64;
            let neg = (e.sadness + e.fear + e.anger + e.disgust) as f64;
            let denom = if pos + neg == 0.0 { 1.0 } else { pos + neg };
            (pos / denom * 100.0, neg / denom * 100.0)
        })
        .collect()
}

/// Mean score per emotion dimension across the series, 0 for empty vectors.
pub fn emotion_means(series: &NormalizedSeries) -> [(&'static str, f64); 11] {
    series.emotions.dimensions().map(|(name, values)| {
        let mean = if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<i32>() as f64 / values.len() as f64
        };
        (name, mean)
    })
}

fn dim_color(name: &str) -> RGBColor {
    let idx = EmotionScores::NAMES
        .iter()
        .position(|n| *n == name)
        .unwrap_or(0);
    DIM_COLORS[idx]
}

fn render_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Render(e.to_string())
}

fn encode_png(buf: Vec<u8>, width: u32, height: u32) -> AppResult<String> {
    let img = image::RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| AppError::Render("image buffer size mismatch".into()))?;
    let mut png = std::io::Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png)
        .map_err(render_err)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(png.get_ref()))
}

fn x_axis_max(n: usize) -> i32 {
    (n.saturating_sub(1)).max(1) as i32
}

// ── charts ──────────────────────────────────────────────────────────────

/// One line per emotion dimension with at least one non-zero value.
fn emotion_line_plot(series: &NormalizedSeries) -> AppResult<String> {
    let n = series.len();
    let active = active_dimensions(series);
    let y_max = active
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .max()
        .unwrap_or(10)
        .max(10);

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Emotions Over The Week", ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(40)
            .build_cartesian_2d(0..x_axis_max(n), 0..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(n.min(10))
            .x_label_formatter(&|x| {
                series.dates.get(*x as usize).cloned().unwrap_or_default()
            })
            .y_desc("score")
            .draw()
            .map_err(render_err)?;

        for (name, values) in &active {
            let color = dim_color(name);
            chart
                .draw_series(LineSeries::new(
                    values.iter().enumerate().map(|(i, v)| (i as i32, *v)),
                    color.stroke_width(2),
                ))
                .map_err(render_err)?
                .label(*name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    encode_png(buf, WIDTH, HEIGHT)
}

/// Three stacked panels partitioning the emotions into positive, negative
/// and other groups. Panels only plot dimensions with a non-zero value;
/// y-axis fixed 0-10.
fn emotion_grouped_plot(series: &NormalizedSeries) -> AppResult<String> {
    let n = series.len();
    let active = active_dimensions(series);
    let panels: [(&str, &[&str]); 3] = [
        ("Positive Emotions", &POSITIVE_GROUP),
        ("Negative Emotions", &NEGATIVE_GROUP),
        ("Other Emotions", &OTHER_GROUP),
    ];

    let mut buf = vec![0u8; (WIDTH * GROUPED_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buf, (WIDTH, GROUPED_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let areas = root.split_evenly((3, 1));

        for (area, (title, group)) in areas.iter().zip(panels) {
            let mut chart = ChartBuilder::on(area)
                .caption(title, ("sans-serif", 18))
                .margin(10)
                .x_label_area_size(32)
                .y_label_area_size(36)
                .build_cartesian_2d(0..x_axis_max(n), 0..10)
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .x_labels(n.min(10))
                .x_label_formatter(&|x| {
                    series.dates.get(*x as usize).cloned().unwrap_or_default()
                })
                .draw()
                .map_err(render_err)?;

            for (name, values) in active.iter().filter(|(name, _)| group.contains(name)) {
                let color = dim_color(name);
                chart
                    .draw_series(LineSeries::new(
                        values.iter().enumerate().map(|(i, v)| (i as i32, *v)),
                        color.stroke_width(2),
                    ))
                    .map_err(render_err)?
                    .label(*name)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                    });
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(&BLACK)
                .draw()
                .map_err(render_err)?;
        }

        root.present().map_err(render_err)?;
    }
    encode_png(buf, WIDTH, GROUPED_HEIGHT)
}

fn heat_color(value: i32) -> RGBColor {
    // Fixed 0-10 scale, pale yellow to deep red.
    let t = (value.clamp(0, 10) as f64) / 10.0;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;
    RGBColor(lerp(255, 178), lerp(245, 24), lerp(200, 43))
}

/// Matrix of emotion rows x date columns with numeric annotations.
fn emotion_heatmap(series: &NormalizedSeries) -> AppResult<String> {
    let n = series.len();
    let rows = active_dimensions(series);
    let nrows = rows.len().max(1);

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Emotion Heatmap", ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(90)
            .build_cartesian_2d(0..n as i32, 0..nrows as i32)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n.min(10))
            .x_label_formatter(&|x| {
                series.dates.get(*x as usize).cloned().unwrap_or_default()
            })
            .y_labels(nrows)
            .y_label_formatter(&|y| {
                rows.get(*y as usize)
                    .map(|(name, _)| name.to_string())
                    .unwrap_or_default()
            })
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(rows.iter().enumerate().flat_map(|(r, (_, values))| {
                values.iter().enumerate().map(move |(c, v)| {
                    Rectangle::new(
                        [(c as i32, r as i32), (c as i32 + 1, r as i32 + 1)],
                        heat_color(*v).filled(),
                    )
                })
            }))
            .map_err(render_err)?;

        chart
            .draw_series(rows.iter().enumerate().flat_map(|(r, (_, values))| {
                values.iter().enumerate().map(move |(c, v)| {
                    Text::new(
                        v.to_string(),
                        (c as i32, r as i32),
                        ("sans-serif", 14).into_font().color(&BLACK),
                    )
                })
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    encode_png(buf, WIDTH, HEIGHT)
}

/// Each day's top-3 strictly-positive emotions as points with a drop-line
/// to zero; one legend entry per emotion across the whole chart.
fn dominant_emotions_plot(series: &NormalizedSeries) -> AppResult<String> {
    let n = series.len();

    // Group the per-index top-3 points by emotion so each dimension draws
    // (and labels) exactly once.
    let mut points_by_emotion: Vec<(&'static str, Vec<(i32, i32)>)> = EmotionScores::NAMES
        .into_iter()
        .map(|name| (name, Vec::new()))
        .collect();
    for idx in 0..n {
        for (name, score) in top_emotions_at(series, idx) {
            if let Some(pos) = EmotionScores::NAMES.iter().position(|n| *n == name) {
                points_by_emotion[pos].1.push((idx as i32, score));
            }
        }
    }

    let y_max = points_by_emotion
        .iter()
        .flat_map(|(_, pts)| pts.iter().map(|(_, y)| *y))
        .max()
        .unwrap_or(10)
        .max(10);

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Dominant Emotions Per Day", ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(40)
            .build_cartesian_2d(0..x_axis_max(n), 0..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(n.min(10))
            .x_label_formatter(&|x| {
                series.dates.get(*x as usize).cloned().unwrap_or_default()
            })
            .y_desc("score")
            .draw()
            .map_err(render_err)?;

        for (name, points) in points_by_emotion.iter().filter(|(_, p)| !p.is_empty()) {
            let color = dim_color(name);

            chart
                .draw_series(points.iter().map(|(x, y)| {
                    PathElement::new(vec![(*x, 0), (*x, *y)], color.mix(0.45))
                }))
                .map_err(render_err)?;

            chart
                .draw_series(
                    points
                        .iter()
                        .map(|(x, y)| Circle::new((*x, *y), 5, color.filled())),
                )
                .map_err(render_err)?
                .label(*name)
                .legend(move |(x, y)| Circle::new((x + 9, y), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    encode_png(buf, WIDTH, HEIGHT)
}

/// Positive vs negative group share per entry index, stacked to 100%.
fn emotion_balance_plot(series: &NormalizedSeries) -> AppResult<String> {
    let n = series.len();
    let pcts = balance_percentages(series);
    let x_max = (n.saturating_sub(1)).max(1) as f64;

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Emotional Balance", ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0..x_max, 0.0..100.0)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(n.min(10))
            .x_label_formatter(&|x| {
                let idx = x.round() as usize;
                if (x - idx as f64).abs() < 1e-6 {
                    series.dates.get(idx).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .y_desc("% of emotional signal")
            .draw()
            .map_err(render_err)?;

        // Negative share sits on top of the positive band: draw the full
        // stacked height first, then overlay the positive band from zero.
        chart
            .draw_series(AreaSeries::new(
                pcts.iter()
                    .enumerate()
                    .map(|(i, (p, neg))| (i as f64, p + neg)),
                0.0,
                NEGATIVE_COLOR.mix(0.5),
            ))
            .map_err(render_err)?
            .label("negative")
            .legend(|(x, y)| {
                Rectangle::new([(x, y - 5), (x + 14, y + 5)], NEGATIVE_COLOR.mix(0.5).filled())
            });

        chart
            .draw_series(AreaSeries::new(
                pcts.iter().enumerate().map(|(i, (p, _))| (i as f64, *p)),
                0.0,
                POSITIVE_COLOR.mix(0.5),
            ))
            .map_err(render_err)?
            .label("positive")
            .legend(|(x, y)| {
                Rectangle::new([(x, y - 5), (x + 14, y + 5)], POSITIVE_COLOR.mix(0.5).filled())
            });

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    encode_png(buf, WIDTH, HEIGHT)
}

/// All three sentiment dimensions, always plotted regardless of zeros.
fn sentiment_line_plot(series: &NormalizedSeries) -> AppResult<String> {
    let n = series.len();
    let y_max = series
        .sentiments
        .dimensions()
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .max()
        .unwrap_or(10)
        .max(10);

    let colors = [POSITIVE_COLOR, NEGATIVE_COLOR, NEUTRAL_COLOR];

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Sentiment Over The Week", ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(40)
            .build_cartesian_2d(0..x_axis_max(n), 0..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(n.min(10))
            .x_label_formatter(&|x| {
                series.dates.get(*x as usize).cloned().unwrap_or_default()
            })
            .y_desc("score")
            .draw()
            .map_err(render_err)?;

        for ((name, values), color) in series.sentiments.dimensions().into_iter().zip(colors) {
            chart
                .draw_series(LineSeries::new(
                    values.iter().enumerate().map(|(i, v)| (i as i32, *v)),
                    color.stroke_width(2),
                ))
                .map_err(render_err)?
                .label(name)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    encode_png(buf, WIDTH, HEIGHT)
}

/// Closed polar plot of per-emotion means, axes evenly spaced over the
/// eleven dimensions in declared order, radial scale fixed 0-10.
fn emotion_radar_chart(series: &NormalizedSeries) -> AppResult<String> {
    let means = emotion_means(series);
    let dims = means.len();
    let angle = |i: usize| {
        -std::f64::consts::FRAC_PI_2 + (i as f64) * std::f64::consts::TAU / dims as f64
    };
    let point = |i: usize, r: f64| (r * angle(i).cos(), r * angle(i).sin());

    let mut buf = vec![0u8; (RADAR_SIZE * RADAR_SIZE * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buf, (RADAR_SIZE, RADAR_SIZE)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Average Emotions", ("sans-serif", 24))
            .margin(12)
            .build_cartesian_2d(-12.5..12.5, -12.5..12.5)
            .map_err(render_err)?;

        let grid = RGBColor(200, 200, 200);

        // Radial grid rings at 2.5 score intervals.
        for ring in [2.5, 5.0, 7.5, 10.0] {
            let outline: Vec<(f64, f64)> = (0..=dims).map(|i| point(i % dims, ring)).collect();
            chart
                .draw_series(std::iter::once(PathElement::new(outline, grid.stroke_width(1))))
                .map_err(render_err)?;
        }

        // One spoke and label per dimension.
        for (i, (name, _)) in means.iter().enumerate() {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(0.0, 0.0), point(i, 10.0)],
                    grid.stroke_width(1),
                )))
                .map_err(render_err)?;
            chart
                .draw_series(std::iter::once(Text::new(
                    name.to_string(),
                    point(i, 10.8),
                    ("sans-serif", 14).into_font().color(&BLACK),
                )))
                .map_err(render_err)?;
        }

        // Closed mean polygon: first axis repeated at the end.
        let polygon: Vec<(f64, f64)> = means
            .iter()
            .enumerate()
            .map(|(i, (_, mean))| point(i, *mean))
            .chain(std::iter::once(point(0, means[0].1)))
            .collect();

        chart
            .draw_series(std::iter::once(Polygon::new(
                polygon.clone(),
                DIM_COLORS[0].mix(0.3),
            )))
            .map_err(render_err)?;
        chart
            .draw_series(std::iter::once(PathElement::new(
                polygon,
                DIM_COLORS[0].stroke_width(2),
            )))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    encode_png(buf, RADAR_SIZE, RADAR_SIZE)
}
