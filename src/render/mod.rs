//! Presentation layer: server-rendered SVG charts, HTML pages, CSV export.
//!
//! The core hands this module the historical tail and the forecast rows;
//! nothing here feeds back into the computation.

use plotters::prelude::*;

use crate::error::{AppError, Result};
use crate::types::{City, ForecastRow, Page, Reading, RenderRequest};

/// How many trailing historical points the charts show.
pub const HISTORY_TAIL: usize = 100;

const CHART_SIZE: (u32, u32) = (900, 360);
const ORANGE: RGBColor = RGBColor(255, 140, 0);

type ChartResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Tail of the historical series shown on the dashboard.
pub fn history_tail(history: &[Reading]) -> &[Reading] {
    &history[history.len().saturating_sub(HISTORY_TAIL)..]
}

fn value_bounds<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}

fn date_labels(dates: &[chrono::NaiveDate]) -> impl Fn(&usize) -> String + '_ {
    move |idx: &usize| {
        dates
            .get(*idx)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Historical AQI trend over the last 100 points, blue line.
pub fn history_chart(city: City, tail: &[Reading]) -> Result<String> {
    draw_chart(&format!("Historical AQI - {city}"), tail, &[], false)
        .map_err(|e| AppError::Render(e.to_string()))
}

/// 7-day forecast alone, orange dashed line with markers.
pub fn forecast_chart(city: City, rows: &[ForecastRow]) -> Result<String> {
    draw_chart(&format!("7-Day AQI Forecast - {city}"), &[], rows, false)
        .map_err(|e| AppError::Render(e.to_string()))
}

/// History tail and forecast overlaid in one view.
pub fn combined_chart(city: City, tail: &[Reading], rows: &[ForecastRow]) -> Result<String> {
    draw_chart(&format!("AQI Trend and Forecast - {city}"), tail, rows, true)
        .map_err(|e| AppError::Render(e.to_string()))
}

/// Shared chart body. The x axis is the point index; labels are resolved
/// back to calendar dates so history and forecast share one scale.
fn draw_chart(
    title: &str,
    tail: &[Reading],
    rows: &[ForecastRow],
    with_legend: bool,
) -> ChartResult<String> {
    let dates: Vec<chrono::NaiveDate> = tail
        .iter()
        .map(|r| r.date)
        .chain(rows.iter().map(|r| r.date))
        .collect();
    let n = dates.len().max(1);
    let (y_min, y_max) = value_bounds(
        tail.iter()
            .map(|r| &r.aqi)
            .chain(rows.iter().map(|r| &r.predicted_aqi)),
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0usize..n, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&date_labels(&dates))
            .x_desc("Date")
            .y_desc("AQI")
            .draw()?;

        if !tail.is_empty() {
            let series = chart.draw_series(LineSeries::new(
                tail.iter().enumerate().map(|(i, r)| (i, r.aqi)),
                &BLUE,
            ))?;
            if with_legend {
                series
                    .label("Historical AQI")
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
            }
        }

        if !rows.is_empty() {
            let offset = tail.len();
            let series = chart.draw_series(LineSeries::new(
                rows.iter()
                    .enumerate()
                    .map(|(i, r)| (offset + i, r.predicted_aqi)),
                &ORANGE,
            ))?;
            if with_legend {
                series
                    .label("Forecast AQI")
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE));
            }
            chart.draw_series(
                rows.iter()
                    .enumerate()
                    .map(|(i, r)| Circle::new((offset + i, r.predicted_aqi), 3, ORANGE.filled())),
            )?;
        }

        if with_legend {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
    }
    Ok(svg)
}

/// Download filename: `<city>_7day_aqi_forecast.csv`, city lower-cased.
pub fn csv_filename(city: City) -> String {
    format!("{}_7day_aqi_forecast.csv", city.name().to_lowercase())
}

/// Forecast table as UTF-8 CSV with exactly three columns.
pub fn forecast_csv(rows: &[ForecastRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Predicted AQI", "Category"])?;
    for row in rows {
        writer.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", row.predicted_aqi),
            row.category.label().to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Render(e.to_string()))
}

fn forecast_table(rows: &[ForecastRow]) -> String {
    let mut html = String::from(
        "<table>\n<tr><th>Date</th><th>Predicted AQI</th><th>Category</th></tr>\n",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.2}</td><td>{}</td></tr>\n",
            row.date.format("%Y-%m-%d"),
            row.predicted_aqi,
            row.category.label()
        ));
    }
    html.push_str("</table>\n");
    html
}

fn nav(req: &RenderRequest) -> String {
    let city = req.city.name();
    let page_links = format!(
        "<a href=\"/?page=forecast&amp;city={city}\"{}>City Forecast</a> \
         <a href=\"/?page=comparison\"{}>City Comparison</a>",
        if req.page == Page::Forecast { " class=\"active\"" } else { "" },
        if req.page == Page::Comparison { " class=\"active\"" } else { "" },
    );
    let city_links: String = City::ALL
        .iter()
        .map(|c| {
            format!(
                "<a href=\"/?page=forecast&amp;city={}\"{}>{}</a> ",
                c.name(),
                if *c == req.city { " class=\"active\"" } else { "" },
                c.name()
            )
        })
        .collect();
    format!("<nav>{page_links}</nav>\n<nav class=\"cities\">{city_links}</nav>\n")
}

fn page_shell(title: &str, nav: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2em; }}\n\
         nav a {{ margin-right: 1em; }}\n\
         nav a.active {{ font-weight: bold; }}\n\
         table {{ border-collapse: collapse; }}\n\
         td, th {{ border: 1px solid #999; padding: 0.3em 0.8em; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n{nav}{body}</body>\n</html>\n"
    )
}

/// The forecast page: three charts, the table, the download link.
pub fn dashboard_page(
    req: &RenderRequest,
    history: &[Reading],
    rows: &[ForecastRow],
) -> Result<String> {
    let city = req.city;
    let tail = history_tail(history);

    let body = format!(
        "<h2>Selected City: {city}</h2>\n\
         <h3>Historical AQI Trend</h3>\n{}\n\
         <h3>AQI Forecast (Next 7 Days)</h3>\n{}\n\
         <h3>Historical + Forecast AQI (Combined View)</h3>\n{}\n\
         <h3>7-Day AQI Forecast (Table)</h3>\n{}\n\
         <p><a href=\"/download/{}\" download>Download Forecast as CSV</a></p>\n",
        history_chart(city, tail)?,
        forecast_chart(city, rows)?,
        combined_chart(city, tail, rows)?,
        forecast_table(rows),
        city.slug(),
    );

    Ok(page_shell(
        "Air Quality Index (AQI) Forecast System",
        &nav(req),
        &body,
    ))
}

/// The comparison page: a pre-rendered dashboard image, no data binding.
pub fn comparison_page(req: &RenderRequest) -> String {
    let body = "<p>City-wise AQI comparison dashboard: Delhi vs Bengaluru vs TVM trends, \
                historical comparison, seasonal patterns and summary KPIs.</p>\n\
                <img src=\"/static/aqi_powerbi.png\" alt=\"City-wise AQI comparison\" \
                style=\"max-width: 100%;\">\n";
    page_shell("City-wise AQI Comparison Dashboard", &nav(req), body)
}

/// Report-and-halt page for a fatal render error.
pub fn error_page(err: &AppError) -> String {
    let body = format!("<p class=\"error\">{err}</p>\n");
    page_shell(
        "Air Quality Index (AQI) Forecast System",
        &nav(&RenderRequest::default()),
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::AqiCategory;
    use chrono::NaiveDate;

    fn sample_rows() -> Vec<ForecastRow> {
        (1..=7)
            .map(|d| {
                let aqi = 100.0 + d as f64;
                ForecastRow {
                    date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                    predicted_aqi: aqi,
                    category: AqiCategory::from_aqi(aqi),
                }
            })
            .collect()
    }

    fn sample_history(n: usize) -> Vec<Reading> {
        (0..n)
            .map(|i| Reading {
                date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                aqi: 80.0 + (i % 40) as f64,
            })
            .collect()
    }

    #[test]
    fn csv_has_three_columns_and_seven_rows() {
        let csv = forecast_csv(&sample_rows()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "Date,Predicted AQI,Category");
        let data: Vec<&str> = lines.collect();
        assert_eq!(data.len(), 7);
        assert_eq!(data[0], "2024-01-01,101.00,Moderate");
    }

    #[test]
    fn csv_filename_lowercases_city_name() {
        assert_eq!(csv_filename(City::Delhi), "delhi_7day_aqi_forecast.csv");
        assert_eq!(
            csv_filename(City::Bengaluru),
            "bengaluru_7day_aqi_forecast.csv"
        );
        assert_eq!(csv_filename(City::Tvm), "tvm_7day_aqi_forecast.csv");
    }

    #[test]
    fn history_tail_caps_at_100_points() {
        let history = sample_history(250);
        let tail = history_tail(&history);
        assert_eq!(tail.len(), 100);
        assert_eq!(tail[99].date, history[249].date);

        let short = sample_history(30);
        assert_eq!(history_tail(&short).len(), 30);
    }

    #[test]
    fn charts_produce_svg() {
        let history = sample_history(120);
        let rows = sample_rows();
        let tail = history_tail(&history);

        let svg = history_chart(City::Delhi, tail).unwrap();
        assert!(svg.contains("<svg"));

        let svg = forecast_chart(City::Delhi, &rows).unwrap();
        assert!(svg.contains("<svg"));

        let svg = combined_chart(City::Delhi, tail, &rows).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn dashboard_page_contains_table_and_download_link() {
        let req = RenderRequest::default();
        let history = sample_history(50);
        let html = dashboard_page(&req, &history, &sample_rows()).unwrap();
        assert!(html.contains("Selected City: Delhi"));
        assert!(html.contains("<table>"));
        assert!(html.contains("/download/delhi"));
    }

    #[test]
    fn comparison_page_embeds_static_image() {
        let req = RenderRequest {
            page: Page::Comparison,
            city: City::Delhi,
        };
        let html = comparison_page(&req);
        assert!(html.contains("/static/aqi_powerbi.png"));
    }
}
