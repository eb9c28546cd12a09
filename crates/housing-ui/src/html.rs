//! Server-side HTML rendering.

use std::fmt::Write;

use axum::response::Html;
use housing_core::{HousingRecord, OceanProximity, RecordTable, REQUIRED_COLUMNS};
use housing_model::PredictionSummary;

const TITLE: &str = "Housing Price Prediction System";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats a dollar amount with thousands separators, e.g. `$452,600.00`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("${sign}{grouped}.{cents}")
}

pub enum Banner {
    Success,
    Error,
    Info,
}

pub fn banner(kind: Banner, text: &str) -> String {
    let class = match kind {
        Banner::Success => "success",
        Banner::Error => "error",
        Banner::Info => "info",
    };
    format!(r#"<div class="banner {class}">{}</div>"#, escape(text))
}

pub fn page(body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Housing Price Predictor</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<h1>{TITLE}</h1>
<p>Predict median house values based on California housing data</p>
<nav><a href="/#single">Single Prediction</a><a href="/#batch">Batch Prediction</a></nav>
{body}
</body>
</html>"#
    ))
}

pub fn table(table: &RecordTable) -> String {
    let mut out = String::from("<table><thead><tr><th></th>");
    for column in table.columns() {
        let _ = write!(out, "<th>{}</th>", escape(column));
    }
    out.push_str("</tr></thead><tbody>");
    for (i, row) in table.rows().iter().enumerate() {
        let _ = write!(out, "<tr><th>{i}</th>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape(&cell.to_string()));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

fn number_input(out: &mut String, name: &str, label: &str, value: f64, step: &str, min: Option<f64>) {
    let min = min.map(|m| format!(r#" min="{m}""#)).unwrap_or_default();
    let _ = write!(
        out,
        r#"<label>{label}<input type="number" name="{name}" value="{value}" step="{step}"{min} required></label>"#
    );
}

/// The single-record form, pre-filled with `record`.
pub fn single_form(record: &HousingRecord) -> String {
    let mut out = String::from(
        r#"<h2 id="single">Enter Housing Details</h2><form method="post" action="/predict"><div class="grid">"#,
    );
    number_input(&mut out, "longitude", "Longitude", record.longitude, "0.01", None);
    number_input(&mut out, "latitude", "Latitude", record.latitude, "0.01", None);
    number_input(&mut out, "housing_median_age", "Housing Median Age", record.housing_median_age, "0.1", Some(0.0));
    number_input(&mut out, "total_rooms", "Total Rooms", record.total_rooms, "0.1", Some(0.0));
    number_input(&mut out, "total_bedrooms", "Total Bedrooms", record.total_bedrooms, "0.1", Some(0.0));
    number_input(&mut out, "population", "Population", record.population, "0.1", Some(0.0));
    number_input(&mut out, "households", "Households", record.households, "0.1", Some(0.0));
    number_input(&mut out, "median_income", "Median Income (in $10,000s)", record.median_income, "0.0001", Some(0.0));

    out.push_str(r#"<label>Ocean Proximity<select name="ocean_proximity">"#);
    for option in OceanProximity::ALL {
        let selected = if option == record.ocean_proximity { " selected" } else { "" };
        let label = escape(option.as_str());
        let _ = write!(out, r#"<option value="{label}"{selected}>{label}</option>"#);
    }
    out.push_str(r#"</select></label></div><button type="submit">Predict Price</button></form>"#);
    out
}

pub fn upload_form() -> String {
    let mut out = String::from(
        r#"<h2 id="batch">Upload CSV File for Batch Predictions</h2><p><strong>Required columns:</strong></p><ul>"#,
    );
    for column in REQUIRED_COLUMNS {
        let _ = write!(out, "<li>{column}</li>");
    }
    out.push_str(
        r#"</ul><form method="post" action="/batch/preview" enctype="multipart/form-data">
<input type="file" name="file" accept=".csv,text/csv" required>
<button type="submit">Upload</button></form>"#,
    );
    out
}

/// A form that re-posts the uploaded CSV text to `action`.
pub fn carry_form(action: &str, csv: &str, label: &str) -> String {
    format!(
        r#"<form method="post" action="{action}"><textarea class="carry" name="csv">{}</textarea><button type="submit">{}</button></form>"#,
        escape(csv),
        escape(label)
    )
}

pub fn metrics(summary: &PredictionSummary) -> String {
    let metric = |label: &str, value: f64| {
        format!(
            r#"<div class="metric"><div class="label">{label}</div><div class="value">{}</div></div>"#,
            format_currency(value)
        )
    };
    format!(
        r#"<div class="metrics">{}{}{}</div>"#,
        metric("Average Prediction", summary.mean),
        metric("Minimum", summary.min),
        metric("Maximum", summary.max)
    )
}

/// Shown in place of every page when the artifacts could not be loaded.
pub fn unavailable(model: &str, pipeline: &str) -> Html<String> {
    let body = format!(
        "{}{}",
        banner(
            Banner::Error,
            &format!("Model files not found. Please ensure {model} and {pipeline} exist.")
        ),
        banner(Banner::Info, "Train the model first, then restart this UI.")
    );
    page(&body)
}
