//! Chart payload handed to the presentation layer
//!
//! The payload serialises as a plotly-compatible figure: one line trace plus a
//! layout carrying axis titles and canvas size.

use crate::config::ChartConfig;
use crate::error::Result;
use chrono::NaiveDate;
use sales_forecast::ForecastPoint;
use serde::Serialize;

/// A figure with a single line trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub data: Vec<LineTrace>,
    pub layout: ChartLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub height: u32,
    pub width: u32,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: AxisTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standoff: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub t: u32,
    pub pad: u32,
}

impl ChartPayload {
    /// Chart the forecast window: dates on x, predicted totals on y
    pub fn from_window(window: &[ForecastPoint], config: &ChartConfig) -> Self {
        let trace = LineTrace {
            kind: "scatter",
            mode: "lines",
            x: window.iter().map(|p| p.date).collect(),
            y: window.iter().map(|p| p.predicted).collect(),
        };

        let layout = ChartLayout {
            xaxis: Axis {
                title: AxisTitle {
                    text: config.x_axis_title.clone(),
                    standoff: Some(0),
                },
            },
            yaxis: Axis {
                title: AxisTitle {
                    text: config.y_axis_title.clone(),
                    standoff: None,
                },
            },
            height: config.height,
            width: config.width,
            margin: Margin {
                t: config.margin_top,
                pad: 0,
            },
        };

        Self {
            data: vec![trace],
            layout,
        }
    }

    /// Dates of the charted window
    pub fn x(&self) -> &[NaiveDate] {
        self.data.first().map(|t| t.x.as_slice()).unwrap_or(&[])
    }

    /// Predicted totals of the charted window
    pub fn y(&self) -> &[f64] {
        self.data.first().map(|t| t.y.as_slice()).unwrap_or(&[])
    }

    /// Serialize the figure to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let window = vec![
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                predicted: 10.0,
                lower: 8.0,
                upper: 12.0,
            },
            ForecastPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                predicted: 11.5,
                lower: 9.0,
                upper: 14.0,
            },
        ];

        let payload = ChartPayload::from_window(&window, &ChartConfig::default());
        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "data": [{
                    "type": "scatter",
                    "mode": "lines",
                    "x": ["2024-01-03", "2024-01-04"],
                    "y": [10.0, 11.5]
                }],
                "layout": {
                    "xaxis": {"title": {"text": "Day", "standoff": 0}},
                    "yaxis": {"title": {"text": "Total Daily Sales ($)"}},
                    "height": 850,
                    "width": 1300,
                    "margin": {"t": 20, "pad": 0}
                }
            })
        );
    }

    #[test]
    fn test_accessors() {
        let payload = ChartPayload::from_window(&[], &ChartConfig::default());
        assert!(payload.x().is_empty());
        assert!(payload.y().is_empty());
    }
}
