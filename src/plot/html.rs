//! Standalone Highstock page rendering

use super::series::HighchartSeries;
use crate::config::PlotConfig;
use anyhow::{Context, Result};

/// Page options for [`highstock_line`]
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub title: Option<String>,
    pub width: String,
    pub height: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: None,
            width: "800px".to_string(),
            height: "600px".to_string(),
        }
    }
}

impl From<&PlotConfig> for ChartOptions {
    fn from(config: &PlotConfig) -> Self {
        Self {
            title: None,
            width: config.width.clone(),
            height: config.height.clone(),
        }
    }
}

impl ChartOptions {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// Escape text for a single-quoted JS string inside a `<script>` block
fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\x3c"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a double-quoted HTML attribute
fn attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}

/// Render a percent-compare Highstock line chart as a full HTML page
pub fn highstock_line(series: &[HighchartSeries], options: &ChartOptions) -> Result<String> {
    // `<` only occurs inside JSON strings, where `\u003c` decodes to the same character
    let data = serde_json::to_string(series)
        .context("Failed to serialize chart series")?
        .replace('<', "\\u003c");
    let title = js_string(options.title.as_deref().unwrap_or(""));
    let width = attr(&options.width);
    let height = attr(&options.height);

    let html = format!(r##"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <script src="https://code.jquery.com/jquery-3.1.1.min.js"></script>
    <script src="https://code.highcharts.com/stock/highstock.js"></script>
    <script src="https://code.highcharts.com/stock/modules/exporting.js"></script>
    <script src="https://code.highcharts.com/stock/modules/export-data.js"></script>
</head>
<body>

<div id="container" style="width: {width}; height: {height}; margin: 125px auto"></div>

<script language="JavaScript">
    Highcharts.stockChart('container', {{

        series : {data},

        rangeSelector: {{
            selected: 4
        }},

        tooltip: {{
            pointFormat: '<span style="color:{{series.color}}">{{series.name}}</span>: <b>{{point.y}}</b> ({{point.change}}%)<br/>',
            valueDecimals: 2,
            split: true
        }},

        yAxis: {{
            labels: {{
                formatter: function () {{
                    return (this.value > 0 ? ' + ' : '') + this.value + '%';
                }}
            }},
            plotLines: [{{
                value: 0,
                width: 2,
                color: 'silver'
            }}]
        }},

        plotOptions: {{
            series: {{
                compare: 'percent'
            }}
        }},

        legend: {{
            enabled: true
        }},

        title: {{
            text: '{title}'
        }},

    }});
</script>

</body>
</html>
"##);

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<HighchartSeries> {
        vec![HighchartSeries {
            name: "Fund".to_string(),
            data: vec![(1_437_004_800_000, Some(1000.0)), (1_437_091_200_000, None)],
        }]
    }

    #[test]
    fn test_page_contains_data_and_layout() {
        let options = ChartOptions {
            width: "1024px".to_string(),
            ..ChartOptions::default()
        }
        .with_title("Fund VAMI");

        let html = highstock_line(&series(), &options).unwrap();

        assert!(html.contains(r#"series : [{"name":"Fund","data":[[1437004800000,1000.0],[1437091200000,null]]}]"#));
        assert!(html.contains("width: 1024px; height: 600px"));
        assert!(html.contains("text: 'Fund VAMI'"));
        assert!(html.contains("compare: 'percent'"));
        assert!(html.contains("selected: 4"));
        assert!(html.contains("{point.y}"));
    }

    #[test]
    fn test_default_title_is_empty() {
        let html = highstock_line(&series(), &ChartOptions::default()).unwrap();
        assert!(html.contains("text: ''"));
        assert!(html.contains("width: 800px"));
    }

    #[test]
    fn test_title_and_names_are_escaped() {
        let mut s = series();
        s[0].name = "</script><b>".to_string();
        let options = ChartOptions::default().with_title("Shawn's </script> fund");

        let html = highstock_line(&s, &options).unwrap();

        assert!(html.contains(r"text: 'Shawn\'s \x3c/script> fund'"));
        assert!(html.contains(r#""name":"\u003c/script>\u003cb>""#));
        assert_eq!(html.matches("</script>").count(), 5);
    }

    #[test]
    fn test_options_from_config() {
        let config = PlotConfig {
            width: "100%".to_string(),
            height: "400px".to_string(),
        };
        let options = ChartOptions::from(&config);
        assert_eq!(options.width, "100%");
        assert!(options.title.is_none());
    }
}
