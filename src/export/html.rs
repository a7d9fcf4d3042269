//! Self-contained HTML rendering of a [`Report`].

use crate::core::format::{Trend, format_table};
use crate::export::report::{Report, ReportSection};
use std::fmt::Write;

/// Escapes text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn stylesheet() -> String {
    let mut css = String::from(
        "body{font-family:Arial,Helvetica,sans-serif;background:#0b0f19;color:#e5e7eb;margin:24px;}\n\
         h1{margin:0 0 4px 0;}\n\
         .ts{color:#9ca3af;margin-bottom:16px;}\n\
         .card{background:#111827;border:1px solid #374151;border-radius:10px;padding:14px;margin-bottom:18px;}\n\
         .card h2{font-size:18px;margin:0 0 8px 0;}\n\
         .summary{color:#9ca3af;font-size:13px;margin:0 0 8px 0;}\n\
         .tbl{border-collapse:collapse;width:100%;font-size:14px;}\n\
         .tbl th,.tbl td{border:1px solid #374151;padding:6px 8px;}\n\
         .tbl th{background:#1f2937;text-align:left;}\n\
         .tbl td:not(:first-child){text-align:right;}\n",
    );
    for trend in [Trend::Up, Trend::Down, Trend::Flat] {
        let _ = writeln!(css, ".{}{{color:{};}}", trend.css_class(), trend.css_color());
    }
    css
}

fn render_section(out: &mut String, section: &ReportSection) {
    let formatted = format_table(&section.table);

    out.push_str("<div class=\"card\">\n");
    let _ = writeln!(out, "<h2>{}</h2>", escape(&section.caption));
    if !section.summary.is_empty() {
        let _ = writeln!(out, "<p class=\"summary\">{}</p>", escape(&section.summary));
    }

    out.push_str("<table class=\"tbl\">\n<thead><tr><th>Name</th>");
    for column in &formatted.header {
        let _ = write!(out, "<th>{}</th>", escape(column));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for (name, cells) in &formatted.rows {
        let _ = write!(out, "<tr><td>{}</td>", escape(name));
        for cell in cells {
            let _ = write!(
                out,
                "<td class=\"{}\">{}</td>",
                cell.trend.css_class(),
                escape(&cell.text)
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n</div>\n");
}

/// Renders the report as a complete HTML document.
pub fn render_html(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(&report.title));
    let _ = writeln!(out, "<style>\n{}</style>", stylesheet());
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "<h1>{}</h1>", escape(&report.title));
    let _ = writeln!(out, "<div class=\"ts\">Updated: {}</div>", report.timestamp());

    for section in &report.sections {
        render_section(&mut out, section);
    }

    out.push_str("</body>\n</html>\n");
    out
}
