//! Print layout: one landscape page with a single table, subjects down the
//! side and a Sem 1 / Sem 2 / Avg column group per grade level.

use crate::error::Result;
use crate::transcript::{GradeSection, SummaryRow, TranscriptView};
use anyhow::Context;
use std::fmt::Write as _;
use std::path::Path;

const PAGE_STYLE: &str = "\
@page { size: 11.7in 6.58in; margin: 0.2in; }
body { font-family: Arial, sans-serif; line-height: 1.1; margin: 0; }
.transcript-page { width: 11.7in; padding: 0.2in; box-sizing: border-box; }
.title { text-align: center; border-bottom: 2px solid #000; margin-bottom: 0.1in; }
.title h1 { font-size: 1.25em; margin: 0; }
.info { border: 1px solid #999; padding: 0.05in 0.1in; margin-bottom: 0.1in; }
.info span { margin-right: 1.5em; }
.record { border: 1px solid #000; }
.record-title { background: #e5e5e5; text-align: center; font-weight: bold; padding: 0.05in; }
table { width: 100%; border-collapse: collapse; table-layout: fixed; font-size: 0.8em; }
th, td { border: 1px solid #000; padding: 0.15em 0.3em; white-space: nowrap; overflow: hidden; }
td.num { text-align: center; font-family: monospace; }
td.avg { font-weight: bold; }
tr.summary td { font-weight: bold; }
.promoted { color: #15803d; font-weight: normal; font-size: 0.85em; }
.footer { margin-top: 0.1in; font-size: 0.85em; }
";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn cells(out: &mut String, semester1: &str, semester2: &str, year_avg: &str) {
    let _ = write!(
        out,
        "<td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num avg\">{}</td>",
        escape_html(semester1),
        escape_html(semester2),
        escape_html(year_avg)
    );
}

fn summary_row(
    out: &mut String,
    label: &str,
    sections: &[GradeSection],
    pick: fn(&GradeSection) -> &SummaryRow,
) {
    let _ = write!(out, "<tr class=\"summary\"><td>{}</td>", label);
    for s in sections {
        let r = pick(s);
        cells(out, &r.semester1, &r.semester2, &r.year_avg);
    }
    out.push_str("</tr>\n");
}

pub fn render_html(view: &TranscriptView) -> String {
    let h = &view.header;
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>Transcript - {}</title>", escape_html(&h.name));
    let _ = writeln!(out, "<style>\n{}</style>\n</head>\n<body>", PAGE_STYLE);
    out.push_str("<div class=\"transcript-page\">\n");
    out.push_str("<div class=\"title\"><h1>OFFICIAL TRANSCRIPT</h1><div>Academic Record</div></div>\n");

    let _ = writeln!(
        out,
        "<div class=\"info\"><span><b>Name:</b> {}</span><span><b>Gender:</b> {}</span>\
         <span><b>Age:</b> {}</span><span><b>Program:</b> {}</span>\
         <span><b>Academic Years:</b> {}</span></div>",
        escape_html(&h.name),
        escape_html(&h.gender),
        h.age,
        escape_html(&h.program),
        escape_html(&h.academic_years)
    );

    out.push_str("<div class=\"record\">\n");
    let _ = writeln!(
        out,
        "<div class=\"record-title\">ACADEMIC RECORD - {}</div>",
        escape_html(&h.program)
    );
    out.push_str("<table>\n<thead>\n<tr><th rowspan=\"2\">SUBJECTS</th>");
    for s in &view.sections {
        let _ = write!(out, "<th colspan=\"3\">{}", s.grade_level);
        if let Some(next) = s.promoted_to {
            let _ = write!(out, "<div class=\"promoted\">PROMOTED TO {}</div>", next);
        }
        out.push_str("</th>");
    }
    out.push_str("</tr>\n<tr>");
    for _ in &view.sections {
        out.push_str("<th>Sem 1</th><th>Sem 2</th><th>Avg</th>");
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    // every section carries the same subject rows in the same order
    let subject_count = view.sections.first().map(|s| s.rows.len()).unwrap_or(0);
    for i in 0..subject_count {
        let name = &view.sections[0].rows[i].subject;
        let _ = write!(out, "<tr><td>{}</td>", escape_html(name));
        for s in &view.sections {
            if let Some(r) = s.rows.get(i) {
                cells(&mut out, &r.semester1, &r.semester2, &r.year_avg);
            }
        }
        out.push_str("</tr>\n");
    }

    summary_row(&mut out, "TOTALS", &view.sections, |s| &s.totals);
    summary_row(&mut out, "AVERAGE", &view.sections, |s| &s.averages);
    out.push_str("<tr class=\"summary\"><td>CONDUCT</td>");
    for s in &view.sections {
        cells(
            &mut out,
            &s.conduct.semester1,
            &s.conduct.semester2,
            &s.conduct.year_avg,
        );
    }
    out.push_str("</tr>\n</tbody>\n</table>\n</div>\n");

    let _ = writeln!(
        out,
        "<div class=\"footer\">Total subjects: {} &middot; Overall average: {} &middot; Status: {}</div>",
        view.summary.total_subjects,
        view.summary.overall_average,
        escape_html(&view.summary.status)
    );
    out.push_str("</div>\n</body>\n</html>\n");
    out
}

pub fn write_html(view: &TranscriptView, out_path: &Path) -> Result<usize> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let html = render_html(view);
    std::fs::write(out_path, html.as_bytes())
        .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))?;
    Ok(html.len())
}
