//! Minimal WordprocessingML writer for the transcript document.
//!
//! The package holds only the three parts a word processor needs to open a
//! document: `[Content_Types].xml`, `_rels/.rels` and `word/document.xml`.

use crate::error::{Error, Result};
use crate::exchange::sha256_hex;
use crate::render::escape_html as escape_xml;
use crate::transcript::{GradeSection, TranscriptView};
use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";
const RELS_ENTRY: &str = "_rels/.rels";
const DOCUMENT_ENTRY: &str = "word/document.xml";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

#[derive(Debug, Clone)]
pub struct DocxSummary {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// `Abebe Kebede Alemu` + G11-G12 -> `Abebe_Kebede_Alemu_G11-G12.docx`
pub fn default_file_name(view: &TranscriptView) -> String {
    let name: String = view
        .header
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}.docx", name, view.header.template)
}

#[derive(Clone, Copy, Default)]
struct Run {
    bold: bool,
    italic: bool,
    /// Half-points, as Word stores font sizes.
    size: Option<u32>,
}

#[derive(Default)]
struct Body {
    xml: String,
}

impl Body {
    fn run(&mut self, text: &str, style: Run) {
        self.xml.push_str("<w:r>");
        if style.bold || style.italic || style.size.is_some() {
            self.xml.push_str("<w:rPr>");
            if style.bold {
                self.xml.push_str("<w:b/>");
            }
            if style.italic {
                self.xml.push_str("<w:i/>");
            }
            if let Some(sz) = style.size {
                self.xml.push_str(&format!("<w:sz w:val=\"{}\"/>", sz));
            }
            self.xml.push_str("</w:rPr>");
        }
        self.xml.push_str(&format!(
            "<w:t xml:space=\"preserve\">{}</w:t></w:r>",
            escape_xml(text)
        ));
    }

    fn paragraph(&mut self, text: &str, style: Run, centered: bool) {
        self.xml.push_str("<w:p>");
        if centered {
            self.xml.push_str("<w:pPr><w:jc w:val=\"center\"/></w:pPr>");
        }
        self.run(text, style);
        self.xml.push_str("</w:p>");
    }

    fn table(&mut self, rows: &[Vec<(String, Run)>]) {
        self.xml.push_str(
            "<w:tbl><w:tblPr><w:tblW w:w=\"5000\" w:type=\"pct\"/><w:tblBorders>\
             <w:top w:val=\"single\" w:sz=\"4\"/><w:left w:val=\"single\" w:sz=\"4\"/>\
             <w:bottom w:val=\"single\" w:sz=\"4\"/><w:right w:val=\"single\" w:sz=\"4\"/>\
             <w:insideH w:val=\"single\" w:sz=\"4\"/><w:insideV w:val=\"single\" w:sz=\"4\"/>\
             </w:tblBorders></w:tblPr>",
        );
        for row in rows {
            self.xml.push_str("<w:tr>");
            for (text, style) in row {
                self.xml.push_str("<w:tc>");
                self.paragraph(text, *style, false);
                self.xml.push_str("</w:tc>");
            }
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl>");
    }
}

const PLAIN: Run = Run {
    bold: false,
    italic: false,
    size: None,
};
const BOLD: Run = Run {
    bold: true,
    italic: false,
    size: None,
};

fn heading(size: u32) -> Run {
    Run {
        bold: true,
        italic: false,
        size: Some(size),
    }
}

fn cell(text: &str, style: Run) -> (String, Run) {
    (text.to_string(), style)
}

fn section_rows(s: &GradeSection) -> Vec<Vec<(String, Run)>> {
    let mut rows = vec![vec![
        cell("SUBJECT", BOLD),
        cell("SEM 1", BOLD),
        cell("SEM 2", BOLD),
        cell("YEAR AVG", BOLD),
    ]];
    for r in &s.rows {
        rows.push(vec![
            cell(&r.subject, BOLD),
            cell(&r.semester1, PLAIN),
            cell(&r.semester2, PLAIN),
            cell(&r.year_avg, BOLD),
        ]);
    }
    for (label, a, b, c) in [
        ("TOTALS", &s.totals.semester1, &s.totals.semester2, &s.totals.year_avg),
        ("AVERAGE", &s.averages.semester1, &s.averages.semester2, &s.averages.year_avg),
        ("CONDUCT", &s.conduct.semester1, &s.conduct.semester2, &s.conduct.year_avg),
    ] {
        rows.push(vec![cell(label, BOLD), cell(a, BOLD), cell(b, BOLD), cell(c, BOLD)]);
    }
    rows
}

/// Builds `word/document.xml` from the assembled view.
pub fn document_xml(view: &TranscriptView, generated_on: &str, document_id: &str) -> String {
    let h = &view.header;
    let mut body = Body::default();

    body.paragraph("OFFICIAL TRANSCRIPT", heading(32), true);
    body.paragraph("Academic Record", Run { size: Some(24), ..PLAIN }, true);

    body.paragraph("STUDENT INFORMATION", heading(24), false);
    let age = h.age.to_string();
    body.table(&[
        vec![cell("Name:", BOLD), cell(&h.name, heading(24))],
        vec![cell("Gender:", BOLD), cell(&h.gender, PLAIN)],
        vec![cell("Age:", BOLD), cell(&age, PLAIN)],
        vec![cell("Academic Years:", BOLD), cell(&h.academic_years, PLAIN)],
        vec![cell("Program:", BOLD), cell(&h.program, PLAIN)],
    ]);

    body.paragraph("ACADEMIC RECORD", heading(24), false);
    for s in &view.sections {
        let title = match s.promoted_to {
            Some(next) => format!("{} Academic Record (PROMOTED TO {})", s.grade_level, next),
            None => format!("{} Academic Record", s.grade_level),
        };
        body.paragraph(&title, heading(20), false);
        body.table(&section_rows(s));
    }

    body.paragraph("ACADEMIC SUMMARY", heading(24), false);
    let total = view.summary.total_subjects.to_string();
    let average = format!("{}%", view.summary.overall_average);
    body.table(&[
        vec![cell("Total Subjects:", BOLD), cell(&total, PLAIN)],
        vec![cell("Overall Average:", BOLD), cell(&average, heading(24))],
        vec![cell("Academic Status:", BOLD), cell(&view.summary.status, BOLD)],
    ]);

    let italic = Run { italic: true, ..PLAIN };
    body.paragraph(&format!("Generated on: {}", generated_on), italic, false);
    body.paragraph(
        &format!("Document ID: {}", document_id),
        Run { size: Some(16), ..italic },
        false,
    );

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}<w:sectPr><w:pgSz w:w=\"16838\" w:h=\"11906\" w:orient=\"landscape\"/>\
         <w:pgMar w:top=\"720\" w:right=\"720\" w:bottom=\"720\" w:left=\"720\"/></w:sectPr>\
         </w:body></w:document>",
        body.xml
    )
}

fn write_package(out_file: File, document: &str) -> anyhow::Result<()> {
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (entry, content) in [
        (CONTENT_TYPES_ENTRY, CONTENT_TYPES_XML),
        (RELS_ENTRY, RELS_XML),
        (DOCUMENT_ENTRY, document),
    ] {
        zip.start_file(entry, opts)
            .with_context(|| format!("failed to start {} entry", entry))?;
        zip.write_all(content.as_bytes())
            .with_context(|| format!("failed to write {} entry", entry))?;
    }
    zip.finish().context("failed to finalize docx package")?;
    Ok(())
}

/// Creates `out_path` and hands it to `write`. A failed write removes the
/// partial file.
fn write_or_remove<F>(out_path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> anyhow::Result<()>,
{
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    if let Err(e) = write(out_file) {
        if let Err(rm) = std::fs::remove_file(out_path) {
            warn!(path = %out_path.display(), error = %rm, "failed to remove partial document");
        }
        return Err(e.into());
    }
    Ok(())
}

pub fn export_docx(view: &TranscriptView, document_id: &str, out_path: &Path) -> Result<DocxSummary> {
    if view.summary.total_subjects == 0 {
        return Err(Error::export("add some grades first"));
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let generated_on = chrono::Local::now().format("%Y-%m-%d").to_string();
    let document = document_xml(view, &generated_on, document_id);
    write_or_remove(out_path, |out_file| write_package(out_file, &document))?;

    let written = std::fs::read(out_path)
        .with_context(|| format!("failed to read back {}", out_path.to_string_lossy()))?;
    let summary = DocxSummary {
        path: out_path.to_path_buf(),
        bytes: written.len() as u64,
        sha256: sha256_hex(&written),
    };
    info!(path = %out_path.display(), bytes = summary.bytes, "exported transcript document");
    Ok(summary)
}
