//! Office Open XML packages (DOCX, PPTX, XLSX) as stored ZIP archives.
//!
//! Each package repeats one element (paragraph, slide or row) carrying a
//! fixed run of text. The element count is estimated from the size of one-
//! and two-element packages and rescaled on overshoot; the last element's
//! text then absorbs whatever is left.

use crate::container::package::{self, Part};
use crate::formats::EncodeError;
use crate::reconcile::{rescale, shrink_linear};

const ELEMENT_TEXT: usize    = 100;
const MAX_TUNE_ROUNDS: usize = 4;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_OFFICE_DOC: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Docx,
    Pptx,
    Xlsx,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Docx => "docx",
            Kind::Pptx => "pptx",
            Kind::Xlsx => "xlsx",
        }
    }

    fn max_elements(self) -> usize {
        match self {
            Kind::Docx => 20_000,
            Kind::Pptx => 2_000,
            Kind::Xlsx => 50_000,
        }
    }

    fn main_part(self) -> (&'static str, &'static str) {
        match self {
            Kind::Docx => ("word/document.xml", "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"),
            Kind::Pptx => ("ppt/presentation.xml", "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
            Kind::Xlsx => ("xl/workbook.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"),
        }
    }
}

/// Text of element `i` out of `count`; the last one is `extra` bytes longer.
fn element_text(i: usize, count: usize, extra: usize) -> String {
    let len = ELEMENT_TEXT + if i + 1 == count { extra } else { 0 };
    format!("Dummy {} {}", i + 1, "0".repeat(len))
}

fn content_types(kind: Kind, overrides: &[(String, &str)]) -> String {
    let (main, main_type) = kind.main_part();
    let mut s = format!(
        "{XML_DECL}\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/{main}\" ContentType=\"{main_type}\"/>"
    );
    for (part, ctype) in overrides {
        s.push_str(&format!("<Override PartName=\"/{part}\" ContentType=\"{ctype}\"/>"));
    }
    s.push_str("</Types>");
    s
}

fn relationships(targets: &[(String, &str)]) -> String {
    let mut s = format!("{XML_DECL}\n<Relationships xmlns=\"{NS_PKG_REL}\">");
    for (i, (target, kind)) in targets.iter().enumerate() {
        s.push_str(&format!("<Relationship Id=\"rId{}\" Type=\"{kind}\" Target=\"{target}\"/>", i + 1));
    }
    s.push_str("</Relationships>");
    s
}

fn root_rels(kind: Kind) -> Part {
    Part::new("_rels/.rels", relationships(&[(kind.main_part().0.to_string(), REL_OFFICE_DOC)]))
}

fn docx_parts(count: usize, extra: usize) -> Vec<Part> {
    let mut body = format!(
        "{XML_DECL}\n<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>"
    );
    for i in 0..count {
        body.push_str(&format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", element_text(i, count, extra)));
    }
    body.push_str("<w:sectPr/></w:body></w:document>");
    vec![
        Part::new("[Content_Types].xml", content_types(Kind::Docx, &[])),
        root_rels(Kind::Docx),
        Part::new("word/document.xml", body),
    ]
}

const SLIDE_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const REL_SLIDE: &str  = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

fn slide(text: &str) -> String {
    format!(
        "{XML_DECL}\n<p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"><p:cSld><p:spTree>\
         <p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>\
         <p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Text\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr><p:spPr/>\
         <p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>\
         </p:spTree></p:cSld></p:sld>"
    )
}

fn pptx_parts(count: usize, extra: usize) -> Vec<Part> {
    let slide_names: Vec<String> = (1..=count).map(|i| format!("ppt/slides/slide{i}.xml")).collect();
    let overrides: Vec<(String, &str)> = slide_names.iter().map(|n| (n.clone(), SLIDE_TYPE)).collect();

    let mut presentation = format!(
        "{XML_DECL}\n<p:presentation xmlns:r=\"{NS_REL}\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"><p:sldIdLst>"
    );
    for i in 0..count {
        presentation.push_str(&format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 256 + i, i + 1));
    }
    presentation.push_str("</p:sldIdLst><p:sldSz cx=\"9144000\" cy=\"6858000\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/></p:presentation>");

    let targets: Vec<(String, &str)> = (1..=count).map(|i| (format!("slides/slide{i}.xml"), REL_SLIDE)).collect();

    let mut parts = vec![
        Part::new("[Content_Types].xml", content_types(Kind::Pptx, &overrides)),
        root_rels(Kind::Pptx),
        Part::new("ppt/presentation.xml", presentation),
        Part::new("ppt/_rels/presentation.xml.rels", relationships(&targets)),
    ];
    for (i, name) in slide_names.into_iter().enumerate() {
        parts.push(Part::new(name, slide(&element_text(i, count, extra))));
    }
    parts
}

const SHEET_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const REL_SHEET: &str  = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const NS_SHEET: &str   = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

fn xlsx_parts(count: usize, extra: usize) -> Vec<Part> {
    let workbook = format!(
        "{XML_DECL}\n<workbook xmlns=\"{NS_SHEET}\" xmlns:r=\"{NS_REL}\">\
         <sheets><sheet name=\"Sheet1\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>"
    );
    let mut sheet = format!("{XML_DECL}\n<worksheet xmlns=\"{NS_SHEET}\"><sheetData>");
    for i in 0..count {
        let r = i + 1;
        sheet.push_str(&format!(
            "<row r=\"{r}\"><c r=\"A{r}\"><v>{r}</v></c><c r=\"B{r}\" t=\"inlineStr\"><is><t>{}</t></is></c></row>",
            element_text(i, count, extra),
        ));
    }
    sheet.push_str("</sheetData></worksheet>");

    vec![
        Part::new(
            "[Content_Types].xml",
            content_types(Kind::Xlsx, &[("xl/worksheets/sheet1.xml".to_string(), SHEET_TYPE)]),
        ),
        root_rels(Kind::Xlsx),
        Part::new("xl/workbook.xml", workbook),
        Part::new("xl/_rels/workbook.xml.rels", relationships(&[("worksheets/sheet1.xml".to_string(), REL_SHEET)])),
        Part::new("xl/worksheets/sheet1.xml", sheet),
    ]
}

/// Serialized package with `count` elements, the last one `extra` bytes longer.
pub fn build(kind: Kind, count: usize, extra: usize) -> Result<Vec<u8>, EncodeError> {
    let parts = match kind {
        Kind::Docx => docx_parts(count, extra),
        Kind::Pptx => pptx_parts(count, extra),
        Kind::Xlsx => xlsx_parts(count, extra),
    };
    Ok(package::stored(&parts)?)
}

pub fn encode(kind: Kind, budget: usize) -> Result<Vec<u8>, EncodeError> {
    let one = build(kind, 1, 0)?.len();
    let per = build(kind, 2, 0)?.len().saturating_sub(one).max(1);
    let start = (1 + budget.saturating_sub(one) / per).min(kind.max_elements());

    let fitted = rescale(
        budget,
        start,
        1,
        |n| build(kind, n, 0),
        |n, actual| (n > 1).then(|| shrink_linear(n, actual, budget).max(1)),
    )?;
    let count = fitted.param;
    let mut bytes = fitted.bytes;

    // Stored entries grow one-for-one with their text, so one round
    // normally lands exactly.
    let mut extra = 0usize;
    for _ in 0..MAX_TUNE_ROUNDS {
        if bytes.len() >= budget {
            break;
        }
        extra += budget - bytes.len();
        bytes = build(kind, count, extra)?;
    }
    if extra > 0 && bytes.len() != budget {
        return Err(EncodeError::Layout(format!(
            "{} package is {} bytes, wanted {budget}",
            kind.name(),
            bytes.len()
        )));
    }
    Ok(bytes)
}
