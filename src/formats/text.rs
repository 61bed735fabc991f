//! Text formats. Each has a fixed prologue and epilogue around repeated
//! records; the bytes left over after whole records widen the last record
//! or become insignificant whitespace.

use serde::Serialize;

use super::EncodeError;
use crate::reconcile::remaining;

const RECORD_ZEROS: usize = 100;

/// `txt`, `md`, `css`, `js`, `yaml`, `sql`: ASCII zeros.
pub fn plain(budget: usize) -> Vec<u8> {
    vec![b'0'; budget]
}

// ── JSON ─────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    kind:       &'a str,
    size_bytes: usize,
    data:       String,
}

pub fn json(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let empty = Envelope { kind: "dummy_file", size_bytes: budget, data: String::new() };
    let base = serde_json::to_vec(&empty)?.len();
    match remaining(budget, base) {
        Some(extra) => {
            let full = Envelope { data: "0".repeat(extra), ..empty };
            Ok(serde_json::to_vec(&full)?)
        }
        None if budget == base => Ok(serde_json::to_vec(&empty)?),
        None if budget > 2 => {
            let mut out = Vec::with_capacity(budget);
            out.push(b'{');
            out.resize(budget - 1, b' ');
            out.push(b'}');
            Ok(out)
        }
        None => Ok(b"{}".to_vec()),
    }
}

// ── CSV ──────────────────────────────────────────────────────────────────────

const CSV_HEADER: &str = "id,name,value\n";
/// `N,dummy,` and a newline around an empty value.
const CSV_MIN_ROW: usize = 9;

pub fn csv(budget: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(budget.max(CSV_HEADER.len()));
    out.extend_from_slice(CSV_HEADER.as_bytes());
    let zeros = "0".repeat(RECORD_ZEROS);
    let mut id = 1usize;
    let mut rows = 0usize;
    loop {
        let row_len = digits(id) + ",dummy,".len() + RECORD_ZEROS + 1;
        if out.len() + row_len > budget {
            break;
        }
        out.extend_from_slice(format!("{id},dummy,{zeros}\n").as_bytes());
        id += 1;
        rows += 1;
    }
    let Some(left) = remaining(budget, out.len()) else { return out };
    if rows > 0 {
        out.pop();
        out.resize(out.len() + left, b'0');
        out.push(b'\n');
    } else if left >= CSV_MIN_ROW {
        out.extend_from_slice(b"1,dummy,");
        out.resize(budget - 1, b'0');
        out.push(b'\n');
    } else {
        out.resize(budget, b'\n');
    }
    out
}

fn digits(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

// ── XML ──────────────────────────────────────────────────────────────────────

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\n";
const XML_FOOTER: &str = "</root>";
const XML_OPEN: &str   = "<data>";
const XML_CLOSE: &str  = "</data>\n";

pub fn xml(budget: usize) -> Vec<u8> {
    let skeleton = XML_HEADER.len() + XML_FOOTER.len();
    let mut out = Vec::with_capacity(budget.max(skeleton));
    out.extend_from_slice(XML_HEADER.as_bytes());
    if let Some(avail) = remaining(budget, skeleton) {
        let bare = XML_OPEN.len() + XML_CLOSE.len();
        let unit = bare + RECORD_ZEROS;
        let count = avail / unit;
        let left = avail % unit;
        if count == 0 && left < bare {
            out.resize(out.len() + left, b' ');
        } else {
            let (count, last) = if count == 0 { (1, left - bare) } else { (count, RECORD_ZEROS + left) };
            for i in 0..count {
                let zeros = if i + 1 == count { last } else { RECORD_ZEROS };
                out.extend_from_slice(XML_OPEN.as_bytes());
                out.resize(out.len() + zeros, b'0');
                out.extend_from_slice(XML_CLOSE.as_bytes());
            }
        }
    }
    out.extend_from_slice(XML_FOOTER.as_bytes());
    out
}

// ── HTML ─────────────────────────────────────────────────────────────────────

const HTML_HEADER: &str = "<!DOCTYPE html>\n<html>\n<head><title>Dummy File</title></head>\n<body>\n  <div>";
const HTML_FOOTER: &str = "</div>\n</body>\n</html>";

pub fn html(budget: usize) -> Vec<u8> {
    let skeleton = HTML_HEADER.len() + HTML_FOOTER.len();
    let mut out = Vec::with_capacity(budget.max(skeleton));
    out.extend_from_slice(HTML_HEADER.as_bytes());
    out.resize(out.len() + remaining(budget, skeleton).unwrap_or(0), b'0');
    out.extend_from_slice(HTML_FOOTER.as_bytes());
    out
}

// ── SVG ──────────────────────────────────────────────────────────────────────

const SVG_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"256\" height=\"256\" viewBox=\"0 0 256 256\">\n  \
<rect width=\"256\" height=\"256\" fill=\"#f0f0f0\"/>\n  <g>";
const SVG_FOOTER: &str = "\n  </g>\n</svg>";
const SVG_COMMENT: usize = "<!---->".len();

fn circle(i: usize) -> String {
    format!(
        "\n    <circle cx=\"{}\" cy=\"{}\" r=\"5\" fill=\"#{:02x}{:02x}{:02x}\"/>",
        (i * 10) % 256,
        (i * 10 / 256) % 256,
        (i * 7) % 256,
        (i * 11) % 256,
        (i * 13) % 256,
    )
}

pub fn svg(budget: usize) -> Vec<u8> {
    let skeleton = SVG_HEADER.len() + SVG_FOOTER.len();
    let mut out = Vec::with_capacity(budget.max(skeleton));
    out.extend_from_slice(SVG_HEADER.as_bytes());
    let limit = budget.saturating_sub(SVG_FOOTER.len());
    let mut i = 0;
    loop {
        let c = circle(i);
        if out.len() + c.len() > limit {
            break;
        }
        out.extend_from_slice(c.as_bytes());
        i += 1;
    }
    if let Some(left) = remaining(limit, out.len()) {
        if left >= SVG_COMMENT {
            out.extend_from_slice(b"<!--");
            out.resize(out.len() + left - SVG_COMMENT, b'0');
            out.extend_from_slice(b"-->");
        } else {
            out.resize(out.len() + left, b' ');
        }
    }
    out.extend_from_slice(SVG_FOOTER.as_bytes());
    out
}

// ── RTF ──────────────────────────────────────────────────────────────────────

const RTF_HEADER: &str = "{\\rtf1\\ansi\\deff0 {\\fonttbl {\\f0 Times New Roman;}}\\f0\\fs24 ";
const RTF_FOOTER: &str = "}";

pub fn rtf(budget: usize) -> Vec<u8> {
    let skeleton = RTF_HEADER.len() + RTF_FOOTER.len();
    let mut out = Vec::with_capacity(budget.max(skeleton));
    out.extend_from_slice(RTF_HEADER.as_bytes());
    let limit = budget.saturating_sub(RTF_FOOTER.len());
    let filler = "0".repeat(RECORD_ZEROS / 2);
    let mut n = 1;
    loop {
        let para = format!("\\par Dummy paragraph {}. Content: {}", n, filler);
        if out.len() + para.len() > limit {
            break;
        }
        out.extend_from_slice(para.as_bytes());
        n += 1;
    }
    // plain text after a control word's delimiting space
    if out.len() < limit {
        out.resize(limit, b'0');
    }
    out.extend_from_slice(RTF_FOOTER.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sizes() {
        for budget in [0, 1, 2, 3, 40, 1000, 65_536] {
            let out = json(budget).unwrap();
            assert_eq!(out.len(), budget.max(2), "budget {}", budget);
            let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
            assert!(v.is_object());
        }
        let out = json(1000).unwrap();
        assert_eq!(out[0], b'{');
        assert_eq!(*out.last().unwrap(), b'}');
    }

    #[test]
    fn csv_rows_stay_well_formed() {
        for budget in [0, 14, 20, 23, 124, 125, 5000, 100_001] {
            let out = csv(budget);
            assert_eq!(out.len(), budget.max(CSV_HEADER.len()), "budget {}", budget);
            let text = String::from_utf8(out).unwrap();
            for line in text.lines().skip(1).filter(|l| !l.is_empty()) {
                assert_eq!(line.split(',').count(), 3, "{}", line);
            }
        }
    }

    #[test]
    fn csv_rows_are_numbered() {
        let text = String::from_utf8(csv(10_000)).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert!(rows.len() > 2);
        for (i, row) in rows.iter().enumerate() {
            let mut cols = row.split(',');
            assert_eq!(cols.next(), Some((i + 1).to_string().as_str()));
            assert_eq!(cols.next(), Some("dummy"));
            assert!(cols.next().unwrap().bytes().all(|b| b == b'0'));
        }
    }

    #[test]
    fn xml_and_html_exact() {
        let floor = XML_HEADER.len() + XML_FOOTER.len();
        for budget in [floor, floor + 1, floor + 13, floor + 14, floor + 200, 1_000_000] {
            let out = xml(budget);
            assert_eq!(out.len(), budget);
            assert!(out.ends_with(b"</root>"));
        }
        assert_eq!(xml(0).len(), floor);
        let out = html(4096);
        assert_eq!(out.len(), 4096);
        assert!(out.starts_with(b"<!DOCTYPE html>"));
    }

    #[test]
    fn svg_and_rtf_exact() {
        for budget in [300, 301, 306, 1024, 77_777] {
            let out = svg(budget);
            assert_eq!(out.len(), budget);
            assert!(out.ends_with(b"</svg>"));
            let r = rtf(budget);
            assert_eq!(r.len(), budget);
            assert!(r.starts_with(b"{\\rtf1"));
        }
    }

    #[test]
    fn digit_count() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(12345), 5);
    }
}
