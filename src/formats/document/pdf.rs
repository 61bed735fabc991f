//! PDF 1.4 written by hand.
//!
//! Objects: 1 catalog, 2 page tree, 3 Helvetica, then a page and its content
//! stream for every page. The page count is rescaled to the budget and the
//! remainder goes into a comment line right after the header, before any
//! object, so the cross-reference offsets are computed with it in place.

use std::io::{self, Write};

use crate::formats::EncodeError;
use crate::reconcile::{rescale, shrink_linear};

const LINES_PER_PAGE: usize = 40;
const MAX_PAGES: usize      = 10_000;
/// Rough bytes per page for the first estimate.
const PAGE_ESTIMATE: usize  = 4_000;
const MAX_FILL_ROUNDS: usize = 4;

fn content_stream(page: usize) -> String {
    let mut s = format!("BT /F1 12 Tf 50 750 Td (Page {page}) Tj ET\n");
    for line in 0..LINES_PER_PAGE {
        let y = 700 - line * 15;
        s.push_str(&format!(
            "BT /F1 10 Tf 50 {y} Td (Line {} of page {page}. Dummy content: {}) Tj ET\n",
            line + 1,
            "0".repeat(50),
        ));
    }
    s
}

/// `fill` bytes of header comment: nothing, a blank line, or `%000…\n`.
fn fill_comment(fill: usize) -> Vec<u8> {
    match fill {
        0 => Vec::new(),
        1 => b"\n".to_vec(),
        n => {
            let mut c = vec![b'0'; n];
            c[0] = b'%';
            c[n - 1] = b'\n';
            c
        }
    }
}

pub fn document(pages: usize, fill: usize) -> io::Result<Vec<u8>> {
    let objects = 3 + 2 * pages;
    let mut out = Vec::with_capacity(pages * PAGE_ESTIMATE + fill + 1024);
    let mut offsets = Vec::with_capacity(objects);

    out.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;
    out.write_all(&fill_comment(fill))?;

    offsets.push(out.len());
    out.write_all(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n")?;

    offsets.push(out.len());
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    write!(out, "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n", kids.join(" "), pages)?;

    offsets.push(out.len());
    out.write_all(b"3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n")?;

    for i in 0..pages {
        let page_obj = 4 + 2 * i;
        offsets.push(out.len());
        write!(
            out,
            "{page_obj} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>\nendobj\n",
            page_obj + 1,
        )?;
        let content = content_stream(i + 1);
        offsets.push(out.len());
        write!(out, "{} 0 obj\n<< /Length {} >>\nstream\n{content}endstream\nendobj\n", page_obj + 1, content.len())?;
    }

    let xref = out.len();
    write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects + 1)?;
    for off in &offsets {
        write!(out, "{off:010} 00000 n \n")?;
    }
    write!(out, "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n", objects + 1)?;
    Ok(out)
}

pub fn encode(budget: usize) -> Result<Vec<u8>, EncodeError> {
    let start = (budget / PAGE_ESTIMATE).clamp(1, MAX_PAGES);
    let fitted = rescale(
        budget,
        start,
        1,
        |n| document(n, 0),
        |n, actual| (n > 1).then(|| shrink_linear(n, actual, budget).max(1)),
    )?;
    let pages = fitted.param;
    let mut bytes = fitted.bytes;

    // The startxref value can gain a digit as the comment grows, so the
    // fill is corrected a few times rather than computed once.
    let mut fill = 0usize;
    for _ in 0..MAX_FILL_ROUNDS {
        if bytes.len() == budget || (bytes.len() > budget && fill == 0) {
            break;
        }
        if bytes.len() < budget {
            fill += budget - bytes.len();
        } else {
            fill = fill.saturating_sub(bytes.len() - budget);
        }
        bytes = document(pages, fill)?;
    }
    if bytes.len() > budget && fill > 0 {
        fill = fill.saturating_sub(bytes.len() - budget);
        bytes = document(pages, fill)?;
    }
    if bytes.len() < budget {
        // trailing end-of-line bytes after %%EOF
        bytes.resize(budget, b'\n');
    }
    Ok(bytes)
}
