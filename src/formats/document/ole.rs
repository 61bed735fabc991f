//! Legacy binary Office files: a compound file with the application's main
//! stream filled with readable text.

use crate::container::cfb::{self, Layout};
use crate::formats::EncodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Doc,
    Ppt,
    Xls,
}

impl Kind {
    pub fn stream_name(self) -> &'static str {
        match self {
            Kind::Doc => "WordDocument",
            Kind::Ppt => "PowerPoint Document",
            Kind::Xls => "Workbook",
        }
    }

    fn pattern(self) -> &'static [u8] {
        match self {
            Kind::Doc => b"Dummy DOC file content. ",
            Kind::Ppt => b"Dummy PPT file content. ",
            Kind::Xls => b"Dummy XLS file content. ",
        }
    }
}

pub fn encode(kind: Kind, budget: usize) -> Result<Vec<u8>, EncodeError> {
    let total = budget.max(cfb::MIN_FILE);
    let layout = Layout::for_file_len(total)
        .ok_or_else(|| EncodeError::Layout(format!("no compound file layout for {total} bytes")))?;
    Ok(cfb::write(&layout, kind.stream_name(), kind.pattern())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn each_kind_names_its_stream() {
        for kind in [Kind::Doc, Kind::Ppt, Kind::Xls] {
            let file = encode(kind, 40_000).unwrap();
            assert_eq!(file.len(), 40_000);
            assert_eq!(&file[..8], &cfb::SIGNATURE);
            let name = utf16(kind.stream_name());
            assert!(file.windows(name.len()).any(|w| w == name.as_slice()));
            assert!(file.windows(kind.pattern().len()).any(|w| w == kind.pattern()));
        }
    }

    #[test]
    fn floor_is_the_minimal_compound_file() {
        assert_eq!(encode(Kind::Doc, 0).unwrap().len(), cfb::MIN_FILE);
        assert_eq!(encode(Kind::Xls, cfb::MIN_FILE + 1).unwrap().len(), cfb::MIN_FILE + 1);
    }
}
