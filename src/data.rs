//! Tile layer cell decoding: csv, base64 (raw or compressed) and plain
//! XML `<tile>` children.

use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

use crate::error::Error;
use crate::xml;

/// Set in [`Tile::flags`] when the tile is flipped horizontally.
pub const FLIP_HORIZONTAL: u8 = 0x8; // bit 31 of the raw cell
/// Set in [`Tile::flags`] when the tile is flipped vertically.
pub const FLIP_VERTICAL: u8 = 0x4; // bit 30
/// Set in [`Tile::flags`] when the tile is flipped diagonally.
pub const FLIP_DIAGONAL: u8 = 0x2; // bit 29

const GID_MASK: u32 = 0x0FFF_FFFF;

/// One cell of a tile layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Global tile ID with the flip bits stripped, 0 for an empty cell.
    pub gid: u32,
    /// Flip bits, see the `FLIP_*` constants.
    pub flags: u8,
}

impl Tile {
    /// Splits a raw 32 bit cell into ID and flip bits.
    #[inline]
    pub fn from_raw(raw: u32) -> Tile {
        Tile {
            gid: raw & GID_MASK,
            flags: (raw >> 28) as u8,
        }
    }

    /// `true` when the cell holds no tile, regardless of flip bits.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.gid == 0
    }

    /// `true` when the tile is drawn mirrored on the vertical axis.
    #[inline]
    pub fn flip_horizontal(self) -> bool {
        self.flags & FLIP_HORIZONTAL != 0
    }

    /// `true` when the tile is drawn mirrored on the horizontal axis.
    #[inline]
    pub fn flip_vertical(self) -> bool {
        self.flags & FLIP_VERTICAL != 0
    }

    /// `true` when the tile is drawn transposed.
    #[inline]
    pub fn flip_diagonal(self) -> bool {
        self.flags & FLIP_DIAGONAL != 0
    }
}

/// Decodes the raw 32 bit cells of `cell_node`.
///
/// `data_node` is the `<data>` element carrying the `encoding` and
/// `compression` attributes; `cell_node` is either the same element or a
/// `<chunk>` child inheriting them. Exactly `expected` cells must come
/// out, or the caller gets a decode error and skips the layer or chunk.
pub(crate) fn decode_cells(
    data_node: roxmltree::Node,
    cell_node: roxmltree::Node,
    expected: usize,
) -> Result<Vec<u32>, Error> {
    let cells: Vec<u32> = match data_node.attribute("encoding") {
        Some("csv") => parse_csv(cell_node.text().unwrap_or(""), expected),
        Some("base64") => {
            let bytes = decode_base64(
                cell_node.text().unwrap_or(""),
                data_node.attribute("compression"),
                expected * 4,
            )?;
            bytes
                .chunks_exact(4)
                .take(expected)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        }
        Some(other) => {
            return Err(Error::Decode(format!("unknown encoding \"{}\"", other)));
        }
        None => cell_node
            .children()
            .filter(|c| c.has_tag_name("tile"))
            .map(|c| xml::attr_or(c, "gid", 0u32))
            .collect(),
    };

    if cells.len() != expected {
        return Err(Error::Decode(format!(
            "expected {} cells, decoded {}",
            expected,
            cells.len()
        )));
    }
    Ok(cells)
}

// The tokenizer reads unsigned integers greedily and stops at the first
// token that does not begin with a digit.
fn parse_csv(text: &str, expected: usize) -> Vec<u32> {
    let mut cells = Vec::with_capacity(expected);
    for token in text.split(',') {
        let token = token.trim();
        let digits = token.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            break;
        }
        match token[..digits].parse::<u32>() {
            Ok(value) => cells.push(value),
            Err(_) => break, // overflow
        }
        if digits != token.len() {
            break;
        }
    }
    cells
}

fn decode_base64(
    text: &str,
    compression: Option<&str>,
    expected_bytes: usize,
) -> Result<Vec<u8>, Error> {
    // Tiled writes the whole blob as a single token; a blob wrapped onto
    // several lines is truncated at the first break.
    let token = text.split_whitespace().next().unwrap_or("");
    let raw = BASE64_STANDARD
        .decode(token)
        .map_err(|e| Error::Decode(format!("base64: {}", e)))?;

    match compression {
        None => Ok(raw),
        Some("zlib") => inflate(&raw, false, expected_bytes),
        Some("gzip") => inflate(&raw, true, expected_bytes),
        Some("zstd") => {
            zstd::decode_all(raw.as_slice()).map_err(|e| Error::Decode(format!("zstd: {}", e)))
        }
        Some(other) => Err(Error::Decode(format!("unknown compression \"{}\"", other))),
    }
}

fn inflate(data: &[u8], gzip: bool, expected_bytes: usize) -> Result<Vec<u8>, Error> {
    let mut input = data;
    let mut out = Vec::with_capacity(expected_bytes);
    let result = if gzip {
        flate2::bufread::GzDecoder::new(&mut input).read_to_end(&mut out)
    } else {
        flate2::bufread::ZlibDecoder::new(&mut input).read_to_end(&mut out)
    };
    result.map_err(|e| Error::Decode(format!("inflate: {}", e)))?;
    // The bufread decoders consume exactly the compressed stream, so
    // whatever is left never belonged to it.
    if !input.is_empty() {
        return Err(Error::Decode(format!(
            "{} trailing bytes after compressed stream",
            input.len()
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;

    fn data_doc(xml: &str) -> roxmltree::Document {
        roxmltree::Document::parse(xml).expect("fixture is valid XML")
    }

    fn le_bytes(cells: &[u32]) -> Vec<u8> {
        cells.iter().flat_map(|c| c.to_le_bytes()).collect()
    }

    #[test]
    fn raw_cell_split_round_trips() {
        for &gid in &[0u32, 1, 2_000, GID_MASK] {
            for flags in 0u8..=0xF {
                let raw = (u32::from(flags) << 28) | gid;
                let tile = Tile::from_raw(raw);
                assert_eq!(tile.gid, gid);
                assert_eq!(tile.flags, flags);
            }
        }
    }

    #[test]
    fn flip_accessors_match_their_bits() {
        let tile = Tile::from_raw(0x8000_0001);
        assert!(tile.flip_horizontal());
        assert!(!tile.flip_vertical());
        assert!(!tile.flip_diagonal());
        assert!(!tile.is_empty());

        let empty = Tile::from_raw(0xE000_0000);
        assert!(empty.is_empty());
        assert_eq!(empty.flags, 0xE);
    }

    #[test]
    fn csv_cells_decode_with_interior_whitespace() {
        let doc = data_doc("<data encoding=\"csv\">1, 2,\n0, 4</data>");
        let node = doc.root_element();
        assert_eq!(decode_cells(node, node, 4).unwrap(), [1, 2, 0, 4]);
    }

    #[test]
    fn csv_scan_stops_at_first_bad_token() {
        assert_eq!(parse_csv("1,2,x,4", 4), [1, 2]);
        assert_eq!(parse_csv("1,2a,3", 3), [1, 2]);
        assert!(parse_csv("", 4).is_empty());
        assert_eq!(parse_csv("1,2,", 4), [1, 2]);
    }

    #[test]
    fn short_csv_data_is_a_decode_error() {
        let doc = data_doc(r#"<data encoding="csv">1,2,x,4</data>"#);
        let node = doc.root_element();
        let err = decode_cells(node, node, 4).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn plain_base64_cells_decode() {
        let encoded = BASE64_STANDARD.encode(le_bytes(&[1, 0, 0x0FFF_FFFF, 7]));
        let xml = format!(r#"<data encoding="base64">{}</data>"#, encoded);
        let doc = data_doc(&xml);
        let node = doc.root_element();
        assert_eq!(decode_cells(node, node, 4).unwrap(), [1, 0, 0x0FFF_FFFF, 7]);
    }

    #[test]
    fn zlib_compressed_cells_decode() {
        let mut compressed = Vec::new();
        flate2::read::ZlibEncoder::new(&le_bytes(&[9, 8, 7, 6])[..], Compression::default())
            .read_to_end(&mut compressed)
            .unwrap();
        let xml = format!(
            r#"<data encoding="base64" compression="zlib">{}</data>"#,
            BASE64_STANDARD.encode(&compressed)
        );
        let doc = data_doc(&xml);
        let node = doc.root_element();
        assert_eq!(decode_cells(node, node, 4).unwrap(), [9, 8, 7, 6]);
    }

    #[test]
    fn gzip_compressed_cells_decode() {
        let mut compressed = Vec::new();
        flate2::read::GzEncoder::new(&le_bytes(&[1, 2, 3, 4])[..], Compression::default())
            .read_to_end(&mut compressed)
            .unwrap();
        let xml = format!(
            r#"<data encoding="base64" compression="gzip">{}</data>"#,
            BASE64_STANDARD.encode(&compressed)
        );
        let doc = data_doc(&xml);
        let node = doc.root_element();
        assert_eq!(decode_cells(node, node, 4).unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn zstd_compressed_cells_decode() {
        let compressed = zstd::encode_all(&le_bytes(&[5, 5, 5, 5])[..], 0).unwrap();
        let xml = format!(
            r#"<data encoding="base64" compression="zstd">{}</data>"#,
            BASE64_STANDARD.encode(&compressed)
        );
        let doc = data_doc(&xml);
        let node = doc.root_element();
        assert_eq!(decode_cells(node, node, 4).unwrap(), [5, 5, 5, 5]);
    }

    #[test]
    fn trailing_bytes_after_compressed_stream_fail() {
        let mut compressed = Vec::new();
        flate2::read::ZlibEncoder::new(&le_bytes(&[1])[..], Compression::default())
            .read_to_end(&mut compressed)
            .unwrap();
        compressed.push(0xAB);
        let err = inflate(&compressed, false, 4).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn wrapped_base64_blob_truncates_at_first_line_break() {
        // Only the first token is read; the remainder of the blob is lost
        // and the short result shows up as a cell count mismatch.
        let encoded = BASE64_STANDARD.encode(le_bytes(&[1, 2, 3, 4]));
        let (head, tail) = encoded.split_at(8);
        let xml = format!("<data encoding=\"base64\">{}\n{}</data>", head, tail);
        let doc = data_doc(&xml);
        let node = doc.root_element();
        assert!(matches!(
            decode_cells(node, node, 4),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn unencoded_tile_children_decode() {
        let doc = data_doc(r#"<data><tile gid="3"/><tile/><tile gid="1"/></data>"#);
        let node = doc.root_element();
        assert_eq!(decode_cells(node, node, 3).unwrap(), [3, 0, 1]);
    }

    #[test]
    fn unknown_compression_is_a_decode_error() {
        let doc = data_doc(r#"<data encoding="base64" compression="lzma">AAAA</data>"#);
        let node = doc.root_element();
        assert!(matches!(
            decode_cells(node, node, 1),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn overlong_uncompressed_data_is_truncated_to_expected() {
        let encoded = BASE64_STANDARD.encode(le_bytes(&[1, 2, 3, 4, 5]));
        let xml = format!(r#"<data encoding="base64">{}</data>"#, encoded);
        let doc = data_doc(&xml);
        let node = doc.root_element();
        assert_eq!(decode_cells(node, node, 4).unwrap(), [1, 2, 3, 4]);
    }
}
