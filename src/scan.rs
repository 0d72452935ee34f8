//! Boundary scan: locates complete GRIB2 messages within a byte
//! stream, tolerating garbage between them (FTP artifacts, concatenated
//! bulletins) by resuming the scan past any candidate that fails
//! validation.

use std::io::{Read, Seek, SeekFrom};

use crate::{
    error::{GribError, FILE_LEVEL},
    sections::Indicator,
};

const MAGIC: &[u8; 4] = b"GRIB";
const END_MARKER: &[u8; 4] = b"7777";

/// Forward-scan chunk size. Bounds peak memory to this much regardless of
/// stream length; a handful of trailing bytes are carried across chunk
/// boundaries so a magic sequence split across two reads is still found.
const CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MessageBoundary {
    pub(crate) offset: u64,
    pub(crate) length: u64,
}

fn io_err(e: std::io::Error) -> GribError {
    GribError::invalid_format(FILE_LEVEL, 0, format!("I/O error while scanning: {e}"))
}

/// Scans `source` end to end for message boundaries, reading it forward in
/// `CHUNK_SIZE` chunks rather than buffering it whole. A boundary is only
/// accepted once the indicator parses (edition 2, plausible length) and the
/// `7777` end marker is found at the declared offset; anything else just
/// advances the search by one byte rather than failing the whole scan.
pub(crate) fn scan_boundaries<R: Read + Seek>(
    source: &mut R,
) -> Result<Vec<MessageBoundary>, GribError> {
    let stream_len = source.seek(SeekFrom::End(0)).map_err(io_err)?;

    let mut boundaries = Vec::new();
    let mut search_from = 0u64;
    let mut carry: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];

    'scan: while search_from < stream_len {
        source.seek(SeekFrom::Start(search_from)).map_err(io_err)?;
        let to_read = CHUNK_SIZE.min((stream_len - search_from) as usize);
        let window = &mut chunk[..to_read];
        source.read_exact(window).map_err(io_err)?;

        let mut hay = std::mem::take(&mut carry);
        hay.extend_from_slice(window);
        let base = search_from - hay.len() as u64 + to_read as u64;

        let mut pos = 0usize;
        while let Some(rel) = hay[pos..].windows(MAGIC.len()).position(|w| w == MAGIC) {
            let found = pos + rel;
            let candidate = base + found as u64;
            match validate_candidate(source, candidate, stream_len) {
                Ok(boundary) => {
                    boundaries.push(boundary);
                    search_from = candidate + boundary.length.max(1);
                    continue 'scan;
                }
                Err(_) => pos = found + 1,
            }
        }

        let keep = (MAGIC.len() - 1).min(hay.len());
        carry = hay[hay.len() - keep..].to_vec();
        search_from += to_read as u64;
    }

    if boundaries.is_empty() && stream_len > 0 {
        return Err(GribError::invalid_format(
            FILE_LEVEL,
            0,
            "no valid GRIB2 message boundaries found in a non-empty stream",
        ));
    }
    Ok(boundaries)
}

fn validate_candidate<R: Read + Seek>(
    source: &mut R,
    start: u64,
    stream_len: u64,
) -> Result<MessageBoundary, GribError> {
    if start + Indicator::SIZE as u64 > stream_len {
        return Err(GribError::ShortRead {
            offset: start as usize,
            requested: Indicator::SIZE,
            available: (stream_len - start) as usize,
        });
    }
    source.seek(SeekFrom::Start(start)).map_err(io_err)?;
    let mut header = [0u8; Indicator::SIZE];
    source.read_exact(&mut header).map_err(io_err)?;
    let indicator = Indicator::from_buf(&header)?;
    let length = indicator.total_length;
    if length < Indicator::SIZE as u64 {
        return Err(GribError::invalid_format(
            0,
            start as usize,
            format!("declared total length {length} is shorter than Section 0 itself"),
        ));
    }
    let end = start
        .checked_add(length)
        .filter(|&e| e <= stream_len)
        .ok_or_else(|| GribError::ShortRead {
            offset: start as usize,
            requested: length as usize,
            available: (stream_len - start) as usize,
        })?;

    source
        .seek(SeekFrom::Start(end - END_MARKER.len() as u64))
        .map_err(io_err)?;
    let mut marker = [0u8; END_MARKER.len()];
    source.read_exact(&mut marker).map_err(io_err)?;
    if &marker != END_MARKER {
        return Err(GribError::invalid_format(
            FILE_LEVEL,
            (end - END_MARKER.len() as u64) as usize,
            "missing '7777' end marker at declared message length",
        ));
    }
    Ok(MessageBoundary {
        offset: start,
        length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fake_message(total_length: u64) -> Vec<u8> {
        let mut buf = vec![b'G', b'R', b'I', b'B', 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0];
        buf[8..16].copy_from_slice(&total_length.to_be_bytes());
        buf.resize((total_length as usize).saturating_sub(4), 0);
        buf.extend_from_slice(END_MARKER);
        buf
    }

    #[test]
    fn empty_stream_yields_empty_list() {
        let mut cursor = Cursor::new(Vec::new());
        assert_eq!(scan_boundaries(&mut cursor).unwrap(), vec![]);
    }

    #[test]
    fn single_message_is_found() {
        let data = fake_message(30);
        let mut cursor = Cursor::new(data.clone());
        let boundaries = scan_boundaries(&mut cursor).unwrap();
        assert_eq!(
            boundaries,
            vec![MessageBoundary {
                offset: 0,
                length: 30
            }]
        );
    }

    #[test]
    fn two_concatenated_messages_are_found() {
        let mut data = fake_message(30);
        data.extend(fake_message(40));
        let mut cursor = Cursor::new(data);
        let boundaries = scan_boundaries(&mut cursor).unwrap();
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].offset, 0);
        assert_eq!(boundaries[1].offset, 30);
    }

    #[test]
    fn garbage_before_a_valid_message_is_skipped() {
        let mut data = vec![0xff; 100];
        data.extend(fake_message(30));
        let mut cursor = Cursor::new(data);
        let boundaries = scan_boundaries(&mut cursor).unwrap();
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].offset, 100);
    }

    #[test]
    fn only_garbage_is_a_fail_stop_error() {
        let mut cursor = Cursor::new(vec![0xffu8; 64]);
        assert!(scan_boundaries(&mut cursor).is_err());
    }

    #[test]
    fn scans_a_real_file_not_just_an_in_memory_cursor() {
        use std::io::{Seek, SeekFrom, Write};

        let mut data = fake_message(30);
        data.extend(fake_message(40));
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(&data).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let boundaries = scan_boundaries(&mut file).unwrap();
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].offset, 0);
        assert_eq!(boundaries[1].offset, 30);
    }
}
