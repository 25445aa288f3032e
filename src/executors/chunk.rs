//! Chunk executor: split a document into overlapping page ranges.

use std::ops::Range;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ExecutionContext, ExecutorError};

/// Subdirectory of the output directory that receives chunk files.
pub const CHUNKS_DIR: &str = "chunks";

/// Chunking options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkOptions {
    pub pages_per_chunk: usize,
    /// Pages each chunk repeats from the end of the previous one.
    pub overlap: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            pages_per_chunk: 25,
            overlap: 2,
        }
    }
}

impl ChunkOptions {
    /// Reject configurations that cannot make progress.
    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.pages_per_chunk == 0 {
            return Err(ExecutorError::InvalidOptions(
                "pages per chunk must be at least 1".to_string(),
            ));
        }
        if self.overlap >= self.pages_per_chunk {
            return Err(ExecutorError::InvalidOptions(format!(
                "overlap ({}) must be smaller than pages per chunk ({})",
                self.overlap, self.pages_per_chunk
            )));
        }
        Ok(())
    }
}

/// One written chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    pub file: PathBuf,
    /// 1-based inclusive page range.
    pub page_range: (usize, usize),
    pub page_count: usize,
}

#[derive(Debug, Clone)]
pub struct ChunkResult {
    pub chunks_created: usize,
    pub chunks: Vec<ChunkInfo>,
    pub directory: PathBuf,
}

/// 0-based half-open page ranges covering `[0, total)`.
///
/// Each chunk after the first starts `overlap` pages before the previous one
/// ended. The last chunk ends at `total` and may be shorter. Returns nothing
/// for options that [`ChunkOptions::validate`] rejects.
pub fn chunk_ranges(total: usize, pages_per_chunk: usize, overlap: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    if pages_per_chunk == 0 || overlap >= pages_per_chunk {
        return ranges;
    }

    let mut start = 0;
    while start < total {
        let end = (start + pages_per_chunk).min(total);
        ranges.push(start..end);
        if end == total {
            break;
        }
        start = end - overlap;
    }
    ranges
}

/// `<stem>_chunk_<NNN>_pages_<first>-<last>.pdf` with a 1-based index and pages.
pub fn chunk_file_name(stem: &str, index: usize, range: &Range<usize>) -> String {
    format!(
        "{}_chunk_{:03}_pages_{}-{}.pdf",
        stem,
        index + 1,
        range.start + 1,
        range.end
    )
}

pub(super) fn run(
    ctx: &ExecutionContext<'_>,
    options: &ChunkOptions,
) -> Result<ChunkResult, ExecutorError> {
    options.validate()?;

    let total = ctx.source.page_count();
    let directory = ctx.output_path(CHUNKS_DIR);
    std::fs::create_dir_all(&directory)?;

    let stem = ctx.stem();
    let ranges = chunk_ranges(total, options.pages_per_chunk, options.overlap);
    let mut chunks = Vec::with_capacity(ranges.len());

    for (index, range) in ranges.iter().enumerate() {
        let file = directory.join(chunk_file_name(&stem, index, range));
        ctx.source.write_pages(range.clone(), &file)?;
        tracing::info!(
            "wrote chunk {} of {}: pages {}-{}",
            index + 1,
            ranges.len(),
            range.start + 1,
            range.end
        );
        chunks.push(ChunkInfo {
            file,
            page_range: (range.start + 1, range.end),
            page_count: range.len(),
        });
    }

    Ok(ChunkResult {
        chunks_created: chunks.len(),
        chunks,
        directory,
    })
}
