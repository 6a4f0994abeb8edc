use text_splitter::TextSplitter;

/// Maximum segment length, in characters, used for every index build.
pub const CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl Chunker {
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Splits on the coarsest semantic boundary (paragraphs, then lines, then
    /// words) that keeps each segment within `chunk_size` characters.
    pub fn split(&self, text: &str) -> Vec<String> {
        let splitter = TextSplitter::new(self.chunk_size);
        splitter.chunks(text).map(str::to_owned).collect()
    }
}
