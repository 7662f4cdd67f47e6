use lumistrip_protocol::DELIMITER;

/// Reassembles delimiter-terminated frames out of arbitrarily chunked
/// reads. A single read may carry zero, one or many frames, and a frame
/// may span any number of reads; the trailing incomplete segment of each
/// chunk is buffered until the rest of it arrives.
#[derive(Default)]
pub struct FrameSplitter {
    pending: String,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every complete frame ended by this chunk, in wire order.
    /// Empty frames (back-to-back delimiters, or the empty tail of a
    /// delimiter-terminated chunk) are included; callers skip them.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        let input = format!("{}{}", self.pending, chunk);
        self.pending.clear();

        let mut frames: Vec<String> = input.split(DELIMITER).map(str::to_owned).collect();
        if !input.ends_with(DELIMITER) {
            // Incomplete tail; hold it back until more bytes arrive.
            self.pending = frames.pop().unwrap_or_default();
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(splitter: &mut FrameSplitter, chunk: &str) -> Vec<String> {
        splitter
            .push(chunk)
            .into_iter()
            .filter(|frame| !frame.is_empty())
            .collect()
    }

    #[test]
    fn single_terminated_frame() {
        let mut splitter = FrameSplitter::new();
        assert_eq!(complete(&mut splitter, "abc;;;"), vec!["abc"]);
    }

    #[test]
    fn many_frames_in_one_chunk() {
        let mut splitter = FrameSplitter::new();
        assert_eq!(
            complete(&mut splitter, "one;;;two;;;three;;;"),
            vec!["one", "two", "three"]
        );
    }

    #[test]
    fn chunk_without_delimiter_produces_nothing() {
        let mut splitter = FrameSplitter::new();
        assert!(complete(&mut splitter, "partial").is_empty());
        assert_eq!(complete(&mut splitter, " frame;;;"), vec!["partial frame"]);
    }

    #[test]
    fn frame_spanning_three_chunks() {
        let mut splitter = FrameSplitter::new();
        assert!(complete(&mut splitter, "a").is_empty());
        assert!(complete(&mut splitter, "b").is_empty());
        assert_eq!(complete(&mut splitter, "c;;;"), vec!["abc"]);
    }

    #[test]
    fn trailing_partial_after_complete_frames() {
        let mut splitter = FrameSplitter::new();
        assert_eq!(complete(&mut splitter, "one;;;two;;;thr"), vec!["one", "two"]);
        assert_eq!(complete(&mut splitter, "ee;;;"), vec!["three"]);
    }

    #[test]
    fn chunk_boundary_inside_delimiter() {
        let mut splitter = FrameSplitter::new();
        assert!(complete(&mut splitter, "abc;").is_empty());
        assert_eq!(complete(&mut splitter, ";;def;;;"), vec!["abc", "def"]);
    }

    #[test]
    fn empty_frames_are_dropped_by_callers() {
        let mut splitter = FrameSplitter::new();
        assert_eq!(complete(&mut splitter, ";;;;;;a;;;"), vec!["a"]);
    }

    #[test]
    fn splitting_is_chunk_boundary_invariant() {
        let stream = "first;;;second;;;third;;;fourth and longer;;;";

        let mut whole = FrameSplitter::new();
        let expected = complete(&mut whole, stream);
        assert_eq!(expected.len(), 4);

        for split_at in 0..=stream.len() {
            let (left, right) = stream.split_at(split_at);
            let mut splitter = FrameSplitter::new();
            let mut frames = complete(&mut splitter, left);
            frames.extend(complete(&mut splitter, right));
            assert_eq!(frames, expected, "split at byte {}", split_at);
        }
    }
}
