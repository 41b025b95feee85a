use winrs_psrp::{DecodedOutput, StreamKind};

/// Everything a command wrote, in the order it was decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    data: Vec<DecodedOutput>,
    exitcode: Option<i32>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: DecodedOutput) {
        self.data.push(chunk);
    }

    pub fn data(&self) -> &[DecodedOutput] {
        &self.data
    }

    pub fn exitcode(&self) -> Option<i32> {
        self.exitcode
    }

    pub fn set_exitcode(&mut self, exitcode: Option<i32>) {
        self.exitcode = exitcode;
    }

    pub fn stdout(&self) -> String {
        self.stream(StreamKind::Stdout)
    }

    pub fn stderr(&self) -> String {
        self.stream(StreamKind::Stderr)
    }

    /// Both streams interleaved as the remote side produced them.
    pub fn output(&self) -> String {
        self.data.iter().map(|chunk| chunk.text.as_str()).collect()
    }

    fn stream(&self, kind: StreamKind) -> String {
        self.data
            .iter()
            .filter(|chunk| chunk.stream == kind)
            .map(|chunk| chunk.text.as_str())
            .collect()
    }
}
