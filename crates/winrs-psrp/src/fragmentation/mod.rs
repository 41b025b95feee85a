mod defragmenter;
mod fragment;
mod fragmenter;

pub use defragmenter::*;
pub use fragment::*;
pub use fragmenter::*;

use crate::PsrpMessage;

#[derive(Debug)]
pub enum DefragmentResult {
    Incomplete,
    Complete(Vec<PsrpMessage>),
}
