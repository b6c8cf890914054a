//! Annex header matching and document splitting

pub mod header;
pub mod splitter;

pub use header::{MatchStage, is_header_match, match_header, normalize_text_for_matching};
pub use splitter::{
    AnnexHeaders, SplitOutput, SplitPlan, SplitStrategy, find_header_positions, plan_split,
    split_annexes, split_document, validate_header_order,
};
