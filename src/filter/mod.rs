// Store-native filter expressions and their evaluation
mod eval;
mod types;

pub use eval::{compare_bson, eval_filter, get_path};
pub use types::{CmpOp, Filter, MAX_IN_SET, MAX_PATH_DEPTH};
