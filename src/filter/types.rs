use bson::Bson;
use regex::Regex;

// Safety limits to prevent resource abuse
pub const MAX_PATH_DEPTH: usize = 32;
pub const MAX_IN_SET: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gte,
    Lte,
}

/// Conjunctive filter produced by the criteria builder.
#[derive(Debug, Clone)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Cmp { path: String, op: CmpOp, value: Bson },
    /// Membership by textual form of the field value.
    In { path: String, values: Vec<String> },
    Regex { path: String, regex: Regex },
}

impl Filter {
    /// Number of leaf constraints.
    #[must_use]
    pub fn clause_count(&self) -> usize {
        match self {
            Self::True => 0,
            Self::And(fs) => fs.iter().map(Self::clause_count).sum(),
            _ => 1,
        }
    }
}
