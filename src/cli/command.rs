use crate::types::{ParameterSet, QueryId};

/// Programmatic form of the binary's subcommands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run { name: String, params: ParameterSet },
    RunStored { id: QueryId, params: Option<ParameterSet> },
    Validate { name: String, params: ParameterSet },
    Mappings,
    Samples,
    Docs,
    Status,
}
