pub(crate) mod attempt;
pub(crate) mod migrate;
pub(crate) mod serve;
