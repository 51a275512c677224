pub(crate) mod filter_graph;
pub(crate) mod probe;
pub(crate) mod temp;
pub(crate) mod transcode;
