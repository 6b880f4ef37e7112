pub mod ops_resolve;
pub mod ops_tree;
pub mod ops_version;
