mod arena;
mod handle;
mod navigate;
mod node;
mod raw_avltree_map;

pub(crate) use arena::Arena;
pub(crate) use handle::{Generation, Handle};
pub(crate) use navigate::{predecessor, successor};
pub(crate) use node::Node;
pub(crate) use raw_avltree_map::{AttachPoint, RawAVLTreeMap, SearchResult, TreeId};
