pub mod error;
pub mod group;
pub mod inventory;
pub mod node;
pub mod parser;
pub mod printer;
pub mod settings;
pub mod slots;
pub mod storage;
pub mod value;

pub use error::StoreError;
pub use group::{DataGroup, DecodeMode};
pub use inventory::Inventory;
pub use node::{Literal, Node, NodeShape};
pub use parser::{parse, safe_split};
pub use printer::print;
pub use settings::Settings;
pub use slots::SaveSlots;
pub use value::{FromTyped, ScalarKind, ScalarList, ScalarMap, ScalarType, ScalarValue, TypedValue};
