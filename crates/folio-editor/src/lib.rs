#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

This crate is an internal implementation detail of the folio project.

Do NOT depend on this crate directly.
Use `folio-io` instead.
"#]

pub mod block_tree;
pub mod change_type;
pub mod commands;
pub mod decorator;
pub mod editor_state;
pub mod error;
pub mod offset_key;
pub mod surface;

pub use block_tree::{BlockTree, DecoratorRange, LeafRange};
pub use change_type::ChangeType;
pub use commands::{
    move_selection_backward, move_selection_forward, plain_backspace, plain_backspace_with_options, plain_delete,
    plain_delete_with_options, remove_text_with_strategy,
};
pub use decorator::{CompositeDecorator, Decorator, DecoratorStrategy, EntityTypeStrategy};
pub use editor_state::{EditorState, HistoryOptions};
pub use error::EditorError;
pub use offset_key::OffsetKey;
pub use surface::{InputType, SelectionTrust, SurfaceInput, SurfaceOutcome, reconcile_surface};

pub type Result<T> = std::result::Result<T, EditorError>;
