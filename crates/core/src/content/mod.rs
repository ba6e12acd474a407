pub mod blocks;
pub mod cases;
pub mod model;
pub mod render;

pub use blocks::{sort_blocks, BlockKind, ContentBlock};
pub use cases::{ClientCase, NewClientCase};
pub use model::{ContentDocument, ContentDocumentInput};
pub use render::render_blocks;
