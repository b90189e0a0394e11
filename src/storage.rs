pub mod canvass;
pub mod directory;
mod record;
mod repository;

pub use canvass::{CanvassError, load_canvass};
pub use directory::{Directory, DirectoryError, LoadError};
pub use repository::{NamedEntity, NamedEntityKind, NamedEntityRepository, Repository};
