pub mod timestamp;

pub mod book_record;
pub mod edition_candidate;
pub mod favorite;
pub mod identifier;

pub use book_record::{BookRecord, StoredBook};
pub use edition_candidate::EditionCandidate;
pub use favorite::{Favorite, FavoriteToggle};
pub use identifier::{OlClass, OlId};
