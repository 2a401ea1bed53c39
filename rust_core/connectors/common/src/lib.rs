pub mod errors;
pub mod numeric;
pub mod types;

/// Number of price levels kept per side of the book.
pub const BOOK_DEPTH: usize = 10;
