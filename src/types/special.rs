//! Reserved token ids.
//!
//! The first five ids of the vocabulary space are reserved for structural
//! tokens; real vocabulary entries start at [RESERVED_TOKEN_COUNT].

/// Integer token id. Ids below [RESERVED_TOKEN_COUNT] are reserved.
pub type TokenId = u32;

/// Padding.
pub const PAD: TokenId = 0;
/// Unknown token.
pub const UNK: TokenId = 1;
/// Segment-start marker (`[CLS]`).
pub const CLS: TokenId = 2;
/// Segment-separator marker (`[SEP]`).
pub const SEP: TokenId = 3;
/// Mask marker (`[MASK]`).
pub const MASK: TokenId = 4;

/// Number of reserved ids; vocabulary-relative ids are offset by this.
pub const RESERVED_TOKEN_COUNT: TokenId = 5;

/// `true` for markers that delimit segments and are never maskable.
pub fn is_structural(token: TokenId) -> bool {
    token == CLS || token == SEP
}
