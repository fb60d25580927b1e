// IMRaD Labeler CLI utilities.

pub mod grobid;

pub use grobid::fetch_fulltext_tei;
