//! Turning a timeline into the artifacts other tools consume.

pub use self::{
    edl::{edl_string, write_edl},
    filter::audio_filter,
    markers::{write_markers, AccessList, Marker, MarkerDocument, MODE_VOLUME},
};

mod edl;
mod filter;
mod markers;
