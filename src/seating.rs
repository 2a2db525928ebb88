//! Seat ordering for video tracks.
//!
//! Tracks are sorted twice with stable sorts: first by participant id, then
//! by display name in descending order. The name is the visible grouping key;
//! the id pass only decides between tracks whose names compare equal.
//!
//! A track whose participant has no entry in the directory is unresolved.
//! Resolved names always sort before unresolved ones, and two unresolved
//! tracks compare equal so the id pass decides between them.
//!
//! Names compare by Unicode scalar value (`str` ordering). Browsers compare
//! UTF-16 code units instead, so names with characters outside the Basic
//! Multilingual Plane can order differently there.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::MediaTrack;

pub fn order_seats(tracks: &[MediaTrack], directory: &HashMap<String, String>) -> Vec<MediaTrack> {
    let mut ordered = tracks.to_vec();

    ordered.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
    ordered.sort_by(|a, b| {
        compare_names_descending(
            directory.get(&a.participant_id),
            directory.get(&b.participant_id),
        )
    });

    ordered
}

fn compare_names_descending(a: Option<&String>, b: Option<&String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
