//! Listing
//!
//! Read-only views of the header and directory for front ends: plain
//! text for terminals, JSON for the network listing.

use std::fmt;

use serde::Serialize;

use crate::digest;
use crate::error::Result;
use crate::layout::{Resolution, NB_RES};
use crate::store::Store;

/// Header fields worth showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSummary {
    pub name: String,
    pub version: u32,
    pub count: u32,
    pub capacity: u32,
    pub thumb: (u16, u16),
    pub small: (u16, u16),
}

/// One valid directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub slot: usize,
    pub id: String,
    pub hash: String,
    pub orig_dims: (u32, u32),
    /// Indexed by resolution: thumb, small, orig
    pub sizes: [u32; NB_RES],
    /// Indexed by resolution: thumb, small, orig
    pub offsets: [u64; NB_RES],
    pub valid: bool,
}

/// Document served by the listing endpoint
#[derive(Debug, Serialize)]
struct PictureList<'a> {
    #[serde(rename = "Pictures")]
    pictures: Vec<&'a str>,
}

/// Full listing document
#[derive(Debug, Serialize)]
struct FullListing<'a> {
    header: &'a HeaderSummary,
    entries: &'a [EntrySummary],
}

impl Store {
    /// Valid entries in ascending slot order
    pub fn list_entries(&self) -> Vec<EntrySummary> {
        self.metadata()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_valid())
            .map(|(slot, m)| EntrySummary {
                slot,
                id: m.picture_id.clone(),
                hash: digest::to_hex(&m.content_hash),
                orig_dims: m.orig_dims,
                sizes: m.size,
                offsets: m.offset,
                valid: true,
            })
            .collect()
    }

    pub fn header_summary(&self) -> HeaderSummary {
        let header = self.header();
        HeaderSummary {
            name: header.name.clone(),
            version: header.version,
            count: header.count,
            capacity: header.capacity,
            thumb: header.resized_dims[0],
            small: header.resized_dims[1],
        }
    }
}

/// `{"Pictures": [ids...]}`
pub fn to_json(entries: &[EntrySummary]) -> Result<String> {
    let list = PictureList {
        pictures: entries.iter().map(|e| e.id.as_str()).collect(),
    };
    Ok(serde_json::to_string(&list)?)
}

/// Header plus every entry field
pub fn to_json_full(header: &HeaderSummary, entries: &[EntrySummary]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&FullListing { header, entries })?)
}

/// Header block followed by one block per entry
pub fn render_text(header: &HeaderSummary, entries: &[EntrySummary]) -> String {
    let mut out = header.to_string();
    if entries.is_empty() {
        out.push_str("<< empty database >>\n");
    }
    for entry in entries {
        out.push_str(&entry.to_string());
    }
    out
}

const RULE: &str = "*****************************************";

impl fmt::Display for HeaderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "**********DATABASE HEADER START**********")?;
        writeln!(f, "DB NAME: {:>31}", self.name)?;
        writeln!(f, "VERSION: {}", self.version)?;
        writeln!(f, "IMAGE COUNT: {}\t\tMAX IMAGES: {}", self.count, self.capacity)?;
        writeln!(
            f,
            "THUMBNAIL: {} x {}\tSMALL: {} x {}",
            self.thumb.0, self.thumb.1, self.small.0, self.small.1
        )?;
        writeln!(f, "***********DATABASE HEADER END***********")?;
        writeln!(f, "{}", RULE)
    }
}

impl fmt::Display for EntrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orig = Resolution::Orig.index();
        let thumb = Resolution::Thumb.index();
        let small = Resolution::Small.index();
        writeln!(f, "PICTURE ID: {}", self.id)?;
        writeln!(f, "SHA: {}", self.hash)?;
        writeln!(f, "VALID: {}", u16::from(self.valid))?;
        writeln!(
            f,
            "OFFSET ORIG. : {}\t\tSIZE ORIG. : {}",
            self.offsets[orig], self.sizes[orig]
        )?;
        writeln!(
            f,
            "OFFSET THUMB.: {}\t\tSIZE THUMB.: {}",
            self.offsets[thumb], self.sizes[thumb]
        )?;
        writeln!(
            f,
            "OFFSET SMALL : {}\t\tSIZE SMALL : {}",
            self.offsets[small], self.sizes[small]
        )?;
        writeln!(f, "ORIGINAL: {} x {}", self.orig_dims.0, self.orig_dims.1)?;
        writeln!(f, "{}", RULE)
    }
}
