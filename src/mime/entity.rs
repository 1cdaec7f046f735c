//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of Mimesect.
//
// Mimesect is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mimesect is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along
// with Mimesect. If not, see <http://www.gnu.org/licenses/>.

//! The entity tree itself.
//!
//! A message is parsed once into an arena of entities and is immutable from
//! then on; every operation in the crate is a read-only walk over the arena.
//! The builder is designed to be robust moreso than strictly correct: wildly
//! malformed data is accepted and held as opaque content rather than
//! rejected, with one deliberate exception (a `multipart/signed` entity
//! without a boundary parameter, which is unusable for its whole purpose).

use std::borrow::Cow;
use std::fmt;
use std::io::Read;
use std::ops::Range;
use std::str;

use log::{debug, warn};

use super::content_encoding;
use super::header::{
    self, ContentDisposition, ContentTransferEncoding, ContentType,
};
use super::multipart::{self, Multipart};
use crate::support::error::Error;

const CT_TEXT_PLAIN: ContentType<'static> = ContentType {
    typ: Cow::Borrowed(b"text"),
    subtype: Cow::Borrowed(b"plain"),
    parms: vec![],
};

const MAX_RECURSION: u32 = 20;
const MAX_PARTS: u32 = 1000;

/// Identifies one entity within its owning [`Message`].
///
/// Identifiers are only meaningful for the message that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

/// One node of the entity tree: the headers this crate consumes, plus a body.
#[derive(Debug)]
pub struct Entity {
    parent: Option<EntityId>,
    content_type: ContentType<'static>,
    content_disposition: Option<ContentDisposition<'static>>,
    content_language: Option<String>,
    content_location: Option<String>,
    content_transfer_encoding: ContentTransferEncoding,
    raw: Range<usize>,
    body: Body,
}

/// The body of an entity.
#[derive(Debug)]
pub enum Body {
    /// Leaf content, held as the range of its wire form within the message
    /// source.
    Binary(Range<usize>),
    /// An ordinary multipart container.
    Multipart(Multipart),
    /// A `multipart/signed` container. By convention child 0 is the signed
    /// content and child 1 the detached signature; the convention is checked
    /// by the operations that need it, not here.
    Signed(Multipart),
}

impl Entity {
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// The `Content-Type`, defaulted to `text/plain` if the header was
    /// absent or unparseable.
    pub fn content_type(&self) -> &ContentType<'static> {
        &self.content_type
    }

    pub fn content_disposition(&self) -> Option<&ContentDisposition<'static>> {
        self.content_disposition.as_ref()
    }

    pub fn content_language(&self) -> Option<&str> {
        self.content_language.as_deref()
    }

    pub fn content_location(&self) -> Option<&str> {
        self.content_location.as_deref()
    }

    pub fn content_transfer_encoding(&self) -> ContentTransferEncoding {
        self.content_transfer_encoding
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The child list, if this entity is any kind of multipart container.
    pub fn multipart(&self) -> Option<&Multipart> {
        match self.body {
            Body::Multipart(ref parts) | Body::Signed(ref parts) => {
                Some(parts)
            },
            Body::Binary(_) => None,
        }
    }

    pub fn is_multipart(&self) -> bool {
        self.multipart().is_some()
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.body, Body::Signed(_))
    }
}

/// A parsed message body, held as an immutable tree of entities.
///
/// The tree is built once by [`Message::parse`] or [`Message::read`] and
/// never changes afterwards; no mutating access exists. Since the message
/// owns all of its bytes, concurrent read-only verification and addressing
/// calls against the same tree are safe.
pub struct Message {
    source: Vec<u8>,
    entities: Vec<Entity>,
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("source", &self.source.len())
            .field("entities", &self.entities)
            .finish()
    }
}

impl Message {
    /// Parses `source` into an entity tree.
    ///
    /// The only fatal malformation is a `multipart/signed` entity whose
    /// content-type lacks the boundary parameter; it fails before any of
    /// that entity's children are produced. Everything else degrades to
    /// opaque leaf content.
    pub fn parse(source: Vec<u8>) -> Result<Self, Error> {
        let mut builder = Builder {
            entities: Vec::new(),
            part_count: 0,
        };
        builder.build(&source, 0..source.len(), None, 0)?;

        Ok(Message {
            source,
            entities: builder.entities,
        })
    }

    /// Reads `r` to its end and parses the result.
    pub fn read(mut r: impl Read) -> Result<Self, Error> {
        let mut source = Vec::new();
        r.read_to_end(&mut source)?;
        Self::parse(source)
    }

    /// The root entity. Always present, even for an empty message.
    pub fn root(&self) -> EntityId {
        EntityId(0)
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0 as usize]
    }

    /// All entities, in the order they were produced (parents before their
    /// children, siblings in document order).
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(ix, entity)| (EntityId(ix as u32), entity))
    }

    /// The full wire form of an entity: its headers, the blank line, and
    /// its content, exactly as transmitted, with no outer framing.
    pub fn raw_bytes(&self, id: EntityId) -> &[u8] {
        &self.source[self.entity(id).raw.clone()]
    }

    /// The undecoded content octets of a leaf entity.
    pub fn leaf_content(&self, id: EntityId) -> Option<&[u8]> {
        match self.entity(id).body {
            Body::Binary(ref content) => Some(&self.source[content.clone()]),
            _ => None,
        }
    }

    /// The content octets of a leaf entity with its transfer encoding
    /// removed.
    pub fn decoded_leaf_content(
        &self,
        id: EntityId,
    ) -> Option<Cow<'_, [u8]>> {
        let content = self.leaf_content(id)?;
        content_encoding::decode(
            self.entity(id).content_transfer_encoding,
            content,
        )
    }
}

struct Builder {
    entities: Vec<Entity>,
    part_count: u32,
}

impl Builder {
    fn build(
        &mut self,
        source: &[u8],
        raw: Range<usize>,
        parent: Option<EntityId>,
        depth: u32,
    ) -> Result<EntityId, Error> {
        let (mut fields, content) = scan_headers(source, raw.clone());
        let content_type =
            fields.content_type.take().unwrap_or(CT_TEXT_PLAIN);

        let is_multipart = content_type.is_type("multipart");
        let is_signed = is_multipart && content_type.is_subtype("signed");
        let boundary = if is_multipart {
            content_type.parm("boundary").map(<[u8]>::to_vec)
        } else {
            None
        };

        let id = EntityId(self.entities.len() as u32);
        self.entities.push(Entity {
            parent,
            content_type,
            content_disposition: fields.content_disposition,
            content_language: fields.content_language,
            content_location: fields.content_location,
            content_transfer_encoding: fields.content_transfer_encoding,
            raw,
            body: Body::Binary(content.clone()),
        });
        self.part_count += 1;

        if is_multipart {
            match boundary {
                None if is_signed => return Err(Error::MissingBoundary),
                None => warn!(
                    "multipart entity has no boundary parameter; \
                     holding it as opaque content"
                ),
                Some(boundary) => {
                    if depth >= MAX_RECURSION
                        || self.part_count >= MAX_PARTS
                    {
                        debug!(
                            "nesting or part budget exhausted at depth {}; \
                             holding subtree as opaque content",
                            depth
                        );
                    } else {
                        let ranges = multipart::split_parts(
                            &source[content.clone()],
                            &boundary,
                        );
                        let mut children = Vec::with_capacity(ranges.len());
                        for range in ranges {
                            children.push(self.build(
                                source,
                                content.start + range.start
                                    ..content.start + range.end,
                                Some(id),
                                depth + 1,
                            )?);
                        }

                        let parts = Multipart::new(boundary, children);
                        self.entities[id.0 as usize].body = if is_signed {
                            Body::Signed(parts)
                        } else {
                            Body::Multipart(parts)
                        };
                    }
                },
            }
        }

        Ok(id)
    }
}

#[derive(Default)]
struct HeaderFields {
    content_type: Option<ContentType<'static>>,
    content_disposition: Option<ContentDisposition<'static>>,
    content_language: Option<String>,
    content_location: Option<String>,
    content_transfer_encoding: ContentTransferEncoding,
}

/// Scans the header block of the entity occupying `raw` within `source`.
///
/// Returns the recognised header fields and the range of the content, which
/// is empty at the end of the entity if no blank line terminates the
/// headers.
fn scan_headers(
    source: &[u8],
    raw: Range<usize>,
) -> (HeaderFields, Range<usize>) {
    let region = &source[raw.clone()];
    let mut fields = HeaderFields::default();

    let mut content_start = raw.end;
    let mut header_start: Option<usize> = None;
    let mut line_start = 0;

    loop {
        let line_end = memchr::memchr(b'\n', &region[line_start..])
            .map(|lf| line_start + lf + 1)
            .unwrap_or(region.len());
        let line = &region[line_start..line_end];

        if b"\r\n" == line || b"\n" == line {
            if let Some(start) = header_start.take() {
                process_header(&region[start..line_start], &mut fields);
            }
            content_start = raw.start + line_end;
            break;
        }

        // A continuation line extends the buffered header; anything else
        // flushes it and starts a new one.
        if !line.starts_with(b" ") && !line.starts_with(b"\t") {
            if let Some(start) = header_start.take() {
                process_header(&region[start..line_start], &mut fields);
            }
            header_start = Some(line_start);
        }

        if line_end == region.len() {
            // Truncated inside the header block; there is no content.
            if let Some(start) = header_start.take() {
                process_header(&region[start..], &mut fields);
            }
            break;
        }
        line_start = line_end;
    }

    (fields, content_start..raw.end)
}

fn process_header(header: &[u8], fields: &mut HeaderFields) {
    let colon = match memchr::memchr(b':', header) {
        Some(colon) => colon,
        None => return,
    };
    let name = match str::from_utf8(&header[..colon]) {
        Ok(name) => name.trim(),
        Err(_) => return,
    };
    let value = &header[colon + 1..];

    if "Content-Type".eq_ignore_ascii_case(name) {
        // Ignore extra Content-Type headers
        if fields.content_type.is_none() {
            fields.content_type =
                header::parse_content_type(value).map(ContentType::into_owned);
        }
    } else if "Content-Disposition".eq_ignore_ascii_case(name) {
        fields.content_disposition = header::parse_content_disposition(value)
            .map(ContentDisposition::into_owned);
    } else if "Content-Language".eq_ignore_ascii_case(name) {
        fields.content_language = header::parse_content_language(value)
            .map(|lang| String::from_utf8_lossy(lang).into_owned());
    } else if "Content-Location".eq_ignore_ascii_case(name) {
        fields.content_location =
            header::parse_content_location(value).map(str::to_owned);
    } else if "Content-Transfer-Encoding".eq_ignore_ascii_case(name) {
        fields.content_transfer_encoding =
            header::parse_content_transfer_encoding(value)
                .unwrap_or(ContentTransferEncoding::Binary);
    }
}
